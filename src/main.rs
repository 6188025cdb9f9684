use std::env;
use std::io::Read;

fn main() -> Result<(), Box<dyn std::error::Error>>
{
    let sets: Vec<Vec<u8>> = env::args()
        .skip(1)
        .map(|f| {
            let mut file = std::fs::File::open(f)?;
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            Ok(data)
        })
        .collect::<Result<_, std::io::Error>>()?;

    for set in &sets {
        let context = protodyn::Context::from_descriptor_set(set)?;
        println!("{:#?}", context);
    }

    Ok(())
}
