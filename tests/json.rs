mod common;

use protodyn::context::Context;
use protodyn::decode::{FieldValue, Value};
use protodyn::json::{JsonError, JsonOptions};

fn person_context() -> Context
{
    Context::from_descriptor_set(&common::person_set()).unwrap()
}

#[test]
fn person_json_to_wire_and_back()
{
    let context = person_context();
    let person = context.resolve_type("person.proto", "Person").unwrap();

    let value = person
        .info()
        .decode_json_str(r#"{"name":"Ann","age":30}"#, &context, &JsonOptions::strict())
        .unwrap();

    let wire = value.encode(&context);
    assert_eq!(&wire[..], b"\x0a\x03Ann\x10\x1e");

    let decoded = person.decode(&wire).unwrap();
    assert_eq!(decoded.to_json_string(&context), r#"{"age":30,"name":"Ann"}"#);
    assert_eq!(decoded, value);
}

#[test]
fn unknown_keys_strict_and_lenient()
{
    let context = person_context();
    let person = context.resolve_type("person.proto", "Person").unwrap();

    let text = r#"{"name":"Ann","nickname":"A"}"#;

    match person
        .info()
        .decode_json_str(text, &context, &JsonOptions::strict())
    {
        Err(JsonError::UnknownField { name, message }) => {
            assert_eq!(name, "nickname");
            assert_eq!(message, "Person");
        }
        other => panic!("Unexpected result: {:?}", other),
    }

    let value = person
        .info()
        .decode_json_str(text, &context, &JsonOptions::lenient())
        .unwrap();
    assert_eq!(
        value.get_field(1),
        Some(&FieldValue::Single(Value::String("Ann".to_string())))
    );
    assert_eq!(value.get_field(2), None);
}

#[test]
fn shape_mismatches_are_rejected()
{
    let msg = common::message(
        "Message",
        &[
            common::field("one", 1, common::LABEL_OPTIONAL, common::TYPE_INT32, None),
            common::field("many", 2, common::LABEL_REPEATED, common::TYPE_INT32, None),
        ],
    );
    let set = common::descriptor_set(&[common::file("m.proto", None, &[msg], &[])]);
    let context = Context::from_descriptor_set(&set).unwrap();
    let handle = context.resolve_type("m.proto", "Message").unwrap();

    match handle
        .info()
        .decode_json_str(r#"{"one":[1]}"#, &context, &JsonOptions::strict())
    {
        Err(JsonError::ShapeMismatch { field, .. }) => assert_eq!(field, "one"),
        other => panic!("Unexpected result: {:?}", other),
    }

    match handle
        .info()
        .decode_json_str(r#"{"many":1}"#, &context, &JsonOptions::strict())
    {
        Err(JsonError::ShapeMismatch { field, .. }) => assert_eq!(field, "many"),
        other => panic!("Unexpected result: {:?}", other),
    }
}

#[test]
fn type_coercions()
{
    let msg = common::message(
        "Message",
        &[
            common::field("i", 1, common::LABEL_OPTIONAL, common::TYPE_INT32, None),
            common::field("d", 2, common::LABEL_OPTIONAL, common::TYPE_DOUBLE, None),
        ],
    );
    let set = common::descriptor_set(&[common::file("m.proto", None, &[msg], &[])]);
    let context = Context::from_descriptor_set(&set).unwrap();
    let handle = context.resolve_type("m.proto", "Message").unwrap();

    // Decimal strings coerce to integer fields; numbers and the non-finite
    // sentinels coerce to float fields.
    let value = handle
        .info()
        .decode_json_str(r#"{"i":"42","d":"NaN"}"#, &context, &JsonOptions::strict())
        .unwrap();
    assert_eq!(value.get_field(1), Some(&FieldValue::Single(Value::Int32(42))));
    match value.get_field(2) {
        Some(&FieldValue::Single(Value::Double(d))) => assert!(d.is_nan()),
        other => panic!("Unexpected value: {:?}", other),
    }

    // A fractional number does not coerce to an integer field.
    match handle
        .info()
        .decode_json_str(r#"{"i":1.5}"#, &context, &JsonOptions::strict())
    {
        Err(JsonError::InvalidValue { field, .. }) => assert_eq!(field, "i"),
        other => panic!("Unexpected result: {:?}", other),
    }
}

#[test]
fn sixty_four_bit_integers_travel_as_strings()
{
    let msg = common::message(
        "Message",
        &[
            common::field("big", 1, common::LABEL_OPTIONAL, common::TYPE_INT64, None),
            common::field("ubig", 2, common::LABEL_OPTIONAL, common::TYPE_UINT64, None),
        ],
    );
    let set = common::descriptor_set(&[common::file("m.proto", None, &[msg], &[])]);
    let context = Context::from_descriptor_set(&set).unwrap();
    let handle = context.resolve_type("m.proto", "Message").unwrap();

    let value = handle
        .info()
        .decode_json_str(
            r#"{"big":"-9007199254740993","ubig":18446744073709551615}"#,
            &context,
            &JsonOptions::strict(),
        )
        .unwrap();
    assert_eq!(
        value.get_field(1),
        Some(&FieldValue::Single(Value::Int64(-9007199254740993)))
    );
    assert_eq!(
        value.get_field(2),
        Some(&FieldValue::Single(Value::UInt64(18446744073709551615)))
    );

    assert_eq!(
        value.to_json_string(&context),
        r#"{"big":"-9007199254740993","ubig":"18446744073709551615"}"#
    );
}

#[test]
fn bytes_fields_use_base64()
{
    let msg = common::message(
        "Message",
        &[common::field("data", 1, common::LABEL_OPTIONAL, common::TYPE_BYTES, None)],
    );
    let set = common::descriptor_set(&[common::file("m.proto", None, &[msg], &[])]);
    let context = Context::from_descriptor_set(&set).unwrap();
    let handle = context.resolve_type("m.proto", "Message").unwrap();

    let value = handle
        .info()
        .decode_json_str(r#"{"data":"aGVsbG8="}"#, &context, &JsonOptions::strict())
        .unwrap();
    assert_eq!(
        value.get_field(1),
        Some(&FieldValue::Single(Value::Bytes(bytes::Bytes::from_static(
            b"hello"
        ))))
    );
    assert_eq!(value.to_json_string(&context), r#"{"data":"aGVsbG8="}"#);

    match handle
        .info()
        .decode_json_str(r#"{"data":"not base64!"}"#, &context, &JsonOptions::strict())
    {
        Err(JsonError::InvalidValue { field, .. }) => assert_eq!(field, "data"),
        other => panic!("Unexpected result: {:?}", other),
    }
}

#[test]
fn enums_render_names_and_accept_names_or_numbers()
{
    let color = common::enum_type("Color", &[("COLOR_UNKNOWN", 0), ("COLOR_RED", 1)]);
    let msg = common::message(
        "Message",
        &[common::field(
            "color",
            1,
            common::LABEL_OPTIONAL,
            common::TYPE_ENUM,
            Some(".Color"),
        )],
    );
    let set = common::descriptor_set(&[common::file("m.proto", None, &[msg], &[color])]);
    let context = Context::from_descriptor_set(&set).unwrap();
    let handle = context.resolve_type("m.proto", "Message").unwrap();

    let value = handle
        .info()
        .decode_json_str(r#"{"color":"COLOR_RED"}"#, &context, &JsonOptions::strict())
        .unwrap();
    assert_eq!(value.to_json_string(&context), r#"{"color":"COLOR_RED"}"#);

    // Numbers without a declared name round-trip as numbers.
    let value = handle
        .info()
        .decode_json_str(r#"{"color":5}"#, &context, &JsonOptions::strict())
        .unwrap();
    assert_eq!(value.to_json_string(&context), r#"{"color":5}"#);

    match handle
        .info()
        .decode_json_str(r#"{"color":"COLOR_BLUE"}"#, &context, &JsonOptions::strict())
    {
        Err(JsonError::InvalidValue { field, .. }) => assert_eq!(field, "color"),
        other => panic!("Unexpected result: {:?}", other),
    }
}

#[test]
fn map_fields_round_trip()
{
    // message Counts { map<string, int32> values = 1; }
    let mut entry = common::message(
        "ValuesEntry",
        &[
            common::field("key", 1, common::LABEL_OPTIONAL, common::TYPE_STRING, None),
            common::field("value", 2, common::LABEL_OPTIONAL, common::TYPE_INT32, None),
        ],
    );
    common::set_map_entry(&mut entry);

    let mut counts = common::message(
        "Counts",
        &[common::field(
            "values",
            1,
            common::LABEL_REPEATED,
            common::TYPE_MESSAGE,
            Some(".Counts.ValuesEntry"),
        )],
    );
    common::add_nested(&mut counts, &entry);

    let set = common::descriptor_set(&[common::file("counts.proto", None, &[counts], &[])]);
    let context = Context::from_descriptor_set(&set).unwrap();
    let handle = context.resolve_type("counts.proto", "Counts").unwrap();

    let value = handle
        .info()
        .decode_json_str(r#"{"values":{"a":1,"b":2}}"#, &context, &JsonOptions::strict())
        .unwrap();

    let wire = value.encode(&context);
    let decoded = handle.decode(&wire).unwrap();
    assert_eq!(decoded, value);
    assert_eq!(
        decoded.to_json_string(&context),
        r#"{"values":{"a":1,"b":2}}"#
    );
}

#[test]
fn json_names_from_schema_and_lower_camel()
{
    // One field with an explicit json_name, one relying on the transform.
    let mut custom = common::field("first_name", 1, common::LABEL_OPTIONAL, common::TYPE_STRING, None);
    common::set_json_name(&mut custom, "first");
    let msg = common::message(
        "Message",
        &[
            custom,
            common::field("last_name", 2, common::LABEL_OPTIONAL, common::TYPE_STRING, None),
        ],
    );
    let set = common::descriptor_set(&[common::file("m.proto", None, &[msg], &[])]);
    let context = Context::from_descriptor_set(&set).unwrap();
    let handle = context.resolve_type("m.proto", "Message").unwrap();

    let value = handle
        .info()
        .decode_json_str(
            r#"{"first":"Ann","lastName":"Arbor"}"#,
            &context,
            &JsonOptions::strict(),
        )
        .unwrap();
    assert_eq!(
        value.to_json_string(&context),
        r#"{"first":"Ann","lastName":"Arbor"}"#
    );

    // The declared names are accepted on input as well.
    let by_declared_name = handle
        .info()
        .decode_json_str(
            r#"{"first_name":"Ann","last_name":"Arbor"}"#,
            &context,
            &JsonOptions::strict(),
        )
        .unwrap();
    assert_eq!(by_declared_name, value);
}

#[test]
fn null_means_absent()
{
    let context = person_context();
    let person = context.resolve_type("person.proto", "Person").unwrap();

    let value = person
        .info()
        .decode_json_str(r#"{"name":null,"age":1}"#, &context, &JsonOptions::strict())
        .unwrap();
    assert_eq!(value.get_field(1), None);

    let empty = person
        .info()
        .decode_json_str("{}", &context, &JsonOptions::strict())
        .unwrap();
    assert_eq!(empty.to_json_string(&context), "{}");
}

#[test]
fn json_syntax_errors_are_reported()
{
    let context = person_context();
    let person = context.resolve_type("person.proto", "Person").unwrap();

    match person
        .info()
        .decode_json_str("{", &context, &JsonOptions::strict())
    {
        Err(JsonError::Syntax { .. }) => {}
        other => panic!("Unexpected result: {:?}", other),
    }

    match person
        .info()
        .decode_json_str("[]", &context, &JsonOptions::strict())
    {
        Err(JsonError::NotAnObject { message }) => assert_eq!(message, "Person"),
        other => panic!("Unexpected result: {:?}", other),
    }
}
