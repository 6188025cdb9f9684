//! Schema-less decoding of serialized `FileDescriptorSet` bytes.
//!
//! The descriptor set's own layout is fixed and well known, so it is read
//! with a hand-written decoder that understands exactly the descriptor
//! fields the registry needs. Unrecognized descriptor fields (options,
//! source info, services, extensions) are skipped by wire type.

use crate::decode::{
    read_length_delimited, read_tag, read_varint, skip_value, DecodeError, MAX_DEPTH,
};

#[derive(Debug, Default)]
pub(crate) struct RawFileSet
{
    pub files: Vec<RawFile>,
}

#[derive(Debug, Default)]
pub(crate) struct RawFile
{
    pub name: String,
    pub package: Option<String>,
    pub syntax: Option<String>,
    pub messages: Vec<RawMessage>,
    pub enums: Vec<RawEnum>,
}

#[derive(Debug, Default)]
pub(crate) struct RawMessage
{
    pub name: String,
    pub fields: Vec<RawField>,
    pub nested: Vec<RawMessage>,
    pub enums: Vec<RawEnum>,
    pub oneofs: Vec<String>,
    pub map_entry: bool,
}

#[derive(Debug, Default)]
pub(crate) struct RawField
{
    pub name: String,
    pub number: i64,
    pub label: i64,
    pub type_code: i64,
    pub type_name: Option<String>,
    pub json_name: Option<String>,
    pub packed: Option<bool>,
    pub oneof_index: Option<i64>,
    pub proto3_optional: bool,
}

#[derive(Debug, Default)]
pub(crate) struct RawEnum
{
    pub name: String,
    pub values: Vec<RawEnumValue>,
}

#[derive(Debug, Default)]
pub(crate) struct RawEnumValue
{
    pub name: String,
    pub number: i64,
}

fn read_string(data: &mut &[u8]) -> Result<String, DecodeError>
{
    let payload = read_length_delimited(data)?;
    Ok(String::from_utf8_lossy(payload).to_string())
}

fn read_int(data: &mut &[u8]) -> Result<i64, DecodeError>
{
    read_varint(data).map(|v| v as i64)
}

fn read_bool(data: &mut &[u8]) -> Result<bool, DecodeError>
{
    read_varint(data).map(|v| v != 0)
}

impl RawFileSet
{
    pub fn decode(mut data: &[u8]) -> Result<Self, DecodeError>
    {
        let mut set = RawFileSet::default();
        while !data.is_empty() {
            let (number, wire_type) = read_tag(&mut data)?;
            match (number, wire_type) {
                // FileDescriptorSet.file
                (1, 2) => {
                    let mut payload = read_length_delimited(&mut data)?;
                    set.files.push(RawFile::decode(&mut payload)?);
                }
                _ => skip_value(&mut data, wire_type)?,
            }
        }
        Ok(set)
    }
}

impl RawFile
{
    fn decode(data: &mut &[u8]) -> Result<Self, DecodeError>
    {
        let mut file = RawFile::default();
        while !data.is_empty() {
            let (number, wire_type) = read_tag(data)?;
            match (number, wire_type) {
                // FileDescriptorProto.name
                (1, 2) => file.name = read_string(data)?,
                // FileDescriptorProto.package
                (2, 2) => file.package = Some(read_string(data)?),
                // FileDescriptorProto.message_type
                (4, 2) => {
                    let mut payload = read_length_delimited(data)?;
                    file.messages.push(RawMessage::decode(&mut payload, 0)?);
                }
                // FileDescriptorProto.enum_type
                (5, 2) => {
                    let mut payload = read_length_delimited(data)?;
                    file.enums.push(RawEnum::decode(&mut payload)?);
                }
                // FileDescriptorProto.syntax
                (12, 2) => file.syntax = Some(read_string(data)?),
                _ => skip_value(data, wire_type)?,
            }
        }
        Ok(file)
    }
}

impl RawMessage
{
    fn decode(data: &mut &[u8], depth: usize) -> Result<Self, DecodeError>
    {
        if depth >= MAX_DEPTH {
            return crate::decode::DepthLimitExceeded { limit: MAX_DEPTH }.fail();
        }

        let mut message = RawMessage::default();
        while !data.is_empty() {
            let (number, wire_type) = read_tag(data)?;
            match (number, wire_type) {
                // DescriptorProto.name
                (1, 2) => message.name = read_string(data)?,
                // DescriptorProto.field
                (2, 2) => {
                    let mut payload = read_length_delimited(data)?;
                    message.fields.push(RawField::decode(&mut payload)?);
                }
                // DescriptorProto.nested_type
                (3, 2) => {
                    let mut payload = read_length_delimited(data)?;
                    message.nested.push(RawMessage::decode(&mut payload, depth + 1)?);
                }
                // DescriptorProto.enum_type
                (4, 2) => {
                    let mut payload = read_length_delimited(data)?;
                    message.enums.push(RawEnum::decode(&mut payload)?);
                }
                // DescriptorProto.options, for MessageOptions.map_entry
                (7, 2) => {
                    let mut payload = read_length_delimited(data)?;
                    message.map_entry = message_options_map_entry(&mut payload)?;
                }
                // DescriptorProto.oneof_decl
                (8, 2) => {
                    let mut payload = read_length_delimited(data)?;
                    message.oneofs.push(oneof_name(&mut payload)?);
                }
                _ => skip_value(data, wire_type)?,
            }
        }
        Ok(message)
    }
}

impl RawField
{
    fn decode(data: &mut &[u8]) -> Result<Self, DecodeError>
    {
        // FieldDescriptorProto defaults to LABEL_OPTIONAL when the label is
        // not serialized.
        let mut field = RawField {
            label: 1,
            ..Default::default()
        };
        while !data.is_empty() {
            let (number, wire_type) = read_tag(data)?;
            match (number, wire_type) {
                // FieldDescriptorProto.name
                (1, 2) => field.name = read_string(data)?,
                // FieldDescriptorProto.number
                (3, 0) => field.number = read_int(data)?,
                // FieldDescriptorProto.label
                (4, 0) => field.label = read_int(data)?,
                // FieldDescriptorProto.type
                (5, 0) => field.type_code = read_int(data)?,
                // FieldDescriptorProto.type_name
                (6, 2) => field.type_name = Some(read_string(data)?),
                // FieldDescriptorProto.options, for FieldOptions.packed
                (8, 2) => {
                    let mut payload = read_length_delimited(data)?;
                    field.packed = field_options_packed(&mut payload)?;
                }
                // FieldDescriptorProto.oneof_index
                (9, 0) => field.oneof_index = Some(read_int(data)?),
                // FieldDescriptorProto.json_name
                (10, 2) => field.json_name = Some(read_string(data)?),
                // FieldDescriptorProto.proto3_optional
                (17, 0) => field.proto3_optional = read_bool(data)?,
                _ => skip_value(data, wire_type)?,
            }
        }
        Ok(field)
    }
}

impl RawEnum
{
    fn decode(data: &mut &[u8]) -> Result<Self, DecodeError>
    {
        let mut decl = RawEnum::default();
        while !data.is_empty() {
            let (number, wire_type) = read_tag(data)?;
            match (number, wire_type) {
                // EnumDescriptorProto.name
                (1, 2) => decl.name = read_string(data)?,
                // EnumDescriptorProto.value
                (2, 2) => {
                    let mut payload = read_length_delimited(data)?;
                    decl.values.push(RawEnumValue::decode(&mut payload)?);
                }
                _ => skip_value(data, wire_type)?,
            }
        }
        Ok(decl)
    }
}

impl RawEnumValue
{
    fn decode(data: &mut &[u8]) -> Result<Self, DecodeError>
    {
        let mut value = RawEnumValue::default();
        while !data.is_empty() {
            let (number, wire_type) = read_tag(data)?;
            match (number, wire_type) {
                // EnumValueDescriptorProto.name
                (1, 2) => value.name = read_string(data)?,
                // EnumValueDescriptorProto.number
                (2, 0) => value.number = read_int(data)?,
                _ => skip_value(data, wire_type)?,
            }
        }
        Ok(value)
    }
}

fn message_options_map_entry(data: &mut &[u8]) -> Result<bool, DecodeError>
{
    let mut map_entry = false;
    while !data.is_empty() {
        let (number, wire_type) = read_tag(data)?;
        match (number, wire_type) {
            // MessageOptions.map_entry
            (7, 0) => map_entry = read_bool(data)?,
            _ => skip_value(data, wire_type)?,
        }
    }
    Ok(map_entry)
}

fn field_options_packed(data: &mut &[u8]) -> Result<Option<bool>, DecodeError>
{
    let mut packed = None;
    while !data.is_empty() {
        let (number, wire_type) = read_tag(data)?;
        match (number, wire_type) {
            // FieldOptions.packed
            (2, 0) => packed = Some(read_bool(data)?),
            _ => skip_value(data, wire_type)?,
        }
    }
    Ok(packed)
}

fn oneof_name(data: &mut &[u8]) -> Result<String, DecodeError>
{
    let mut name = String::new();
    while !data.is_empty() {
        let (number, wire_type) = read_tag(data)?;
        match (number, wire_type) {
            // OneofDescriptorProto.name
            (1, 2) => name = read_string(data)?,
            _ => skip_value(data, wire_type)?,
        }
    }
    Ok(name)
}
