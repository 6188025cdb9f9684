//! Hand-rolled descriptor set assembly for the tests.
//!
//! Writes just enough of the `FileDescriptorSet` wire format to build
//! registries without depending on protoc output.

#![allow(dead_code)]

use bytes::{BufMut, BytesMut};

pub const LABEL_OPTIONAL: u64 = 1;
pub const LABEL_REQUIRED: u64 = 2;
pub const LABEL_REPEATED: u64 = 3;

pub const TYPE_DOUBLE: u64 = 1;
pub const TYPE_FLOAT: u64 = 2;
pub const TYPE_INT64: u64 = 3;
pub const TYPE_UINT64: u64 = 4;
pub const TYPE_INT32: u64 = 5;
pub const TYPE_FIXED64: u64 = 6;
pub const TYPE_FIXED32: u64 = 7;
pub const TYPE_BOOL: u64 = 8;
pub const TYPE_STRING: u64 = 9;
pub const TYPE_MESSAGE: u64 = 11;
pub const TYPE_BYTES: u64 = 12;
pub const TYPE_UINT32: u64 = 13;
pub const TYPE_ENUM: u64 = 14;
pub const TYPE_SFIXED32: u64 = 15;
pub const TYPE_SFIXED64: u64 = 16;
pub const TYPE_SINT32: u64 = 17;
pub const TYPE_SINT64: u64 = 18;

pub fn put_varint(buf: &mut BytesMut, mut value: u64)
{
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.put_u8(byte);
            break;
        }
        buf.put_u8(byte | 0x80);
    }
}

pub fn put_varint_field(buf: &mut BytesMut, number: u64, value: u64)
{
    put_varint(buf, number << 3);
    put_varint(buf, value);
}

pub fn put_bytes_field(buf: &mut BytesMut, number: u64, payload: &[u8])
{
    put_varint(buf, number << 3 | 2);
    put_varint(buf, payload.len() as u64);
    buf.put_slice(payload);
}

/// A FieldDescriptorProto.
pub fn field(name: &str, number: u64, label: u64, type_code: u64, type_name: Option<&str>)
    -> BytesMut
{
    let mut f = BytesMut::new();
    put_bytes_field(&mut f, 1, name.as_bytes());
    put_varint_field(&mut f, 3, number);
    put_varint_field(&mut f, 4, label);
    put_varint_field(&mut f, 5, type_code);
    if let Some(target) = type_name {
        put_bytes_field(&mut f, 6, target.as_bytes());
    }
    f
}

/// Appends FieldOptions with an explicit `packed` value.
pub fn set_packed(field: &mut BytesMut, packed: bool)
{
    let mut options = BytesMut::new();
    put_varint_field(&mut options, 2, packed as u64);
    put_bytes_field(field, 8, &options);
}

pub fn set_json_name(field: &mut BytesMut, json_name: &str)
{
    put_bytes_field(field, 10, json_name.as_bytes());
}

pub fn set_oneof_index(field: &mut BytesMut, index: u64)
{
    put_varint_field(field, 9, index);
}

pub fn set_proto3_optional(field: &mut BytesMut)
{
    put_varint_field(field, 17, 1);
}

/// A DescriptorProto with the given fields.
pub fn message(name: &str, fields: &[BytesMut]) -> BytesMut
{
    let mut m = BytesMut::new();
    put_bytes_field(&mut m, 1, name.as_bytes());
    for f in fields {
        put_bytes_field(&mut m, 2, f);
    }
    m
}

pub fn add_nested(message: &mut BytesMut, nested: &BytesMut)
{
    put_bytes_field(message, 3, nested);
}

pub fn add_enum(message: &mut BytesMut, decl: &BytesMut)
{
    put_bytes_field(message, 4, decl);
}

pub fn add_oneof(message: &mut BytesMut, name: &str)
{
    let mut oneof = BytesMut::new();
    put_bytes_field(&mut oneof, 1, name.as_bytes());
    put_bytes_field(message, 8, &oneof);
}

/// Appends MessageOptions with `map_entry = true`.
pub fn set_map_entry(message: &mut BytesMut)
{
    let mut options = BytesMut::new();
    put_varint_field(&mut options, 7, 1);
    put_bytes_field(message, 7, &options);
}

/// An EnumDescriptorProto with the given values.
pub fn enum_type(name: &str, values: &[(&str, i64)]) -> BytesMut
{
    let mut e = BytesMut::new();
    put_bytes_field(&mut e, 1, name.as_bytes());
    for (value_name, number) in values {
        let mut v = BytesMut::new();
        put_bytes_field(&mut v, 1, value_name.as_bytes());
        put_varint_field(&mut v, 2, *number as u64);
        put_bytes_field(&mut e, 2, &v);
    }
    e
}

/// A FileDescriptorProto with the given syntax.
pub fn file_with_syntax(
    path: &str,
    package: Option<&str>,
    messages: &[BytesMut],
    enums: &[BytesMut],
    syntax: &str,
) -> BytesMut
{
    let mut f = BytesMut::new();
    put_bytes_field(&mut f, 1, path.as_bytes());
    if let Some(package) = package {
        put_bytes_field(&mut f, 2, package.as_bytes());
    }
    for m in messages {
        put_bytes_field(&mut f, 4, m);
    }
    for e in enums {
        put_bytes_field(&mut f, 5, e);
    }
    put_bytes_field(&mut f, 12, syntax.as_bytes());
    f
}

/// A proto3 FileDescriptorProto.
pub fn file(path: &str, package: Option<&str>, messages: &[BytesMut], enums: &[BytesMut])
    -> BytesMut
{
    file_with_syntax(path, package, messages, enums, "proto3")
}

/// A FileDescriptorSet of the given files.
pub fn descriptor_set(files: &[BytesMut]) -> BytesMut
{
    let mut set = BytesMut::new();
    for f in files {
        put_bytes_field(&mut set, 1, f);
    }
    set
}

/// A descriptor set holding person.proto with
/// `message Person { string name = 1; int32 age = 2; }`.
pub fn person_set() -> BytesMut
{
    let person = message(
        "Person",
        &[
            field("name", 1, LABEL_OPTIONAL, TYPE_STRING, None),
            field("age", 2, LABEL_OPTIONAL, TYPE_INT32, None),
        ],
    );
    descriptor_set(&[file("person.proto", None, &[person], &[])])
}
