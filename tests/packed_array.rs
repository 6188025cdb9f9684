mod common;

use bytes::{BufMut, BytesMut};
use protodyn::context::Context;
use protodyn::decode::{FieldValue, Value};

fn repeated_context() -> Context
{
    // message Message {
    //     repeated string s = 1;
    //     repeated int32 small = 2;            // proto3: packed by default
    //     repeated int32 expanded = 3 [packed = false];
    // }
    let mut expanded = common::field("expanded", 3, common::LABEL_REPEATED, common::TYPE_INT32, None);
    common::set_packed(&mut expanded, false);

    let msg = common::message(
        "Message",
        &[
            common::field("s", 1, common::LABEL_REPEATED, common::TYPE_STRING, None),
            common::field("small", 2, common::LABEL_REPEATED, common::TYPE_INT32, None),
            expanded,
        ],
    );
    let set = common::descriptor_set(&[common::file("repeated.proto", None, &[msg], &[])]);
    Context::from_descriptor_set(&set).unwrap()
}

#[test]
fn repeated()
{
    let context = repeated_context();
    let handle = context.resolve_type("repeated.proto", "Message").unwrap();

    let mut payload = BytesMut::new();

    payload.put_u8(1 << 3 | 2); // String tag.
    payload.put_u8(11);
    payload.put_slice(b"first value");

    payload.put_u8(1 << 3 | 2); // String tag.
    payload.put_u8(12);
    payload.put_slice(b"second value");

    payload.put_u8(2 << 3 | 2); // Packed integer array.
    payload.put_slice(b"\x06"); // Length
    payload.put_slice(b"\x01");
    payload.put_slice(b"\x80\x01");
    payload.put_slice(b"\x80\x80\x02");

    payload.put_u8(2 << 3); // Expanded element of the same field.
    payload.put_slice(b"\x07");

    let value = handle.decode(&payload).unwrap();

    assert_eq!(
        value.get_field(1),
        Some(&FieldValue::Repeated(vec![
            Value::String("first value".to_string()),
            Value::String("second value".to_string()),
        ]))
    );
    assert_eq!(
        value.get_field(2),
        Some(&FieldValue::Repeated(vec![
            Value::Int32(1),
            Value::Int32(1 << 7),
            Value::Int32(1 << 15),
            Value::Int32(7),
        ]))
    );
}

#[test]
fn packed_declaration_reencodes_packed()
{
    let context = repeated_context();
    let handle = context.resolve_type("repeated.proto", "Message").unwrap();

    // Three expanded occurrences of the packed-by-default field 2.
    let value = handle.decode(b"\x10\x01\x10\x02\x10\x03").unwrap();

    assert_eq!(&value.encode(&context)[..], b"\x12\x03\x01\x02\x03");
}

#[test]
fn unpacked_declaration_reencodes_expanded()
{
    let context = repeated_context();
    let handle = context.resolve_type("repeated.proto", "Message").unwrap();

    // A packed run for field 3, which is declared [packed = false].
    let value = handle.decode(b"\x1a\x03\x01\x02\x03").unwrap();

    assert_eq!(
        value.get_field(3),
        Some(&FieldValue::Repeated(vec![
            Value::Int32(1),
            Value::Int32(2),
            Value::Int32(3),
        ]))
    );
    assert_eq!(&value.encode(&context)[..], b"\x18\x01\x18\x02\x18\x03");
}

#[test]
fn packed_round_trip()
{
    let context = repeated_context();
    let handle = context.resolve_type("repeated.proto", "Message").unwrap();

    let mut value = handle.new_value();
    value
        .set_field(
            &context,
            2,
            FieldValue::Repeated(vec![Value::Int32(1), Value::Int32(-1), Value::Int32(300)]),
        )
        .unwrap();

    let encoded = value.encode(&context);
    let decoded = handle.decode(&encoded).unwrap();
    assert_eq!(value, decoded);
}

#[test]
fn truncated_packed_run_fails()
{
    use protodyn::decode::DecodeError;

    let context = repeated_context();
    let handle = context.resolve_type("repeated.proto", "Message").unwrap();

    // The run claims four bytes but its last varint never terminates.
    match handle.decode(b"\x12\x02\x01\x80") {
        Err(DecodeError::TruncatedInput) => {}
        other => panic!("Unexpected result: {:?}", other),
    }
}
