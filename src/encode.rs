//! Protocol buffer binary payload encoding.
//!
//! The encoder is the write side of the dynamic message model in
//! [`decode`](crate::decode). Values are validated when they are stored, so
//! encoding itself cannot fail.

use bytes::{BufMut, BytesMut};

use crate::context::*;
use crate::decode::{map_entry_fields, FieldValue, MapKey, MessageValue, UnknownField, UnknownValue, Value};

impl MessageValue
{
    /// Encode the message into the binary wire format.
    ///
    /// Deterministic: fields are written in ascending field number order,
    /// followed by preserved unknown fields in their original order, so an
    /// unchanged message always encodes to identical bytes. Repeated scalar
    /// numeric fields use the packed representation when their declaration
    /// does.
    pub fn encode(&self, ctx: &Context) -> BytesMut
    {
        let mut buf = BytesMut::new();
        self.encode_into(ctx, &mut buf);
        buf
    }

    fn encode_into(&self, ctx: &Context, buf: &mut BytesMut)
    {
        let info = ctx.resolve_message(self.msg_ref);
        for (number, value) in self.fields() {
            // Field numbers without a declaration cannot enter the value
            // through the validating setters; skipping keeps the invariant
            // local.
            let field = match info.get_field(number) {
                Some(field) => field,
                None => continue,
            };
            encode_field(field, value, ctx, buf);
        }

        for unknown in self.unknown_fields() {
            encode_unknown(unknown, buf);
        }
    }
}

fn encode_field(field: &MessageField, value: &FieldValue, ctx: &Context, buf: &mut BytesMut)
{
    match value {
        FieldValue::Single(value) => {
            write_tag(buf, field.number, field.field_type.wire_type());
            write_value(value, ctx, buf);
        }

        FieldValue::Repeated(values) => match field.multiplicity {
            Multiplicity::RepeatedPacked => {
                if values.is_empty() {
                    return;
                }
                let mut run = BytesMut::new();
                for value in values {
                    write_value(value, ctx, &mut run);
                }
                write_tag(buf, field.number, 2);
                write_varint(buf, run.len() as u64);
                buf.extend_from_slice(&run);
            }
            _ => {
                for value in values {
                    write_tag(buf, field.number, field.field_type.wire_type());
                    write_value(value, ctx, buf);
                }
            }
        },

        FieldValue::Map(pairs) => {
            let (key_field, value_field) = match map_entry_fields(field, ctx) {
                Some(pair) => pair,
                None => panic!("Map field without an entry type"),
            };
            for (key, value) in pairs {
                let mut entry = BytesMut::new();
                write_tag(&mut entry, 1, key_field.field_type.wire_type());
                write_value(&map_key_value(key, &key_field.field_type), ctx, &mut entry);
                write_tag(&mut entry, 2, value_field.field_type.wire_type());
                write_value(value, ctx, &mut entry);

                write_tag(buf, field.number, 2);
                write_varint(buf, entry.len() as u64);
                buf.extend_from_slice(&entry);
            }
        }
    }
}

fn write_value(value: &Value, ctx: &Context, buf: &mut BytesMut)
{
    match value {
        Value::Double(v) => buf.put_f64_le(*v),
        Value::Float(v) => buf.put_f32_le(*v),
        Value::Int32(v) => write_varint(buf, *v as i64 as u64),
        Value::Int64(v) => write_varint(buf, *v as u64),
        Value::UInt32(v) => write_varint(buf, u64::from(*v)),
        Value::UInt64(v) => write_varint(buf, *v),
        Value::SInt32(v) => write_varint(buf, u64::from(((v << 1) ^ (v >> 31)) as u32)),
        Value::SInt64(v) => write_varint(buf, ((v << 1) ^ (v >> 63)) as u64),
        Value::Fixed32(v) => buf.put_u32_le(*v),
        Value::Fixed64(v) => buf.put_u64_le(*v),
        Value::SFixed32(v) => buf.put_i32_le(*v),
        Value::SFixed64(v) => buf.put_i64_le(*v),
        Value::Bool(v) => buf.put_u8(*v as u8),
        Value::String(v) => {
            write_varint(buf, v.len() as u64);
            buf.extend_from_slice(v.as_bytes());
        }
        Value::Bytes(v) => {
            write_varint(buf, v.len() as u64);
            buf.extend_from_slice(v);
        }
        Value::Enum(v) => write_varint(buf, v.value as u64),
        Value::Message(v) => {
            let inner = v.encode(ctx);
            write_varint(buf, inner.len() as u64);
            buf.extend_from_slice(&inner);
        }
    }
}

/// Converts a map key back into a value of the entry's declared key kind so
/// it encodes with the right wire representation.
fn map_key_value(key: &MapKey, kind: &ValueType) -> Value
{
    match (key, kind) {
        (MapKey::Int32(v), ValueType::SInt32) => Value::SInt32(*v),
        (MapKey::Int32(v), ValueType::SFixed32) => Value::SFixed32(*v),
        (MapKey::Int32(v), _) => Value::Int32(*v),
        (MapKey::Int64(v), ValueType::SInt64) => Value::SInt64(*v),
        (MapKey::Int64(v), ValueType::SFixed64) => Value::SFixed64(*v),
        (MapKey::Int64(v), _) => Value::Int64(*v),
        (MapKey::UInt32(v), ValueType::Fixed32) => Value::Fixed32(*v),
        (MapKey::UInt32(v), _) => Value::UInt32(*v),
        (MapKey::UInt64(v), ValueType::Fixed64) => Value::Fixed64(*v),
        (MapKey::UInt64(v), _) => Value::UInt64(*v),
        (MapKey::Bool(v), _) => Value::Bool(*v),
        (MapKey::String(v), _) => Value::String(v.clone()),
    }
}

fn encode_unknown(unknown: &UnknownField, buf: &mut BytesMut)
{
    match &unknown.value {
        UnknownValue::Varint(v) => {
            write_tag(buf, unknown.number, 0);
            write_varint(buf, *v);
        }
        UnknownValue::Fixed64(v) => {
            write_tag(buf, unknown.number, 1);
            buf.put_u64_le(*v);
        }
        UnknownValue::VariableLength(payload) => {
            write_tag(buf, unknown.number, 2);
            write_varint(buf, payload.len() as u64);
            buf.extend_from_slice(payload);
        }
        UnknownValue::Fixed32(v) => {
            write_tag(buf, unknown.number, 5);
            buf.put_u32_le(*v);
        }
    }
}

fn write_tag(buf: &mut BytesMut, number: u64, wire_type: u8)
{
    write_varint(buf, number << 3 | u64::from(wire_type));
}

fn write_varint(buf: &mut BytesMut, mut value: u64)
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
