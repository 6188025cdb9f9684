//! Protocol buffer binary payload decoding and the dynamic message model.
//!
//! Payloads are decoded against a message type resolved from a
//! [`Context`](crate::context::Context). The decoder is strict: truncated
//! input and wire types that contradict the schema are errors, while field
//! numbers the schema does not know are preserved and re-emitted verbatim
//! by the encoder.

use std::collections::BTreeMap;
use std::convert::TryFrom;

use bytes::Bytes;
use snafu::{ensure, OptionExt, Snafu};

use crate::context::*;

/// Maximum message nesting depth accepted by the decoders.
pub(crate) const MAX_DEPTH: usize = 64;

/// Error decoding a binary payload.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum DecodeError
{
    /// The input ended in the middle of a varint, a fixed-width value or a
    /// length-delimited payload.
    #[snafu(display("Input ends mid-value"))]
    TruncatedInput,

    /// A varint ran past the ten byte limit.
    #[snafu(display("Varint exceeds ten bytes"))]
    MalformedVarint,

    /// A tag carried field number zero.
    #[snafu(display("Field number 0 is not valid"))]
    InvalidFieldNumber,

    /// A tag carried a wire type without a defined meaning.
    #[snafu(display("Invalid wire type {}", wire_type))]
    InvalidWireType
    {
        /// The offending wire type.
        wire_type: u8,
    },

    /// The payload holds a different wire type than the schema declares for
    /// the field.
    #[snafu(display(
        "Field {} expects wire type {}, payload holds {}",
        field,
        expected,
        actual
    ))]
    WireTypeMismatch
    {
        /// Field number.
        field: u64,

        /// Wire type implied by the declared field type.
        expected: u8,

        /// Wire type found in the payload.
        actual: u8,
    },

    /// Message nesting exceeded the decoder's depth limit.
    #[snafu(display("Message nesting exceeds {} levels", limit))]
    DepthLimitExceeded
    {
        /// The limit that was hit.
        limit: usize,
    },
}

/// Error storing a value into a [`MessageValue`].
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum ValueError
{
    /// The message type declares no field with this number.
    #[snafu(display("No field {} in the message type", number))]
    UnknownFieldNumber
    {
        /// The number the caller tried to set.
        number: u64,
    },

    /// The value does not match the field's declared type or multiplicity.
    #[snafu(display("Field {} expects {}", field, expected))]
    FieldTypeMismatch
    {
        /// Field number.
        field: u64,

        /// Human readable description of the declared shape.
        expected: String,
    },
}

/// Decoded protocol buffer value.
#[derive(Debug, PartialEq, Clone)]
pub enum Value
{
    /// `double` value.
    Double(f64),
    /// `float` value.
    Float(f32),
    /// `int32` value.
    Int32(i32),
    /// `int64` value.
    Int64(i64),
    /// `uint32` value.
    UInt32(u32),
    /// `uint64` value.
    UInt64(u64),
    /// `sint32` value.
    SInt32(i32),
    /// `sint64` value.
    SInt64(i64),
    /// `fixed32` value.
    Fixed32(u32),
    /// `fixed64` value.
    Fixed64(u64),
    /// `sfixed32` value.
    SFixed32(i32),
    /// `sfixed64` value.
    SFixed64(i64),
    /// `bool` value.
    Bool(bool),
    /// `string` value.
    String(String),
    /// `bytes` value.
    Bytes(Bytes),

    /// Message type value.
    Message(Box<MessageValue>),

    /// Enum type value.
    Enum(EnumValue),
}

/// Enum value.
#[derive(Debug, PartialEq, Clone)]
pub struct EnumValue
{
    /// Reference to the enum type.
    pub enum_ref: EnumRef,

    /// Value. Numbers with no declared name are preserved as is.
    pub value: i64,
}

/// Key of a map field entry.
#[derive(Debug, PartialEq, Clone)]
pub enum MapKey
{
    /// Key of an `int32`, `sint32` or `sfixed32` keyed map.
    Int32(i32),

    /// Key of an `int64`, `sint64` or `sfixed64` keyed map.
    Int64(i64),

    /// Key of an `uint32` or `fixed32` keyed map.
    UInt32(u32),

    /// Key of an `uint64` or `fixed64` keyed map.
    UInt64(u64),

    /// Key of a `bool` keyed map.
    Bool(bool),

    /// Key of a `string` keyed map.
    String(String),
}

/// A field value of a dynamic message, tagged by multiplicity.
#[derive(Debug, PartialEq, Clone)]
pub enum FieldValue
{
    /// Value of a singular or optional field.
    Single(Value),

    /// Values of a repeated field, in order.
    Repeated(Vec<Value>),

    /// Entries of a map field, in insertion order.
    Map(Vec<(MapKey, Value)>),
}

/// Payload of a field number the schema does not declare.
#[derive(Debug, PartialEq, Clone)]
pub enum UnknownValue
{
    /// Unknown varint (wire type = 0).
    Varint(u64),

    /// Unknown 64-bit value (wire type = 1).
    Fixed64(u64),

    /// Unknown variable length value (wire type = 2).
    VariableLength(Bytes),

    /// Unknown 32-bit value (wire type = 5).
    Fixed32(u32),
}

/// An unknown field preserved through a decode.
#[derive(Debug, PartialEq, Clone)]
pub struct UnknownField
{
    /// Field number.
    pub number: u64,

    /// Preserved payload.
    pub value: UnknownValue,
}

/// A message instance interpreted from its descriptor at runtime.
///
/// Values are keyed by field number; a key being present is what makes the
/// field explicitly set, so "not set" and "set to the zero value" stay
/// distinct. Unknown fields picked up during a decode ride along and are
/// written back out on encode.
#[derive(Debug, PartialEq, Clone)]
pub struct MessageValue
{
    /// Reference to the message type.
    pub msg_ref: MessageRef,

    fields: BTreeMap<u64, FieldValue>,
    unknown: Vec<UnknownField>,
}

impl MessageValue
{
    /// Creates an empty message of the given type.
    pub fn new(msg_ref: MessageRef) -> Self
    {
        MessageValue {
            msg_ref,
            fields: BTreeMap::new(),
            unknown: Vec::new(),
        }
    }

    /// Stores a field value, validating it against the message type.
    ///
    /// The value's kind and multiplicity must match the field declaration;
    /// mismatches are rejected here rather than at encode time. Setting a
    /// member of a `oneof` clears the other members.
    pub fn set_field(
        &mut self,
        ctx: &Context,
        number: u64,
        value: FieldValue,
    ) -> Result<(), ValueError>
    {
        let info = ctx.resolve_message(self.msg_ref);
        let field = info
            .get_field(number)
            .context(UnknownFieldNumber { number })?;

        check_shape(field, &value, ctx)?;
        self.insert_field(info, number, value);
        Ok(())
    }

    /// Gets a field value by number, if the field is set.
    pub fn get_field(&self, number: u64) -> Option<&FieldValue>
    {
        self.fields.get(&number)
    }

    /// Iterates the set fields in field number order.
    pub fn fields(&self) -> impl Iterator<Item = (u64, &FieldValue)>
    {
        self.fields.iter().map(|(number, value)| (*number, value))
    }

    /// Unknown fields preserved from a decode, in their original order.
    pub fn unknown_fields(&self) -> &[UnknownField]
    {
        &self.unknown
    }

    /// Inserts a value that has already been validated, handling `oneof`
    /// membership.
    pub(crate) fn insert_field(&mut self, info: &MessageInfo, number: u64, value: FieldValue)
    {
        if let Some(oneof) = info
            .get_field(number)
            .and_then(|f| f.oneof)
            .and_then(|oo| info.get_oneof(oo))
        {
            for member in &oneof.fields {
                if *member != number {
                    self.fields.remove(member);
                }
            }
        }
        self.fields.insert(number, value);
    }

    pub(crate) fn push_repeated(&mut self, number: u64, value: Value)
    {
        let entry = self
            .fields
            .entry(number)
            .or_insert_with(|| FieldValue::Repeated(vec![]));
        if let FieldValue::Repeated(values) = entry {
            values.push(value);
        }
    }

    pub(crate) fn insert_map_entry(&mut self, number: u64, key: MapKey, value: Value)
    {
        let entry = self
            .fields
            .entry(number)
            .or_insert_with(|| FieldValue::Map(vec![]));
        if let FieldValue::Map(pairs) = entry {
            match pairs.iter_mut().find(|(k, _)| *k == key) {
                // Duplicate keys on the wire: the last value wins, keeping
                // the first insertion position.
                Some(pair) => pair.1 = value,
                None => pairs.push((key, value)),
            }
        }
    }

    pub(crate) fn push_unknown(&mut self, unknown: UnknownField)
    {
        self.unknown.push(unknown);
    }
}

fn check_shape(field: &MessageField, value: &FieldValue, ctx: &Context) -> Result<(), ValueError>
{
    let ok = match (&field.multiplicity, value) {
        (Multiplicity::Single, FieldValue::Single(v))
        | (Multiplicity::Optional, FieldValue::Single(v)) => check_kind(v, &field.field_type),
        (Multiplicity::Repeated, FieldValue::Repeated(values))
        | (Multiplicity::RepeatedPacked, FieldValue::Repeated(values)) => {
            values.iter().all(|v| check_kind(v, &field.field_type))
        }
        (Multiplicity::Map, FieldValue::Map(pairs)) => match map_entry_fields(field, ctx) {
            Some((key_field, value_field)) => pairs.iter().all(|(key, value)| {
                map_key_matches(key, &key_field.field_type)
                    && check_kind(value, &value_field.field_type)
            }),
            None => false,
        },
        _ => false,
    };

    ensure!(
        ok,
        FieldTypeMismatch {
            field: field.number,
            expected: describe_field(field),
        }
    );
    Ok(())
}

fn check_kind(value: &Value, vt: &ValueType) -> bool
{
    match (value, vt) {
        (Value::Double(..), ValueType::Double) => true,
        (Value::Float(..), ValueType::Float) => true,
        (Value::Int32(..), ValueType::Int32) => true,
        (Value::Int64(..), ValueType::Int64) => true,
        (Value::UInt32(..), ValueType::UInt32) => true,
        (Value::UInt64(..), ValueType::UInt64) => true,
        (Value::SInt32(..), ValueType::SInt32) => true,
        (Value::SInt64(..), ValueType::SInt64) => true,
        (Value::Fixed32(..), ValueType::Fixed32) => true,
        (Value::Fixed64(..), ValueType::Fixed64) => true,
        (Value::SFixed32(..), ValueType::SFixed32) => true,
        (Value::SFixed64(..), ValueType::SFixed64) => true,
        (Value::Bool(..), ValueType::Bool) => true,
        (Value::String(..), ValueType::String) => true,
        (Value::Bytes(..), ValueType::Bytes) => true,
        (Value::Message(m), ValueType::Message(r)) => m.msg_ref == *r,
        (Value::Enum(e), ValueType::Enum(r)) => e.enum_ref == *r,
        _ => false,
    }
}

pub(crate) fn map_key_matches(key: &MapKey, vt: &ValueType) -> bool
{
    match (key, vt) {
        (MapKey::Int32(..), ValueType::Int32)
        | (MapKey::Int32(..), ValueType::SInt32)
        | (MapKey::Int32(..), ValueType::SFixed32) => true,
        (MapKey::Int64(..), ValueType::Int64)
        | (MapKey::Int64(..), ValueType::SInt64)
        | (MapKey::Int64(..), ValueType::SFixed64) => true,
        (MapKey::UInt32(..), ValueType::UInt32) | (MapKey::UInt32(..), ValueType::Fixed32) => true,
        (MapKey::UInt64(..), ValueType::UInt64) | (MapKey::UInt64(..), ValueType::Fixed64) => true,
        (MapKey::Bool(..), ValueType::Bool) => true,
        (MapKey::String(..), ValueType::String) => true,
        _ => false,
    }
}

fn describe_field(field: &MessageField) -> String
{
    let type_name = field.field_type.type_name();
    match field.multiplicity {
        Multiplicity::Map => "a map".to_string(),
        Multiplicity::Repeated | Multiplicity::RepeatedPacked => {
            format!("repeated {}", type_name)
        }
        Multiplicity::Single | Multiplicity::Optional => type_name.to_string(),
    }
}

/// Resolves the key and value fields of a map field's entry type.
pub(crate) fn map_entry_fields<'a>(
    field: &MessageField,
    ctx: &'a Context,
) -> Option<(&'a MessageField, &'a MessageField)>
{
    let entry = match &field.field_type {
        ValueType::Message(entry) => ctx.resolve_message(*entry),
        _ => return None,
    };
    match (entry.get_field(1), entry.get_field(2)) {
        (Some(key_field), Some(value_field)) => Some((key_field, value_field)),
        _ => None,
    }
}

/// Default value for a field kind, used for omitted map entry parts.
pub(crate) fn default_value(vt: &ValueType) -> Value
{
    match vt {
        ValueType::Double => Value::Double(0.0),
        ValueType::Float => Value::Float(0.0),
        ValueType::Int32 => Value::Int32(0),
        ValueType::Int64 => Value::Int64(0),
        ValueType::UInt32 => Value::UInt32(0),
        ValueType::UInt64 => Value::UInt64(0),
        ValueType::SInt32 => Value::SInt32(0),
        ValueType::SInt64 => Value::SInt64(0),
        ValueType::Fixed32 => Value::Fixed32(0),
        ValueType::Fixed64 => Value::Fixed64(0),
        ValueType::SFixed32 => Value::SFixed32(0),
        ValueType::SFixed64 => Value::SFixed64(0),
        ValueType::Bool => Value::Bool(false),
        ValueType::String => Value::String(String::new()),
        ValueType::Bytes => Value::Bytes(Bytes::new()),
        ValueType::Message(m) => Value::Message(Box::new(MessageValue::new(*m))),
        ValueType::Enum(e) => Value::Enum(EnumValue {
            enum_ref: *e,
            value: 0,
        }),
    }
}

pub(crate) fn value_to_map_key(value: Value) -> Option<MapKey>
{
    match value {
        Value::Int32(v) | Value::SInt32(v) | Value::SFixed32(v) => Some(MapKey::Int32(v)),
        Value::Int64(v) | Value::SInt64(v) | Value::SFixed64(v) => Some(MapKey::Int64(v)),
        Value::UInt32(v) | Value::Fixed32(v) => Some(MapKey::UInt32(v)),
        Value::UInt64(v) | Value::Fixed64(v) => Some(MapKey::UInt64(v)),
        Value::Bool(v) => Some(MapKey::Bool(v)),
        Value::String(v) => Some(MapKey::String(v)),
        _ => None,
    }
}

impl MessageRef
{
    /// Decode a binary payload of this message type.
    ///
    /// Will **panic** if the message defined by the `MessageRef` does not exist in this context.
    /// Such panic means the `MessageRef` came from a different context. The panic is not
    /// guaranteed, as a message with an equal `MessageRef` may exist in multiple contexts.
    pub fn decode(self, data: &[u8], ctx: &Context) -> Result<MessageValue, DecodeError>
    {
        ctx.resolve_message(self).decode(data, ctx)
    }
}

impl MessageInfo
{
    /// Decode a binary payload of this message type.
    ///
    /// Tags are read left to right. Unknown field numbers are preserved;
    /// non-repeated fields occurring more than once keep their last
    /// occurrence; repeated scalars are accepted both packed and expanded.
    pub fn decode(&self, data: &[u8], ctx: &Context) -> Result<MessageValue, DecodeError>
    {
        self.decode_at_depth(data, ctx, 0)
    }

    pub(crate) fn decode_at_depth(
        &self,
        mut data: &[u8],
        ctx: &Context,
        depth: usize,
    ) -> Result<MessageValue, DecodeError>
    {
        ensure!(depth < MAX_DEPTH, DepthLimitExceeded { limit: MAX_DEPTH });

        let mut msg = MessageValue::new(self.self_ref);
        while !data.is_empty() {
            let (number, wire_type) = read_tag(&mut data)?;
            match self.get_field(number) {
                Some(field) => {
                    decode_field(&mut msg, self, field, wire_type, &mut data, ctx, depth)?
                }
                None => {
                    let value = UnknownValue::decode(wire_type, &mut data)?;
                    msg.push_unknown(UnknownField { number, value });
                }
            }
        }

        Ok(msg)
    }
}

fn decode_field(
    msg: &mut MessageValue,
    info: &MessageInfo,
    field: &MessageField,
    wire_type: u8,
    data: &mut &[u8],
    ctx: &Context,
    depth: usize,
) -> Result<(), DecodeError>
{
    match field.multiplicity {
        Multiplicity::Map => {
            ensure!(
                wire_type == 2,
                WireTypeMismatch {
                    field: field.number,
                    expected: 2u8,
                    actual: wire_type,
                }
            );
            let payload = read_length_delimited(data)?;
            let (key, value) = decode_map_entry(field, payload, ctx, depth)?;
            msg.insert_map_entry(field.number, key, value);
        }

        Multiplicity::Repeated | Multiplicity::RepeatedPacked => {
            let declared = field.field_type.wire_type();
            if wire_type == 2 && declared != 2 {
                // A packed run of scalar values, regardless of the declared
                // packedness.
                let mut run = read_length_delimited(data)?;
                while !run.is_empty() {
                    let value = decode_value(&field.field_type, &mut run, ctx, depth)?;
                    msg.push_repeated(field.number, value);
                }
            } else {
                ensure!(
                    wire_type == declared,
                    WireTypeMismatch {
                        field: field.number,
                        expected: declared,
                        actual: wire_type,
                    }
                );
                let value = decode_value(&field.field_type, data, ctx, depth)?;
                msg.push_repeated(field.number, value);
            }
        }

        Multiplicity::Single | Multiplicity::Optional => {
            let declared = field.field_type.wire_type();
            ensure!(
                wire_type == declared,
                WireTypeMismatch {
                    field: field.number,
                    expected: declared,
                    actual: wire_type,
                }
            );
            let value = decode_value(&field.field_type, data, ctx, depth)?;
            msg.insert_field(info, field.number, FieldValue::Single(value));
        }
    }

    Ok(())
}

fn decode_map_entry(
    field: &MessageField,
    mut payload: &[u8],
    ctx: &Context,
    depth: usize,
) -> Result<(MapKey, Value), DecodeError>
{
    let (key_field, value_field) = match map_entry_fields(field, ctx) {
        Some(pair) => pair,
        None => panic!("Map field without an entry type"),
    };

    let mut key = None;
    let mut value = None;
    while !payload.is_empty() {
        let (number, wire_type) = read_tag(&mut payload)?;
        match number {
            1 => {
                ensure!(
                    wire_type == key_field.field_type.wire_type(),
                    WireTypeMismatch {
                        field: 1u64,
                        expected: key_field.field_type.wire_type(),
                        actual: wire_type,
                    }
                );
                key = Some(decode_value(&key_field.field_type, &mut payload, ctx, depth + 1)?);
            }
            2 => {
                ensure!(
                    wire_type == value_field.field_type.wire_type(),
                    WireTypeMismatch {
                        field: 2u64,
                        expected: value_field.field_type.wire_type(),
                        actual: wire_type,
                    }
                );
                value =
                    Some(decode_value(&value_field.field_type, &mut payload, ctx, depth + 1)?);
            }
            _ => {
                UnknownValue::decode(wire_type, &mut payload)?;
            }
        }
    }

    // An omitted key or value falls back to the kind's default.
    let key = key.unwrap_or_else(|| default_value(&key_field.field_type));
    let value = value.unwrap_or_else(|| default_value(&value_field.field_type));
    let key = match value_to_map_key(key) {
        Some(key) => key,
        None => panic!("Map entry with a non-scalar key type"),
    };
    Ok((key, value))
}

fn decode_value(
    vt: &ValueType,
    data: &mut &[u8],
    ctx: &Context,
    depth: usize,
) -> Result<Value, DecodeError>
{
    Ok(match vt {
        ValueType::Double => Value::Double(f64::from_le_bytes(read_8_bytes(data)?)),
        ValueType::Float => Value::Float(f32::from_le_bytes(read_4_bytes(data)?)),
        ValueType::Int32 => Value::Int32(read_varint(data)? as i32),
        ValueType::Int64 => Value::Int64(read_varint(data)? as i64),
        ValueType::UInt32 => Value::UInt32(read_varint(data)? as u32),
        ValueType::UInt64 => Value::UInt64(read_varint(data)?),
        ValueType::SInt32 => {
            let v = read_varint(data)? as u32;
            Value::SInt32(((v >> 1) as i32) ^ -((v & 1) as i32))
        }
        ValueType::SInt64 => {
            let v = read_varint(data)?;
            Value::SInt64(((v >> 1) as i64) ^ -((v & 1) as i64))
        }
        ValueType::Fixed32 => Value::Fixed32(u32::from_le_bytes(read_4_bytes(data)?)),
        ValueType::Fixed64 => Value::Fixed64(u64::from_le_bytes(read_8_bytes(data)?)),
        ValueType::SFixed32 => Value::SFixed32(i32::from_le_bytes(read_4_bytes(data)?)),
        ValueType::SFixed64 => Value::SFixed64(i64::from_le_bytes(read_8_bytes(data)?)),
        ValueType::Bool => Value::Bool(read_varint(data)? != 0),
        ValueType::String => {
            let payload = read_length_delimited(data)?;
            Value::String(String::from_utf8_lossy(payload).to_string())
        }
        ValueType::Bytes => Value::Bytes(Bytes::copy_from_slice(read_length_delimited(data)?)),
        ValueType::Enum(e) => Value::Enum(EnumValue {
            enum_ref: *e,
            value: read_varint(data)? as i64,
        }),
        ValueType::Message(m) => {
            let payload = read_length_delimited(data)?;
            let inner = ctx
                .resolve_message(*m)
                .decode_at_depth(payload, ctx, depth + 1)?;
            Value::Message(Box::new(inner))
        }
    })
}

impl UnknownValue
{
    pub(crate) fn decode(wire_type: u8, data: &mut &[u8]) -> Result<Self, DecodeError>
    {
        Ok(match wire_type {
            0 => UnknownValue::Varint(read_varint(data)?),
            1 => UnknownValue::Fixed64(u64::from_le_bytes(read_8_bytes(data)?)),
            2 => UnknownValue::VariableLength(Bytes::copy_from_slice(read_length_delimited(
                data,
            )?)),
            5 => UnknownValue::Fixed32(u32::from_le_bytes(read_4_bytes(data)?)),
            other => return InvalidWireType { wire_type: other }.fail(),
        })
    }
}

pub(crate) fn read_tag(data: &mut &[u8]) -> Result<(u64, u8), DecodeError>
{
    let tag = read_varint(data)?;
    let number = tag >> 3;
    let wire_type = (tag & 0x07) as u8;
    ensure!(number != 0, InvalidFieldNumber);
    ensure!(
        matches!(wire_type, 0 | 1 | 2 | 5),
        InvalidWireType { wire_type }
    );
    Ok((number, wire_type))
}

pub(crate) fn read_varint(data: &mut &[u8]) -> Result<u64, DecodeError>
{
    let mut result = 0u64;
    for idx in 0..10 {
        let b = match data.get(idx) {
            Some(b) => *b,
            None => return TruncatedInput.fail(),
        };
        // The tenth byte may carry bits past the 64th; they are discarded
        // the same way the reference implementations do.
        result |= u64::from(b & 0x7f) << (idx * 7);
        if b & 0x80 == 0 {
            *data = &data[idx + 1..];
            return Ok(result);
        }
    }
    MalformedVarint.fail()
}

pub(crate) fn read_length_delimited<'a>(data: &mut &'a [u8]) -> Result<&'a [u8], DecodeError>
{
    let len = read_varint(data)?;
    let len = usize::try_from(len)
        .ok()
        .filter(|len| *len <= data.len())
        .context(TruncatedInput)?;
    let (payload, rest) = data.split_at(len);
    *data = rest;
    Ok(payload)
}

pub(crate) fn read_8_bytes(data: &mut &[u8]) -> Result<[u8; 8], DecodeError>
{
    ensure!(data.len() >= 8, TruncatedInput);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&data[..8]);
    *data = &data[8..];
    Ok(bytes)
}

pub(crate) fn read_4_bytes(data: &mut &[u8]) -> Result<[u8; 4], DecodeError>
{
    ensure!(data.len() >= 4, TruncatedInput);
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&data[..4]);
    *data = &data[4..];
    Ok(bytes)
}

pub(crate) fn skip_value(data: &mut &[u8], wire_type: u8) -> Result<(), DecodeError>
{
    match wire_type {
        0 => {
            read_varint(data)?;
        }
        1 => {
            read_8_bytes(data)?;
        }
        2 => {
            read_length_delimited(data)?;
        }
        5 => {
            read_4_bytes(data)?;
        }
        other => return InvalidWireType { wire_type: other }.fail(),
    }
    Ok(())
}
