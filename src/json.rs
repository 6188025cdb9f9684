//! Canonical JSON mapping for dynamic messages.
//!
//! Field keys use the schema's JSON names, 64-bit integers travel as
//! decimal strings, `bytes` fields as base64 and enums as their declared
//! names. Decoding follows the usual coercion rules (numbers from strings,
//! enum names or raw numbers) and can either reject or ignore unknown keys.

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine as _;
use bytes::Bytes;
use serde_json::{Map, Value as JsonValue};
use snafu::{OptionExt, ResultExt, Snafu};

use crate::context::*;
use crate::decode::{map_entry_fields, EnumValue, FieldValue, MapKey, MessageValue, Value};

/// Options controlling JSON decoding.
#[derive(Debug, Clone)]
pub struct JsonOptions
{
    /// When true, object keys that match no field are ignored instead of
    /// rejected.
    pub ignore_unknown_fields: bool,
}

impl JsonOptions
{
    /// Strict mode: unknown keys are an error.
    pub fn strict() -> Self
    {
        JsonOptions {
            ignore_unknown_fields: false,
        }
    }

    /// Lenient mode: unknown keys are skipped.
    pub fn lenient() -> Self
    {
        JsonOptions {
            ignore_unknown_fields: true,
        }
    }
}

impl Default for JsonOptions
{
    fn default() -> Self
    {
        JsonOptions::strict()
    }
}

/// Error decoding a JSON payload into a message.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum JsonError
{
    /// The payload is not valid JSON.
    #[snafu(display("Invalid JSON: {}", source))]
    Syntax
    {
        /// Parser failure.
        source: serde_json::Error,
    },

    /// The value for a message field was not a JSON object.
    #[snafu(display("Expected a JSON object for message '{}'", message))]
    NotAnObject
    {
        /// The message type being decoded.
        message: String,
    },

    /// An object key matched no field of the message.
    #[snafu(display("Unknown field '{}' for message '{}'", name, message))]
    UnknownField
    {
        /// The unmatched key.
        name: String,

        /// The message type being decoded.
        message: String,
    },

    /// A value's JSON shape contradicts the field's multiplicity.
    #[snafu(display("Field '{}' expects {}", field, expected))]
    ShapeMismatch
    {
        /// Field name.
        field: String,

        /// The expected JSON shape.
        expected: &'static str,
    },

    /// A value could not be coerced to the field's scalar kind.
    #[snafu(display("Invalid value for field '{}': expected {}", field, expected))]
    InvalidValue
    {
        /// Field name.
        field: String,

        /// What the coercion table accepts for the kind.
        expected: &'static str,
    },
}

impl MessageValue
{
    /// Renders the message into its canonical JSON representation.
    ///
    /// Only explicitly present fields are emitted. Unknown fields have no
    /// JSON representation and are omitted.
    pub fn to_json(&self, ctx: &Context) -> JsonValue
    {
        let info = ctx.resolve_message(self.msg_ref);
        let mut object = Map::new();
        for (number, value) in self.fields() {
            let field = match info.get_field(number) {
                Some(field) => field,
                None => continue,
            };
            object.insert(field.json_name.clone(), field_to_json(field, value, ctx));
        }
        JsonValue::Object(object)
    }

    /// Renders the message into compact JSON text.
    pub fn to_json_string(&self, ctx: &Context) -> String
    {
        self.to_json(ctx).to_string()
    }
}

impl MessageInfo
{
    /// Decodes a message of this type from its JSON representation.
    pub fn decode_json(
        &self,
        json: &JsonValue,
        ctx: &Context,
        options: &JsonOptions,
    ) -> Result<MessageValue, JsonError>
    {
        let object = match json {
            JsonValue::Object(object) => object,
            _ => {
                return NotAnObject {
                    message: self.full_name.clone(),
                }
                .fail()
            }
        };

        let mut msg = MessageValue::new(self.self_ref);
        for (key, value) in object {
            let field = match self
                .get_field_by_json_name(key)
                .or_else(|| self.get_field_by_name(key))
            {
                Some(field) => field,
                None if options.ignore_unknown_fields => continue,
                None => {
                    return UnknownField {
                        name: key.clone(),
                        message: self.full_name.clone(),
                    }
                    .fail()
                }
            };

            // null means absent.
            if value.is_null() {
                continue;
            }

            let field_value = json_to_field(field, value, ctx, options)?;
            msg.insert_field(self, field.number, field_value);
        }

        Ok(msg)
    }

    /// Decodes a message of this type from JSON text.
    pub fn decode_json_str(
        &self,
        text: &str,
        ctx: &Context,
        options: &JsonOptions,
    ) -> Result<MessageValue, JsonError>
    {
        let json = serde_json::from_str(text).context(Syntax)?;
        self.decode_json(&json, ctx, options)
    }
}

fn field_to_json(field: &MessageField, value: &FieldValue, ctx: &Context) -> JsonValue
{
    match value {
        FieldValue::Single(value) => value_to_json(value, ctx),
        FieldValue::Repeated(values) => {
            JsonValue::Array(values.iter().map(|v| value_to_json(v, ctx)).collect())
        }
        FieldValue::Map(pairs) => {
            let mut object = Map::new();
            for (key, value) in pairs {
                object.insert(map_key_string(key), value_to_json(value, ctx));
            }
            JsonValue::Object(object)
        }
    }
}

fn value_to_json(value: &Value, ctx: &Context) -> JsonValue
{
    match value {
        Value::Double(v) => float_to_json(*v),
        Value::Float(v) => float_to_json(f64::from(*v)),
        Value::Int32(v) => JsonValue::Number((*v as i64).into()),
        Value::SInt32(v) => JsonValue::Number((*v as i64).into()),
        Value::SFixed32(v) => JsonValue::Number((*v as i64).into()),
        Value::UInt32(v) => JsonValue::Number((*v as u64).into()),
        Value::Fixed32(v) => JsonValue::Number((*v as u64).into()),

        // 64-bit integers travel as strings to survive JSON number
        // precision limits.
        Value::Int64(v) => JsonValue::String(v.to_string()),
        Value::SInt64(v) => JsonValue::String(v.to_string()),
        Value::SFixed64(v) => JsonValue::String(v.to_string()),
        Value::UInt64(v) => JsonValue::String(v.to_string()),
        Value::Fixed64(v) => JsonValue::String(v.to_string()),

        Value::Bool(v) => JsonValue::Bool(*v),
        Value::String(v) => JsonValue::String(v.clone()),
        Value::Bytes(v) => JsonValue::String(STANDARD.encode(v)),

        Value::Enum(e) => match ctx.resolve_enum(e.enum_ref).get_field_by_value(e.value) {
            Some(field) => JsonValue::String(field.name.clone()),
            None => JsonValue::Number(e.value.into()),
        },

        Value::Message(m) => m.to_json(ctx),
    }
}

fn float_to_json(value: f64) -> JsonValue
{
    match serde_json::Number::from_f64(value) {
        Some(number) => JsonValue::Number(number),
        None if value.is_nan() => JsonValue::String("NaN".to_string()),
        None if value > 0.0 => JsonValue::String("Infinity".to_string()),
        None => JsonValue::String("-Infinity".to_string()),
    }
}

fn map_key_string(key: &MapKey) -> String
{
    match key {
        MapKey::Int32(v) => v.to_string(),
        MapKey::Int64(v) => v.to_string(),
        MapKey::UInt32(v) => v.to_string(),
        MapKey::UInt64(v) => v.to_string(),
        MapKey::Bool(v) => v.to_string(),
        MapKey::String(v) => v.clone(),
    }
}

fn json_to_field(
    field: &MessageField,
    json: &JsonValue,
    ctx: &Context,
    options: &JsonOptions,
) -> Result<FieldValue, JsonError>
{
    match field.multiplicity {
        Multiplicity::Repeated | Multiplicity::RepeatedPacked => match json {
            JsonValue::Array(items) => {
                let values = items
                    .iter()
                    .map(|item| json_to_value(field, &field.field_type, item, ctx, options))
                    .collect::<Result<_, _>>()?;
                Ok(FieldValue::Repeated(values))
            }
            _ => ShapeMismatch {
                field: field.name.clone(),
                expected: "an array",
            }
            .fail(),
        },

        Multiplicity::Map => match json {
            JsonValue::Object(object) => {
                let (key_field, value_field) = match map_entry_fields(field, ctx) {
                    Some(pair) => pair,
                    None => panic!("Map field without an entry type"),
                };
                let mut pairs = Vec::with_capacity(object.len());
                for (key, value) in object {
                    let key = map_key_from_str(key, &key_field.field_type, field)?;
                    let value =
                        json_to_value(field, &value_field.field_type, value, ctx, options)?;
                    pairs.push((key, value));
                }
                Ok(FieldValue::Map(pairs))
            }
            _ => ShapeMismatch {
                field: field.name.clone(),
                expected: "an object",
            }
            .fail(),
        },

        Multiplicity::Single | Multiplicity::Optional => match json {
            JsonValue::Array(..) => ShapeMismatch {
                field: field.name.clone(),
                expected: "a single value",
            }
            .fail(),
            _ => Ok(FieldValue::Single(json_to_value(
                field,
                &field.field_type,
                json,
                ctx,
                options,
            )?)),
        },
    }
}

fn json_to_value(
    field: &MessageField,
    vt: &ValueType,
    json: &JsonValue,
    ctx: &Context,
    options: &JsonOptions,
) -> Result<Value, JsonError>
{
    Ok(match vt {
        ValueType::Double => Value::Double(json_to_f64(field, json)?),
        ValueType::Float => Value::Float(json_to_f64(field, json)? as f32),

        ValueType::Int32 => Value::Int32(json_to_i32(field, json)?),
        ValueType::SInt32 => Value::SInt32(json_to_i32(field, json)?),
        ValueType::SFixed32 => Value::SFixed32(json_to_i32(field, json)?),
        ValueType::Int64 => Value::Int64(json_to_i64(field, json)?),
        ValueType::SInt64 => Value::SInt64(json_to_i64(field, json)?),
        ValueType::SFixed64 => Value::SFixed64(json_to_i64(field, json)?),
        ValueType::UInt32 => Value::UInt32(json_to_u32(field, json)?),
        ValueType::Fixed32 => Value::Fixed32(json_to_u32(field, json)?),
        ValueType::UInt64 => Value::UInt64(json_to_u64(field, json)?),
        ValueType::Fixed64 => Value::Fixed64(json_to_u64(field, json)?),

        ValueType::Bool => match json {
            JsonValue::Bool(v) => Value::Bool(*v),
            _ => {
                return InvalidValue {
                    field: field.name.clone(),
                    expected: "a boolean",
                }
                .fail()
            }
        },

        ValueType::String => match json {
            JsonValue::String(v) => Value::String(v.clone()),
            _ => {
                return InvalidValue {
                    field: field.name.clone(),
                    expected: "a string",
                }
                .fail()
            }
        },

        ValueType::Bytes => match json {
            JsonValue::String(v) => {
                let payload = STANDARD
                    .decode(v)
                    .or_else(|_| URL_SAFE.decode(v))
                    .ok()
                    .context(InvalidValue {
                        field: field.name.clone(),
                        expected: "base64 data",
                    })?;
                Value::Bytes(Bytes::from(payload))
            }
            _ => {
                return InvalidValue {
                    field: field.name.clone(),
                    expected: "base64 data",
                }
                .fail()
            }
        },

        ValueType::Enum(e) => {
            let value = match json {
                JsonValue::String(name) => ctx
                    .resolve_enum(*e)
                    .get_field_by_name(name)
                    .map(|f| f.value)
                    .context(InvalidValue {
                        field: field.name.clone(),
                        expected: "an enum name or number",
                    })?,
                JsonValue::Number(n) => n.as_i64().context(InvalidValue {
                    field: field.name.clone(),
                    expected: "an enum name or number",
                })?,
                _ => {
                    return InvalidValue {
                        field: field.name.clone(),
                        expected: "an enum name or number",
                    }
                    .fail()
                }
            };
            Value::Enum(EnumValue {
                enum_ref: *e,
                value,
            })
        }

        ValueType::Message(m) => {
            let inner = ctx.resolve_message(*m).decode_json(json, ctx, options)?;
            Value::Message(Box::new(inner))
        }
    })
}

fn json_to_i32(field: &MessageField, json: &JsonValue) -> Result<i32, JsonError>
{
    json_integer(json)
        .and_then(|v| if v >= i64::from(i32::min_value()) && v <= i64::from(i32::max_value()) {
            Some(v as i32)
        } else {
            None
        })
        .context(InvalidValue {
            field: field.name.clone(),
            expected: "a 32-bit integer",
        })
}

fn json_to_i64(field: &MessageField, json: &JsonValue) -> Result<i64, JsonError>
{
    json_integer(json).context(InvalidValue {
        field: field.name.clone(),
        expected: "a 64-bit integer",
    })
}

fn json_to_u32(field: &MessageField, json: &JsonValue) -> Result<u32, JsonError>
{
    json_unsigned(json)
        .and_then(|v| if v <= u64::from(u32::max_value()) { Some(v as u32) } else { None })
        .context(InvalidValue {
            field: field.name.clone(),
            expected: "an unsigned 32-bit integer",
        })
}

fn json_to_u64(field: &MessageField, json: &JsonValue) -> Result<u64, JsonError>
{
    json_unsigned(json).context(InvalidValue {
        field: field.name.clone(),
        expected: "an unsigned 64-bit integer",
    })
}

fn json_integer(json: &JsonValue) -> Option<i64>
{
    match json {
        JsonValue::Number(n) => n.as_i64().or_else(|| {
            // Exponent forms like 1e3 parse as floats; accept them when the
            // value is a whole number.
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0)
                .map(|f| f as i64)
        }),
        JsonValue::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn json_unsigned(json: &JsonValue) -> Option<u64>
{
    match json {
        JsonValue::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f < 9_007_199_254_740_992.0)
                .map(|f| f as u64)
        }),
        JsonValue::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn json_to_f64(field: &MessageField, json: &JsonValue) -> Result<f64, JsonError>
{
    match json {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => match s.as_str() {
            "NaN" => Some(std::f64::NAN),
            "Infinity" => Some(std::f64::INFINITY),
            "-Infinity" => Some(std::f64::NEG_INFINITY),
            other => other.parse().ok(),
        },
        _ => None,
    }
    .context(InvalidValue {
        field: field.name.clone(),
        expected: "a number",
    })
}

fn map_key_from_str(
    key: &str,
    vt: &ValueType,
    field: &MessageField,
) -> Result<MapKey, JsonError>
{
    let parsed = match vt {
        ValueType::Int32 | ValueType::SInt32 | ValueType::SFixed32 => {
            key.parse().ok().map(MapKey::Int32)
        }
        ValueType::Int64 | ValueType::SInt64 | ValueType::SFixed64 => {
            key.parse().ok().map(MapKey::Int64)
        }
        ValueType::UInt32 | ValueType::Fixed32 => key.parse().ok().map(MapKey::UInt32),
        ValueType::UInt64 | ValueType::Fixed64 => key.parse().ok().map(MapKey::UInt64),
        ValueType::Bool => match key {
            "true" => Some(MapKey::Bool(true)),
            "false" => Some(MapKey::Bool(false)),
            _ => None,
        },
        ValueType::String => Some(MapKey::String(key.to_string())),
        _ => panic!("Map entry with a non-scalar key type"),
    };

    parsed.context(InvalidValue {
        field: field.name.clone(),
        expected: "a map key of the declared kind",
    })
}
