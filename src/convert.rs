//! Conversion facade tying the registry and the two codecs together.
//!
//! Each operation is a pure composition: resolve a type handle, decode the
//! payload with one codec, re-encode it with the other (or discard it for
//! pure validation). Every failure propagates as a typed error; no path
//! returns silently.

use bytes::Bytes;
use snafu::{ensure, ResultExt, Snafu};

use crate::context::{Context, MessageRef, SchemaError, TypeHandle};
use crate::decode::{DecodeError, MessageValue};
use crate::json::{JsonError, JsonOptions};

/// Error running a conversion or validation.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ConvertError
{
    /// The descriptor set could not be decoded.
    #[snafu(display("{}", source))]
    InvalidSchema
    {
        /// Registry construction failure.
        source: SchemaError,
    },

    /// The requested file or type could not be resolved.
    #[snafu(display("{}", source))]
    ResolveFailed
    {
        /// Resolution failure.
        source: crate::context::ResolveError,
    },

    /// The binary payload does not conform to the schema.
    #[snafu(display("Invalid wire payload: {}", source))]
    InvalidWire
    {
        /// Wire decode failure.
        source: DecodeError,
    },

    /// The JSON payload does not conform to the schema.
    #[snafu(display("Invalid JSON payload: {}", source))]
    InvalidJson
    {
        /// JSON decode failure.
        source: JsonError,
    },

    /// A pre-built value targets a different message type than the handle.
    #[snafu(display("Value is for a different message type"))]
    WrongMessageType,
}

/// A message payload in one of the supported input shapes.
///
/// Anything that is not one of these shapes is rejected at the boundary
/// before it reaches the codecs.
#[derive(Debug, Clone)]
pub enum MessageInput
{
    /// Binary wire format bytes.
    Wire(Bytes),

    /// JSON text.
    Json(String),

    /// An already decoded dynamic message.
    Value(MessageValue),
}

/// A message type resolved together with the registry that owns it.
///
/// The one-stop entry point for callers that hold descriptor set bytes, a
/// file path and a type name, mirroring the conversion operations' process
/// boundary.
#[derive(Debug)]
pub struct Schema
{
    context: Context,
    message: MessageRef,
}

impl Schema
{
    /// Decodes the descriptor set and resolves the message type in one
    /// step.
    pub fn compile(
        descriptor_set: &[u8],
        file_path: &str,
        type_name: &str,
    ) -> Result<Self, ConvertError>
    {
        let context = Context::from_descriptor_set(descriptor_set).context(InvalidSchema)?;
        let message = context
            .resolve_type(file_path, type_name)
            .context(ResolveFailed)?
            .message();
        Ok(Schema { context, message })
    }

    /// The registry built from the descriptor set.
    pub fn context(&self) -> &Context
    {
        &self.context
    }

    /// A handle to the resolved message type.
    pub fn handle(&self) -> TypeHandle<'_>
    {
        TypeHandle::for_message(&self.context, self.message)
    }
}

/// Converts JSON text into the binary wire format of the handle's type.
pub fn json_to_wire(handle: &TypeHandle<'_>, text: &str) -> Result<Bytes, ConvertError>
{
    let value = handle
        .info()
        .decode_json_str(text, handle.context(), &JsonOptions::strict())
        .context(InvalidJson)?;
    Ok(value.encode(handle.context()).freeze())
}

/// Converts binary wire format bytes into JSON text of the handle's type.
pub fn wire_to_json(handle: &TypeHandle<'_>, data: &[u8]) -> Result<String, ConvertError>
{
    let value = handle.decode(data).context(InvalidWire)?;
    Ok(value.to_json_string(handle.context()))
}

/// Validates that a payload conforms to the handle's type.
///
/// The input is normalized to wire bytes and decoded against the schema;
/// the decoded value is discarded.
pub fn validate(handle: &TypeHandle<'_>, input: MessageInput) -> Result<(), ConvertError>
{
    let data = match input {
        MessageInput::Wire(data) => data,
        MessageInput::Json(text) => json_to_wire(handle, &text)?,
        MessageInput::Value(value) => {
            ensure!(value.msg_ref == handle.message(), WrongMessageType);
            value.encode(handle.context()).freeze()
        }
    };

    handle.decode(&data).context(InvalidWire)?;
    Ok(())
}
