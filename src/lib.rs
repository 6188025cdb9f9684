//!
//! Protodyn resolves protocol buffer message types at runtime from a
//! serialized `FileDescriptorSet` and converts payloads between JSON and
//! the binary wire format. No bindings are generated; the descriptors are
//! the only schema source.
//!
//! ```
//! use protodyn::{convert, Context};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // A descriptor set holding person.proto with
//! // `message Person { string name = 1; int32 age = 2; }`.
//! let descriptor_set = b"\x0a\x3b\
//!     \x0a\x0cperson.proto\
//!     \x22\x23\
//!     \x0a\x06Person\
//!     \x12\x0c\x0a\x04name\x18\x01\x20\x01\x28\x09\
//!     \x12\x0b\x0a\x03age\x18\x02\x20\x01\x28\x05\
//!     \x62\x06proto3";
//!
//! let context = Context::from_descriptor_set(descriptor_set)?;
//! let person = context.resolve_type("person.proto", "Person")?;
//!
//! let wire = convert::json_to_wire(&person, r#"{"name":"Ann","age":30}"#)?;
//! assert_eq!(&wire[..], b"\x0a\x03Ann\x10\x1e");
//!
//! let json = convert::wire_to_json(&person, &wire)?;
//! assert_eq!(json, r#"{"age":30,"name":"Ann"}"#);
//! # Ok(())
//! # }
//! ```
#![warn(missing_docs)]
#![allow(clippy::match_bool)]

pub mod context;
pub mod convert;
pub mod decode;
pub mod encode;
pub mod json;

pub use context::{Context, TypeHandle};
pub use convert::{MessageInput, Schema};
pub use decode::{FieldValue, MapKey, MessageValue, UnknownValue, Value};
