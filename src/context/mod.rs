//! Decoding context built from a serialized descriptor set.

use std::collections::{BTreeMap, HashMap};

use snafu::Snafu;

mod api;
mod bootstrap;
mod builder;

pub use api::{ResolveError, TypeHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct InternalRef(usize);

/// A reference to a message. Can be resolved to `MessageInfo` through a `Context`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef(InternalRef);

/// A reference to an enum. Can be resolved to `EnumInfo` through a `Context`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumRef(InternalRef);

/// A reference to a file in the descriptor set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileRef(InternalRef);

/// A reference to a `oneof` declaration within a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OneofRef(InternalRef);

/// Error building a context from descriptor set bytes.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum SchemaError
{
    /// The input is not a valid serialized `FileDescriptorSet`.
    #[snafu(display("Malformed descriptor set: {}", source))]
    InvalidDescriptor
    {
        /// Wire-level failure that broke the descriptor decode.
        source: crate::decode::DecodeError,
    },

    /// A file or type descriptor carried no name.
    #[snafu(display("Descriptor in '{}' is missing a name", context))]
    MissingName
    {
        /// The enclosing file or type.
        context: String,
    },

    /// Two files in the set share the same path.
    #[snafu(display("Duplicate file: {}", path))]
    DuplicateFile
    {
        /// File path.
        path: String,
    },

    /// Duplicate type.
    #[snafu(display("Duplicate type: {}", name))]
    DuplicateType
    {
        /// Type.
        name: String,
    },

    /// Two fields of one message share a field number.
    #[snafu(display("Duplicate field {} in '{}'", number, message))]
    DuplicateField
    {
        /// Field number.
        number: u64,

        /// Message declaring the fields.
        message: String,
    },

    /// Unknown type reference.
    #[snafu(display("Unknown type '{}' in '{}'", name, context))]
    TypeNotFound
    {
        /// Type name.
        name: String,
        /// Type that referred to the unknown type.
        context: String,
    },

    /// Wrong kind of type used in a specific context.
    #[snafu(display(
        "Invalid type '{}' ({:?}) for {}, expected {:?}",
        type_name,
        actual,
        context,
        expected
    ))]
    InvalidTypeKind
    {
        /// Type that is of the wrong kind.
        type_name: String,

        /// The context where the type was used.
        context: &'static str,

        /// Expected item type.
        expected: ItemType,

        /// Actual item type.
        actual: ItemType,
    },

    /// Field number outside the protobuf range.
    #[snafu(display("Invalid field number {} for field '{}'", number, name))]
    InvalidFieldNumber
    {
        /// Field name.
        name: String,

        /// Declared number.
        number: i64,
    },

    /// Unrecognized field type code in the descriptor.
    #[snafu(display("Unknown type code {} for field '{}'", code, name))]
    InvalidTypeCode
    {
        /// Field name.
        name: String,

        /// The type code.
        code: i64,
    },

    /// Unrecognized field label code in the descriptor.
    #[snafu(display("Unknown label {} for field '{}'", code, name))]
    InvalidLabel
    {
        /// Field name.
        name: String,

        /// The label code.
        code: i64,
    },

    /// A field referenced a `oneof` declaration that does not exist.
    #[snafu(display("Field '{}' refers to missing oneof {}", name, index))]
    InvalidOneofIndex
    {
        /// Field name.
        name: String,

        /// The out-of-range index.
        index: i64,
    },

    /// A map entry type does not declare the key and value fields.
    #[snafu(display("Map entry type '{}' is missing its key or value field", name))]
    MissingMapEntryField
    {
        /// The entry type name.
        name: String,
    },

    /// A map key field has a type that cannot key a map.
    #[snafu(display("Map entry type '{}' has an invalid key type", name))]
    InvalidMapKey
    {
        /// The entry type name.
        name: String,
    },
}

/// Type reference that references either message or enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeRef
{
    /// Message type reference.
    Message(MessageRef),

    /// Enum type reference.
    Enum(EnumRef),
}

/// Protobuf item type
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ItemType
{
    /// `message` item
    Message,

    /// `enum` item
    Enum,
}

/// Protodyn decoding context.
///
/// Contains the type information decoded from a serialized
/// `FileDescriptorSet`. Required for decoding and encoding payloads of the
/// contained message types. Read-only once built; safe to share between
/// concurrent conversions.
#[derive(Debug, PartialEq)]
pub struct Context
{
    files: Vec<FileInfo>,
    files_by_path: HashMap<String, usize>,
    types: Vec<TypeInfo>,
    types_by_name: HashMap<String, usize>,
}

/// Declared syntax of a schema file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax
{
    /// `syntax = "proto2"` (or no declaration).
    Proto2,

    /// `syntax = "proto3"`.
    Proto3,
}

/// A single schema file within the descriptor set.
#[derive(Debug, PartialEq)]
#[non_exhaustive]
pub struct FileInfo
{
    /// File path, unique within the set.
    pub path: String,

    /// Package name, if the file declares one.
    pub package: Option<String>,

    /// Declared syntax.
    pub syntax: Syntax,

    /// `FileRef` that references this file.
    pub self_ref: FileRef,

    /// Types declared at the top level of the file.
    pub types: Vec<TypeRef>,
}

/// Message or enum type.
#[derive(Debug, PartialEq)]
pub enum TypeInfo
{
    /// Message.
    Message(MessageInfo),

    /// Enum.
    Enum(EnumInfo),
}

/// Message details
#[derive(Debug, PartialEq)]
#[non_exhaustive]
pub struct MessageInfo
{
    /// Message name.
    pub name: String,

    /// Full message name, including package and parent type names.
    pub full_name: String,

    /// Parent
    pub parent: TypeParent,

    /// `MessageRef` that references this message.
    pub self_ref: MessageRef,

    /// `oneof` structures defined within the message.
    pub oneofs: Vec<Oneof>,

    /// References to the inner types defined within this message.
    pub inner_types: Vec<TypeRef>,

    /// True if this message is a synthesized map entry type.
    pub map_entry: bool,

    // Using BTreeMap here to ensure ordering.
    fields: BTreeMap<u64, MessageField>,
    fields_by_name: BTreeMap<String, u64>,
    fields_by_json_name: BTreeMap<String, u64>,
}

/// Reference to a type parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeParent
{
    /// Reference to a file for top-level types.
    File(FileRef),

    /// Reference to a message for inner types.
    Message(MessageRef),
}

/// Enum details
#[derive(Debug, PartialEq)]
#[non_exhaustive]
pub struct EnumInfo
{
    /// Enum name.
    pub name: String,

    /// Full enum name, including package and parent type names.
    pub full_name: String,

    /// Parent
    pub parent: TypeParent,

    /// `EnumRef` that references this enum.
    pub self_ref: EnumRef,

    fields_by_value: BTreeMap<i64, EnumField>,
    fields_by_name: BTreeMap<String, i64>,
}

/// Message field details.
#[derive(Debug, PartialEq)]
#[non_exhaustive]
pub struct MessageField
{
    /// Field name.
    pub name: String,

    /// Name used in the JSON mapping: the descriptor's `json_name` when
    /// present, otherwise the lowerCamel transform of the declared name.
    pub json_name: String,

    /// Field number.
    pub number: u64,

    /// Field type
    pub field_type: ValueType,

    /// Multiplicity of the field values.
    pub multiplicity: Multiplicity,

    /// Reference to the `oneof` structure in the parent type if this field
    /// is part of a `oneof`.
    pub oneof: Option<OneofRef>,
}

/// Defines the multiplicity of the field values.
#[derive(Debug, PartialEq)]
pub enum Multiplicity
{
    /// Field is not repeated.
    Single,

    /// Field is not repeated and tracks explicit presence.
    Optional,

    /// Field may be repeated.
    Repeated,

    /// Field is repeated by packing.
    RepeatedPacked,

    /// Field is a map.
    Map,
}

/// Message `oneof` details.
#[derive(Debug, PartialEq)]
#[non_exhaustive]
pub struct Oneof
{
    /// Name of the `oneof` structure.
    pub name: String,

    /// Self reference of the `Oneof` in the owning type.
    pub self_ref: OneofRef,

    /// Field numbers of the fields contained in the `oneof`.
    pub fields: Vec<u64>,
}

/// Enum field details.
#[derive(Debug, PartialEq, Clone)]
#[non_exhaustive]
pub struct EnumField
{
    /// Enum field name.
    pub name: String,

    /// Enum field value.
    pub value: i64,
}

/// Field value types.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueType
{
    /// `double`
    Double,

    /// `float`
    Float,

    /// `int32`
    Int32,

    /// `int64`
    Int64,

    /// `uint32`
    UInt32,

    /// `uint64`
    UInt64,

    /// `sint32`
    SInt32,

    /// `sint64`
    SInt64,

    /// `fixed32`
    Fixed32,

    /// `fixed64`
    Fixed64,

    /// `sfixed32`
    SFixed32,

    /// `sfixed64`
    SFixed64,

    /// `bool`
    Bool,

    /// `string`
    String,

    /// `bytes`
    Bytes,

    /// A message type.
    Message(MessageRef),

    /// An enum type.
    Enum(EnumRef),
}
