use snafu::{OptionExt, Snafu};

use super::*;
use crate::decode::{DecodeError, MessageValue};

/// Error resolving a file or type within a context.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum ResolveError
{
    /// No file with the requested path exists in the descriptor set.
    #[snafu(display("File '{}' not found in the descriptor set", path))]
    FileNotFound
    {
        /// Requested path.
        path: String,
    },

    /// The named type does not exist in the requested file.
    #[snafu(display("Type '{}' not found in file '{}'", name, file))]
    TypeNotFound
    {
        /// Requested type name.
        name: String,

        /// File the lookup ran against.
        file: String,
    },

    /// The name resolved to an enum where a message was required.
    #[snafu(display("'{}' is not a message type", name))]
    NotAMessage
    {
        /// Requested type name.
        name: String,
    },

    /// A field of a type in the handle's closure references a type that is
    /// not present in the registry.
    #[snafu(display("Type referenced from '{}' does not exist in the registry", context))]
    DanglingReference
    {
        /// The type holding the broken reference.
        context: String,
    },
}

/// A resolved view of one message type within a [`Context`].
///
/// Construction verifies the full transitive closure of referenced types, so
/// a handle is always safe to decode and encode against. Borrows the context
/// read-only and is cheap to copy.
#[derive(Debug, Clone, Copy)]
pub struct TypeHandle<'a>
{
    context: &'a Context,
    message: MessageRef,
}

impl Context
{
    /// Gets type info by full (package-qualified) name.
    pub fn get_type(&self, full_name: &str) -> Option<&TypeInfo>
    {
        self.types_by_name
            .get(full_name)
            .map(|idx| &self.types[*idx])
    }

    /// Gets a message type info by full (package-qualified) name.
    pub fn get_message(&self, full_name: &str) -> Option<&MessageInfo>
    {
        match self.get_type(full_name) {
            Some(TypeInfo::Message(m)) => Some(m),
            _ => None,
        }
    }

    fn resolve_type_ref(&self, tr: InternalRef) -> Option<&TypeInfo>
    {
        self.types.get(tr.0)
    }

    /// Resolves a message reference.
    ///
    /// Will **panic** if the message defined by the `MessageRef` does not exist in this context.
    /// Such panic means the `MessageRef` came from a different context. The panic is not
    /// guaranteed, as a message with an equal `MessageRef` may exist in multiple contexts.
    pub fn resolve_message(&self, tr: MessageRef) -> &MessageInfo
    {
        match self.resolve_type_ref(tr.0) {
            Some(TypeInfo::Message(msg)) => msg,
            _ => panic!("Message did not exist in this context"),
        }
    }

    /// Resolves a enum reference.
    ///
    /// Will **panic** if the enum defined by the `EnumRef` does not exist in this context.
    /// Such panic means the `EnumRef` came from a different context. The panic is not
    /// guaranteed, as an enum with an equal `EnumRef` may exist in multiple contexts.
    pub fn resolve_enum(&self, tr: EnumRef) -> &EnumInfo
    {
        match self.resolve_type_ref(tr.0) {
            Some(TypeInfo::Enum(e)) => e,
            _ => panic!("Enum did not exist in this context"),
        }
    }

    /// Gets a file by its exact path.
    ///
    /// No fuzzy matching: the path must equal the `name` the file was
    /// registered under in the descriptor set.
    pub fn resolve_file(&self, path: &str) -> Result<&FileInfo, ResolveError>
    {
        self.files_by_path
            .get(path)
            .map(|idx| &self.files[*idx])
            .context(FileNotFound { path })
    }

    /// Resolves a message type by file path and type name.
    ///
    /// The name is matched against the file's top-level types; a
    /// `.`-qualified name descends one nesting level per segment. The
    /// returned handle has its whole reference closure verified.
    pub fn resolve_type(&self, file_path: &str, type_name: &str)
        -> Result<TypeHandle<'_>, ResolveError>
    {
        let file = self.resolve_file(file_path)?;

        let mut segments = type_name.split('.');
        let first = segments.next().unwrap_or("");

        let mut current = file
            .types
            .iter()
            .find(|tr| self.type_ref_info(**tr).name() == first)
            .copied()
            .context(TypeNotFound {
                name: type_name,
                file: file_path,
            })?;

        for segment in segments {
            let inner = match self.type_ref_info(current) {
                TypeInfo::Message(m) => &m.inner_types,
                TypeInfo::Enum(..) => {
                    return TypeNotFound {
                        name: type_name,
                        file: file_path,
                    }
                    .fail()
                }
            };
            current = inner
                .iter()
                .find(|tr| self.type_ref_info(**tr).name() == segment)
                .copied()
                .context(TypeNotFound {
                    name: type_name,
                    file: file_path,
                })?;
        }

        let message = match current {
            TypeRef::Message(m) => m,
            TypeRef::Enum(..) => return NotAMessage { name: type_name }.fail(),
        };

        self.verify_closure(message)?;
        Ok(TypeHandle {
            context: self,
            message,
        })
    }

    fn type_ref_info(&self, tr: TypeRef) -> &TypeInfo
    {
        match tr {
            TypeRef::Message(m) => &self.types[m.0.0],
            TypeRef::Enum(e) => &self.types[e.0.0],
        }
    }

    /// Walks every message and enum reference reachable from `root` and
    /// ensures each one resolves to a type of the referenced kind.
    fn verify_closure(&self, root: MessageRef) -> Result<(), ResolveError>
    {
        let mut visited = std::collections::HashSet::new();
        let mut stack = vec![root];

        while let Some(msg_ref) = stack.pop() {
            if !visited.insert(msg_ref) {
                continue;
            }

            let info = match self.resolve_type_ref(msg_ref.0) {
                Some(TypeInfo::Message(m)) => m,
                _ => {
                    return DanglingReference {
                        context: "<root>",
                    }
                    .fail()
                }
            };

            for field in info.iter_fields() {
                match &field.field_type {
                    ValueType::Message(m) => match self.resolve_type_ref(m.0) {
                        Some(TypeInfo::Message(..)) => stack.push(*m),
                        _ => {
                            return DanglingReference {
                                context: info.full_name.clone(),
                            }
                            .fail()
                        }
                    },
                    ValueType::Enum(e) => match self.resolve_type_ref(e.0) {
                        Some(TypeInfo::Enum(..)) => {}
                        _ => {
                            return DanglingReference {
                                context: info.full_name.clone(),
                            }
                            .fail()
                        }
                    },
                    _ => {}
                }
            }
        }

        Ok(())
    }
}

impl<'a> TypeHandle<'a>
{
    pub(crate) fn for_message(context: &'a Context, message: MessageRef) -> Self
    {
        TypeHandle { context, message }
    }

    /// The context the handle was resolved from.
    pub fn context(&self) -> &'a Context
    {
        self.context
    }

    /// Reference to the resolved message type.
    pub fn message(&self) -> MessageRef
    {
        self.message
    }

    /// Descriptor of the resolved message type.
    pub fn info(&self) -> &'a MessageInfo
    {
        self.context.resolve_message(self.message)
    }

    /// Creates an empty dynamic message of the handle's type.
    pub fn new_value(&self) -> MessageValue
    {
        MessageValue::new(self.message)
    }

    /// Decode a binary payload of the handle's type.
    pub fn decode(&self, data: &[u8]) -> Result<MessageValue, DecodeError>
    {
        self.info().decode(data, self.context)
    }
}

impl TypeInfo
{
    /// Get the short name of the type.
    pub fn name(&self) -> &str
    {
        match self {
            TypeInfo::Message(m) => &m.name,
            TypeInfo::Enum(e) => &e.name,
        }
    }

    /// Get the full name of the type.
    pub fn full_name(&self) -> &str
    {
        match self {
            TypeInfo::Message(m) => &m.full_name,
            TypeInfo::Enum(e) => &e.full_name,
        }
    }

    /// Get the parent information for the type.
    pub fn parent(&self) -> TypeParent
    {
        match self {
            TypeInfo::Message(m) => m.parent,
            TypeInfo::Enum(e) => e.parent,
        }
    }
}

impl MessageInfo
{
    /// Iterates all message fields.
    pub fn iter_fields(&self) -> impl Iterator<Item = &MessageField>
    {
        self.fields.values()
    }

    /// Get a field by its number.
    pub fn get_field(&self, number: u64) -> Option<&MessageField>
    {
        self.fields.get(&number)
    }

    /// Get a field by its name.
    pub fn get_field_by_name(&self, name: &str) -> Option<&MessageField>
    {
        self.fields_by_name
            .get(name)
            .and_then(|id| self.get_field(*id))
    }

    /// Get a field by its JSON name.
    pub fn get_field_by_json_name(&self, name: &str) -> Option<&MessageField>
    {
        self.fields_by_json_name
            .get(name)
            .and_then(|id| self.get_field(*id))
    }

    /// Gets a oneof by a oneof reference.
    pub fn get_oneof(&self, oneof: OneofRef) -> Option<&Oneof>
    {
        self.oneofs.iter().find(|oo| oo.self_ref == oneof)
    }
}

impl EnumInfo
{
    /// Gets a field by value.
    ///
    /// If the value is aliased, the first declared alias is returned.
    pub fn get_field_by_value(&self, value: i64) -> Option<&EnumField>
    {
        self.fields_by_value.get(&value)
    }

    /// Gets a field by name.
    pub fn get_field_by_name(&self, name: &str) -> Option<&EnumField>
    {
        self.fields_by_name
            .get(name)
            .and_then(|value| self.get_field_by_value(*value))
    }
}

impl ValueType
{
    pub(crate) fn wire_type(&self) -> u8
    {
        match self {
            Self::Double => 1,
            Self::Float => 5,
            Self::Int32 => 0,
            Self::Int64 => 0,
            Self::UInt32 => 0,
            Self::UInt64 => 0,
            Self::SInt32 => 0,
            Self::SInt64 => 0,
            Self::Fixed32 => 5,
            Self::Fixed64 => 1,
            Self::SFixed32 => 5,
            Self::SFixed64 => 1,
            Self::Bool => 0,
            Self::String => 2,
            Self::Bytes => 2,
            Self::Message(..) => 2,
            Self::Enum(..) => 0,
        }
    }

    pub(crate) fn type_name(&self) -> &'static str
    {
        match self {
            Self::Double => "double",
            Self::Float => "float",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::SInt32 => "sint32",
            Self::SInt64 => "sint64",
            Self::Fixed32 => "fixed32",
            Self::Fixed64 => "fixed64",
            Self::SFixed32 => "sfixed32",
            Self::SFixed64 => "sfixed64",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Message(..) => "message",
            Self::Enum(..) => "enum",
        }
    }
}
