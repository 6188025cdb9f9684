use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use snafu::{ensure, OptionExt, ResultExt};

use super::bootstrap::{RawEnum, RawField, RawFile, RawFileSet, RawMessage};
use super::*;

impl Context
{
    /// Builds a decoding context from serialized `FileDescriptorSet` bytes.
    ///
    /// The set must be self-contained: every type referenced by a field of
    /// any contained message must be defined by one of the files in the set.
    pub fn from_descriptor_set(data: &[u8]) -> Result<Self, SchemaError>
    {
        let raw = RawFileSet::decode(data).context(InvalidDescriptor)?;
        ContextBuilder { files: raw.files }.build()
    }
}

pub(crate) struct ContextBuilder
{
    pub(crate) files: Vec<RawFile>,
}

impl ContextBuilder
{
    pub fn build(mut self) -> Result<Context, SchemaError>
    {
        let mut cache = BuildCache::default();
        for (i, file) in self.files.iter().enumerate() {
            file.populate(&mut cache, i)?;
        }

        // Iterate the types through the cache. The cache traversal order is
        // the arena order, so each type's final reference is its position
        // in this loop.
        let mut types = vec![];
        for cache_idx in 0..cache.types.len() {
            let data = &cache.types[cache_idx];
            let syntax = file_syntax(&self.files[data.idx_path[0]]);
            let ty = match data.item_type {
                ItemType::Message => {
                    let raw = self.take_message(&data.idx_path);
                    TypeInfo::Message(build_message(raw, data, &cache, syntax)?)
                }
                ItemType::Enum => {
                    let raw = self.take_enum(&data.idx_path);
                    TypeInfo::Enum(build_enum(raw, data)?)
                }
            };
            types.push(ty);
        }

        // Map fields can only be checked once the whole arena exists, as an
        // entry type may be built after the message using it.
        validate_map_entries(&types)?;

        let mut files = vec![];
        let mut files_by_path = HashMap::new();
        for (i, raw) in self.files.iter().enumerate() {
            ensure!(
                files_by_path.insert(raw.name.clone(), i).is_none(),
                DuplicateFile { path: raw.name.clone() }
            );

            let file_types = cache
                .types
                .iter()
                .filter(|data| data.idx_path.len() == 2 && data.idx_path[0] == i)
                .map(|data| data.type_ref())
                .collect();

            files.push(FileInfo {
                path: raw.name.clone(),
                package: raw.package.clone(),
                syntax: file_syntax(raw),
                self_ref: FileRef(InternalRef(i)),
                types: file_types,
            });
        }

        let types_by_name = types
            .iter()
            .enumerate()
            .map(|(idx, t)| (t.full_name().to_string(), idx))
            .collect();

        Ok(Context {
            files,
            files_by_path,
            types,
            types_by_name,
        })
    }

    fn take_message(&mut self, idx: &[usize]) -> RawMessage
    {
        self.files[idx[0]].take_message(&idx[1..])
    }

    fn take_enum(&mut self, idx: &[usize]) -> RawEnum
    {
        self.files[idx[0]].take_enum(&idx[1..])
    }
}

fn file_syntax(raw: &RawFile) -> Syntax
{
    match raw.syntax.as_deref() {
        Some("proto3") => Syntax::Proto3,
        _ => Syntax::Proto2,
    }
}

impl RawFile
{
    fn populate(&self, cache: &mut BuildCache, file_idx: usize) -> Result<(), SchemaError>
    {
        ensure!(
            !self.name.is_empty(),
            MissingName {
                context: "descriptor set",
            }
        );

        let mut path: Vec<&str> = match &self.package {
            Some(name) => name.split('.').collect(),
            None => vec![],
        };

        let parent = TypeParent::File(FileRef(InternalRef(file_idx)));
        let mut idx = vec![file_idx, 0];
        for (i, m) in self.messages.iter().enumerate() {
            *idx.last_mut().unwrap() = i;
            m.populate(cache, &mut path, &mut idx, parent)?;
        }
        for (i, e) in self.enums.iter().enumerate() {
            *idx.last_mut().unwrap() = i;
            e.populate(cache, &mut path, &mut idx, parent)?;
        }

        Ok(())
    }

    fn take_message(&mut self, idx: &[usize]) -> RawMessage
    {
        self.messages[idx[0]].take_message(&idx[1..])
    }

    fn take_enum(&mut self, idx: &[usize]) -> RawEnum
    {
        if idx.len() == 1 {
            std::mem::take(&mut self.enums[idx[0]])
        } else {
            self.messages[idx[0]].take_enum(&idx[1..])
        }
    }
}

impl RawMessage
{
    /// Lists the types found in this message recursively into the build
    /// cache.
    ///
    /// On error the `path` and `idx` will be left in an undefined state.
    fn populate<'a>(
        &'a self,
        cache: &mut BuildCache,
        path: &mut Vec<&'a str>,
        idx: &mut Vec<usize>,
        parent: TypeParent,
    ) -> Result<(), SchemaError>
    {
        ensure!(
            !self.name.is_empty(),
            MissingName {
                context: path.join("."),
            }
        );

        path.push(&self.name);
        let full_name = path.join(".");
        let cache_idx = cache.types.len();
        if cache.items.insert(full_name.clone(), cache_idx).is_some() {
            return DuplicateType { name: full_name }.fail();
        }

        cache.types.push(CacheData {
            item_type: ItemType::Message,
            full_name,
            idx_path: idx.clone(),
            final_idx: cache_idx,
            parent,
            map_entry: self.map_entry,
        });

        let self_parent = TypeParent::Message(MessageRef(InternalRef(cache_idx)));
        idx.push(0);
        for (i, m) in self.nested.iter().enumerate() {
            *idx.last_mut().unwrap() = i;
            m.populate(cache, path, idx, self_parent)?;
        }
        for (i, e) in self.enums.iter().enumerate() {
            *idx.last_mut().unwrap() = i;
            e.populate(cache, path, idx, self_parent)?;
        }
        idx.pop();
        path.pop();

        Ok(())
    }

    fn take_message(&mut self, idx: &[usize]) -> RawMessage
    {
        if idx.is_empty() {
            self.take_self()
        } else {
            self.nested[idx[0]].take_message(&idx[1..])
        }
    }

    fn take_enum(&mut self, idx: &[usize]) -> RawEnum
    {
        if idx.len() == 1 {
            std::mem::take(&mut self.enums[idx[0]])
        } else {
            self.nested[idx[0]].take_enum(&idx[1..])
        }
    }

    fn take_self(&mut self) -> RawMessage
    {
        RawMessage {
            name: self.name.clone(),
            fields: std::mem::take(&mut self.fields),
            oneofs: std::mem::take(&mut self.oneofs),
            map_entry: self.map_entry,

            // The children stay behind for their own build step; only their
            // names are needed here to rebuild the inner type references.
            nested: self
                .nested
                .iter()
                .map(|m| RawMessage {
                    name: m.name.clone(),
                    ..Default::default()
                })
                .collect(),
            enums: self
                .enums
                .iter()
                .map(|e| RawEnum {
                    name: e.name.clone(),
                    ..Default::default()
                })
                .collect(),
        }
    }
}

impl RawEnum
{
    fn populate<'a>(
        &'a self,
        cache: &mut BuildCache,
        path: &mut Vec<&'a str>,
        idx: &mut Vec<usize>,
        parent: TypeParent,
    ) -> Result<(), SchemaError>
    {
        ensure!(
            !self.name.is_empty(),
            MissingName {
                context: path.join("."),
            }
        );

        path.push(&self.name);
        let full_name = path.join(".");
        path.pop();

        let cache_idx = cache.types.len();
        if cache.items.insert(full_name.clone(), cache_idx).is_some() {
            return DuplicateType { name: full_name }.fail();
        }

        cache.types.push(CacheData {
            item_type: ItemType::Enum,
            full_name,
            idx_path: idx.clone(),
            final_idx: cache_idx,
            parent,
            map_entry: false,
        });

        Ok(())
    }
}

fn build_message(
    raw: RawMessage,
    data: &CacheData,
    cache: &BuildCache,
    syntax: Syntax,
) -> Result<MessageInfo, SchemaError>
{
    let inner_types: Vec<_> = raw
        .nested
        .iter()
        .map(|m| &m.name)
        .chain(raw.enums.iter().map(|e| &e.name))
        .map(|name| {
            cache
                .type_by_full_name(&format!("{}.{}", data.full_name, name))
                .expect("Existing type wasn't added to the cache")
                .type_ref()
        })
        .collect();

    let mut oneofs: Vec<_> = raw
        .oneofs
        .iter()
        .enumerate()
        .map(|(idx, name)| Oneof {
            name: name.clone(),
            self_ref: OneofRef(InternalRef(idx)),
            fields: vec![],
        })
        .collect();

    let mut fields = BTreeMap::new();
    let mut fields_by_name = BTreeMap::new();
    let mut fields_by_json_name = BTreeMap::new();
    for raw_field in raw.fields {
        let field = build_field(raw_field, data, cache, oneofs.len(), syntax)?;
        let number = field.number;

        if let Some(oneof_ref) = field.oneof {
            oneofs[oneof_ref.0.0].fields.push(number);
        }

        fields_by_name.insert(field.name.clone(), number);
        fields_by_json_name.insert(field.json_name.clone(), number);
        ensure!(
            fields.insert(number, field).is_none(),
            DuplicateField {
                number,
                message: data.full_name.clone(),
            }
        );
    }

    Ok(MessageInfo {
        name: raw.name,
        full_name: data.full_name.clone(),
        parent: data.parent,
        self_ref: MessageRef(InternalRef(data.final_idx)),
        oneofs,
        inner_types,
        map_entry: raw.map_entry,
        fields,
        fields_by_name,
        fields_by_json_name,
    })
}

fn build_field(
    raw: RawField,
    data: &CacheData,
    cache: &BuildCache,
    oneof_count: usize,
    syntax: Syntax,
) -> Result<MessageField, SchemaError>
{
    ensure!(
        !raw.name.is_empty(),
        MissingName {
            context: data.full_name.clone(),
        }
    );
    ensure!(
        raw.number >= 1 && raw.number <= 536_870_911,
        InvalidFieldNumber {
            name: raw.name.clone(),
            number: raw.number,
        }
    );

    let field_type = resolve_field_type(&raw, data, cache)?;
    let multiplicity = resolve_multiplicity(&raw, &field_type, cache, syntax)?;

    // proto3 optional fields are carried in a synthetic oneof which is not a
    // real union; presence is tracked through the multiplicity instead.
    let oneof = match raw.oneof_index {
        Some(index) if !raw.proto3_optional => {
            ensure!(
                index >= 0 && (index as usize) < oneof_count,
                InvalidOneofIndex {
                    name: raw.name.clone(),
                    index,
                }
            );
            Some(OneofRef(InternalRef(index as usize)))
        }
        _ => None,
    };

    let json_name = match &raw.json_name {
        Some(name) => name.clone(),
        None => lower_camel(&raw.name),
    };

    Ok(MessageField {
        name: raw.name,
        json_name,
        number: raw.number as u64,
        field_type,
        multiplicity,
        oneof,
    })
}

fn resolve_field_type(
    raw: &RawField,
    data: &CacheData,
    cache: &BuildCache,
) -> Result<ValueType, SchemaError>
{
    // Type codes from FieldDescriptorProto.Type.
    Ok(match raw.type_code {
        1 => ValueType::Double,
        2 => ValueType::Float,
        3 => ValueType::Int64,
        4 => ValueType::UInt64,
        5 => ValueType::Int32,
        6 => ValueType::Fixed64,
        7 => ValueType::Fixed32,
        8 => ValueType::Bool,
        9 => ValueType::String,
        12 => ValueType::Bytes,
        13 => ValueType::UInt32,
        15 => ValueType::SFixed32,
        16 => ValueType::SFixed64,
        17 => ValueType::SInt32,
        18 => ValueType::SInt64,

        // Message (11) and enum (14) types resolve through the cache. Some
        // producers omit the code entirely when type_name is set (0).
        code @ 11 | code @ 14 | code @ 0 => {
            let name = raw.type_name.as_ref().context(MissingName {
                context: data.full_name.clone(),
            })?;

            let target = cache.resolve_type(name, &data.full_name).context(TypeNotFound {
                name: name.clone(),
                context: data.full_name.clone(),
            })?;

            match (code, target.item_type) {
                (11, ItemType::Message) | (0, ItemType::Message) => {
                    ValueType::Message(MessageRef(InternalRef(target.final_idx)))
                }
                (14, ItemType::Enum) | (0, ItemType::Enum) => {
                    ValueType::Enum(EnumRef(InternalRef(target.final_idx)))
                }
                (_, actual) => {
                    let expected = match actual {
                        ItemType::Message => ItemType::Enum,
                        ItemType::Enum => ItemType::Message,
                    };
                    return InvalidTypeKind {
                        type_name: name.clone(),
                        context: "message field",
                        expected,
                        actual,
                    }
                    .fail();
                }
            }
        }

        code => {
            return InvalidTypeCode {
                name: raw.name.clone(),
                code,
            }
            .fail()
        }
    })
}

fn resolve_multiplicity(
    raw: &RawField,
    field_type: &ValueType,
    cache: &BuildCache,
    syntax: Syntax,
) -> Result<Multiplicity, SchemaError>
{
    Ok(match raw.label {
        // LABEL_OPTIONAL
        1 => match syntax {
            Syntax::Proto2 => Multiplicity::Optional,
            Syntax::Proto3 if raw.proto3_optional => Multiplicity::Optional,
            Syntax::Proto3 => Multiplicity::Single,
        },

        // LABEL_REQUIRED
        2 => Multiplicity::Single,

        // LABEL_REPEATED
        3 => {
            if let ValueType::Message(m) = field_type {
                if cache.types[m.0.0].map_entry {
                    return Ok(Multiplicity::Map);
                }
            }

            // Length-delimited kinds never pack.
            if field_type.wire_type() == 2 {
                Multiplicity::Repeated
            } else {
                match raw.packed {
                    Some(true) => Multiplicity::RepeatedPacked,
                    Some(false) => Multiplicity::Repeated,
                    None => match syntax {
                        Syntax::Proto3 => Multiplicity::RepeatedPacked,
                        Syntax::Proto2 => Multiplicity::Repeated,
                    },
                }
            }
        }

        code => {
            return InvalidLabel {
                name: raw.name.clone(),
                code,
            }
            .fail()
        }
    })
}

fn build_enum(raw: RawEnum, data: &CacheData) -> Result<EnumInfo, SchemaError>
{
    let mut fields_by_value = BTreeMap::new();
    let mut fields_by_name = BTreeMap::new();
    for value in raw.values {
        ensure!(
            !value.name.is_empty(),
            MissingName {
                context: data.full_name.clone(),
            }
        );
        if fields_by_name.insert(value.name.clone(), value.number).is_some() {
            return DuplicateType {
                name: format!("{}.{}", data.full_name, value.name),
            }
            .fail();
        }

        // Aliased numbers keep their first declared name.
        fields_by_value.entry(value.number).or_insert(EnumField {
            name: value.name,
            value: value.number,
        });
    }

    Ok(EnumInfo {
        name: raw.name,
        full_name: data.full_name.clone(),
        parent: data.parent,
        self_ref: EnumRef(InternalRef(data.final_idx)),
        fields_by_value,
        fields_by_name,
    })
}

fn validate_map_entries(types: &[TypeInfo]) -> Result<(), SchemaError>
{
    for ty in types {
        let msg = match ty {
            TypeInfo::Message(m) => m,
            TypeInfo::Enum(..) => continue,
        };
        for field in msg.iter_fields() {
            if field.multiplicity != Multiplicity::Map {
                continue;
            }
            let entry = match &field.field_type {
                ValueType::Message(m) => match &types[m.0.0] {
                    TypeInfo::Message(entry) => entry,
                    TypeInfo::Enum(..) => unreachable!("Map entry was not a message"),
                },
                _ => unreachable!("Map field without a message type"),
            };

            let key = entry.get_field(1).context(MissingMapEntryField {
                name: entry.full_name.clone(),
            })?;
            entry.get_field(2).context(MissingMapEntryField {
                name: entry.full_name.clone(),
            })?;

            ensure!(
                !matches!(
                    key.field_type,
                    ValueType::Double
                        | ValueType::Float
                        | ValueType::Bytes
                        | ValueType::Message(..)
                        | ValueType::Enum(..)
                ),
                InvalidMapKey {
                    name: entry.full_name.clone(),
                }
            );
        }
    }
    Ok(())
}

/// The lowerCamel transform used for JSON names the schema does not supply.
fn lower_camel(name: &str) -> String
{
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[derive(Default)]
struct BuildCache
{
    items: BTreeMap<String, usize>,
    types: Vec<CacheData>,
}

struct CacheData
{
    item_type: ItemType,
    idx_path: Vec<usize>,
    final_idx: usize,
    full_name: String,
    parent: TypeParent,
    map_entry: bool,
}

impl CacheData
{
    fn type_ref(&self) -> TypeRef
    {
        match self.item_type {
            ItemType::Message => TypeRef::Message(MessageRef(InternalRef(self.final_idx))),
            ItemType::Enum => TypeRef::Enum(EnumRef(InternalRef(self.final_idx))),
        }
    }
}

impl BuildCache
{
    fn resolve_type(&self, relative_name: &str, mut current_path: &str) -> Option<&CacheData>
    {
        if relative_name.starts_with('.') {
            return self.type_by_full_name(&relative_name[1..]);
        }

        loop {
            let lookup: Cow<str> = match current_path.is_empty() {
                true => relative_name.into(),
                false => format!("{}.{}", current_path, relative_name).into(),
            };

            if let Some(t) = self.type_by_full_name(&lookup) {
                return Some(t);
            }

            if current_path.is_empty() {
                return None;
            }

            match current_path.rfind('.') {
                Some(i) => {
                    let (start, _) = current_path.split_at(i);
                    current_path = start;
                }
                None => {
                    current_path = "";
                }
            }
        }
    }

    fn type_by_full_name(&self, full_name: &str) -> Option<&CacheData>
    {
        self.items.get(full_name).map(|idx| &self.types[*idx])
    }
}
