//! Generation context: type indexing, name composition and value-wrapper
//! detection.

use std::collections::BTreeMap;

use crate::config::Config;
use crate::descriptor::{DescriptorProto, EnumDescriptorProto, FileDescriptorProto, Type};

/// Metadata recorded for every indexed type, produced once during indexing
/// and never rewritten.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeMetadata {
    /// Canonical target identifier for the generated type.
    pub module_name: String,
    /// Alias used where the type is referenced; equals `module_name` unless
    /// value-wrapper inlining reassigns it to the payload type.
    pub type_name: String,
    pub wrapper: bool,
    /// True when a wrapper collapses onto a scalar rather than a message or
    /// enum.
    pub wrapper_target_scalar: bool,
    /// Verbatim annotation from the `typespec` message option.
    pub typespec: Option<String>,
}

/// Per-file traversal state for the type indexer.
#[derive(Debug)]
pub struct Context<'a> {
    pub config: &'a Config,
    pub package: Option<String>,
    /// Override for the leading path component of composed names.
    pub module_prefix: Option<String>,
    /// Names of the enclosing messages during the depth-first walk.
    pub namespace: Vec<String>,
    types: BTreeMap<String, TypeMetadata>,
}

impl<'a> Context<'a> {
    /// Derive a fresh file-local context.
    pub fn for_file(config: &'a Config, file: &FileDescriptorProto) -> Self {
        Context {
            config,
            package: file.package.clone().filter(|p| !p.is_empty()),
            module_prefix: file
                .options
                .as_ref()
                .and_then(|options| options.module_prefix.clone()),
            namespace: Vec::new(),
            types: BTreeMap::new(),
        }
    }

    /// Walk the file's message and enum trees, computing a [`TypeMetadata`]
    /// record per type keyed by proto-qualified name.
    pub fn index_file(mut self, file: &FileDescriptorProto) -> BTreeMap<String, TypeMetadata> {
        for message in &file.message_type {
            self.index_message(message);
        }
        for enumeration in &file.enum_type {
            self.index_enum(enumeration);
        }
        self.types
    }

    fn index_message(&mut self, message: &DescriptorProto) {
        let name = match message.name.as_deref() {
            Some(name) => name,
            None => return,
        };
        let key = self.pkg_name(name);
        let metadata = self.message_metadata(message, name);
        self.types.insert(key, metadata);

        self.namespace.push(name.to_owned());
        for enumeration in &message.enum_type {
            self.index_enum(enumeration);
        }
        for nested in &message.nested_type {
            self.index_message(nested);
        }
        self.namespace.pop();
    }

    fn index_enum(&mut self, enumeration: &EnumDescriptorProto) {
        let name = match enumeration.name.as_deref() {
            Some(name) => name,
            None => return,
        };
        let key = self.pkg_name(name);
        let module_name = self.compose_name(name);
        self.types.insert(
            key,
            TypeMetadata {
                module_name: module_name.clone(),
                type_name: module_name,
                wrapper: false,
                wrapper_target_scalar: false,
                typespec: None,
            },
        );
    }

    /// Proto-qualified name of a type at the current traversal position:
    /// package and enclosing messages dot-joined, unnormalized.
    pub fn pkg_name(&self, name: &str) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(package) = self.package.as_deref() {
            parts.push(package);
        }
        parts.extend(self.namespace.iter().map(String::as_str));
        parts.push(name);
        parts.join(".")
    }

    /// Target identifier path of a type at the current traversal position:
    /// `[module_prefix or package, namespace, name]`, empties dropped, each
    /// dot segment normalized.
    pub fn compose_name(&self, name: &str) -> String {
        let leading = self
            .module_prefix
            .as_deref()
            .or(self.package.as_deref())
            .unwrap_or("");
        let mut dotted = String::from(leading);
        for part in self.namespace.iter().map(String::as_str).chain([name]) {
            if !dotted.is_empty() {
                dotted.push('.');
            }
            dotted.push_str(part);
        }
        normalize(&dotted)
    }

    fn message_metadata(&self, message: &DescriptorProto, name: &str) -> TypeMetadata {
        let module_name = self.compose_name(name);
        let typespec = message
            .options
            .as_ref()
            .and_then(|options| options.typespec.clone());

        match self.wrapper_target(message, name) {
            Some((type_name, wrapper_target_scalar)) => TypeMetadata {
                module_name,
                type_name,
                wrapper: true,
                wrapper_target_scalar,
                typespec,
            },
            None => TypeMetadata {
                module_name: module_name.clone(),
                type_name: module_name,
                wrapper: false,
                wrapper_target_scalar: false,
                typespec,
            },
        }
    }

    /// Value-wrapper detection. A message collapses onto its payload when
    /// all of the following hold:
    ///
    /// 1. `using_value_wrappers` is enabled,
    /// 2. the message has exactly one field, named `value`,
    /// 3. the message name ends in `Value`,
    /// 4. the name minus the suffix matches the payload's simple type name,
    ///    case-insensitively.
    ///
    /// Returns the unwrapped type name and whether it is a scalar.
    fn wrapper_target(&self, message: &DescriptorProto, name: &str) -> Option<(String, bool)> {
        if !self.config.using_value_wrappers {
            return None;
        }
        let field = match message.field.as_slice() {
            [field] => field,
            _ => return None,
        };
        if field.name.as_deref() != Some("value") {
            return None;
        }
        let base = name.strip_suffix("Value")?;

        match field.field_type()? {
            Type::Message | Type::Enum => {
                let type_name = field.type_name.as_deref()?;
                let simple = type_name.rsplit('.').next()?;
                if !base.eq_ignore_ascii_case(simple) {
                    return None;
                }
                Some((self.compose_referenced(type_name), false))
            }
            scalar => {
                let tag = scalar_proto_name(scalar)?;
                if !base.eq_ignore_ascii_case(tag) {
                    return None;
                }
                Some((String::from(rust_scalar_name(scalar)), true))
            }
        }
    }

    /// Compose the target path of a referenced `.pkg.Type` name, substituting
    /// the module prefix when the reference lives in this file's package.
    pub fn compose_referenced(&self, type_name: &str) -> String {
        let path = type_name.trim_start_matches('.');
        if let (Some(package), Some(prefix)) =
            (self.package.as_deref(), self.module_prefix.as_deref())
        {
            if let Some(rest) = path.strip_prefix(package) {
                let rest = rest.trim_start_matches('.');
                let mut dotted = String::from(prefix);
                if !rest.is_empty() {
                    dotted.push('.');
                    dotted.push_str(rest);
                }
                return normalize(&dotted);
            }
        }
        normalize(path)
    }
}

/// Normalize a dotted proto path into a Rust identifier path: every segment
/// PascalCased, joined with `::`.
pub fn normalize(dotted: &str) -> String {
    dotted
        .split('.')
        .filter(|segment| !segment.is_empty())
        .map(to_pascal_case)
        .collect::<Vec<_>>()
        .join("::")
}

/// Uppercase the first letter and letters following underscores, preserving
/// interior capitalization: `my_pkg` -> `MyPkg`, `MyMessage` -> `MyMessage`.
fn to_pascal_case(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut upper_next = true;
    for c in segment.chars() {
        if c == '_' {
            upper_next = true;
            continue;
        }
        if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// The `.proto` keyword of a scalar descriptor type.
fn scalar_proto_name(ty: Type) -> Option<&'static str> {
    Some(match ty {
        Type::Double => "double",
        Type::Float => "float",
        Type::Int64 => "int64",
        Type::Uint64 => "uint64",
        Type::Int32 => "int32",
        Type::Fixed64 => "fixed64",
        Type::Fixed32 => "fixed32",
        Type::Bool => "bool",
        Type::String => "string",
        Type::Bytes => "bytes",
        Type::Uint32 => "uint32",
        Type::Sfixed32 => "sfixed32",
        Type::Sfixed64 => "sfixed64",
        Type::Sint32 => "sint32",
        Type::Sint64 => "sint64",
        Type::Group | Type::Message | Type::Enum => return None,
    })
}

/// The Rust type a wrapped scalar collapses onto.
fn rust_scalar_name(ty: Type) -> &'static str {
    match ty {
        Type::Double => "f64",
        Type::Float => "f32",
        Type::Int64 | Type::Sfixed64 | Type::Sint64 => "i64",
        Type::Uint64 | Type::Fixed64 => "u64",
        Type::Int32 | Type::Sfixed32 | Type::Sint32 => "i32",
        Type::Uint32 | Type::Fixed32 => "u32",
        Type::Bool => "bool",
        Type::String => "String",
        Type::Bytes => "Vec<u8>",
        Type::Group | Type::Message | Type::Enum => "",
    }
}
