//! Compiled schema property tables that drive the codec.
//!
//! A generated module (or a test) compiles each message into a
//! [`MessageProps`] table once; the codec then treats the table as read-only.
//! Cross-type references use proto-qualified names resolved through a
//! [`TypeRegistry`].

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::wire::{encode_key, WireType};

/// Protobuf scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Int32,
    Int64,
    UInt32,
    UInt64,
    Sint32,
    Sint64,
    Bool,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Float,
    Double,
    String,
    Bytes,
}

impl ScalarKind {
    /// The wire type values of this scalar are framed with.
    pub const fn wire_type(self) -> WireType {
        match self {
            ScalarKind::Int32
            | ScalarKind::Int64
            | ScalarKind::UInt32
            | ScalarKind::UInt64
            | ScalarKind::Sint32
            | ScalarKind::Sint64
            | ScalarKind::Bool => WireType::Varint,
            ScalarKind::Fixed64 | ScalarKind::Sfixed64 | ScalarKind::Double => WireType::I64,
            ScalarKind::Fixed32 | ScalarKind::Sfixed32 | ScalarKind::Float => WireType::I32,
            ScalarKind::String | ScalarKind::Bytes => WireType::Len,
        }
    }

    /// The `.proto` keyword for this scalar.
    pub const fn proto_name(self) -> &'static str {
        match self {
            ScalarKind::Int32 => "int32",
            ScalarKind::Int64 => "int64",
            ScalarKind::UInt32 => "uint32",
            ScalarKind::UInt64 => "uint64",
            ScalarKind::Sint32 => "sint32",
            ScalarKind::Sint64 => "sint64",
            ScalarKind::Bool => "bool",
            ScalarKind::Fixed32 => "fixed32",
            ScalarKind::Fixed64 => "fixed64",
            ScalarKind::Sfixed32 => "sfixed32",
            ScalarKind::Sfixed64 => "sfixed64",
            ScalarKind::Float => "float",
            ScalarKind::Double => "double",
            ScalarKind::String => "string",
            ScalarKind::Bytes => "bytes",
        }
    }
}

/// Declared type of a field.
///
/// Enum and message references carry the proto-qualified name of the target
/// type; the codec resolves them through the [`TypeRegistry`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Scalar(ScalarKind),
    Enum(String),
    Message(String),
}

impl FieldType {
    /// The wire type of a single (non-packed) value of this type.
    pub fn wire_type(&self) -> WireType {
        match self {
            FieldType::Scalar(kind) => kind.wire_type(),
            FieldType::Enum(_) => WireType::Varint,
            FieldType::Message(_) => WireType::Len,
        }
    }
}

/// How a field is framed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldClass {
    /// One tagged record per value.
    Normal,
    /// A single length-delimited record concatenating unboxed payloads.
    Packed,
    /// A length-delimited record whose payload is itself an encoded message.
    Embedded,
}

/// Whether a message was declared with proto2 or proto3 syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    Proto2,
    Proto3,
}

/// Compiled per-field properties.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldProps {
    /// The field number.
    pub tag: u32,
    /// Target-language field identifier.
    pub name: String,
    pub ty: FieldType,
    /// The wire type the field key carries. `Len` for packed and embedded
    /// fields regardless of the element type.
    pub wire_type: WireType,
    /// Precomputed varint of `tag << 3 | wire_type`.
    pub encoded_fnum: Vec<u8>,
    pub repeated: bool,
    pub packed: bool,
    pub embedded: bool,
    pub map: bool,
    pub optional: bool,
    pub required: bool,
    /// Index of the oneof group this field belongs to, if any.
    pub oneof: Option<usize>,
}

impl FieldProps {
    pub fn new(tag: u32, name: impl Into<String>, ty: FieldType) -> Self {
        let embedded = matches!(ty, FieldType::Message(_));
        let mut props = FieldProps {
            tag,
            name: name.into(),
            wire_type: ty.wire_type(),
            ty,
            encoded_fnum: Vec::new(),
            repeated: false,
            packed: false,
            embedded,
            map: false,
            optional: true,
            required: false,
            oneof: None,
        };
        props.recompute_key();
        props
    }

    pub fn repeated(mut self) -> Self {
        self.repeated = true;
        self.optional = false;
        self
    }

    /// Mark a repeated scalar or enum field as packed.
    ///
    /// Only meaningful for element types that are not themselves
    /// length-delimited; the field key switches to `Len` framing.
    pub fn packed(mut self) -> Self {
        debug_assert!(self.ty.wire_type() != WireType::Len);
        self.repeated = true;
        self.optional = false;
        self.packed = true;
        self.wire_type = WireType::Len;
        self.recompute_key();
        self
    }

    /// Mark this field as a map whose declared type is the synthetic
    /// key/value entry message.
    pub fn map_entry(mut self) -> Self {
        debug_assert!(matches!(self.ty, FieldType::Message(_)));
        self.repeated = true;
        self.optional = false;
        self.map = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self.optional = false;
        self
    }

    /// Place this field in the oneof group with the given index.
    pub fn oneof(mut self, index: usize) -> Self {
        self.oneof = Some(index);
        self
    }

    /// Decide how values of this field are framed.
    pub fn classify(&self) -> FieldClass {
        if self.wire_type == WireType::Len && self.embedded {
            FieldClass::Embedded
        } else if self.repeated && self.packed {
            FieldClass::Packed
        } else {
            FieldClass::Normal
        }
    }

    fn recompute_key(&mut self) {
        self.encoded_fnum.clear();
        encode_key(self.wire_type, self.tag, &mut self.encoded_fnum);
    }
}

/// Compiled per-message properties.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageProps {
    /// Target-language type name, used in error context.
    pub name: String,
    pub syntax: Syntax,
    /// The message is a single-field value wrapper collapsed at encode time.
    pub wrapper: bool,
    fields: Vec<FieldProps>,
    tag_index: BTreeMap<u32, usize>,
    name_index: BTreeMap<String, usize>,
    oneofs: Vec<String>,
}

impl MessageProps {
    pub fn new(name: impl Into<String>, syntax: Syntax) -> Self {
        MessageProps {
            name: name.into(),
            syntax,
            wrapper: false,
            fields: Vec::new(),
            tag_index: BTreeMap::new(),
            name_index: BTreeMap::new(),
            oneofs: Vec::new(),
        }
    }

    /// Append a field; fields must be pushed in declaration order.
    pub fn push_field(&mut self, field: FieldProps) {
        let index = self.fields.len();
        self.tag_index.insert(field.tag, index);
        self.name_index.insert(field.name.clone(), index);
        self.fields.push(field);
    }

    /// Builder-style [`MessageProps::push_field`].
    pub fn with_field(mut self, field: FieldProps) -> Self {
        self.push_field(field);
        self
    }

    /// Declare a oneof group; groups must be pushed in declaration order so
    /// their position matches the `oneof` index on member fields.
    pub fn push_oneof(&mut self, name: impl Into<String>) {
        self.oneofs.push(name.into());
    }

    /// Builder-style [`MessageProps::push_oneof`].
    pub fn with_oneof(mut self, name: impl Into<String>) -> Self {
        self.push_oneof(name);
        self
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldProps] {
        &self.fields
    }

    /// Oneof group names; position is the group index.
    pub fn oneofs(&self) -> &[String] {
        &self.oneofs
    }

    pub fn field_by_tag(&self, tag: u32) -> Option<&FieldProps> {
        self.tag_index.get(&tag).map(|&index| &self.fields[index])
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldProps> {
        self.name_index.get(name).map(|&index| &self.fields[index])
    }
}

/// Compiled per-enum symbol table.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumProps {
    pub name: String,
    symbols: Vec<(String, i32)>,
    by_symbol: BTreeMap<String, i32>,
}

impl EnumProps {
    pub fn new(name: impl Into<String>) -> Self {
        EnumProps {
            name: name.into(),
            symbols: Vec::new(),
            by_symbol: BTreeMap::new(),
        }
    }

    pub fn push_symbol(&mut self, symbol: impl Into<String>, number: i32) {
        let symbol = symbol.into();
        self.by_symbol.insert(symbol.clone(), number);
        self.symbols.push((symbol, number));
    }

    /// Builder-style [`EnumProps::push_symbol`].
    pub fn with_symbol(mut self, symbol: impl Into<String>, number: i32) -> Self {
        self.push_symbol(symbol, number);
        self
    }

    /// The integer associated with a symbol.
    pub fn symbol_number(&self, symbol: &str) -> Option<i32> {
        self.by_symbol.get(symbol).copied()
    }

    /// The first declared symbol carrying the given integer.
    pub fn number_symbol(&self, number: i32) -> Option<&str> {
        self.symbols
            .iter()
            .find(|(_, n)| *n == number)
            .map(|(symbol, _)| symbol.as_str())
    }
}

/// Compiled properties for every type reachable from a set of `.proto` files,
/// keyed by proto-qualified name.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    messages: BTreeMap<String, MessageProps>,
    enums: BTreeMap<String, EnumProps>,
    extensions: BTreeMap<(String, String), FieldProps>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_message(&mut self, proto_name: impl Into<String>, props: MessageProps) {
        self.messages.insert(proto_name.into(), props);
    }

    pub fn register_enum(&mut self, proto_name: impl Into<String>, props: EnumProps) {
        self.enums.insert(proto_name.into(), props);
    }

    /// Register a proto2 extension under `(extension module, field name)`.
    pub fn register_extension(
        &mut self,
        module: impl Into<String>,
        field: impl Into<String>,
        props: FieldProps,
    ) {
        self.extensions.insert((module.into(), field.into()), props);
    }

    pub fn message(&self, proto_name: &str) -> Option<&MessageProps> {
        self.messages.get(proto_name)
    }

    pub fn enumeration(&self, proto_name: &str) -> Option<&EnumProps> {
        self.enums.get(proto_name)
    }

    pub fn extension(&self, module: &str, field: &str) -> Option<&FieldProps> {
        self.extensions
            .get(&(String::from(module), String::from(field)))
    }

    /// Merge another registry into this one. Later registrations win.
    pub fn extend(&mut self, other: TypeRegistry) {
        self.messages.extend(other.messages);
        self.enums.extend(other.enums);
        self.extensions.extend(other.extensions);
    }
}
