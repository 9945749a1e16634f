//! Dynamically typed message values.
//!
//! The codec operates on [`MessageValue`]s paired with compiled
//! [`MessageProps`](crate::props::MessageProps) tables instead of generated
//! structs, so one encoder serves every schema known to a
//! [`TypeRegistry`](crate::props::TypeRegistry).

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

/// A dynamically typed protobuf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Signed integer, covering the `int`/`sint`/`sfixed` scalar families.
    Int(i64),
    /// Unsigned integer, covering the `uint`/`fixed` families.
    UInt(u64),
    /// Floating point, covering both `float` and `double`.
    Double(f64),
    Bool(bool),
    /// An enum symbol, resolved through the enum's symbol table at encode
    /// time.
    Sym(String),
    Str(String),
    Bytes(Vec<u8>),
    Message(MessageValue),
    /// Elements of a repeated field, in order.
    List(Vec<Value>),
    /// Entries of a map field, keyed for deterministic emission order.
    Map(BTreeMap<MapKey, Value>),
    /// The active branch of a oneof group: `(field identifier, payload)`.
    Branch(String, Box<Value>),
}

impl Value {
    /// Build a oneof branch value.
    pub fn branch(field: impl Into<String>, payload: Value) -> Value {
        Value::Branch(field.into(), Box::new(payload))
    }

    /// Human readable name of this value's shape, used in error messages.
    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::UInt(_) => "unsigned integer",
            Value::Double(_) => "double",
            Value::Bool(_) => "bool",
            Value::Sym(_) => "symbol",
            Value::Str(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Message(_) => "message",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Branch(..) => "oneof branch",
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::UInt(u64::from(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Double(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(String::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<MessageValue> for Value {
    fn from(v: MessageValue) -> Self {
        Value::Message(v)
    }
}

/// Key of a protobuf map entry. Only integral, boolean and string scalars are
/// valid map keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum MapKey {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Str(String),
}

impl MapKey {
    /// View this key as a [`Value`] so it flows through the scalar codec.
    pub(crate) fn to_value(&self) -> Value {
        match self {
            MapKey::Bool(v) => Value::Bool(*v),
            MapKey::Int(v) => Value::Int(*v),
            MapKey::UInt(v) => Value::UInt(*v),
            MapKey::Str(v) => Value::Str(v.clone()),
        }
    }

    /// Inverse of [`MapKey::to_value`], for decoded entries.
    pub(crate) fn from_value(value: Value) -> Option<MapKey> {
        match value {
            Value::Bool(v) => Some(MapKey::Bool(v)),
            Value::Int(v) => Some(MapKey::Int(v)),
            Value::UInt(v) => Some(MapKey::UInt(v)),
            Value::Str(v) => Some(MapKey::Str(v)),
            _ => None,
        }
    }
}

/// A structured message value: named fields plus a proto2 extension
/// side-table keyed by `(extension module, field name)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MessageValue {
    fields: BTreeMap<String, Value>,
    extensions: BTreeMap<(String, String), Value>,
}

impl MessageValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field (or a oneof group) by its declared identifier.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Builder-style [`MessageValue::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Set a proto2 extension value.
    pub fn set_extension(
        &mut self,
        module: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) {
        self.extensions
            .insert((module.into(), field.into()), value.into());
    }

    /// Builder-style [`MessageValue::set_extension`].
    pub fn with_extension(
        mut self,
        module: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.set_extension(module, field, value);
        self
    }

    /// Extension values in key order.
    pub fn extensions(&self) -> impl Iterator<Item = (&(String, String), &Value)> {
        self.extensions.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.extensions.is_empty()
    }

    /// Append a decoded element to a repeated field.
    pub(crate) fn push_repeated(&mut self, name: &str, value: Value) {
        match self
            .fields
            .entry(String::from(name))
            .or_insert_with(|| Value::List(Vec::new()))
        {
            Value::List(items) => items.push(value),
            other => *other = Value::List(alloc::vec![value]),
        }
    }

    /// Insert a decoded map entry.
    pub(crate) fn insert_map_entry(&mut self, name: &str, key: MapKey, value: Value) {
        match self
            .fields
            .entry(String::from(name))
            .or_insert_with(|| Value::Map(BTreeMap::new()))
        {
            Value::Map(entries) => {
                entries.insert(key, value);
            }
            other => {
                let mut entries = BTreeMap::new();
                entries.insert(key, value);
                *other = Value::Map(entries);
            }
        }
    }
}
