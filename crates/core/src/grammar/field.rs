use std::borrow::Cow;
use std::cmp::Ordering;

use prost_reflect::{
    DynamicMessage, ExtensionDescriptor, FieldDescriptor, Kind, MapKey, OneofDescriptor, Value,
};

/// A resolved field: either declared on the message or an extension of it.
///
/// Reads and writes dispatch to the matching `DynamicMessage` accessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FieldRef {
    Field(FieldDescriptor),
    Extension(ExtensionDescriptor),
}

impl FieldRef {
    pub(crate) fn number(&self) -> u32 {
        match self {
            Self::Field(f) => f.number(),
            Self::Extension(e) => e.number(),
        }
    }

    pub(crate) fn full_name(&self) -> &str {
        match self {
            Self::Field(f) => f.full_name(),
            Self::Extension(e) => e.full_name(),
        }
    }

    pub(crate) fn kind(&self) -> Kind {
        match self {
            Self::Field(f) => f.kind(),
            Self::Extension(e) => e.kind(),
        }
    }

    /// Repeated, but not a map.
    pub(crate) fn is_list(&self) -> bool {
        match self {
            Self::Field(f) => f.is_list(),
            Self::Extension(e) => e.is_list(),
        }
    }

    pub(crate) fn is_map(&self) -> bool {
        match self {
            Self::Field(f) => f.is_map(),
            Self::Extension(e) => e.is_map(),
        }
    }

    pub(crate) fn is_repeated(&self) -> bool {
        self.is_list() || self.is_map()
    }

    pub(crate) fn containing_oneof(&self) -> Option<OneofDescriptor> {
        match self {
            Self::Field(f) => f.containing_oneof(),
            Self::Extension(_) => None,
        }
    }

    pub(crate) fn has(&self, message: &DynamicMessage) -> bool {
        match self {
            Self::Field(f) => message.has_field(f),
            Self::Extension(e) => message.has_extension(e),
        }
    }

    pub(crate) fn get<'m>(&self, message: &'m DynamicMessage) -> Cow<'m, Value> {
        match self {
            Self::Field(f) => message.get_field(f),
            Self::Extension(e) => message.get_extension(e),
        }
    }

    pub(crate) fn get_mut<'m>(&self, message: &'m mut DynamicMessage) -> &'m mut Value {
        match self {
            Self::Field(f) => message.get_field_mut(f),
            Self::Extension(e) => message.get_extension_mut(e),
        }
    }

    pub(crate) fn set(&self, message: &mut DynamicMessage, value: Value) {
        match self {
            Self::Field(f) => message.set_field(f, value),
            Self::Extension(e) => message.set_extension(e, value),
        }
    }

    /// Append to a list field, or set a singular one.
    pub(crate) fn store(&self, message: &mut DynamicMessage, value: Value) {
        if self.is_list() {
            if let Value::List(list) = self.get_mut(message) {
                list.push(value);
            }
        } else {
            self.set(message, value);
        }
    }
}

/// Convert a map entry's key value to a map key.
pub(crate) fn map_key_of(value: &Value) -> Option<MapKey> {
    match value {
        Value::Bool(b) => Some(MapKey::Bool(*b)),
        Value::I32(n) => Some(MapKey::I32(*n)),
        Value::I64(n) => Some(MapKey::I64(*n)),
        Value::U32(n) => Some(MapKey::U32(*n)),
        Value::U64(n) => Some(MapKey::U64(*n)),
        Value::String(s) => Some(MapKey::String(s.clone())),
        _ => None,
    }
}

/// The value form of a map key.
pub(crate) fn map_key_value(key: &MapKey) -> Value {
    match key {
        MapKey::Bool(b) => Value::Bool(*b),
        MapKey::I32(n) => Value::I32(*n),
        MapKey::I64(n) => Value::I64(*n),
        MapKey::U32(n) => Value::U32(*n),
        MapKey::U64(n) => Value::U64(*n),
        MapKey::String(s) => Value::String(s.clone()),
    }
}

/// Key order used when printing maps: `false < true`, integers
/// numerically, strings by bytes.
pub(crate) fn compare_map_keys(a: &MapKey, b: &MapKey) -> Ordering {
    match (a, b) {
        (MapKey::Bool(x), MapKey::Bool(y)) => x.cmp(y),
        (MapKey::I32(x), MapKey::I32(y)) => x.cmp(y),
        (MapKey::I64(x), MapKey::I64(y)) => x.cmp(y),
        (MapKey::U32(x), MapKey::U32(y)) => x.cmp(y),
        (MapKey::U64(x), MapKey::U64(y)) => x.cmp(y),
        (MapKey::String(x), MapKey::String(y)) => x.cmp(y),
        // A map has a single key type; mixed keys only order deterministically.
        _ => key_rank(a).cmp(&key_rank(b)),
    }
}

fn key_rank(key: &MapKey) -> u8 {
    match key {
        MapKey::Bool(_) => 0,
        MapKey::I32(_) => 1,
        MapKey::I64(_) => 2,
        MapKey::U32(_) => 3,
        MapKey::U64(_) => 4,
        MapKey::String(_) => 5,
    }
}
