//! Prop values and the merged props mapping.
//!
//! Props are string-keyed mappings derived from store state
//! (`map_state`) and from the dispatcher (`map_dispatch`). State-derived
//! and dispatch-derived props are merged shallowly, with dispatch keys
//! winning on collision.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A dispatch-bound action callback stored in props.
///
/// Compared by reference, like any other non-primitive prop value.
pub type ActionFn = Arc<dyn Fn() + Send + Sync>;

/// A single prop value.
///
/// Primitives (`Null`, `Bool`, `Int`, `Float`, `Str`) compare by value in
/// shallow equality; `Data` and `Action` compare by reference.
#[derive(Clone)]
pub enum PropValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Structured data, shared by reference.
    Data(Arc<serde_json::Value>),
    /// A bound action-dispatching callback.
    Action(ActionFn),
}

impl PropValue {
    /// Wrap structured data for by-reference sharing.
    pub fn data(value: serde_json::Value) -> Self {
        PropValue::Data(Arc::new(value))
    }

    /// Wrap a callback as an action prop.
    pub fn action(f: impl Fn() + Send + Sync + 'static) -> Self {
        PropValue::Action(Arc::new(f))
    }

    /// One-level equality: primitives by value, `Data`/`Action` by reference.
    ///
    /// Floats compare by bit pattern, so `NAN` is stable under repeated
    /// projection and `-0.0` is distinct from `0.0`.
    pub fn shallow_eq(&self, other: &PropValue) -> bool {
        match (self, other) {
            (PropValue::Null, PropValue::Null) => true,
            (PropValue::Bool(a), PropValue::Bool(b)) => a == b,
            (PropValue::Int(a), PropValue::Int(b)) => a == b,
            (PropValue::Float(a), PropValue::Float(b)) => a.to_bits() == b.to_bits(),
            (PropValue::Str(a), PropValue::Str(b)) => a == b,
            (PropValue::Data(a), PropValue::Data(b)) => Arc::ptr_eq(a, b),
            (PropValue::Action(a), PropValue::Action(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Null => write!(f, "Null"),
            PropValue::Bool(v) => write!(f, "Bool({})", v),
            PropValue::Int(v) => write!(f, "Int({})", v),
            PropValue::Float(v) => write!(f, "Float({})", v),
            PropValue::Str(v) => write!(f, "Str({:?})", v),
            PropValue::Data(v) => write!(f, "Data({})", v),
            PropValue::Action(_) => write!(f, "Action(..)"),
        }
    }
}

impl From<bool> for PropValue {
    fn from(v: bool) -> Self {
        PropValue::Bool(v)
    }
}

impl From<i64> for PropValue {
    fn from(v: i64) -> Self {
        PropValue::Int(v)
    }
}

impl From<f64> for PropValue {
    fn from(v: f64) -> Self {
        PropValue::Float(v)
    }
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        PropValue::Str(v.to_string())
    }
}

impl From<String> for PropValue {
    fn from(v: String) -> Self {
        PropValue::Str(v)
    }
}

impl Serialize for PropValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            PropValue::Null => serializer.serialize_unit(),
            PropValue::Bool(v) => serializer.serialize_bool(*v),
            PropValue::Int(v) => serializer.serialize_i64(*v),
            PropValue::Float(v) => serializer.serialize_f64(*v),
            PropValue::Str(v) => serializer.serialize_str(v),
            PropValue::Data(v) => v.serialize(serializer),
            // Callbacks have no data representation.
            PropValue::Action(_) => serializer.serialize_str("<action>"),
        }
    }
}

/// A string-keyed prop mapping.
#[derive(Clone, Debug, Default)]
pub struct Props(HashMap<String, PropValue>);

impl Props {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Props(HashMap::new())
    }

    /// Insert a value, replacing any previous entry for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterate over entries (arbitrary order).
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropValue)> {
        self.0.iter()
    }

    /// Shallow merge: entries from `other` win on key collision.
    pub fn merged(&self, other: &Props) -> Props {
        let mut out = self.0.clone();
        for (key, value) in other.iter() {
            out.insert(key.clone(), value.clone());
        }
        Props(out)
    }
}

impl FromIterator<(String, PropValue)> for Props {
    fn from_iter<I: IntoIterator<Item = (String, PropValue)>>(iter: I) -> Self {
        Props(iter.into_iter().collect())
    }
}

impl Serialize for Props {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
