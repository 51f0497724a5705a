//! Request input in the shapes a parser can produce.
//!
//! | Shape | Produced by |
//! |-------|-------------|
//! | [`Input::Map`] | JSON object bodies |
//! | [`Input::Multi`] | form bodies, where a key may repeat |
//! | [`Input::Seq`] | JSON array bodies |
//! | [`Input::Object`] | application types implementing [`Fields`] |
//! | [`Input::Scalar`] | any other JSON value; has no fields |
//!
//! The validator never looks at these directly; it goes through
//! [`crate::container::Container`].

use std::fmt;

use serde_json::{Map, Value};

/// A value whose named fields can be read and written, standing in for an
/// attribute-bearing object.
pub trait Fields: Send {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value);
    fn remove(&mut self, key: &str) -> Option<Value>;
    /// Names of the fields currently present, in a stable order.
    fn keys(&self) -> Vec<String>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Parsed request input.
pub enum Input {
    Map(Map<String, Value>),
    Multi(MultiMap),
    Seq(Vec<Value>),
    Object(Box<dyn Fields>),
    Scalar(Value),
}

impl Default for Input {
    fn default() -> Self {
        Input::Map(Map::new())
    }
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Map(m) => f.debug_tuple("Map").field(m).finish(),
            Input::Multi(m) => f.debug_tuple("Multi").field(m).finish(),
            Input::Seq(s) => f.debug_tuple("Seq").field(s).finish(),
            Input::Object(o) => f.debug_tuple("Object").field(&o.keys()).finish(),
            Input::Scalar(v) => f.debug_tuple("Scalar").field(v).finish(),
        }
    }
}

impl From<Value> for Input {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(m) => Input::Map(m),
            Value::Array(a) => Input::Seq(a),
            other => Input::Scalar(other),
        }
    }
}

impl From<MultiMap> for Input {
    fn from(m: MultiMap) -> Self {
        Input::Multi(m)
    }
}

impl Input {
    /// Flatten into a JSON value for models that want one.
    ///
    /// Multi-valued keys become arrays; keys with a single value stay
    /// scalar. [`Input::Object`] is read field by field.
    pub fn into_value(self) -> Value {
        match self {
            Input::Map(m) => Value::Object(m),
            Input::Multi(m) => m.into_value(),
            Input::Seq(s) => Value::Array(s),
            Input::Object(o) => {
                let mut out = Map::new();
                for key in o.keys() {
                    if let Some(v) = o.get(&key) {
                        out.insert(key, v);
                    }
                }
                Value::Object(out)
            }
            Input::Scalar(v) => v,
        }
    }
}

/// An ordered map in which a key may carry several values, as HTML forms
/// and query strings do.
///
/// Lookups by key return the first value; [`MultiMap::get_all`] returns all
/// of them in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiMap {
    entries: Vec<(String, Value)>,
}

impl MultiMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value, keeping any values already stored under `key`.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.push((key.into(), value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_all(&self, key: &str) -> Vec<Value> {
        self.entries
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// Replace every value under `key` with `value`. The key keeps the
    /// position of its first occurrence.
    pub fn set(&mut self, key: &str, value: Value) {
        self.set_list(key, vec![value]);
    }

    /// Replace every value under `key` with `values`.
    pub fn set_list(&mut self, key: &str, values: Vec<Value>) {
        let at = self.entries.iter().position(|(k, _)| k == key);
        self.entries.retain(|(k, _)| k != key);
        let at = at.unwrap_or(self.entries.len()).min(self.entries.len());
        for (offset, v) in values.into_iter().enumerate() {
            self.entries.insert(at + offset, (key.to_string(), v));
        }
    }

    /// Remove every value under `key`; returns how many were removed.
    pub fn remove(&mut self, key: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| k != key);
        before - self.entries.len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Distinct keys in first-occurrence order.
    pub fn keys(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for (k, _) in &self.entries {
            if !seen.iter().any(|s| s == k) {
                seen.push(k.clone());
            }
        }
        seen
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn into_value(self) -> Value {
        let mut out = Map::new();
        for key in self.keys() {
            let mut values = self.get_all(&key);
            let v = if values.len() == 1 {
                values.remove(0)
            } else {
                Value::Array(values)
            };
            out.insert(key, v);
        }
        Value::Object(out)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for MultiMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut m = MultiMap::new();
        for (k, v) in iter {
            m.append(k, v);
        }
        m
    }
}
