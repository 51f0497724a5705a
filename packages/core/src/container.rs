//! A uniform field view over parsed input, used by the validator.
//!
//! Maps, multi-maps, sequences and [`Fields`](crate::input::Fields) objects
//! all answer the same `get`/`set`/`delete`/`get_list` calls.

use std::collections::HashSet;

use serde_json::Value;
use thiserror::Error;

use crate::input::Input;

/// Errors raised by [`Container`] accessors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ContainerError {
    #[error("no field {0:?}")]
    Missing(String),

    #[error("field {0:?} is not a sequence")]
    NotASequence(String),

    #[error("{0:?} is not an index into a sequence of {1} items")]
    BadIndex(String, usize),

    #[error("input has no fields")]
    NoFields,
}

/// A uniform field view over any [`Input`] shape.
///
/// Sequences are addressed by their decimal index. Values read from a
/// multi-valued map through [`Container::get_list`] are remembered, so that
/// [`Container::unwrap`] can spread a converted list back out into one
/// entry per element.
#[derive(Debug)]
pub struct Container {
    inner: Input,
    list_fields: HashSet<String>,
}

impl Container {
    pub fn new(input: Input) -> Self {
        Self {
            inner: input,
            list_fields: HashSet::new(),
        }
    }

    pub fn get(&self, key: &str) -> Result<Value, ContainerError> {
        let found = match &self.inner {
            Input::Map(m) => m.get(key).cloned(),
            Input::Multi(m) => m.get(key).cloned(),
            Input::Seq(s) => s.get(seq_index(key, s.len())?).cloned(),
            Input::Object(o) => o.get(key),
            Input::Scalar(_) => None,
        };
        found.ok_or_else(|| ContainerError::Missing(key.to_string()))
    }

    /// Every value of a list-shaped field.
    ///
    /// Multi-valued maps answer natively with all values stored under the
    /// key; every other shape requires the field itself to be an array.
    pub fn get_list(&mut self, key: &str) -> Result<Vec<Value>, ContainerError> {
        if let Input::Multi(m) = &self.inner {
            if !m.contains(key) {
                return Err(ContainerError::Missing(key.to_string()));
            }
            self.list_fields.insert(key.to_string());
            return Ok(m.get_all(key));
        }
        match self.get(key)? {
            Value::Array(items) => Ok(items),
            _ => Err(ContainerError::NotASequence(key.to_string())),
        }
    }

    pub fn set(&mut self, key: &str, value: Value) -> Result<(), ContainerError> {
        match &mut self.inner {
            Input::Map(m) => {
                m.insert(key.to_string(), value);
            }
            Input::Multi(m) => m.set(key, value),
            Input::Seq(s) => {
                let i = seq_index(key, s.len() + 1)?;
                if i == s.len() {
                    s.push(value);
                } else {
                    s[i] = value;
                }
            }
            Input::Object(o) => o.set(key, value),
            Input::Scalar(_) => return Err(ContainerError::NoFields),
        }
        Ok(())
    }

    pub fn delete(&mut self, key: &str) -> Result<(), ContainerError> {
        let removed = match &mut self.inner {
            Input::Map(m) => m.shift_remove(key).is_some(),
            Input::Multi(m) => m.remove(key) > 0,
            Input::Seq(s) => {
                let i = seq_index(key, s.len())?;
                s.remove(i);
                true
            }
            Input::Object(o) => o.remove(key).is_some(),
            Input::Scalar(_) => false,
        };
        self.list_fields.remove(key);
        if removed {
            Ok(())
        } else {
            Err(ContainerError::Missing(key.to_string()))
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        match &self.inner {
            Input::Map(m) => m.contains_key(key),
            Input::Multi(m) => m.contains(key),
            Input::Seq(s) => seq_index(key, s.len()).is_ok(),
            Input::Object(o) => o.contains(key),
            Input::Scalar(_) => false,
        }
    }

    /// Keys currently present, in the input's own order.
    pub fn keys(&self) -> Vec<String> {
        match &self.inner {
            Input::Map(m) => m.keys().cloned().collect(),
            Input::Multi(m) => m.keys(),
            Input::Seq(s) => (0..s.len()).map(|i| i.to_string()).collect(),
            Input::Object(o) => o.keys(),
            Input::Scalar(_) => Vec::new(),
        }
    }

    /// Give back the input in its original shape.
    pub fn unwrap(self) -> Input {
        let Container {
            mut inner,
            list_fields,
        } = self;
        if let Input::Multi(m) = &mut inner {
            for field in &list_fields {
                let items = match m.get(field) {
                    Some(Value::Array(items)) => items.clone(),
                    Some(_) => continue,
                    None => Vec::new(),
                };
                m.set_list(field, items);
            }
        }
        inner
    }
}

fn seq_index(key: &str, len: usize) -> Result<usize, ContainerError> {
    match key.parse::<usize>() {
        Ok(i) if i < len => Ok(i),
        _ => Err(ContainerError::BadIndex(key.to_string(), len)),
    }
}
