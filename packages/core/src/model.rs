//! Data models: the capability sets resources dispatch onto.
//!
//! A [`DataModel`] is a bundle of up to four optional operations:
//!
//! | Capability | Operation | HTTP method |
//! |------------|-----------|-------------|
//! | [`Capability::Read`] | `read()` | `GET`, `HEAD` |
//! | [`Capability::Write`] | `write(input)` | `PUT` |
//! | [`Capability::Delete`] | `delete()` | `DELETE` |
//! | [`Capability::Make`] | `make(input)` | `POST` (collections only) |
//!
//! Which methods a resource accepts is decided by which operations its
//! model carries at request time, never by a static declaration. Models are
//! combined with [`DataModel::compose`], a union in which the upper model
//! wins wherever both define an operation.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::input::Input;

/// Errors a model operation can return.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    /// The addressed item does not exist. Default error handling turns this
    /// into a 404.
    #[error("{0} not found")]
    NotFound(String),

    /// The model was asked for an operation it does not carry.
    #[error("model does not support {0}")]
    Unsupported(Capability),

    /// Any other failure inside the model.
    #[error("{0}")]
    Failed(String),
}

/// One of the four operations a model may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    Read,
    Write,
    Delete,
    Make,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Capability::Read => "read",
            Capability::Write => "write",
            Capability::Delete => "delete",
            Capability::Make => "make",
        })
    }
}

pub type CapabilitySet = BTreeSet<Capability>;

pub type ReadFn = Arc<dyn Fn() -> Result<Value, ModelError> + Send + Sync>;
pub type WriteFn = Arc<dyn Fn(Input) -> Result<Value, ModelError> + Send + Sync>;

/// A set of optional capability handles.
///
/// Cloning is cheap: every handle is reference counted.
#[derive(Clone, Default)]
pub struct DataModel {
    read: Option<ReadFn>,
    write: Option<WriteFn>,
    delete: Option<ReadFn>,
    make: Option<WriteFn>,
}

impl fmt::Debug for DataModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.capabilities()).finish()
    }
}

impl DataModel {
    /// A model with no capabilities.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_read<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Result<Value, ModelError> + Send + Sync + 'static,
    {
        self.read = Some(Arc::new(f));
        self
    }

    pub fn with_write<F>(mut self, f: F) -> Self
    where
        F: Fn(Input) -> Result<Value, ModelError> + Send + Sync + 'static,
    {
        self.write = Some(Arc::new(f));
        self
    }

    pub fn with_delete<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Result<Value, ModelError> + Send + Sync + 'static,
    {
        self.delete = Some(Arc::new(f));
        self
    }

    pub fn with_make<F>(mut self, f: F) -> Self
    where
        F: Fn(Input) -> Result<Value, ModelError> + Send + Sync + 'static,
    {
        self.make = Some(Arc::new(f));
        self
    }

    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Read => self.read.is_some(),
            Capability::Write => self.write.is_some(),
            Capability::Delete => self.delete.is_some(),
            Capability::Make => self.make.is_some(),
        }
    }

    pub fn capabilities(&self) -> CapabilitySet {
        [
            Capability::Read,
            Capability::Write,
            Capability::Delete,
            Capability::Make,
        ]
        .into_iter()
        .filter(|c| self.has(*c))
        .collect()
    }

    /// Union of two models. Where both carry an operation, `upper`'s wins.
    pub fn compose(lower: &DataModel, upper: &DataModel) -> DataModel {
        DataModel {
            read: upper.read.clone().or_else(|| lower.read.clone()),
            write: upper.write.clone().or_else(|| lower.write.clone()),
            delete: upper.delete.clone().or_else(|| lower.delete.clone()),
            make: upper.make.clone().or_else(|| lower.make.clone()),
        }
    }

    /// A model whose capabilities are exactly those the dataset reports.
    pub fn from_dataset(dataset: Arc<dyn Dataset>) -> DataModel {
        let caps = dataset.capabilities();
        let mut model = DataModel::new();
        if caps.contains(&Capability::Read) {
            let ds = Arc::clone(&dataset);
            model = model.with_read(move || ds.read());
        }
        if caps.contains(&Capability::Write) {
            let ds = Arc::clone(&dataset);
            model = model.with_write(move |input| ds.write(input));
        }
        if caps.contains(&Capability::Delete) {
            let ds = Arc::clone(&dataset);
            model = model.with_delete(move || ds.delete());
        }
        if caps.contains(&Capability::Make) {
            let ds = Arc::clone(&dataset);
            model = model.with_make(move |input| ds.make(input));
        }
        model
    }

    pub fn read(&self) -> Result<Value, ModelError> {
        let f = self.read.as_ref().ok_or(ModelError::Unsupported(Capability::Read))?;
        f()
    }

    pub fn write(&self, input: Input) -> Result<Value, ModelError> {
        let f = self.write.as_ref().ok_or(ModelError::Unsupported(Capability::Write))?;
        f(input)
    }

    pub fn delete(&self) -> Result<Value, ModelError> {
        let f = self.delete.as_ref().ok_or(ModelError::Unsupported(Capability::Delete))?;
        f()
    }

    pub fn make(&self, input: Input) -> Result<Value, ModelError> {
        let f = self.make.as_ref().ok_or(ModelError::Unsupported(Capability::Make))?;
        f(input)
    }
}

/// Data returned by a lazy resource's handler.
///
/// A dataset describes its own shape through [`Dataset::capabilities`]; the
/// resource wraps it with [`DataModel::from_dataset`] and only the reported
/// operations are ever called. A collection-like dataset typically reports
/// `read` and `make`; a single record reports `read`, `write` and `delete`.
pub trait Dataset: Send + Sync {
    fn capabilities(&self) -> CapabilitySet;

    fn read(&self) -> Result<Value, ModelError>;

    fn write(&self, _input: Input) -> Result<Value, ModelError> {
        Err(ModelError::Unsupported(Capability::Write))
    }

    fn delete(&self) -> Result<Value, ModelError> {
        Err(ModelError::Unsupported(Capability::Delete))
    }

    fn make(&self, _input: Input) -> Result<Value, ModelError> {
        Err(ModelError::Unsupported(Capability::Make))
    }
}

/// A plain value is a read-only dataset.
impl Dataset for Value {
    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::from([Capability::Read])
    }

    fn read(&self) -> Result<Value, ModelError> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    struct Counter {
        value: Mutex<i64>,
    }

    impl Dataset for Counter {
        fn capabilities(&self) -> CapabilitySet {
            CapabilitySet::from([Capability::Read, Capability::Write])
        }

        fn read(&self) -> Result<Value, ModelError> {
            Ok(json!(*self.value.lock().unwrap()))
        }

        fn write(&self, input: Input) -> Result<Value, ModelError> {
            let n = input
                .into_value()
                .as_i64()
                .ok_or_else(|| ModelError::Failed("expected an integer".into()))?;
            *self.value.lock().unwrap() = n;
            Ok(json!(n))
        }
    }

    #[test]
    fn empty_model_has_nothing() {
        let m = DataModel::new();
        assert!(m.capabilities().is_empty());
        assert_eq!(m.read(), Err(ModelError::Unsupported(Capability::Read)));
    }

    #[test]
    fn compose_is_a_union_with_upper_winning() {
        let lower = DataModel::new()
            .with_read(|| Ok(json!("lower")))
            .with_delete(|| Ok(Value::Null));
        let upper = DataModel::new()
            .with_read(|| Ok(json!("upper")))
            .with_write(|_| Ok(json!("written")));
        let m = DataModel::compose(&lower, &upper);
        assert_eq!(
            m.capabilities(),
            CapabilitySet::from([Capability::Read, Capability::Write, Capability::Delete])
        );
        assert_eq!(m.read(), Ok(json!("upper")));
        assert_eq!(m.delete(), Ok(Value::Null));
    }

    #[test]
    fn dataset_shape_decides_capabilities() {
        let counter = Arc::new(Counter {
            value: Mutex::new(1),
        });
        let m = DataModel::from_dataset(counter);
        assert!(m.has(Capability::Read));
        assert!(m.has(Capability::Write));
        assert!(!m.has(Capability::Delete));
        assert_eq!(m.write(Input::from(json!(5))), Ok(json!(5)));
        assert_eq!(m.read(), Ok(json!(5)));
    }

    #[test]
    fn values_are_read_only_datasets() {
        let m = DataModel::from_dataset(Arc::new(json!({"a": 1})));
        assert_eq!(m.capabilities(), CapabilitySet::from([Capability::Read]));
        assert_eq!(m.read(), Ok(json!({"a": 1})));
    }
}
