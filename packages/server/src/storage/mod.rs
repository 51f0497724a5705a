//! Storage behind the demo application's notes.
//!
//! The [`Storage`] trait is the contract between the demo's datasets and
//! persistence. Field validation happens before storage is reached; storage
//! only keeps what it is given.
//!
//! # Implementations
//!
//! | Type | When to use |
//! |------|-------------|
//! | [`MemoryStorage`] | Tests and ephemeral servers |
//!
//! [`MemoryStorage`]: memory::MemoryStorage

pub mod memory;

use serde_json::{Map, Value};
use tessel::ModelError;

// ---------------------------------------------------------------------------
// StorageError
// ---------------------------------------------------------------------------

/// Errors that storage operations can return.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StorageError {
    /// The requested note does not exist.
    #[error("note {0} not found")]
    NotFound(u64),

    /// The submitted data is not a JSON object.
    #[error("a note must be an object, got {0}")]
    NotAnObject(Value),
}

/// Lookups become [`ModelError::NotFound`] and thus 404s.
impl From<StorageError> for ModelError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(id) => ModelError::NotFound(format!("note {id}")),
            StorageError::NotAnObject(_) => ModelError::Failed(e.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Storage trait
// ---------------------------------------------------------------------------

/// Persistence for notes. Each note is a JSON object keyed by a numeric id
/// the store assigns.
pub trait Storage: Send + Sync {
    /// Every note, with its `id` field, in id order.
    fn list(&self) -> Vec<Value>;

    /// One note with its `id` field.
    fn get(&self, id: u64) -> Result<Value, StorageError>;

    /// Store a new note and return its id.
    fn insert(&self, fields: Map<String, Value>) -> u64;

    /// Replace an existing note's fields.
    fn replace(&self, id: u64, fields: Map<String, Value>) -> Result<Value, StorageError>;

    fn remove(&self, id: u64) -> Result<(), StorageError>;
}

/// The object inside `value`, or [`StorageError::NotAnObject`].
pub fn into_fields(value: Value) -> Result<Map<String, Value>, StorageError> {
    match value {
        Value::Object(m) => Ok(m),
        other => Err(StorageError::NotAnObject(other)),
    }
}
