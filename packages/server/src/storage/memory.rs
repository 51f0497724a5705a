//! In-memory storage implementation.
//!
//! All data is held in RAM behind a [`RwLock`] and is lost when the process
//! exits. Notes live in a [`BTreeMap`] keyed by id, so listing is already in
//! creation order.

use std::collections::BTreeMap;
use std::sync::RwLock;

use serde_json::{Map, Value};

use super::{Storage, StorageError};

struct Inner {
    notes: BTreeMap<u64, Map<String, Value>>,
    next_id: u64,
}

/// Thread-safe, in-memory implementation of [`Storage`].
pub struct MemoryStorage {
    inner: RwLock<Inner>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                notes: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn with_id(id: u64, fields: &Map<String, Value>) -> Value {
    let mut note = Map::with_capacity(fields.len() + 1);
    note.insert("id".into(), Value::from(id));
    note.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
    Value::Object(note)
}

impl Storage for MemoryStorage {
    fn list(&self) -> Vec<Value> {
        let inner = self.inner.read().unwrap();
        inner
            .notes
            .iter()
            .map(|(id, fields)| with_id(*id, fields))
            .collect()
    }

    fn get(&self, id: u64) -> Result<Value, StorageError> {
        let inner = self.inner.read().unwrap();
        inner
            .notes
            .get(&id)
            .map(|fields| with_id(id, fields))
            .ok_or(StorageError::NotFound(id))
    }

    fn insert(&self, mut fields: Map<String, Value>) -> u64 {
        fields.remove("id");
        let mut inner = self.inner.write().unwrap();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.notes.insert(id, fields);
        id
    }

    fn replace(&self, id: u64, mut fields: Map<String, Value>) -> Result<Value, StorageError> {
        fields.remove("id");
        let mut inner = self.inner.write().unwrap();
        let slot = inner.notes.get_mut(&id).ok_or(StorageError::NotFound(id))?;
        *slot = fields;
        Ok(with_id(id, slot))
    }

    fn remove(&self, id: u64) -> Result<(), StorageError> {
        let mut inner = self.inner.write().unwrap();
        inner
            .notes
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound(id))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(v: Value) -> Map<String, Value> {
        super::super::into_fields(v).unwrap()
    }

    #[test]
    fn insert_assigns_sequential_ids() {
        let s = MemoryStorage::new();
        assert_eq!(s.insert(fields(json!({"title": "a"}))), 1);
        assert_eq!(s.insert(fields(json!({"title": "b"}))), 2);
        assert_eq!(s.get(2).unwrap(), json!({"id": 2, "title": "b"}));
        assert_eq!(s.list().len(), 2);
    }

    #[test]
    fn ids_in_bodies_are_ignored() {
        let s = MemoryStorage::new();
        let id = s.insert(fields(json!({"id": 99, "title": "a"})));
        assert_eq!(s.get(id).unwrap(), json!({"id": 1, "title": "a"}));
    }

    #[test]
    fn replace_and_remove() {
        let s = MemoryStorage::new();
        let id = s.insert(fields(json!({"title": "a"})));
        assert_eq!(
            s.replace(id, fields(json!({"title": "b"}))).unwrap(),
            json!({"id": 1, "title": "b"})
        );
        s.remove(id).unwrap();
        assert_eq!(s.get(id), Err(StorageError::NotFound(1)));
        assert_eq!(s.remove(id), Err(StorageError::NotFound(1)));
        assert!(s.replace(id, Map::new()).is_err());
    }
}
