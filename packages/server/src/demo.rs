//! The notes application served by the `tessel-server` binary.
//!
//! | Path | Resource | Methods |
//! |------|----------|---------|
//! | `/notes` | `notes`, a collection of `note` | `GET`, `HEAD`, `POST` |
//! | `/notes/{id}` | `note` | `GET`, `HEAD`, `PUT`, `DELETE` |
//! | `/health` | `health` | `GET`, `HEAD` |
//!
//! Notes accept `title` (required), `body`, `priority` (1 to 5) and `tags`;
//! anything else is stripped. Posting to `/notes` answers 201 with a
//! `Location` pointing at the new note.

use std::sync::Arc;

use serde_json::{json, Value};
use tessel::{
    Capability, CapabilitySet, ConverterRegistry, Dataset, FieldRule, Input, ModelError,
    Resource, UrlArgs, Validator,
};

use crate::config::ServerConfig;
use crate::error::SetupError;
use crate::routes::App;
use crate::storage::{into_fields, Storage};

/// One note, addressed by id. The id is `None` while introspecting.
struct NoteRecord {
    storage: Arc<dyn Storage>,
    id: Option<u64>,
}

impl NoteRecord {
    fn id(&self) -> Result<u64, ModelError> {
        self.id
            .ok_or_else(|| ModelError::NotFound("note without an id".into()))
    }
}

impl Dataset for NoteRecord {
    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::from([Capability::Read, Capability::Write, Capability::Delete])
    }

    fn read(&self) -> Result<Value, ModelError> {
        Ok(self.storage.get(self.id()?)?)
    }

    fn write(&self, input: Input) -> Result<Value, ModelError> {
        let fields = into_fields(input.into_value())?;
        Ok(self.storage.replace(self.id()?, fields)?)
    }

    fn delete(&self) -> Result<Value, ModelError> {
        self.storage.remove(self.id()?)?;
        Ok(Value::Null)
    }
}

/// Every note; new ones are made here.
struct NoteList {
    storage: Arc<dyn Storage>,
}

impl Dataset for NoteList {
    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::from([Capability::Read, Capability::Make])
    }

    fn read(&self) -> Result<Value, ModelError> {
        Ok(Value::Array(self.storage.list()))
    }

    fn make(&self, input: Input) -> Result<Value, ModelError> {
        let fields = into_fields(input.into_value())?;
        let id = self.storage.insert(fields);
        Ok(json!({ "id": id }))
    }
}

/// Parse the `id` URL argument. `null` is the introspection placeholder.
fn note_id(args: &UrlArgs) -> Result<Option<u64>, ModelError> {
    match args.get("id") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) => raw
            .parse()
            .map(Some)
            .map_err(|_| ModelError::NotFound(format!("note {raw}"))),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| ModelError::NotFound(format!("note {n}"))),
        Some(other) => Err(ModelError::NotFound(format!("note {other}"))),
    }
}

/// Assemble the notes application over `storage`.
pub fn notes_app(storage: Arc<dyn Storage>, config: &ServerConfig) -> Result<App, SetupError> {
    let record_storage = Arc::clone(&storage);
    let note = Resource::lazy(move |args: &UrlArgs| {
        Ok(NoteRecord {
            storage: Arc::clone(&record_storage),
            id: note_id(args)?,
        })
    })
    .name("note")
    .params(["id"])
    .build();

    let list_storage = Arc::clone(&storage);
    let notes = note
        .lazy_collection(move |_: &UrlArgs| {
            Ok(NoteList {
                storage: Arc::clone(&list_storage),
            })
        })
        .name("notes")
        .build();

    let health = Resource::builder(|_| Ok(json!({ "status": "ok" })))
        .name("health")
        .build();

    let mut validator = Validator::new();
    validator
        .include_collections(config.inherit_rules)
        .restrict(note.name(), ["*title", "body", "priority", "tags"], true);
    validator.enforce(
        note.name(),
        [
            ("title", FieldRule::from("string(maxlength=120)")),
            ("body", FieldRule::from("string")),
            ("priority", FieldRule::from("int(min=1, max=5)")),
            ("tags", FieldRule::from(vec!["string(maxlength=32)"])),
        ],
    )?;

    App::builder()
        .route("/notes", notes)
        .route("/notes/{id}", note)
        .route("/health", health)
        .validator(validator)
        .build(&ConverterRegistry::default())
}
