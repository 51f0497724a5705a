//! Resource dispatch and input validation for the tessel HTTP API toolkit.
//!
//! This crate is transport-agnostic. It decides which methods a resource
//! accepts, maps them onto a data model, and checks request input before
//! the model sees it. Routing, serving and content negotiation belong to
//! the transport; `tessel-server` binds this crate to axum.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`resource`] | [`Resource`], the [`Endpoint`] trait, model composition and dispatch |
//! | [`collection`] | [`Collection`]: `POST`/`make` and the `Location` header |
//! | [`model`] | [`DataModel`] capability sets and lazy [`Dataset`]s |
//! | [`validator`] | [`Validator`] rules, converters and [`PreparedValidator`] |
//! | [`container`] | Uniform field access over every [`Input`] shape |
//! | [`input`] | [`Input`] and the multi-valued [`MultiMap`] |
//! | [`context`] | [`RequestContext`], [`Request`], [`Response`], [`UrlBuilder`] |
//! | [`content`] | Body [`Parser`]s and response [`Formatter`]s |
//! | [`error`] | [`DispatchError`] and [`ErrorHandler`] |
//! | [`method`] | [`Method`] and [`MethodSet`] |
//!
//! # Quick start
//!
//! ```rust,ignore
//! use tessel::{ConverterRegistry, Endpoint, NoRoutes, Request, RequestContext, Resource, UrlArgs, Validator};
//!
//! let note = Resource::builder(|args: &UrlArgs| Ok(serde_json::json!({ "id": args["id"] })))
//!     .name("note")
//!     .build();
//!
//! let mut validator = Validator::new();
//! validator.enforce(note.name(), [("priority", "int(min=1, max=5)")])?;
//! let validator = validator.prepare(&ConverterRegistry::default())?;
//!
//! let cx = RequestContext::new(&NoRoutes).with_validator(&validator);
//! let response = note.handle_request(cx, Request::bodyless("GET"), &url_args);
//! ```

pub mod collection;
pub mod container;
pub mod content;
pub mod context;
pub mod error;
pub mod input;
pub mod method;
pub mod model;
pub mod resource;
pub mod validator;

pub use collection::{Collection, CollectionBuilder};
pub use container::{Container, ContainerError};
pub use content::{ContentError, Formatter, JsonFormatter, JsonParser, Parser};
pub use context::{
    Body, BuildError, NoRoutes, Request, RequestContext, Response, ResponseDraft, UrlArgs, UrlBuilder,
};
pub use error::{DefaultErrorHandler, DispatchError, ErrorHandler};
pub use input::{Fields, Input, MultiMap};
pub use method::{Method, MethodSet};
pub use model::{Capability, CapabilitySet, DataModel, Dataset, ModelError};
pub use resource::{Endpoint, Resource, ResourceBuilder};
pub use validator::{
    callables, ConversionError, Converter, ConverterRegistry, FieldRule, PreparedValidator,
    SpecError, Target, ValidationError, Validator,
};
