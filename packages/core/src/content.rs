//! Body parsing and response formatting.
//!
//! Every resource carries one [`Parser`] and one [`Formatter`]. The parser
//! runs only when `PUT` or `POST` consumes the body, after the method check;
//! the transport formats whatever response comes back. Picking between
//! several representations is left to the application.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::input::{Input, MultiMap};

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("unsupported content type {0:?}")]
    Unsupported(String),

    #[error("malformed JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed form body: {0}")]
    Form(String),
}

/// Turns a request body into [`Input`].
pub trait Parser: Send + Sync {
    fn parse(&self, content_type: Option<&str>, body: &[u8]) -> Result<Input, ContentError>;
}

/// Turns a response body into a content type and bytes.
pub trait Formatter: Send + Sync {
    fn format(&self, body: &Value) -> Result<(String, Vec<u8>), ContentError>;
}

/// JSON bodies, plus `application/x-www-form-urlencoded` forms which come
/// out as [`Input::Multi`]. A missing content type is read as JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonParser;

impl Parser for JsonParser {
    fn parse(&self, content_type: Option<&str>, body: &[u8]) -> Result<Input, ContentError> {
        let media = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|m| m.trim().to_ascii_lowercase());
        match media.as_deref() {
            None | Some("application/json") => parse_json(body),
            Some(m) if m.ends_with("+json") => parse_json(body),
            Some("application/x-www-form-urlencoded") => parse_form(body).map(Input::Multi),
            Some(other) => Err(ContentError::Unsupported(other.to_string())),
        }
    }
}

/// Compact JSON, `application/json`.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, body: &Value) -> Result<(String, Vec<u8>), ContentError> {
        Ok(("application/json".to_string(), serde_json::to_vec(body)?))
    }
}

pub(crate) fn default_parser() -> Arc<dyn Parser> {
    Arc::new(JsonParser)
}

pub(crate) fn default_formatter() -> Arc<dyn Formatter> {
    Arc::new(JsonFormatter)
}

fn parse_json(body: &[u8]) -> Result<Input, ContentError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Input::default());
    }
    let value: Value = serde_json::from_slice(body)?;
    Ok(Input::from(value))
}

fn parse_form(body: &[u8]) -> Result<MultiMap, ContentError> {
    let text = std::str::from_utf8(body).map_err(|e| ContentError::Form(e.to_string()))?;
    let mut form = MultiMap::new();
    for pair in text.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        form.append(decode_component(key)?, decode_component(value)?);
    }
    Ok(form)
}

fn decode_component(raw: &str) -> Result<String, ContentError> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .map_err(|e| ContentError::Form(e.to_string()))
}
