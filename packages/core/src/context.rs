//! Request-scoped state threaded explicitly through dispatch.
//!
//! Nothing in the core is ambient: the URL builder, the validator and the
//! response being assembled all travel in a [`RequestContext`] that the
//! transport creates per request and drops afterwards.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::content::{ContentError, Parser};
use crate::input::Input;
use crate::method::Method;
use crate::validator::PreparedValidator;

/// Arguments extracted from the request URL by the router.
pub type UrlArgs = Map<String, Value>;

/// An inbound request, as far as the core cares.
#[derive(Debug)]
pub struct Request {
    pub method: Method,
    pub body: Body,
}

impl Request {
    /// A request whose input is already parsed.
    pub fn new(method: impl Into<Method>, input: Input) -> Self {
        Self {
            method: method.into(),
            body: Body::Parsed(input),
        }
    }

    /// A request carrying the body as received. It is parsed with the
    /// resource's parser only when `PUT` or `POST` consumes it.
    pub fn raw(
        method: impl Into<Method>,
        content_type: Option<&str>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            method: method.into(),
            body: Body::Raw {
                content_type: content_type.map(str::to_string),
                bytes: bytes.into(),
            },
        }
    }

    /// A request without a body.
    pub fn bodyless(method: impl Into<Method>) -> Self {
        Self::new(method, Input::default())
    }
}

/// A request body, parsed or not yet.
#[derive(Debug)]
pub enum Body {
    Parsed(Input),
    Raw {
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
}

impl Body {
    /// The body as [`Input`]. Empty raw bodies skip the parser.
    pub fn into_input(self, parser: &dyn Parser) -> Result<Input, ContentError> {
        match self {
            Body::Parsed(input) => Ok(input),
            Body::Raw { bytes, .. } if bytes.is_empty() => Ok(Input::default()),
            Body::Raw {
                content_type,
                bytes,
            } => parser.parse(content_type.as_deref(), &bytes),
        }
    }
}

/// What a resource hands back to the transport: a status, headers, and a
/// body for the formatter.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub headers: IndexMap<String, String>,
    pub body: Value,
}

impl Response {
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: IndexMap::new(),
            body,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Response fields set while a request is in flight.
///
/// Setters only fill in values nobody has set yet, so an earlier, more
/// specific decision is never overwritten by a later default.
#[derive(Debug, Default)]
pub struct ResponseDraft {
    status: Option<u16>,
    headers: IndexMap<String, String>,
}

impl ResponseDraft {
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn set_default_status(&mut self, status: u16) {
        self.status.get_or_insert(status);
    }

    pub fn set_default_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers
            .entry(name.to_string())
            .or_insert_with(|| value.into());
    }

    /// Turn the draft into a response around `body`. Status defaults to 200.
    pub fn finish(self, body: Value) -> Response {
        Response {
            status: self.status.unwrap_or(200),
            headers: self.headers,
            body,
        }
    }
}

/// Failure to build a URL for a resource.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildError {
    #[error("no route is registered for resource {0:?}")]
    UnknownResource(String),

    #[error("route for {resource:?} needs argument {argument:?}")]
    MissingArgument { resource: String, argument: String },
}

/// Reverse URL construction, supplied by the router.
pub trait UrlBuilder: Send + Sync {
    fn build(&self, resource: &str, args: &UrlArgs) -> Result<String, BuildError>;
}

impl<F> UrlBuilder for F
where
    F: Fn(&str, &UrlArgs) -> Result<String, BuildError> + Send + Sync,
{
    fn build(&self, resource: &str, args: &UrlArgs) -> Result<String, BuildError> {
        self(resource, args)
    }
}

/// A builder that knows no routes; every build fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRoutes;

impl UrlBuilder for NoRoutes {
    fn build(&self, resource: &str, _args: &UrlArgs) -> Result<String, BuildError> {
        Err(BuildError::UnknownResource(resource.to_string()))
    }
}

/// Everything a resource may consult or modify while handling one request.
pub struct RequestContext<'a> {
    pub url_builder: &'a dyn UrlBuilder,
    pub validator: Option<&'a PreparedValidator>,
    pub response: ResponseDraft,
}

impl<'a> RequestContext<'a> {
    pub fn new(url_builder: &'a dyn UrlBuilder) -> Self {
        Self {
            url_builder,
            validator: None,
            response: ResponseDraft::default(),
        }
    }

    pub fn with_validator(mut self, validator: &'a PreparedValidator) -> Self {
        self.validator = Some(validator);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn draft_defaults_do_not_overwrite() {
        let mut draft = ResponseDraft::default();
        draft.set_default_status(202);
        draft.set_default_status(201);
        draft.set_default_header("Location", "/a");
        draft.set_default_header("Location", "/b");
        let resp = draft.finish(json!(null));
        assert_eq!(resp.status, 202);
        assert_eq!(resp.header("location"), Some("/a"));
    }

    #[test]
    fn draft_status_defaults_to_ok() {
        assert_eq!(ResponseDraft::default().finish(json!(1)).status, 200);
    }

    #[test]
    fn closures_build_urls() {
        let builder = |name: &str, args: &UrlArgs| -> Result<String, BuildError> {
            Ok(format!("/{name}/{}", args["id"]))
        };
        let mut args = UrlArgs::new();
        args.insert("id".into(), json!(7));
        assert_eq!(builder.build("notes", &args).unwrap(), "/notes/7");
        assert!(NoRoutes.build("notes", &args).is_err());
    }
}
