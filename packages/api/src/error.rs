//! Standard error response body.

use serde::{Deserialize, Serialize};

/// The JSON body returned for all error responses.
///
/// ```json
/// { "error": "invalid fields: priority, tags", "code": "invalid_fields", "fields": ["priority", "tags"] }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Human-readable description of the problem.
    pub error: String,

    /// Machine-readable error code.
    ///
    /// | `code` | HTTP status |
    /// |--------|------------|
    /// | `invalid_body` | 400 |
    /// | `unexpected_fields` | 400 |
    /// | `missing_fields` | 400 |
    /// | `invalid_fields` | 400 |
    /// | `not_found` | 404 |
    /// | `method_not_allowed` | 405 |
    /// | `unsupported_media_type` | 415 |
    /// | `internal_error` | 500 |
    pub code: String,

    /// Every input field the failure concerns. Present only for the
    /// validation codes, and always complete rather than just the first
    /// offending field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a static code and message.
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            error: error.into(),
            fields: None,
        }
    }

    /// Attach the list of offending fields.
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }
}

/// Well-known error codes.
pub mod codes {
    pub const INVALID_BODY: &str = "invalid_body";
    pub const UNEXPECTED_FIELDS: &str = "unexpected_fields";
    pub const MISSING_FIELDS: &str = "missing_fields";
    pub const INVALID_FIELDS: &str = "invalid_fields";
    pub const NOT_FOUND: &str = "not_found";
    pub const METHOD_NOT_ALLOWED: &str = "method_not_allowed";
    pub const UNSUPPORTED_MEDIA_TYPE: &str = "unsupported_media_type";
    pub const INTERNAL_ERROR: &str = "internal_error";
}
