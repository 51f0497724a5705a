//! Service discovery document: `GET /.well-known/tessel`.

use serde::{Deserialize, Serialize};

/// Describes every mounted resource and the methods its current data model
/// supports.
///
/// # Example
///
/// ```json
/// {
///   "service": "tessel-server",
///   "version": "0.1.0",
///   "resources": [
///     { "name": "notes", "path": "/notes", "methods": ["GET", "HEAD", "POST"] },
///     { "name": "note", "path": "/notes/{id}", "methods": ["DELETE", "GET", "HEAD", "PUT"] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceInfo {
    /// Name of the serving binary.
    pub service: String,

    /// Version of the serving binary.
    pub version: String,

    /// Mounted resources, in mount order.
    pub resources: Vec<ResourceInfo>,
}

/// One entry of [`ServiceInfo::resources`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceInfo {
    /// Unique resource name, as used for reverse URL building.
    pub name: String,

    /// Route the resource is mounted on, in axum path syntax.
    pub path: String,

    /// Methods found by introspecting the resource's data model, sorted.
    /// Lazy resources are introspected with placeholder arguments, so this
    /// is a best-effort answer.
    pub methods: Vec<String>,

    /// Name of the resource this one collects, for collections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collects: Option<String>,
}

impl ServiceInfo {
    pub fn new(service: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            version: version.into(),
            resources: Vec::new(),
        }
    }
}
