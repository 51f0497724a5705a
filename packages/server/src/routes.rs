//! Mounted endpoints, reverse URL building, and the assembled [`App`].
//!
//! Routes use axum's path syntax: `/notes/{id}` binds `id`, `/files/{*path}`
//! binds the rest of the path. [`RouteTable`] runs that syntax backwards to
//! build the URL of a resource by name, which is how a collection finds the
//! `Location` of a member it has just created.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tessel::{
    BuildError, ConverterRegistry, Endpoint, Method, PreparedValidator, Request,
    RequestContext, UrlArgs, UrlBuilder, Validator,
};
use tessel_api::{ResourceInfo, ServiceInfo};

use crate::error::{AppError, SetupError};

/// An endpoint mounted under a path.
pub struct Route {
    path: String,
    params: Vec<String>,
    endpoint: Arc<dyn Endpoint>,
}

impl Route {
    fn new(path: String, endpoint: Arc<dyn Endpoint>) -> Self {
        let params = segments(&path)
            .into_iter()
            .filter_map(|s| match s {
                Segment::Param { name, .. } => Some(name.to_string()),
                Segment::Literal(_) => None,
            })
            .collect();
        Self {
            path,
            params,
            endpoint,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Names of the path parameters, in order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn endpoint(&self) -> &dyn Endpoint {
        self.endpoint.as_ref()
    }
}

/// Every mounted route, in mount order. Resource names are unique.
#[derive(Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn get(&self, index: usize) -> Option<&Route> {
        self.routes.get(index)
    }

    /// The route serving the resource called `name`.
    pub fn find(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.endpoint.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Fills the route's parameters from `args`, percent-encoding each value.
/// Arguments the route does not bind become the query string; `null`
/// arguments are left out.
impl UrlBuilder for RouteTable {
    fn build(&self, resource: &str, args: &UrlArgs) -> Result<String, BuildError> {
        let route = self
            .find(resource)
            .ok_or_else(|| BuildError::UnknownResource(resource.to_string()))?;

        let mut url = String::new();
        for segment in segments(&route.path) {
            match segment {
                Segment::Literal(text) => url.push_str(text),
                Segment::Param { name, wildcard } => {
                    let value = args.get(name).filter(|v| !v.is_null()).ok_or_else(|| {
                        BuildError::MissingArgument {
                            resource: resource.to_string(),
                            argument: name.to_string(),
                        }
                    })?;
                    let text = arg_text(value);
                    if wildcard {
                        let parts: Vec<String> = text
                            .split('/')
                            .map(|p| urlencoding::encode(p).into_owned())
                            .collect();
                        url.push_str(&parts.join("/"));
                    } else {
                        url.push_str(&urlencoding::encode(&text));
                    }
                }
            }
        }

        let query: Vec<String> = args
            .iter()
            .filter(|(k, v)| !v.is_null() && !route.params.iter().any(|p| p == *k))
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    urlencoding::encode(k),
                    urlencoding::encode(&arg_text(v))
                )
            })
            .collect();
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.join("&"));
        }
        Ok(url)
    }
}

enum Segment<'a> {
    Literal(&'a str),
    Param { name: &'a str, wildcard: bool },
}

fn segments(path: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        if start > 0 {
            out.push(Segment::Literal(&rest[..start]));
        }
        let inner = &rest[start + 1..start + len];
        out.push(Segment::Param {
            name: inner.trim_start_matches('*'),
            wildcard: inner.starts_with('*'),
        });
        rest = &rest[start + len + 1..];
    }
    if !rest.is_empty() {
        out.push(Segment::Literal(rest));
    }
    out
}

fn arg_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Collects routes and validation rules; [`AppBuilder::build`] is the
/// start-up step that seals them.
#[derive(Default)]
pub struct AppBuilder {
    routes: Vec<(String, Arc<dyn Endpoint>)>,
    validator: Option<Validator>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, path: impl Into<String>, endpoint: impl Endpoint + 'static) -> Self {
        self.route_shared(path, Arc::new(endpoint))
    }

    pub fn route_shared(mut self, path: impl Into<String>, endpoint: Arc<dyn Endpoint>) -> Self {
        self.routes.push((path.into(), endpoint));
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Check the routes and prepare the validator against `registry`.
    pub fn build(self, registry: &ConverterRegistry) -> Result<App, SetupError> {
        let mut names = HashSet::new();
        let mut paths = HashSet::new();
        let mut table = RouteTable::default();
        for (path, endpoint) in self.routes {
            if !names.insert(endpoint.name().to_string()) {
                return Err(SetupError::DuplicateName(endpoint.name().to_string()));
            }
            if !paths.insert(path.clone()) {
                return Err(SetupError::DuplicatePath(path));
            }
            table.routes.push(Route::new(path, endpoint));
        }

        let validator = self
            .validator
            .map(|v| v.prepare(registry))
            .transpose()?;

        tracing::info!("app: {} routes mounted", table.len());
        Ok(App {
            routes: table,
            validator,
        })
    }
}

/// A response rendered by the endpoint's formatter.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Routes plus sealed validation rules. Immutable; shared behind an `Arc`.
pub struct App {
    routes: RouteTable,
    validator: Option<PreparedValidator>,
}

impl App {
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn validator(&self) -> Option<&PreparedValidator> {
        self.validator.as_ref()
    }

    /// The discovery document: every route with its introspected methods.
    pub fn service_info(&self) -> ServiceInfo {
        let mut info = ServiceInfo::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        info.resources = self
            .routes
            .iter()
            .map(|route| ResourceInfo {
                name: route.endpoint.name().to_string(),
                path: route.path.clone(),
                methods: route.endpoint.supported_methods().names(),
                collects: route.endpoint.collects().map(str::to_string),
            })
            .collect();
        info
    }

    /// Dispatch and format one request to the route at `index`.
    ///
    /// Synchronous; handlers may block. The body reaches the endpoint
    /// unparsed, so methods that ignore it never fail on it.
    pub fn handle(
        &self,
        index: usize,
        method: Method,
        content_type: Option<&str>,
        body: &[u8],
        url_args: &UrlArgs,
    ) -> Result<Rendered, AppError> {
        let route = self
            .routes
            .get(index)
            .ok_or_else(|| AppError::NotFound(format!("no route #{index}")))?;
        let endpoint = route.endpoint();

        let mut cx = RequestContext::new(&self.routes);
        if let Some(v) = &self.validator {
            cx = cx.with_validator(v);
        }
        let response = endpoint.handle_request(cx, Request::raw(method, content_type, body), url_args);

        let (content_type, body) = endpoint
            .formatter()
            .format(&response.body)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(Rendered {
            status: response.status,
            headers: response.headers.into_iter().collect(),
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tessel::{DataModel, Resource};

    fn table(paths: &[(&str, &str)]) -> App {
        let mut builder = App::builder();
        for (name, path) in paths {
            builder = builder.route(
                *path,
                Resource::builder(|_| Ok(Value::Null)).name(*name).build(),
            );
        }
        builder.build(&ConverterRegistry::default()).unwrap()
    }

    fn args(v: Value) -> UrlArgs {
        match v {
            Value::Object(m) => m,
            _ => panic!("args must be an object"),
        }
    }

    #[test]
    fn params_are_substituted_and_encoded() {
        let app = table(&[("note", "/notes/{id}")]);
        let routes = app.routes();
        assert_eq!(routes.build("note", &args(json!({"id": 7}))).unwrap(), "/notes/7");
        assert_eq!(
            routes.build("note", &args(json!({"id": "a b/c"}))).unwrap(),
            "/notes/a%20b%2Fc"
        );
        assert_eq!(routes.get(0).unwrap().params(), ["id"]);
    }

    #[test]
    fn extra_args_become_the_query() {
        let app = table(&[("note", "/notes/{id}")]);
        let url = app
            .routes()
            .build("note", &args(json!({"id": 1, "view": "full", "skip": null})))
            .unwrap();
        assert_eq!(url, "/notes/1?view=full");
    }

    #[test]
    fn wildcards_keep_slashes() {
        let app = table(&[("file", "/files/{*path}")]);
        let url = app
            .routes()
            .build("file", &args(json!({"path": "a/b c"})))
            .unwrap();
        assert_eq!(url, "/files/a/b%20c");
    }

    #[test]
    fn build_failures() {
        let app = table(&[("note", "/notes/{id}")]);
        assert_eq!(
            app.routes().build("note", &UrlArgs::new()),
            Err(BuildError::MissingArgument {
                resource: "note".into(),
                argument: "id".into()
            })
        );
        assert_eq!(
            app.routes().build("nope", &UrlArgs::new()),
            Err(BuildError::UnknownResource("nope".into()))
        );
    }

    #[test]
    fn duplicate_mounts_are_rejected() {
        let err = App::builder()
            .route("/a", Resource::builder(|_| Ok(Value::Null)).name("x").build())
            .route("/b", Resource::builder(|_| Ok(Value::Null)).name("x").build())
            .build(&ConverterRegistry::default());
        assert!(matches!(err, Err(SetupError::DuplicateName(_))));

        let err = App::builder()
            .route("/a", Resource::builder(|_| Ok(Value::Null)).name("x").build())
            .route("/a", Resource::builder(|_| Ok(Value::Null)).name("y").build())
            .build(&ConverterRegistry::default());
        assert!(matches!(err, Err(SetupError::DuplicatePath(_))));
    }

    #[test]
    fn unknown_converters_abort_build() {
        let mut v = Validator::new();
        v.enforce("x", [("n", "nope")]).unwrap();
        let err = App::builder()
            .validator(v)
            .build(&ConverterRegistry::default());
        assert!(matches!(err, Err(SetupError::Spec(_))));
    }

    #[test]
    fn handle_formats_the_response() {
        let app = App::builder()
            .route(
                "/hello",
                Resource::builder(|_| Ok(json!({"hi": true}))).name("hello").build(),
            )
            .build(&ConverterRegistry::default())
            .unwrap();
        let out = app
            .handle(0, Method::Get, None, b"", &UrlArgs::new())
            .unwrap();
        assert_eq!(out.status, 200);
        assert_eq!(out.content_type, "application/json");
        assert_eq!(out.body, br#"{"hi":true}"#);
    }

    #[test]
    fn bodies_are_parsed_only_when_consumed() {
        let app = App::builder()
            .route(
                "/x",
                Resource::builder(|_| Ok(json!("x")))
                    .name("x")
                    .model(DataModel::new().with_write(|input| Ok(input.into_value())))
                    .build(),
            )
            .build(&ConverterRegistry::default())
            .unwrap();
        let send = |method: Method, content_type: &str, body: &[u8]| {
            app.handle(0, method, Some(content_type), body, &UrlArgs::new())
                .unwrap()
        };

        assert_eq!(send(Method::Get, "application/json", b"{").status, 200);
        assert_eq!(send(Method::Delete, "text/csv", b"a,b").status, 405);
        assert_eq!(send(Method::Put, "application/json", b"{").status, 400);
        assert_eq!(send(Method::Put, "text/csv", b"a,b").status, 415);
        let out = send(Method::Put, "application/json", br#"{"a":1}"#);
        assert_eq!(out.body, br#"{"a":1}"#);
    }
}
