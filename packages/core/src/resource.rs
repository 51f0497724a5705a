//! Resources: named endpoints that map HTTP methods onto a data model.
//!
//! A [`Resource`] wraps a handler and an optional declared [`DataModel`].
//! On every request it composes the *effective* model and offers exactly
//! the methods that model supports:
//!
//! | Method | Needs | Calls |
//! |--------|-------|-------|
//! | `GET`, `HEAD` | always offered | `read()` |
//! | `PUT` | `write` | `write(input)` |
//! | `DELETE` | `delete` | `delete()` |
//! | `POST` | `make`, collections only | `make(input)` |
//!
//! Handlers come in two kinds. A plain handler returns the resource's data;
//! when the declared model has no `read`, one is synthesized that calls the
//! handler with the request's URL arguments. A *lazy* handler returns a
//! [`Dataset`] whose own capabilities shape the model, with the declared
//! model layered on top.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::collection::CollectionBuilder;
use crate::content::{default_formatter, default_parser, Formatter, Parser};
use crate::context::{Request, RequestContext, Response, UrlArgs};
use crate::error::{default_handler, DispatchError, ErrorHandler};
use crate::input::Input;
use crate::method::{Method, MethodSet};
use crate::model::{Capability, DataModel, Dataset, ModelError};
use crate::validator::{Target, ValidationError};

pub type DataFn = Arc<dyn Fn(&UrlArgs) -> Result<Value, ModelError> + Send + Sync>;
pub type LazyFn = Arc<dyn Fn(&UrlArgs) -> Result<Arc<dyn Dataset>, ModelError> + Send + Sync>;

#[derive(Clone)]
pub(crate) enum Handler {
    Data(DataFn),
    Lazy(LazyFn),
}

/// Anything the transport can route requests to.
pub trait Endpoint: Send + Sync {
    fn name(&self) -> &str;

    /// For a collection, the name of the resource it collects.
    fn collects(&self) -> Option<&str> {
        None
    }

    /// Methods offered when no request is in flight, found by introspecting
    /// the model.
    fn supported_methods(&self) -> MethodSet;

    /// Handle one request. Never fails: errors become the error handler's
    /// response.
    fn handle_request(
        &self,
        cx: RequestContext<'_>,
        request: Request,
        url_args: &UrlArgs,
    ) -> Response;

    fn parser(&self) -> &dyn Parser;

    fn formatter(&self) -> &dyn Formatter;

    fn target(&self) -> Target<'_> {
        Target {
            name: self.name(),
            collects: self.collects(),
        }
    }
}

/// A routed endpoint backed by a handler and a data model.
///
/// Immutable once built; share it behind an `Arc`.
pub struct Resource {
    name: String,
    handler: Handler,
    params: Vec<String>,
    model: DataModel,
    parser: Arc<dyn Parser>,
    formatter: Arc<dyn Formatter>,
    error_handler: Arc<dyn ErrorHandler>,
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("name", &self.name)
            .field("lazy", &self.is_lazy())
            .field("params", &self.params)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl Resource {
    /// Start a resource whose handler returns its data.
    pub fn builder<F>(handler: F) -> ResourceBuilder
    where
        F: Fn(&UrlArgs) -> Result<Value, ModelError> + Send + Sync + 'static,
    {
        ResourceBuilder::new(Handler::Data(Arc::new(handler)))
    }

    /// Start a resource whose handler returns a [`Dataset`].
    pub fn lazy<F, D>(handler: F) -> ResourceBuilder
    where
        F: Fn(&UrlArgs) -> Result<D, ModelError> + Send + Sync + 'static,
        D: Dataset + 'static,
    {
        ResourceBuilder::new(Handler::Lazy(lazy_fn(handler)))
    }

    /// Start a collection of this resource with a data handler.
    pub fn collection<F>(&self, handler: F) -> CollectionBuilder
    where
        F: Fn(&UrlArgs) -> Result<Value, ModelError> + Send + Sync + 'static,
    {
        CollectionBuilder::new(&self.name, Handler::Data(Arc::new(handler)))
    }

    /// Start a collection of this resource with a lazy handler.
    pub fn lazy_collection<F, D>(&self, handler: F) -> CollectionBuilder
    where
        F: Fn(&UrlArgs) -> Result<D, ModelError> + Send + Sync + 'static,
        D: Dataset + 'static,
    {
        CollectionBuilder::new(&self.name, Handler::Lazy(lazy_fn(handler)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self.handler, Handler::Lazy(_))
    }

    /// URL parameter names the handler expects.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// The declared model, before composition.
    pub fn model(&self) -> &DataModel {
        &self.model
    }

    /// Call the handler directly. A lazy handler's dataset is read.
    pub fn call(&self, args: &UrlArgs) -> Result<Value, ModelError> {
        match &self.handler {
            Handler::Data(f) => f(args),
            Handler::Lazy(f) => f(args)?.read(),
        }
    }

    /// The effective model for a request with `args`, or for introspection
    /// when `args` is `None`.
    ///
    /// Introspection calls a lazy handler with `null` for every declared
    /// parameter; the resulting model describes capabilities only and must
    /// not serve a request.
    pub fn compose_model(&self, args: Option<&UrlArgs>) -> Result<DataModel, ModelError> {
        match (&self.handler, args) {
            (Handler::Lazy(f), args) => {
                let placeholders;
                let args = match args {
                    Some(args) => args,
                    None => {
                        placeholders = self
                            .params
                            .iter()
                            .map(|p| (p.clone(), Value::Null))
                            .collect::<UrlArgs>();
                        &placeholders
                    }
                };
                let dataset = DataModel::from_dataset(f(args)?);
                Ok(DataModel::compose(&dataset, &self.model))
            }
            (Handler::Data(f), Some(args)) if !self.model.has(Capability::Read) => {
                let f = Arc::clone(f);
                let args = args.clone();
                let synthetic = DataModel::new().with_read(move || f(&args));
                Ok(DataModel::compose(&synthetic, &self.model))
            }
            _ => Ok(self.model.clone()),
        }
    }

    /// Methods `model` supports: `GET` and `HEAD` always, plus `PUT` for
    /// `write` and `DELETE` for `delete`.
    pub fn methods_for(&self, model: &DataModel) -> MethodSet {
        let mut methods = MethodSet::readable();
        if model.has(Capability::Delete) {
            methods.insert(Method::Delete);
        }
        if model.has(Capability::Write) {
            methods.insert(Method::Put);
        }
        methods
    }

    /// The introspection model, degraded to an empty one when the handler
    /// fails on placeholder arguments.
    pub(crate) fn introspect(&self) -> DataModel {
        self.compose_model(None).unwrap_or_else(|e| {
            tracing::warn!("resource {}: introspection failed: {e}", self.name);
            DataModel::new()
        })
    }

    /// Compose the model for `url_args`, run `step`, and turn the outcome
    /// into a response.
    pub(crate) fn run<F>(
        &self,
        mut cx: RequestContext<'_>,
        request: Request,
        url_args: &UrlArgs,
        step: F,
    ) -> Response
    where
        F: FnOnce(&mut RequestContext<'_>, Request, &DataModel) -> Result<Value, DispatchError>,
    {
        let outcome = self
            .compose_model(Some(url_args))
            .map_err(DispatchError::from)
            .and_then(|model| step(&mut cx, request, &model));
        match outcome {
            Ok(body) => cx.response.finish(body),
            Err(err) => {
                tracing::debug!("resource {}: {err}", self.name);
                self.error_handler.handle(err)
            }
        }
    }

    /// Map the request method onto `model`.
    pub(crate) fn dispatch(
        &self,
        cx: &RequestContext<'_>,
        target: Target<'_>,
        request: Request,
        model: &DataModel,
        allowed: &MethodSet,
    ) -> Result<Value, DispatchError> {
        let Request { method, body } = request;
        if !allowed.contains(&method) && method != Method::Head {
            return Err(DispatchError::MethodNotAllowed {
                method,
                allowed: allowed.clone(),
            });
        }
        match method {
            Method::Get | Method::Head => Ok(model.read()?),
            Method::Delete => Ok(model.delete()?),
            Method::Put => {
                let input = body.into_input(self.parser_ref())?;
                let input = validate_input(cx, target, input)?;
                Ok(model.write(input)?)
            }
            other => Err(DispatchError::Internal(format!(
                "{other} passed the allow check but maps to no capability"
            ))),
        }
    }

    pub(crate) fn parser_ref(&self) -> &dyn Parser {
        self.parser.as_ref()
    }

    pub(crate) fn formatter_ref(&self) -> &dyn Formatter {
        self.formatter.as_ref()
    }
}

impl Endpoint for Resource {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_methods(&self) -> MethodSet {
        self.methods_for(&self.introspect())
    }

    fn handle_request(
        &self,
        cx: RequestContext<'_>,
        request: Request,
        url_args: &UrlArgs,
    ) -> Response {
        self.run(cx, request, url_args, |cx, request, model| {
            let allowed = self.methods_for(model);
            self.dispatch(cx, self.target(), request, model, &allowed)
        })
    }

    fn parser(&self) -> &dyn Parser {
        self.parser_ref()
    }

    fn formatter(&self) -> &dyn Formatter {
        self.formatter_ref()
    }
}

/// Run the request's validator, if any, over consumed input.
pub(crate) fn validate_input(
    cx: &RequestContext<'_>,
    target: Target<'_>,
    input: Input,
) -> Result<Input, ValidationError> {
    match cx.validator {
        Some(v) => v.validate(target, input),
        None => Ok(input),
    }
}

fn lazy_fn<F, D>(handler: F) -> LazyFn
where
    F: Fn(&UrlArgs) -> Result<D, ModelError> + Send + Sync + 'static,
    D: Dataset + 'static,
{
    Arc::new(move |args: &UrlArgs| -> Result<Arc<dyn Dataset>, ModelError> {
        Ok(Arc::new(handler(args)?))
    })
}

// --- builder -----------------------------------------------------------------

/// Configures a [`Resource`]. Every setting is optional.
pub struct ResourceBuilder {
    name: Option<String>,
    handler: Handler,
    params: Vec<String>,
    model: DataModel,
    parser: Arc<dyn Parser>,
    formatter: Arc<dyn Formatter>,
    error_handler: Arc<dyn ErrorHandler>,
}

impl ResourceBuilder {
    pub(crate) fn new(handler: Handler) -> Self {
        Self {
            name: None,
            handler,
            params: Vec::new(),
            model: DataModel::new(),
            parser: default_parser(),
            formatter: default_formatter(),
            error_handler: default_handler(),
        }
    }

    /// Unique name; a random UUID when not set.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// URL parameters the handler reads, used when introspecting a lazy
    /// handler.
    pub fn params<S: Into<String>>(mut self, params: impl IntoIterator<Item = S>) -> Self {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn model(mut self, model: DataModel) -> Self {
        self.model = model;
        self
    }

    pub fn parser(mut self, parser: impl Parser + 'static) -> Self {
        self.parser = Arc::new(parser);
        self
    }

    pub fn formatter(mut self, formatter: impl Formatter + 'static) -> Self {
        self.formatter = Arc::new(formatter);
        self
    }

    pub fn error_handler(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.error_handler = Arc::new(handler);
        self
    }

    pub(crate) fn has_name(&self) -> bool {
        self.name.is_some()
    }

    pub fn build(self) -> Resource {
        Resource {
            name: self
                .name
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            handler: self.handler,
            params: self.params,
            model: self.model,
            parser: self.parser,
            formatter: self.formatter,
            error_handler: self.error_handler,
        }
    }
}
