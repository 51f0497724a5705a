//! Collections: resources that can create members.
//!
//! A [`Collection`] behaves like the [`Resource`] it is built on and also
//! accepts `POST` whenever its model carries `make`. A successful `make`
//! answers `201 Created`. When the created item comes back as an object, its
//! fields are renamed through the collection's binding table and handed to
//! the URL builder to point a `Location` header at the new member.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::content::{Formatter, Parser};
use crate::context::{Body, Request, RequestContext, Response, UrlArgs};
use crate::error::{DispatchError, ErrorHandler};
use crate::method::{Method, MethodSet};
use crate::model::{Capability, DataModel};
use crate::resource::{validate_input, Endpoint, Handler, Resource, ResourceBuilder};

pub struct Collection {
    resource: Resource,
    collects: String,
    /// Field of a created item -> URL parameter of the collected resource.
    binding: HashMap<String, String>,
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("resource", &self.resource)
            .field("collects", &self.collects)
            .field("binding", &self.binding)
            .finish()
    }
}

impl Collection {
    /// The underlying resource behaviour.
    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn binding(&self) -> &HashMap<String, String> {
        &self.binding
    }

    /// The resource's methods, plus `POST` when `model` can `make`.
    pub fn methods_for(&self, model: &DataModel) -> MethodSet {
        let mut methods = self.resource.methods_for(model);
        if model.has(Capability::Make) {
            methods.insert(Method::Post);
        }
        methods
    }

    fn make(
        &self,
        cx: &mut RequestContext<'_>,
        body: Body,
        model: &DataModel,
    ) -> Result<Value, DispatchError> {
        let input = body.into_input(self.resource.parser_ref())?;
        let input = validate_input(cx, self.target(), input)?;
        let created = model.make(input)?;
        cx.response.set_default_status(201);

        if let Value::Object(fields) = &created {
            let args: UrlArgs = fields
                .iter()
                .map(|(k, v)| {
                    let param = self.binding.get(k).unwrap_or(k);
                    (param.clone(), v.clone())
                })
                .collect();
            match cx.url_builder.build(&self.collects, &args) {
                Ok(url) => cx.response.set_default_header("Location", url),
                Err(e) => tracing::debug!("collection {}: no Location: {e}", self.name()),
            }
        }
        Ok(created)
    }
}

impl Endpoint for Collection {
    fn name(&self) -> &str {
        self.resource.name()
    }

    fn collects(&self) -> Option<&str> {
        Some(&self.collects)
    }

    fn supported_methods(&self) -> MethodSet {
        self.methods_for(&self.resource.introspect())
    }

    fn handle_request(
        &self,
        cx: RequestContext<'_>,
        request: Request,
        url_args: &UrlArgs,
    ) -> Response {
        self.resource.run(cx, request, url_args, |cx, request, model| {
            if request.method == Method::Post && model.has(Capability::Make) {
                return self.make(cx, request.body, model);
            }
            let allowed = self.methods_for(model);
            self.resource
                .dispatch(cx, self.target(), request, model, &allowed)
        })
    }

    fn parser(&self) -> &dyn Parser {
        self.resource.parser_ref()
    }

    fn formatter(&self) -> &dyn Formatter {
        self.resource.formatter_ref()
    }
}

/// Configures a [`Collection`]; see [`Resource::collection`].
pub struct CollectionBuilder {
    inner: ResourceBuilder,
    collects: String,
    binding: HashMap<String, String>,
}

impl CollectionBuilder {
    pub(crate) fn new(collects: &str, handler: Handler) -> Self {
        Self {
            inner: ResourceBuilder::new(handler),
            collects: collects.to_string(),
            binding: HashMap::new(),
        }
    }

    /// Unique name; defaults to `<collected>.collection`.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.inner = self.inner.name(name);
        self
    }

    pub fn params<S: Into<String>>(mut self, params: impl IntoIterator<Item = S>) -> Self {
        self.inner = self.inner.params(params);
        self
    }

    pub fn model(mut self, model: DataModel) -> Self {
        self.inner = self.inner.model(model);
        self
    }

    pub fn parser(mut self, parser: impl Parser + 'static) -> Self {
        self.inner = self.inner.parser(parser);
        self
    }

    pub fn formatter(mut self, formatter: impl Formatter + 'static) -> Self {
        self.inner = self.inner.formatter(formatter);
        self
    }

    pub fn error_handler(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.inner = self.inner.error_handler(handler);
        self
    }

    /// Send the created item's `field` to the URL builder as `param`.
    /// Unbound fields keep their own name.
    pub fn bind(mut self, field: impl Into<String>, param: impl Into<String>) -> Self {
        self.binding.insert(field.into(), param.into());
        self
    }

    pub fn build(self) -> Collection {
        let inner = if self.inner.has_name() {
            self.inner
        } else {
            self.inner.name(format!("{}.collection", self.collects))
        };
        Collection {
            resource: inner.build(),
            collects: self.collects,
            binding: self.binding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{BuildError, NoRoutes};
    use crate::input::Input;
    use crate::model::{CapabilitySet, Dataset, ModelError};
    use crate::validator::{ConverterRegistry, Validator};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn item() -> Resource {
        Resource::builder(|args: &UrlArgs| Ok(json!({"id": args["id"]})))
            .name("item")
            .build()
    }

    fn item_urls(name: &str, args: &UrlArgs) -> Result<String, BuildError> {
        match (name, args.get("id")) {
            ("item", Some(id)) => Ok(format!("/items/{id}")),
            ("item", None) => Err(BuildError::MissingArgument {
                resource: name.into(),
                argument: "id".into(),
            }),
            _ => Err(BuildError::UnknownResource(name.into())),
        }
    }

    /// An append-only list that hands out sequential ids.
    #[derive(Clone, Default)]
    struct Items(Arc<Mutex<Vec<Value>>>);

    impl Dataset for Items {
        fn capabilities(&self) -> CapabilitySet {
            CapabilitySet::from([Capability::Read, Capability::Make])
        }

        fn read(&self) -> Result<Value, ModelError> {
            Ok(Value::Array(self.0.lock().unwrap().clone()))
        }

        fn make(&self, input: Input) -> Result<Value, ModelError> {
            let mut items = self.0.lock().unwrap();
            items.push(input.into_value());
            Ok(json!({"key": items.len()}))
        }
    }

    fn items_collection(items: Items) -> Collection {
        item()
            .lazy_collection(move |_: &UrlArgs| Ok(items.clone()))
            .bind("key", "id")
            .build()
    }

    fn post(c: &Collection, urls: &dyn crate::context::UrlBuilder, body: Value) -> Response {
        let cx = RequestContext::new(urls);
        c.handle_request(cx, Request::new("POST", body.into()), &UrlArgs::new())
    }

    #[test]
    fn default_name_follows_collected_resource() {
        let c = item().collection(|_| Ok(json!([]))).build();
        assert_eq!(c.name(), "item.collection");
        assert_eq!(c.collects(), Some("item"));
        let c = item().collection(|_| Ok(json!([]))).name("all").build();
        assert_eq!(c.name(), "all");
    }

    #[test]
    fn make_adds_post() {
        let c = items_collection(Items::default());
        assert_eq!(c.supported_methods().to_string(), "GET, HEAD, POST");
    }

    #[test]
    fn post_creates_with_location() {
        let items = Items::default();
        let c = items_collection(items.clone());
        let resp = post(&c, &item_urls, json!({"title": "a"}));
        assert_eq!(resp.status, 201);
        assert_eq!(resp.header("Location"), Some("/items/1"));
        assert_eq!(resp.body, json!({"key": 1}));
        assert_eq!(items.read().unwrap(), json!([{"title": "a"}]));
    }

    #[test]
    fn unbuildable_location_is_skipped() {
        let c = items_collection(Items::default());
        let resp = post(&c, &NoRoutes, json!({"title": "a"}));
        assert_eq!(resp.status, 201);
        assert_eq!(resp.header("Location"), None);
    }

    #[test]
    fn non_object_results_get_no_location() {
        let c = item()
            .collection(|_| Ok(json!([])))
            .model(DataModel::new().with_make(|_| Ok(json!("made"))))
            .build();
        let resp = post(&c, &item_urls, json!({}));
        assert_eq!(resp.status, 201);
        assert_eq!(resp.header("Location"), None);
        assert_eq!(resp.body, json!("made"));
    }

    #[test]
    fn post_without_make_is_405() {
        let c = item().collection(|_| Ok(json!([]))).build();
        let resp = post(&c, &item_urls, json!({}));
        assert_eq!(resp.status, 405);
        assert_eq!(resp.header("Allow"), Some("GET, HEAD"));
    }

    #[test]
    fn get_lists_members() {
        let c = items_collection(Items(Arc::new(Mutex::new(vec![json!(1)]))));
        let cx = RequestContext::new(&NoRoutes);
        let resp = c.handle_request(cx, Request::bodyless("GET"), &UrlArgs::new());
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, json!([1]));
    }

    #[test]
    fn posts_follow_item_rules() {
        let c = items_collection(Items::default());
        let mut v = Validator::new();
        v.restrict("item", ["*title"], false);
        let v = v.prepare(&ConverterRegistry::default()).unwrap();

        let cx = RequestContext::new(&NoRoutes).with_validator(&v);
        let resp = c.handle_request(cx, Request::new("POST", json!({}).into()), &UrlArgs::new());
        assert_eq!(resp.status, 400);
        assert_eq!(resp.body["code"], "missing_fields");
    }

    #[test]
    fn raw_bodies_are_parsed_only_for_make() {
        let items = Items::default();
        let c = items_collection(items.clone());
        let cx = RequestContext::new(&item_urls);
        let resp = c.handle_request(
            cx,
            Request::raw("POST", Some("application/x-www-form-urlencoded"), "title=a"),
            &UrlArgs::new(),
        );
        assert_eq!(resp.status, 201);
        assert_eq!(items.read().unwrap(), json!([{"title": "a"}]));

        let cx = RequestContext::new(&NoRoutes);
        let resp = c.handle_request(cx, Request::raw("GET", Some("text/csv"), "a,b"), &UrlArgs::new());
        assert_eq!(resp.status, 200);

        let cx = RequestContext::new(&NoRoutes);
        let resp = c.handle_request(cx, Request::raw("POST", None, "{"), &UrlArgs::new());
        assert_eq!(resp.status, 400);
        assert_eq!(resp.body["code"], "invalid_body");
    }
}
