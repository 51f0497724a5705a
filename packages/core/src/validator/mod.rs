//! Declarative field validation and conversion for request input.
//!
//! Rules are registered on a [`Validator`] while the application is being
//! assembled, then sealed with [`Validator::prepare`] into a
//! [`PreparedValidator`] that serves requests read-only.
//!
//! # Precedence
//!
//! For a resource `R` that is a collection of `C`, the rules applied to a
//! field come from, lowest first:
//!
//! | Layer | Registered with |
//! |-------|-----------------|
//! | global | [`Validator::enforce_all`] |
//! | `C` (only while collections inherit) | [`Validator::enforce`] on `C` |
//! | `R` | [`Validator::enforce`] on `R` |
//!
//! Restrictions do not merge: `R`'s are used if it has any, else `C`'s when
//! inheriting, else none.

pub mod args;
pub mod callables;
pub mod converters;
pub mod error;
pub mod spec;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

use crate::container::Container;
use crate::input::Input;

pub use converters::{Converter, ConverterFactory, ConverterRegistry};
pub use error::{ConversionError, SpecError, ValidationError};
pub use spec::{ConvertFn, ConverterSpec, FieldRule, RestrictedField};

/// The resource a request is being validated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target<'a> {
    pub name: &'a str,
    /// For a collection, the name of the resource it collects.
    pub collects: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Scope {
    Global,
    Resource(String),
}

#[derive(Debug, Clone, Default)]
struct Restriction {
    /// Allowed field -> required.
    fields: IndexMap<String, bool>,
    strip_extra: bool,
}

/// Validation rules under construction.
#[derive(Debug)]
pub struct Validator {
    rules: HashMap<Scope, IndexMap<String, ConverterSpec>>,
    restrictions: HashMap<String, Restriction>,
    include_collections: bool,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
            restrictions: HashMap::new(),
            include_collections: true,
        }
    }

    /// Whether collections pick up the rules and restrictions of the
    /// resource they collect. On by default.
    pub fn include_collections(&mut self, yes: bool) -> &mut Self {
        self.include_collections = yes;
        self
    }

    /// Register field rules for one resource.
    pub fn enforce<K, R>(
        &mut self,
        resource: &str,
        rules: impl IntoIterator<Item = (K, R)>,
    ) -> Result<&mut Self, SpecError>
    where
        K: Into<String>,
        R: Into<FieldRule>,
    {
        self.register(Scope::Resource(resource.to_string()), rules)?;
        Ok(self)
    }

    /// Register field rules for every resource.
    pub fn enforce_all<K, R>(
        &mut self,
        rules: impl IntoIterator<Item = (K, R)>,
    ) -> Result<&mut Self, SpecError>
    where
        K: Into<String>,
        R: Into<FieldRule>,
    {
        self.register(Scope::Global, rules)?;
        Ok(self)
    }

    /// Only accept the listed fields for `resource`. Names starting with a
    /// single `*` are required (see [`RestrictedField::parse`]). Other fields
    /// are dropped when `strip_extra` is set and rejected otherwise.
    ///
    /// Calling this again for the same resource adds fields and replaces
    /// the `strip_extra` setting.
    pub fn restrict<S: AsRef<str>>(
        &mut self,
        resource: &str,
        fields: impl IntoIterator<Item = S>,
        strip_extra: bool,
    ) -> &mut Self {
        let entry = self.restrictions.entry(resource.to_string()).or_default();
        for field in fields {
            let RestrictedField { name, required } = RestrictedField::parse(field.as_ref());
            entry.fields.insert(name, required);
        }
        entry.strip_extra = strip_extra;
        self
    }

    fn register<K, R>(
        &mut self,
        scope: Scope,
        rules: impl IntoIterator<Item = (K, R)>,
    ) -> Result<(), SpecError>
    where
        K: Into<String>,
        R: Into<FieldRule>,
    {
        // All or nothing: a bad rule leaves the table untouched.
        let parsed = rules
            .into_iter()
            .map(|(field, rule)| Ok((field.into(), ConverterSpec::parse(rule.into())?)))
            .collect::<Result<Vec<_>, SpecError>>()?;
        self.rules.entry(scope).or_default().extend(parsed);
        Ok(())
    }

    /// Resolve every named converter against `registry` and seal the rules.
    ///
    /// Fails on the first unknown converter name or unusable argument list.
    pub fn prepare(self, registry: &ConverterRegistry) -> Result<PreparedValidator, SpecError> {
        let mut rules = HashMap::with_capacity(self.rules.len());
        let mut count = 0;
        for (scope, table) in self.rules {
            let mut prepared = IndexMap::with_capacity(table.len());
            for (field, spec) in table {
                let spec = prepare_spec(&field, spec, registry)?;
                prepared.insert(field, spec);
                count += 1;
            }
            rules.insert(scope, prepared);
        }
        tracing::info!(
            "validator: prepared {count} field rules, {} restrictions",
            self.restrictions.len()
        );
        Ok(PreparedValidator {
            rules,
            restrictions: self.restrictions,
            include_collections: self.include_collections,
        })
    }

    /// A rule that full-matches strings against `pattern`.
    ///
    /// Without a template the string is returned unchanged; with one, the
    /// result is the template with `$1` or `${name}` replaced by the
    /// corresponding capture group.
    pub fn regex(pattern: &str, template: Option<&str>) -> Result<FieldRule, SpecError> {
        let re = compile_full(pattern)?;
        let template = template.map(str::to_string);
        Ok(FieldRule::func(move |v| {
            let s = v
                .as_str()
                .ok_or_else(|| ConversionError::new(format!("{v} is not a string")))?;
            let caps = re
                .captures(s)
                .ok_or_else(|| ConversionError::new(s.to_string()))?;
            match &template {
                Some(t) => {
                    let mut out = String::new();
                    caps.expand(t, &mut out);
                    Ok(Value::String(out))
                }
                None => Ok(v.clone()),
            }
        }))
    }

    /// A rule that parses date strings with the first of `formats` that
    /// fits, yielding an ISO-8601 string.
    ///
    /// Formats use strftime syntax. Each is tried as a date-time with an
    /// offset, then as a naive date-time, then as a plain date (taken as
    /// midnight).
    pub fn date<S: AsRef<str>>(formats: impl IntoIterator<Item = S>) -> FieldRule {
        let formats: Vec<String> = formats
            .into_iter()
            .map(|f| f.as_ref().to_string())
            .collect();
        FieldRule::func(move |v| {
            let s = v
                .as_str()
                .ok_or_else(|| ConversionError::new(format!("{v} is not a string")))?;
            formats
                .iter()
                .find_map(|fmt| parse_date(s, fmt))
                .map(Value::String)
                .ok_or_else(|| {
                    ConversionError::new(format!(
                        "{s:?} does not match any of {}",
                        formats.join(", ")
                    ))
                })
        })
    }
}

fn parse_date(s: &str, fmt: &str) -> Option<String> {
    if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
        return Some(dt.to_rfc3339());
    }
    let naive = NaiveDateTime::parse_from_str(s, fmt).ok().or_else(|| {
        NaiveDate::parse_from_str(s, fmt)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    })?;
    Some(naive.format("%Y-%m-%dT%H:%M:%S").to_string())
}

fn compile_full(pattern: &str) -> Result<Regex, SpecError> {
    Regex::new(&format!("^(?:{pattern})$")).map_err(|e| SpecError::BadPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

// --- preparation -------------------------------------------------------------

#[derive(Clone)]
enum PreparedSpec {
    Callable(ConvertFn),
    Match {
        regex: Regex,
        converter: Arc<dyn Converter>,
    },
    ListOf(Box<PreparedSpec>),
}

impl fmt::Debug for PreparedSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreparedSpec::Callable(_) => f.write_str("Callable(..)"),
            PreparedSpec::Match { regex, converter } => f
                .debug_struct("Match")
                .field("regex", &regex.as_str())
                .field("converter", converter)
                .finish(),
            PreparedSpec::ListOf(inner) => f.debug_tuple("ListOf").field(inner).finish(),
        }
    }
}

fn prepare_spec(
    field: &str,
    spec: ConverterSpec,
    registry: &ConverterRegistry,
) -> Result<PreparedSpec, SpecError> {
    match spec {
        ConverterSpec::Callable(f) => Ok(PreparedSpec::Callable(f)),
        ConverterSpec::ListOf(inner) => Ok(PreparedSpec::ListOf(Box::new(prepare_spec(
            field, *inner, registry,
        )?))),
        ConverterSpec::Named { name, args } => {
            let factory = registry
                .get(&name)
                .ok_or_else(|| SpecError::UnknownConverter {
                    field: field.to_string(),
                    name: name.clone(),
                })?;
            let text = args.unwrap_or_default();
            let parsed = args::parse_args(&text)?;
            let converter = factory(parsed).map_err(|reason| SpecError::BadArguments {
                args: text.clone(),
                reason,
            })?;
            let regex = compile_full(converter.pattern())?;
            Ok(PreparedSpec::Match {
                regex,
                converter: Arc::from(converter),
            })
        }
    }
}

// --- serving -----------------------------------------------------------------

/// Sealed validation rules. Cheap to share; never changes.
#[derive(Debug)]
pub struct PreparedValidator {
    rules: HashMap<Scope, IndexMap<String, PreparedSpec>>,
    restrictions: HashMap<String, Restriction>,
    include_collections: bool,
}

impl PreparedValidator {
    /// Check and convert `input` for `target`.
    ///
    /// Restrictions are enforced first. Then every field that has a rule and
    /// is present is converted in place; fields without a value are left
    /// alone. All failing fields are reported together.
    pub fn validate(&self, target: Target<'_>, input: Input) -> Result<Input, ValidationError> {
        let mut data = Container::new(input);
        self.apply_restrictions(target, &mut data)?;

        let mut invalid = Vec::new();
        for (field, spec) in self.merged_rules(target) {
            if !data.contains(field) {
                continue;
            }
            let converted = convert_field(&mut data, field, spec)
                .and_then(|v| data.set(field, v).map_err(|e| ConversionError::new(e.to_string())));
            if let Err(e) = converted {
                tracing::debug!("validator: {}.{field} rejected: {e}", target.name);
                invalid.push(field.to_string());
            }
        }
        if !invalid.is_empty() {
            return Err(ValidationError::InvalidFields(invalid));
        }
        Ok(data.unwrap())
    }

    fn merged_rules(&self, target: Target<'_>) -> IndexMap<&str, &PreparedSpec> {
        let mut scopes = vec![Scope::Global];
        if self.include_collections {
            if let Some(collected) = target.collects {
                scopes.push(Scope::Resource(collected.to_string()));
            }
        }
        scopes.push(Scope::Resource(target.name.to_string()));

        let mut merged = IndexMap::new();
        for scope in &scopes {
            if let Some(table) = self.rules.get(scope) {
                merged.extend(table.iter().map(|(k, v)| (k.as_str(), v)));
            }
        }
        merged
    }

    fn restriction_for(&self, target: Target<'_>) -> Option<&Restriction> {
        self.restrictions.get(target.name).or_else(|| {
            target
                .collects
                .filter(|_| self.include_collections)
                .and_then(|c| self.restrictions.get(c))
        })
    }

    fn apply_restrictions(
        &self,
        target: Target<'_>,
        data: &mut Container,
    ) -> Result<(), ValidationError> {
        let Some(restriction) = self.restriction_for(target) else {
            return Ok(());
        };

        let extras: Vec<String> = data
            .keys()
            .into_iter()
            .filter(|k| !restriction.fields.contains_key(k))
            .collect();
        if !extras.is_empty() {
            if !restriction.strip_extra {
                return Err(ValidationError::UnexpectedFields(extras));
            }
            // Back to front: deleting shifts sequence indices.
            let mut stuck: Vec<String> = extras
                .iter()
                .rev()
                .filter(|field| data.delete(field).is_err())
                .cloned()
                .collect();
            if !stuck.is_empty() {
                stuck.reverse();
                return Err(ValidationError::UnexpectedFields(stuck));
            }
        }

        let missing: Vec<String> = restriction
            .fields
            .iter()
            .filter(|(field, required)| **required && !data.contains(field))
            .map(|(field, _)| field.clone())
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }
        Ok(())
    }
}

fn convert_field(
    data: &mut Container,
    field: &str,
    spec: &PreparedSpec,
) -> Result<Value, ConversionError> {
    match spec {
        PreparedSpec::ListOf(inner) => {
            let items = data
                .get_list(field)
                .map_err(|e| ConversionError::new(e.to_string()))?;
            convert_items(items, inner)
        }
        other => {
            let value = data
                .get(field)
                .map_err(|e| ConversionError::new(e.to_string()))?;
            convert_value(&value, other)
        }
    }
}

fn convert_items(items: Vec<Value>, inner: &PreparedSpec) -> Result<Value, ConversionError> {
    items
        .iter()
        .map(|item| convert_value(item, inner))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

fn convert_value(value: &Value, spec: &PreparedSpec) -> Result<Value, ConversionError> {
    match spec {
        PreparedSpec::Callable(f) => f(value),
        PreparedSpec::ListOf(inner) => match value {
            Value::Array(items) => convert_items(items.clone(), inner),
            other => Err(ConversionError::new(format!("{other} is not a list"))),
        },
        PreparedSpec::Match { regex, converter } => {
            let raw = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => return Err(ConversionError::new(format!("{other} is not a string"))),
            };
            if !regex.is_match(&raw) {
                return Err(ConversionError::new(format!(
                    "{raw:?} does not match {}",
                    regex.as_str()
                )));
            }
            converter.to_native(&raw)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Fields, MultiMap};
    use serde_json::{json, Map};

    const NOTE: Target<'static> = Target {
        name: "note",
        collects: None,
    };

    const NOTES: Target<'static> = Target {
        name: "notes",
        collects: Some("note"),
    };

    fn prepared(v: Validator) -> PreparedValidator {
        v.prepare(&ConverterRegistry::default()).unwrap()
    }

    fn map(v: Value) -> Input {
        Input::from(v)
    }

    #[test]
    fn named_converters_convert_in_place() {
        let mut v = Validator::new();
        v.enforce("note", [("priority", "int(min=1,max=5)")]).unwrap();
        let out = prepared(v)
            .validate(NOTE, map(json!({"priority": "3", "title": "x"})))
            .unwrap();
        assert_eq!(out.into_value(), json!({"priority": 3, "title": "x"}));
    }

    #[test]
    fn absent_fields_are_skipped() {
        let mut v = Validator::new();
        v.enforce("note", [("priority", "int")]).unwrap();
        let out = prepared(v).validate(NOTE, map(json!({"title": "x"}))).unwrap();
        assert_eq!(out.into_value(), json!({"title": "x"}));
    }

    #[test]
    fn list_rules_convert_each_element() {
        let mut v = Validator::new();
        v.enforce("note", [("ids", vec!["int"])]).unwrap();
        let v = prepared(v);

        let out = v.validate(NOTE, map(json!({"ids": ["3", "4", "5"]}))).unwrap();
        assert_eq!(out.into_value(), json!({"ids": [3, 4, 5]}));

        let err = v.validate(NOTE, map(json!({"ids": ["3", "x"]}))).unwrap_err();
        assert_eq!(err, ValidationError::InvalidFields(vec!["ids".into()]));
    }

    #[test]
    fn list_rules_on_form_input_keep_repeated_keys() {
        let mut v = Validator::new();
        v.enforce("note", [("ids", vec!["int"])]).unwrap();
        let form: MultiMap = [("ids", "1"), ("ids", "2"), ("title", "t")]
            .into_iter()
            .map(|(k, v)| (k, json!(v)))
            .collect();
        match prepared(v).validate(NOTE, form.into()).unwrap() {
            Input::Multi(m) => {
                assert_eq!(m.get_all("ids"), vec![json!(1), json!(2)]);
                assert_eq!(m.get("title"), Some(&json!("t")));
            }
            other => panic!("expected form input back, got {other:?}"),
        }
    }

    #[test]
    fn every_failing_field_is_reported() {
        let mut v = Validator::new();
        v.enforce("note", [("a", "int"), ("b", "float"), ("c", "string")])
            .unwrap();
        let err = prepared(v)
            .validate(NOTE, map(json!({"a": "x", "b": "y", "c": "ok"})))
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidFields(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn overflowing_floats_are_invalid() {
        let mut v = Validator::new();
        v.enforce("note", [("x", "float")]).unwrap();
        let huge = format!("1{}.0", "0".repeat(400));
        let err = prepared(v)
            .validate(NOTE, map(json!({ "x": huge })))
            .unwrap_err();
        assert_eq!(err, ValidationError::InvalidFields(vec!["x".into()]));
    }

    #[test]
    fn resource_rules_beat_inherited_beat_global() {
        let mut v = Validator::new();
        v.enforce_all([("x", "int")]).unwrap();
        v.enforce("note", [("x", "float")]).unwrap();
        v.enforce("notes", [("x", "string")]).unwrap();
        let out = prepared(v).validate(NOTES, map(json!({"x": "12"}))).unwrap();
        assert_eq!(out.into_value(), json!({"x": "12"}));
    }

    #[test]
    fn inherited_rules_apply_to_collections() {
        let mut v = Validator::new();
        v.enforce_all([("x", "int")]).unwrap();
        v.enforce("note", [("x", "float")]).unwrap();
        let v = prepared(v);
        let out = v.validate(NOTES, map(json!({"x": "1.5"}))).unwrap();
        assert_eq!(out.into_value(), json!({"x": 1.5}));
        // The global rule still governs unrelated resources.
        let out = v
            .validate(Target { name: "other", collects: None }, map(json!({"x": "7"})))
            .unwrap();
        assert_eq!(out.into_value(), json!({"x": 7}));
    }

    #[test]
    fn inheritance_can_be_switched_off() {
        let mut v = Validator::new();
        v.include_collections(false);
        v.enforce("note", [("x", "int")]).unwrap();
        v.restrict("note", ["*x"], false);
        let out = prepared(v).validate(NOTES, map(json!({"y": "a"}))).unwrap();
        assert_eq!(out.into_value(), json!({"y": "a"}));
    }

    #[test]
    fn restriction_reports_missing_fields() {
        let mut v = Validator::new();
        v.restrict("note", ["*id", "name"], false);
        let err = prepared(v)
            .validate(NOTE, map(json!({"name": "n"})))
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingFields(vec!["id".into()]));
    }

    #[test]
    fn restriction_rejects_or_strips_extras() {
        let mut v = Validator::new();
        v.restrict("note", ["*id", "name"], false);
        let err = prepared(v)
            .validate(NOTE, map(json!({"id": 1, "name": "n", "x": 0})))
            .unwrap_err();
        assert_eq!(err, ValidationError::UnexpectedFields(vec!["x".into()]));

        let mut v = Validator::new();
        v.restrict("note", ["*id", "name"], true);
        let out = prepared(v)
            .validate(NOTE, map(json!({"id": 1, "name": "n", "x": 0})))
            .unwrap();
        assert_eq!(out.into_value(), json!({"id": 1, "name": "n"}));
    }

    #[derive(Default)]
    struct Locked {
        fields: Map<String, Value>,
    }

    impl Fields for Locked {
        fn get(&self, key: &str) -> Option<Value> {
            self.fields.get(key).cloned()
        }

        fn set(&mut self, key: &str, value: Value) {
            self.fields.insert(key.to_string(), value);
        }

        fn remove(&mut self, _key: &str) -> Option<Value> {
            None
        }

        fn keys(&self) -> Vec<String> {
            self.fields.keys().cloned().collect()
        }
    }

    #[test]
    fn extras_that_cannot_be_stripped_are_reported() {
        let mut v = Validator::new();
        v.restrict("note", ["name"], true);
        let mut locked = Locked::default();
        locked.set("name", json!("n"));
        locked.set("secret", json!(1));
        let err = prepared(v)
            .validate(NOTE, Input::Object(Box::new(locked)))
            .unwrap_err();
        assert_eq!(err, ValidationError::UnexpectedFields(vec!["secret".into()]));
    }

    #[test]
    fn collections_fall_back_to_item_restrictions() {
        let mut v = Validator::new();
        v.restrict("note", ["*title"], false);
        let err = prepared(v).validate(NOTES, map(json!({}))).unwrap_err();
        assert_eq!(err, ValidationError::MissingFields(vec!["title".into()]));
    }

    #[test]
    fn own_restrictions_win_over_inherited() {
        let mut v = Validator::new();
        v.restrict("note", ["*title"], false);
        v.restrict("notes", ["body"], false);
        let out = prepared(v).validate(NOTES, map(json!({"body": "b"}))).unwrap();
        assert_eq!(out.into_value(), json!({"body": "b"}));
    }

    #[test]
    fn restrict_accumulates_fields() {
        let mut v = Validator::new();
        v.restrict("note", ["a"], false).restrict("note", ["b"], true);
        let out = prepared(v)
            .validate(NOTE, map(json!({"a": 1, "b": 2, "c": 3})))
            .unwrap();
        assert_eq!(out.into_value(), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn unknown_converter_fails_preparation() {
        let mut v = Validator::new();
        v.enforce("note", [("x", "bogus(1)")]).unwrap();
        let err = v.prepare(&ConverterRegistry::default()).unwrap_err();
        assert_eq!(
            err,
            SpecError::UnknownConverter {
                field: "x".into(),
                name: "bogus".into()
            }
        );
    }

    #[test]
    fn bad_arguments_fail_preparation() {
        let mut v = Validator::new();
        v.enforce("note", [("x", "int(nope=1)")]).unwrap();
        assert!(matches!(
            v.prepare(&ConverterRegistry::default()),
            Err(SpecError::BadArguments { .. })
        ));
    }

    #[test]
    fn malformed_rules_are_rejected_at_registration() {
        let mut v = Validator::new();
        assert!(v.enforce("note", [("x", "int(")]).is_err());
        assert!(v.enforce("note", [("x", vec!["int", "float"])]).is_err());
    }

    #[test]
    fn callables_and_custom_converters() {
        #[derive(Debug)]
        struct Upper;
        impl Converter for Upper {
            fn pattern(&self) -> &str {
                "[a-z]+"
            }
            fn to_native(&self, raw: &str) -> Result<Value, ConversionError> {
                Ok(Value::String(raw.to_uppercase()))
            }
        }

        fn upper(_: args::ConverterArgs) -> Result<Box<dyn Converter>, String> {
            Ok(Box::new(Upper))
        }

        let mut registry = ConverterRegistry::default();
        registry.register("upper", upper);

        let mut v = Validator::new();
        v.enforce(
            "note",
            [
                ("shout", FieldRule::from("upper")),
                ("done", FieldRule::func(callables::boolean)),
            ],
        )
        .unwrap();
        let out = v
            .prepare(&registry)
            .unwrap()
            .validate(NOTE, map(json!({"shout": "hey", "done": "yes"})))
            .unwrap();
        assert_eq!(out.into_value(), json!({"shout": "HEY", "done": true}));
    }

    #[test]
    fn regex_rules_match_whole_strings() {
        let rule = match Validator::regex("boy", None).unwrap() {
            FieldRule::Func(f) => f,
            other => panic!("expected a function rule, got {other:?}"),
        };
        assert_eq!(rule(&json!("boy")).unwrap(), json!("boy"));
        assert!(rule(&json!("That boy")).is_err());
        assert!(rule(&json!("boy, that's handy.")).is_err());

        let rule = match Validator::regex("(male|female)", Some("Gender: $1")).unwrap() {
            FieldRule::Func(f) => f,
            other => panic!("expected a function rule, got {other:?}"),
        };
        assert_eq!(rule(&json!("male")).unwrap(), json!("Gender: male"));
        assert!(rule(&json!("alien")).is_err());

        assert!(Validator::regex("(", None).is_err());
    }

    #[test]
    fn date_rules_try_each_format() {
        let rule = match Validator::date(["%Y-%m-%d %H:%M:%S%z", "%Y-%m-%d"]) {
            FieldRule::Func(f) => f,
            other => panic!("expected a function rule, got {other:?}"),
        };
        assert_eq!(
            rule(&json!("2015-07-17 09:00:00+0400")).unwrap(),
            json!("2015-07-17T09:00:00+04:00")
        );
        assert_eq!(
            rule(&json!("2015-07-17")).unwrap(),
            json!("2015-07-17T00:00:00")
        );
        assert!(rule(&json!("not-a-date")).is_err());
    }
}
