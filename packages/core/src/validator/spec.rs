//! The rule shapes accepted at registration and their normalized form.
//!
//! A [`FieldRule`] is what callers hand to `enforce`: a function, a string
//! such as `"int(min=1, max=5)"`, or a one-element list wrapping either.
//! [`ConverterSpec::parse`] checks its shape straight away and produces the
//! spec tree the validator stores until preparation.

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;

use super::error::{ConversionError, SpecError};

/// A conversion function: raw field value in, converted value out.
pub type ConvertFn = Arc<dyn Fn(&Value) -> Result<Value, ConversionError> + Send + Sync>;

/// A rule as written at registration.
#[derive(Clone)]
pub enum FieldRule {
    Func(ConvertFn),
    Spec(String),
    /// Must wrap exactly one rule; the field is then a list of such values.
    List(Vec<FieldRule>),
}

impl FieldRule {
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, ConversionError> + Send + Sync + 'static,
    {
        FieldRule::Func(Arc::new(f))
    }
}

impl fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRule::Func(_) => f.write_str("Func(..)"),
            FieldRule::Spec(s) => f.debug_tuple("Spec").field(s).finish(),
            FieldRule::List(l) => f.debug_tuple("List").field(l).finish(),
        }
    }
}

impl From<&str> for FieldRule {
    fn from(s: &str) -> Self {
        FieldRule::Spec(s.to_string())
    }
}

impl From<String> for FieldRule {
    fn from(s: String) -> Self {
        FieldRule::Spec(s)
    }
}

impl From<ConvertFn> for FieldRule {
    fn from(f: ConvertFn) -> Self {
        FieldRule::Func(f)
    }
}

impl<T: Into<FieldRule>> From<Vec<T>> for FieldRule {
    fn from(items: Vec<T>) -> Self {
        FieldRule::List(items.into_iter().map(Into::into).collect())
    }
}

/// A normalized rule.
#[derive(Clone)]
pub enum ConverterSpec {
    Callable(ConvertFn),
    /// A converter type looked up by name at preparation. `args` is kept as
    /// written and only parsed then.
    Named { name: String, args: Option<String> },
    ListOf(Box<ConverterSpec>),
}

impl fmt::Debug for ConverterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConverterSpec::Callable(_) => f.write_str("Callable(..)"),
            ConverterSpec::Named { name, args } => f
                .debug_struct("Named")
                .field("name", name)
                .field("args", args)
                .finish(),
            ConverterSpec::ListOf(inner) => f.debug_tuple("ListOf").field(inner).finish(),
        }
    }
}

static NAMED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*([A-Za-z_][A-Za-z0-9_]*)\s*(?:\((.*)\))?\s*$")
        .expect("invalid converter spec regex")
});

impl ConverterSpec {
    pub fn parse(rule: FieldRule) -> Result<Self, SpecError> {
        match rule {
            FieldRule::Func(f) => Ok(ConverterSpec::Callable(f)),
            FieldRule::Spec(text) => Self::parse_named(&text),
            FieldRule::List(mut items) => {
                if items.len() != 1 {
                    return Err(SpecError::ListArity(items.len()));
                }
                let inner = items.remove(0);
                Ok(ConverterSpec::ListOf(Box::new(Self::parse(inner)?)))
            }
        }
    }

    /// Parse `name` or `name(args)`.
    pub fn parse_named(text: &str) -> Result<Self, SpecError> {
        let caps = NAMED_RE
            .captures(text)
            .ok_or_else(|| SpecError::Malformed(text.to_string()))?;
        Ok(ConverterSpec::Named {
            name: caps[1].to_string(),
            args: caps.get(2).map(|m| m.as_str().to_string()),
        })
    }
}

/// A field named in a restriction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestrictedField {
    pub name: String,
    pub required: bool,
}

impl RestrictedField {
    /// Decode the star prefix: an odd number of leading `*` marks the field
    /// required, and each `**` pair stands for one literal `*`.
    ///
    /// `"*id"` is a required `id`, `"**id"` an optional `*id`, `"***id"` a
    /// required `*id`.
    pub fn parse(field: &str) -> Self {
        let rest = field.trim_start_matches('*');
        let stars = field.len() - rest.len();
        RestrictedField {
            name: format!("{}{}", "*".repeat(stars / 2), rest),
            required: stars % 2 == 1,
        }
    }
}
