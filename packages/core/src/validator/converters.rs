//! Named converter types, as referenced by string rules like `"int(min=1)"`.
//!
//! A converter exposes a regular expression describing the strings it
//! accepts and a [`Converter::to_native`] step turning a matched string into
//! a value. The [`ConverterRegistry`] maps names to factories; the built-ins
//! mirror the URL-rule converters so the same vocabulary works for paths and
//! for request bodies.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use super::args::{ArgValue, ConverterArgs};
use super::error::ConversionError;

/// A string-to-value converter with an accepted pattern.
pub trait Converter: Send + Sync + fmt::Debug {
    /// Regex (without anchors) for the strings this converter accepts. The
    /// validator anchors it at both ends.
    fn pattern(&self) -> &str;

    /// Convert a string that fully matched [`Converter::pattern`].
    fn to_native(&self, raw: &str) -> Result<Value, ConversionError>;
}

/// Builds a converter from its parsed arguments; the error is a reason.
pub type ConverterFactory = fn(ConverterArgs) -> Result<Box<dyn Converter>, String>;

/// Converter types by name.
#[derive(Clone)]
pub struct ConverterRegistry {
    factories: HashMap<String, ConverterFactory>,
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("ConverterRegistry").field("names", &names).finish()
    }
}

/// Pre-loaded with `default`, `string`, `any`, `path`, `int`, `float` and
/// `uuid`.
impl Default for ConverterRegistry {
    fn default() -> Self {
        let mut r = Self::empty();
        r.register("default", StringConverter::from_args);
        r.register("string", StringConverter::from_args);
        r.register("any", AnyConverter::from_args);
        r.register("path", PathConverter::from_args);
        r.register("int", IntegerConverter::from_args);
        r.register("float", FloatConverter::from_args);
        r.register("uuid", UuidConverter::from_args);
        r
    }
}

impl ConverterRegistry {
    /// A registry with no converters at all.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Add or replace a converter type.
    pub fn register(&mut self, name: impl Into<String>, factory: ConverterFactory) -> &mut Self {
        self.factories.insert(name.into(), factory);
        self
    }

    pub fn get(&self, name: &str) -> Option<ConverterFactory> {
        self.factories.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

// --- built-ins ---------------------------------------------------------------

/// Any string without a `/`, optionally length-limited.
#[derive(Debug)]
pub struct StringConverter {
    pattern: String,
}

impl StringConverter {
    fn from_args(args: ConverterArgs) -> Result<Box<dyn Converter>, String> {
        let [min, max, length] = args.bind(["minlength", "maxlength", "length"])?;
        let pattern = match length {
            Some(len) => format!("[^/]{{{}}}", as_count(&len, "length")?),
            None => {
                let min = match min {
                    Some(v) => as_count(&v, "minlength")?,
                    None => 1,
                };
                let max = match max {
                    Some(v) => as_count(&v, "maxlength")?.to_string(),
                    None => String::new(),
                };
                format!("[^/]{{{min},{max}}}")
            }
        };
        Ok(Box::new(StringConverter { pattern }))
    }
}

impl Converter for StringConverter {
    fn pattern(&self) -> &str {
        &self.pattern
    }

    fn to_native(&self, raw: &str) -> Result<Value, ConversionError> {
        Ok(Value::String(raw.to_string()))
    }
}

/// One of a fixed list of strings.
#[derive(Debug)]
pub struct AnyConverter {
    pattern: String,
}

impl AnyConverter {
    fn from_args(args: ConverterArgs) -> Result<Box<dyn Converter>, String> {
        let items: Vec<String> = args
            .positional_only()?
            .iter()
            .map(|v| regex::escape(&v.to_string()))
            .collect();
        Ok(Box::new(AnyConverter {
            pattern: format!("(?:{})", items.join("|")),
        }))
    }
}

impl Converter for AnyConverter {
    fn pattern(&self) -> &str {
        &self.pattern
    }

    fn to_native(&self, raw: &str) -> Result<Value, ConversionError> {
        Ok(Value::String(raw.to_string()))
    }
}

/// Like `string`, but slashes are allowed after the first character.
#[derive(Debug)]
pub struct PathConverter;

impl PathConverter {
    fn from_args(args: ConverterArgs) -> Result<Box<dyn Converter>, String> {
        args.bind([])?;
        Ok(Box::new(PathConverter))
    }
}

impl Converter for PathConverter {
    fn pattern(&self) -> &str {
        "[^/].*"
    }

    fn to_native(&self, raw: &str) -> Result<Value, ConversionError> {
        Ok(Value::String(raw.to_string()))
    }
}

/// Base-10 integers, unsigned unless `signed=True`.
#[derive(Debug)]
pub struct IntegerConverter {
    fixed_digits: usize,
    min: Option<i64>,
    max: Option<i64>,
    pattern: &'static str,
}

impl IntegerConverter {
    fn from_args(args: ConverterArgs) -> Result<Box<dyn Converter>, String> {
        let [fixed_digits, min, max, signed] =
            args.bind(["fixed_digits", "min", "max", "signed"])?;
        let fixed_digits = match fixed_digits {
            Some(v) => as_count(&v, "fixed_digits")?,
            None => 0,
        };
        let min = min.map(|v| as_int(&v, "min")).transpose()?;
        let max = max.map(|v| as_int(&v, "max")).transpose()?;
        let signed = signed.map(|v| as_flag(&v, "signed")).transpose()?.unwrap_or(false);
        Ok(Box::new(IntegerConverter {
            fixed_digits,
            min,
            max,
            pattern: if signed { r"-?\d+" } else { r"\d+" },
        }))
    }
}

impl Converter for IntegerConverter {
    fn pattern(&self) -> &str {
        self.pattern
    }

    fn to_native(&self, raw: &str) -> Result<Value, ConversionError> {
        let digits = raw.trim_start_matches('-');
        if self.fixed_digits > 0 && digits.len() != self.fixed_digits {
            return Err(ConversionError::new(format!(
                "{raw:?} must have exactly {} digits",
                self.fixed_digits
            )));
        }
        let n: i64 = raw
            .parse()
            .map_err(|e| ConversionError::new(format!("{raw:?}: {e}")))?;
        check_bounds(n, self.min, self.max)?;
        Ok(Value::from(n))
    }
}

/// Decimal numbers with a fractional part, unsigned unless `signed=True`.
#[derive(Debug)]
pub struct FloatConverter {
    min: Option<f64>,
    max: Option<f64>,
    pattern: &'static str,
}

impl FloatConverter {
    fn from_args(args: ConverterArgs) -> Result<Box<dyn Converter>, String> {
        let [min, max, signed] = args.bind(["min", "max", "signed"])?;
        let min = min.map(|v| as_float(&v, "min")).transpose()?;
        let max = max.map(|v| as_float(&v, "max")).transpose()?;
        let signed = signed.map(|v| as_flag(&v, "signed")).transpose()?.unwrap_or(false);
        Ok(Box::new(FloatConverter {
            min,
            max,
            pattern: if signed { r"-?\d+\.\d+" } else { r"\d+\.\d+" },
        }))
    }
}

impl Converter for FloatConverter {
    fn pattern(&self) -> &str {
        self.pattern
    }

    fn to_native(&self, raw: &str) -> Result<Value, ConversionError> {
        let x: f64 = raw
            .parse()
            .map_err(|e| ConversionError::new(format!("{raw:?}: {e}")))?;
        check_bounds(x, self.min, self.max)?;
        super::callables::finite(x)
    }
}

/// Canonical hyphenated UUIDs, normalized to lowercase.
#[derive(Debug)]
pub struct UuidConverter;

impl UuidConverter {
    fn from_args(args: ConverterArgs) -> Result<Box<dyn Converter>, String> {
        args.bind([])?;
        Ok(Box::new(UuidConverter))
    }
}

impl Converter for UuidConverter {
    fn pattern(&self) -> &str {
        "[A-Fa-f0-9]{8}-[A-Fa-f0-9]{4}-[A-Fa-f0-9]{4}-[A-Fa-f0-9]{4}-[A-Fa-f0-9]{12}"
    }

    fn to_native(&self, raw: &str) -> Result<Value, ConversionError> {
        let id = uuid::Uuid::parse_str(raw)
            .map_err(|e| ConversionError::new(format!("{raw:?}: {e}")))?;
        Ok(Value::String(id.hyphenated().to_string()))
    }
}

// --- helpers -----------------------------------------------------------------

fn check_bounds<T>(n: T, min: Option<T>, max: Option<T>) -> Result<(), ConversionError>
where
    T: PartialOrd + fmt::Display + Copy,
{
    if let Some(min) = min {
        if n < min {
            return Err(ConversionError::new(format!("{n} is below the minimum {min}")));
        }
    }
    if let Some(max) = max {
        if n > max {
            return Err(ConversionError::new(format!("{n} is above the maximum {max}")));
        }
    }
    Ok(())
}

fn as_count(v: &ArgValue, name: &str) -> Result<usize, String> {
    v.as_i64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| format!("{name} must be a non-negative integer, got {v}"))
}

fn as_int(v: &ArgValue, name: &str) -> Result<i64, String> {
    v.as_i64()
        .ok_or_else(|| format!("{name} must be an integer, got {v}"))
}

fn as_float(v: &ArgValue, name: &str) -> Result<f64, String> {
    v.as_f64()
        .ok_or_else(|| format!("{name} must be a number, got {v}"))
}

fn as_flag(v: &ArgValue, name: &str) -> Result<bool, String> {
    v.as_bool()
        .ok_or_else(|| format!("{name} must be True or False, got {v}"))
}
