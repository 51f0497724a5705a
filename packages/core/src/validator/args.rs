//! Converter argument lists: the `min=1, max=5` part of `int(min=1, max=5)`.
//!
//! The syntax is the one URL-rule converters use. Arguments are separated by
//! commas; each is either a bare value or `name=value`. Values are
//!
//! - `True`, `False`, `None`
//! - integers (`3`, `-3`) and floats (`1.5`, `2.`)
//! - quoted strings (`'a,b'`, `"x"`), in which commas are literal
//! - bare words made of word characters and dots (`json`, `v1.2`)

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::error::SpecError;

/// One parsed argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ArgValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ArgValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ArgValue::Int(n) => Some(*n as f64),
            ArgValue::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ArgValue::None)
    }
}

/// Formats the value the way it was written, minus any quotes.
impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::None => f.write_str("None"),
            ArgValue::Bool(true) => f.write_str("True"),
            ArgValue::Bool(false) => f.write_str("False"),
            ArgValue::Int(n) => write!(f, "{n}"),
            ArgValue::Float(x) => write!(f, "{x}"),
            ArgValue::Str(s) => f.write_str(s),
        }
    }
}

/// Positional and keyword arguments for one converter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConverterArgs {
    pub positional: Vec<ArgValue>,
    pub keyword: BTreeMap<String, ArgValue>,
}

impl ConverterArgs {
    /// Bind arguments to a parameter list, positionally first and then by
    /// keyword. Unknown keywords, surplus positionals and parameters given
    /// twice are errors. `None` values bind as absent.
    pub fn bind<const N: usize>(
        mut self,
        params: [&str; N],
    ) -> Result<[Option<ArgValue>; N], String> {
        if self.positional.len() > N {
            return Err(format!(
                "takes at most {N} positional arguments, got {}",
                self.positional.len()
            ));
        }
        let mut bound: [Option<ArgValue>; N] = std::array::from_fn(|_| None);
        let mut given = [false; N];
        for (i, v) in self.positional.drain(..).enumerate() {
            given[i] = true;
            bound[i] = Some(v);
        }
        for (i, name) in params.iter().enumerate() {
            if let Some(v) = self.keyword.remove(*name) {
                if given[i] {
                    return Err(format!("argument {name:?} given twice"));
                }
                bound[i] = Some(v);
            }
        }
        if let Some(name) = self.keyword.keys().next() {
            return Err(format!("unexpected argument {name:?}"));
        }
        Ok(bound.map(|v| v.filter(|v| !v.is_none())))
    }

    /// All positional arguments; keywords are rejected.
    pub fn positional_only(self) -> Result<Vec<ArgValue>, String> {
        match self.keyword.keys().next() {
            Some(name) => Err(format!("unexpected argument {name:?}")),
            None => Ok(self.positional),
        }
    }
}

static ARG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:([A-Za-z_][A-Za-z0-9_]*)\s*=\s*)?(.+)$").expect("invalid argument regex")
});

static BARE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.]+$").expect("invalid bare-word regex"));

/// Parse an argument list. Blank text means no arguments.
pub fn parse_args(text: &str) -> Result<ConverterArgs, SpecError> {
    let bad = |reason: String| SpecError::BadArguments {
        args: text.to_string(),
        reason,
    };

    let mut args = ConverterArgs::default();
    let pieces = split_top_level(text).map_err(bad)?;
    let last = pieces.len().saturating_sub(1);
    for (i, piece) in pieces.iter().enumerate() {
        let piece = piece.trim();
        if piece.is_empty() {
            // A single trailing comma is tolerated.
            if i == last {
                continue;
            }
            return Err(bad("empty argument".into()));
        }
        let caps = ARG_RE
            .captures(piece)
            .ok_or_else(|| bad(format!("cannot parse {piece:?}")))?;
        let value = parse_value(caps[2].trim()).map_err(bad)?;
        match caps.get(1) {
            Some(name) => {
                if args
                    .keyword
                    .insert(name.as_str().to_string(), value)
                    .is_some()
                {
                    return Err(bad(format!("argument {:?} given twice", name.as_str())));
                }
            }
            None => args.positional.push(value),
        }
    }
    Ok(args)
}

fn split_top_level(text: &str) -> Result<Vec<String>, String> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    for c in text.chars() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == q {
                    quote = None;
                }
            }
            None if c == '\'' || c == '"' => {
                quote = Some(c);
                current.push(c);
            }
            None if c == ',' => pieces.push(std::mem::take(&mut current)),
            None => current.push(c),
        }
    }
    if let Some(q) = quote {
        return Err(format!("unterminated {q} quote"));
    }
    pieces.push(current);
    Ok(pieces)
}

fn parse_value(raw: &str) -> Result<ArgValue, String> {
    match raw {
        "True" => return Ok(ArgValue::Bool(true)),
        "False" => return Ok(ArgValue::Bool(false)),
        "None" => return Ok(ArgValue::None),
        _ => {}
    }
    for q in ['\'', '"'] {
        if raw.len() >= 2 && raw.starts_with(q) && raw.ends_with(q) {
            return Ok(ArgValue::Str(raw[1..raw.len() - 1].to_string()));
        }
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Ok(ArgValue::Int(n));
    }
    if raw.contains('.') {
        if let Ok(x) = raw.parse::<f64>() {
            return Ok(ArgValue::Float(x));
        }
    }
    if BARE_RE.is_match(raw) {
        return Ok(ArgValue::Str(raw.to_string()));
    }
    Err(format!("cannot parse value {raw:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_and_literals() {
        let args = parse_args("min=1, max=5.5, signed=True, label='a,b'").unwrap();
        assert!(args.positional.is_empty());
        assert_eq!(args.keyword["min"], ArgValue::Int(1));
        assert_eq!(args.keyword["max"], ArgValue::Float(5.5));
        assert_eq!(args.keyword["signed"], ArgValue::Bool(true));
        assert_eq!(args.keyword["label"], ArgValue::Str("a,b".into()));
    }

    #[test]
    fn positional_bare_words() {
        let args = parse_args("foo, 1000, True").unwrap();
        assert_eq!(
            args.positional,
            vec![
                ArgValue::Str("foo".into()),
                ArgValue::Int(1000),
                ArgValue::Bool(true)
            ]
        );
    }

    #[test]
    fn blank_means_nothing() {
        assert_eq!(parse_args("").unwrap(), ConverterArgs::default());
        assert_eq!(parse_args("  ").unwrap(), ConverterArgs::default());
    }

    #[test]
    fn malformed_arguments_are_rejected() {
        assert!(parse_args("a,,b").is_err());
        assert!(parse_args("'open").is_err());
        assert!(parse_args("x=1, x=2").is_err());
        assert!(parse_args("a b").is_err());
    }

    #[test]
    fn bind_mixes_positional_and_keyword() {
        let args = parse_args("2, length=None, maxlength=8").unwrap();
        let [min, max, len] = args.bind(["minlength", "maxlength", "length"]).unwrap();
        assert_eq!(min, Some(ArgValue::Int(2)));
        assert_eq!(max, Some(ArgValue::Int(8)));
        assert_eq!(len, None);
    }

    #[test]
    fn bind_rejects_strays() {
        let args = parse_args("bogus=1").unwrap();
        assert!(args.bind(["min", "max"]).is_err());
        let args = parse_args("1, min=2").unwrap();
        assert!(args.bind(["min", "max"]).is_err());
        let args = parse_args("1, 2, 3").unwrap();
        assert!(args.bind(["min", "max"]).is_err());
    }
}
