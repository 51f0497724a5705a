//! Ready-made conversion functions for use as [`FieldRule::Func`] rules.
//!
//! Form bodies deliver every value as a string, JSON bodies deliver typed
//! values; each function here accepts both.
//!
//! [`FieldRule::Func`]: super::FieldRule::Func

use serde_json::Value;

use super::error::ConversionError;

pub fn integer(v: &Value) -> Result<Value, ConversionError> {
    match v {
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(v.clone()),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|e| ConversionError::new(format!("{s:?}: {e}"))),
        other => Err(ConversionError::new(format!("{other} is not an integer"))),
    }
}

pub fn float(v: &Value) -> Result<Value, ConversionError> {
    match v {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| ConversionError::new(format!("{n} is not a float")))
            .and_then(finite),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| ConversionError::new(format!("{s:?}: {e}")))
            .and_then(finite),
        other => Err(ConversionError::new(format!("{other} is not a float"))),
    }
}

/// JSON has no infinities or NaN; those are conversion failures.
pub(crate) fn finite(x: f64) -> Result<Value, ConversionError> {
    serde_json::Number::from_f64(x)
        .map(Value::Number)
        .ok_or_else(|| ConversionError::new(format!("{x} is not a finite number")))
}

/// Strings pass through; numbers and booleans are written out.
pub fn string(v: &Value) -> Result<Value, ConversionError> {
    match v {
        Value::String(_) => Ok(v.clone()),
        Value::Number(n) => Ok(Value::String(n.to_string())),
        Value::Bool(b) => Ok(Value::String(b.to_string())),
        other => Err(ConversionError::new(format!("{other} is not a string"))),
    }
}

/// Accepts booleans, `0`/`1`, and the usual spellings of yes and no.
pub fn boolean(v: &Value) -> Result<Value, ConversionError> {
    let b = match v {
        Value::Bool(b) => *b,
        Value::Number(n) => match n.as_i64() {
            Some(0) => false,
            Some(1) => true,
            _ => return Err(ConversionError::new(format!("{n} is not a boolean"))),
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => true,
            "false" | "no" | "off" | "0" => false,
            _ => return Err(ConversionError::new(format!("{s:?} is not a boolean"))),
        },
        other => return Err(ConversionError::new(format!("{other} is not a boolean"))),
    };
    Ok(Value::Bool(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integers_from_text_and_numbers() {
        assert_eq!(integer(&json!("42")).unwrap(), json!(42));
        assert_eq!(integer(&json!(-7)).unwrap(), json!(-7));
        assert!(integer(&json!("4.2")).is_err());
        assert!(integer(&json!(4.2)).is_err());
        assert!(integer(&json!(null)).is_err());
    }

    #[test]
    fn floats_from_text_and_numbers() {
        assert_eq!(float(&json!("2.5")).unwrap(), json!(2.5));
        assert_eq!(float(&json!(3)).unwrap(), json!(3.0));
        assert!(float(&json!("two")).is_err());
    }

    #[test]
    fn non_finite_floats_fail() {
        assert!(float(&json!("NaN")).is_err());
        assert!(float(&json!("inf")).is_err());
        assert!(float(&json!("-infinity")).is_err());
        assert!(finite(f64::NAN).is_err());
        assert_eq!(finite(0.5).unwrap(), json!(0.5));
    }

    #[test]
    fn strings_write_out_scalars() {
        assert_eq!(string(&json!("x")).unwrap(), json!("x"));
        assert_eq!(string(&json!(12)).unwrap(), json!("12"));
        assert!(string(&json!([1])).is_err());
    }

    #[test]
    fn booleans() {
        assert_eq!(boolean(&json!("Yes")).unwrap(), json!(true));
        assert_eq!(boolean(&json!("off")).unwrap(), json!(false));
        assert_eq!(boolean(&json!(1)).unwrap(), json!(true));
        assert!(boolean(&json!("maybe")).is_err());
    }
}
