//! Conversion between scalar values and their document text.

use crate::{Error, Kind, Options, Result, Value};

/// Renders a scalar value as it appears after `**Name**: `.
///
/// Strings are written verbatim. A string containing a newline, or one that
/// starts with a bullet or heading marker, will not read back unchanged.
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] for null, list and record values, and
/// for infinite or NaN floats.
pub fn render_scalar(value: &Value, options: &Options) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Integer(i) => Ok(i.to_string()),
        Value::Float(f) if !f.is_finite() => Err(Error::unsupported_type(&format!(
            "float `{}` has no document form",
            f
        ))),
        Value::Float(f) => Ok(render_float(*f, options)),
        Value::Bool(b) => Ok(if *b { "true" } else { "false" }.to_string()),
        other => Err(Error::unsupported_type(&format!(
            "{} has no scalar text form",
            other.kind_name()
        ))),
    }
}

fn render_float(f: f64, options: &Options) -> String {
    match options.float_precision {
        Some(digits) => format!("{:.*}", digits, f),
        // `Display` for f64 never uses exponent notation and reads back exactly
        None => f.to_string(),
    }
}

/// Parses the text of a scalar field found at document line `line`.
///
/// Numeric and boolean kinds ignore surrounding whitespace; strings and
/// characters are taken as-is.
///
/// # Errors
///
/// - [`Error::InvalidNumber`] for integer or float text that does not parse,
///   an integer outside the field's range, or a float that is not finite
/// - [`Error::InvalidBoolean`] for anything but `true` or `false`
/// - [`Error::TypeMismatch`] for character text that is not exactly one
///   character
/// - [`Error::UnsupportedType`] if `kind` is not a scalar kind
pub fn parse_scalar(text: &str, kind: &Kind, line: usize) -> Result<Value> {
    match kind {
        Kind::String => Ok(Value::String(text.to_string())),
        Kind::Char => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(_), None) => Ok(Value::String(text.to_string())),
                _ => Err(Error::type_mismatch(
                    line,
                    "a single character",
                    &format!("`{}`", text),
                )),
            }
        }
        Kind::Integer => parse_integer(text.trim())
            .map(Value::Integer)
            .ok_or_else(|| Error::invalid_number(line, text)),
        Kind::BoundedInteger { min, max } => parse_integer(text.trim())
            .filter(|n| (*min..=*max).contains(n))
            .map(Value::Integer)
            .ok_or_else(|| Error::invalid_number(line, text)),
        Kind::Float => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Value::Float)
            .ok_or_else(|| Error::invalid_number(line, text)),
        Kind::Bool => match text.trim() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(Error::invalid_boolean(line, text)),
        },
        other => Err(Error::unsupported_type(&format!(
            "{} has no scalar text form",
            other
        ))),
    }
}

/// Optional sign followed by ASCII digits, within `i64` range.
fn parse_integer(text: &str) -> Option<i64> {
    let digits = text.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}
