//! Structural value equality tolerant of null and scalar type drift

use serde_json::Value;

/// Compare two field values the way the detector needs them compared.
///
/// - absent and `null` are the same thing; two of them are equal
/// - exactly one absent/`null` side is unequal
/// - two scalars compare by their text form, so `42` equals `"42"`
/// - anything involving an array or object compares by serialized form,
///   which is sensitive to element and key order
///
/// A value that fails to serialize never compares equal.
#[must_use]
pub fn values_equal(local: Option<&Value>, remote: Option<&Value>) -> bool {
    let local = local.filter(|value| !value.is_null());
    let remote = remote.filter(|value| !value.is_null());

    match (local, remote) {
        (None, None) => true,
        (None, Some(_)) | (Some(_), None) => false,
        (Some(a), Some(b)) if is_scalar(a) && is_scalar(b) => scalar_text(a) == scalar_text(b),
        (Some(a), Some(b)) => match (serde_json::to_string(a), serde_json::to_string(b)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        },
    }
}

const fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::Bool(_) | Value::Number(_) | Value::String(_))
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                int.to_string()
            } else if let Some(uint) = number.as_u64() {
                uint.to_string()
            } else {
                number.as_f64().map_or_else(|| number.to_string(), float_text)
            }
        }
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// Render a float as record producers print numbers: `4.0` as `4`, `-0.0` as
/// `0`, and exponent notation (`1e+21`, `1e-7`) outside `[1e-6, 1e21)`.
fn float_text(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if !(1e-6..1e21).contains(&magnitude) {
        let text = format!("{value:e}");
        return match text.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => text,
        };
    }
    value.to_string()
}
