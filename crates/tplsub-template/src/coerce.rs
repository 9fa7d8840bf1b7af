//! Coercion from [`Value`] to the primitives template functions compute with.
//!
//! `as_int` and `as_float` fail with [`TplError::ConversionError`] naming the
//! source value; `as_text` never fails. The pair helpers name the argument
//! position that failed.

use tplsub_core::error::{TplError, TplResult};

use crate::value::Value;

/// Lower bound of the `f64` range that truncates into `i64` (inclusive).
const I64_MIN_F: f64 = -9_223_372_036_854_775_808.0;
/// Upper bound of the `f64` range that truncates into `i64` (exclusive).
const I64_MAX_F: f64 = 9_223_372_036_854_775_808.0;

/// Coerces a value to an integer.
///
/// - `Int` is returned as is
/// - `Float` is truncated toward zero; NaN, infinities, and values outside
///   the `i64` range fail
/// - `Text` must be a complete base-10 integer literal (an optional sign
///   followed by digits, nothing else)
/// - every other variant fails
///
/// # Errors
///
/// Returns [`TplError::ConversionError`] when the value cannot be converted.
#[allow(clippy::cast_possible_truncation)]
pub fn as_int(v: &Value) -> TplResult<i64> {
    match v {
        Value::Int(i) => Ok(*i),
        Value::Float(f) => {
            let t = f.trunc();
            if t.is_finite() && (I64_MIN_F..I64_MAX_F).contains(&t) {
                Ok(t as i64)
            } else {
                Err(TplError::ConversionError(format!(
                    "cannot convert float {f} to int"
                )))
            }
        }
        Value::Text(s) => s.parse::<i64>().map_err(|e| {
            TplError::ConversionError(format!("cannot convert text '{s}' to int: {e}"))
        }),
        other => Err(TplError::ConversionError(format!(
            "unsupported type for conversion to int: {}",
            other.type_name()
        ))),
    }
}

/// Coerces a value to a float.
///
/// `Float` and `Int` are widened; `Text` must be a complete decimal literal
/// whose value is finite. Every other variant fails.
///
/// # Errors
///
/// Returns [`TplError::ConversionError`] when the value cannot be converted.
#[allow(clippy::cast_precision_loss)]
pub fn as_float(v: &Value) -> TplResult<f64> {
    match v {
        Value::Float(f) => Ok(*f),
        Value::Int(i) => Ok(*i as f64),
        Value::Text(s) => match s.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(f),
            Ok(f) => Err(TplError::ConversionError(format!(
                "cannot convert text '{s}' to float: {f} is not finite"
            ))),
            Err(e) => Err(TplError::ConversionError(format!(
                "cannot convert text '{s}' to float: {e}"
            ))),
        },
        other => Err(TplError::ConversionError(format!(
            "unsupported type for conversion to float: {}",
            other.type_name()
        ))),
    }
}

/// Renders a value as text. `Null` becomes the empty string.
///
/// See [`Value::to_display_string`] for the rendering of each variant.
pub fn as_text(v: &Value) -> String {
    v.to_display_string()
}

/// Coerces both arguments with [`as_int`].
///
/// # Errors
///
/// Returns the first failing argument's error, prefixed with its position.
pub fn as_int_pair(a: &Value, b: &Value) -> TplResult<(i64, i64)> {
    let a = as_int(a).map_err(|e| e.context("first argument"))?;
    let b = as_int(b).map_err(|e| e.context("second argument"))?;
    Ok((a, b))
}

/// Coerces both arguments with [`as_float`].
///
/// # Errors
///
/// Returns the first failing argument's error, prefixed with its position.
pub fn as_float_pair(a: &Value, b: &Value) -> TplResult<(f64, f64)> {
    let a = as_float(a).map_err(|e| e.context("first argument"))?;
    let b = as_float(b).map_err(|e| e.context("second argument"))?;
    Ok((a, b))
}

/// Renders every element of a list with [`as_text`].
///
/// # Errors
///
/// Returns [`TplError::TypeMismatch`] if `v` is not a `List`.
pub fn as_text_list(v: &Value) -> TplResult<Vec<String>> {
    let items = expect_list(v)?;
    Ok(items.iter().map(as_text).collect())
}

/// Returns the items of a `List`, or a [`TplError::TypeMismatch`].
pub(crate) fn expect_list(v: &Value) -> TplResult<&[Value]> {
    v.as_list().ok_or_else(|| {
        TplError::TypeMismatch(format!("expected list, got {}", v.type_name()))
    })
}

/// Returns the contents of a `Text`, or a [`TplError::TypeMismatch`].
pub(crate) fn expect_text(v: &Value) -> TplResult<&str> {
    v.as_str().ok_or_else(|| {
        TplError::TypeMismatch(format!("expected text, got {}", v.type_name()))
    })
}
