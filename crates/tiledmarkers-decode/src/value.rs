//! Attribute value coercion.
//!
//! A vector tile stores each attribute as a `Value` message with one of seven
//! typed slots set. Tile writers are not consistent about which slot they use
//! for a given attribute (a count may arrive as `uint`, `int` or `double`), so
//! lookups coerce across the numeric slots instead of matching one exactly.

use tiledmarkers_proto::tile::Value;

/// Read any numeric slot as `f64`.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn as_f64(value: &Value) -> Option<f64> {
    value
        .double_value
        .or_else(|| value.float_value.map(f64::from))
        .or_else(|| value.int_value.map(|v| v as f64))
        .or_else(|| value.sint_value.map(|v| v as f64))
        .or_else(|| value.uint_value.map(|v| v as f64))
}

/// Read any numeric slot as `i64`.
///
/// Floating point values are truncated toward zero and saturate at the `i64`
/// range; `NaN` becomes `0`.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn as_i64(value: &Value) -> Option<i64> {
    value
        .int_value
        .or(value.sint_value)
        .or_else(|| value.uint_value.map(|v| i64::try_from(v).unwrap_or(i64::MAX)))
        .or_else(|| value.double_value.map(|v| v as i64))
        .or_else(|| value.float_value.map(|v| v as i64))
}

/// Read a flag from the bool slot, or from a numeric slot (non-zero is true).
pub(crate) fn as_bool(value: &Value) -> Option<bool> {
    value
        .bool_value
        .or_else(|| as_f64(value).map(|v| v != 0.0))
}

/// Read a string slot, rendering numeric slots in decimal.
pub(crate) fn as_string(value: &Value) -> Option<String> {
    if let Some(s) = &value.string_value {
        return Some(s.clone());
    }
    if let Some(v) = value.int_value.or(value.sint_value) {
        return Some(v.to_string());
    }
    if let Some(v) = value.uint_value {
        return Some(v.to_string());
    }
    value
        .double_value
        .or_else(|| value.float_value.map(f64::from))
        .map(|v| v.to_string())
}
