//! Helpers for reading tuning constants out of a `serde_json::Value` object.
//!
//! Scalar helpers fall back to the given default when the key is missing or
//! has the wrong JSON type. The bounds-policy helper is the exception: a
//! string that names no policy is a user mistake and is reported.

use crate::bounds::BoundsPolicy;
use crate::error::SimError;
use glam::DVec3;
use serde_json::Value;

/// Reads an `f64` from `params[name]`; integers are accepted and widened.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Reads a non-negative integer from `params[name]` as `usize`.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}

/// Reads a three-element numeric array `[x, y, z]` from `params[name]`.
///
/// Anything other than an array of exactly three numbers yields `default`.
pub fn param_vec3(params: &Value, name: &str, default: DVec3) -> DVec3 {
    let Some(items) = params.get(name).and_then(Value::as_array) else {
        return default;
    };
    match items.as_slice() {
        [x, y, z] => match (x.as_f64(), y.as_f64(), z.as_f64()) {
            (Some(x), Some(y), Some(z)) => DVec3::new(x, y, z),
            _ => default,
        },
        _ => default,
    }
}

/// Reads a [`BoundsPolicy`] name from `params[name]`.
///
/// A missing or non-string value yields `default`; an unrecognised name is
/// `SimError::UnknownBoundsPolicy`.
pub fn param_bounds(
    params: &Value,
    name: &str,
    default: BoundsPolicy,
) -> Result<BoundsPolicy, SimError> {
    match params.get(name).and_then(Value::as_str) {
        Some(s) => s.parse(),
        None => Ok(default),
    }
}
