//! Error types for the saddle-trap core.

use thiserror::Error;

/// Errors produced by surface construction and stepping.
#[derive(Debug, Error)]
pub enum SimError {
    /// The half-extent was zero, or the cell count overflowed `usize`.
    #[error("invalid dimensions: half-extent must be non-zero and the grid must fit in memory")]
    InvalidDimensions,

    /// A tuning constant was rejected by validation.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParam { name: String, reason: String },

    /// A grid coordinate fell outside `[-half_extent, half_extent)` under the strict policy.
    #[error("grid coordinate ({i}, {j}) out of range [-{half_extent}, {half_extent})")]
    OutOfRange {
        i: isize,
        j: isize,
        half_extent: usize,
    },

    /// The ball position became NaN or infinite and cannot be mapped to a cell.
    #[error("non-finite ball position (x = {x}, z = {z})")]
    NonFiniteState { x: f64, z: f64 },

    /// A bounds policy name did not match any known policy.
    #[error("unknown bounds policy: {0} (expected strict, clamp or wrap)")]
    UnknownBoundsPolicy(String),

    /// Reading a run configuration failed.
    #[error("i/o error: {0}")]
    Io(String),

    /// A run configuration could not be parsed or was inconsistent.
    #[error("invalid run configuration: {0}")]
    Config(String),
}
