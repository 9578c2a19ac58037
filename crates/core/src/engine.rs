//! The `Engine` trait driven by an embedding application's frame loop.
//!
//! The trait is object-safe so a host can hold a `Box<dyn Engine>` and call
//! [`Engine::step`] once per displayed frame. Engines own no loop of their own.

use crate::error::SimError;
use crate::grid::Grid;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of a successful [`Engine::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// The state advanced and the engine expects further steps.
    Running,
    /// The terminal condition was reached; the state no longer changes.
    Finished,
}

/// Core trait for frame-stepped simulations over a height field.
///
/// This trait is **object-safe**: you can use `Box<dyn Engine>` or `&dyn Engine`
/// for runtime polymorphism.
pub trait Engine {
    /// Advance the simulation by one frame.
    ///
    /// Returns `Ok(StepStatus::Finished)` once the terminal condition has been
    /// met (and on every call after that), or a `SimError` if the frame could
    /// not be computed. A failed step leaves the state unchanged.
    fn step(&mut self) -> Result<StepStatus, SimError>;

    /// The height field the simulation runs over.
    fn field(&self) -> &Grid<f64>;

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing all available parameters, their types, ranges, and defaults.
    fn param_schema(&self) -> Value;

    /// Whether the terminal condition has been reached.
    fn is_finished(&self) -> bool;
}
