#![deny(unsafe_code)]
//! Core types for the saddle-trap simulation.
//!
//! Provides the signed-index [`Grid`], the [`Engine`] trait driven once per
//! frame by a host loop, [`BoundsPolicy`] for coordinates that leave the grid,
//! [`SimError`], JSON parameter helpers, and the serializable [`RunSpec`].

pub mod bounds;
pub mod engine;
pub mod error;
pub mod grid;
pub mod params;
pub mod run_spec;

pub use bounds::BoundsPolicy;
pub use engine::{Engine, StepStatus};
pub use error::SimError;
pub use grid::Grid;
pub use run_spec::RunSpec;
