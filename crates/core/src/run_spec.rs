//! Reproducible description of a simulation run.
//!
//! A [`RunSpec`] bundles the engine parameter overrides with the driver
//! settings (frame limit, reporting interval) so a run can be saved as JSON
//! and replayed bit-for-bit.

use crate::error::SimError;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_every() -> usize {
    1
}

/// Saved configuration for one run of the stepper.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSpec {
    /// Engine parameter overrides; missing keys use the engine defaults.
    #[serde(default = "empty_object")]
    pub params: serde_json::Value,
    /// Stop after this many frames even if the terminal angle is not reached.
    #[serde(default)]
    pub frames: Option<usize>,
    /// Report every `every`-th frame when printing a trajectory.
    #[serde(default = "default_every")]
    pub every: usize,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Default for RunSpec {
    fn default() -> Self {
        Self {
            params: empty_object(),
            frames: None,
            every: default_every(),
        }
    }
}

impl RunSpec {
    /// Reads and validates a run configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SimError::Io(format!("{}: {e}", path.display())))?;
        let spec: RunSpec =
            serde_json::from_str(&text).map_err(|e| SimError::Config(e.to_string()))?;
        spec.validate()?;
        log::debug!("loaded run spec from {}", path.display());
        Ok(spec)
    }

    /// Checks that `params` is a JSON object and `every` is non-zero.
    pub fn validate(&self) -> Result<(), SimError> {
        if !self.params.is_object() {
            return Err(SimError::Config("params must be a JSON object".into()));
        }
        if self.every == 0 {
            return Err(SimError::Config("every must be at least 1".into()));
        }
        Ok(())
    }
}
