//! CLI errors and their process exit codes.
//!
//! Exit code scheme:
//! - 0:  success, including a run that reached its final angle
//! - 2:  clap arg parse error (automatic, before our code runs)
//! - 10: simulation error (grid out of range, non-finite state, bad constants)
//! - 11: I/O error (reading a run config)
//! - 12: input error (bad JSON params, unknown bounds policy, bad config)
//! - 13: serialization error

use saddle_core::SimError;
use std::fmt;

/// Errors produced by CLI operations, each mapped to a distinct exit code.
pub enum CliError {
    Simulation(SimError),
    Io(String),
    Input(String),
    Serialization(String),
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Simulation(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Simulation(e) => write!(f, "{e}"),
            CliError::Io(msg) | CliError::Input(msg) | CliError::Serialization(msg) => {
                write!(f, "{msg}")
            }
        }
    }
}

impl From<SimError> for CliError {
    fn from(e: SimError) -> Self {
        match e {
            SimError::Io(msg) => CliError::Io(msg),
            SimError::Config(_) | SimError::UnknownBoundsPolicy(_) => CliError::Input(e.to_string()),
            other => CliError::Simulation(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_exit_code_is_10() {
        let err = CliError::from(SimError::OutOfRange {
            i: -15,
            j: 50,
            half_extent: 50,
        });
        assert_eq!(err.exit_code(), 10);
        assert!(err.to_string().contains("(-15, 50)"));
    }

    #[test]
    fn io_routes_to_exit_code_11() {
        let err = CliError::from(SimError::Io("run.json: not found".into()));
        assert_eq!(err.exit_code(), 11);
        assert!(err.to_string().contains("run.json"));
    }

    #[test]
    fn config_and_policy_errors_are_input_errors() {
        assert_eq!(CliError::from(SimError::Config("bad".into())).exit_code(), 12);
        let err = CliError::from(SimError::UnknownBoundsPolicy("bounce".into()));
        assert_eq!(err.exit_code(), 12);
        assert!(err.to_string().contains("bounce"));
    }

    #[test]
    fn invalid_param_stays_a_simulation_error() {
        let err = CliError::from(SimError::InvalidParam {
            name: "fmx".into(),
            reason: "must be non-zero".into(),
        });
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn serde_json_error_routes_to_serialization() {
        let bad_json = serde_json::from_str::<serde_json::Value>("{invalid");
        let cli_err = CliError::from(bad_json.unwrap_err());
        assert_eq!(cli_err.exit_code(), 13);
    }
}
