#![deny(unsafe_code)]
//! Saddle potential trap engine.
//!
//! Models the flipping saddle potential of a quadrupole ion trap and an ion
//! (the ball) riding on it. The surface `h(i, j) = (i² − j²)·fmz/fmx` and its
//! gradient are precomputed once on a signed grid; every frame the surface
//! amplitude follows `sin(phase)` and the ball is nudged along the scaled
//! gradient. The run ends once the phase passes the final angle.
//!
//! The engine exposes [`Engine::step`] for a host render loop and owns no loop
//! of its own; [`SaddleTrap::run`] is a convenience for headless drivers.

pub mod ball;
pub mod surface;

use std::f64::consts::PI;

use glam::DVec3;
use saddle_core::bounds::BoundsPolicy;
use saddle_core::engine::{Engine, StepStatus};
use saddle_core::error::SimError;
use saddle_core::grid::Grid;
use saddle_core::params::{param_bounds, param_f64, param_usize, param_vec3};
use serde::Serialize;
use serde_json::{json, Value};

pub use ball::BallState;
pub use surface::Surface;

/// Default half-extent of the surface grid.
const DEFAULT_FIELD_SIZE: usize = 50;
/// Largest accepted half-extent (a 2000 × 2000 grid).
const MAX_FIELD_SIZE: usize = 1000;
/// Default horizontal scale; heights are divided by it.
const DEFAULT_FMX: f64 = 5.0;
/// Default vertical scale; heights are multiplied by it.
const DEFAULT_FMZ: f64 = 0.08;
/// Default gradient coupling along `i` (x).
const DEFAULT_CI: f64 = 0.1;
/// Default gradient coupling along `j` (z).
const DEFAULT_CJ: f64 = 1.0;
/// Default phase advance per frame.
const DEFAULT_PHASE_STEP: f64 = 0.2;
/// Default phase past which the run finishes.
const DEFAULT_FINAL_ANGLE: f64 = 12.0 * PI;
/// Default starting camera angle.
const DEFAULT_CAMERA_ANGLE: f64 = -20.0;
/// Default camera drift per frame, in degrees.
const DEFAULT_ANGLE_DRIFT: f64 = 0.0;
/// Default starting phase.
const DEFAULT_INITIAL_PHASE: f64 = PI - 0.2;
/// Default starting ball position.
const DEFAULT_INITIAL_POSITION: DVec3 = DVec3::new(10.0, 0.0, 0.0);

/// Tuning constants for the saddle trap, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrapParams {
    /// Half-extent `n` of the surface grid; coordinates span `[-n, n)`.
    pub field_size: usize,
    pub fmx: f64,
    pub fmz: f64,
    /// Gradient coupling into `vx`.
    pub ci: f64,
    /// Gradient coupling into `vz`.
    pub cj: f64,
    pub phase_step: f64,
    pub final_angle: f64,
    pub camera_angle: f64,
    /// Per-frame drift `da` in degrees. Zero in the stock tuning.
    pub angle_drift: f64,
    pub initial_position: DVec3,
    pub initial_velocity: DVec3,
    pub initial_phase: f64,
    /// What happens when the ball's cell leaves the grid.
    pub bounds: BoundsPolicy,
}

impl Default for TrapParams {
    fn default() -> Self {
        Self {
            field_size: DEFAULT_FIELD_SIZE,
            fmx: DEFAULT_FMX,
            fmz: DEFAULT_FMZ,
            ci: DEFAULT_CI,
            cj: DEFAULT_CJ,
            phase_step: DEFAULT_PHASE_STEP,
            final_angle: DEFAULT_FINAL_ANGLE,
            camera_angle: DEFAULT_CAMERA_ANGLE,
            angle_drift: DEFAULT_ANGLE_DRIFT,
            initial_position: DEFAULT_INITIAL_POSITION,
            initial_velocity: DVec3::ZERO,
            initial_phase: DEFAULT_INITIAL_PHASE,
            bounds: BoundsPolicy::Strict,
        }
    }
}

impl TrapParams {
    /// Extracts parameters from a JSON object, falling back to defaults.
    ///
    /// Fails only on an unrecognised `bounds` name; call [`TrapParams::validate`]
    /// to check the values themselves.
    pub fn from_json(params: &Value) -> Result<Self, SimError> {
        Ok(Self {
            field_size: param_usize(params, "field_size", DEFAULT_FIELD_SIZE),
            fmx: param_f64(params, "fmx", DEFAULT_FMX),
            fmz: param_f64(params, "fmz", DEFAULT_FMZ),
            ci: param_f64(params, "ci", DEFAULT_CI),
            cj: param_f64(params, "cj", DEFAULT_CJ),
            phase_step: param_f64(params, "phase_step", DEFAULT_PHASE_STEP),
            final_angle: param_f64(params, "final_angle", DEFAULT_FINAL_ANGLE),
            camera_angle: param_f64(params, "camera_angle", DEFAULT_CAMERA_ANGLE),
            angle_drift: param_f64(params, "angle_drift", DEFAULT_ANGLE_DRIFT),
            initial_position: param_vec3(params, "initial_position", DEFAULT_INITIAL_POSITION),
            initial_velocity: param_vec3(params, "initial_velocity", DVec3::ZERO),
            initial_phase: param_f64(params, "initial_phase", DEFAULT_INITIAL_PHASE),
            bounds: param_bounds(params, "bounds", BoundsPolicy::Strict)?,
        })
    }

    /// Rejects values the stepper cannot run with.
    ///
    /// The phase step must be positive so the final angle is eventually
    /// reached; every other constant must be finite, and `fmx` non-zero.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.field_size == 0 {
            return Err(SimError::InvalidDimensions);
        }
        if self.field_size > MAX_FIELD_SIZE {
            return Err(invalid("field_size", "must be at most 1000"));
        }
        if self.fmx == 0.0 {
            return Err(invalid("fmx", "must be non-zero"));
        }
        if self.phase_step.is_nan() || self.phase_step <= 0.0 {
            return Err(invalid("phase_step", "must be positive"));
        }
        let scalars = [
            ("fmx", self.fmx),
            ("fmz", self.fmz),
            ("ci", self.ci),
            ("cj", self.cj),
            ("phase_step", self.phase_step),
            ("final_angle", self.final_angle),
            ("camera_angle", self.camera_angle),
            ("angle_drift", self.angle_drift),
            ("initial_phase", self.initial_phase),
        ];
        if let Some((name, _)) = scalars.iter().find(|(_, v)| !v.is_finite()) {
            return Err(invalid(name, "must be finite"));
        }
        if !self.initial_position.is_finite() {
            return Err(invalid("initial_position", "must be finite"));
        }
        if !self.initial_velocity.is_finite() {
            return Err(invalid("initial_velocity", "must be finite"));
        }
        Ok(())
    }
}

fn invalid(name: &str, reason: &str) -> SimError {
    SimError::InvalidParam {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

/// Result of driving the engine with [`SaddleTrap::run`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunSummary {
    /// Calls to `step` made during the run, including the finishing one.
    pub steps: usize,
    pub finished: bool,
    pub state: BallState,
}

/// Saddle trap engine: the precomputed surface plus the ball riding on it.
pub struct SaddleTrap {
    surface: Surface,
    ball: BallState,
    params: TrapParams,
}

impl SaddleTrap {
    /// Validates `params`, builds the surface and places the ball at its start.
    pub fn new(params: TrapParams) -> Result<Self, SimError> {
        params.validate()?;
        let surface = Surface::build(params.field_size, params.fmx, params.fmz)?;
        let ball = BallState::initial(&params);
        Ok(Self {
            surface,
            ball,
            params,
        })
    }

    /// Creates the engine from a JSON params object, defaulting missing keys.
    pub fn from_json(json_params: &Value) -> Result<Self, SimError> {
        Self::new(TrapParams::from_json(json_params)?)
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn ball(&self) -> &BallState {
        &self.ball
    }

    pub fn trap_params(&self) -> &TrapParams {
        &self.params
    }

    /// Replaces the ball state, e.g. to resume a saved run.
    pub fn set_ball(&mut self, ball: BallState) {
        self.ball = ball;
    }

    /// Steps until the run finishes or `max_steps` calls have been made,
    /// calling `on_frame` after every successful step.
    pub fn run_with<F>(
        &mut self,
        max_steps: Option<usize>,
        mut on_frame: F,
    ) -> Result<RunSummary, SimError>
    where
        F: FnMut(&BallState, StepStatus),
    {
        let mut steps = 0;
        while !self.ball.finished && max_steps.map_or(true, |max| steps < max) {
            let status = self.step()?;
            steps += 1;
            on_frame(&self.ball, status);
        }
        Ok(RunSummary {
            steps,
            finished: self.ball.finished,
            state: self.ball,
        })
    }

    /// Steps until the run finishes or `max_steps` calls have been made.
    pub fn run(&mut self, max_steps: Option<usize>) -> Result<RunSummary, SimError> {
        self.run_with(max_steps, |_, _| {})
    }

    /// Like [`SaddleTrap::run`], collecting the state after every updating frame.
    pub fn trajectory(&mut self, max_steps: Option<usize>) -> Result<Vec<BallState>, SimError> {
        let mut frames = Vec::new();
        self.run_with(max_steps, |ball, status| {
            if status == StepStatus::Running {
                frames.push(*ball);
            }
        })?;
        Ok(frames)
    }
}

impl Engine for SaddleTrap {
    fn step(&mut self) -> Result<StepStatus, SimError> {
        let was_finished = self.ball.finished;
        let (next, status) = match self.ball.advance(&self.surface, &self.params) {
            Ok(advanced) => advanced,
            Err(e) => {
                log::warn!("step after frame {} failed: {e}", self.ball.frame);
                return Err(e);
            }
        };
        if status == StepStatus::Finished && !was_finished {
            log::info!(
                "phase {:.4} passed final angle {:.4} after {} frames",
                next.phase,
                self.params.final_angle,
                next.frame
            );
        }
        self.ball = next;
        Ok(status)
    }

    fn field(&self) -> &Grid<f64> {
        self.surface.height()
    }

    fn params(&self) -> Value {
        let p = &self.params;
        json!({
            "field_size": p.field_size,
            "fmx": p.fmx,
            "fmz": p.fmz,
            "ci": p.ci,
            "cj": p.cj,
            "phase_step": p.phase_step,
            "final_angle": p.final_angle,
            "camera_angle": p.camera_angle,
            "angle_drift": p.angle_drift,
            "initial_position": p.initial_position.to_array(),
            "initial_velocity": p.initial_velocity.to_array(),
            "initial_phase": p.initial_phase,
            "bounds": p.bounds.name(),
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "field_size": {
                "type": "integer",
                "default": DEFAULT_FIELD_SIZE,
                "min": 1,
                "max": MAX_FIELD_SIZE,
                "description": "Half-extent of the surface grid; coordinates span [-n, n)"
            },
            "fmx": {
                "type": "number",
                "default": DEFAULT_FMX,
                "description": "Horizontal scale; heights are divided by it (non-zero)"
            },
            "fmz": {
                "type": "number",
                "default": DEFAULT_FMZ,
                "description": "Vertical scale; heights are multiplied by it"
            },
            "ci": {
                "type": "number",
                "default": DEFAULT_CI,
                "description": "Gradient coupling into the x velocity"
            },
            "cj": {
                "type": "number",
                "default": DEFAULT_CJ,
                "description": "Gradient coupling into the z velocity"
            },
            "phase_step": {
                "type": "number",
                "default": DEFAULT_PHASE_STEP,
                "min": 0.0,
                "description": "Phase advance per frame (positive)"
            },
            "final_angle": {
                "type": "number",
                "default": DEFAULT_FINAL_ANGLE,
                "description": "Phase past which the run finishes"
            },
            "camera_angle": {
                "type": "number",
                "default": DEFAULT_CAMERA_ANGLE,
                "description": "Starting camera angle; mixes vx into vz"
            },
            "angle_drift": {
                "type": "number",
                "default": DEFAULT_ANGLE_DRIFT,
                "description": "Camera drift and position rotation per frame, in degrees"
            },
            "initial_position": {
                "type": "array",
                "default": DEFAULT_INITIAL_POSITION.to_array(),
                "description": "Starting ball position [x, y, z]"
            },
            "initial_velocity": {
                "type": "array",
                "default": [0.0, 0.0, 0.0],
                "description": "Starting ball velocity [x, y, z]"
            },
            "initial_phase": {
                "type": "number",
                "default": DEFAULT_INITIAL_PHASE,
                "description": "Starting phase angle"
            },
            "bounds": {
                "type": "string",
                "default": BoundsPolicy::Strict.name(),
                "enum": BoundsPolicy::list_names(),
                "description": "Handling of grid cells outside the surface: strict, clamp or wrap"
            }
        })
    }

    fn is_finished(&self) -> bool {
        self.ball.finished
    }
}
