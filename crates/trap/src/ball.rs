//! Ball state and the per-frame update rule.
//!
//! The update is a hand-tuned toy rule rather than an integrator: the ball's
//! height is read straight off the flipping surface, and only the horizontal
//! velocity is nudged by the sampled gradient.

use std::f64::consts::TAU;

use glam::DVec3;
use saddle_core::engine::StepStatus;
use saddle_core::error::SimError;
use serde::{Deserialize, Serialize};

use crate::surface::Surface;
use crate::TrapParams;

/// Position, velocity and phase of the ball, advanced once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallState {
    /// `(px, py, pz)`; `py` is overwritten from the surface every frame.
    pub position: DVec3,
    /// `(vx, vy, vz)`; `vy` is always reset to zero.
    pub velocity: DVec3,
    /// Surface amplitude `r = sin(phase mod 2π)` applied to heights and gradients.
    pub amplitude: f64,
    /// Phase angle `ang`, advanced by the phase step each frame.
    pub phase: f64,
    /// Camera angle, drifting by the angle drift each frame. Mixes `vx` into `vz`.
    pub camera_angle: f64,
    /// Frames that updated position and velocity.
    pub frame: u64,
    /// Set once the phase passed the final angle.
    pub finished: bool,
}

impl BallState {
    /// Starting state for `params`: amplitude 1, frame 0, not finished.
    pub fn initial(params: &TrapParams) -> Self {
        Self {
            position: params.initial_position,
            velocity: params.initial_velocity,
            amplitude: 1.0,
            phase: params.initial_phase,
            camera_angle: params.camera_angle,
            frame: 0,
            finished: false,
        }
    }

    /// Grid cell under the ball, truncating `px` and `pz` toward zero.
    pub fn cell(&self) -> (isize, isize) {
        (self.position.x as isize, self.position.z as isize)
    }

    /// Computes the state one frame later without modifying `self`.
    ///
    /// Order of operations:
    /// 1. phase and amplitude advance, camera angle drifts;
    /// 2. if the phase passed `final_angle` the state is marked finished and
    ///    position and velocity are left as they were;
    /// 3. `(px, pz)` moves by the velocity and rotates by the drift (in degrees);
    /// 4. `vz` mixes in `vx` through the camera angle (taken as radians);
    /// 5. height and gradient are sampled at the truncated cell and scaled by
    ///    the amplitude, `vy` is reset.
    ///
    /// A finished state is returned unchanged with `StepStatus::Finished`.
    pub fn advance(
        &self,
        surface: &Surface,
        params: &TrapParams,
    ) -> Result<(Self, StepStatus), SimError> {
        if self.finished {
            return Ok((*self, StepStatus::Finished));
        }

        let mut next = *self;
        next.phase += params.phase_step;
        next.amplitude = next.phase.rem_euclid(TAU).sin();
        next.camera_angle += params.angle_drift;

        if next.phase > params.final_angle {
            next.finished = true;
            return Ok((next, StepStatus::Finished));
        }

        let (sin_da, cos_da) = params.angle_drift.to_radians().sin_cos();
        let p = self.position;
        let v = self.velocity;
        let x = cos_da * (p.x + v.x) - sin_da * (p.z + v.z);
        // The z rotation reads the already rotated x.
        let z = sin_da * (x + v.x) + cos_da * (p.z + v.z);
        if !x.is_finite() || !z.is_finite() {
            return Err(SimError::NonFiniteState { x, z });
        }

        let (sin_cam, cos_cam) = next.camera_angle.sin_cos();
        let vz = sin_cam * v.x + cos_cam * v.z;

        next.position = DVec3::new(x, 0.0, z);
        let (i, j) = params
            .bounds
            .resolve(x as isize, z as isize, surface.half_extent())?;
        let h = surface.height().get(i, j)?;
        let g = surface.gradient().get(i, j)?;

        let r = next.amplitude;
        next.position.y = r * h;
        next.velocity = DVec3::new(
            v.x + params.ci * (r * g.x),
            0.0,
            vz + params.cj * (r * g.y),
        );
        next.frame += 1;

        Ok((next, StepStatus::Running))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saddle_core::bounds::BoundsPolicy;
    use std::f64::consts::PI;

    fn setup(bounds: BoundsPolicy) -> (Surface, TrapParams) {
        let params = TrapParams {
            bounds,
            ..TrapParams::default()
        };
        let surface = Surface::build(params.field_size, params.fmx, params.fmz).unwrap();
        (surface, params)
    }

    fn assert_close(got: f64, want: f64, what: &str) {
        assert!((got - want).abs() < 1e-9, "{what}: got {got}, want {want}");
    }

    #[test]
    fn initial_state_uses_params() {
        let params = TrapParams::default();
        let ball = BallState::initial(&params);
        assert_eq!(ball.position, DVec3::new(10.0, 0.0, 0.0));
        assert_eq!(ball.velocity, DVec3::ZERO);
        assert_eq!(ball.amplitude, 1.0);
        assert_eq!(ball.phase, PI - 0.2);
        assert_eq!(ball.camera_angle, -20.0);
        assert_eq!(ball.frame, 0);
        assert!(!ball.finished);
    }

    #[test]
    fn cell_truncates_toward_zero() {
        let mut ball = BallState::initial(&TrapParams::default());
        ball.position = DVec3::new(-15.87, 3.0, 50.61);
        assert_eq!(ball.cell(), (-15, 50));
        ball.position = DVec3::new(-0.9, 0.0, 0.9);
        assert_eq!(ball.cell(), (0, 0));
    }

    #[test]
    fn first_frame_from_documented_start() {
        let (surface, params) = setup(BoundsPolicy::Strict);
        let ball = BallState::initial(&params);
        let (next, status) = ball.advance(&surface, &params).unwrap();

        assert_eq!(status, StepStatus::Running);
        assert_close(next.phase, PI, "phase");
        assert_close(next.position.x, 10.0, "px");
        assert_close(next.position.z, 0.0, "pz");
        // sin(π) is a tiny residual, so the surface is flat this frame.
        assert!(next.position.y.abs() < 1e-12);
        assert!(next.velocity.x.abs() < 1e-12);
        assert_eq!(next.velocity.y, 0.0);
        assert_eq!(next.frame, 1);
        assert_eq!(next.camera_angle, -20.0);
    }

    #[test]
    fn first_four_frames_follow_the_saddle() {
        let (surface, params) = setup(BoundsPolicy::Strict);
        let mut ball = BallState::initial(&params);
        for _ in 0..4 {
            ball = ball.advance(&surface, &params).unwrap().0;
        }
        assert_close(ball.position.x, 10.047834825837045, "px");
        assert_close(ball.position.y, -0.9034279574320572, "py");
        assert_close(ball.position.z, -0.01102755269848689, "pz");
        assert_close(ball.velocity.x, 0.07008599290712386, "vx");
        assert_close(ball.velocity.z, -0.03714317081078129, "vz");
    }

    #[test]
    fn vertical_velocity_is_always_reset() {
        let (surface, params) = setup(BoundsPolicy::Strict);
        let mut ball = BallState::initial(&params);
        ball.velocity.y = 5.0;
        let (next, _) = ball.advance(&surface, &params).unwrap();
        assert_eq!(next.velocity.y, 0.0);
    }

    #[test]
    fn height_is_read_from_surface_not_integrated() {
        let (surface, params) = setup(BoundsPolicy::Strict);
        let mut ball = BallState::initial(&params);
        ball.position = DVec3::new(-20.0, 999.0, 0.0);
        ball.phase = PI / 2.0 - params.phase_step;
        let (next, _) = ball.advance(&surface, &params).unwrap();
        let h = surface.height().get(-20, 0).unwrap();
        assert_close(next.position.y, next.amplitude * h, "py");
        assert_close(next.amplitude, 1.0, "amplitude at π/2");
    }

    #[test]
    fn ball_at_origin_stays_put() {
        let (surface, params) = setup(BoundsPolicy::Strict);
        let mut ball = BallState::initial(&params);
        ball.position = DVec3::ZERO;
        for _ in 0..50 {
            ball = ball.advance(&surface, &params).unwrap().0;
        }
        assert_eq!(ball.position.x, 0.0);
        assert_eq!(ball.position.z, 0.0);
        assert_eq!(ball.velocity, DVec3::ZERO);
    }

    #[test]
    fn terminal_step_leaves_position_and_velocity() {
        let (surface, params) = setup(BoundsPolicy::Strict);
        let mut ball = BallState::initial(&params);
        ball.phase = params.final_angle - 0.1;
        ball.velocity = DVec3::new(0.5, 0.0, -0.5);
        let (next, status) = ball.advance(&surface, &params).unwrap();
        assert_eq!(status, StepStatus::Finished);
        assert!(next.finished);
        assert_eq!(next.position, ball.position);
        assert_eq!(next.velocity, ball.velocity);
        assert_eq!(next.frame, ball.frame);
        assert!(next.phase > params.final_angle);
    }

    #[test]
    fn finished_state_is_a_fixed_point() {
        let (surface, params) = setup(BoundsPolicy::Strict);
        let mut ball = BallState::initial(&params);
        ball.finished = true;
        let (next, status) = ball.advance(&surface, &params).unwrap();
        assert_eq!(status, StepStatus::Finished);
        assert_eq!(next, ball);
    }

    #[test]
    fn strict_bounds_reports_out_of_range() {
        let (surface, params) = setup(BoundsPolicy::Strict);
        let mut ball = BallState::initial(&params);
        ball.position = DVec3::new(10.0, 0.0, 49.5);
        ball.velocity = DVec3::new(0.0, 0.0, 1.0);
        let err = ball.advance(&surface, &params).unwrap_err();
        assert!(matches!(
            err,
            SimError::OutOfRange {
                i: 10,
                j: 50,
                half_extent: 50
            }
        ));
    }

    #[test]
    fn wrap_and_clamp_resolve_the_same_overshoot() {
        let mut ball = BallState::initial(&TrapParams::default());
        ball.position = DVec3::new(10.0, 0.0, 49.5);
        ball.velocity = DVec3::new(0.0, 0.0, 1.0);
        // Pick a phase where the amplitude is non-zero.
        ball.phase = PI / 2.0 - 0.2;

        let (surface, wrap) = setup(BoundsPolicy::Wrap);
        let (wrapped, _) = ball.advance(&surface, &wrap).unwrap();
        let (_, clamp) = setup(BoundsPolicy::Clamp);
        let (clamped, _) = ball.advance(&surface, &clamp).unwrap();

        let r = wrapped.amplitude;
        assert_close(wrapped.position.y, r * surface.height().get(10, -50).unwrap(), "wrap py");
        assert_close(clamped.position.y, r * surface.height().get(10, 49).unwrap(), "clamp py");
        // Position itself is not folded back onto the grid.
        assert_close(wrapped.position.z, 50.5, "wrap pz");
        assert_close(clamped.position.z, 50.5, "clamp pz");
    }

    #[test]
    fn non_finite_position_is_reported() {
        let (surface, params) = setup(BoundsPolicy::Wrap);
        let mut ball = BallState::initial(&params);
        ball.velocity = DVec3::new(f64::NAN, 0.0, 0.0);
        assert!(matches!(
            ball.advance(&surface, &params),
            Err(SimError::NonFiniteState { .. })
        ));
    }

    #[test]
    fn angle_drift_rotates_and_turns_camera() {
        let (surface, mut params) = setup(BoundsPolicy::Strict);
        params.angle_drift = 90.0;
        let ball = BallState::initial(&params);
        let (next, _) = ball.advance(&surface, &params).unwrap();
        // A quarter turn carries (10, 0) to x ≈ 0, then z reads that x.
        assert_close(next.position.x, 0.0, "px");
        assert_close(next.position.z, 0.0, "pz");
        assert_eq!(next.camera_angle, -20.0 + 90.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn advance_is_deterministic(
                px in -40.0_f64..40.0,
                pz in -40.0_f64..40.0,
                vx in -1.0_f64..1.0,
                vz in -1.0_f64..1.0,
                phase in 0.0_f64..30.0,
            ) {
                let (surface, params) = setup(BoundsPolicy::Wrap);
                let mut ball = BallState::initial(&params);
                ball.position = DVec3::new(px, 0.0, pz);
                ball.velocity = DVec3::new(vx, 0.0, vz);
                ball.phase = phase;

                let a = ball.advance(&surface, &params).unwrap();
                let b = ball.advance(&surface, &params).unwrap();
                prop_assert_eq!(a.1, b.1);
                prop_assert_eq!(a.0.position.to_array().map(f64::to_bits),
                                b.0.position.to_array().map(f64::to_bits));
                prop_assert_eq!(a.0.velocity.to_array().map(f64::to_bits),
                                b.0.velocity.to_array().map(f64::to_bits));
            }

            #[test]
            fn amplitude_stays_in_unit_interval(phase in -100.0_f64..100.0) {
                let (surface, params) = setup(BoundsPolicy::Wrap);
                let mut ball = BallState::initial(&params);
                ball.position = DVec3::ZERO;
                ball.phase = phase;
                let (next, _) = ball.advance(&surface, &params).unwrap();
                prop_assert!((-1.0..=1.0).contains(&next.amplitude));
            }
        }
    }
}
