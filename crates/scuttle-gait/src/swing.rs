//! Step motion profile.
//!
//! While a limb is stepping, its effector travels from the stance it left to
//! its new lock. Horizontal motion is a straight lerp on step progress; the
//! vertical component adds a half-sine lift
//!
//! ```text
//! lift(s) = sin(s * PI) * step_height
//! ```
//!
//! which is zero at liftoff and touchdown and peaks at `step_height` mid-step.

use std::f64::consts::PI;

use nalgebra::Vector3;

use crate::limb::{Limb, Lock, StanceState};

/// Vertical arc offset at step progress `s` (clamped to `[0, 1]`).
pub fn arc_offset(progress: f64, step_height: f64) -> f64 {
    let s = progress.clamp(0.0, 1.0);
    (s * PI).sin() * step_height
}

/// Effector position at step progress `s`.
///
/// Returns exactly `target` at `s >= 1` so touchdown carries no residual
/// lift from the sine's floating-point tail.
pub fn step_position(
    start: &Vector3<f64>,
    target: &Vector3<f64>,
    progress: f64,
    step_height: f64,
) -> Vector3<f64> {
    let s = progress.clamp(0.0, 1.0);
    if s >= 1.0 {
        return *target;
    }
    let mut p = start.lerp(target, s);
    p.y += arc_offset(s, step_height);
    p
}

/// Timing and shape of a step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepProfile {
    /// Progress gained per second.
    pub step_speed: f64,
    /// Peak lift above the straight start→target line.
    pub step_height: f64,
}

impl StepProfile {
    pub const fn new(step_speed: f64, step_height: f64) -> Self {
        Self {
            step_speed,
            step_height,
        }
    }

    /// Seconds a full step takes.
    pub fn duration(&self) -> f64 {
        1.0 / self.step_speed
    }

    /// Advance a stepping limb by `dt`. Returns `true` on the tick the step
    /// lands; the limb is then planted exactly on its lock.
    ///
    /// Non-stepping limbs are left untouched.
    pub fn advance(&self, limb: &mut Limb, dt: f64) -> bool {
        if limb.stance != StanceState::Stepping {
            return false;
        }
        let Lock::Locked(target) = limb.lock else {
            // A stepping limb always has a target; treat anything else as landed.
            limb.stance = StanceState::Planted;
            limb.step_progress = 1.0;
            return true;
        };

        limb.step_progress = (limb.step_progress + dt * self.step_speed).clamp(0.0, 1.0);
        if limb.step_progress >= 1.0 {
            limb.effector = target;
            limb.stance = StanceState::Planted;
            return true;
        }
        limb.effector = step_position(
            &limb.previous_lock,
            &target,
            limb.step_progress,
            self.step_height,
        );
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use scuttle_core::config::LimbConfig;
    use scuttle_core::types::{LimbId, Pose};

    fn stepping_limb(from: Vector3<f64>, to: Vector3<f64>) -> Limb {
        let mut limb = Limb::new(LimbId(0), &LimbConfig::new("l", [0.0; 3]), &Pose::identity());
        limb.plant_at(from);
        limb.arm_step(to);
        limb
    }

    #[test]
    fn arc_is_zero_at_ends_and_peaks_midway() {
        assert_relative_eq!(arc_offset(0.0, 0.5), 0.0);
        assert_relative_eq!(arc_offset(1.0, 0.5), 0.0, epsilon = 1e-12);
        assert_relative_eq!(arc_offset(0.5, 0.5), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn arc_is_symmetric() {
        assert_relative_eq!(arc_offset(0.25, 1.0), arc_offset(0.75, 1.0), epsilon = 1e-12);
        assert!(arc_offset(0.5, 1.0) > arc_offset(0.25, 1.0));
    }

    #[test]
    fn arc_clamps_progress() {
        assert_relative_eq!(arc_offset(-0.3, 1.0), 0.0);
        assert_relative_eq!(arc_offset(1.7, 1.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn step_starts_at_start() {
        let start = Vector3::new(0.0, 0.0, 0.0);
        let target = Vector3::new(2.0, 0.0, 0.0);
        assert_relative_eq!(step_position(&start, &target, 0.0, 0.5), start);
    }

    #[test]
    fn step_ends_exactly_at_target() {
        let start = Vector3::new(0.0, 0.0, 0.0);
        let target = Vector3::new(2.0, 1.0, -3.0);
        assert_eq!(step_position(&start, &target, 1.0, 0.5), target);
    }

    #[test]
    fn midpoint_lifts_by_step_height() {
        let start = Vector3::new(0.0, 0.0, 0.0);
        let target = Vector3::new(2.0, 1.0, 0.0);
        let p = step_position(&start, &target, 0.5, 0.5);
        assert_relative_eq!(p, Vector3::new(1.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn advance_progresses_and_lands() {
        let profile = StepProfile::new(5.0, 0.5);
        let target = Vector3::new(3.0, 0.0, 0.0);
        let mut limb = stepping_limb(Vector3::zeros(), target);

        assert!(!profile.advance(&mut limb, 0.1));
        assert_relative_eq!(limb.step_progress(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(*limb.effector(), Vector3::new(1.5, 0.5, 0.0), epsilon = 1e-12);
        assert!(limb.is_stepping());

        assert!(profile.advance(&mut limb, 0.1));
        assert_relative_eq!(limb.step_progress(), 1.0);
        assert_eq!(*limb.effector(), target);
        assert!(!limb.is_stepping());
    }

    #[test]
    fn overshoot_clamps_to_one() {
        let profile = StepProfile::new(5.0, 0.5);
        let mut limb = stepping_limb(Vector3::zeros(), Vector3::x());
        assert!(profile.advance(&mut limb, 10.0));
        assert_relative_eq!(limb.step_progress(), 1.0);
    }

    #[test]
    fn progress_is_monotonic() {
        let profile = StepProfile::new(3.0, 0.4);
        let mut limb = stepping_limb(Vector3::zeros(), Vector3::new(0.0, 0.0, 2.0));
        let mut last = limb.step_progress();
        while limb.is_stepping() {
            profile.advance(&mut limb, 0.02);
            assert!(limb.step_progress() >= last);
            last = limb.step_progress();
        }
        assert_relative_eq!(last, 1.0);
    }

    #[test]
    fn planted_limb_untouched() {
        let profile = StepProfile::new(5.0, 0.5);
        let mut limb = Limb::new(LimbId(0), &LimbConfig::new("l", [0.0; 3]), &Pose::identity());
        limb.plant_at(Vector3::x());
        let before = limb.clone();
        assert!(!profile.advance(&mut limb, 0.1));
        assert_eq!(limb, before);
    }

    #[test]
    fn duration_is_inverse_speed() {
        assert_relative_eq!(StepProfile::new(4.0, 0.1).duration(), 0.25);
    }
}
