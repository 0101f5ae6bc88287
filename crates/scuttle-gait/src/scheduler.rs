//! Gait scheduler.
//!
//! Decides each tick which limb, if any, may start a step, and whether it
//! should. Limbs move through `Planted → Stepping → Planted` only. A single
//! [`StepPermit`] is shared by all limbs of an agent, so at most one foot is
//! ever in the air:
//!
//! 1. **Select** a candidate while the permit is free ([`GaitPolicy`]).
//! 2. **Predict** the candidate's landing (caller-supplied closure).
//! 3. **Arm** a step if a [`StepTrigger`] fires, acquiring the permit.
//!
//! Selection happens before arming, so only one limb can ever try to acquire
//! the permit in a tick.

use nalgebra::Vector3;
use scuttle_core::config::{GaitPolicy, LocomotionConfig};
use scuttle_core::types::LimbId;

use crate::limb::{Limb, Lock};
use crate::query::Hit;

// ---------------------------------------------------------------------------
// StepPermit
// ---------------------------------------------------------------------------

/// Mutual-exclusion token naming the limb currently mid-step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepPermit {
    holder: Option<LimbId>,
}

impl StepPermit {
    pub const fn holder(&self) -> Option<LimbId> {
        self.holder
    }

    pub const fn is_free(&self) -> bool {
        self.holder.is_none()
    }

    /// Take the permit for `limb`. Fails if anyone already holds it.
    pub(crate) const fn try_acquire(&mut self, limb: LimbId) -> bool {
        if self.holder.is_some() {
            return false;
        }
        self.holder = Some(limb);
        true
    }

    /// Release the permit if `limb` holds it.
    pub(crate) fn release(&mut self, limb: LimbId) -> bool {
        if self.holder == Some(limb) {
            self.holder = None;
            true
        } else {
            false
        }
    }

    pub(crate) const fn clear(&mut self) {
        self.holder = None;
    }
}

// ---------------------------------------------------------------------------
// Triggers
// ---------------------------------------------------------------------------

/// Why a step was armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepTrigger {
    /// Predicted landing drifted farther than `leg_distance` from the lock.
    Drift,
    /// Body turned more than the rotation threshold since last tick.
    Rotation,
    /// Agent idle past the timeout with the foot still off its rest stance.
    Idle,
}

/// Thresholds that decide whether a planted limb re-steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmingRules {
    pub leg_distance: f64,
    pub rotation_threshold_rad: f64,
    pub idle_timeout_secs: f64,
    pub near_rest_threshold: f64,
}

impl ArmingRules {
    pub fn from_config(config: &LocomotionConfig) -> Self {
        Self {
            leg_distance: config.leg_distance,
            rotation_threshold_rad: config.rotation_threshold_rad(),
            idle_timeout_secs: config.idle_timeout_secs,
            near_rest_threshold: config.near_rest_threshold,
        }
    }

    /// First trigger that fires for a locked limb, checked drift → rotation → idle.
    pub fn trigger(
        &self,
        lock: &Vector3<f64>,
        landing: &Vector3<f64>,
        rotation_delta: f64,
        idle_timer: f64,
        has_rested: bool,
    ) -> Option<StepTrigger> {
        let drift = (lock - landing).norm();
        if drift > self.leg_distance {
            Some(StepTrigger::Drift)
        } else if rotation_delta > self.rotation_threshold_rad {
            Some(StepTrigger::Rotation)
        } else if idle_timer > self.idle_timeout_secs
            && !has_rested
            && drift > self.near_rest_threshold
        {
            Some(StepTrigger::Idle)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of evaluating the selected limb against its prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArmOutcome {
    /// First foothold committed; no step motion.
    InitialLock { limb: LimbId, point: Vector3<f64> },
    /// A step was armed and the permit acquired.
    Armed {
        limb: LimbId,
        trigger: StepTrigger,
        from: Vector3<f64>,
        to: Vector3<f64>,
    },
    /// Landing found but no trigger fired.
    Held { limb: LimbId },
    /// Prediction found nothing; state unchanged.
    NoLanding { limb: LimbId },
}

impl ArmOutcome {
    pub const fn limb(&self) -> LimbId {
        match self {
            Self::InitialLock { limb, .. }
            | Self::Armed { limb, .. }
            | Self::Held { limb }
            | Self::NoLanding { limb } => *limb,
        }
    }
}

// ---------------------------------------------------------------------------
// GaitScheduler
// ---------------------------------------------------------------------------

/// Picks and arms at most one step per tick; owns the step permit.
#[derive(Clone, Debug)]
pub struct GaitScheduler {
    policy: GaitPolicy,
    rules: ArmingRules,
    permit: StepPermit,
    /// Round-robin cursor. Ignored by other policies.
    next_index: usize,
    n_limbs: usize,
}

impl GaitScheduler {
    pub const fn new(policy: GaitPolicy, rules: ArmingRules, n_limbs: usize) -> Self {
        Self {
            policy,
            rules,
            permit: StepPermit { holder: None },
            next_index: 0,
            n_limbs,
        }
    }

    pub fn from_config(config: &LocomotionConfig) -> Self {
        Self::new(
            config.gait_policy,
            ArmingRules::from_config(config),
            config.limbs.len(),
        )
    }

    pub const fn policy(&self) -> GaitPolicy {
        self.policy
    }

    pub const fn rules(&self) -> &ArmingRules {
        &self.rules
    }

    pub const fn permit(&self) -> &StepPermit {
        &self.permit
    }

    /// Limb currently holding the step permit.
    pub const fn stepping_limb(&self) -> Option<LimbId> {
        self.permit.holder
    }

    /// Round-robin cursor.
    pub const fn next_index(&self) -> usize {
        self.next_index
    }

    /// Run selection, prediction and arming for one tick.
    ///
    /// `predict` is only called for limbs the policy wants to look at and
    /// must not touch limb state. Returns `None` when the permit is busy or
    /// no limb could be evaluated.
    pub fn schedule<F>(
        &mut self,
        limbs: &mut [Limb],
        rotation_delta: f64,
        mut predict: F,
    ) -> Option<ArmOutcome>
    where
        F: FnMut(&Limb) -> Option<Hit>,
    {
        if !self.permit.is_free() || limbs.is_empty() {
            return None;
        }
        let (selected, landing) = match self.policy {
            GaitPolicy::RoundRobin => {
                let index = self.next_index % limbs.len();
                (index, predict(&limbs[index]))
            }
            GaitPolicy::FarthestFirst => {
                let (index, hit) = Self::farthest_candidate(limbs, &mut predict)?;
                (index, Some(hit))
            }
        };
        Some(self.evaluate(&mut limbs[selected], landing, rotation_delta))
    }

    /// Limb whose predicted landing is farthest from its current effector.
    ///
    /// Ties keep the earliest limb. Limbs with no prediction are skipped.
    fn farthest_candidate<F>(limbs: &[Limb], predict: &mut F) -> Option<(usize, Hit)>
    where
        F: FnMut(&Limb) -> Option<Hit>,
    {
        let mut best: Option<(usize, Hit, f64)> = None;
        for (i, limb) in limbs.iter().enumerate() {
            if limb.is_stepping() {
                continue;
            }
            let Some(hit) = predict(limb) else {
                continue;
            };
            let distance = (hit.point - limb.effector).norm();
            if best.is_none_or(|(_, _, d)| distance > d) {
                best = Some((i, hit, distance));
            }
        }
        best.map(|(i, hit, _)| (i, hit))
    }

    /// Apply the arming rules to one selected limb.
    pub fn evaluate(
        &mut self,
        limb: &mut Limb,
        landing: Option<Hit>,
        rotation_delta: f64,
    ) -> ArmOutcome {
        let id = limb.id();
        let Some(hit) = landing else {
            return ArmOutcome::NoLanding { limb: id };
        };
        limb.last_sampled_hit = Some(hit.point);

        let Lock::Locked(lock) = limb.lock else {
            limb.plant_at(hit.point);
            return ArmOutcome::InitialLock {
                limb: id,
                point: hit.point,
            };
        };

        if limb.is_stepping() {
            return ArmOutcome::Held { limb: id };
        }
        let Some(trigger) = self.rules.trigger(
            &lock,
            &hit.point,
            rotation_delta,
            limb.idle_timer,
            limb.has_rested,
        ) else {
            return ArmOutcome::Held { limb: id };
        };
        if !self.permit.try_acquire(id) {
            return ArmOutcome::Held { limb: id };
        }

        let from = limb.effector;
        limb.arm_step(hit.point);
        ArmOutcome::Armed {
            limb: id,
            trigger,
            from,
            to: hit.point,
        }
    }

    /// A step landed: release the permit and move the round-robin cursor on.
    pub fn complete(&mut self, limb: LimbId) {
        if self.permit.release(limb) && self.policy == GaitPolicy::RoundRobin && self.n_limbs > 0
        {
            self.next_index = (limb.index() + 1) % self.n_limbs;
        }
    }

    /// Drop any step in flight and restart the round-robin cursor.
    pub const fn reset(&mut self) {
        self.permit.clear();
        self.next_index = 0;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use scuttle_core::config::LimbConfig;
    use scuttle_core::types::Pose;

    fn rules() -> ArmingRules {
        ArmingRules {
            leg_distance: 2.0,
            rotation_threshold_rad: 1.0_f64.to_radians(),
            idle_timeout_secs: 0.3,
            near_rest_threshold: 0.05,
        }
    }

    fn planted_limbs(points: &[Vector3<f64>]) -> Vec<Limb> {
        points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let mut limb = Limb::new(
                    LimbId(i),
                    &LimbConfig::new(format!("l{i}"), [0.0; 3]),
                    &Pose::identity(),
                );
                limb.plant_at(*p);
                limb
            })
            .collect()
    }

    fn hit(x: f64, y: f64, z: f64) -> Hit {
        Hit::new(Vector3::new(x, y, z), Vector3::y())
    }

    // -- StepPermit --

    #[test]
    fn permit_is_exclusive() {
        let mut permit = StepPermit::default();
        assert!(permit.try_acquire(LimbId(0)));
        assert!(!permit.try_acquire(LimbId(1)));
        assert!(!permit.release(LimbId(1)));
        assert_eq!(permit.holder(), Some(LimbId(0)));
        assert!(permit.release(LimbId(0)));
        assert!(permit.is_free());
    }

    // -- ArmingRules --

    #[test]
    fn drift_beyond_leg_distance_triggers() {
        let t = rules().trigger(&Vector3::zeros(), &Vector3::new(3.0, 0.0, 0.0), 0.0, 0.0, true);
        assert_eq!(t, Some(StepTrigger::Drift));
    }

    #[test]
    fn drift_at_leg_distance_does_not_trigger() {
        let t = rules().trigger(&Vector3::zeros(), &Vector3::new(2.0, 0.0, 0.0), 0.0, 0.0, true);
        assert_eq!(t, None);
    }

    #[test]
    fn rotation_triggers_within_reach() {
        let t = rules().trigger(
            &Vector3::zeros(),
            &Vector3::new(0.5, 0.0, 0.0),
            5.0_f64.to_radians(),
            0.0,
            true,
        );
        assert_eq!(t, Some(StepTrigger::Rotation));
    }

    #[test]
    fn sub_degree_rotation_ignored() {
        let t = rules().trigger(
            &Vector3::zeros(),
            &Vector3::new(0.5, 0.0, 0.0),
            0.5_f64.to_radians(),
            0.0,
            true,
        );
        assert_eq!(t, None);
    }

    #[test]
    fn idle_requires_timeout_unrested_and_drift() {
        let r = rules();
        let lock = Vector3::zeros();
        let off = Vector3::new(0.5, 0.0, 0.0);
        let near = Vector3::new(0.01, 0.0, 0.0);
        assert_eq!(r.trigger(&lock, &off, 0.0, 0.31, false), Some(StepTrigger::Idle));
        assert_eq!(r.trigger(&lock, &off, 0.0, 0.29, false), None);
        assert_eq!(r.trigger(&lock, &off, 0.0, 0.31, true), None);
        assert_eq!(r.trigger(&lock, &near, 0.0, 0.31, false), None);
    }

    // -- evaluate --

    #[test]
    fn no_landing_changes_nothing() {
        let mut sched = GaitScheduler::new(GaitPolicy::RoundRobin, rules(), 1);
        let mut limbs = planted_limbs(&[Vector3::zeros()]);
        let before = limbs[0].clone();
        let out = sched.evaluate(&mut limbs[0], None, 1.0);
        assert_eq!(out, ArmOutcome::NoLanding { limb: LimbId(0) });
        assert_eq!(limbs[0], before);
        assert!(sched.permit().is_free());
    }

    #[test]
    fn first_landing_commits_lock_without_step() {
        let mut sched = GaitScheduler::new(GaitPolicy::RoundRobin, rules(), 1);
        let mut limb = Limb::new(LimbId(0), &LimbConfig::new("l", [0.0; 3]), &Pose::identity());
        let out = sched.evaluate(&mut limb, Some(hit(4.0, 0.0, 0.0)), 0.0);
        assert!(matches!(out, ArmOutcome::InitialLock { .. }));
        assert_eq!(limb.lock(), Lock::Locked(Vector3::new(4.0, 0.0, 0.0)));
        assert!(!limb.is_stepping());
        assert!(sched.permit().is_free());
    }

    #[test]
    fn drift_arms_step() {
        let mut sched = GaitScheduler::new(GaitPolicy::RoundRobin, rules(), 1);
        let mut limbs = planted_limbs(&[Vector3::zeros()]);
        let out = sched.evaluate(&mut limbs[0], Some(hit(3.0, 0.0, 0.0)), 0.0);
        assert_eq!(
            out,
            ArmOutcome::Armed {
                limb: LimbId(0),
                trigger: StepTrigger::Drift,
                from: Vector3::zeros(),
                to: Vector3::new(3.0, 0.0, 0.0),
            }
        );
        let limb = &limbs[0];
        assert!(limb.is_stepping());
        assert_relative_eq!(*limb.previous_lock(), Vector3::zeros());
        assert_eq!(limb.lock(), Lock::Locked(Vector3::new(3.0, 0.0, 0.0)));
        assert_relative_eq!(limb.step_progress(), 0.0);
        assert_eq!(sched.stepping_limb(), Some(LimbId(0)));
    }

    #[test]
    fn held_when_within_reach() {
        let mut sched = GaitScheduler::new(GaitPolicy::RoundRobin, rules(), 1);
        let mut limbs = planted_limbs(&[Vector3::zeros()]);
        let out = sched.evaluate(&mut limbs[0], Some(hit(1.0, 0.0, 0.0)), 0.0);
        assert_eq!(out, ArmOutcome::Held { limb: LimbId(0) });
        assert_eq!(limbs[0].last_sampled_hit(), Some(Vector3::new(1.0, 0.0, 0.0)));
        assert!(!limbs[0].is_stepping());
    }

    #[test]
    fn idle_step_fires_once() {
        let mut sched = GaitScheduler::new(GaitPolicy::RoundRobin, rules(), 1);
        let mut limbs = planted_limbs(&[Vector3::zeros()]);
        limbs[0].note_movement();
        limbs[0].note_idle(0.35);

        let out = sched.evaluate(&mut limbs[0], Some(hit(0.5, 0.0, 0.0)), 0.0);
        assert!(matches!(out, ArmOutcome::Armed { trigger: StepTrigger::Idle, .. }));
        assert!(limbs[0].has_rested());

        // Land, then wait another full timeout without input.
        limbs[0].stance = crate::limb::StanceState::Planted;
        limbs[0].step_progress = 1.0;
        sched.complete(LimbId(0));
        limbs[0].note_idle(0.35);
        let out = sched.evaluate(&mut limbs[0], Some(hit(0.0, 0.0, 0.4)), 0.0);
        assert_eq!(out, ArmOutcome::Held { limb: LimbId(0) });
    }

    // -- schedule: round robin --

    #[test]
    fn round_robin_only_probes_cursor_limb() {
        let mut sched = GaitScheduler::new(GaitPolicy::RoundRobin, rules(), 3);
        let mut limbs = planted_limbs(&[Vector3::zeros(); 3]);
        let mut probed = Vec::new();
        sched.schedule(&mut limbs, 0.0, |l| {
            probed.push(l.id());
            None
        });
        assert_eq!(probed, vec![LimbId(0)]);
    }

    #[test]
    fn round_robin_advances_on_completion_only() {
        let mut sched = GaitScheduler::new(GaitPolicy::RoundRobin, rules(), 3);
        let mut limbs = planted_limbs(&[Vector3::zeros(); 3]);

        // A miss does not move the cursor.
        let out = sched.schedule(&mut limbs, 0.0, |_| None);
        assert_eq!(out, Some(ArmOutcome::NoLanding { limb: LimbId(0) }));
        assert_eq!(sched.next_index(), 0);

        let out = sched.schedule(&mut limbs, 0.0, |_| Some(hit(5.0, 0.0, 0.0)));
        assert!(matches!(out, Some(ArmOutcome::Armed { limb: LimbId(0), .. })));
        assert_eq!(sched.next_index(), 0);

        // Permit busy: nobody else is evaluated.
        let out = sched.schedule(&mut limbs, 0.0, |_| Some(hit(9.0, 0.0, 0.0)));
        assert_eq!(out, None);

        sched.complete(LimbId(0));
        assert_eq!(sched.next_index(), 1);
        assert!(sched.permit().is_free());
    }

    #[test]
    fn round_robin_wraps() {
        let mut sched = GaitScheduler::new(GaitPolicy::RoundRobin, rules(), 2);
        let mut limbs = planted_limbs(&[Vector3::zeros(); 2]);
        for expected in [0, 1, 0] {
            let out = sched.schedule(&mut limbs, 0.0, |_| Some(hit(5.0, 0.0, 0.0))).unwrap();
            assert_eq!(out.limb(), LimbId(expected));
            limbs[expected].stance = crate::limb::StanceState::Planted;
            limbs[expected].lock = Lock::Locked(Vector3::zeros());
            sched.complete(LimbId(expected));
        }
    }

    #[test]
    fn complete_by_non_holder_is_ignored() {
        let mut sched = GaitScheduler::new(GaitPolicy::RoundRobin, rules(), 2);
        let mut limbs = planted_limbs(&[Vector3::zeros(); 2]);
        sched.schedule(&mut limbs, 0.0, |_| Some(hit(5.0, 0.0, 0.0)));
        sched.complete(LimbId(1));
        assert_eq!(sched.stepping_limb(), Some(LimbId(0)));
        assert_eq!(sched.next_index(), 0);
    }

    // -- schedule: farthest first --

    #[test]
    fn farthest_first_picks_largest_displacement() {
        let mut sched = GaitScheduler::new(GaitPolicy::FarthestFirst, rules(), 3);
        let mut limbs = planted_limbs(&[Vector3::zeros(); 3]);
        let out = sched
            .schedule(&mut limbs, 0.0, |l| match l.id().index() {
                0 => Some(hit(2.5, 0.0, 0.0)),
                1 => Some(hit(4.0, 0.0, 0.0)),
                _ => Some(hit(3.0, 0.0, 0.0)),
            })
            .unwrap();
        assert!(matches!(out, ArmOutcome::Armed { limb: LimbId(1), .. }));
        assert_eq!(sched.stepping_limb(), Some(LimbId(1)));
        assert!(!limbs[0].is_stepping());
        assert!(!limbs[2].is_stepping());
    }

    #[test]
    fn farthest_first_tie_keeps_first() {
        let mut sched = GaitScheduler::new(GaitPolicy::FarthestFirst, rules(), 3);
        let mut limbs = planted_limbs(&[Vector3::zeros(); 3]);
        let out = sched
            .schedule(&mut limbs, 0.0, |l| {
                if l.id().index() == 0 {
                    Some(hit(1.0, 0.0, 0.0))
                } else {
                    Some(hit(3.0, 0.0, 0.0))
                }
            })
            .unwrap();
        assert_eq!(out.limb(), LimbId(1));
    }

    #[test]
    fn farthest_first_skips_misses() {
        let mut sched = GaitScheduler::new(GaitPolicy::FarthestFirst, rules(), 2);
        let mut limbs = planted_limbs(&[Vector3::zeros(); 2]);
        let out = sched
            .schedule(&mut limbs, 0.0, |l| {
                (l.id().index() == 1).then(|| hit(0.1, 0.0, 0.0))
            })
            .unwrap();
        assert_eq!(out, ArmOutcome::Held { limb: LimbId(1) });
    }

    #[test]
    fn farthest_first_all_miss_is_none() {
        let mut sched = GaitScheduler::new(GaitPolicy::FarthestFirst, rules(), 2);
        let mut limbs = planted_limbs(&[Vector3::zeros(); 2]);
        assert_eq!(sched.schedule(&mut limbs, 0.0, |_| None), None);
    }

    #[test]
    fn farthest_first_does_not_move_cursor() {
        let mut sched = GaitScheduler::new(GaitPolicy::FarthestFirst, rules(), 2);
        let mut limbs = planted_limbs(&[Vector3::zeros(); 2]);
        sched.schedule(&mut limbs, 0.0, |_| Some(hit(5.0, 0.0, 0.0)));
        sched.complete(LimbId(0));
        assert_eq!(sched.next_index(), 0);
        assert!(sched.permit().is_free());
    }

    #[test]
    fn reset_frees_permit() {
        let mut sched = GaitScheduler::new(GaitPolicy::RoundRobin, rules(), 2);
        let mut limbs = planted_limbs(&[Vector3::zeros(); 2]);
        sched.schedule(&mut limbs, 0.0, |_| Some(hit(5.0, 0.0, 0.0)));
        sched.reset();
        assert!(sched.permit().is_free());
        assert_eq!(sched.next_index(), 0);
    }
}
