//! Per-agent locomotion controller.
//!
//! [`LocomotionController`] owns one agent's body, limbs, gait scheduler and
//! environment backend, and runs the fixed per-tick control flow:
//!
//! 1. Body motion from input (translation, yaw, rotation delta)
//! 2. Idle bookkeeping on every limb
//! 3. Candidate selection, landing prediction and step arming
//! 4. Stepping limbs advance along their arc; planted limbs hold their lock
//! 5. Orientation recorded for next tick's rotation check
//!
//! A step armed during a tick already advances in that same tick.

use nalgebra::Vector3;
use scuttle_core::config::LocomotionConfig;
use scuttle_core::error::ConfigError;
use scuttle_core::time::SimTime;
use scuttle_core::types::{LimbId, Pose, TickInput};
use tracing::{debug, info, warn};

use crate::body::{Body, BodyMotion};
use crate::limb::Limb;
use crate::predictor::{PredictedArc, TrajectoryPredictor};
use crate::query::EnvironmentQuery;
use crate::scheduler::{ArmOutcome, GaitScheduler, StepTrigger};
use crate::swing::StepProfile;

// ---------------------------------------------------------------------------
// Telemetry
// ---------------------------------------------------------------------------

/// What happened during one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Tick counter after this tick.
    pub tick: u64,
    pub motion: BodyMotion,
    /// Scheduler decision, if a limb was evaluated.
    pub outcome: Option<ArmOutcome>,
    /// Limb whose step landed this tick.
    pub completed: Option<LimbId>,
}

impl TickReport {
    /// Limb and trigger of a step armed this tick.
    pub fn armed(&self) -> Option<(LimbId, StepTrigger)> {
        match self.outcome {
            Some(ArmOutcome::Armed { limb, trigger, .. }) => Some((limb, trigger)),
            _ => None,
        }
    }

    /// Limb that committed its first foothold this tick.
    pub fn initial_lock(&self) -> Option<LimbId> {
        match self.outcome {
            Some(ArmOutcome::InitialLock { limb, .. }) => Some(limb),
            _ => None,
        }
    }
}

/// Running totals over a controller's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GaitStats {
    pub ticks: u64,
    pub drift_steps: u64,
    pub rotation_steps: u64,
    pub idle_steps: u64,
    pub completed_steps: u64,
    pub initial_locks: u64,
    /// Selected limb found no landing.
    pub misses: u64,
    /// Total root path length.
    pub distance_travelled: f64,
}

impl GaitStats {
    pub const fn steps_armed(&self) -> u64 {
        self.drift_steps + self.rotation_steps + self.idle_steps
    }

    fn record(&mut self, report: &TickReport) {
        self.ticks += 1;
        self.distance_travelled += report.motion.displacement.norm();
        match report.outcome {
            Some(ArmOutcome::Armed { trigger, .. }) => match trigger {
                StepTrigger::Drift => self.drift_steps += 1,
                StepTrigger::Rotation => self.rotation_steps += 1,
                StepTrigger::Idle => self.idle_steps += 1,
            },
            Some(ArmOutcome::InitialLock { .. }) => self.initial_locks += 1,
            Some(ArmOutcome::NoLanding { .. }) => self.misses += 1,
            Some(ArmOutcome::Held { .. }) | None => {}
        }
        if report.completed.is_some() {
            self.completed_steps += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// LocomotionController
// ---------------------------------------------------------------------------

/// One agent: body, limbs, scheduler and the geometry it walks on.
#[derive(Debug)]
pub struct LocomotionController<Q> {
    config: LocomotionConfig,
    body: Body,
    limbs: Vec<Limb>,
    scheduler: GaitScheduler,
    predictor: TrajectoryPredictor,
    profile: StepProfile,
    env: Q,
    clock: SimTime,
    stats: GaitStats,
}

impl<Q: EnvironmentQuery> LocomotionController<Q> {
    /// Validate `config`, build the limbs at `root` and probe straight down
    /// for each limb's first foothold.
    ///
    /// Limbs whose probe misses start without a lock and pick one up from
    /// the predictor once the scheduler selects them.
    pub fn new(config: LocomotionConfig, root: Pose, env: Q) -> Result<Self, ConfigError> {
        config.validate()?;

        let limbs = config
            .limbs
            .iter()
            .enumerate()
            .map(|(i, lc)| Limb::new(LimbId(i), lc, &root))
            .collect();

        let mut controller = Self {
            body: Body::new(root),
            limbs,
            scheduler: GaitScheduler::from_config(&config),
            predictor: TrajectoryPredictor::new(config.predictor),
            profile: StepProfile::new(config.step_speed, config.step_height),
            env,
            clock: SimTime::new(),
            stats: GaitStats::default(),
            config,
        };
        let grounded = controller.probe_initial_footholds();
        info!(
            limbs = controller.limbs.len(),
            grounded,
            policy = ?controller.config.gait_policy,
            "Locomotion controller ready"
        );
        Ok(controller)
    }

    /// Straight-down probe from every anchor. Returns how many limbs landed.
    fn probe_initial_footholds(&mut self) -> usize {
        let root = *self.body.root();
        let down = self.body.down();
        let length = self.config.initial_probe_length;
        let mut grounded = 0;
        for limb in &mut self.limbs {
            let anchor = limb.anchor(&root);
            if let Some(hit) = self
                .env
                .probe_ray(&anchor, &down, length, limb.surface_mask())
            {
                limb.plant_at(hit.point);
                grounded += 1;
            } else {
                warn!(limb = limb.name(), "No initial foothold below anchor");
            }
        }
        grounded
    }

    /// Advance the agent by one fixed tick. Negative or NaN `dt` counts as zero.
    pub fn tick(&mut self, input: &TickInput, dt: f64) -> TickReport {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        let motion = self.body.advance(
            input,
            self.config.move_speed,
            self.config.input_threshold,
            dt,
        );

        for limb in &mut self.limbs {
            if motion.moving {
                limb.note_movement();
            } else {
                limb.note_idle(dt);
            }
        }

        let root = *self.body.root();
        let down = self.body.down();
        let (predictor, env) = (&self.predictor, &self.env);
        let outcome = self
            .scheduler
            .schedule(&mut self.limbs, motion.rotation_delta, |limb| {
                predictor.predict(
                    env,
                    &limb.anchor(&root),
                    &motion.direction,
                    &down,
                    limb.surface_mask(),
                )
            });
        if let Some(event) = &outcome {
            self.log_outcome(event);
        }

        let mut completed = None;
        for limb in &mut self.limbs {
            if self.profile.advance(limb, dt) {
                self.scheduler.complete(limb.id());
                debug!(limb = limb.name(), "Step landed");
                completed = Some(limb.id());
            }
            limb.pin();
        }

        self.body.settle();
        self.clock.tick(dt);

        let report = TickReport {
            tick: self.clock.ticks(),
            motion,
            outcome,
            completed,
        };
        self.stats.record(&report);
        report
    }

    fn log_outcome(&self, outcome: &ArmOutcome) {
        let name = self.limbs[outcome.limb().index()].name();
        match outcome {
            ArmOutcome::Armed {
                trigger, from, to, ..
            } => debug!(
                limb = name,
                ?trigger,
                distance = (to - from).norm(),
                "Step armed"
            ),
            ArmOutcome::InitialLock { point, .. } => {
                debug!(limb = name, x = point.x, y = point.y, z = point.z, "Initial lock");
            }
            ArmOutcome::Held { .. } | ArmOutcome::NoLanding { .. } => {}
        }
    }

    /// Override the root pose from the host (look control, physics).
    ///
    /// Rotation applied here still counts toward the next tick's rotation
    /// trigger.
    pub const fn set_root_pose(&mut self, root: Pose) {
        self.body.set_root(root);
    }

    /// Teleport the agent: drop every stance and in-flight step, then probe
    /// for new footholds at `root`.
    pub fn reset(&mut self, root: Pose) {
        self.body.reset(root);
        self.scheduler.reset();
        for limb in &mut self.limbs {
            limb.unplant(&root);
        }
        let grounded = self.probe_initial_footholds();
        debug!(grounded, "Controller reset");
    }

    /// Full predicted arc for one limb from the current pose, for debug drawing.
    pub fn trace_limb(&self, id: LimbId, movement: &Vector3<f64>) -> Option<PredictedArc> {
        let limb = self.limbs.get(id.index())?;
        Some(self.predictor.trace(
            &self.env,
            &limb.anchor(self.body.root()),
            movement,
            &self.body.down(),
            limb.surface_mask(),
        ))
    }

    pub const fn config(&self) -> &LocomotionConfig {
        &self.config
    }

    pub const fn body(&self) -> &Body {
        &self.body
    }

    pub const fn root(&self) -> &Pose {
        self.body.root()
    }

    pub fn limbs(&self) -> &[Limb] {
        &self.limbs
    }

    pub fn limb(&self, id: LimbId) -> Option<&Limb> {
        self.limbs.get(id.index())
    }

    /// Look a limb up by its configured name.
    pub fn limb_by_name(&self, name: &str) -> Option<&Limb> {
        self.limbs.iter().find(|l| l.name() == name)
    }

    pub const fn scheduler(&self) -> &GaitScheduler {
        &self.scheduler
    }

    /// Limb currently mid-step.
    pub const fn stepping_limb(&self) -> Option<LimbId> {
        self.scheduler.stepping_limb()
    }

    pub const fn env(&self) -> &Q {
        &self.env
    }

    pub const fn clock(&self) -> &SimTime {
        &self.clock
    }

    pub const fn stats(&self) -> &GaitStats {
        &self.stats
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
