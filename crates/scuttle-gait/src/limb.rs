//! Per-limb locomotion state.
//!
//! A [`Limb`] is a plain value owned by the controller. Its fields are only
//! mutated through the scheduler and step profile, which keeps the
//! `Planted → Stepping → Planted` state machine intact.

use nalgebra::Vector3;
use scuttle_core::config::LimbConfig;
use scuttle_core::types::{LimbId, Pose, SurfaceMask};

/// Committed foothold.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Lock {
    /// No stance yet (spawned over open air, or reset).
    #[default]
    NoLock,
    Locked(Vector3<f64>),
}

impl Lock {
    pub const fn position(&self) -> Option<Vector3<f64>> {
        match self {
            Self::NoLock => None,
            Self::Locked(p) => Some(*p),
        }
    }

    pub const fn is_locked(&self) -> bool {
        matches!(self, Self::Locked(_))
    }
}

/// Stance state of a limb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StanceState {
    #[default]
    Planted,
    Stepping,
}

/// One leg/arm of the agent.
#[derive(Debug, Clone, PartialEq)]
pub struct Limb {
    id: LimbId,
    name: String,
    anchor_offset: Vector3<f64>,
    surface_mask: SurfaceMask,

    pub(crate) effector: Vector3<f64>,
    pub(crate) stance: StanceState,
    pub(crate) lock: Lock,
    pub(crate) previous_lock: Vector3<f64>,
    pub(crate) step_progress: f64,
    pub(crate) idle_timer: f64,
    pub(crate) has_rested: bool,
    pub(crate) last_sampled_hit: Option<Vector3<f64>>,
}

impl Limb {
    /// Unplanted limb with its effector resting at the anchor.
    pub fn new(id: LimbId, config: &LimbConfig, root: &Pose) -> Self {
        let anchor_offset = config.anchor_offset();
        let anchor = root.transform_point(&anchor_offset);
        Self {
            id,
            name: config.name.clone(),
            anchor_offset,
            surface_mask: config.surface_mask,
            effector: anchor,
            stance: StanceState::Planted,
            lock: Lock::NoLock,
            previous_lock: anchor,
            step_progress: 1.0,
            idle_timer: 0.0,
            has_rested: false,
            last_sampled_hit: None,
        }
    }

    /// Seed the stance from the initial ground probe.
    pub(crate) fn plant_at(&mut self, point: Vector3<f64>) {
        self.lock = Lock::Locked(point);
        self.previous_lock = point;
        self.effector = point;
        self.stance = StanceState::Planted;
        self.step_progress = 1.0;
        self.has_rested = true;
        self.last_sampled_hit = Some(point);
    }

    /// Drop the stance; the next prediction re-acquires it.
    pub(crate) fn unplant(&mut self, root: &Pose) {
        let anchor = self.anchor(root);
        self.lock = Lock::NoLock;
        self.previous_lock = anchor;
        self.effector = anchor;
        self.stance = StanceState::Planted;
        self.step_progress = 1.0;
        self.idle_timer = 0.0;
        self.has_rested = false;
        self.last_sampled_hit = None;
    }

    pub const fn id(&self) -> LimbId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn surface_mask(&self) -> SurfaceMask {
        self.surface_mask
    }

    pub const fn anchor_offset(&self) -> &Vector3<f64> {
        &self.anchor_offset
    }

    /// World-space anchor for the given body pose.
    pub fn anchor(&self, root: &Pose) -> Vector3<f64> {
        root.transform_point(&self.anchor_offset)
    }

    /// Current effector target position (the pose sink output).
    pub const fn effector(&self) -> &Vector3<f64> {
        &self.effector
    }

    pub const fn stance(&self) -> StanceState {
        self.stance
    }

    pub const fn is_stepping(&self) -> bool {
        matches!(self.stance, StanceState::Stepping)
    }

    pub const fn lock(&self) -> Lock {
        self.lock
    }

    pub const fn previous_lock(&self) -> &Vector3<f64> {
        &self.previous_lock
    }

    pub const fn step_progress(&self) -> f64 {
        self.step_progress
    }

    pub const fn idle_timer(&self) -> f64 {
        self.idle_timer
    }

    pub const fn has_rested(&self) -> bool {
        self.has_rested
    }

    pub const fn last_sampled_hit(&self) -> Option<Vector3<f64>> {
        self.last_sampled_hit
    }

    /// Planted on a committed foothold.
    pub const fn is_grounded(&self) -> bool {
        !self.is_stepping() && self.lock.is_locked()
    }

    /// Distance from the committed foothold to `point`, or `None` without a lock.
    pub fn drift_to(&self, point: &Vector3<f64>) -> Option<f64> {
        self.lock.position().map(|p| (p - point).norm())
    }

    /// Input seen this tick: restart idle bookkeeping.
    pub(crate) const fn note_movement(&mut self) {
        self.idle_timer = 0.0;
        self.has_rested = false;
    }

    pub(crate) fn note_idle(&mut self, dt: f64) {
        self.idle_timer += dt;
    }

    /// Begin a step from the current effector position to `target`.
    pub(crate) fn arm_step(&mut self, target: Vector3<f64>) {
        self.previous_lock = self.effector;
        self.lock = Lock::Locked(target);
        self.step_progress = 0.0;
        self.stance = StanceState::Stepping;
        self.has_rested = true;
    }

    /// Keep a planted limb exactly on its lock.
    pub(crate) fn pin(&mut self) {
        if let (StanceState::Planted, Lock::Locked(p)) = (self.stance, self.lock) {
            self.effector = p;
        }
    }
}
