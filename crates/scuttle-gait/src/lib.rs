//! Procedural multi-limb locomotion: no authored walk cycles, every footstep
//! is decided at runtime from movement input and surrounding geometry.
//!
//! Each fixed tick the pipeline is:
//!
//! 1. **Body Motion** — advance the root pose from input, measure rotation
//! 2. **Gait Scheduler** — pick at most one limb that may step ([`GaitPolicy`](scuttle_core::config::GaitPolicy))
//! 3. **Trajectory Predictor** — throw a ballistic arc from the limb's anchor to find its landing
//! 4. **Step Motion Profile** — carry the stepping foot along a half-sine arc to its new lock
//!
//! # Architecture
//!
//! Limbs are plain values owned by a [`LocomotionController`]. A single step
//! permit guarantees only one foot is ever in the air. World geometry is
//! reached only through the [`EnvironmentQuery`] trait, so any collision
//! backend can drive the controller. With the `bevy` feature,
//! `ScuttleGaitPlugin` runs a controller inside a Bevy app.

pub mod body;
pub mod controller;
pub mod limb;
#[cfg(feature = "bevy")]
pub mod plugin;
pub mod predictor;
pub mod query;
pub mod scheduler;
pub mod swing;

pub use body::{Body, BodyMotion};
pub use controller::{GaitStats, LocomotionController, TickReport};
pub use limb::{Limb, Lock, StanceState};
#[cfg(feature = "bevy")]
pub use plugin::{
    AgentController, LimbEffector, LocomotionAgent, LocomotionInput, ScuttleGaitPlugin,
    pose_from_transform, write_pose,
};
pub use predictor::{PredictedArc, TrajectoryPredictor};
pub use query::{EnvironmentQuery, Hit, OpenAir};
pub use scheduler::{ArmOutcome, ArmingRules, GaitScheduler, StepPermit, StepTrigger};
pub use swing::{StepProfile, arc_offset, step_position};
