// scuttle-core: Config, errors, shared types and system ordering for scuttle locomotion.

pub mod config;
pub mod error;
pub mod time;
pub mod types;

use bevy::prelude::*;

// ---------------------------------------------------------------------------
// ScuttleSet
// ---------------------------------------------------------------------------

/// System ordering for one locomotion tick inside `FixedUpdate`.
///
/// `Input` systems sample the host's movement/look input, `Locomote` runs the
/// controller, `Publish` writes the resulting poses back to the scene.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScuttleSet {
    Input,
    Locomote,
    Publish,
}

/// Registers [`ScuttleSet`] ordering. Every other scuttle plugin expects it.
pub struct ScuttleCorePlugin;

impl Plugin for ScuttleCorePlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            FixedUpdate,
            (ScuttleSet::Input, ScuttleSet::Locomote, ScuttleSet::Publish).chain(),
        );
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        ScuttleCorePlugin, ScuttleSet,
        config::{GaitPolicy, LimbConfig, LocomotionConfig, PredictorConfig},
        error::{ConfigError, ScuttleError, SetupError},
        time::SimTime,
        types::{LimbId, Pose, SurfaceMask, TickInput},
    };
}
