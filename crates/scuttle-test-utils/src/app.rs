//! Bevy test app builders and entity spawn helpers.

use bevy::prelude::*;
use scuttle_gait::plugin::{LimbEffector, LocomotionAgent, ScuttleGaitPlugin};
use scuttle_gait::query::EnvironmentQuery;

/// Create a minimal test app with only the core plugin.
///
/// Provides `ScuttleSet` ordering in `FixedUpdate` and nothing else.
pub fn minimal_test_app() -> App {
    let mut app = App::new();
    app.add_plugins(scuttle_core::ScuttleCorePlugin);
    app.finish();
    app.cleanup();
    app
}

/// Core plus the gait plugin for backend `Q`.
///
/// Insert an `AgentController<Q>` and spawn the agent before the first
/// `update()`; drive ticks with `world_mut().run_schedule(FixedUpdate)`.
pub fn gait_test_app<Q: EnvironmentQuery + 'static>() -> App {
    let mut app = App::new();
    app.add_plugins(scuttle_core::ScuttleCorePlugin);
    app.add_plugins(ScuttleGaitPlugin::<Q>::default());
    app.finish();
    app.cleanup();
    app
}

/// Spawn an agent body at `translation` and one effector entity per limb.
///
/// Returns the body entity and the effector entities in limb order.
pub fn spawn_agent(world: &mut World, translation: Vec3, n_limbs: usize) -> (Entity, Vec<Entity>) {
    let body = world
        .spawn((LocomotionAgent, Transform::from_translation(translation)))
        .id();
    let effectors = (0..n_limbs)
        .map(|i| world.spawn((LimbEffector(i), Transform::default())).id())
        .collect();
    (body, effectors)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
