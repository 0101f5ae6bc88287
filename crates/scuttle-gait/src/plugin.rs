//! Bevy ECS bridge for the locomotion controller.
//!
//! Provides [`ScuttleGaitPlugin`] which, each fixed tick:
//!
//! 1. reads the agent's root [`Transform`] into the controller ([`ScuttleSet::Input`]),
//! 2. ticks the controller with [`LocomotionInput`] ([`ScuttleSet::Locomote`]),
//! 3. writes the body and effector [`Transform`]s back ([`ScuttleSet::Publish`]).
//!
//! Insert an [`AgentController`] after spawning the agent. Effector entities
//! carry [`LimbEffector`] and are positioned in world space, so they should
//! not be parented to the body.

use std::marker::PhantomData;

use bevy::prelude::*;
use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use scuttle_core::ScuttleSet;
use scuttle_core::error::SetupError;
use scuttle_core::types::{Pose, TickInput};
use tracing::{error, info};

use crate::controller::{LocomotionController, TickReport};
use crate::query::EnvironmentQuery;

// ---------------------------------------------------------------------------
// Components and resources
// ---------------------------------------------------------------------------

/// Marks the entity whose `Transform` is the agent's root pose.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct LocomotionAgent;

/// Marks the entity that follows limb `index`'s effector.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimbEffector(pub usize);

/// Movement input written by the host.
///
/// `movement` persists until the host changes it. `yaw_delta` (radians) is
/// consumed by the next fixed tick.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct LocomotionInput {
    pub movement: Vec2,
    pub yaw_delta: f32,
}

impl LocomotionInput {
    fn take_tick_input(&mut self) -> TickInput {
        let input = TickInput::moving(f64::from(self.movement.x), f64::from(self.movement.y))
            .with_yaw(f64::from(self.yaw_delta));
        self.yaw_delta = 0.0;
        input
    }
}

/// The agent's controller plus plugin bookkeeping.
#[derive(Resource, Debug)]
pub struct AgentController<Q: EnvironmentQuery + 'static> {
    pub controller: LocomotionController<Q>,
    /// Set when scene validation failed; the agent is then never ticked.
    inert: bool,
    last_report: Option<TickReport>,
}

impl<Q: EnvironmentQuery + 'static> AgentController<Q> {
    pub const fn new(controller: LocomotionController<Q>) -> Self {
        Self {
            controller,
            inert: false,
            last_report: None,
        }
    }

    pub const fn is_inert(&self) -> bool {
        self.inert
    }

    /// Report from the most recent fixed tick.
    pub const fn last_report(&self) -> Option<&TickReport> {
        self.last_report.as_ref()
    }
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// Runs one [`LocomotionController`] per app inside `FixedUpdate`.
///
/// Requires [`ScuttleCorePlugin`](scuttle_core::ScuttleCorePlugin) for set
/// ordering.
pub struct ScuttleGaitPlugin<Q>(PhantomData<fn() -> Q>);

impl<Q> Default for ScuttleGaitPlugin<Q> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<Q: EnvironmentQuery + 'static> Plugin for ScuttleGaitPlugin<Q> {
    fn build(&self, app: &mut App) {
        app.init_resource::<LocomotionInput>()
            .init_resource::<Time<Fixed>>()
            .add_systems(PostStartup, validate_scene_system::<Q>)
            .add_systems(
                FixedUpdate,
                (
                    read_root_system::<Q>.in_set(ScuttleSet::Input),
                    locomote_system::<Q>.in_set(ScuttleSet::Locomote),
                    publish_system::<Q>.in_set(ScuttleSet::Publish),
                ),
            );
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn vec3_from_bevy(v: Vec3) -> Vector3<f64> {
    Vector3::new(f64::from(v.x), f64::from(v.y), f64::from(v.z))
}

#[allow(clippy::cast_possible_truncation)]
pub fn vec3_to_bevy(v: &Vector3<f64>) -> Vec3 {
    Vec3::new(v.x as f32, v.y as f32, v.z as f32)
}

/// Root pose from a Bevy transform (scale ignored).
pub fn pose_from_transform(transform: &Transform) -> Pose {
    let q = transform.rotation;
    let orientation = UnitQuaternion::new_normalize(Quaternion::new(
        f64::from(q.w),
        f64::from(q.x),
        f64::from(q.y),
        f64::from(q.z),
    ));
    Pose::from_position(vec3_from_bevy(transform.translation)).with_orientation(orientation)
}

/// Copy a pose into an existing transform, keeping its scale.
#[allow(clippy::cast_possible_truncation)]
pub fn write_pose(pose: &Pose, transform: &mut Transform) {
    let q = pose.orientation.quaternion();
    transform.translation = vec3_to_bevy(&pose.position);
    transform.rotation = Quat::from_xyzw(q.i as f32, q.j as f32, q.k as f32, q.w as f32);
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Check once that the scene matches the controller's limbs.
///
/// Any mismatch is logged and leaves the agent inert for the rest of the run.
#[allow(clippy::needless_pass_by_value)]
fn validate_scene_system<Q: EnvironmentQuery + 'static>(
    agent: Option<ResMut<AgentController<Q>>>,
    agents: Query<(), With<LocomotionAgent>>,
    effectors: Query<&LimbEffector>,
) {
    let Some(mut agent) = agent else {
        return;
    };
    let indices: Vec<usize> = effectors.iter().map(|e| e.0).collect();
    let limbs = agent.controller.limbs();
    let count = limbs.len();

    let problem = if agents.is_empty() {
        Some(SetupError::AgentNotFound)
    } else if let Some(&index) = indices.iter().find(|&&i| i >= count) {
        Some(SetupError::LimbOutOfRange { index, count })
    } else {
        limbs
            .iter()
            .find(|l| !indices.contains(&l.id().index()))
            .map(|l| SetupError::EffectorNotFound(l.name().to_owned()))
    };

    if let Some(err) = problem {
        error!("Locomotion agent disabled: {err}");
        agent.inert = true;
    } else {
        info!(limbs = count, "Locomotion agent wired to scene");
    }
}

#[allow(clippy::needless_pass_by_value)]
fn read_root_system<Q: EnvironmentQuery + 'static>(
    agent: Option<ResMut<AgentController<Q>>>,
    bodies: Query<&Transform, With<LocomotionAgent>>,
) {
    let Some(mut agent) = agent else {
        return;
    };
    if agent.inert {
        return;
    }
    if let Ok(transform) = bodies.get_single() {
        agent.controller.set_root_pose(pose_from_transform(transform));
    }
}

#[allow(clippy::needless_pass_by_value)]
fn locomote_system<Q: EnvironmentQuery + 'static>(
    agent: Option<ResMut<AgentController<Q>>>,
    mut input: ResMut<LocomotionInput>,
    time: Res<Time<Fixed>>,
) {
    let Some(mut agent) = agent else {
        return;
    };
    if agent.inert {
        return;
    }
    let tick_input = input.take_tick_input();
    let report = agent
        .controller
        .tick(&tick_input, time.timestep().as_secs_f64());
    agent.last_report = Some(report);
}

#[allow(clippy::needless_pass_by_value)]
fn publish_system<Q: EnvironmentQuery + 'static>(
    agent: Option<Res<AgentController<Q>>>,
    mut bodies: Query<&mut Transform, (With<LocomotionAgent>, Without<LimbEffector>)>,
    mut effectors: Query<(&LimbEffector, &mut Transform), Without<LocomotionAgent>>,
) {
    let Some(agent) = agent else {
        return;
    };
    if agent.inert {
        return;
    }
    if let Ok(mut transform) = bodies.get_single_mut() {
        write_pose(agent.controller.root(), &mut transform);
    }
    for (effector, mut transform) in &mut effectors {
        if let Some(limb) = agent.controller.limbs().get(effector.0) {
            transform.translation = vec3_to_bevy(limb.effector());
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
