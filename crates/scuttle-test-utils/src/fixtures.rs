//! Agent configurations and terrains shared across test suites.

use nalgebra::Vector3;
use scuttle_core::config::{LimbConfig, LocomotionConfig};
use scuttle_core::types::SurfaceMask;
use scuttle_gait::query::OpenAir;
use scuttle_terrain::{Shape, TerrainWorld};

/// Two limbs either side of the body, default tunables.
pub fn biped_config() -> LocomotionConfig {
    LocomotionConfig::default()
        .with_limb(LimbConfig::new("left", [-0.8, 0.0, 0.0]))
        .with_limb(LimbConfig::new("right", [0.8, 0.0, 0.0]))
}

/// Four limbs at the corners of the body, default tunables.
pub fn quadruped_config() -> LocomotionConfig {
    LocomotionConfig::default()
        .with_limb(LimbConfig::new("front_left", [-0.8, 0.0, 1.0]))
        .with_limb(LimbConfig::new("front_right", [0.8, 0.0, 1.0]))
        .with_limb(LimbConfig::new("rear_left", [-0.8, 0.0, -1.0]))
        .with_limb(LimbConfig::new("rear_right", [0.8, 0.0, -1.0]))
}

/// Infinite ground at `y = height`.
pub fn flat_ground(height: f64) -> TerrainWorld {
    TerrainWorld::flat(height)
}

/// A world with nothing to land on.
pub const fn open_air() -> OpenAir {
    OpenAir
}

/// Ground with a row of low boxes and a boulder, on separate layers.
///
/// Layer 0 is the ground, layer 1 the boxes, layer 2 the boulder.
pub fn stepped_course() -> TerrainWorld {
    let mut world = TerrainWorld::flat(0.0);
    for i in 0..5 {
        let z = 4.0 + f64::from(i) * 3.0;
        world.push(
            Shape::aabb(&Vector3::new(-3.0, 0.0, z), &Vector3::new(3.0, 0.4, z + 1.5)),
            SurfaceMask::layer(1),
        );
    }
    world.push(Shape::sphere(Vector3::new(6.0, -0.5, 10.0), 1.5), SurfaceMask::layer(2));
    world
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
