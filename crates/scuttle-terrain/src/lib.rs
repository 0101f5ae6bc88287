//! Analytic environment backend for scuttle locomotion.
//!
//! [`TerrainWorld`] answers the gait crate's [`EnvironmentQuery`] probes
//! against planes, boxes and spheres sorted into surface layers. It needs no
//! physics engine, which makes it suitable for headless runs and tests.
//!
//! [`EnvironmentQuery`]: scuttle_gait::query::EnvironmentQuery

pub mod config;
pub mod shape;
pub mod world;

pub use config::{ShapeConfig, SurfaceConfig, TerrainConfig};
pub use shape::Shape;
pub use world::{Surface, TerrainWorld};
