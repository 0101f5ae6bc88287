//! Shared test fixtures and utilities for scuttle crates.
//!
//! Provides reusable agent configurations, terrains, Bevy test app builders,
//! probe-counting mocks and deterministic RNG setup.

pub mod app;
pub mod fixtures;
pub mod mocks;
pub mod rng;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use app::{gait_test_app, minimal_test_app, spawn_agent};
pub use fixtures::{biped_config, flat_ground, open_air, quadruped_config, stepped_course};
pub use mocks::CountingQuery;
pub use rng::{random_input_script, seeded_rng};
