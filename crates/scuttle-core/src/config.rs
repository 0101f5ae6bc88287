use std::collections::HashSet;

use bevy::prelude::Resource;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::SurfaceMask;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_move_speed() -> f64 {
    5.0
}
const fn default_step_speed() -> f64 {
    5.0
}
const fn default_leg_distance() -> f64 {
    2.0
}
const fn default_step_height() -> f64 {
    0.5
}
const fn default_idle_timeout() -> f64 {
    0.3
}
const fn default_near_rest_threshold() -> f64 {
    0.05
}
const fn default_rotation_threshold_deg() -> f64 {
    1.0
}
const fn default_input_threshold() -> f64 {
    0.001
}
const fn default_initial_probe_length() -> f64 {
    1000.0
}
const fn default_launch_speed() -> f64 {
    2.0
}
const fn default_gravity() -> f64 {
    9.8
}
const fn default_sample_count() -> u32 {
    25
}
const fn default_sample_interval() -> f64 {
    0.1
}

// ---------------------------------------------------------------------------
// GaitPolicy
// ---------------------------------------------------------------------------

/// Rule for picking which limb may attempt a step this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GaitPolicy {
    /// One rotating index; advances when its limb finishes a step.
    #[default]
    RoundRobin,
    /// The limb whose predicted landing is farthest from its foot goes next.
    FarthestFirst,
}

// ---------------------------------------------------------------------------
// PredictorConfig
// ---------------------------------------------------------------------------

/// Ballistic arc used to look for the next foothold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Launch speed along the movement direction (units/s).
    #[serde(default = "default_launch_speed")]
    pub launch_speed: f64,
    /// Downward acceleration (units/s^2).
    #[serde(default = "default_gravity")]
    pub gravity: f64,
    /// Number of arc segments probed.
    #[serde(default = "default_sample_count")]
    pub sample_count: u32,
    /// Simulated seconds between samples.
    #[serde(default = "default_sample_interval")]
    pub sample_interval: f64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            launch_speed: default_launch_speed(),
            gravity: default_gravity(),
            sample_count: default_sample_count(),
            sample_interval: default_sample_interval(),
        }
    }
}

impl PredictorConfig {
    /// Total simulated flight time in seconds.
    pub fn horizon(&self) -> f64 {
        f64::from(self.sample_count) * self.sample_interval
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("predictor.launch_speed", self.launch_speed)?;
        require_positive("predictor.gravity", self.gravity)?;
        require_positive("predictor.sample_interval", self.sample_interval)?;
        if self.sample_count == 0 {
            return Err(ConfigError::invalid("predictor.sample_count", "must be > 0"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// LimbConfig
// ---------------------------------------------------------------------------

/// Static description of one limb.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimbConfig {
    pub name: String,
    /// Anchor position relative to the body root, in body space.
    pub anchor_offset: [f64; 3],
    /// Surface layers this limb may land on.
    #[serde(default)]
    pub surface_mask: SurfaceMask,
}

impl LimbConfig {
    pub fn new(name: impl Into<String>, anchor_offset: [f64; 3]) -> Self {
        Self {
            name: name.into(),
            anchor_offset,
            surface_mask: SurfaceMask::ALL,
        }
    }

    #[must_use]
    pub const fn with_surface_mask(mut self, mask: SurfaceMask) -> Self {
        self.surface_mask = mask;
        self
    }

    pub fn anchor_offset(&self) -> Vector3<f64> {
        Vector3::from(self.anchor_offset)
    }
}

// ---------------------------------------------------------------------------
// LocomotionConfig
// ---------------------------------------------------------------------------

/// Per-agent locomotion tunables. Static for the agent's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Resource)]
pub struct LocomotionConfig {
    /// Body translation speed at full input (units/s).
    #[serde(default = "default_move_speed")]
    pub move_speed: f64,

    /// Step progress gained per second (1 / step duration).
    #[serde(default = "default_step_speed")]
    pub step_speed: f64,

    /// Drift between lock and predicted landing that forces a step.
    #[serde(default = "default_leg_distance")]
    pub leg_distance: f64,

    /// Peak lift of the effector at mid-step.
    #[serde(default = "default_step_height")]
    pub step_height: f64,

    /// Seconds without input before an idle re-plant may fire.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: f64,

    /// Idle re-plant is skipped when drift is at or below this distance.
    #[serde(default = "default_near_rest_threshold")]
    pub near_rest_threshold: f64,

    /// Body rotation per tick (degrees) that forces a step.
    #[serde(default = "default_rotation_threshold_deg")]
    pub rotation_threshold_deg: f64,

    /// Input magnitude above which the agent counts as moving.
    #[serde(default = "default_input_threshold")]
    pub input_threshold: f64,

    /// Max length of the straight-down probe used to seed footholds.
    #[serde(default = "default_initial_probe_length")]
    pub initial_probe_length: f64,

    #[serde(default)]
    pub gait_policy: GaitPolicy,

    #[serde(default)]
    pub predictor: PredictorConfig,

    #[serde(default)]
    pub limbs: Vec<LimbConfig>,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            move_speed: default_move_speed(),
            step_speed: default_step_speed(),
            leg_distance: default_leg_distance(),
            step_height: default_step_height(),
            idle_timeout_secs: default_idle_timeout(),
            near_rest_threshold: default_near_rest_threshold(),
            rotation_threshold_deg: default_rotation_threshold_deg(),
            input_threshold: default_input_threshold(),
            initial_probe_length: default_initial_probe_length(),
            gait_policy: GaitPolicy::default(),
            predictor: PredictorConfig::default(),
            limbs: Vec::new(),
        }
    }
}

impl LocomotionConfig {
    #[must_use]
    pub fn with_limb(mut self, limb: LimbConfig) -> Self {
        self.limbs.push(limb);
        self
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: GaitPolicy) -> Self {
        self.gait_policy = policy;
        self
    }

    /// Validate configuration. Returns Err on the first invalid value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_negative("move_speed", self.move_speed)?;
        require_positive("step_speed", self.step_speed)?;
        require_non_negative("leg_distance", self.leg_distance)?;
        require_non_negative("step_height", self.step_height)?;
        require_non_negative("idle_timeout_secs", self.idle_timeout_secs)?;
        require_non_negative("near_rest_threshold", self.near_rest_threshold)?;
        require_non_negative("rotation_threshold_deg", self.rotation_threshold_deg)?;
        require_non_negative("input_threshold", self.input_threshold)?;
        require_positive("initial_probe_length", self.initial_probe_length)?;
        self.predictor.validate()?;

        if self.limbs.is_empty() {
            return Err(ConfigError::NoLimbs);
        }
        let mut seen = HashSet::with_capacity(self.limbs.len());
        for limb in &self.limbs {
            if limb.name.is_empty() {
                return Err(ConfigError::MissingField("limbs[].name".into()));
            }
            if !seen.insert(limb.name.as_str()) {
                return Err(ConfigError::DuplicateLimb(limb.name.clone()));
            }
            if limb.anchor_offset.iter().any(|c| !c.is_finite()) {
                return Err(ConfigError::invalid(
                    format!("limbs.{}.anchor_offset", limb.name),
                    "must be finite",
                ));
            }
            if limb.surface_mask.is_empty() {
                return Err(ConfigError::invalid(
                    format!("limbs.{}.surface_mask", limb.name),
                    "must select at least one layer",
                ));
            }
        }
        Ok(())
    }

    /// Rotation threshold in radians.
    pub fn rotation_threshold_rad(&self) -> f64 {
        self.rotation_threshold_deg.to_radians()
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

fn require_positive(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} (must be > 0)")))
    }
}

fn require_non_negative(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} (must be >= 0)")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
