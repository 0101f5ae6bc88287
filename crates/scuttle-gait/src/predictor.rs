//! Foothold prediction by ballistic arc sampling.
//!
//! A limb "throws" its foot from the anchor along the movement direction and
//! lets it fall under gravity. The arc
//!
//! ```text
//! p(t) = anchor + dir * v * t + 0.5 * g * t^2      (g points along world -Y)
//! ```
//!
//! is sampled at a fixed number of evenly spaced times; each consecutive pair
//! of samples is probed as a segment, near to far, and the first hit is the
//! predicted landing. The search is bounded and deterministic: the same
//! anchor, direction and geometry always give the same answer.

use nalgebra::Vector3;
use scuttle_core::config::PredictorConfig;
use scuttle_core::types::SurfaceMask;

use crate::query::{EnvironmentQuery, Hit};

/// Movement magnitude below which the arc is launched along the body's down axis.
pub const STATIONARY_DIRECTION_EPSILON: f64 = 0.01;

/// Sampled arc plus the index of the segment that hit, for debug drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictedArc {
    /// `sample_count + 1` points, starting at the anchor.
    pub samples: Vec<Vector3<f64>>,
    /// Segment `samples[i] → samples[i + 1]` that produced the hit.
    pub hit_segment: Option<usize>,
    pub hit: Option<Hit>,
}

/// Bounded ballistic-arc foothold predictor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrajectoryPredictor {
    config: PredictorConfig,
}

impl TrajectoryPredictor {
    pub const fn new(config: PredictorConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &PredictorConfig {
        &self.config
    }

    /// Unit launch direction: the normalized movement direction, or
    /// `body_down` when the agent is (nearly) stationary.
    pub fn launch_direction(movement: &Vector3<f64>, body_down: &Vector3<f64>) -> Vector3<f64> {
        if movement.norm() < STATIONARY_DIRECTION_EPSILON {
            body_down.try_normalize(f64::EPSILON).unwrap_or_else(|| -Vector3::y())
        } else {
            movement.normalize()
        }
    }

    /// Arc position `t` seconds after launch.
    pub fn sample(&self, anchor: &Vector3<f64>, direction: &Vector3<f64>, t: f64) -> Vector3<f64> {
        let gravity = Vector3::new(0.0, -self.config.gravity, 0.0);
        anchor + direction * (self.config.launch_speed * t) + gravity * (0.5 * t * t)
    }

    /// First surface the limb would land on if it stepped now.
    ///
    /// `movement` is the world-space direction the body is travelling in;
    /// `body_down` is the body's local -Y in world space.
    pub fn predict(
        &self,
        env: &impl EnvironmentQuery,
        anchor: &Vector3<f64>,
        movement: &Vector3<f64>,
        body_down: &Vector3<f64>,
        mask: SurfaceMask,
    ) -> Option<Hit> {
        let direction = Self::launch_direction(movement, body_down);
        let mut prev = *anchor;
        for i in 1..=self.config.sample_count {
            let next = self.sample(anchor, &direction, f64::from(i) * self.config.sample_interval);
            if let Some(hit) = env.probe_segment(&prev, &next, mask) {
                return Some(hit);
            }
            prev = next;
        }
        None
    }

    /// Same search as [`predict`](Self::predict), keeping every sample.
    ///
    /// Samples past the hitting segment are still computed so the whole arc
    /// can be drawn.
    pub fn trace(
        &self,
        env: &impl EnvironmentQuery,
        anchor: &Vector3<f64>,
        movement: &Vector3<f64>,
        body_down: &Vector3<f64>,
        mask: SurfaceMask,
    ) -> PredictedArc {
        let direction = Self::launch_direction(movement, body_down);
        let n = self.config.sample_count as usize;
        let mut samples = Vec::with_capacity(n + 1);
        samples.push(*anchor);
        let mut hit = None;
        let mut hit_segment = None;
        for i in 1..=self.config.sample_count {
            let next = self.sample(anchor, &direction, f64::from(i) * self.config.sample_interval);
            if hit.is_none() {
                let prev = samples[samples.len() - 1];
                if let Some(h) = env.probe_segment(&prev, &next, mask) {
                    hit = Some(h);
                    hit_segment = Some(samples.len() - 1);
                }
            }
            samples.push(next);
        }
        PredictedArc {
            samples,
            hit_segment,
            hit,
        }
    }
}
