use std::fmt;

use nalgebra::{Unit, UnitQuaternion, Vector2, Vector3};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// LimbId
// ---------------------------------------------------------------------------

/// Index of a limb within its agent. Limbs never change index after setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LimbId(pub usize);

impl LimbId {
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for LimbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "limb#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Pose
// ---------------------------------------------------------------------------

/// Position + orientation in world space.
///
/// Axis convention: +Y up, +Z forward, +X right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vector3<f64>,
    pub orientation: UnitQuaternion<f64>,
}

impl Pose {
    pub fn identity() -> Self {
        Self {
            position: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
        }
    }

    pub fn from_position(position: Vector3<f64>) -> Self {
        Self {
            position,
            orientation: UnitQuaternion::identity(),
        }
    }

    #[must_use]
    pub fn with_orientation(mut self, orientation: UnitQuaternion<f64>) -> Self {
        self.orientation = orientation;
        self
    }

    /// Local +X in world space.
    pub fn right(&self) -> Vector3<f64> {
        self.orientation * Vector3::x()
    }

    /// Local +Y in world space.
    pub fn up(&self) -> Vector3<f64> {
        self.orientation * Vector3::y()
    }

    /// Local +Z in world space.
    pub fn forward(&self) -> Vector3<f64> {
        self.orientation * Vector3::z()
    }

    /// Map a body-local point into world space.
    pub fn transform_point(&self, local: &Vector3<f64>) -> Vector3<f64> {
        self.position + self.orientation * local
    }

    /// Rotate about the local up axis by `radians`.
    pub fn rotate_yaw(&mut self, radians: f64) {
        if radians == 0.0 {
            return;
        }
        let axis = Unit::new_normalize(self.up());
        self.orientation = UnitQuaternion::from_axis_angle(&axis, radians) * self.orientation;
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

// ---------------------------------------------------------------------------
// SurfaceMask
// ---------------------------------------------------------------------------

/// Bitmask of surface layers. A probe only reports surfaces whose layer bits
/// intersect the probe's mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceMask(pub u32);

impl SurfaceMask {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(u32::MAX);

    /// Mask with a single layer bit set.
    ///
    /// # Panics
    ///
    /// Panics if `layer >= 32`. Use [`SurfaceMask::checked_layer`] for
    /// layers read from user input.
    pub const fn layer(layer: u32) -> Self {
        match Self::checked_layer(layer) {
            Some(mask) => mask,
            None => panic!("surface layer must be below 32"),
        }
    }

    /// Mask with a single layer bit set, or `None` if `layer >= 32`.
    pub const fn checked_layer(layer: u32) -> Option<Self> {
        match 1u32.checked_shl(layer) {
            Some(bit) => Some(Self(bit)),
            None => None,
        }
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for SurfaceMask {
    fn default() -> Self {
        Self::ALL
    }
}

// ---------------------------------------------------------------------------
// TickInput
// ---------------------------------------------------------------------------

/// Input sampled once per tick from the host.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickInput {
    /// 2-D movement stick, relative to body facing.
    pub movement: Vector2<f64>,
    /// Yaw applied to the body this tick, radians (look input).
    pub yaw_delta: f64,
}

impl TickInput {
    pub const fn idle() -> Self {
        Self {
            movement: Vector2::new(0.0, 0.0),
            yaw_delta: 0.0,
        }
    }

    pub const fn moving(x: f64, y: f64) -> Self {
        Self {
            movement: Vector2::new(x, y),
            yaw_delta: 0.0,
        }
    }

    #[must_use]
    pub const fn with_yaw(mut self, yaw_delta: f64) -> Self {
        self.yaw_delta = yaw_delta;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn identity_basis() {
        let pose = Pose::identity();
        assert_relative_eq!(pose.right(), Vector3::x());
        assert_relative_eq!(pose.up(), Vector3::y());
        assert_relative_eq!(pose.forward(), Vector3::z());
    }

    #[test]
    fn transform_point_applies_rotation_then_translation() {
        let mut pose = Pose::from_position(Vector3::new(1.0, 2.0, 3.0));
        pose.rotate_yaw(FRAC_PI_2);
        let p = pose.transform_point(&Vector3::new(0.0, 0.0, 1.0));
        // Quarter turn about +Y takes +Z onto +X.
        assert_relative_eq!(p, Vector3::new(2.0, 2.0, 3.0), epsilon = 1e-12);
    }

    #[test]
    fn zero_yaw_is_noop() {
        let mut pose = Pose::identity();
        pose.rotate_yaw(0.0);
        assert_eq!(pose, Pose::identity());
    }

    #[test]
    fn surface_mask_ops() {
        let ground = SurfaceMask::layer(0);
        let wall = SurfaceMask::layer(3);
        assert!(!ground.intersects(wall));
        assert!(ground.union(wall).intersects(wall));
        assert!(SurfaceMask::ALL.intersects(ground));
        assert!(SurfaceMask::NONE.is_empty());
    }

    #[test]
    fn checked_layer_bounds() {
        assert_eq!(SurfaceMask::checked_layer(31), Some(SurfaceMask(1 << 31)));
        assert_eq!(SurfaceMask::checked_layer(32), None);
        assert_eq!(SurfaceMask::checked_layer(u32::MAX), None);
    }

    #[test]
    #[should_panic(expected = "surface layer must be below 32")]
    fn layer_out_of_range_panics() {
        let _ = SurfaceMask::layer(32);
    }

    #[test]
    fn limb_id_display() {
        assert_eq!(LimbId(2).to_string(), "limb#2");
    }
}
