//! Environment query contract.
//!
//! The controller never owns world geometry. Any collision backend that can
//! answer nearest-hit ray and segment queries implements [`EnvironmentQuery`]
//! and is handed to the controller at construction.

use std::sync::Arc;

use nalgebra::Vector3;
use scuttle_core::types::SurfaceMask;

/// Nearest intersection reported by a probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// World-space contact point.
    pub point: Vector3<f64>,
    /// Unit surface normal at `point`.
    pub normal: Vector3<f64>,
}

impl Hit {
    pub const fn new(point: Vector3<f64>, normal: Vector3<f64>) -> Self {
        Self { point, normal }
    }
}

/// Pure geometric queries against world geometry.
///
/// Implementations must not mutate world state and should answer in well
/// under a millisecond: the predictor may issue dozens of segment probes per
/// limb per tick. A `None` result means "nothing there", never an error.
pub trait EnvironmentQuery: Send + Sync {
    /// Nearest hit along `origin + direction * s` for `s` in `[0, max_length]`.
    ///
    /// `direction` need not be normalized; `max_length` is measured in units
    /// of distance along the normalized direction.
    fn probe_ray(
        &self,
        origin: &Vector3<f64>,
        direction: &Vector3<f64>,
        max_length: f64,
        mask: SurfaceMask,
    ) -> Option<Hit>;

    /// Nearest hit to `p0` on the segment `p0 → p1`.
    fn probe_segment(&self, p0: &Vector3<f64>, p1: &Vector3<f64>, mask: SurfaceMask)
    -> Option<Hit>;
}

impl<T: EnvironmentQuery + ?Sized> EnvironmentQuery for &T {
    fn probe_ray(
        &self,
        origin: &Vector3<f64>,
        direction: &Vector3<f64>,
        max_length: f64,
        mask: SurfaceMask,
    ) -> Option<Hit> {
        (**self).probe_ray(origin, direction, max_length, mask)
    }

    fn probe_segment(
        &self,
        p0: &Vector3<f64>,
        p1: &Vector3<f64>,
        mask: SurfaceMask,
    ) -> Option<Hit> {
        (**self).probe_segment(p0, p1, mask)
    }
}

impl<T: EnvironmentQuery + ?Sized> EnvironmentQuery for Box<T> {
    fn probe_ray(
        &self,
        origin: &Vector3<f64>,
        direction: &Vector3<f64>,
        max_length: f64,
        mask: SurfaceMask,
    ) -> Option<Hit> {
        (**self).probe_ray(origin, direction, max_length, mask)
    }

    fn probe_segment(
        &self,
        p0: &Vector3<f64>,
        p1: &Vector3<f64>,
        mask: SurfaceMask,
    ) -> Option<Hit> {
        (**self).probe_segment(p0, p1, mask)
    }
}

impl<T: EnvironmentQuery + ?Sized> EnvironmentQuery for Arc<T> {
    fn probe_ray(
        &self,
        origin: &Vector3<f64>,
        direction: &Vector3<f64>,
        max_length: f64,
        mask: SurfaceMask,
    ) -> Option<Hit> {
        (**self).probe_ray(origin, direction, max_length, mask)
    }

    fn probe_segment(
        &self,
        p0: &Vector3<f64>,
        p1: &Vector3<f64>,
        mask: SurfaceMask,
    ) -> Option<Hit> {
        (**self).probe_segment(p0, p1, mask)
    }
}

// ---------------------------------------------------------------------------
// OpenAir
// ---------------------------------------------------------------------------

/// Backend with no geometry: every probe misses.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAir;

impl EnvironmentQuery for OpenAir {
    fn probe_ray(
        &self,
        _origin: &Vector3<f64>,
        _direction: &Vector3<f64>,
        _max_length: f64,
        _mask: SurfaceMask,
    ) -> Option<Hit> {
        None
    }

    fn probe_segment(
        &self,
        _p0: &Vector3<f64>,
        _p1: &Vector3<f64>,
        _mask: SurfaceMask,
    ) -> Option<Hit> {
        None
    }
}
