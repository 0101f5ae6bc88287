//! Probe-counting wrapper around any environment backend.

use std::sync::atomic::{AtomicUsize, Ordering};

use nalgebra::Vector3;
use scuttle_core::types::SurfaceMask;
use scuttle_gait::query::{EnvironmentQuery, Hit};

/// Forwards every probe to `inner` and counts them.
#[derive(Debug, Default)]
pub struct CountingQuery<Q> {
    inner: Q,
    rays: AtomicUsize,
    segments: AtomicUsize,
}

impl<Q> CountingQuery<Q> {
    pub const fn new(inner: Q) -> Self {
        Self {
            inner,
            rays: AtomicUsize::new(0),
            segments: AtomicUsize::new(0),
        }
    }

    pub fn ray_probes(&self) -> usize {
        self.rays.load(Ordering::Relaxed)
    }

    pub fn segment_probes(&self) -> usize {
        self.segments.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.rays.store(0, Ordering::Relaxed);
        self.segments.store(0, Ordering::Relaxed);
    }

    pub const fn inner(&self) -> &Q {
        &self.inner
    }
}

impl<Q: EnvironmentQuery> EnvironmentQuery for CountingQuery<Q> {
    fn probe_ray(
        &self,
        origin: &Vector3<f64>,
        direction: &Vector3<f64>,
        max_length: f64,
        mask: SurfaceMask,
    ) -> Option<Hit> {
        self.rays.fetch_add(1, Ordering::Relaxed);
        self.inner.probe_ray(origin, direction, max_length, mask)
    }

    fn probe_segment(
        &self,
        p0: &Vector3<f64>,
        p1: &Vector3<f64>,
        mask: SurfaceMask,
    ) -> Option<Hit> {
        self.segments.fetch_add(1, Ordering::Relaxed);
        self.inner.probe_segment(p0, p1, mask)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
