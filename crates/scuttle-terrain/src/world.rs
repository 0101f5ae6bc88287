//! A static collection of layered surfaces answering nearest-hit probes.

use nalgebra::Vector3;
use scuttle_core::types::SurfaceMask;
use scuttle_gait::query::{EnvironmentQuery, Hit};

use crate::shape::Shape;

/// One solid in the world and the layer it belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub shape: Shape,
    pub layer: SurfaceMask,
}

impl Surface {
    pub const fn new(shape: Shape, layer: SurfaceMask) -> Self {
        Self { shape, layer }
    }
}

/// Analytic world geometry. Probes test every surface and keep the nearest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TerrainWorld {
    surfaces: Vec<Surface>,
}

impl TerrainWorld {
    pub const fn new() -> Self {
        Self {
            surfaces: Vec::new(),
        }
    }

    /// Infinite flat ground at `y = height` on layer 0.
    pub fn flat(height: f64) -> Self {
        Self::new().with_surface(Shape::ground(height), SurfaceMask::layer(0))
    }

    #[must_use]
    pub fn with_surface(mut self, shape: Shape, layer: SurfaceMask) -> Self {
        self.push(shape, layer);
        self
    }

    pub fn push(&mut self, shape: Shape, layer: SurfaceMask) {
        self.surfaces.push(Surface::new(shape, layer));
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Nearest entry along `origin + delta * t`, `t` in `[0, t_max]`.
    fn nearest(
        &self,
        origin: &Vector3<f64>,
        delta: &Vector3<f64>,
        t_max: f64,
        mask: SurfaceMask,
    ) -> Option<Hit> {
        self.surfaces
            .iter()
            .filter(|s| s.layer.intersects(mask))
            .filter_map(|s| s.shape.intersect(origin, delta, t_max))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(t, normal)| Hit::new(origin + delta * t, normal))
    }
}

impl EnvironmentQuery for TerrainWorld {
    fn probe_ray(
        &self,
        origin: &Vector3<f64>,
        direction: &Vector3<f64>,
        max_length: f64,
        mask: SurfaceMask,
    ) -> Option<Hit> {
        let direction = direction.try_normalize(f64::EPSILON)?;
        self.nearest(origin, &direction, max_length, mask)
    }

    fn probe_segment(
        &self,
        p0: &Vector3<f64>,
        p1: &Vector3<f64>,
        mask: SurfaceMask,
    ) -> Option<Hit> {
        self.nearest(p0, &(p1 - p0), 1.0, mask)
    }
}
