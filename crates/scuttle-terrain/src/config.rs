//! TOML description of a terrain.
//!
//! ```toml
//! [[surfaces]]
//! layer = 0
//! shape = { type = "plane", point = [0.0, 0.0, 0.0], normal = [0.0, 1.0, 0.0] }
//!
//! [[surfaces]]
//! layer = 1
//! shape = { type = "box", min = [2.0, 0.0, -1.0], max = [4.0, 0.5, 1.0] }
//! ```

use nalgebra::Vector3;
use scuttle_core::error::ConfigError;
use scuttle_core::types::SurfaceMask;
use serde::{Deserialize, Serialize};

use crate::shape::Shape;
use crate::world::TerrainWorld;

/// Number of distinct surface layers a [`SurfaceMask`] can address.
pub const MAX_LAYERS: u32 = u32::BITS;

const fn default_up() -> [f64; 3] {
    [0.0, 1.0, 0.0]
}

/// Serialized form of a [`Shape`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeConfig {
    Plane {
        #[serde(default)]
        point: [f64; 3],
        #[serde(default = "default_up")]
        normal: [f64; 3],
    },
    Box {
        min: [f64; 3],
        max: [f64; 3],
    },
    Sphere {
        center: [f64; 3],
        radius: f64,
    },
}

impl ShapeConfig {
    fn build(&self, field: &str) -> Result<Shape, ConfigError> {
        match *self {
            Self::Plane { point, normal } => {
                require_finite(field, &point)?;
                require_finite(field, &normal)?;
                Shape::plane(&Vector3::from(point), &Vector3::from(normal))
                    .ok_or_else(|| ConfigError::invalid(field, "plane normal must be non-zero"))
            }
            Self::Box { min, max } => {
                require_finite(field, &min)?;
                require_finite(field, &max)?;
                Ok(Shape::aabb(&Vector3::from(min), &Vector3::from(max)))
            }
            Self::Sphere { center, radius } => {
                require_finite(field, &center)?;
                if !(radius.is_finite() && radius > 0.0) {
                    return Err(ConfigError::invalid(field, "sphere radius must be positive"));
                }
                Ok(Shape::sphere(Vector3::from(center), radius))
            }
        }
    }
}

/// One `[[surfaces]]` entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// Layer index, `0..32`.
    #[serde(default)]
    pub layer: u32,
    pub shape: ShapeConfig,
}

/// Whole terrain file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TerrainConfig {
    #[serde(default)]
    pub surfaces: Vec<SurfaceConfig>,
}

impl TerrainConfig {
    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.build().map(|_| ())
    }

    /// Build the queryable world.
    pub fn build(&self) -> Result<TerrainWorld, ConfigError> {
        let mut world = TerrainWorld::new();
        for (i, surface) in self.surfaces.iter().enumerate() {
            let field = format!("surfaces[{i}]");
            let layer = SurfaceMask::checked_layer(surface.layer).ok_or_else(|| {
                ConfigError::invalid(format!("{field}.layer"), format!("must be below {MAX_LAYERS}"))
            })?;
            let shape = surface.shape.build(&field)?;
            world.push(shape, layer);
        }
        Ok(world)
    }
}

fn require_finite(field: &str, v: &[f64; 3]) -> Result<(), ConfigError> {
    if v.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, "coordinates must be finite"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use scuttle_gait::query::EnvironmentQuery;

    const COURSE: &str = r#"
[[surfaces]]
shape = { type = "plane" }

[[surfaces]]
layer = 1
shape = { type = "box", min = [2.0, 0.0, -1.0], max = [4.0, 0.5, 1.0] }

[[surfaces]]
layer = 2
shape = { type = "sphere", center = [0.0, -1.0, 8.0], radius = 1.5 }
"#;

    #[test]
    fn parses_all_shapes() {
        let config = TerrainConfig::from_toml_str(COURSE).unwrap();
        assert_eq!(config.surfaces.len(), 3);
        assert_eq!(config.surfaces[0].layer, 0);
        assert!(matches!(
            config.surfaces[0].shape,
            ShapeConfig::Plane { normal, .. } if normal == [0.0, 1.0, 0.0]
        ));
        assert!(matches!(config.surfaces[2].shape, ShapeConfig::Sphere { .. }));
    }

    #[test]
    fn built_world_answers_probes() {
        let world = TerrainConfig::from_toml_str(COURSE).unwrap().build().unwrap();
        assert_eq!(world.len(), 3);
        let hit = world
            .probe_ray(&Vector3::new(3.0, 5.0, 0.0), &-Vector3::y(), 100.0, SurfaceMask::ALL)
            .unwrap();
        assert_relative_eq!(hit.point.y, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn empty_document_is_empty_world() {
        let config = TerrainConfig::from_toml_str("").unwrap();
        assert!(config.build().unwrap().is_empty());
    }

    #[test]
    fn rejects_layer_out_of_range() {
        let err = TerrainConfig::from_toml_str(
            "[[surfaces]]\nlayer = 32\nshape = { type = \"plane\" }\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("surfaces[0].layer"));
    }

    #[test]
    fn rejects_zero_normal() {
        let err = TerrainConfig::from_toml_str(
            "[[surfaces]]\nshape = { type = \"plane\", normal = [0.0, 0.0, 0.0] }\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn rejects_non_positive_radius() {
        let config = TerrainConfig {
            surfaces: vec![SurfaceConfig {
                layer: 0,
                shape: ShapeConfig::Sphere {
                    center: [0.0; 3],
                    radius: 0.0,
                },
            }],
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_unknown_shape() {
        let err = TerrainConfig::from_toml_str("[[surfaces]]\nshape = { type = \"torus\" }\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn toml_round_trip() {
        let config = TerrainConfig::from_toml_str(COURSE).unwrap();
        let text = toml::to_string(&config).unwrap();
        assert_eq!(TerrainConfig::from_toml_str(&text).unwrap(), config);
    }
}
