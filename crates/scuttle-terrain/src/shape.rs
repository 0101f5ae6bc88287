//! Analytic primitives and their parametric intersection tests.
//!
//! Every test answers the same question: for `p(t) = origin + delta * t`
//! with `t` in `[0, t_max]`, where does the path first enter the shape?
//! Paths that start inside a solid report nothing.

use nalgebra::Vector3;

/// Direction components below this are treated as parallel to a slab.
const PARALLEL_EPSILON: f64 = 1e-12;

/// Solid geometry the terrain is built from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Half-space `normal · p <= offset`; only the front face is solid ground.
    Plane { normal: Vector3<f64>, offset: f64 },
    Aabb { min: Vector3<f64>, max: Vector3<f64> },
    Sphere { center: Vector3<f64>, radius: f64 },
}

impl Shape {
    /// Horizontal ground at `y = height`.
    pub fn ground(height: f64) -> Self {
        Self::Plane {
            normal: Vector3::y(),
            offset: height,
        }
    }

    /// Plane through `point` facing `normal`. `None` for a zero normal.
    pub fn plane(point: &Vector3<f64>, normal: &Vector3<f64>) -> Option<Self> {
        let normal = normal.try_normalize(PARALLEL_EPSILON)?;
        Some(Self::Plane {
            normal,
            offset: normal.dot(point),
        })
    }

    /// Box from two opposite corners, in any order.
    pub fn aabb(a: &Vector3<f64>, b: &Vector3<f64>) -> Self {
        Self::Aabb {
            min: a.inf(b),
            max: a.sup(b),
        }
    }

    pub const fn sphere(center: Vector3<f64>, radius: f64) -> Self {
        Self::Sphere { center, radius }
    }

    /// Entry parameter and outward unit normal of the first crossing.
    pub fn intersect(
        &self,
        origin: &Vector3<f64>,
        delta: &Vector3<f64>,
        t_max: f64,
    ) -> Option<(f64, Vector3<f64>)> {
        let (t, normal) = match self {
            Self::Plane { normal, offset } => plane_entry(normal, *offset, origin, delta)?,
            Self::Aabb { min, max } => aabb_entry(min, max, origin, delta)?,
            Self::Sphere { center, radius } => sphere_entry(center, *radius, origin, delta)?,
        };
        (0.0..=t_max).contains(&t).then_some((t, normal))
    }
}

fn plane_entry(
    normal: &Vector3<f64>,
    offset: f64,
    origin: &Vector3<f64>,
    delta: &Vector3<f64>,
) -> Option<(f64, Vector3<f64>)> {
    let height = normal.dot(origin) - offset;
    let approach = normal.dot(delta);
    if height < 0.0 || approach >= -PARALLEL_EPSILON {
        return None;
    }
    Some((-height / approach, *normal))
}

/// Slab test: intersect the per-axis entry/exit intervals.
fn aabb_entry(
    min: &Vector3<f64>,
    max: &Vector3<f64>,
    origin: &Vector3<f64>,
    delta: &Vector3<f64>,
) -> Option<(f64, Vector3<f64>)> {
    let mut t_enter = f64::NEG_INFINITY;
    let mut t_exit = f64::INFINITY;
    let mut normal = Vector3::zeros();

    for axis in 0..3 {
        let (o, d) = (origin[axis], delta[axis]);
        if d.abs() < PARALLEL_EPSILON {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let mut near = (min[axis] - o) * inv;
        let mut far = (max[axis] - o) * inv;
        let mut face = -1.0;
        if near > far {
            std::mem::swap(&mut near, &mut far);
            face = 1.0;
        }
        if near > t_enter {
            t_enter = near;
            normal = Vector3::zeros();
            normal[axis] = face;
        }
        t_exit = t_exit.min(far);
        if t_enter > t_exit {
            return None;
        }
    }

    // Still -inf when the path is a point; negative when it starts inside.
    (t_enter >= 0.0).then_some((t_enter, normal))
}

fn sphere_entry(
    center: &Vector3<f64>,
    radius: f64,
    origin: &Vector3<f64>,
    delta: &Vector3<f64>,
) -> Option<(f64, Vector3<f64>)> {
    let oc = origin - center;
    let a = delta.norm_squared();
    let half_b = oc.dot(delta);
    let c = oc.norm_squared() - radius * radius;
    if a < PARALLEL_EPSILON || c < 0.0 {
        return None;
    }
    let disc = half_b * half_b - a * c;
    if disc < 0.0 {
        return None;
    }
    let t = (-half_b - disc.sqrt()) / a;
    let point = origin + delta * t;
    Some((t, (point - center) / radius))
}
