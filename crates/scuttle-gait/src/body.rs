//! Root motion of the agent, independent of limb state.

use nalgebra::{UnitQuaternion, Vector2, Vector3};
use scuttle_core::types::{Pose, TickInput};

/// What body motion produced this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyMotion {
    /// World-space translation applied to the root.
    pub displacement: Vector3<f64>,
    /// World-space direction of travel (unscaled, may be zero).
    pub direction: Vector3<f64>,
    /// Input magnitude exceeded the movement threshold.
    pub moving: bool,
    /// Angle between the orientation recorded at the end of the previous
    /// tick and the orientation after this tick's motion, radians.
    pub rotation_delta: f64,
}

/// Agent root pose plus the orientation the rotation trigger compares against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    root: Pose,
    previous_orientation: UnitQuaternion<f64>,
}

impl Body {
    pub const fn new(root: Pose) -> Self {
        Self {
            root,
            previous_orientation: root.orientation,
        }
    }

    pub const fn root(&self) -> &Pose {
        &self.root
    }

    pub const fn previous_orientation(&self) -> &UnitQuaternion<f64> {
        &self.previous_orientation
    }

    /// Body-local down in world space.
    pub fn down(&self) -> Vector3<f64> {
        -self.root.up()
    }

    /// World-space travel direction for a movement stick value.
    ///
    /// Stick +X moves toward body -X, stick +Y toward body -Z.
    pub fn travel_direction(&self, stick: &Vector2<f64>) -> Vector3<f64> {
        self.root.right() * -stick.x + self.root.forward() * -stick.y
    }

    /// Overwrite the root pose from the scene (host-driven look or physics).
    ///
    /// The rotation trigger still measures against the orientation recorded
    /// at the end of the previous tick.
    pub const fn set_root(&mut self, root: Pose) {
        self.root = root;
    }

    /// Teleport without registering a rotation on the next tick.
    pub const fn reset(&mut self, root: Pose) {
        self.root = root;
        self.previous_orientation = root.orientation;
    }

    /// Apply one tick of input.
    pub fn advance(
        &mut self,
        input: &TickInput,
        move_speed: f64,
        input_threshold: f64,
        dt: f64,
    ) -> BodyMotion {
        self.root.rotate_yaw(input.yaw_delta);

        let direction = self.travel_direction(&input.movement);
        let displacement = direction * (move_speed * dt);
        self.root.position += displacement;

        BodyMotion {
            displacement,
            direction,
            moving: input.movement.norm() > input_threshold,
            rotation_delta: self.previous_orientation.angle_to(&self.root.orientation),
        }
    }

    /// Record the end-of-tick orientation for the next rotation check.
    pub const fn settle(&mut self) {
        self.previous_orientation = self.root.orientation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn input_moves_against_stick() {
        let mut body = Body::new(Pose::identity());
        let motion = body.advance(&TickInput::moving(0.0, 1.0), 5.0, 0.001, 0.1);
        assert_relative_eq!(motion.displacement, Vector3::new(0.0, 0.0, -0.5), epsilon = 1e-12);
        assert_relative_eq!(body.root().position, Vector3::new(0.0, 0.0, -0.5), epsilon = 1e-12);
        assert!(motion.moving);
        assert_relative_eq!(motion.rotation_delta, 0.0);
    }

    #[test]
    fn strafe_uses_right_axis() {
        let mut body = Body::new(Pose::identity());
        let motion = body.advance(&TickInput::moving(1.0, 0.0), 2.0, 0.001, 0.5);
        assert_relative_eq!(motion.displacement, Vector3::new(-1.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn idle_input_is_not_moving() {
        let mut body = Body::new(Pose::identity());
        let motion = body.advance(&TickInput::moving(0.0005, 0.0), 5.0, 0.001, 0.02);
        assert!(!motion.moving);
        let motion = body.advance(&TickInput::idle(), 5.0, 0.001, 0.02);
        assert!(!motion.moving);
        assert_relative_eq!(motion.displacement.norm(), 0.0);
    }

    #[test]
    fn yaw_registers_rotation_until_settled() {
        let mut body = Body::new(Pose::identity());
        let yaw = 5.0_f64.to_radians();
        let motion = body.advance(&TickInput::idle().with_yaw(yaw), 5.0, 0.001, 0.02);
        assert_relative_eq!(motion.rotation_delta, yaw, epsilon = 1e-9);
        body.settle();
        let motion = body.advance(&TickInput::idle(), 5.0, 0.001, 0.02);
        assert_relative_eq!(motion.rotation_delta, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn host_rotation_is_measured_against_last_settle() {
        let mut body = Body::new(Pose::identity());
        let mut root = *body.root();
        root.rotate_yaw(0.2);
        body.set_root(root);
        let motion = body.advance(&TickInput::idle(), 5.0, 0.001, 0.02);
        assert_relative_eq!(motion.rotation_delta, 0.2, epsilon = 1e-9);
    }

    #[test]
    fn reset_forgets_rotation() {
        let mut body = Body::new(Pose::identity());
        let mut root = Pose::from_position(Vector3::new(4.0, 0.0, 0.0));
        root.rotate_yaw(1.0);
        body.reset(root);
        let motion = body.advance(&TickInput::idle(), 5.0, 0.001, 0.02);
        assert_relative_eq!(motion.rotation_delta, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn travel_follows_heading() {
        let mut root = Pose::identity();
        root.rotate_yaw(std::f64::consts::FRAC_PI_2);
        let body = Body::new(root);
        // Facing +X after a quarter turn: stick forward (-Y) moves along +X.
        let dir = body.travel_direction(&Vector2::new(0.0, -1.0));
        assert_relative_eq!(dir, Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(body.down(), -Vector3::y(), epsilon = 1e-12);
    }
}
