use nalgebra::{Quaternion, Vector2};

use crate::math;

use super::VelocityCommand;

/// Dead reckoned planar pose.
///
/// The pose is never corrected by odometry. It assumes the commanded
/// velocity was realized for the full tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    /// Position in meters relative to the start.
    pub position: Vector2<f64>,
    /// Heading in radians, kept within [-PI, PI].
    pub heading: f64,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vector2::zeros(),
            heading: 0.0,
        }
    }
}

impl Pose {
    /// Advance the pose by the command applied over `dt` seconds.
    pub fn integrate(&mut self, command: &VelocityCommand, dt: f64) {
        let direction = Vector2::new(self.heading.cos(), self.heading.sin());

        self.position += direction * (command.linear_x * dt);
        self.heading = math::normalize_angle(self.heading + command.angular_z * dt);
    }

    /// Orientation as a planar quaternion.
    #[inline]
    pub fn orientation(&self) -> Quaternion<f64> {
        math::heading_to_quaternion(self.heading)
    }
}

impl std::fmt::Display for Pose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "X={:.2} Y={:.2} Heading={:.1}",
            self.position.x,
            self.position.y,
            self.heading.to_degrees()
        )
    }
}
