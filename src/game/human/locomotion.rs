//! Generic robot movement: how a motion command moves a body.

use avian3d::prelude::*;
use bevy::prelude::*;

use super::controller::ControlType;

/// The movement routine shared by every robot.
///
/// `linear` and `angular` are expressed in the robot frame: x forward, y left, z up.
pub trait Locomotion {
    fn apply_speed(&mut self, kind: ControlType, linear: Vec3, angular: Vec3);
}

/// Converts a robot-frame vector to Bevy's local frame (forward -Z, left -X, up +Y).
pub fn robot_to_local(v: Vec3) -> Vec3 {
    Vec3::new(-v.y, v.z, -v.x)
}

/// A body moved by teleporting its transform or by driving its physics velocities
pub struct RobotBody<'a> {
    pub transform: &'a mut Transform,
    pub linear_velocity: Option<&'a mut LinearVelocity>,
    pub angular_velocity: Option<&'a mut AngularVelocity>,
    /// Length of the simulation step, in seconds
    pub dt: f32,
}

impl Locomotion for RobotBody<'_> {
    fn apply_speed(&mut self, kind: ControlType, linear: Vec3, angular: Vec3) {
        let linear = robot_to_local(linear);
        let angular = robot_to_local(angular);

        match kind {
            ControlType::Position => {
                // Displacement and rotation are both relative to the body's own axes.
                let displacement = self.transform.rotation * (linear * self.dt);
                self.transform.translation += displacement;
                self.transform.rotation *= Quat::from_scaled_axis(angular * self.dt);
            }
            ControlType::Velocity => {
                let rotation = self.transform.rotation;
                match self.linear_velocity.as_deref_mut() {
                    Some(velocity) => velocity.0 = rotation * linear,
                    None => debug!("Velocity control on a body without LinearVelocity"),
                }
                if let Some(velocity) = self.angular_velocity.as_deref_mut() {
                    velocity.0 = rotation * angular;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn test_robot_frame_conversion() {
        assert_eq!(robot_to_local(Vec3::X), Vec3::NEG_Z);
        assert_eq!(robot_to_local(Vec3::Y), Vec3::NEG_X);
        assert_eq!(robot_to_local(Vec3::Z), Vec3::Y);
    }

    #[test]
    fn test_position_moves_forward_in_local_frame() {
        let mut transform = Transform::from_xyz(1.0, 0.0, 0.0);
        let mut body = RobotBody {
            transform: &mut transform,
            linear_velocity: None,
            angular_velocity: None,
            dt: 0.5,
        };
        body.apply_speed(ControlType::Position, Vec3::new(2.0, 0.0, 0.0), Vec3::ZERO);

        assert!(transform.translation.abs_diff_eq(Vec3::new(1.0, 0.0, -1.0), 1e-5));
    }

    #[test]
    fn test_position_yaw_turns_left() {
        let mut transform = Transform::default();
        let mut body = RobotBody {
            transform: &mut transform,
            linear_velocity: None,
            angular_velocity: None,
            dt: 1.0,
        };
        body.apply_speed(
            ControlType::Position,
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, FRAC_PI_2),
        );

        assert!(transform.forward().abs_diff_eq(Vec3::NEG_X, 1e-5));
    }

    #[test]
    fn test_velocity_sets_physics_velocities() {
        let mut transform = Transform::from_rotation(Quat::from_rotation_y(FRAC_PI_2));
        let mut linear = LinearVelocity::default();
        let mut angular = AngularVelocity::default();
        let mut body = RobotBody {
            transform: &mut transform,
            linear_velocity: Some(&mut linear),
            angular_velocity: Some(&mut angular),
            dt: 0.1,
        };
        body.apply_speed(
            ControlType::Velocity,
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 0.3),
        );

        // Facing -X after the quarter turn, forward speed goes along -X.
        assert!(linear.0.abs_diff_eq(Vec3::NEG_X, 1e-5));
        assert!(angular.0.abs_diff_eq(Vec3::new(0.0, 0.3, 0.0), 1e-5));
        // Velocity control never teleports.
        assert_eq!(transform.translation, Vec3::ZERO);
    }
}
