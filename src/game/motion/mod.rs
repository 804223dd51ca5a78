//! Motion actuators feeding the humans' [`MotionCommand`]s.

mod controls;

use bevy::prelude::*;

use crate::{
    game::human::{ControlType, Human, HumanSystems, MotionCommand},
    screens::Screen,
};

/// Forward speed and turn rate actuator, the usual way to drive a ground robot
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct MotionVW {
    /// Forward speed, m/s
    pub v: f32,
    /// Turn rate around the vertical axis, rad/s
    pub w: f32,
    pub control: ControlType,
}

impl MotionVW {
    pub fn command(&self) -> MotionCommand {
        MotionCommand {
            control: self.control,
            linear: Vec3::new(self.v, 0.0, 0.0),
            angular: Vec3::new(0.0, 0.0, self.w),
        }
    }
}

/// Copies each actuator's setpoint into the command applied this tick.
pub fn write_motion_commands(mut query: Query<(&MotionVW, &mut MotionCommand), With<Human>>) {
    for (actuator, mut command) in &mut query {
        command.set_if_neq(actuator.command());
    }
}

pub(super) fn plugin(app: &mut App) {
    app.register_type::<MotionVW>();

    app.add_systems(
        FixedUpdate,
        write_motion_commands
            .in_set(HumanSystems::Command)
            .run_if(in_state(Screen::Gameplay)),
    );
    app.add_systems(
        Update,
        (controls::attach_teleop, controls::apply_controls).run_if(in_state(Screen::Gameplay)),
    );
}
