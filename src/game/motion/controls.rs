use bevy::prelude::*;

use crate::game::{configs::HumanConfig, human::Human};

use super::MotionVW;

/// Gives every human a keyboard-driven actuator.
pub fn attach_teleop(
    mut commands: Commands,
    config: Res<HumanConfig>,
    humans: Query<Entity, (With<Human>, Without<MotionVW>)>,
) {
    for human in &humans {
        commands.entity(human).insert(MotionVW {
            control: config.control,
            ..default()
        });
    }
}

pub fn apply_controls(
    keyboard: Res<ButtonInput<KeyCode>>,
    config: Res<HumanConfig>,
    mut query: Query<&mut MotionVW, With<Human>>,
) {
    let mut forward = 0.0;
    let mut turn = 0.0;

    if keyboard.pressed(KeyCode::ArrowUp) || keyboard.pressed(KeyCode::KeyW) {
        forward += 1.0;
    }
    if keyboard.pressed(KeyCode::ArrowDown) || keyboard.pressed(KeyCode::KeyS) {
        forward -= 1.0;
    }
    // Positive yaw turns left.
    if keyboard.pressed(KeyCode::ArrowLeft) || keyboard.pressed(KeyCode::KeyA) {
        turn += 1.0;
    }
    if keyboard.pressed(KeyCode::ArrowRight) || keyboard.pressed(KeyCode::KeyD) {
        turn -= 1.0;
    }

    for mut actuator in &mut query {
        let v = forward * config.teleop.walk_speed;
        let w = turn * config.teleop.turn_speed;
        if actuator.v != v || actuator.w != w {
            actuator.v = v;
            actuator.w = w;
        }
    }
}
