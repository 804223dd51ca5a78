mod test_scene;

use bevy::prelude::*;

use crate::{
    game::{configs::HumanConfig, human::SpawnHuman},
    screens::Screen,
};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(
        OnEnter(Screen::Gameplay),
        (test_scene::spawn_test_scene, spawn_level).chain(),
    );
}

pub fn spawn_level(world: &mut World) {
    // The only robot in our level is the human,
    // but add other robots and props here.
    let config = world.resource::<HumanConfig>();
    let spawn = SpawnHuman {
        position: Vec3::from_array(config.position),
        yaw: config.yaw,
    };
    spawn.apply(world);
}
