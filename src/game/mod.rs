//! The simulated world: configuration, scene, the human and its actuators.

mod configs;
mod human;
mod motion;
mod scene;

use bevy::prelude::*;

pub use human::{Human, HumanRig, IkTarget};

pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        configs::plugin,
        scene::plugin,
        human::plugin,
        motion::plugin,
    ));
}
