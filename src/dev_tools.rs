//! Development tools for the simulation. This plugin is only enabled in dev builds.

use avian3d::prelude::{PhysicsDebugPlugin, PhysicsGizmos};
use bevy::{dev_tools::states::log_transitions, prelude::*};

use crate::{
    game::{HumanRig, IkTarget},
    screens::Screen,
};

pub(super) fn plugin(app: &mut App) {
    // Log `Screen` state transitions.
    app.add_systems(
        Update,
        (
            log_transitions::<Screen>,
            toggle_physics_debug,
            draw_ik_targets.run_if(in_state(Screen::Gameplay)),
        ),
    );
    app.add_plugins(PhysicsDebugPlugin::default());
}

fn toggle_physics_debug(
    keys: Res<ButtonInput<KeyCode>>,
    mut store: ResMut<GizmoConfigStore>,
) {
    if keys.just_pressed(KeyCode::F3) {
        let (config, _) = store.config_mut::<PhysicsGizmos>();
        config.enabled = !config.enabled;
        info!("Physics debug rendering: {}", if config.enabled { "ON" } else { "OFF" });
    }
}

/// Draws the IK targets of every assembled human, red when bound to no bone
fn draw_ik_targets(
    mut gizmos: Gizmos,
    rigs: Query<&HumanRig>,
    targets: Query<(&IkTarget, &GlobalTransform)>,
) {
    for rig in &rigs {
        for (_, target) in &rig.ik_targets {
            let Ok((ik_target, transform)) = targets.get(*target) else {
                continue;
            };
            let color = if ik_target.bone.is_some() {
                Color::srgb(0.0, 1.0, 0.0)
            } else {
                Color::srgb(1.0, 0.0, 0.0)
            };
            gizmos.sphere(Isometry3d::from_translation(transform.translation()), 0.05, color);
        }
    }
}
