//! The human avatar: a rigged mesh driven as a ground robot.
//!
//! Only one human per simulation is supported.

mod assembly;
mod assets;
mod controller;
mod gait;
mod ik;
mod interface;
mod locomotion;
mod pose;
#[cfg(test)]
mod test_logs;

use avian3d::prelude::*;
use bevy::{
    prelude::*,
    scene::{SceneInstance, SceneSpawner},
};

use crate::{asset_tracking::LoadResource, game::configs::HumanConfig, screens::Screen};

pub use assembly::{AssembleHuman, HumanRig, IkTarget};
pub use assets::HumanAssets;
pub use controller::{ControlType, MotionCommand};
pub use interface::Interface;

// Human marker component
#[derive(Component, Debug, Default, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Human;

/// Marks the rig scene of a human until its assembly has been queued
#[derive(Component)]
struct PendingAssembly;

// Constants
pub const HUMAN_HEIGHT: f32 = 1.8;
pub const HUMAN_RADIUS: f32 = 0.3;

/// Ordering of the per-tick human systems
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HumanSystems {
    /// Turns motion actuators into [`MotionCommand`]s
    Command,
    /// Applies the commands
    Apply,
}

// Human spawn command
pub struct SpawnHuman {
    pub position: Vec3,
    /// Rotation around the vertical axis, in radians
    pub yaw: f32,
}

impl Command for SpawnHuman {
    fn apply(self, world: &mut World) {
        let _ = world.run_system_cached_with(spawn_human, self);
    }
}

fn spawn_human(
    In(spawn_config): In<SpawnHuman>,
    mut commands: Commands,
    human_assets: Res<HumanAssets>,
    config: Res<HumanConfig>,
    existing: Query<(), With<Human>>,
) {
    if !existing.is_empty() {
        warn!("Only one human per simulation is supported, spawning another one anyway");
    }

    commands
        .spawn((
            Name::new("human"),
            Human,
            MotionCommand {
                control: config.control,
                ..default()
            },
            DespawnOnExit(Screen::Gameplay),
            Transform::from_translation(spawn_config.position)
                .with_rotation(Quat::from_rotation_y(spawn_config.yaw)),
            Visibility::Visible,
            // Moved by teleporting its transform, physics only sees it.
            RigidBody::Kinematic,
            Collider::capsule(HUMAN_RADIUS, HUMAN_HEIGHT - 2.0 * HUMAN_RADIUS),
        ))
        .with_children(|parent| {
            parent.spawn((
                Name::new("human_rig"),
                SceneRoot(human_assets.rig.clone()),
                PendingAssembly,
                Transform::from_translation(Vec3::new(0., -HUMAN_HEIGHT / 2., 0.)),
            ));
        });

    info!("Spawned human at {}", spawn_config.position);
}

/// Queues the assembly of every human whose rig scene finished spawning.
fn assemble_spawned_rigs(
    mut commands: Commands,
    scene_spawner: Res<SceneSpawner>,
    config: Res<HumanConfig>,
    rigs: Query<(Entity, &SceneInstance, &ChildOf), With<PendingAssembly>>,
) {
    for (rig, instance, child_of) in &rigs {
        if !scene_spawner.instance_is_ready(**instance) {
            continue;
        }
        commands.entity(rig).remove::<PendingAssembly>();
        commands.queue(AssembleHuman {
            root: child_of.parent(),
            interfaces: config.interfaces.clone(),
            ik: config.ik.clone(),
        });
    }
}

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Human>()
        .register_type::<MotionCommand>()
        .register_type::<gait::GaitPlayback>()
        .register_type::<ik::IkJoint>()
        .register_type::<pose::JointStates>()
        .register_type::<interface::MiddlewareBindings>();

    // Load the rig and its walk action
    app.load_resource::<HumanAssets>();

    app.configure_sets(
        FixedUpdate,
        (HumanSystems::Command, HumanSystems::Apply).chain(),
    );

    app.add_systems(
        FixedUpdate,
        (
            controller::init_human_controllers,
            controller::apply_motion_commands,
        )
            .chain()
            .in_set(HumanSystems::Apply)
            .run_if(in_state(Screen::Gameplay)),
    );

    app.add_systems(
        Update,
        (
            assemble_spawned_rigs,
            gait::bind_walk_animation,
            gait::drive_walk_cycle,
            ik::activate_moved_ik_targets,
        )
            .run_if(in_state(Screen::Gameplay)),
    );

    app.add_systems(PostUpdate, pose::sample_joint_states);
}
