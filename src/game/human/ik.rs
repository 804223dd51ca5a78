//! Binding between IK targets and the bones they pose.
//!
//! Solving the chains is left to whatever middleware drives the targets;
//! the human only records which bone follows which target and whether the
//! binding is live.

use bevy::prelude::*;

use super::assembly::IkTarget;

/// Marks a bone as posed by an IK target
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct IkJoint {
    pub target: Entity,
    /// Bones moved when the target is posed, this one included
    pub chain_length: usize,
    pub iterations: usize,
    /// Off until the target is first moved
    pub enabled: bool,
}

/// Enables the joint of every IK target moved since it was spawned.
///
/// Targets start on their bone with the joint off, so the walk cycle
/// keeps full control until a middleware actually poses the target.
pub fn activate_moved_ik_targets(
    targets: Query<(Entity, &IkTarget, Ref<Transform>)>,
    mut joints: Query<&mut IkJoint>,
) {
    for (entity, target, transform) in &targets {
        if !transform.is_changed() || transform.is_added() {
            continue;
        }
        let Some(bone) = target.bone else {
            continue;
        };
        let Ok(mut joint) = joints.get_mut(bone) else {
            continue;
        };
        if joint.target == entity && !joint.enabled {
            joint.enabled = true;
            info!("IK target {:?} posed, enabling its joint", target.kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::human::assembly::IkTargetKind;

    fn spawn_bound_target(app: &mut App) -> (Entity, Entity) {
        let bone = app.world_mut().spawn(Transform::default()).id();
        let target = app
            .world_mut()
            .spawn((
                IkTarget {
                    kind: IkTargetKind::WristL,
                    bone: Some(bone),
                },
                Transform::default(),
            ))
            .id();
        app.world_mut().entity_mut(bone).insert(IkJoint {
            target,
            chain_length: 2,
            iterations: 20,
            enabled: false,
        });
        (bone, target)
    }

    #[test]
    fn test_joint_enabled_only_after_move() {
        let mut app = App::new();
        app.add_systems(Update, activate_moved_ik_targets);
        let (bone, target) = spawn_bound_target(&mut app);

        app.update();
        assert!(!app.world().get::<IkJoint>(bone).unwrap().enabled);

        app.update();
        assert!(!app.world().get::<IkJoint>(bone).unwrap().enabled);

        app.world_mut()
            .get_mut::<Transform>(target)
            .unwrap()
            .translation = Vec3::new(0.2, 1.4, -0.3);
        app.update();
        assert!(app.world().get::<IkJoint>(bone).unwrap().enabled);
    }

    #[test]
    fn test_target_bound_elsewhere_does_not_enable() {
        let mut app = App::new();
        app.add_systems(Update, activate_moved_ik_targets);
        let (bone, _) = spawn_bound_target(&mut app);

        // A second target claiming the same bone is not the one it follows.
        let stray = app
            .world_mut()
            .spawn((
                IkTarget {
                    kind: IkTargetKind::WristR,
                    bone: Some(bone),
                },
                Transform::default(),
            ))
            .id();
        app.update();

        app.world_mut().get_mut::<Transform>(stray).unwrap().translation = Vec3::X;
        app.update();
        assert!(!app.world().get::<IkJoint>(bone).unwrap().enabled);
    }
}
