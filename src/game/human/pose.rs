//! The `joint_states` pose sensor.

use bevy::{mesh::skinning::SkinnedMesh, platform::collections::HashSet, prelude::*};

use super::assembly::Armature;

/// Local pose of one bone
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct JointState {
    pub name: String,
    pub translation: Vec3,
    pub rotation: Quat,
}

/// Latest pose of the armature this sensor is attached to.
///
/// Joints are listed depth first, in the order of the armature hierarchy.
/// Data streams bound to the sensor export this component.
#[derive(Component, Debug, Default, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct JointStates {
    pub joints: Vec<JointState>,
}

impl JointStates {
    pub fn get(&self, name: &str) -> Option<&JointState> {
        self.joints.iter().find(|joint| joint.name == name)
    }
}

/// Refreshes every pose sensor from the bones of its armature.
///
/// Only joints of a skinned mesh are sampled, so mesh nodes exported
/// under the armature do not show up as bones.
pub fn sample_joint_states(
    mut sensors: Query<(Entity, &ChildOf, &mut JointStates)>,
    armatures: Query<(), With<Armature>>,
    skins: Query<&SkinnedMesh>,
    children: Query<&Children>,
    bones: Query<(&Name, &Transform)>,
) {
    let skin_joints: HashSet<Entity> = skins
        .iter()
        .flat_map(|skin| skin.joints.iter().copied())
        .collect();

    for (sensor, child_of, mut states) in &mut sensors {
        let armature = child_of.parent();
        if !armatures.contains(armature) {
            continue;
        }

        let mut joints = Vec::with_capacity(states.joints.len());
        let mut stack: Vec<Entity> = Vec::new();
        if let Ok(top) = children.get(armature) {
            stack.extend(top.iter().rev());
        }
        while let Some(entity) = stack.pop() {
            if entity == sensor {
                continue;
            }
            if skin_joints.contains(&entity) {
                if let Ok((name, transform)) = bones.get(entity) {
                    joints.push(JointState {
                        name: name.as_str().to_string(),
                        translation: transform.translation,
                        rotation: transform.rotation,
                    });
                }
            }
            if let Ok(grandchildren) = children.get(entity) {
                stack.extend(grandchildren.iter().rev());
            }
        }

        if states.joints != joints {
            states.joints = joints;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skin(joints: Vec<Entity>) -> SkinnedMesh {
        SkinnedMesh {
            inverse_bindposes: Handle::default(),
            joints,
        }
    }

    #[test]
    fn test_samples_bones_depth_first() {
        let mut app = App::new();
        app.add_systems(Update, sample_joint_states);

        let world = app.world_mut();
        let armature = world
            .spawn((Name::new("HumanSkeleton"), Armature, Transform::default()))
            .id();
        let hips = world
            .spawn((
                Name::new("hips"),
                Transform::from_xyz(0.0, 1.0, 0.0),
                ChildOf(armature),
            ))
            .id();
        let head = world
            .spawn((
                Name::new("head"),
                Transform::from_rotation(Quat::from_rotation_x(0.3)),
                ChildOf(hips),
            ))
            .id();
        let foot = world
            .spawn((Name::new("foot_L"), Transform::default(), ChildOf(armature)))
            .id();
        // The skinned body mesh is exported as a child of the armature.
        world.spawn((
            Name::new("HumanBody"),
            Transform::default(),
            skin(vec![hips, foot, head]),
            ChildOf(armature),
        ));
        let sensor = world
            .spawn((
                Name::new("joint_states"),
                JointStates::default(),
                Transform::default(),
                ChildOf(armature),
            ))
            .id();

        app.update();

        let states = app.world().get::<JointStates>(sensor).unwrap();
        let names: Vec<&str> = states.joints.iter().map(|j| j.name.as_str()).collect();
        assert_eq!(names, vec!["hips", "head", "foot_L"]);
        assert_eq!(
            states.get("head").unwrap().rotation,
            Quat::from_rotation_x(0.3)
        );
        assert_eq!(states.get("hips").unwrap().translation, Vec3::Y);
        assert!(states.get("HumanBody").is_none());
    }

    #[test]
    fn test_unskinned_nodes_are_not_joints() {
        let mut app = App::new();
        app.add_systems(Update, sample_joint_states);

        let world = app.world_mut();
        let armature = world
            .spawn((Name::new("HumanSkeleton"), Armature, Transform::default()))
            .id();
        let hips = world
            .spawn((Name::new("hips"), Transform::default(), ChildOf(armature)))
            .id();
        world.spawn((Name::new("hat"), Transform::default(), ChildOf(hips)));
        world.spawn((Name::new("HumanBody"), skin(vec![hips])));
        let sensor = world
            .spawn((JointStates::default(), ChildOf(armature)))
            .id();

        app.update();

        let states = app.world().get::<JointStates>(sensor).unwrap();
        let names: Vec<&str> = states.joints.iter().map(|j| j.name.as_str()).collect();
        assert_eq!(names, vec!["hips"]);
    }

    #[test]
    fn test_sensor_outside_an_armature_is_left_alone() {
        let mut app = App::new();
        app.add_systems(Update, sample_joint_states);

        let world = app.world_mut();
        let parent = world.spawn((Name::new("not_an_armature"), Transform::default())).id();
        world.spawn((Name::new("bone"), Transform::default(), ChildOf(parent)));
        let sensor = world.spawn((JointStates::default(), ChildOf(parent))).id();

        app.update();

        assert!(app.world().get::<JointStates>(sensor).unwrap().joints.is_empty());
    }
}
