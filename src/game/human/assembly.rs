//! Builds the human's object graph once its rig has been spawned.
//!
//! The rig is a glTF scene whose skeleton node is called `HumanSkeleton`.
//! Assembly tags that node as the armature, creates the five IK targets and
//! the `joint_states` pose sensor, then registers the requested middleware
//! interfaces.

use bevy::prelude::*;
use thiserror::Error;

use crate::game::configs::IkSettings;

use super::{
    gait::GaitPlayback,
    ik::IkJoint,
    interface::{ExportedType, Interface, Overlay, OverlayKind, bind},
    pose::JointStates,
};

/// Name of the armature node in the human rig.
pub const ARMATURE_NAME: &str = "HumanSkeleton";
/// Name of the pose sensor attached to the armature.
pub const JOINT_STATES_NAME: &str = "joint_states";

/// Marker for the skeletal armature driving the human mesh
#[derive(Component, Debug, Default, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Armature;

/// The bones that can be posed through an IK target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum IkTargetKind {
    Head,
    WristL,
    WristR,
    FootL,
    FootR,
}

impl IkTargetKind {
    pub const ALL: [IkTargetKind; 5] = [
        IkTargetKind::Head,
        IkTargetKind::WristL,
        IkTargetKind::WristR,
        IkTargetKind::FootL,
        IkTargetKind::FootR,
    ];

    /// Name of the controlled bone in the rig
    pub fn bone_name(&self) -> &'static str {
        match self {
            IkTargetKind::Head => "head",
            IkTargetKind::WristL => "wrist_L",
            IkTargetKind::WristR => "wrist_R",
            IkTargetKind::FootL => "foot_L",
            IkTargetKind::FootR => "foot_R",
        }
    }

    pub fn target_name(&self) -> String {
        format!("ik_target.{}", self.bone_name())
    }

    /// Bones moved by the solver, the end bone included
    pub fn chain_length(&self, settings: &IkSettings) -> usize {
        match self {
            IkTargetKind::Head => settings.head_chain_length,
            _ => settings.limb_chain_length,
        }
    }
}

/// A control point used to pose one bone of the armature
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct IkTarget {
    pub kind: IkTargetKind,
    /// The constrained bone, when the rig has it
    pub bone: Option<Entity>,
}

/// The assembled object graph of a human.
///
/// A human whose armature could not be found keeps the default (empty)
/// rig: it still moves but cannot export or receive a pose.
#[derive(Component, Debug, Default, Clone, PartialEq)]
pub struct HumanRig {
    pub armature: Option<Entity>,
    pub ik_targets: Vec<(IkTargetKind, Entity)>,
    pub joint_states: Option<Entity>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssemblyError {
    #[error(
        "could not find the human armature (looked for an object called '{armature}' in the \
         children of {root:?})"
    )]
    MissingArmature { root: Entity, armature: &'static str },

    #[error("the human has no armature, cannot add the '{0}' interface")]
    NotAssembled(Interface),
}

/// Finds the first entity named `name` below `root`, depth first.
pub fn find_descendant_by_name(world: &World, root: Entity, name: &str) -> Option<Entity> {
    let mut stack: Vec<Entity> = Vec::new();
    if let Some(children) = world.get::<Children>(root) {
        stack.extend(children.iter().rev());
    }

    while let Some(entity) = stack.pop() {
        if world.get::<Name>(entity).is_some_and(|n| n.as_str() == name) {
            return Some(entity);
        }
        if let Some(children) = world.get::<Children>(entity) {
            stack.extend(children.iter().rev());
        }
    }
    None
}

/// Transform of `entity` expressed in the space of its ancestor `root`.
pub fn transform_relative_to(world: &World, root: Entity, entity: Entity) -> Option<Transform> {
    let mut relative = Transform::IDENTITY;
    let mut current = entity;
    while current != root {
        let local = world.get::<Transform>(current).copied().unwrap_or_default();
        relative = local * relative;
        current = world.get::<ChildOf>(current)?.parent();
    }
    Some(relative)
}

/// Tags the armature under `root` and spawns its IK targets and pose sensor.
///
/// Each target found a bone for is bound to it through an [`IkJoint`].
pub fn assemble_rig(
    world: &mut World,
    root: Entity,
    ik: &IkSettings,
) -> Result<HumanRig, AssemblyError> {
    let armature = find_descendant_by_name(world, root, ARMATURE_NAME).ok_or(
        AssemblyError::MissingArmature {
            root,
            armature: ARMATURE_NAME,
        },
    )?;

    world.entity_mut(armature).insert((
        Armature,
        ExportedType::default(),
        GaitPlayback::default(),
    ));

    let mut ik_targets = Vec::with_capacity(IkTargetKind::ALL.len());
    for kind in IkTargetKind::ALL {
        let bone = find_descendant_by_name(world, armature, kind.bone_name());
        let placement = bone
            .and_then(|bone| transform_relative_to(world, root, bone))
            .map(|t| Transform::from_translation(t.translation))
            .unwrap_or_default();

        let target = world
            .spawn((
                Name::new(kind.target_name()),
                IkTarget { kind, bone },
                placement,
                Visibility::default(),
                ChildOf(root),
            ))
            .id();

        match bone {
            Some(bone) => {
                world.entity_mut(bone).insert(IkJoint {
                    target,
                    chain_length: kind.chain_length(ik),
                    iterations: ik.iterations,
                    enabled: false,
                });
            }
            None => warn!(
                "The human armature has no '{}' bone, {} will not pose anything",
                kind.bone_name(),
                kind.target_name()
            ),
        }
        ik_targets.push((kind, target));
    }

    // "joint_states", plural, to match the usual ROS spelling.
    let joint_states = world
        .spawn((
            Name::new(JOINT_STATES_NAME),
            JointStates::default(),
            Transform::default(),
            Visibility::default(),
            ChildOf(armature),
        ))
        .id();

    Ok(HumanRig {
        armature: Some(armature),
        ik_targets,
        joint_states: Some(joint_states),
    })
}

impl HumanRig {
    /// Registers a middleware on the rig's sensor and armature.
    pub fn add_interface(
        &self,
        world: &mut World,
        root: Entity,
        interface: Interface,
    ) -> Result<(), AssemblyError> {
        let (Some(armature), Some(joint_states)) = (self.armature, self.joint_states) else {
            return Err(AssemblyError::NotAssembled(interface));
        };

        match interface {
            Interface::Socket => {
                bind(world, joint_states, |b| b.streams.push(interface));
                bind(world, armature, |b| b.services.push(interface));
            }
            Interface::Ros => {
                bind(world, joint_states, |b| b.streams.push(interface));
                bind(world, armature, |b| {
                    b.services.push(interface);
                    b.overlays.push(Overlay {
                        interface,
                        kind: OverlayKind::ArmatureController,
                    });
                });
            }
            Interface::Pocolibs => {
                world
                    .entity_mut(armature)
                    .insert(ExportedType::HumanPosture);
                bind(world, root, |b| b.streams.push(interface));
            }
        }

        info!("Added the '{interface}' interface to the human");
        Ok(())
    }
}

/// Assembles the human rooted at `root` and registers its interfaces.
pub struct AssembleHuman {
    pub root: Entity,
    pub interfaces: Vec<Interface>,
    pub ik: IkSettings,
}

impl Command for AssembleHuman {
    fn apply(self, world: &mut World) {
        if world.get_entity(self.root).is_err() {
            warn!("Human {:?} despawned before its rig was assembled", self.root);
            return;
        }

        let rig = match assemble_rig(world, self.root, &self.ik) {
            Ok(rig) => {
                info!(
                    "Assembled human {:?}: armature {:?}, {} IK targets",
                    self.root,
                    rig.armature,
                    rig.ik_targets.len()
                );
                rig
            }
            Err(err) => {
                error!("{err}. I won't be able to export the human pose to any middleware.");
                HumanRig::default()
            }
        };

        for interface in &self.interfaces {
            if let Err(err) = rig.add_interface(world, self.root, *interface) {
                warn!("{err}");
            }
        }

        world.entity_mut(self.root).insert(rig);
    }
}
