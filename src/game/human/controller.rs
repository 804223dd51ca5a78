//! Per-tick driving of the human: walk cycle selection and movement.

use std::{fmt, str::FromStr};

use avian3d::prelude::*;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    Human,
    assembly::{Armature, HumanRig},
    gait::{GaitPlayback, select_gait},
    locomotion::{Locomotion, RobotBody},
};

/// How a motion command is meant to be applied
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub enum ControlType {
    /// The command is integrated directly into the body's transform
    #[default]
    Position,
    /// The command drives the body's physics velocities
    Velocity,
}

impl fmt::Display for ControlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlType::Position => f.write_str("Position"),
            ControlType::Velocity => f.write_str("Velocity"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown control type '{0}' (expected Position or Velocity)")]
pub struct UnknownControlType(pub String);

impl FromStr for ControlType {
    type Err = UnknownControlType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Position" => Ok(ControlType::Position),
            "Velocity" => Ok(ControlType::Velocity),
            other => Err(UnknownControlType(other.to_string())),
        }
    }
}

/// Motion requested for this tick, in the robot frame (x forward, y left, z up).
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct MotionCommand {
    pub control: ControlType,
    /// m/s per axis
    pub linear: Vec3,
    /// rad/s per axis
    pub angular: Vec3,
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct HumanController {
    pub armature: Option<Entity>,
    warned_about_control_type: bool,
}

impl HumanController {
    fn new(armature: Option<Entity>) -> Self {
        Self {
            armature,
            warned_about_control_type: false,
        }
    }

    /// Builds the controller from the armatures found under the human.
    pub fn from_armatures(name: &str, armatures: &[Entity]) -> Self {
        info!("{name} initialization");

        let armature = match armatures {
            [] => {
                error!("The human <{name}> has no armature. Something is wrong!");
                None
            }
            [first] => Some(*first),
            [first, ..] => {
                warn!("The human <{name}> has more than one armature. Using the first one");
                Some(*first)
            }
        };

        if armature.is_some() {
            info!("Component initialized");
        }

        Self::new(armature)
    }

    /// Controller of a human whose assembly already reported the missing armature.
    pub fn without_armature(name: &str) -> Self {
        warn!("The human <{name}> was assembled without an armature, it will move without walking");
        Self::new(None)
    }

    pub fn warned_about_control_type(&self) -> bool {
        self.warned_about_control_type
    }

    /// Plays the walk cycle matching the command, then moves the body.
    ///
    /// Only [`ControlType::Position`] moves the human. Any other control
    /// type is reported once for the lifetime of this controller and then
    /// silently ignored.
    pub fn apply_speed(
        &mut self,
        kind: ControlType,
        linear: Vec3,
        angular: Vec3,
        gait: Option<&mut GaitPlayback>,
        locomotion: &mut impl Locomotion,
    ) {
        debug!("Applying speed {linear} / {angular}");

        if let Some(gait) = gait {
            gait.play(select_gait(linear, angular));
        }

        if kind != ControlType::Position {
            if !self.warned_about_control_type {
                error!(
                    "Only the control type 'Position' is currently supported by the human \
                     avatar (got '{kind}')! You need to configure your motion actuator \
                     accordingly, e.g. `control: Position`"
                );
                self.warned_about_control_type = true;
            }
        } else {
            locomotion.apply_speed(ControlType::Position, linear, angular);
        }
    }
}

/// Creates the controller of freshly assembled humans.
pub fn init_human_controllers(
    mut commands: Commands,
    humans: Query<(Entity, &HumanRig, Option<&Name>), (With<Human>, Without<HumanController>)>,
    children: Query<&Children>,
    armatures: Query<(), With<Armature>>,
) {
    for (human, rig, name) in &humans {
        let name = name.map_or("human", |n| n.as_str());
        let controller = if rig.armature.is_none() {
            HumanController::without_armature(name)
        } else {
            let found: Vec<Entity> = children
                .iter_descendants(human)
                .filter(|entity| armatures.contains(*entity))
                .collect();
            HumanController::from_armatures(name, &found)
        };
        commands.entity(human).insert(controller);
    }
}

/// Applies each human's [`MotionCommand`] for this tick.
pub fn apply_motion_commands(
    time: Res<Time>,
    mut humans: Query<
        (
            &mut HumanController,
            &MotionCommand,
            &mut Transform,
            Option<&mut LinearVelocity>,
            Option<&mut AngularVelocity>,
        ),
        With<Human>,
    >,
    mut gaits: Query<&mut GaitPlayback>,
) {
    for (mut controller, command, mut transform, mut linear_velocity, mut angular_velocity) in
        &mut humans
    {
        let mut gait = controller.armature.and_then(|a| gaits.get_mut(a).ok());
        let mut body = RobotBody {
            transform: &mut *transform,
            linear_velocity: linear_velocity.as_deref_mut(),
            angular_velocity: angular_velocity.as_deref_mut(),
            dt: time.delta_secs(),
        };
        controller.apply_speed(
            command.control,
            command.linear,
            command.angular,
            gait.as_deref_mut(),
            &mut body,
        );
    }
}
