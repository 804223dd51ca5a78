use bevy::{
    asset::{AssetLoader, AsyncReadExt, LoadContext},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::game::human::{ControlType, Interface};

/// Human avatar configuration loaded from RON file
#[derive(Asset, Resource, Reflect, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HumanConfig {
    /// Spawn position (x, y, z)
    pub position: [f32; 3],
    /// Spawn rotation around the vertical axis, in radians
    pub yaw: f32,
    /// Middlewares the human pose is exported through
    pub interfaces: Vec<Interface>,
    /// Frame rate the rig's actions were authored at
    pub frame_rate: f32,
    /// Control type requested by the motion actuator
    pub control: ControlType,
    pub ik: IkSettings,
    pub teleop: TeleopSettings,
}

/// Solver settings for the IK targets
#[derive(Reflect, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IkSettings {
    pub iterations: usize,
    /// Bones moved when posing a wrist or a foot
    pub limb_chain_length: usize,
    /// Bones moved when posing the head
    pub head_chain_length: usize,
}

/// Keyboard teleoperation speeds
#[derive(Reflect, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeleopSettings {
    /// Forward speed, m/s
    pub walk_speed: f32,
    /// Turn rate, rad/s
    pub turn_speed: f32,
}

impl HumanConfig {
    /// Path to the human configuration file
    pub const PATH: &'static str = "config/human.ron";
}

impl Default for HumanConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.9, 0.0],
            yaw: 0.0,
            interfaces: Vec::new(),
            frame_rate: 24.0,
            control: ControlType::Position,
            ik: IkSettings::default(),
            teleop: TeleopSettings::default(),
        }
    }
}

impl Default for IkSettings {
    fn default() -> Self {
        Self {
            iterations: 20,
            limb_chain_length: 2, // wrist -> forearm -> arm
            head_chain_length: 1,
        }
    }
}

impl Default for TeleopSettings {
    fn default() -> Self {
        Self {
            walk_speed: 1.0,
            turn_speed: 0.8,
        }
    }
}

/// Asset loader for HumanConfig RON files
#[derive(Default)]
pub struct HumanConfigLoader;

impl AssetLoader for HumanConfigLoader {
    type Asset = HumanConfig;
    type Settings = ();
    type Error = anyhow::Error;

    async fn load(
        &self,
        reader: &mut dyn bevy::asset::io::Reader,
        _settings: &Self::Settings,
        _load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        let config: HumanConfig = ron::de::from_bytes(&bytes)?;
        Ok(config)
    }

    fn extensions(&self) -> &[&str] {
        &["ron"]
    }
}
