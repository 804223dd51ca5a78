//! Middleware bindings attached to the human at assembly time.

use std::{fmt, str::FromStr};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Middleware a human can export its pose through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interface {
    Socket,
    Ros,
    Pocolibs,
}

impl Interface {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interface::Socket => "socket",
            Interface::Ros => "ros",
            Interface::Pocolibs => "pocolibs",
        }
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown middleware interface '{0}' (expected socket, ros or pocolibs)")]
pub struct UnknownInterface(pub String);

impl FromStr for Interface {
    type Err = UnknownInterface;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "socket" => Ok(Interface::Socket),
            "ros" => Ok(Interface::Ros),
            "pocolibs" => Ok(Interface::Pocolibs),
            other => Err(UnknownInterface(other.to_string())),
        }
    }
}

/// Middleware-specific adapter translating the armature's data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum OverlayKind {
    /// Drives the armature joints from ROS trajectory messages
    ArmatureController,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct Overlay {
    pub interface: Interface,
    pub kind: OverlayKind,
}

/// Streams, services and overlays registered on an entity.
///
/// Registrations only ever accumulate: nothing unbinds a middleware once
/// the human has been assembled.
#[derive(Component, Debug, Default, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct MiddlewareBindings {
    pub streams: Vec<Interface>,
    pub services: Vec<Interface>,
    pub overlays: Vec<Overlay>,
}

impl MiddlewareBindings {
    pub fn has_stream(&self, interface: Interface) -> bool {
        self.streams.contains(&interface)
    }

    pub fn has_service(&self, interface: Interface) -> bool {
        self.services.contains(&interface)
    }

    pub fn has_overlay(&self, interface: Interface) -> bool {
        self.overlays.iter().any(|o| o.interface == interface)
    }
}

/// What the armature is exported as to the middlewares
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub enum ExportedType {
    /// Plain armature: joint states in, joint states out
    #[default]
    Armature,
    /// Aggregated human posture, as expected by pocolibs clients
    HumanPosture,
}

/// Records a binding on `entity`, creating its [`MiddlewareBindings`] if needed.
pub(super) fn bind(world: &mut World, entity: Entity, f: impl FnOnce(&mut MiddlewareBindings)) {
    let Ok(mut entity_mut) = world.get_entity_mut(entity) else {
        warn!("Cannot bind middleware on missing entity {entity:?}");
        return;
    };
    let mut bindings = entity_mut.take::<MiddlewareBindings>().unwrap_or_default();
    f(&mut bindings);
    entity_mut.insert(bindings);
}
