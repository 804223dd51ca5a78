//! The simulation's screen states and transitions between them.

use bevy::prelude::*;

use crate::asset_tracking::ResourceHandles;

pub(super) fn plugin(app: &mut App) {
    app.init_state::<Screen>();

    app.add_systems(
        Update,
        enter_gameplay_when_loaded.run_if(in_state(Screen::Loading)),
    );
}

/// The simulation's main screen states.
#[derive(States, Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Screen {
    /// Waiting for the rig, its clips and the configuration.
    #[default]
    Loading,
    Gameplay,
}

fn enter_gameplay_when_loaded(
    resource_handles: Res<ResourceHandles>,
    mut next_screen: ResMut<NextState<Screen>>,
) {
    if resource_handles.is_all_done() {
        info!("All assets loaded, starting the simulation");
        next_screen.set(Screen::Gameplay);
    }
}
