pub mod assets;

use bevy::prelude::*;

use crate::asset_tracking::LoadResource;

pub use assets::{HumanConfig, HumanConfigLoader, IkSettings, TeleopSettings};

pub(super) fn plugin(app: &mut App) {
    // Register the asset loader for RON config files
    app.init_asset::<HumanConfig>();
    app.init_asset_loader::<HumanConfigLoader>();

    // Defaults stay in place if the file is missing or malformed
    app.init_resource::<HumanConfig>();
    app.load_resource_or_default::<HumanConfig>(HumanConfig::PATH);
}

#[cfg(test)]
mod tests {
    use std::{thread, time::Duration};

    use super::*;
    use crate::{
        asset_tracking::{self, ResourceHandles},
        game::human::{ControlType, Interface},
    };

    fn config_app(path: &'static str) -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default(), asset_tracking::plugin));
        app.init_asset::<HumanConfig>();
        app.init_asset_loader::<HumanConfigLoader>();
        app.init_resource::<HumanConfig>();
        app.load_resource_or_default::<HumanConfig>(path);

        for _ in 0..500 {
            app.update();
            if app.world().resource::<ResourceHandles>().is_all_done() {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        assert!(app.world().resource::<ResourceHandles>().is_all_done());
        app
    }

    #[test]
    fn test_loads_shipped_config() {
        let app = config_app(HumanConfig::PATH);

        let config = app.world().resource::<HumanConfig>();
        assert_eq!(config.interfaces, vec![Interface::Socket]);
        assert_eq!(config.control, ControlType::Position);
    }

    #[test]
    fn test_missing_config_falls_back_to_defaults() {
        let app = config_app("config/no_such_human.ron");

        assert_eq!(*app.world().resource::<HumanConfig>(), HumanConfig::default());
    }
}
