use bevy::prelude::*;

/// Resource holding handles to the human rig and its walk action
#[derive(Resource, Asset, Reflect, Clone)]
pub struct HumanAssets {
    /// The rigged human mesh, armature included
    #[dependency]
    pub rig: Handle<Scene>,
    /// The action holding the walk cycle
    #[dependency]
    pub walk: Handle<AnimationClip>,
}

impl HumanAssets {
    /// Path to the default human rig
    pub const PATH_RIG: &'static str = "models/human_rig.glb";
}

impl FromWorld for HumanAssets {
    fn from_world(world: &mut World) -> Self {
        let assets = world.resource::<AssetServer>();
        Self {
            rig: assets.load(GltfAssetLabel::Scene(0).from_asset(HumanAssets::PATH_RIG)),
            walk: assets.load(GltfAssetLabel::Animation(0).from_asset(HumanAssets::PATH_RIG)),
        }
    }
}
