//! A high-level way to load collections of asset handles as resources.

use std::collections::VecDeque;

use bevy::{asset::LoadState, prelude::*};

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<ResourceHandles>();
    app.add_systems(PreUpdate, load_resource_assets);
}

pub trait LoadResource {
    /// This will load the [`Resource`] as an [`Asset`]. When all of its asset dependencies
    /// have been loaded, it will be inserted as a resource. This ensures that the resource only
    /// exists when the assets are ready.
    fn load_resource<T: Resource + Asset + Clone + FromWorld>(&mut self) -> &mut Self;

    /// Loads the file at `path` into an existing [`Resource`].
    ///
    /// If the file is missing or fails to parse, the resource keeps its current
    /// value and loading still counts as done.
    fn load_resource_or_default<T: Resource + Asset + Clone>(
        &mut self,
        path: &'static str,
    ) -> &mut Self;
}

impl LoadResource for App {
    fn load_resource<T: Resource + Asset + Clone + FromWorld>(&mut self) -> &mut Self {
        self.init_asset::<T>();
        let world = self.world_mut();
        let value = T::from_world(world);
        let assets = world.resource::<AssetServer>();
        let handle = assets.add(value);
        let mut handles = world.resource_mut::<ResourceHandles>();
        handles.waiting.push_back(TrackedHandle {
            handle: handle.untyped(),
            insert: insert_loaded::<T>,
            optional: false,
        });
        self
    }

    fn load_resource_or_default<T: Resource + Asset + Clone>(
        &mut self,
        path: &'static str,
    ) -> &mut Self {
        let world = self.world_mut();
        let handle: Handle<T> = world.resource::<AssetServer>().load(path);
        let mut handles = world.resource_mut::<ResourceHandles>();
        handles.waiting.push_back(TrackedHandle {
            handle: handle.untyped(),
            insert: insert_loaded::<T>,
            optional: true,
        });
        self
    }
}

fn insert_loaded<T: Resource + Asset + Clone>(world: &mut World, handle: &UntypedHandle) {
    let assets = world.resource::<Assets<T>>();
    if let Some(value) = assets.get(handle.id().typed::<T>()) {
        world.insert_resource(value.clone());
    }
}

/// A function that inserts a loaded resource.
type InsertLoadedResource = fn(&mut World, &UntypedHandle);

struct TrackedHandle {
    handle: UntypedHandle,
    insert: InsertLoadedResource,
    /// Whether a failed load is tolerated
    optional: bool,
}

#[derive(Resource, Default)]
pub struct ResourceHandles {
    // Use a queue for waiting assets so they can be cycled through and moved to
    // `finished` one at a time.
    waiting: VecDeque<TrackedHandle>,
    finished: Vec<UntypedHandle>,
}

impl ResourceHandles {
    /// Returns true if all requested [`Asset`]s have finished loading and are available as [`Resource`]s.
    pub fn is_all_done(&self) -> bool {
        self.waiting.is_empty()
    }
}

fn load_resource_assets(world: &mut World) {
    world.resource_scope(|world, mut resource_handles: Mut<ResourceHandles>| {
        world.resource_scope(|world, assets: Mut<AssetServer>| {
            for _ in 0..resource_handles.waiting.len() {
                let Some(tracked) = resource_handles.waiting.pop_front() else {
                    break;
                };
                if assets.is_loaded_with_dependencies(&tracked.handle) {
                    (tracked.insert)(world, &tracked.handle);
                    resource_handles.finished.push(tracked.handle);
                    continue;
                }
                match assets.load_state(&tracked.handle) {
                    LoadState::Failed(err) if tracked.optional => {
                        warn!("{err}, keeping the default values");
                        resource_handles.finished.push(tracked.handle);
                    }
                    _ => resource_handles.waiting.push_back(tracked),
                }
            }
        });
    });
}
