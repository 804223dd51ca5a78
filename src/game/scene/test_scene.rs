use crate::screens::Screen;
use avian3d::prelude::*;
use bevy::prelude::*;

/// Marker component for test scene entities
#[derive(Component)]
pub struct TestSceneEntity;

/// Spawn a flat floor, a light and a few landmarks to walk around
pub fn spawn_test_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    info!("Spawning test scene...");

    let floor_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.3, 0.5, 0.3),
        perceptual_roughness: 0.9,
        ..default()
    });
    let landmark_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.7, 0.3, 0.3),
        ..default()
    });

    // Ground floor - 50m x 50m, top face at y = 0
    let floor_size = 50.0;
    let floor_height = 0.5;
    spawn_block(
        &mut commands,
        &mut meshes,
        floor_material,
        Vec3::new(0.0, -floor_height / 2., 0.0),
        Vec3::new(floor_size, floor_height, floor_size),
        "Ground Floor",
    );

    // Landmarks on a circle around the spawn point
    for i in 0..6 {
        let angle = i as f32 * std::f32::consts::TAU / 6.0;
        let position = Vec3::new(8.0 * angle.cos(), 0.5, 8.0 * angle.sin());
        spawn_block(
            &mut commands,
            &mut meshes,
            landmark_material.clone(),
            position,
            Vec3::ONE,
            &format!("Landmark {i}"),
        );
    }

    commands.spawn((
        Name::new("Sun"),
        DespawnOnExit(Screen::Gameplay),
        TestSceneEntity,
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 10.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// Helper function to spawn a static box
fn spawn_block(
    commands: &mut Commands,
    meshes: &mut ResMut<Assets<Mesh>>,
    material: Handle<StandardMaterial>,
    position: Vec3,
    size: Vec3,
    label: &str,
) {
    let mesh = Mesh::from(Cuboid::new(size.x, size.y, size.z));

    commands.spawn((
        DespawnOnExit(Screen::Gameplay),
        TestSceneEntity,
        Mesh3d(meshes.add(mesh)),
        MeshMaterial3d(material),
        Transform::from_translation(position),
        RigidBody::Static,
        Collider::cuboid(size.x, size.y, size.z),
        Name::new(label.to_string()),
    ));

    debug!("Spawned block: {} at {}", label, position);
}
