use crate::convert::{to_quat, to_vec3};
use bevy::prelude::*;
use rig_shared::{ColliderShapeDef, StaticGround, WorldStaticDef};

/// Rapier scene the locomotion ground probe casts against.
#[derive(Resource)]
pub struct LevelGround(pub StaticGround);

pub(super) fn plugin(app: &mut App) {
    app.insert_resource(LevelGround(StaticGround::build(level_statics())));
    app.add_systems(Startup, setup);
}

const FLOOR_SIZE: f32 = 50.0;

/// The demo level. Rendered meshes and ground colliders share these definitions.
fn level_statics() -> Vec<WorldStaticDef> {
    vec![
        WorldStaticDef::floor(0, 0.0),
        // Raised platform to walk off and fall from.
        WorldStaticDef {
            id: 1,
            translation: rig_shared::Vec3::new(-4.0, 0.4, -4.0),
            rotation: rig_shared::Quat::identity(),
            shape: ColliderShapeDef::Cuboid {
                half_extents: rig_shared::Vec3::new(1.5, 0.4, 1.5),
            },
        },
        WorldStaticDef {
            id: 2,
            translation: rig_shared::Vec3::new(6.0, 1.0, 3.0),
            rotation: rig_shared::Quat::identity(),
            shape: ColliderShapeDef::CylinderY {
                radius: 0.4,
                half_height: 1.0,
            },
        },
    ]
}

fn static_mesh(shape: &ColliderShapeDef) -> Mesh {
    match shape {
        ColliderShapeDef::Plane { .. } => Plane3d::default()
            .mesh()
            .size(FLOOR_SIZE, FLOOR_SIZE)
            .build(),
        ColliderShapeDef::Cuboid { half_extents } => {
            Cuboid::from_size(to_vec3(half_extents) * 2.0).into()
        }
        ColliderShapeDef::Sphere { radius } => Sphere::new(*radius).into(),
        ColliderShapeDef::CapsuleY {
            radius,
            half_height,
        } => Capsule3d::new(*radius, *half_height * 2.0).into(),
        ColliderShapeDef::CylinderY {
            radius,
            half_height,
        } => Cylinder::new(*radius, *half_height * 2.0).into(),
    }
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    info!("World setup");

    let ground_material = materials.add(StandardMaterial {
        base_color: Color::linear_rgb(0.2, 0.3, 0.25),
        perceptual_roughness: 1.0,
        metallic: 0.0,
        ..default()
    });
    let prop_material = materials.add(Color::srgb_u8(124, 144, 255));

    for def in level_statics() {
        let material = match def.shape {
            ColliderShapeDef::Plane { .. } => ground_material.clone(),
            _ => prop_material.clone(),
        };
        commands.spawn((
            Name::new(format!("WorldStatic{}", def.id)),
            Mesh3d(meshes.add(static_mesh(&def.shape))),
            MeshMaterial3d(material),
            Transform {
                translation: to_vec3(&def.translation),
                rotation: to_quat(&def.rotation),
                scale: Vec3::ONE,
            },
        ));
    }

    // light
    commands.spawn((
        PointLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0),
    ));
}
