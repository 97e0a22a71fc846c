use crate::{convert::to_transform, session::Session};
use bevy::{camera::Exposure, prelude::*, transform::TransformSystems};
use rig_shared::RigPart;
use std::f32::consts::PI;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, add_camera);
    app.add_systems(
        PostUpdate,
        follow_headset
            .before(TransformSystems::Propagate)
            .run_if(resource_exists::<Session>),
    );
}

const CAMERA_START: Vec3 = Vec3::new(0.0, 1.7, -3.0);

fn add_camera(mut commands: Commands) {
    commands.spawn((
        Exposure { ev100: 9.0 },
        bevy::core_pipeline::tonemapping::Tonemapping::AcesFitted,
        Camera3d::default(),
        Transform::from_translation(CAMERA_START).looking_at(Vec3::new(0.0, 1.7, 0.0), Vec3::Y),
        DistanceFog {
            color: Color::srgba(0.35, 0.48, 0.66, 1.0),
            directional_light_color: Color::srgba(1.0, 0.95, 0.85, 0.5),
            directional_light_exponent: 30.0,
            falloff: FogFalloff::from_visibility_colors(
                200.0, // Fog distance
                Color::srgb(0.35, 0.5, 0.66),
                Color::srgb(0.8, 0.8, 0.7),
            ),
        },
    ));
}

/// First-person view from the live local headset. Bevy cameras look down -Z while the
/// rig faces +Z, hence the half turn.
fn follow_headset(
    session: Res<Session>,
    mut camera: Single<&mut Transform, With<Camera3d>>,
) {
    let Some(hardware) = session.local.hardware() else {
        return;
    };

    let mut view = to_transform(&hardware.pose(RigPart::Headset));
    view.rotate_local_y(PI);
    **camera = view;
}
