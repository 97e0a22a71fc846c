use crate::{
    convert::{from_transform, to_transform},
    session::Session,
};
use bevy::{platform::collections::HashMap, prelude::*, transform::TransformSystems};
use rig_shared::{ActorId, NetworkActor, Pose, RigPart};

pub(super) fn plugin(app: &mut App) {
    app.insert_resource(ActorEntityMapping::default());
    app.add_systems(
        PostUpdate,
        (sync_actor_entities, drive_visuals)
            .chain()
            .before(TransformSystems::Propagate)
            .run_if(resource_exists::<Session>),
    );
}

/// Ties a session actor to its bevy root entity.
#[derive(Resource, Default)]
pub struct ActorEntityMapping(pub HashMap<ActorId, Entity>);

/// One rendered part of a rig, or the single body of an avatar (`part: None`).
#[derive(Component, Clone, Copy, Debug)]
pub struct ActorVisual {
    pub actor: ActorId,
    pub part: Option<RigPart>,
}

/// Remote actors chase the latest replicated pose at this rate.
const REMOTE_DECAY_RATE: f32 = 12.0;

fn part_mesh(part: RigPart) -> Mesh {
    match part {
        RigPart::Headset => Sphere::new(0.12).into(),
        RigPart::Body => Capsule3d::new(0.18, 0.5).into(),
        RigPart::Character => Cylinder::new(0.3, 0.02).into(),
        RigPart::LeftHand | RigPart::RightHand => Cuboid::new(0.08, 0.08, 0.16).into(),
    }
}

fn sync_actor_entities(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    session: Res<Session>,
    mut mapping: ResMut<ActorEntityMapping>,
) {
    mapping.0.retain(|id, entity| {
        let alive = session.local.actor(*id).is_some();
        if !alive {
            commands.entity(*entity).despawn();
        }
        alive
    });

    for actor in session.local.actors() {
        let id = actor.id();
        if mapping.0.contains_key(&id) {
            continue;
        }

        let is_local = actor.owner() == session.local.player();
        let base_color = if is_local {
            Color::linear_rgb(0.2, 0.9, 0.8)
        } else {
            Color::linear_rgb(0.9, 0.2, 0.2)
        };
        let material = materials.add(StandardMaterial {
            base_color,
            ..default()
        });

        let mut root = commands.spawn((
            Name::new(format!("{id}")),
            Transform::default(),
            Visibility::default(),
        ));

        match actor {
            NetworkActor::Rig(rig) => {
                let show_head = rig.show_head_visuals();
                root.with_children(|parent| {
                    for (part, pose) in rig.poses().iter() {
                        let visibility = if part == RigPart::Headset && !show_head {
                            Visibility::Hidden
                        } else {
                            Visibility::Inherited
                        };
                        parent.spawn((
                            Name::new(part.name()),
                            ActorVisual {
                                actor: id,
                                part: Some(part),
                            },
                            Mesh3d(meshes.add(part_mesh(part))),
                            MeshMaterial3d(material.clone()),
                            to_transform(pose),
                            visibility,
                        ));
                    }
                });
            }
            NetworkActor::Avatar(avatar) => {
                root.with_children(|parent| {
                    parent.spawn((
                        Name::new("Avatar"),
                        ActorVisual {
                            actor: id,
                            part: None,
                        },
                        Mesh3d(meshes.add(Capsule3d::new(0.3, 1.0))),
                        MeshMaterial3d(material),
                        to_transform(avatar.pose()),
                    ));
                });
            }
        }

        info!("Spawned visuals for {id} ({})", if is_local { "local" } else { "remote" });
        mapping.0.insert(id, root.id());
    }
}

/// Local rigs show the live hardware pose as-is. Everything else is nudged toward the
/// replicated state so observers see smooth motion between fixed steps.
fn drive_visuals(
    time: Res<Time>,
    session: Res<Session>,
    mut visuals: Query<(&mut Transform, &ActorVisual)>,
) {
    let dt = time.delta_secs();

    for (mut transform, visual) in &mut visuals {
        let Some(actor) = session.local.actor(visual.actor) else {
            continue;
        };

        let (target, snap): (Pose, bool) = match (actor, visual.part) {
            (NetworkActor::Rig(rig), Some(part)) if rig.is_locally_owned() => {
                (*rig.interpolation_targets().get(part), true)
            }
            (NetworkActor::Rig(rig), Some(part)) => (*rig.pose(part), false),
            (NetworkActor::Avatar(avatar), None) => (*avatar.pose(), false),
            _ => continue,
        };

        let next = if snap {
            target
        } else {
            from_transform(&transform).nudge_toward(&target, REMOTE_DECAY_RATE, dt)
        };
        *transform = to_transform(&next);
    }
}
