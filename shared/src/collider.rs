use crate::pose::{Iso, Quat, Vec3};
use rapier3d::prelude::*;

/// Immutable piece of level geometry the locomotion ground probe can stand on.
#[derive(Clone, Debug)]
pub struct WorldStaticDef {
    pub id: u32,
    /// World-space translation.
    pub translation: Vec3,
    /// World-space rotation (unit quaternion).
    pub rotation: Quat,
    pub shape: ColliderShapeDef,
}

impl WorldStaticDef {
    /// Horizontal floor at `height` (an infinite half-space facing +Y).
    pub fn floor(id: u32, height: f32) -> Self {
        Self {
            id,
            translation: Vec3::new(0.0, height, 0.0),
            rotation: Quat::identity(),
            shape: ColliderShapeDef::Plane {
                offset_along_normal: 0.0,
            },
        }
    }
}

/// Supported static collider shapes (meters).
#[derive(Clone, Debug)]
pub enum ColliderShapeDef {
    /// Infinite plane (half-space). The normal is `rotation * +Y`.
    Plane { offset_along_normal: f32 },

    Cuboid { half_extents: Vec3 },

    Sphere { radius: f32 },

    /// Y-aligned capsule.
    CapsuleY { radius: f32, half_height: f32 },

    /// Y-aligned cylinder.
    CylinderY { radius: f32, half_height: f32 },
}

/// Build a rapier collider placed at the definition's world pose.
pub fn collider_from_def(def: &WorldStaticDef) -> Collider {
    let pose = Iso::from_parts(def.translation.into(), def.rotation);

    match &def.shape {
        ColliderShapeDef::Plane {
            offset_along_normal,
        } => {
            // Plane `n . x = dist` with n = R * +Y and dist = n . t + offset.
            let n = def.rotation * Vector::y();
            let dist = n.dot(&def.translation) + *offset_along_normal;
            let unit_n = UnitVector::new_normalize(n);

            ColliderBuilder::new(SharedShape::new(HalfSpace::new(unit_n)))
                .translation(unit_n.into_inner() * dist)
                .build()
        }

        ColliderShapeDef::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
                .position(pose)
                .build()
        }

        ColliderShapeDef::Sphere { radius } => ColliderBuilder::ball(*radius).position(pose).build(),

        ColliderShapeDef::CapsuleY {
            radius,
            half_height,
        } => ColliderBuilder::capsule_y(*half_height, *radius)
            .position(pose)
            .build(),

        ColliderShapeDef::CylinderY {
            radius,
            half_height,
        } => ColliderBuilder::cylinder(*half_height, *radius)
            .position(pose)
            .build(),
    }
}
