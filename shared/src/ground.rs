/*!
Grounding checks for the locomotion controller.

The controller only needs one question answered: how far below a point is the
nearest walkable surface, if any within range. [`StaticGround`] answers it with
a rapier ray cast against the static level colliders; the lightweight probes are
for flat test levels and free fall.
*/

use crate::{
    collider::{WorldStaticDef, collider_from_def},
    pose::Vec3,
};
use rapier3d::prelude::{
    BroadPhaseBvh, ColliderSet, IntegrationParameters, NarrowPhase, QueryFilter, QueryPipeline,
    Ray, RigidBodySet,
};

/// Height above the probed point the downward ray starts from, so a root resting
/// exactly on a surface still registers the hit.
const RAY_LIFT: f32 = 0.1;

pub trait GroundProbe {
    /// Distance from `position` down to the nearest surface, if one lies within `max_distance`.
    ///
    /// Returns `0.0` when `position` is on or slightly inside the surface.
    fn ground_distance(&self, position: &Vec3, max_distance: f32) -> Option<f32>;
}

/// No ground anywhere: the rig is always airborne.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoGround;

impl GroundProbe for NoGround {
    fn ground_distance(&self, _position: &Vec3, _max_distance: f32) -> Option<f32> {
        None
    }
}

/// Infinite horizontal floor at `height`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlatGround {
    pub height: f32,
}

impl GroundProbe for FlatGround {
    fn ground_distance(&self, position: &Vec3, max_distance: f32) -> Option<f32> {
        let above = position.y - self.height;
        if above < -RAY_LIFT || above > max_distance.max(0.0) {
            return None;
        }
        Some(above.max(0.0))
    }
}

/// Static level geometry held in a rapier broad phase for scene queries.
pub struct StaticGround {
    bodies: RigidBodySet,
    colliders: ColliderSet,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
}

impl StaticGround {
    pub fn build(world_statics: impl IntoIterator<Item = WorldStaticDef>) -> Self {
        let bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();
        let mut modified_colliders = Vec::new();

        for def in world_statics {
            let handle = colliders.insert(collider_from_def(&def));
            modified_colliders.push(handle);
        }

        let mut broad_phase = BroadPhaseBvh::new();
        let mut events = Vec::new();
        broad_phase.update(
            &IntegrationParameters::default(),
            &colliders,
            &bodies,
            &modified_colliders,
            &[],
            &mut events,
        );
        log::info!("Built static ground with {} colliders", colliders.len());

        Self {
            bodies,
            colliders,
            broad_phase,
            narrow_phase: NarrowPhase::default(),
        }
    }

    fn query_pipeline(&self) -> QueryPipeline<'_> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            QueryFilter::only_fixed(),
        )
    }
}

impl GroundProbe for StaticGround {
    fn ground_distance(&self, position: &Vec3, max_distance: f32) -> Option<f32> {
        let origin = position + Vec3::new(0.0, RAY_LIFT, 0.0);
        let ray = Ray::new(origin.into(), -Vec3::y());
        let max_toi = RAY_LIFT + max_distance.max(0.0);

        self.query_pipeline()
            .cast_ray(&ray, max_toi, true)
            .map(|(_handle, toi)| (toi - RAY_LIFT).max(0.0))
    }
}
