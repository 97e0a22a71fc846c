/*!
Rigid-body pose type and the math aliases shared by the rig modules.

A [`Pose`] is the unit every other module exchanges: hardware tracking, input
samples, authoritative actor state and interpolation targets are all built from
it. The orientation is always a unit quaternion; helpers that blend orientations
renormalize their result.
*/

use nalgebra as na;

/// Common math aliases for clarity and consistency.
pub type Vec2 = na::Vector2<f32>;
pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;

/// A rigid transform in world (or rig-local) space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    #[inline]
    pub fn identity() -> Self {
        Self::new(Vec3::zeros(), Quat::identity())
    }

    #[inline]
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::identity())
    }

    /// Convert to an nalgebra `Isometry3` (used for rapier queries and composition).
    #[inline]
    pub fn iso(&self) -> Iso {
        Iso::from_parts(
            na::Translation3::new(self.translation.x, self.translation.y, self.translation.z),
            self.rotation,
        )
    }

    /// Compose `self` (parent) with a pose expressed in the parent's local space.
    #[inline]
    pub fn compose(&self, local: &Pose) -> Pose {
        Pose {
            translation: self.translation + self.rotation * local.translation,
            rotation: renormalize(self.rotation * local.rotation),
        }
    }

    /// Rotate a local-space direction into this pose's frame.
    #[inline]
    pub fn transform_direction(&self, direction: &Vec3) -> Vec3 {
        self.rotation * direction
    }

    /// Blend toward `target` by `t` in `[0, 1]`: lerp on translation, slerp on rotation.
    pub fn interpolate(&self, target: &Pose, t: f32) -> Pose {
        let t = t.clamp(0.0, 1.0);
        let rotation = self
            .rotation
            .try_slerp(&target.rotation, t, 1.0e-6)
            .unwrap_or(target.rotation);

        Pose {
            translation: self.translation.lerp(&target.translation, t),
            rotation: renormalize(rotation),
        }
    }

    /// Frame-rate independent exponential smoothing toward `target`.
    ///
    /// `decay_rate` of 0 leaves the pose as-is; larger values converge faster.
    pub fn nudge_toward(&self, target: &Pose, decay_rate: f32, dt: f32) -> Pose {
        let t = 1.0 - (-decay_rate.max(0.0) * dt.max(0.0)).exp();
        self.interpolate(target, t)
    }

    /// True when every component is finite.
    pub fn is_finite(&self) -> bool {
        self.translation.iter().all(|c| c.is_finite())
            && self.rotation.coords.iter().all(|c| c.is_finite())
    }
}

/// Re-project a quaternion onto the unit sphere, guarding against drift after blending.
#[inline]
pub fn renormalize(q: Quat) -> Quat {
    Quat::new_normalize(q.into_inner())
}

/// Yaw-only rotation about +Y, in degrees.
#[inline]
pub fn yaw_degrees(degrees: f32) -> Quat {
    Quat::from_axis_angle(&Vec3::y_axis(), degrees.to_radians())
}
