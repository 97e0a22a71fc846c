//! nalgebra (rig core) to glam (bevy) at the render boundary.

use bevy::prelude::*;
use nalgebra as na;
use rig_shared::Pose;

pub fn to_vec3(v: &rig_shared::Vec3) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

pub fn to_quat(q: &rig_shared::Quat) -> Quat {
    let c = q.coords;
    Quat::from_xyzw(c.x, c.y, c.z, c.w)
}

pub fn to_transform(pose: &Pose) -> Transform {
    Transform {
        translation: to_vec3(&pose.translation),
        rotation: to_quat(&pose.rotation),
        scale: Vec3::ONE,
    }
}

pub fn from_transform(transform: &Transform) -> Pose {
    let t = transform.translation;
    let r = transform.rotation;
    Pose::new(
        rig_shared::Vec3::new(t.x, t.y, t.z),
        na::UnitQuaternion::new_normalize(na::Quaternion::new(r.w, r.x, r.y, r.z)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rig_shared::pose::yaw_degrees;

    #[test]
    fn pose_survives_the_boundary() {
        let pose = Pose::new(rig_shared::Vec3::new(1.0, 2.0, -3.0), yaw_degrees(30.0));
        let back = from_transform(&to_transform(&pose));

        assert!((back.translation - pose.translation).norm() < 1.0e-6);
        assert!(back.rotation.angle_to(&pose.rotation) < 1.0e-5);
    }

    #[test]
    fn yaw_maps_to_the_same_rotation() {
        let q = to_quat(&yaw_degrees(90.0));
        let forward = q * Vec3::Z;
        assert!((forward - Vec3::X).length() < 1.0e-5);
    }
}
