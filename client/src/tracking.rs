//! Desktop stand-in for headset and controller tracking.
//!
//! Produces rig-local poses for a standing user with a slight idle sway, so
//! the replicated rig has something to show without XR hardware attached.

use rig_shared::{Pose, TrackingFrame, Vec3, pose::yaw_degrees};

const HEAD_HEIGHT: f32 = 1.7;
const BODY_HEIGHT: f32 = 1.1;
const HAND_HEIGHT: f32 = 1.0;
const HAND_SPREAD: f32 = 0.25;
const HAND_REACH: f32 = 0.35;

pub fn stand_in_frame(elapsed_secs: f32) -> TrackingFrame {
    let sway = (elapsed_secs * 1.3).sin();
    let bob = (elapsed_secs * 2.1).sin() * 0.03;

    TrackingFrame {
        headset: Some(Pose::new(
            Vec3::new(0.0, HEAD_HEIGHT + bob * 0.3, 0.0),
            yaw_degrees(sway * 4.0),
        )),
        body: Some(Pose::from_translation(Vec3::new(0.0, BODY_HEIGHT, 0.0))),
        left_hand: Some(Pose::from_translation(Vec3::new(
            HAND_SPREAD,
            HAND_HEIGHT + bob,
            HAND_REACH,
        ))),
        right_hand: Some(Pose::from_translation(Vec3::new(
            -HAND_SPREAD,
            HAND_HEIGHT - bob,
            HAND_REACH,
        ))),
    }
}
