/*!
Local hardware rig: the live transforms of the participant on this machine.

The character root lives in world space and is driven by locomotion. The four
tracked points (headset, body anchor, hands) are reported by the tracking system
in rig-local (stage) space and follow the root, so their world poses are
`root * local`.

Tracking may not report every device every frame; a missing report keeps the
last known local pose. Sampling never fails.
*/

use crate::{
    pose::Pose,
    rig::{RigPart, RigPoseSample, RigPoses},
};

/// One tracking update. `None` means "no fresh data for this device".
#[derive(Clone, Copy, Debug, Default)]
pub struct TrackingFrame {
    pub headset: Option<Pose>,
    pub body: Option<Pose>,
    pub left_hand: Option<Pose>,
    pub right_hand: Option<Pose>,
}

#[derive(Clone, Debug, Default)]
pub struct HardwareRig {
    character: Pose,
    headset: Pose,
    body: Pose,
    left_hand: Pose,
    right_hand: Pose,
}

impl HardwareRig {
    pub fn new(character: Pose) -> Self {
        Self {
            character,
            ..Self::default()
        }
    }

    /// World pose of the locomotion root.
    pub fn character(&self) -> &Pose {
        &self.character
    }

    pub fn character_mut(&mut self) -> &mut Pose {
        &mut self.character
    }

    /// Rig-local pose of a tracked part. The character root is its own frame (identity).
    pub fn local_pose(&self, part: RigPart) -> Pose {
        match part {
            RigPart::Headset => self.headset,
            RigPart::Body => self.body,
            RigPart::Character => Pose::identity(),
            RigPart::LeftHand => self.left_hand,
            RigPart::RightHand => self.right_hand,
        }
    }

    /// Live world pose of a part at the moment of the call.
    pub fn pose(&self, part: RigPart) -> Pose {
        match part {
            RigPart::Character => self.character,
            _ => self.character.compose(&self.local_pose(part)),
        }
    }

    /// Merge a tracking update, keeping the last known pose for unreported devices.
    pub fn apply_tracking(&mut self, frame: &TrackingFrame) {
        let updates = [
            (&mut self.headset, frame.headset),
            (&mut self.body, frame.body),
            (&mut self.left_hand, frame.left_hand),
            (&mut self.right_hand, frame.right_hand),
        ];

        for (slot, update) in updates {
            if let Some(pose) = update.filter(Pose::is_finite) {
                *slot = pose;
            }
        }
    }

    /// Current world poses of all five parts.
    pub fn poses(&self) -> RigPoses {
        RigPoses {
            headset: self.pose(RigPart::Headset),
            body: self.pose(RigPart::Body),
            character: self.pose(RigPart::Character),
            left_hand: self.pose(RigPart::LeftHand),
            right_hand: self.pose(RigPart::RightHand),
        }
    }

    /// Package the live rig for one input-collection tick.
    pub fn sample(&self) -> RigPoseSample {
        RigPoseSample::new(self.poses())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{Vec3, yaw_degrees};
    use approx::assert_relative_eq;

    fn tracked_rig() -> HardwareRig {
        let mut rig = HardwareRig::new(Pose::from_translation(Vec3::new(10.0, 0.0, 0.0)));
        rig.apply_tracking(&TrackingFrame {
            headset: Some(Pose::from_translation(Vec3::new(0.0, 1.7, 0.0))),
            body: Some(Pose::from_translation(Vec3::new(0.0, 1.2, 0.0))),
            left_hand: Some(Pose::from_translation(Vec3::new(-0.3, 1.0, 0.3))),
            right_hand: Some(Pose::from_translation(Vec3::new(0.3, 1.0, 0.3))),
        });
        rig
    }

    #[test]
    fn tracked_parts_follow_the_character_root() {
        let mut rig = tracked_rig();
        assert_relative_eq!(
            rig.pose(RigPart::Headset).translation,
            Vec3::new(10.0, 1.7, 0.0)
        );

        rig.character_mut().rotation = yaw_degrees(90.0);
        // Local +Z of the hand now points along world +X.
        assert_relative_eq!(
            rig.pose(RigPart::RightHand).translation,
            Vec3::new(10.3, 1.0, -0.3),
            epsilon = 1.0e-5
        );
    }

    #[test]
    fn missing_tracking_keeps_last_known_pose() {
        let mut rig = tracked_rig();
        let before = rig.sample();

        rig.apply_tracking(&TrackingFrame {
            headset: Some(Pose::from_translation(Vec3::new(0.0, 1.6, 0.1))),
            ..TrackingFrame::default()
        });
        let after = rig.sample();

        assert_ne!(after.pose(RigPart::Headset), before.pose(RigPart::Headset));
        assert_eq!(after.pose(RigPart::Body), before.pose(RigPart::Body));
        assert_eq!(after.pose(RigPart::LeftHand), before.pose(RigPart::LeftHand));
        assert_eq!(after.pose(RigPart::RightHand), before.pose(RigPart::RightHand));
    }

    #[test]
    fn non_finite_tracking_is_ignored() {
        let mut rig = tracked_rig();
        let before = rig.sample();

        rig.apply_tracking(&TrackingFrame {
            left_hand: Some(Pose::from_translation(Vec3::new(f32::INFINITY, 0.0, 0.0))),
            ..TrackingFrame::default()
        });

        assert_eq!(rig.sample(), before);
    }

    #[test]
    fn sample_matches_live_poses_and_has_no_side_effects() {
        let rig = tracked_rig();
        let first = rig.sample();
        let second = rig.sample();

        assert_eq!(first, second);
        for part in RigPart::ALL {
            assert_eq!(*first.pose(part), rig.pose(part));
        }
    }
}
