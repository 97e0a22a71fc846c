use crate::pose::{Pose, Vec2, Vec3};

/// The five tracked points that make up a participant's rig.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RigPart {
    Headset,
    Body,
    Character,
    LeftHand,
    RightHand,
}

impl RigPart {
    pub const ALL: [RigPart; 5] = [
        RigPart::Headset,
        RigPart::Body,
        RigPart::Character,
        RigPart::LeftHand,
        RigPart::RightHand,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RigPart::Headset => "headset",
            RigPart::Body => "body",
            RigPart::Character => "character",
            RigPart::LeftHand => "left_hand",
            RigPart::RightHand => "right_hand",
        }
    }
}

/// One pose per [`RigPart`].
///
/// Used for the authoritative replicated state of a rig as well as for its
/// interpolation targets.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RigPoses {
    pub headset: Pose,
    pub body: Pose,
    pub character: Pose,
    pub left_hand: Pose,
    pub right_hand: Pose,
}

impl RigPoses {
    /// All five parts at the same pose.
    pub fn uniform(pose: Pose) -> Self {
        Self {
            headset: pose,
            body: pose,
            character: pose,
            left_hand: pose,
            right_hand: pose,
        }
    }

    pub fn get(&self, part: RigPart) -> &Pose {
        match part {
            RigPart::Headset => &self.headset,
            RigPart::Body => &self.body,
            RigPart::Character => &self.character,
            RigPart::LeftHand => &self.left_hand,
            RigPart::RightHand => &self.right_hand,
        }
    }

    pub fn get_mut(&mut self, part: RigPart) -> &mut Pose {
        match part {
            RigPart::Headset => &mut self.headset,
            RigPart::Body => &mut self.body,
            RigPart::Character => &mut self.character,
            RigPart::LeftHand => &mut self.left_hand,
            RigPart::RightHand => &mut self.right_hand,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (RigPart, &Pose)> {
        RigPart::ALL.into_iter().map(move |part| (part, self.get(part)))
    }
}

/// Snapshot of a local rig taken for one input-collection tick.
///
/// Immutable once built; the input frame takes ownership of it for transmission.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RigPoseSample {
    poses: RigPoses,
}

impl RigPoseSample {
    pub fn new(poses: RigPoses) -> Self {
        Self { poses }
    }

    pub fn poses(&self) -> &RigPoses {
        &self.poses
    }

    pub fn pose(&self, part: RigPart) -> &Pose {
        self.poses.get(part)
    }
}

/// Movement input for the simple (non-VR) avatar.
///
/// The direction is not normalized; a zero vector means no movement this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerMoveSample {
    pub direction: Vec3,
}

impl PlayerMoveSample {
    /// Build from a 2-D move axis: `(x, y)` maps to `(x, 0, y)`.
    pub fn from_axis(axis: Vec2) -> Self {
        let axis = if axis.iter().all(|c| c.is_finite()) {
            axis
        } else {
            Vec2::zeros()
        };

        Self {
            direction: Vec3::new(axis.x, 0.0, axis.y),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.direction == Vec3::zeros()
    }
}
