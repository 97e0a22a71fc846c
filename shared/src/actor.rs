/*!
Replicated actors and their per-tick update rules.

- [`RigActor`]: five-part VR rig. The authority overwrites its poses from the
  owner's latest [`RigPoseSample`] each fixed step; the owning client copies its
  live hardware pose into the interpolation targets each render frame.
- [`AvatarActor`]: single-pose avatar moved by a [`PlayerMoveSample`].

Neither validates the physical plausibility of incoming input. The sampling
client is trusted.
*/

use crate::{
    hardware::HardwareRig,
    pose::Pose,
    rig::{PlayerMoveSample, RigPart, RigPoseSample, RigPoses},
    session::{ActorId, ActorPrototype, PlayerRef, ReplicatedState},
};

#[derive(Clone, Debug)]
pub struct RigActor {
    id: ActorId,
    owner: PlayerRef,
    is_locally_owned: bool,
    /// Authoritative, replicated state.
    poses: RigPoses,
    /// Render-only targets, updated independently of the fixed step.
    interpolation_targets: RigPoses,
}

impl RigActor {
    pub fn new(id: ActorId, owner: PlayerRef, is_locally_owned: bool, spawn: Pose) -> Self {
        let poses = RigPoses::uniform(spawn);
        Self {
            id,
            owner,
            is_locally_owned,
            poses,
            interpolation_targets: poses,
        }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn owner(&self) -> PlayerRef {
        self.owner
    }

    pub fn is_locally_owned(&self) -> bool {
        self.is_locally_owned
    }

    /// The owner does not render its own head; it would fill the headset view.
    pub fn show_head_visuals(&self) -> bool {
        !self.is_locally_owned
    }

    pub fn poses(&self) -> &RigPoses {
        &self.poses
    }

    pub fn pose(&self, part: RigPart) -> &Pose {
        self.poses.get(part)
    }

    pub fn interpolation_targets(&self) -> &RigPoses {
        &self.interpolation_targets
    }

    pub fn interpolation_targets_mut(&mut self) -> &mut RigPoses {
        &mut self.interpolation_targets
    }

    /// Authority-side fixed step. Missing input leaves the state untouched.
    ///
    /// Returns whether the authoritative state was written.
    pub fn apply_step(&mut self, input: Option<&RigPoseSample>) -> bool {
        let Some(sample) = input else {
            return false;
        };
        self.poses = *sample.poses();
        true
    }

    /// Observer-side: adopt the state the authority replicated.
    pub fn apply_replicated(&mut self, poses: &RigPoses) {
        self.poses = *poses;
    }

    /// Per render frame. For the owning client, mirror the live hardware rig so its own
    /// body has no fixed-step latency. Remote rigs and unbound hardware are skipped.
    pub fn apply_render_frame(&mut self, hardware: Option<&HardwareRig>) {
        if !self.is_locally_owned {
            return;
        }
        let Some(hardware) = hardware else {
            return;
        };

        for part in RigPart::ALL {
            *self.interpolation_targets.get_mut(part) = hardware.pose(part);
        }
    }
}

#[derive(Clone, Debug)]
pub struct AvatarActor {
    id: ActorId,
    owner: PlayerRef,
    is_locally_owned: bool,
    pose: Pose,
    pub move_speed: f32,
}

impl AvatarActor {
    pub fn new(
        id: ActorId,
        owner: PlayerRef,
        is_locally_owned: bool,
        spawn: Pose,
        move_speed: f32,
    ) -> Self {
        Self {
            id,
            owner,
            is_locally_owned,
            pose: spawn,
            move_speed,
        }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn owner(&self) -> PlayerRef {
        self.owner
    }

    pub fn is_locally_owned(&self) -> bool {
        self.is_locally_owned
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// Authority-side fixed step: translate along `direction` in the avatar's own frame.
    pub fn apply_step(&mut self, input: Option<&PlayerMoveSample>, dt: f32) -> bool {
        let Some(sample) = input else {
            return false;
        };
        if !sample.direction.iter().all(|c| c.is_finite()) {
            return false;
        }

        let local = sample.direction * dt * self.move_speed;
        self.pose.translation += self.pose.rotation * local;
        true
    }

    pub fn apply_replicated(&mut self, pose: &Pose) {
        self.pose = *pose;
    }
}

/// Any actor the session can spawn.
#[derive(Clone, Debug)]
pub enum NetworkActor {
    Rig(RigActor),
    Avatar(AvatarActor),
}

impl NetworkActor {
    pub fn id(&self) -> ActorId {
        match self {
            NetworkActor::Rig(rig) => rig.id(),
            NetworkActor::Avatar(avatar) => avatar.id(),
        }
    }

    pub fn owner(&self) -> PlayerRef {
        match self {
            NetworkActor::Rig(rig) => rig.owner(),
            NetworkActor::Avatar(avatar) => avatar.owner(),
        }
    }

    pub fn prototype(&self) -> ActorPrototype {
        match self {
            NetworkActor::Rig(_) => ActorPrototype::Rig,
            NetworkActor::Avatar(_) => ActorPrototype::Avatar,
        }
    }

    /// Snapshot of the authoritative state for replication.
    pub fn replicated_state(&self) -> ReplicatedState {
        match self {
            NetworkActor::Rig(rig) => ReplicatedState::Rig(*rig.poses()),
            NetworkActor::Avatar(avatar) => ReplicatedState::Avatar(*avatar.pose()),
        }
    }

    /// Adopt replicated state. Mismatched kinds are ignored.
    pub fn apply_replicated(&mut self, state: &ReplicatedState) {
        match (self, state) {
            (NetworkActor::Rig(rig), ReplicatedState::Rig(poses)) => rig.apply_replicated(poses),
            (NetworkActor::Avatar(avatar), ReplicatedState::Avatar(pose)) => {
                avatar.apply_replicated(pose)
            }
            (actor, _) => log::warn!(
                "Replicated state kind does not match actor {:?}",
                actor.id()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        hardware::TrackingFrame,
        pose::{Vec3, yaw_degrees},
    };
    use approx::assert_relative_eq;

    fn sample_from(seed: f32) -> RigPoseSample {
        let mut poses = RigPoses::default();
        for (i, part) in RigPart::ALL.into_iter().enumerate() {
            let i = i as f32;
            *poses.get_mut(part) = Pose::new(
                Vec3::new(seed + i, seed * 0.5 - i, 0.125 * i),
                yaw_degrees(seed * 7.0 + i * 11.0),
            );
        }
        RigPoseSample::new(poses)
    }

    fn rig_actor(is_locally_owned: bool) -> RigActor {
        RigActor::new(ActorId(1), PlayerRef(1), is_locally_owned, Pose::identity())
    }

    #[test]
    fn step_copies_sample_bit_for_bit() {
        let mut actor = rig_actor(false);
        let sample = sample_from(3.25);

        assert!(actor.apply_step(Some(&sample)));

        for part in RigPart::ALL {
            let applied = actor.pose(part);
            let sampled = sample.pose(part);
            assert_eq!(applied.translation, sampled.translation);
            assert_eq!(applied.rotation.coords, sampled.rotation.coords);
        }
    }

    #[test]
    fn step_is_idempotent() {
        let sample = sample_from(-1.5);
        let mut once = rig_actor(false);
        let mut twice = rig_actor(false);

        once.apply_step(Some(&sample));
        twice.apply_step(Some(&sample));
        twice.apply_step(Some(&sample));

        assert_eq!(once.poses(), twice.poses());
    }

    #[test]
    fn missing_input_leaves_state_unchanged() {
        let mut actor = rig_actor(false);
        actor.apply_step(Some(&sample_from(2.0)));
        let before = *actor.poses();

        assert!(!actor.apply_step(None));
        assert_eq!(actor.poses(), &before);
    }

    #[test]
    fn render_frame_mirrors_live_hardware_for_local_rig() {
        let mut actor = rig_actor(true);
        // A committed, now stale, network state.
        actor.apply_step(Some(&sample_from(9.0)));

        let mut hardware = HardwareRig::new(Pose::from_translation(Vec3::new(4.0, 0.0, -1.0)));
        hardware.apply_tracking(&TrackingFrame {
            headset: Some(Pose::from_translation(Vec3::new(0.0, 1.8, 0.0))),
            left_hand: Some(Pose::from_translation(Vec3::new(-0.2, 1.1, 0.4))),
            ..TrackingFrame::default()
        });

        actor.apply_render_frame(Some(&hardware));
        for part in RigPart::ALL {
            assert_eq!(*actor.interpolation_targets().get(part), hardware.pose(part));
        }

        // Hardware moves again before any fixed step runs.
        hardware.character_mut().translation.x += 1.0;
        actor.apply_render_frame(Some(&hardware));
        assert_eq!(
            actor.interpolation_targets().character,
            hardware.pose(RigPart::Character)
        );
        assert_ne!(actor.interpolation_targets().character, actor.poses().character);
    }

    #[test]
    fn render_frame_is_noop_for_remote_rig_or_missing_hardware() {
        let hardware = HardwareRig::new(Pose::from_translation(Vec3::new(7.0, 0.0, 7.0)));

        let mut remote = rig_actor(false);
        let before = *remote.interpolation_targets();
        remote.apply_render_frame(Some(&hardware));
        assert_eq!(remote.interpolation_targets(), &before);

        let mut unbound = rig_actor(true);
        let before = *unbound.interpolation_targets();
        unbound.apply_render_frame(None);
        assert_eq!(unbound.interpolation_targets(), &before);
    }

    #[test]
    fn head_visuals_hidden_only_for_owner() {
        assert!(!rig_actor(true).show_head_visuals());
        assert!(rig_actor(false).show_head_visuals());
    }

    #[test]
    fn avatar_translates_in_its_local_frame() {
        let spawn = Pose::new(Vec3::new(1.0, 0.5, 1.0), yaw_degrees(90.0));
        let mut avatar = AvatarActor::new(ActorId(2), PlayerRef(1), false, spawn, 4.0);

        let input = PlayerMoveSample {
            direction: Vec3::new(0.0, 0.0, 1.0),
        };
        assert!(avatar.apply_step(Some(&input), 0.5));

        // Local +Z under a 90 degree yaw is world +X; 0.5 s at 4 m/s is 2 m.
        assert_relative_eq!(
            avatar.pose().translation,
            Vec3::new(3.0, 0.5, 1.0),
            epsilon = 1.0e-5
        );

        let before = *avatar.pose();
        assert!(!avatar.apply_step(None, 0.5));
        assert_eq!(*avatar.pose(), before);
    }

    #[test]
    fn replicated_state_round_trips_through_network_actor() {
        let mut authority = NetworkActor::Rig(rig_actor(false));
        if let NetworkActor::Rig(rig) = &mut authority {
            rig.apply_step(Some(&sample_from(5.0)));
        }
        let mut observer = NetworkActor::Rig(rig_actor(false));

        observer.apply_replicated(&authority.replicated_state());

        assert_eq!(observer.replicated_state(), authority.replicated_state());
    }

    #[test]
    fn mismatched_replicated_state_is_ignored() {
        let mut actor = NetworkActor::Rig(rig_actor(false));
        let before = actor.replicated_state();

        actor.apply_replicated(&ReplicatedState::Avatar(Pose::from_translation(Vec3::new(
            1.0, 2.0, 3.0,
        ))));

        assert_eq!(actor.replicated_state(), before);
    }
}
