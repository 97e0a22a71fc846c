/*!
Boundary between the rig core and the session transport.

The transport owns connections, delivery and state authority. The core talks to
it through a narrow surface:

- [`InputHandler`]: the transport asks for one [`InputFrame`] per local
  participant per tick.
- [`SessionTransport`]: spawn requests, per-tick input lookup, state
  publication for observers, and a queue of [`SessionEvent`]s.

[`loopback`] provides an in-process implementation used by tests and the demo host.
*/

mod error;
pub mod loopback;

use crate::{
    pose::{Pose, Quat, Vec3},
    rig::{PlayerMoveSample, RigPoseSample, RigPoses},
};
use std::fmt;

pub use error::{SessionError, SessionResult};

/// Participant identity, stable for the lifetime of a session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerRef(pub u32);

impl fmt::Display for PlayerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player#{}", self.0)
    }
}

/// Spawned actor identity, assigned by the transport.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActorId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Actor#{}", self.0)
    }
}

/// What kind of actor a spawn request instantiates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ActorPrototype {
    /// Five-part VR rig driven by [`RigPoseSample`] input.
    Rig,
    /// Single-pose avatar driven by [`PlayerMoveSample`] input.
    Avatar,
}

/// Who simulates actors.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum AuthorityMode {
    /// The first participant holds state authority over every actor.
    #[default]
    Host,
    /// Every participant holds state authority over the actors it owns.
    Shared,
}

/// Authoritative state published for observers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ReplicatedState {
    Rig(RigPoses),
    Avatar(Pose),
}

/// One tick's input payload for one participant. Each handler fills its own slot.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputFrame {
    pub rig: Option<RigPoseSample>,
    pub movement: Option<PlayerMoveSample>,
}

impl InputFrame {
    pub fn is_empty(&self) -> bool {
        self.rig.is_none() && self.movement.is_none()
    }
}

/// Registered with the transport to be asked for input once per tick.
pub trait InputHandler {
    fn on_input(&mut self, input: &mut InputFrame);
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    PlayerJoined(PlayerRef),
    PlayerLeft(PlayerRef),
    /// The transport instantiated an actor; every participant creates its local copy.
    ActorSpawned {
        id: ActorId,
        prototype: ActorPrototype,
        owner: PlayerRef,
        pose: Pose,
    },
    ActorDespawned(ActorId),
    /// The session ended; no further events or spawns.
    Shutdown,
}

/// One participant's view of the session.
pub trait SessionTransport {
    fn local_player(&self) -> PlayerRef;

    /// Whether this participant simulates actors owned by `owner`.
    fn has_state_authority(&self, owner: PlayerRef) -> bool;

    fn request_spawn(
        &mut self,
        prototype: ActorPrototype,
        position: Vec3,
        rotation: Quat,
        owner: PlayerRef,
    ) -> SessionResult<ActorId>;

    fn despawn(&mut self, id: ActorId) -> SessionResult<()>;

    /// Input delivered for `player` this tick; `None` means it is missing.
    fn input(&self, player: PlayerRef) -> Option<&InputFrame>;

    /// Authority-side: make `state` visible to observers.
    fn publish_state(&mut self, id: ActorId, state: ReplicatedState) -> SessionResult<()>;

    /// Latest state the authority published for `id`.
    fn replicated_state(&self, id: ActorId) -> Option<&ReplicatedState>;

    fn poll_event(&mut self) -> Option<SessionEvent>;

    /// Length of one fixed simulation step in seconds.
    fn delta_time(&self) -> f32;

    fn tick(&self) -> u64;
}
