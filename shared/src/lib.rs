pub mod actor;
pub mod collider;
pub mod constants;
pub mod ground;
pub mod hardware;
pub mod locomotion;
pub mod node;
pub mod pose;
pub mod rig;
pub mod session;

pub use actor::{AvatarActor, NetworkActor, RigActor};
pub use collider::{ColliderShapeDef, WorldStaticDef, collider_from_def};
pub use constants::{
    DEFAULT_AVATAR_MOVE_SPEED, DEFAULT_FIXED_DT, DEFAULT_MOVEMENT_SPEED, DEFAULT_ROTATE_SPEED_DEG,
    GRAVITY_MPS2,
};
pub use ground::{FlatGround, GroundProbe, NoGround, StaticGround};
pub use hardware::{HardwareRig, TrackingFrame};
pub use locomotion::{AnalogInput, LocomotionController, LocomotionSettings};
pub use node::{NodeSettings, RigNode, SpawnArea, step_loopback};
pub use pose::{Pose, Quat, Vec2, Vec3};
pub use rig::{PlayerMoveSample, RigPart, RigPoseSample, RigPoses};
pub use session::{
    ActorId, ActorPrototype, AuthorityMode, InputFrame, InputHandler, PlayerRef,
    ReplicatedState, SessionError, SessionEvent, SessionResult, SessionTransport,
    loopback::{LoopbackConfig, LoopbackHub, LoopbackPeer},
};
