use super::{ActorId, PlayerRef};
use thiserror::Error;

/// Failures reported by a session transport.
///
/// Missing input and unbound hardware are not errors; they are tolerated where they occur.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session has shut down")]
    Shutdown,

    #[error("Unknown player: {0}")]
    UnknownPlayer(PlayerRef),

    #[error("Unknown actor: {0}")]
    UnknownActor(ActorId),

    #[error("{player} does not hold state authority over {actor}")]
    NotAuthority { actor: ActorId, player: PlayerRef },
}

pub type SessionResult<T> = Result<T, SessionError>;
