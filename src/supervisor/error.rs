use thiserror::Error;

use crate::util::{ActorId, AddressId};

/// Failure modes a supervisor's own operations can raise (§7 "Programming
/// errors" and protocol-adjacent failures that don't carry an
/// [`crate::error::ExtendedError`] chain of their own).
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("address {0:?} is not owned by this supervisor")]
    ForeignAddress(AddressId),

    #[error("actor {0:?} is not a child of this supervisor")]
    UnknownChild(ActorId),

    #[error("cannot enqueue: supervisor already shut down")]
    AlreadyShutDown,

    #[error("inbound queue disconnected")]
    InboundDisconnected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_readable_message() {
        let err = SupervisorError::AlreadyShutDown;
        assert_eq!(err.to_string(), "cannot enqueue: supervisor already shut down");
    }
}
