use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of error codes the library itself ever emits (§6.3).
///
/// User code is free to wrap arbitrary payloads in [`super::ExtendedError`]
/// via `ExtendedError::custom`, but every code the *runtime* produces is one
/// of these variants, which keeps pattern matching exhaustive for callers
/// that only care about library-originated failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Graceful, expected shutdown (no failure).
    NormalShutdown,
    /// Shutdown reason supplied directly by supervisor-owning code.
    SupervisorDefined,
    /// A `request()` timed out before a reply arrived.
    RequestTimeout,
    /// A timer or request was explicitly cancelled.
    Cancelled,
    /// A link was attempted against a server that refuses new links.
    ActorNotLinkable,
    /// `register_name` was called with a name already present.
    AlreadyRegistered,
    /// `discovery_request` found no registration for the name.
    UnknownService,
    /// An actor escalated a failure to its supervisor (§4.4).
    FailureEscalation,
    /// An actor's configuration violates a documented precondition.
    ActorMisconfigured,
    /// A spawner's factory could not produce a usable actor.
    ActorNotSpawnable,
    /// A linked or supervised child went down, propagated to its parent/peer.
    ChildDown,
}

impl ErrorCode {
    /// Short machine-stable name, used by the default message stringifier
    /// and by log/monitoring event payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NormalShutdown => "normal_shutdown",
            ErrorCode::SupervisorDefined => "supervisor_defined",
            ErrorCode::RequestTimeout => "request_timeout",
            ErrorCode::Cancelled => "cancelled",
            ErrorCode::ActorNotLinkable => "actor_not_linkable",
            ErrorCode::AlreadyRegistered => "already_registered",
            ErrorCode::UnknownService => "unknown_service",
            ErrorCode::FailureEscalation => "failure_escalation",
            ErrorCode::ActorMisconfigured => "actor_misconfigured",
            ErrorCode::ActorNotSpawnable => "actor_not_spawnable",
            ErrorCode::ChildDown => "child_down",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_str_matches_display() {
        assert_eq!(ErrorCode::UnknownService.as_str(), "unknown_service");
        assert_eq!(ErrorCode::UnknownService.to_string(), "unknown_service");
    }
}
