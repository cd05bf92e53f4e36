// Layer 1: Standard library imports
use std::fmt;

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Globally-unique identifier for an actor.
///
/// Actors are identified by a random v4 UUID rather than a pointer or slab
/// index: addresses and actor identity must remain stable and comparable
/// even across process boundaries in a future networked build (Non-goal for
/// this crate, but the id format should not foreclose it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(Uuid);

impl ActorId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for a single message instance. Not used for routing (the
/// `(address, type_id)` pair does that) -- used by monitoring events and by
/// the message stringifier to correlate log lines with a specific message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for a single [`crate::address::Address`].
///
/// An actor owns one or more addresses (its "main" address plus any
/// plugin-created virtual addresses, §3); each is a distinct subscription
/// point even though they resolve to the same owning actor, so address
/// identity needs its own id rather than reusing `ActorId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressId(Uuid);

impl AddressId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AddressId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AddressId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A request/response correlation id.
///
/// Unlike `ActorId`/`MessageId`, this is **not** a UUID: §4.5 requires a
/// per-supervisor *monotonic* generator (P4: "every request-id ever issued
/// by supervisor S is unique within S's lifetime"), so a request id is only
/// meaningful relative to the supervisor that issued it. `RequestCorrelator`
/// owns the counter; this type is just the newtype wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(u64);

impl RequestId {
    pub(crate) fn from_raw(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req#{}", self.0)
    }
}
