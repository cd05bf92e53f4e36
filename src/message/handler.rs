use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::envelope::Envelope;
use crate::error::ExtendedError;
use crate::util::{ActorId, Rc};

/// A tag that upgrades a handler with extra delivery semantics (§4.1).
///
/// The original ships only one (`tags::io`, a hint that the backend may
/// need to run the handler off the hot loop / treat it as blocking-capable);
/// the type is kept open (`#[non_exhaustive]`-style via a private variant
/// would block user extension, so instead we model it as a bitset-friendly
/// enum and let `Handler` carry a small `Vec` of them) so embedding crates
/// can define their own tags without forking this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerTag {
    /// The handler may block or run long; see §4.3's chunked-continuation
    /// pattern for how the SHA-512 example handles this without suspending.
    Io,
}

/// Identity of a handler for table lookups and equality (§3 "Handler").
///
/// Two handlers are the same subscription iff both the owning actor and the
/// message type match -- *not* the concrete closure, matching the original
/// runtime's
/// `hash(actor_addr) XOR (hash(handler_type) << 1)` (§3) scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerKey {
    pub actor: ActorId,
    pub type_id: TypeId,
}

impl Hash for HandlerKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Mirrors the source's `hash(actor) XOR (hash(type) << 1)` formula
        // rather than hashing the fields independently, so two handlers
        // that the spec calls equal also collide identically under this
        // hasher (a cosmetic fidelity point, not a correctness requirement
        // -- `PartialEq` alone governs correctness).
        use std::collections::hash_map::DefaultHasher;
        let mut actor_hasher = DefaultHasher::new();
        self.actor.hash(&mut actor_hasher);
        let mut type_hasher = DefaultHasher::new();
        self.type_id.hash(&mut type_hasher);
        let combined = actor_hasher.finish() ^ (type_hasher.finish() << 1);
        combined.hash(state);
    }
}

/// `(actor_ref, message_type_id, invoker)` (§3, §4.1).
///
/// The `invoke` closure is produced by the subscribing plugin/actor at
/// subscribe time; it typically closes over an `Rc<RefCell<..>>` to the
/// actor's own state so invocation can reach back into `&mut self` despite
/// the handler having been type-erased into the subscription table. This is
/// the Rust stand-in for the original's pointer-to-member-function handler
/// (`handler.hpp`): heterogeneous, runtime-dispatched callables are
/// unavoidable here because the table holds handlers for many unrelated
/// actor/payload type combinations at once (§9: "Dynamic-dispatch plugin
/// list via virtual methods -> a polymorphic-over-capability-set trait").
#[derive(Clone)]
pub struct Handler {
    key: HandlerKey,
    type_name: &'static str,
    tags: Vec<HandlerTag>,
    invoke: Rc<dyn Fn(&Envelope) -> Result<(), ExtendedError>>,
}

impl Handler {
    pub fn new<F>(actor: ActorId, type_id: TypeId, type_name: &'static str, invoke: F) -> Self
    where
        F: Fn(&Envelope) -> Result<(), ExtendedError> + 'static,
    {
        Self {
            key: HandlerKey { actor, type_id },
            type_name,
            tags: Vec::new(),
            invoke: Rc::new(invoke),
        }
    }

    /// Upgrade this handler with a tag. Transparent for equality: the
    /// returned handler still compares equal to the original under
    /// `PartialEq` (§4.1 "Upgraded handlers ... are transparent for
    /// equality").
    pub fn tagged(mut self, tag: HandlerTag) -> Self {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    pub fn has_tag(&self, tag: HandlerTag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn key(&self) -> HandlerKey {
        self.key
    }

    pub fn actor(&self) -> ActorId {
        self.key.actor
    }

    pub fn type_id(&self) -> TypeId {
        self.key.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn invoke(&self, envelope: &Envelope) -> Result<(), ExtendedError> {
        (self.invoke)(envelope)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("actor", &self.key.actor)
            .field("type_name", &self.type_name)
            .field("tags", &self.tags)
            .finish()
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Handler {}

impl Hash for Handler {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state)
    }
}
