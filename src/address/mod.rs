//! [`Address`]: the identity and delivery anchor actors send to and
//! subscribe on (§3, §4.1). Addresses are only ever minted by a supervisor
//! (or its address-maker plugin, §4.4 step 1); this module intentionally
//! exposes no public constructor for that reason.

mod locality;

pub use locality::LocalityToken;

use std::fmt;
use std::sync::mpsc::Sender;

use parking_lot::Mutex;

use crate::message::Envelope;
use crate::util::{ActorId, AddressId, Rc};

/// Notifies a [`crate::backend::Backend`] that its supervisor's inbound
/// queue just received something, so a blocked `run()` loop wakes up (§6.1
/// `wake()`).
///
/// Every clone of a [`SupervisorHandle`] shares one `Waker`, so installing
/// the real notifier once (when a backend starts driving a supervisor, via
/// `Core::set_waker`) reaches every address already minted from it. Before a
/// backend is attached, `notify` is a no-op -- the supervisor is being
/// driven synchronously (e.g. by tests calling `run_until_idle` directly)
/// and has nothing to wake.
#[derive(Clone, Default)]
pub struct Waker(Rc<Mutex<Option<Rc<dyn Fn() + Send + Sync>>>>);

impl Waker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, notify: Rc<dyn Fn() + Send + Sync>) {
        *self.0.lock() = Some(notify);
    }

    pub fn notify(&self) {
        if let Some(notify) = self.0.lock().as_ref() {
            notify();
        }
    }
}

/// The sending half of a supervisor's inbound cross-locality queue.
///
/// In the original C++ runtime an `address_t` carries a raw reference back
/// to its owning `supervisor_t` (a non-owning pointer, because the
/// supervisor is guaranteed to outlive every address it minted). Rust has
/// no equivalent of "trust me, this outlives that" raw references across an
/// owning boundary without `unsafe`; holding a cloned channel `Sender`
/// instead sidesteps the whole lifetime question; delivering to a
/// dead/shut-down supervisor just fails the `send` with a disconnected
/// error rather than dangling.
#[derive(Clone)]
pub struct SupervisorHandle {
    pub(crate) inbound: Sender<Envelope>,
    waker: Waker,
}

impl SupervisorHandle {
    pub(crate) fn new(inbound: Sender<Envelope>) -> Self {
        Self {
            inbound,
            waker: Waker::new(),
        }
    }

    pub(crate) fn with_waker(inbound: Sender<Envelope>, waker: Waker) -> Self {
        Self { inbound, waker }
    }

    /// Push an envelope onto the owning supervisor's inbound queue and
    /// notify its backend (§4.3, §6.1 `wake()`). A backend still decides
    /// how promptly it reacts (coalescing, `poll_duration`) -- this only
    /// guarantees the wake attempt happens.
    pub(crate) fn enqueue(&self, envelope: Envelope) -> Result<(), Envelope> {
        let result = self.inbound.send(envelope).map_err(|e| e.0);
        if result.is_ok() {
            self.waker.notify();
        }
        result
    }
}

impl fmt::Debug for SupervisorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SupervisorHandle(..)")
    }
}

/// Identity anchor and delivery point (§3).
///
/// Addresses are immutable after creation and non-copyable-by-value in the
/// sense that matters: cloning an `Address` clones the handle to the same
/// owning supervisor and the same locality token, it never creates a new
/// identity. Equality and hashing are defined purely over [`AddressId`].
#[derive(Clone)]
pub struct Address {
    id: AddressId,
    owner: ActorId,
    locality: LocalityToken,
    supervisor: SupervisorHandle,
}

impl Address {
    /// Only supervisors (and address-maker plugins acting on their behalf)
    /// may mint addresses -- see §4.1.
    pub(crate) fn new(
        owner: ActorId,
        locality: LocalityToken,
        supervisor: SupervisorHandle,
    ) -> Self {
        Self {
            id: AddressId::new(),
            owner,
            locality,
            supervisor,
        }
    }

    pub fn id(&self) -> AddressId {
        self.id
    }

    /// The actor that owns this address (its "main" address's owner, or the
    /// owner of whichever virtual address a plugin minted for it).
    pub fn owner(&self) -> ActorId {
        self.owner
    }

    /// Two addresses "share locality" iff this returns true for both --
    /// same execution context, safe for direct (non-forwarded) dispatch.
    pub fn same_locality(&self, other: &Address) -> bool {
        self.locality.same_locality(&other.locality)
    }

    pub fn locality(&self) -> &LocalityToken {
        &self.locality
    }

    pub(crate) fn supervisor_handle(&self) -> &SupervisorHandle {
        &self.supervisor
    }

    /// Deliver an envelope straight to this address's owning supervisor,
    /// bypassing `ActorContext`.
    ///
    /// A [`Handler`](crate::message::Handler) closure only ever receives
    /// `&Envelope`, not a mutable supervisor -- this is how a request
    /// responder (or any other handler) replies from inside one, the same
    /// way the built-in link/registry plugins address their own replies
    /// directly off the requester's `Address`.
    pub fn deliver(&self, envelope: Envelope) -> Result<(), Envelope> {
        self.supervisor.enqueue(envelope)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({}, owner={})", self.id, self.owner)
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Address {}

impl std::hash::Hash for Address {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}
