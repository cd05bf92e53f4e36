use std::collections::HashMap;

use crate::address::Address;
use crate::timer::TimerId;
use crate::util::{ActorId, RequestId};

/// Bookkeeping kept for one in-flight `request<R>` (§3 "Pending request").
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub requester: ActorId,
    pub reply_to: Address,
    pub timer_id: Option<TimerId>,
}

/// Per-supervisor monotonic request-id generator and request→actor map
/// (§4.5, C5, P4: "every request-id ever issued by supervisor S is unique
/// within S's lifetime").
///
/// Holds no timers itself -- `supervisor::Core` owns the [`crate::timer::TimerWheel`]
/// and tells the correlator which [`TimerId`] backs a given request so
/// [`Correlator::fire_timeout`] and [`Correlator::resolve`] can race safely
/// against each other.
#[derive(Debug, Default)]
pub struct Correlator {
    next_id: u64,
    entries: HashMap<RequestId, PendingRequest>,
}

impl Correlator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh, supervisor-unique request id and record the
    /// pending entry (§4.5 step 1-2).
    pub fn allocate(&mut self, requester: ActorId, reply_to: Address) -> RequestId {
        self.next_id += 1;
        let id = RequestId::from_raw(self.next_id);
        self.entries.insert(
            id,
            PendingRequest {
                requester,
                reply_to,
                timer_id: None,
            },
        );
        id
    }

    pub fn attach_timer(&mut self, id: RequestId, timer_id: TimerId) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.timer_id = Some(timer_id);
        }
    }

    /// A reply arrived for `id`. Removes and returns the pending entry, or
    /// `None` if it was already resolved/timed out -- §4.5's idempotence
    /// guarantee ("responses after timeout arrive unsolicited and are
    /// dropped").
    pub fn resolve(&mut self, id: RequestId) -> Option<PendingRequest> {
        self.entries.remove(&id)
    }

    /// The timer backing `id` fired. Removes the entry *before* the caller
    /// synthesizes the timeout-error response (§4.9 `request.hpp` ordering
    /// note), so a reply racing in on the same tick sees no entry and is
    /// dropped rather than double-delivering.
    pub fn fire_timeout(&mut self, id: RequestId) -> Option<PendingRequest> {
        self.entries.remove(&id)
    }

    pub fn is_pending(&self, id: RequestId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Which pending request (if any) a fired timer backs -- lets the timer
    /// wheel's generic `(deadline, owner)` firing route back to the specific
    /// request it was guarding (§4.5 R3 timeout delivery). Entry counts are
    /// small enough that a linear scan beats maintaining a second index.
    pub fn request_for_timer(&self, timer_id: TimerId) -> Option<RequestId> {
        self.entries
            .iter()
            .find(|(_, entry)| entry.timer_id == Some(timer_id))
            .map(|(id, _)| *id)
    }

    /// All requests still outstanding for `actor` -- used when it shuts
    /// down, so its timers and correlator entries can be cancelled (§4.4
    /// shutdown_finish, P5).
    pub fn pending_for(&self, actor: ActorId) -> Vec<RequestId> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.requester == actor)
            .map(|(id, _)| *id)
            .collect()
    }
}
