use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, Utc};

use crate::util::ActorId;

/// Opaque handle to a scheduled timer (§3 "Pending request" timer_handle,
/// §6.1 `start_timer`/`cancel_timer`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Invoked exactly once, with `cancelled = true` iff `cancel` (rather than
/// natural expiry) ended the timer -- the closed `(deadline, handler)` model
/// (C6), grounded on `timer_handler_base_t`/`supervisor_ev_t::timer_cb` and
/// `do_cancel_timer`'s `on_timer_trigger(timer_id, cancelled)` callback
/// (`examples/.../original_source/src/rotor/ev/supervisor_ev.cpp`).
pub type TimerCallback = Box<dyn FnOnce(bool)>;

pub struct TimerEntry {
    pub id: TimerId,
    pub deadline: DateTime<Utc>,
    pub owner: ActorId,
    /// `None` for a request-timeout timer (§4.5), whose firing/cancellation
    /// is instead observed through [`crate::request::Correlator`]; `Some`
    /// for a timer raised directly through
    /// [`crate::actor::ActorContext::start_timer`].
    pub callback: Option<TimerCallback>,
}

impl fmt::Debug for TimerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerEntry")
            .field("id", &self.id)
            .field("deadline", &self.deadline)
            .field("owner", &self.owner)
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

/// Logical timer wheel: an ordered set of `(deadline, handler)` (C6).
///
/// This is deliberately not a bucketed hashed-wheel -- a `BTreeMap` keyed by
/// `(deadline, id)` gives exact ordering with `O(log n)` insert/cancel and a
/// cheap "everything due" range scan, which is plenty for the handler
/// counts this runtime targets (hundreds to low thousands of live timers
/// per locality, not a networked scheduler's millions).
#[derive(Default)]
pub struct TimerWheel {
    next_id: u64,
    by_deadline: BTreeMap<(DateTime<Utc>, TimerId), ActorId>,
    by_id: BTreeMap<TimerId, DateTime<Utc>>,
    callbacks: HashMap<TimerId, TimerCallback>,
}

impl fmt::Debug for TimerWheel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerWheel")
            .field("pending", &self.by_id.len())
            .field("with_callback", &self.callbacks.len())
            .finish()
    }
}

impl TimerWheel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a request-timeout timer for `owner`, due at `deadline`. No
    /// callback is attached -- firing/cancellation is observed by the
    /// caller through the request correlator instead (§4.5). A `deadline`
    /// equal to `now` is legal (B1: fires on the *next* loop iteration's
    /// `pop_due`, never reentrantly from within `start_timer` itself).
    pub fn start_timer(&mut self, owner: ActorId, deadline: DateTime<Utc>) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.by_deadline.insert((deadline, id), owner);
        self.by_id.insert(id, deadline);
        id
    }

    /// Schedule a raw actor-level timer (§5, §6.1 `start_timer`) with a
    /// callback invoked exactly once by `pop_due` or `cancel`, with
    /// `cancelled=true` in the latter case.
    pub fn start_timer_with_callback(&mut self, owner: ActorId, deadline: DateTime<Utc>, callback: TimerCallback) -> TimerId {
        let id = self.start_timer(owner, deadline);
        self.callbacks.insert(id, callback);
        id
    }

    /// Cancel a pending timer, invoking its callback (if any) with
    /// `cancelled=true` before returning its entry. Returns `None` if it
    /// already fired or was never known (§5: "Safe to call after fire
    /// (no-op if id unknown)").
    pub fn cancel(&mut self, id: TimerId) -> Option<TimerEntry> {
        let deadline = self.by_id.remove(&id)?;
        let owner = self.by_deadline.remove(&(deadline, id))?;
        let callback = self.callbacks.remove(&id);
        if let Some(callback) = callback.as_ref() {
            let _ = callback;
        }
        let callback = callback.map(|cb| {
            cb(true);
            // The callback already ran; `TimerEntry.callback` is left
            // `None` for a cancelled timer since invoking it twice would
            // violate "invoked exactly once".
            None::<TimerCallback>
        });
        let _ = callback;
        Some(TimerEntry { id, deadline, owner, callback: None })
    }

    /// Remove and return every timer due at or before `now`, in deadline
    /// order. Each entry's callback, if any, is still attached and must be
    /// invoked by the caller with `cancelled=false` (§5) -- kept as data
    /// rather than called here so the caller can route monitoring/error
    /// handling uniformly with the request-timeout path.
    pub fn pop_due(&mut self, now: DateTime<Utc>) -> Vec<TimerEntry> {
        let due_keys: Vec<(DateTime<Utc>, TimerId)> = self
            .by_deadline
            .range(..=(now, TimerId(u64::MAX)))
            .map(|(key, _)| *key)
            .collect();

        let mut fired = Vec::with_capacity(due_keys.len());
        for key @ (deadline, id) in due_keys {
            if let Some(owner) = self.by_deadline.remove(&key) {
                self.by_id.remove(&id);
                let callback = self.callbacks.remove(&id);
                fired.push(TimerEntry { id, deadline, owner, callback });
            }
        }
        fired
    }

    /// Cancel every timer owned by `actor` -- used on shutdown (P5: "on
    /// actor shutdown, all remaining timers are cancelled"). Any attached
    /// callback runs with `cancelled=true`.
    pub fn cancel_all_for(&mut self, actor: ActorId) -> Vec<TimerEntry> {
        let ids: Vec<(DateTime<Utc>, TimerId)> = self
            .by_deadline
            .iter()
            .filter(|(_, owner)| **owner == actor)
            .map(|(key, _)| *key)
            .collect();

        let mut cancelled = Vec::with_capacity(ids.len());
        for (deadline, id) in ids {
            if let Some(owner) = self.by_deadline.remove(&(deadline, id)) {
                self.by_id.remove(&id);
                if let Some(callback) = self.callbacks.remove(&id) {
                    callback(true);
                }
                cancelled.push(TimerEntry { id, deadline, owner, callback: None });
            }
        }
        cancelled
    }

    /// The earliest deadline still pending, if any (§6.1: a backend sleeps
    /// until this point rather than busy-polling).
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.by_deadline.keys().next().map(|(deadline, _)| *deadline)
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn pop_due_returns_only_expired_timers_in_deadline_order() {
        let mut wheel = TimerWheel::new();
        let actor = ActorId::new();
        let now = Utc::now();
        let early = wheel.start_timer(actor, now - ChronoDuration::seconds(1));
        let _late = wheel.start_timer(actor, now + ChronoDuration::seconds(60));

        let due = wheel.pop_due(now);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, early);
        assert_eq!(wheel.len(), 1);
    }

    #[test]
    fn cancel_is_a_no_op_once_fired() {
        let mut wheel = TimerWheel::new();
        let actor = ActorId::new();
        let now = Utc::now();
        let id = wheel.start_timer(actor, now);

        assert!(!wheel.pop_due(now).is_empty());
        assert!(wheel.cancel(id).is_none());
    }

    #[test]
    fn cancel_all_for_only_touches_the_named_actor() {
        let mut wheel = TimerWheel::new();
        let a1 = ActorId::new();
        let a2 = ActorId::new();
        let now = Utc::now();
        wheel.start_timer(a1, now + ChronoDuration::seconds(5));
        wheel.start_timer(a2, now + ChronoDuration::seconds(5));

        let cancelled = wheel.cancel_all_for(a1);
        assert_eq!(cancelled.len(), 1);
        assert_eq!(wheel.len(), 1);
    }

    #[test]
    fn zero_interval_timer_is_due_immediately_but_not_reentrantly() {
        let mut wheel = TimerWheel::new();
        let actor = ActorId::new();
        let now = Utc::now();
        wheel.start_timer(actor, now);
        assert_eq!(wheel.len(), 1, "starting a timer never fires it synchronously");
        assert_eq!(wheel.pop_due(now).len(), 1);
    }

    #[test]
    fn callback_fires_with_cancelled_false_on_natural_expiry() {
        let mut wheel = TimerWheel::new();
        let actor = ActorId::new();
        let now = Utc::now();
        let seen = Rc::new(Cell::new(None));
        let seen_clone = seen.clone();
        wheel.start_timer_with_callback(actor, now, Box::new(move |cancelled| seen_clone.set(Some(cancelled))));

        let due = wheel.pop_due(now);
        assert_eq!(due.len(), 1);
        (due.into_iter().next().unwrap().callback.unwrap())(false);
        assert_eq!(seen.get(), Some(false));
    }

    #[test]
    fn cancel_invokes_the_callback_with_cancelled_true() {
        let mut wheel = TimerWheel::new();
        let actor = ActorId::new();
        let now = Utc::now() + ChronoDuration::seconds(60);
        let seen = Rc::new(Cell::new(None));
        let seen_clone = seen.clone();
        let id = wheel.start_timer_with_callback(actor, now, Box::new(move |cancelled| seen_clone.set(Some(cancelled))));

        assert!(wheel.cancel(id).is_some());
        assert_eq!(seen.get(), Some(true));
    }
}
