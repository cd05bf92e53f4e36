//! The host event-loop contract (§6.1, C12) and the one reference
//! implementation this crate ships.
//!
//! A [`Backend`] is deliberately thin: `Core`/`Supervisor` already own the
//! subscription table, the run queue, and the timer wheel (§4.3), so a
//! backend's only real job is deciding *when* to call back into the
//! supervisor it drives -- on an external wake, or when the next timer
//! deadline arrives, whichever comes first.

mod thread;

pub use thread::ThreadBackend;

use chrono::{DateTime, Utc};

use crate::system::SystemContext;

/// One event-loop adapter per host loop (§6.1). This crate ships exactly
/// one, [`ThreadBackend`]; additional adapters (libev, Asio, a GUI loop) are
/// external collaborators per the scope note in §1.
pub trait Backend {
    /// Arrange for `run`'s loop to wake and re-poll its supervisor soon.
    /// Coalescing repeated wakes into one iteration is expected and safe --
    /// `Supervisor::run_until_idle` always drains everything pending.
    fn wake(&self);

    /// A timer was armed with this deadline. A reference implementation
    /// that sleeps until `Supervisor::next_deadline()` anyway may treat this
    /// purely as a hint to shorten an in-progress sleep; the timer itself
    /// remains tracked by the supervisor's own timer wheel (§4.9's
    /// `address_mapping`-style ownership split), not duplicated here.
    fn start_timer(&self, deadline: DateTime<Utc>);

    /// A timer was cancelled. Same hint-only contract as `start_timer`.
    fn cancel_timer(&self, deadline: DateTime<Utc>);

    /// Drive `system`'s root supervisor until its `shutdown_flag` is
    /// triggered and it has no children left (§4.3's run-to-idle loop,
    /// wrapped in an outer sleep/wake cycle).
    fn run(&mut self, system: &mut SystemContext);
}
