//! The crate-wide chained error (§3 "Extended error", §6.3, §7).
//!
//! Every fallible subsystem (`subscription`, `supervisor`, `registry`,
//! `link`, `request`, `spawner`) defines its own `thiserror`-derived enum for
//! precise matching in that subsystem's own tests and callers. At the
//! boundary where an error crosses an actor (a reply, a shutdown reason, a
//! link failure propagated to a client) it is converted into an
//! [`ExtendedError`]: a chained, stringly-contextualized error carrying one
//! of the closed-set [`ErrorCode`]s plus an optional pointer at the message
//! that triggered it. This is the only error type that ever travels inside
//! a message payload.

mod code;
mod extended;

pub use code::ErrorCode;
pub use extended::ExtendedError;
