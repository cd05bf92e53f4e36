//! Request/response correlation with timers (§3 "Pending request", §4.5).

mod correlator;

pub use correlator::{Correlator, PendingRequest};
