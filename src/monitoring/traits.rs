use chrono::{DateTime, Utc};
use serde::Serialize;

/// Event severity levels for filtering and categorization, ordered lowest
/// to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum EventSeverity {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

/// A monitorable event: every per-subsystem event type (and the
/// [`super::events::RuntimeEvent`] sum type that wraps them all) implements
/// this.
pub trait MonitoringEvent: std::fmt::Debug {
    const EVENT_TYPE: &'static str;

    fn timestamp(&self) -> DateTime<Utc>;
    fn severity(&self) -> EventSeverity;
}

/// Observer for runtime events (§6.4, §2 "Observability").
///
/// This is the crate's entire logging story: there is no `tracing`/`log`
/// dependency, matching the teacher crate. `record` is synchronous and
/// infallible by contract -- a monitor that wants to do expensive I/O is
/// expected to buffer internally rather than block the locality's loop
/// thread, since this is called from inside `do_process`.
pub trait Monitor: std::fmt::Debug + Send + Sync {
    fn record(&self, event: super::events::RuntimeEvent);
}
