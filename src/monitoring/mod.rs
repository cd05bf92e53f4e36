//! Observability (§6.4, §2). No `tracing`/`log` dependency -- a [`Monitor`]
//! receiving typed [`events::RuntimeEvent`]s plus a pluggable
//! [`Stringifier`] is this crate's entire logging story, the same way the
//! teacher crate keeps its own `monitoring` module independent of an
//! external facade.

mod events;
mod in_memory;
mod noop;
mod stringifier;
mod traits;

pub use events::{RequestEvent, RuntimeEvent, SubscriptionEvent, SupervisionEvent, TimerEvent};
pub use in_memory::InMemoryMonitor;
pub use noop::NoopMonitor;
pub use stringifier::{DefaultStringifier, Stringifier};
pub use traits::{EventSeverity, Monitor, MonitoringEvent};
