use super::events::RuntimeEvent;
use super::traits::Monitor;

/// Discards every event; the default monitor when a caller doesn't care
/// about observability. Compiles down to nothing at call sites since
/// `record` has no body beyond dropping its argument.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMonitor;

impl Monitor for NoopMonitor {
    fn record(&self, _event: RuntimeEvent) {}
}
