use parking_lot::Mutex;

use super::events::RuntimeEvent;
use super::traits::Monitor;

/// Records every event it sees, for tests and offline diagnostics.
///
/// Backed by `parking_lot::Mutex` rather than a plain `Vec` behind
/// `RefCell`: a monitor may legitimately be shared across locality groups
/// (e.g. one process-wide monitor observing several independent
/// supervisors each on its own thread), which is exactly the "genuinely
/// cross-locality touch point" §2 calls out for `parking_lot`.
#[derive(Debug, Default)]
pub struct InMemoryMonitor {
    events: Mutex<Vec<RuntimeEvent>>,
}

impl InMemoryMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RuntimeEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Monitor for InMemoryMonitor {
    fn record(&self, event: RuntimeEvent) {
        self.events.lock().push(event);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::monitoring::events::TimerEvent;
    use crate::util::ActorId;

    #[test]
    fn records_are_kept_in_arrival_order() {
        let monitor = InMemoryMonitor::new();
        let actor = ActorId::new();
        monitor.record(RuntimeEvent::Timer(TimerEvent::Started { at: chrono::Utc::now(), owner: actor }));
        monitor.record(RuntimeEvent::Timer(TimerEvent::Fired { at: chrono::Utc::now(), owner: actor }));

        assert_eq!(monitor.len(), 2);
        let events = monitor.events();
        assert!(matches!(events[0], RuntimeEvent::Timer(TimerEvent::Started { .. })));
        assert!(matches!(events[1], RuntimeEvent::Timer(TimerEvent::Fired { .. })));
    }

    #[test]
    fn clear_empties_the_buffer() {
        let monitor = InMemoryMonitor::new();
        monitor.record(RuntimeEvent::Timer(TimerEvent::Started { at: chrono::Utc::now(), owner: ActorId::new() }));
        monitor.clear();
        assert!(monitor.is_empty());
    }
}
