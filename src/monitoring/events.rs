use chrono::{DateTime, Utc};

use super::traits::{EventSeverity, MonitoringEvent};
use crate::error::ErrorCode;
use crate::util::{ActorId, AddressId, RequestId};

#[derive(Debug, Clone)]
pub enum SupervisionEvent {
    ChildSpawned { at: DateTime<Utc>, child: ActorId },
    ChildInitialized { at: DateTime<Utc>, child: ActorId },
    ChildShutDown { at: DateTime<Utc>, child: ActorId, code: ErrorCode },
    EscalationReceived { at: DateTime<Utc>, from: ActorId, code: ErrorCode },
}

impl MonitoringEvent for SupervisionEvent {
    const EVENT_TYPE: &'static str = "supervision";

    fn timestamp(&self) -> DateTime<Utc> {
        match self {
            SupervisionEvent::ChildSpawned { at, .. }
            | SupervisionEvent::ChildInitialized { at, .. }
            | SupervisionEvent::ChildShutDown { at, .. }
            | SupervisionEvent::EscalationReceived { at, .. } => *at,
        }
    }

    fn severity(&self) -> EventSeverity {
        match self {
            SupervisionEvent::ChildSpawned { .. } | SupervisionEvent::ChildInitialized { .. } => {
                EventSeverity::Info
            }
            SupervisionEvent::ChildShutDown { code, .. } if *code == ErrorCode::NormalShutdown => {
                EventSeverity::Info
            }
            SupervisionEvent::ChildShutDown { .. } => EventSeverity::Warning,
            SupervisionEvent::EscalationReceived { .. } => EventSeverity::Error,
        }
    }
}

#[derive(Debug, Clone)]
pub enum SubscriptionEvent {
    Materialised { at: DateTime<Utc>, address: AddressId },
    Forgotten { at: DateTime<Utc>, address: AddressId },
}

impl MonitoringEvent for SubscriptionEvent {
    const EVENT_TYPE: &'static str = "subscription";

    fn timestamp(&self) -> DateTime<Utc> {
        match self {
            SubscriptionEvent::Materialised { at, .. } | SubscriptionEvent::Forgotten { at, .. } => *at,
        }
    }

    fn severity(&self) -> EventSeverity {
        EventSeverity::Debug
    }
}

#[derive(Debug, Clone)]
pub enum RequestEvent {
    Allocated { at: DateTime<Utc>, id: RequestId },
    Resolved { at: DateTime<Utc>, id: RequestId },
    TimedOut { at: DateTime<Utc>, id: RequestId },
}

impl MonitoringEvent for RequestEvent {
    const EVENT_TYPE: &'static str = "request";

    fn timestamp(&self) -> DateTime<Utc> {
        match self {
            RequestEvent::Allocated { at, .. }
            | RequestEvent::Resolved { at, .. }
            | RequestEvent::TimedOut { at, .. } => *at,
        }
    }

    fn severity(&self) -> EventSeverity {
        match self {
            RequestEvent::TimedOut { .. } => EventSeverity::Warning,
            _ => EventSeverity::Debug,
        }
    }
}

#[derive(Debug, Clone)]
pub enum TimerEvent {
    Started { at: DateTime<Utc>, owner: ActorId },
    Fired { at: DateTime<Utc>, owner: ActorId },
    Cancelled { at: DateTime<Utc>, owner: ActorId },
}

impl MonitoringEvent for TimerEvent {
    const EVENT_TYPE: &'static str = "timer";

    fn timestamp(&self) -> DateTime<Utc> {
        match self {
            TimerEvent::Started { at, .. } | TimerEvent::Fired { at, .. } | TimerEvent::Cancelled { at, .. } => *at,
        }
    }

    fn severity(&self) -> EventSeverity {
        EventSeverity::Trace
    }
}

/// Sum type over every subsystem's event, so a single [`super::Monitor`]
/// implementation can observe the whole runtime (§2 "Observability").
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    Supervision(SupervisionEvent),
    Subscription(SubscriptionEvent),
    Request(RequestEvent),
    Timer(TimerEvent),
}

impl MonitoringEvent for RuntimeEvent {
    const EVENT_TYPE: &'static str = "runtime";

    fn timestamp(&self) -> DateTime<Utc> {
        match self {
            RuntimeEvent::Supervision(e) => e.timestamp(),
            RuntimeEvent::Subscription(e) => e.timestamp(),
            RuntimeEvent::Request(e) => e.timestamp(),
            RuntimeEvent::Timer(e) => e.timestamp(),
        }
    }

    fn severity(&self) -> EventSeverity {
        match self {
            RuntimeEvent::Supervision(e) => e.severity(),
            RuntimeEvent::Subscription(e) => e.severity(),
            RuntimeEvent::Request(e) => e.severity(),
            RuntimeEvent::Timer(e) => e.severity(),
        }
    }
}
