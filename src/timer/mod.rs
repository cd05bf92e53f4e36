//! Logical timer wheel: ordered `(deadline, handler)` pairs driven by the
//! backend's tick (C6, §6.1).

mod wheel;

pub use wheel::{TimerCallback, TimerEntry, TimerId, TimerWheel};
