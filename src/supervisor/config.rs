//! Per-supervisor configuration (§6.2).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::address::Address;

/// Default spin-wait window for draining the inbound queue before
/// blocking on the backend (§4.3 "may spin for a configurable
/// `poll_duration`").
pub const DEFAULT_POLL_DURATION: Duration = Duration::from_millis(0);

/// Default for whether a supervisor spawns its own registry child.
pub const DEFAULT_CREATE_REGISTRY: bool = false;

/// Externally-flippable shutdown signal (§6.2 `shutdown_flag`), checked
/// once per `do_process` iteration -- the documented hook for wiring up
/// e.g. a Unix signal handler without the supervisor depending on signal
/// handling itself.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    pub poll_duration: Duration,
    pub create_registry: bool,
    pub registry_address: Option<Address>,
    pub shutdown_flag: ShutdownFlag,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            poll_duration: DEFAULT_POLL_DURATION,
            create_registry: DEFAULT_CREATE_REGISTRY,
            registry_address: None,
            shutdown_flag: ShutdownFlag::new(),
        }
    }
}

impl SupervisorConfig {
    pub fn builder() -> SupervisorConfigBuilder {
        SupervisorConfigBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct SupervisorConfigBuilder {
    config: SupervisorConfig,
}

impl SupervisorConfigBuilder {
    pub fn with_poll_duration(mut self, duration: Duration) -> Self {
        self.config.poll_duration = duration;
        self
    }

    pub fn with_create_registry(mut self, create: bool) -> Self {
        self.config.create_registry = create;
        self
    }

    pub fn with_registry_address(mut self, address: Address) -> Self {
        self.config.registry_address = Some(address);
        self
    }

    pub fn with_shutdown_flag(mut self, flag: ShutdownFlag) -> Self {
        self.config.shutdown_flag = flag;
        self
    }

    pub fn build(self) -> SupervisorConfig {
        self.config
    }
}
