//! Per-actor configuration (§6.2, §4.9 `actor_config`).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::address::Address;

/// Default time an actor's init phase is allowed to run before the
/// supervisor treats it as failed.
pub const DEFAULT_INIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default time an actor's shutdown phase is allowed to run.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Whether a failed actor escalates to its supervisor by default (§4.4).
pub const DEFAULT_ESCALATE_FAILURE: bool = false;

/// Whether the actor's supervisor shuts down alongside it by default.
pub const DEFAULT_AUTOSHUTDOWN_SUPERVISOR: bool = false;

/// Builder-style per-actor configuration (§6.2).
///
/// `spawner_address` is the address of the spawner responsible for
/// restarting this actor, if any; an actor with no spawner that sets
/// `escalate_failure` enqueues a `shutdown_trigger` to its own supervisor on
/// failure instead (§4.4).
///
/// The link/registry/resources fields feed the matching pipeline plugins
/// directly (§4.4 steps 4-7): `link_targets` are link-requested during init
/// by `link-client`, `register_name`/`discover_names` drive `registry`'s
/// register-then-discover-then-link composition, and `resource_count` seeds
/// `resources`'s outstanding-token counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorConfig {
    pub init_timeout: Duration,
    pub shutdown_timeout: Duration,
    pub spawner_address: Option<Address>,
    pub escalate_failure: bool,
    pub autoshutdown_supervisor: bool,
    /// Servers the link-client plugin link-requests during init; init does
    /// not complete until every one replied (§4.4 "link-client").
    pub link_targets: Vec<Address>,
    /// The registry actor's address, if this actor registers a name or
    /// discovers one (§4.4 "registry", §4.6).
    pub registry_address: Option<Address>,
    /// Name this actor's main address registers under, if any.
    pub register_name: Option<String>,
    /// Names resolved (and then link-requested) via the registry during
    /// init -- the "discover then link" composition (§4.4 item 6).
    pub discover_names: Vec<String>,
    /// Initial count of outstanding resource tokens; init/shutdown only
    /// complete once this reaches zero (§4.4 "resources").
    pub resource_count: usize,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            init_timeout: DEFAULT_INIT_TIMEOUT,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            spawner_address: None,
            escalate_failure: DEFAULT_ESCALATE_FAILURE,
            autoshutdown_supervisor: DEFAULT_AUTOSHUTDOWN_SUPERVISOR,
            link_targets: Vec::new(),
            registry_address: None,
            register_name: None,
            discover_names: Vec::new(),
            resource_count: 0,
        }
    }
}

impl ActorConfig {
    pub fn builder() -> ActorConfigBuilder {
        ActorConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.init_timeout.is_zero() {
            return Err("init_timeout must be > 0".to_string());
        }
        if self.shutdown_timeout.is_zero() {
            return Err("shutdown_timeout must be > 0".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ActorConfigBuilder {
    config: ActorConfig,
}

impl ActorConfigBuilder {
    pub fn with_init_timeout(mut self, timeout: Duration) -> Self {
        self.config.init_timeout = timeout;
        self
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.config.shutdown_timeout = timeout;
        self
    }

    pub fn with_spawner_address(mut self, address: Address) -> Self {
        self.config.spawner_address = Some(address);
        self
    }

    pub fn with_escalate_failure(mut self, escalate: bool) -> Self {
        self.config.escalate_failure = escalate;
        self
    }

    pub fn with_autoshutdown_supervisor(mut self, autoshutdown: bool) -> Self {
        self.config.autoshutdown_supervisor = autoshutdown;
        self
    }

    pub fn with_link_target(mut self, target: Address) -> Self {
        self.config.link_targets.push(target);
        self
    }

    pub fn with_registry_address(mut self, registry: Address) -> Self {
        self.config.registry_address = Some(registry);
        self
    }

    pub fn with_register_name(mut self, name: impl Into<String>) -> Self {
        self.config.register_name = Some(name.into());
        self
    }

    pub fn with_discover_name(mut self, name: impl Into<String>) -> Self {
        self.config.discover_names.push(name.into());
        self
    }

    pub fn with_resource_count(mut self, count: usize) -> Self {
        self.config.resource_count = count;
        self
    }

    pub fn build(self) -> Result<ActorConfig, String> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        assert!(ActorConfig::default().validate().is_ok());
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = ActorConfig::builder()
            .with_escalate_failure(true)
            .with_autoshutdown_supervisor(true)
            .build()
            .unwrap();
        assert!(config.escalate_failure);
        assert!(config.autoshutdown_supervisor);
    }

    #[test]
    fn zero_init_timeout_fails_validation() {
        let result = ActorConfig::builder()
            .with_init_timeout(Duration::ZERO)
            .build();
        assert!(result.is_err());
    }
}
