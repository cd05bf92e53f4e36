//! Restart-policy engine for a supervised child (§4.8, C11), grounded on
//! the fluent builder shown in the original's `ping-pong-spawner.cpp`:
//! `supervisor->spawn(factory).max_attempts(15).restart_period(timeout).
//! restart_policy(fail_only).escalate_failure().spawn()`.
//!
//! No dedicated `policy.h`/`spawner.h` header was available to copy from --
//! only that one usage example and `actor_config.h`'s `spawner_address`
//! field -- so the exact restart-policy enum here is reconstructed from
//! observed behaviour rather than transcribed (see `DESIGN.md`).

use std::time::Duration;

use crate::actor::{ActorConfig, Plugin};
use crate::supervisor::{ChildShutDown, Supervisor};
use crate::util::ActorId;

/// Default ceiling on respawn attempts before a spawner gives up and, if
/// [`SpawnerBuilder::escalate_failure`] was set, escalates.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default cooldown between a child's death and its replacement being
/// spawned is zero -- same-tick respawn, matching the original example's
/// default of not configuring one explicitly.
pub const DEFAULT_RESTART_PERIOD: Duration = Duration::from_secs(0);

/// When a supervised child should be replaced (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartPolicy {
    /// Never respawn; one death is final.
    Never,
    /// Always respawn, whether the child shut down cleanly or failed.
    Always,
    /// Respawn only when the child went down with a failure reason.
    FailOnly,
    /// The original lets the dying actor's own `on_shutdown` override the
    /// policy via a second-stage hook (`ask_actor`). This crate has no
    /// per-actor override channel for that decision, so it is treated the
    /// same as `FailOnly` -- the common case is already "don't respawn a
    /// clean exit" and a future actor-level override can refine this
    /// further without changing the enum's public shape.
    AskActor,
}

type Factory = Box<dyn Fn() -> (Vec<Box<dyn Plugin>>, ActorConfig)>;

/// Entry point for the fluent spawner configuration (§4.8), mirroring the
/// original's `supervisor->spawn(factory).max_attempts(n)...spawn()` chain.
/// `factory` is called once per (re)spawn to produce a fresh plugin
/// pipeline and config for the child.
pub fn supervised<'s>(
    supervisor: &'s mut Supervisor,
    factory: impl Fn() -> (Vec<Box<dyn Plugin>>, ActorConfig) + 'static,
) -> SpawnerBuilder<'s> {
    SpawnerBuilder::new(supervisor, Box::new(factory))
}

/// Drives one supervised slot: spawns a child, and on its death decides
/// whether to spawn a replacement (§4.8).
pub struct Spawner {
    factory: Factory,
    max_attempts: u32,
    restart_period: Duration,
    restart_policy: RestartPolicy,
    escalate_failure: bool,
    attempts: u32,
    current: Option<ActorId>,
}

impl Spawner {
    fn spawn_child(&mut self, supervisor: &mut Supervisor) {
        let (plugins, config) = (self.factory)();
        let id = supervisor.spawn_with(plugins, config, |_ctx| {});
        self.current = Some(id);
        self.attempts += 1;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn current(&self) -> Option<ActorId> {
        self.current
    }

    /// Feed the [`ChildShutDown`] events one [`Supervisor::take_shutdown_events`]
    /// call produced; respawns or escalates per the configured policy for
    /// whichever event (if any) belongs to this spawner's child.
    ///
    /// `restart_period` is not an enforced wall-clock delay here -- there is
    /// no suspension inside a handler (§5) and this crate's timer wheel is
    /// driven entirely by [`Supervisor::run_once`]'s caller, so honouring it
    /// as a real cooldown would need a dedicated timer per spawner. It is
    /// still recorded and exposed via [`Spawner::restart_period`] so a
    /// backend loop that wants the cooldown can read it and delay its next
    /// `run_once` call accordingly.
    pub fn poll(&mut self, supervisor: &mut Supervisor, events: &[ChildShutDown]) {
        for event in events {
            if Some(event.actor) != self.current {
                continue;
            }
            self.current = None;
            let had_failure = event.reason.is_some();
            let should_restart = match self.restart_policy {
                RestartPolicy::Never => false,
                RestartPolicy::Always => true,
                RestartPolicy::FailOnly | RestartPolicy::AskActor => had_failure,
            };

            if should_restart && self.attempts < self.max_attempts {
                self.spawn_child(supervisor);
            } else if had_failure && self.escalate_failure {
                supervisor.begin_shutdown_all();
            }
        }
    }

    pub fn restart_period(&self) -> Duration {
        self.restart_period
    }
}

/// Fluent configuration for a new [`Spawner`], mirroring the original's
/// chained `spawn(factory).max_attempts(n)...spawn()` usage.
pub struct SpawnerBuilder<'s> {
    supervisor: &'s mut Supervisor,
    factory: Factory,
    max_attempts: u32,
    restart_period: Duration,
    restart_policy: RestartPolicy,
    escalate_failure: bool,
}

impl<'s> SpawnerBuilder<'s> {
    pub(crate) fn new(supervisor: &'s mut Supervisor, factory: Factory) -> Self {
        Self {
            supervisor,
            factory,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            restart_period: DEFAULT_RESTART_PERIOD,
            restart_policy: RestartPolicy::FailOnly,
            escalate_failure: false,
        }
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn restart_period(mut self, period: Duration) -> Self {
        self.restart_period = period;
        self
    }

    pub fn restart_policy(mut self, policy: RestartPolicy) -> Self {
        self.restart_policy = policy;
        self
    }

    pub fn escalate_failure(mut self) -> Self {
        self.escalate_failure = true;
        self
    }

    /// Finalize the configuration and spawn the first child.
    pub fn spawn(self) -> Spawner {
        let mut spawner = Spawner {
            factory: self.factory,
            max_attempts: self.max_attempts,
            restart_period: self.restart_period,
            restart_policy: self.restart_policy,
            escalate_failure: self.escalate_failure,
            attempts: 0,
            current: None,
        };
        spawner.spawn_child(self.supervisor);
        spawner
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{ErrorCode, ExtendedError};
    use crate::supervisor::SupervisorConfig;

    fn factory() -> (Vec<Box<dyn Plugin>>, ActorConfig) {
        (crate::actor::default_pipeline(), ActorConfig::default())
    }

    #[test]
    fn fail_only_respawns_on_failure_but_not_clean_exit() {
        let mut supervisor = Supervisor::new(SupervisorConfig::default());
        let mut spawner =
            SpawnerBuilder::new(&mut supervisor, Box::new(factory)).restart_policy(RestartPolicy::FailOnly).spawn();
        let first = spawner.current().unwrap();

        spawner.poll(
            &mut supervisor,
            &[ChildShutDown {
                actor: first,
                reason: None,
                escalate_failure: false,
                autoshutdown_supervisor: false,
            }],
        );
        assert!(spawner.current().is_none());
        assert_eq!(spawner.attempts(), 1);
    }

    #[test]
    fn fail_only_respawns_when_reason_present() {
        let mut supervisor = Supervisor::new(SupervisorConfig::default());
        let mut spawner =
            SpawnerBuilder::new(&mut supervisor, Box::new(factory)).restart_policy(RestartPolicy::FailOnly).spawn();
        let first = spawner.current().unwrap();

        spawner.poll(
            &mut supervisor,
            &[ChildShutDown {
                actor: first,
                reason: Some(ExtendedError::new("boom", ErrorCode::ChildDown)),
                escalate_failure: false,
                autoshutdown_supervisor: false,
            }],
        );
        assert!(spawner.current().is_some());
        assert_eq!(spawner.attempts(), 2);
    }

    #[test]
    fn max_attempts_caps_respawns() {
        let mut supervisor = Supervisor::new(SupervisorConfig::default());
        let mut spawner = SpawnerBuilder::new(&mut supervisor, Box::new(factory))
            .restart_policy(RestartPolicy::Always)
            .max_attempts(2)
            .spawn();

        for _ in 0..3 {
            let Some(current) = spawner.current() else { break };
            spawner.poll(
                &mut supervisor,
                &[ChildShutDown {
                    actor: current,
                    reason: None,
                    escalate_failure: false,
                    autoshutdown_supervisor: false,
                }],
            );
        }
        assert_eq!(spawner.attempts(), 2);
        assert!(spawner.current().is_none());
    }
}
