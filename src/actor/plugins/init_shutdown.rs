//! §4.4 plugin 3/8: init/shutdown deadline enforcement.
//!
//! The literal pipeline subscribes `init_request`/`shutdown_request`
//! handlers through the generic subscription table so a type-erased
//! `Handler` closure can drive the actor's state machine. In this crate
//! [`crate::actor::ActorBase`] already owns that state machine directly
//! (`begin_init`, `begin_shutdown`, `init_finish`, `shutdown_finish`) -- a
//! `Handler` closure has no route back into `ActorBase` without
//! reintroducing the `Rc<RefCell<Core>>` cycle `ControlHandle` exists to
//! avoid, so the supervisor layer calls those methods directly instead of
//! this plugin subscribing anything.
//!
//! What this plugin *does* own for real is the other half of
//! [`crate::actor::ActorConfig`]'s `init_timeout`/`shutdown_timeout`
//! fields, which nothing else in the pipeline ever reads: it times each
//! phase from its own `activate`/first poll and calls [`ActorContext::fail`]
//! once a phase overruns its budget, the same way a stuck link or registry
//! response would (§7 "actor transitions INITIALIZING -> SHUTTING_DOWN").

use chrono::{DateTime, Utc};

use crate::actor::context::ActorContext;
use crate::actor::plugin::{Plugin, PluginId, Reaction};
use crate::error::{ErrorCode, ExtendedError};

#[derive(Debug, Default)]
pub struct InitShutdownPlugin {
    init_started_at: Option<DateTime<Utc>>,
    shutdown_started_at: Option<DateTime<Utc>>,
}

impl InitShutdownPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    fn overran(started: DateTime<Utc>, budget: std::time::Duration) -> bool {
        let budget = chrono::Duration::from_std(budget).unwrap_or_else(|_| chrono::Duration::zero());
        Utc::now() - started > budget
    }
}

impl Plugin for InitShutdownPlugin {
    fn id(&self) -> PluginId {
        PluginId::InitShutdown
    }

    fn reactions(&self) -> Reaction {
        Reaction::INIT | Reaction::SHUTDOWN
    }

    fn activate(&mut self, _ctx: &mut ActorContext) {
        self.init_started_at = Some(Utc::now());
    }

    /// Never itself gates progress -- other plugins' preconditions decide
    /// when init is actually done. Only intervenes to cut a hung init short
    /// once `init_timeout` has elapsed (§7 lifecycle error).
    fn handle_init(&mut self, ctx: &mut ActorContext) -> bool {
        if let Some(started) = self.init_started_at {
            if Self::overran(started, ctx.config().init_timeout) {
                let error = ExtendedError::new("actor init exceeded its configured init_timeout", ErrorCode::SupervisorDefined);
                ctx.fail(error);
            }
        }
        true
    }

    /// Same idea in reverse: times out a shutdown that never completes.
    /// Forcing its own bit to `true` cannot unblock an earlier plugin in
    /// the reverse poll order that is itself the one stuck (§4.4
    /// `shutdown_continue` stops at the first not-ready plugin) -- this
    /// only guarantees this plugin is never the one holding up the chain,
    /// and stamps a reason so the eventual `shutdown_finish` at least
    /// reports why the phase ran long.
    fn handle_shutdown(&mut self, ctx: &mut ActorContext) -> bool {
        let started = *self.shutdown_started_at.get_or_insert_with(Utc::now);
        if Self::overran(started, ctx.config().shutdown_timeout) && ctx.shutdown_reason().is_none() {
            let error = ExtendedError::new("actor shutdown exceeded its configured shutdown_timeout", ErrorCode::SupervisorDefined);
            ctx.fail(error);
        }
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn fresh_plugin_has_no_start_times() {
        let plugin = InitShutdownPlugin::new();
        assert!(plugin.init_started_at.is_none());
        assert!(plugin.shutdown_started_at.is_none());
    }

    #[test]
    fn overran_is_false_within_budget_and_true_past_it() {
        let started = Utc::now() - chrono::Duration::seconds(10);
        assert!(!InitShutdownPlugin::overran(started, std::time::Duration::from_secs(60)));
        assert!(InitShutdownPlugin::overran(started, std::time::Duration::from_secs(1)));
    }
}
