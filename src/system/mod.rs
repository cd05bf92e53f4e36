//! The process-wide (or test-wide) root object (§4.9, C4.9), grounded on
//! the original's `system_context_t` (`system_context.hpp`): owns the root
//! supervisor and the `on_error` hook that programming errors (§7 "P-class")
//! are routed to.
//!
//! Protocol errors (timeouts, link refusals, unknown names) and lifecycle
//! errors (a plugin failing init) never reach here -- both are handled
//! inside the crate, as a reply payload or a shutdown reason respectively.
//! What [`Supervisor::run_once`] returns, and therefore what [`SystemContext`]
//! forwards to `on_error`, is only the set raised by a user handler
//! returning `Err` during dispatch (B4): by definition a bug, not a
//! recoverable condition.

use crate::error::ExtendedError;
use crate::monitoring::{DefaultStringifier, Monitor, NoopMonitor, Stringifier};
use crate::supervisor::{Supervisor, SupervisorConfig};
use crate::util::{ActorId, Rc};

/// Default `on_error`: print to stderr and abort the process, matching the
/// original's `system_context_t::on_error` default body.
fn abort_on_error(actor: ActorId, error: &ExtendedError) {
    eprintln!("fatal: actor {actor} raised a programming error: {error}");
    std::process::abort();
}

/// Owns the root supervisor and the fatal-error policy for one running
/// system (§4.9).
pub struct SystemContext {
    root: Supervisor,
    stringifier: Rc<dyn Stringifier>,
    on_error: Box<dyn FnMut(ActorId, &ExtendedError)>,
}

impl SystemContext {
    pub fn new(config: SupervisorConfig) -> Self {
        Self::with_monitor(config, Rc::new(NoopMonitor))
    }

    pub fn with_monitor(config: SupervisorConfig, monitor: Rc<dyn Monitor>) -> Self {
        Self {
            root: Supervisor::with_monitor(config, monitor),
            stringifier: Rc::new(DefaultStringifier),
            on_error: Box::new(abort_on_error),
        }
    }

    /// Override the default abort-on-programming-error policy (§7: "User
    /// code may override to log and terminate gracefully").
    pub fn set_error_handler(&mut self, handler: impl FnMut(ActorId, &ExtendedError) + 'static) {
        self.on_error = Box::new(handler);
    }

    pub fn set_stringifier(&mut self, stringifier: Rc<dyn Stringifier>) {
        self.stringifier = stringifier;
    }

    pub fn stringifier(&self) -> &dyn Stringifier {
        self.stringifier.as_ref()
    }

    pub fn root(&self) -> &Supervisor {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Supervisor {
        &mut self.root
    }

    /// Human-readable identity of this context, by default just the root
    /// supervisor's id (matching `system_context_t::identity`'s default of
    /// printing its own address).
    pub fn identity(&self) -> String {
        format!("system_context({})", self.root.id())
    }

    fn dispatch_errors(&mut self, errors: Vec<ExtendedError>) {
        for error in errors {
            (self.on_error)(self.root.id(), &error);
        }
    }

    /// One dispatch tick on the root supervisor, routing any programming
    /// errors it surfaced to `on_error` (§4.3, §7).
    pub fn run_once(&mut self) {
        let errors = self.root.run_once();
        self.dispatch_errors(errors);
    }

    /// Runs to idle, routing every programming error surfaced along the way.
    pub fn run_until_idle(&mut self) {
        let errors = self.root.run_until_idle();
        self.dispatch_errors(errors);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::actor::ActorConfig;
    use std::cell::RefCell;

    #[test]
    fn default_identity_names_the_root_supervisor() {
        let ctx = SystemContext::new(SupervisorConfig::default());
        assert!(ctx.identity().starts_with("system_context("));
    }

    #[test]
    fn overridden_error_handler_receives_handler_errors() {
        let mut ctx = SystemContext::new(SupervisorConfig::default());
        let seen = Rc::new(RefCell::new(0usize));
        let seen_for_hook = seen.clone();
        ctx.set_error_handler(move |_actor, _err| {
            *seen_for_hook.borrow_mut() += 1;
        });

        ctx.root_mut().spawn_with_hook(ActorConfig::default(), |this_ctx| {
            use crate::error::ErrorCode;
            use crate::message::{Envelope, Handler, Payload};
            use crate::subscription::OwnerTag;
            #[derive(Debug, Clone)]
            struct Ping;
            impl Payload for Ping {
                const TYPE_NAME: &'static str = "ping";
            }
            let Some(address) = this_ctx.main_address().cloned() else { return };
            this_ctx.subscribe(
                address.clone(),
                Handler::new(this_ctx.id(), std::any::TypeId::of::<Ping>(), Ping::TYPE_NAME, |_envelope| {
                    Err(ExtendedError::new("boom", ErrorCode::ActorMisconfigured))
                }),
                OwnerTag::Plugin,
            );
            this_ctx.send(address, Ping);
        });
        ctx.run_until_idle();

        assert_eq!(*seen.borrow(), 1);
    }
}
