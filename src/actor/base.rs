//! [`ActorBase`]: the lifecycle state machine every actor shares (§3 "Actor
//! state", §4.4, C8).
//!
//! `ActorBase` owns the plugin pipeline and drives it through init and
//! shutdown; it knows nothing about what a particular actor's business
//! logic does -- that is entirely expressed as extra subscriptions a
//! caller's `on_activate` hook installs once the 8 built-in plugins have
//! run (the direct analogue of a user `actor_base_t` subclass registering
//! its own handlers in `init()`, minus the subclassing: Rust favours
//! composition over virtual dispatch here, so "my actor" is `ActorBase`
//! plus a closure rather than a trait impl).

use crate::address::Address;
use crate::error::{ErrorCode, ExtendedError};
use crate::message::Envelope;
use crate::supervisor::Core;
use crate::util::ActorId;

use super::config::ActorConfig;
use super::context::ActorContext;
use super::control::ControlHandle;
use super::plugin::{Plugin, Reaction};
use super::state::{ActorState, StateGuard};

pub struct ActorBase {
    id: ActorId,
    config: ActorConfig,
    state: StateGuard,
    addresses: Vec<Address>,
    plugins: Vec<Box<dyn Plugin>>,
    init_remaining: Vec<bool>,
    shutdown_remaining: Vec<bool>,
    shutdown_reason: Option<ExtendedError>,
    pending_init_reply: Option<Address>,
    pending_shutdown_reply: Option<Address>,
    on_activate: Option<Box<dyn FnOnce(&mut ActorContext<'_>)>>,
    control: ControlHandle,
}

/// Outcome of driving one activation/init/shutdown phase, telling the
/// supervisor what follow-up it needs to perform (§4.4).
#[derive(Debug, Default)]
pub struct PhaseOutcome {
    pub envelopes: Vec<Envelope>,
    pub finished: bool,
}

impl ActorBase {
    pub fn new(id: ActorId, config: ActorConfig, plugins: Vec<Box<dyn Plugin>>) -> Self {
        Self::with_control(id, config, plugins, ControlHandle::new())
    }

    pub fn with_control(id: ActorId, config: ActorConfig, plugins: Vec<Box<dyn Plugin>>, control: ControlHandle) -> Self {
        let init_remaining = plugins.iter().map(|p| p.reactions().contains(Reaction::INIT)).collect();
        let shutdown_remaining = plugins
            .iter()
            .map(|p| p.reactions().contains(Reaction::SHUTDOWN))
            .collect();
        Self {
            id,
            config,
            state: StateGuard::new(),
            addresses: Vec::new(),
            plugins,
            init_remaining,
            shutdown_remaining,
            shutdown_reason: None,
            pending_init_reply: None,
            pending_shutdown_reply: None,
            on_activate: None,
            control,
        }
    }

    pub fn control(&self) -> ControlHandle {
        self.control.clone()
    }

    pub fn with_activation_hook(mut self, hook: impl FnOnce(&mut ActorContext<'_>) + 'static) -> Self {
        self.on_activate = Some(Box::new(hook));
        self
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn state(&self) -> ActorState {
        self.state.current()
    }

    pub fn config(&self) -> &ActorConfig {
        &self.config
    }

    pub fn main_address(&self) -> Option<&Address> {
        self.addresses.first()
    }

    pub fn shutdown_reason(&self) -> Option<&ExtendedError> {
        self.shutdown_reason.as_ref()
    }

    fn context<'a>(&'a mut self, supervisor: &'a mut Core, continue_requested: &'a mut bool) -> ActorContext<'a> {
        ActorContext {
            id: self.id,
            supervisor,
            addresses: &mut self.addresses,
            state: &mut self.state,
            config: &self.config,
            shutdown_reason: &mut self.shutdown_reason,
            pending_init_reply: &mut self.pending_init_reply,
            pending_shutdown_reply: &mut self.pending_shutdown_reply,
            continue_requested,
            control: &self.control,
        }
    }

    /// Runs every plugin's one-off `activate` in pipeline order, then the
    /// caller-supplied activation hook (§4.4 steps 1-8's "activate(actor)").
    ///
    /// The plugin list is moved out of `self` for the duration of the loop
    /// (and moved back after): `ActorContext` needs `&mut` access to every
    /// *other* field of `ActorBase` while a given plugin is being driven,
    /// and `self.plugins` would otherwise alias that borrow.
    pub fn activate(&mut self, supervisor: &mut Core) {
        let mut plugins = std::mem::take(&mut self.plugins);
        for plugin in plugins.iter_mut() {
            let mut unused = false;
            let mut ctx = self.context(supervisor, &mut unused);
            plugin.activate(&mut ctx);
        }
        self.plugins = plugins;

        if let Some(hook) = self.on_activate.take() {
            let mut unused = false;
            let mut ctx = self.context(supervisor, &mut unused);
            hook(&mut ctx);
        }
    }

    /// §4.4 "deactivate(actor)": reverse pipeline order.
    pub fn deactivate(&mut self, supervisor: &mut Core) {
        let mut plugins = std::mem::take(&mut self.plugins);
        for plugin in plugins.iter_mut().rev() {
            let mut unused = false;
            let mut ctx = self.context(supervisor, &mut unused);
            plugin.deactivate(&mut ctx);
        }
        self.plugins = plugins;
    }

    /// §4.4 init flow step 1-2: capture the request, move to
    /// `Initializing`, and run the first poll pass.
    pub fn begin_init(&mut self, supervisor: &mut Core, reply_to: Address) {
        self.pending_init_reply = Some(reply_to);
        self.state.transition(ActorState::Initializing);
        for remaining in self.init_remaining.iter_mut() {
            *remaining = false;
        }
        for (i, plugin) in self.plugins.iter().enumerate() {
            self.init_remaining[i] = plugin.reactions().contains(Reaction::INIT);
        }
        self.init_continue(supervisor);
    }

    /// §4.4 `init_continue`: poll every still-pending plugin in order;
    /// stop at the first one that is not yet ready (it will call
    /// `init_continue` again later through [`ActorContext::request_continue`]).
    pub fn init_continue(&mut self, supervisor: &mut Core) -> bool {
        let mut plugins = std::mem::take(&mut self.plugins);
        let mut progressed_to_end = true;
        for (i, plugin) in plugins.iter_mut().enumerate() {
            if !self.init_remaining[i] {
                continue;
            }
            let mut continue_requested = false;
            let mut ctx = self.context(supervisor, &mut continue_requested);
            let ready = plugin.handle_init(&mut ctx);
            if ready {
                self.init_remaining[i] = false;
            } else {
                progressed_to_end = false;
                break;
            }
        }
        self.plugins = plugins;

        if !progressed_to_end {
            return false;
        }
        self.init_finish(supervisor);
        true
    }

    fn init_finish(&mut self, supervisor: &mut Core) {
        if self.state.current() != ActorState::Initializing {
            return;
        }
        self.state.transition(ActorState::Initialized);
        if let Some(reply_to) = self.pending_init_reply.take() {
            let response = crate::message::InitResponse { result: Ok(()) };
            supervisor.route(Envelope::new(reply_to, response));
        }
    }

    /// §4.4 "supervisor, on collecting init replies from all children,
    /// sends `start_trigger`": runs every plugin's [`Plugin::on_start`]
    /// (only the starter plugin reacts by default) and moves to
    /// `Operational`.
    pub fn start(&mut self, supervisor: &mut Core) {
        if self.state.current() != ActorState::Initialized {
            return;
        }
        let mut plugins = std::mem::take(&mut self.plugins);
        for plugin in plugins.iter_mut() {
            let mut unused = false;
            let mut ctx = self.context(supervisor, &mut unused);
            plugin.on_start(&mut ctx);
        }
        self.plugins = plugins;
        self.state.transition(ActorState::Operational);
    }

    /// §4.4 shutdown flow, mirrored in reverse plugin order.
    pub fn begin_shutdown(&mut self, supervisor: &mut Core, reply_to: Option<Address>, reason: Option<ExtendedError>) {
        if self.state.current() == ActorState::ShutDown || self.state.current() == ActorState::ShuttingDown {
            return;
        }

        // B3: shutdown requested while init is still in flight. Init's
        // captured reply is answered with an error here -- it would
        // otherwise never be answered at all, since `init_finish` only
        // ever runs from `Initializing`.
        if self.state.current() == ActorState::Initializing {
            if let Some(init_reply_to) = self.pending_init_reply.take() {
                let error = reason.clone().unwrap_or_else(|| {
                    ExtendedError::new("shutdown requested before init completed", ErrorCode::Cancelled)
                });
                let response = crate::message::InitResponse { result: Err(error) };
                supervisor.route(Envelope::new(init_reply_to, response));
            }
        }

        self.pending_shutdown_reply = reply_to;
        if reason.is_some() {
            self.shutdown_reason = reason;
        }
        self.state.transition(ActorState::ShuttingDown);
        for (i, plugin) in self.plugins.iter().enumerate() {
            self.shutdown_remaining[i] = plugin.reactions().contains(Reaction::SHUTDOWN);
        }
        self.shutdown_continue(supervisor);
    }

    pub fn shutdown_continue(&mut self, supervisor: &mut Core) -> bool {
        let mut plugins = std::mem::take(&mut self.plugins);
        let mut progressed_to_end = true;
        for i in (0..plugins.len()).rev() {
            if !self.shutdown_remaining[i] {
                continue;
            }
            let mut continue_requested = false;
            let mut ctx = self.context(supervisor, &mut continue_requested);
            let ready = plugins[i].handle_shutdown(&mut ctx);
            if ready {
                self.shutdown_remaining[i] = false;
            } else {
                progressed_to_end = false;
                break;
            }
        }
        self.plugins = plugins;

        if !progressed_to_end {
            return false;
        }
        self.shutdown_finish(supervisor);
        true
    }

    /// §4.4 `shutdown_finish`: reply if a request was captured, cancel
    /// every still-active timer/request this actor owns (P5), and
    /// deactivate the plugin pipeline.
    fn shutdown_finish(&mut self, supervisor: &mut Core) {
        if self.state.current() == ActorState::ShutDown {
            return;
        }
        self.deactivate(supervisor);
        supervisor.cancel_all_for(self.id);
        self.state.transition(ActorState::ShutDown);
        if let Some(reply_to) = self.pending_shutdown_reply.take() {
            let response = crate::message::ShutdownResponse { result: Ok(()) };
            supervisor.route(Envelope::new(reply_to, response));
        }
    }

    pub fn plugin(&self, id: super::plugin::PluginId) -> Option<&dyn Plugin> {
        self.plugins.iter().find(|p| p.id() == id).map(|p| p.as_ref())
    }

    pub fn plugin_mut(&mut self, id: super::plugin::PluginId) -> Option<&mut Box<dyn Plugin>> {
        self.plugins.iter_mut().find(|p| p.id() == id)
    }
}
