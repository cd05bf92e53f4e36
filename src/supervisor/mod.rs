//! The supervisor (§3, §4.3, §4.4, C9): the component that actually owns a
//! set of children and drives them through life, as opposed to [`Core`],
//! which only knows how to route and dispatch envelopes for whichever
//! addresses happen to be local to it.
//!
//! [`Supervisor`] wraps [`Core`] with a `HashMap<ActorId, ActorBase>` and
//! drives each child's lifecycle with *direct method calls*
//! (`begin_init`/`init_continue`/`start`/`begin_shutdown`/`shutdown_continue`)
//! rather than by dispatching `init_request`/`shutdown_request` messages
//! through the subscription table -- [`crate::actor::plugins::InitShutdownPlugin`]
//! is an intentional no-op placeholder for exactly this reason (see its own
//! doc comment). Every child still gets an [`crate::actor::control::ControlHandle`]
//! so its plugins can ask to be re-polled or shut down without reaching back
//! into this struct directly.

mod child_map;
mod config;
mod core;
mod error;

pub use config::{ShutdownFlag, SupervisorConfig, SupervisorConfigBuilder};
pub use core::Core;
pub use error::SupervisorError;

use std::collections::{HashMap, HashSet};

use chrono::Utc;

use crate::actor::{ActorBase, ActorConfig, ActorContext, ActorState, ControlHandle, ControlMessage, Plugin};
use crate::address::Address;
use crate::error::ExtendedError;
use crate::monitoring::{Monitor, NoopMonitor, RuntimeEvent, SupervisionEvent};
use crate::util::{ActorId, Rc};

/// One child's terminal event, queued for the caller (normally a
/// [`crate::spawner::Spawner`] or the top-level program) to act on once it
/// has reached [`ActorState::ShutDown`] (§4.4, §4.8 "escalate_failure").
#[derive(Debug, Clone)]
pub struct ChildShutDown {
    pub actor: ActorId,
    pub reason: Option<ExtendedError>,
    pub escalate_failure: bool,
    pub autoshutdown_supervisor: bool,
}

/// Owns a supervisor's children and drives their lifecycle (§4.3, §4.4, C9).
pub struct Supervisor {
    core: Core,
    children: HashMap<ActorId, ActorBase>,
    controls: HashMap<ActorId, ControlHandle>,
    pending_init: HashSet<ActorId>,
    started: HashSet<ActorId>,
    shutdown_events: Vec<ChildShutDown>,
    monitor: Rc<dyn Monitor>,
    own_registry: Option<Address>,
}

impl Supervisor {
    pub fn new(config: SupervisorConfig) -> Self {
        Self::with_monitor(config, Rc::new(NoopMonitor))
    }

    pub fn with_monitor(config: SupervisorConfig, monitor: Rc<dyn Monitor>) -> Self {
        let core = Core::with_monitor(config, monitor.clone());
        let mut supervisor = Self {
            core,
            children: HashMap::new(),
            controls: HashMap::new(),
            pending_init: HashSet::new(),
            started: HashSet::new(),
            shutdown_events: Vec::new(),
            monitor,
            own_registry: None,
        };

        if supervisor.core.config().create_registry {
            let registry_id = crate::registry::RegistryActor::spawn(&mut supervisor, ActorConfig::default());
            supervisor.own_registry = supervisor.main_address_of(registry_id);
        }
        supervisor
    }

    pub fn id(&self) -> ActorId {
        self.core.id()
    }

    pub fn own_address(&self) -> Address {
        self.core.own_address()
    }

    pub fn config(&self) -> &SupervisorConfig {
        self.core.config()
    }

    /// The address of this supervisor's registry child, if
    /// [`SupervisorConfig::create_registry`] spawned one, falling back to
    /// [`SupervisorConfig::registry_address`] for a registry hosted
    /// elsewhere (§4.6, §6.2).
    pub fn registry_address(&self) -> Option<Address> {
        self.own_registry.clone().or_else(|| self.core.config().registry_address.clone())
    }

    pub fn main_address_of(&self, actor: ActorId) -> Option<Address> {
        self.children.get(&actor).and_then(|a| a.main_address().cloned())
    }

    pub fn state_of(&self, actor: ActorId) -> Option<ActorState> {
        self.children.get(&actor).map(|a| a.state())
    }

    pub fn children(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.children.keys().copied()
    }

    pub fn is_idle(&self) -> bool {
        self.core.is_idle() && self.controls.values().all(ControlHandle::is_empty)
    }

    /// Create a child actor with the default 8-plugin pipeline and begin its
    /// init immediately (§4.4).
    pub fn spawn(&mut self, config: ActorConfig) -> ActorId {
        self.spawn_with(crate::actor::default_pipeline(), config, |_ctx| {})
    }

    /// Create a child with an activation hook that installs its own message
    /// handlers once the built-in pipeline has run (§4.4 "activate(actor)").
    pub fn spawn_with_hook(&mut self, config: ActorConfig, hook: impl FnOnce(&mut ActorContext<'_>) + 'static) -> ActorId {
        self.spawn_with(crate::actor::default_pipeline(), config, hook)
    }

    /// Full control over the plugin pipeline, for tests and for actors that
    /// only need a subset of the default 8 (§4.4, §9).
    pub fn spawn_with(
        &mut self,
        plugins: Vec<Box<dyn Plugin>>,
        config: ActorConfig,
        hook: impl FnOnce(&mut ActorContext<'_>) + 'static,
    ) -> ActorId {
        let id = ActorId::new();
        let mut actor = ActorBase::new(id, config, plugins).with_activation_hook(hook);
        actor.activate(&mut self.core);
        self.controls.insert(id, actor.control());
        self.children.insert(id, actor);
        self.pending_init.insert(id);
        self.monitor
            .record(RuntimeEvent::Supervision(SupervisionEvent::ChildSpawned { at: Utc::now(), child: id }));

        let reply_to = self.core.own_address();
        if let Some(actor) = self.children.get_mut(&id) {
            actor.begin_init(&mut self.core, reply_to);
        }
        self.note_init_progress(id);
        id
    }

    /// Ask an actor to begin shutting down (§4.4, §4.7 `on_unlink`, §7
    /// failure escalation). `reason` is `None` for a plain graceful stop.
    pub fn begin_shutdown(&mut self, actor: ActorId, reason: Option<ExtendedError>) {
        let reply_to = self.core.own_address();
        if let Some(a) = self.children.get_mut(&actor) {
            a.begin_shutdown(&mut self.core, Some(reply_to), reason);
        }
        self.note_shutdown_progress(actor);
    }

    /// Begin shutting down every remaining child (used when this
    /// supervisor's own process is told to stop, §6.2 `shutdown_flag`).
    pub fn begin_shutdown_all(&mut self) {
        let ids: Vec<ActorId> = self.children.keys().copied().collect();
        for id in ids {
            self.begin_shutdown(id, None);
        }
    }

    fn note_init_progress(&mut self, actor: ActorId) {
        if let Some(a) = self.children.get(&actor) {
            if matches!(a.state(), ActorState::Initialized | ActorState::ShutDown | ActorState::ShuttingDown) {
                self.pending_init.remove(&actor);
            }
        } else {
            self.pending_init.remove(&actor);
        }

        if self.pending_init.is_empty() {
            let to_start: Vec<ActorId> = self
                .children
                .iter()
                .filter(|(id, a)| a.state() == ActorState::Initialized && !self.started.contains(*id))
                .map(|(id, _)| *id)
                .collect();
            for id in to_start {
                if let Some(a) = self.children.get_mut(&id) {
                    a.start(&mut self.core);
                    self.started.insert(id);
                    self.monitor
                        .record(RuntimeEvent::Supervision(SupervisionEvent::ChildInitialized { at: Utc::now(), child: id }));
                }
            }
        }
    }

    fn note_shutdown_progress(&mut self, actor: ActorId) {
        let Some(a) = self.children.get(&actor) else {
            return;
        };
        if a.state() != ActorState::ShutDown {
            return;
        }
        let escalate_failure = a.config().escalate_failure;
        let autoshutdown_supervisor = a.config().autoshutdown_supervisor;
        let reason = a.shutdown_reason().cloned();
        let code = if reason.is_some() {
            crate::error::ErrorCode::ChildDown
        } else {
            crate::error::ErrorCode::NormalShutdown
        };
        self.monitor
            .record(RuntimeEvent::Supervision(SupervisionEvent::ChildShutDown { at: Utc::now(), child: actor, code }));

        self.shutdown_events.push(ChildShutDown {
            actor,
            reason,
            escalate_failure,
            autoshutdown_supervisor,
        });

        self.children.remove(&actor);
        self.controls.remove(&actor);
        self.pending_init.remove(&actor);
        self.started.remove(&actor);
        self.core.forget_child(actor);
    }

    /// Drain every child's control queue, driving whichever lifecycle
    /// transition each message asks for (§4.4, §9 "Back-and-forth friend
    /// access").
    fn drain_control(&mut self) {
        let ids: Vec<ActorId> = self.controls.keys().copied().collect();
        for id in ids {
            let Some(handle) = self.controls.get(&id).cloned() else {
                continue;
            };
            for message in handle.drain() {
                match message {
                    ControlMessage::ContinueInit { actor } => {
                        if let Some(a) = self.children.get_mut(&actor) {
                            a.init_continue(&mut self.core);
                        }
                        self.note_init_progress(actor);
                    }
                    ControlMessage::ContinueShutdown { actor } => {
                        if let Some(a) = self.children.get_mut(&actor) {
                            a.shutdown_continue(&mut self.core);
                        }
                        self.note_shutdown_progress(actor);
                    }
                    ControlMessage::BeginShutdown { actor, reason } => {
                        self.begin_shutdown(actor, reason);
                    }
                }
            }
        }
    }

    /// One full dispatch cycle (§4.3 `do_process`): drain the inbound
    /// channel, fire due timers, run every ready handler to completion, then
    /// act on whatever the control queue accumulated along the way. Returns
    /// the errors raised by user handlers, for the caller to route to
    /// [`crate::system::SystemContext::on_error`] (§7).
    pub fn run_once(&mut self) -> Vec<ExtendedError> {
        if self.shutdown_flag_triggered() {
            self.begin_shutdown_all();
        }
        self.core.drain_inbound();
        self.core.process_timers(Utc::now());
        let errors = self.core.do_process();
        self.drain_control();
        errors
    }

    /// Runs [`Supervisor::run_once`] until the queue, timers, and control
    /// channels are all empty (§4.3's non-shutdown exit condition). A
    /// [`crate::backend::Backend`] calls this once per wake-up; it does not
    /// itself block waiting for new work.
    pub fn run_until_idle(&mut self) -> Vec<ExtendedError> {
        let mut errors = Vec::new();
        loop {
            errors.extend(self.run_once());
            if self.is_idle() {
                break;
            }
        }
        errors
    }

    /// Pop every child-shutdown event accumulated since the last call
    /// (§4.8: a [`crate::spawner::Spawner`] polls this to decide whether to
    /// respawn).
    pub fn take_shutdown_events(&mut self) -> Vec<ChildShutDown> {
        std::mem::take(&mut self.shutdown_events)
    }

    pub fn shutdown_flag_triggered(&self) -> bool {
        self.core.config().shutdown_flag.is_triggered()
    }

    /// The earliest pending timer deadline across this supervisor, for a
    /// [`crate::backend::Backend`] to sleep until rather than busy-poll
    /// (§6.1).
    pub fn next_deadline(&self) -> Option<chrono::DateTime<Utc>> {
        self.core.next_deadline()
    }

    /// Install the backend wake notifier (§6.1). See [`Core::set_waker`].
    pub fn set_waker(&mut self, notify: crate::util::Rc<dyn Fn() + Send + Sync>) {
        self.core.set_waker(notify);
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}
