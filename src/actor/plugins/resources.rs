//! §4.4 plugin 7/8: counted resource tokens. Init completes only once the
//! outstanding count reaches zero; shutdown waits symmetrically.

use std::cell::Cell;
use std::rc::Rc;

use crate::actor::context::ActorContext;
use crate::actor::control::ControlHandle;
use crate::actor::plugin::{Plugin, PluginId, Reaction};
use crate::util::ActorId;

/// A clonable handle onto one actor's outstanding resource-token count
/// (§4.4 "Arbitrary user-acquired resources ... represented by token
/// increments/decrements"). Only meaningful once [`Plugin::activate`] has
/// run for the owning [`ResourcesPlugin`].
#[derive(Debug, Clone)]
pub struct ResourceHandle {
    count: Rc<Cell<usize>>,
    control: ControlHandle,
    actor: ActorId,
}

impl ResourceHandle {
    pub fn acquire(&self) {
        self.count.set(self.count.get() + 1);
    }

    /// Release one token; if this drops the count to zero, nudges the
    /// owning actor's init/shutdown pipeline to re-poll.
    pub fn release(&self) {
        let current = self.count.get();
        if current > 0 {
            self.count.set(current - 1);
        }
        if self.count.get() == 0 {
            self.control.continue_init(self.actor);
            self.control.continue_shutdown(self.actor);
        }
    }

    pub fn count(&self) -> usize {
        self.count.get()
    }
}

#[derive(Debug, Default)]
pub struct ResourcesPlugin {
    count: Rc<Cell<usize>>,
}

impl ResourcesPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle user code (an activation hook, a message handler) can use
    /// to acquire/release tracked resources.
    pub fn handle(&self, ctx: &ActorContext) -> ResourceHandle {
        ResourceHandle {
            count: self.count.clone(),
            control: ctx.control(),
            actor: ctx.id(),
        }
    }

    pub fn count(&self) -> usize {
        self.count.get()
    }
}

impl Plugin for ResourcesPlugin {
    fn id(&self) -> PluginId {
        PluginId::Resources
    }

    fn reactions(&self) -> Reaction {
        Reaction::INIT | Reaction::SHUTDOWN
    }

    fn activate(&mut self, ctx: &mut ActorContext) {
        self.count.set(ctx.config().resource_count);
    }

    fn handle_init(&mut self, _ctx: &mut ActorContext) -> bool {
        self.count.get() == 0
    }

    fn handle_shutdown(&mut self, _ctx: &mut ActorContext) -> bool {
        self.count.get() == 0
    }
}
