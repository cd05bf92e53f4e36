//! §4.4 plugin 2/8: owns the actor's subscription bookkeeping.

use crate::actor::context::ActorContext;
use crate::actor::plugin::{Plugin, PluginId, Reaction};

#[derive(Debug, Default)]
pub struct LifetimePlugin;

impl LifetimePlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Plugin for LifetimePlugin {
    fn id(&self) -> PluginId {
        PluginId::Lifetime
    }

    fn reactions(&self) -> Reaction {
        Reaction::empty()
    }

    /// Releases every subscription this actor ever registered, regardless
    /// of which plugin installed it (§4.4 "lifetime" deactivation).
    fn deactivate(&mut self, ctx: &mut ActorContext) {
        ctx.unsubscribe_all();
    }
}
