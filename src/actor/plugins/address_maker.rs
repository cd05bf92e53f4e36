//! §4.4 plugin 1/8: allocates the actor's main address.

use crate::actor::context::ActorContext;
use crate::actor::plugin::{Plugin, PluginId, Reaction};

#[derive(Debug, Default)]
pub struct AddressMakerPlugin;

impl AddressMakerPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Plugin for AddressMakerPlugin {
    fn id(&self) -> PluginId {
        PluginId::AddressMaker
    }

    fn reactions(&self) -> Reaction {
        Reaction::empty()
    }

    /// Mints the main address first in the pipeline so every later plugin
    /// can subscribe handlers on it (§4.1: "An actor owns >=1 address; its
    /// 'main' address is created by its address-maker plugin at init").
    fn activate(&mut self, ctx: &mut ActorContext) {
        ctx.mint_address();
    }
}
