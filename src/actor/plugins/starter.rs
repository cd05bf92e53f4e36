//! §4.4 plugin 8/8: final plugin in the pipeline; its [`Plugin::on_start`]
//! runs once every earlier plugin has confirmed init and the supervisor has
//! released the `start_trigger`.

use crate::actor::context::ActorContext;
use crate::actor::plugin::{Plugin, PluginId, Reaction};

type StartHook = Box<dyn FnMut(&mut ActorContext)>;

#[derive(Default)]
pub struct StarterPlugin {
    on_start: Option<StartHook>,
}

impl std::fmt::Debug for StarterPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StarterPlugin").field("has_hook", &self.on_start.is_some()).finish()
    }
}

impl StarterPlugin {
    pub fn new() -> Self {
        Self { on_start: None }
    }

    /// Install the callback run once this actor reaches `OPERATIONAL`.
    pub fn with_hook(hook: impl FnMut(&mut ActorContext) + 'static) -> Self {
        Self {
            on_start: Some(Box::new(hook)),
        }
    }
}

impl Plugin for StarterPlugin {
    fn id(&self) -> PluginId {
        PluginId::Starter
    }

    fn reactions(&self) -> Reaction {
        Reaction::empty()
    }

    fn on_start(&mut self, ctx: &mut ActorContext) {
        if let Some(hook) = self.on_start.as_mut() {
            hook(ctx);
        }
    }
}
