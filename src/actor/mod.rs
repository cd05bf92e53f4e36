//! The actor lifecycle state machine driven by an ordered plugin pipeline
//! (§3 "Actor state", §4.4, C7, C8).

mod base;
mod config;
mod context;
pub mod control;
mod plugin;
pub mod plugins;
mod state;

pub use base::{ActorBase, PhaseOutcome};
pub use config::{ActorConfig, ActorConfigBuilder};
pub use context::ActorContext;
pub use control::{ControlHandle, ControlMessage};
pub use plugin::{Plugin, PluginId, Reaction};
pub use state::{ActorState, StateGuard};

/// Build the canonical 8-plugin pipeline in its default activation order
/// (§4.4).
pub fn default_pipeline() -> Vec<Box<dyn Plugin>> {
    vec![
        Box::new(plugins::AddressMakerPlugin::new()),
        Box::new(plugins::LifetimePlugin::new()),
        Box::new(plugins::InitShutdownPlugin::new()),
        Box::new(plugins::LinkServerPlugin::new()),
        Box::new(plugins::LinkClientPlugin::new()),
        Box::new(plugins::RegistryPlugin::new()),
        Box::new(plugins::ResourcesPlugin::new()),
        Box::new(plugins::StarterPlugin::new()),
    ]
}
