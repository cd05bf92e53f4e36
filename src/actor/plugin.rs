//! The plugin trait and reaction bitset that drive the lifecycle pipeline
//! (§4.4, §9 "Dynamic-dispatch plugin list via virtual methods").
//!
//! Plugins are heterogeneous -- each has its own state and behaviour -- so
//! they are stored as `Box<dyn Plugin>` in a fixed-length ordered `Vec`
//! rather than as a closed enum; this is the direct translation of the
//! original's `plugin_t` virtual-method hierarchy (`plugin.h`).

use crate::actor::context::ActorContext;
use crate::error::ExtendedError;
use crate::message::Envelope;

/// Identifies one of the 8 pipeline plugins for ordering and `with_casted`
/// style lookup (§9). Activation follows this order; deactivation reverses
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginId {
    AddressMaker,
    Lifetime,
    InitShutdown,
    LinkServer,
    LinkClient,
    Registry,
    Resources,
    Starter,
}

impl PluginId {
    /// The canonical activation order (§4.4).
    pub const ORDER: [PluginId; 8] = [
        PluginId::AddressMaker,
        PluginId::Lifetime,
        PluginId::InitShutdown,
        PluginId::LinkServer,
        PluginId::LinkClient,
        PluginId::Registry,
        PluginId::Resources,
        PluginId::Starter,
    ];
}

bitflags::bitflags! {
    /// Which lifecycle callbacks a plugin participates in (§4.4 "Reaction
    /// bit-set"). Plugins that don't react to a phase are skipped during
    /// that phase's polling loop rather than receiving a trivial no-op call.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Reaction: u8 {
        const INIT         = 0b0000_0001;
        const SHUTDOWN     = 0b0000_0010;
        const SUBSCRIPTION = 0b0000_0100;
    }
}

/// One fragment of an actor's lifecycle (§4.4, §9).
///
/// `activate`/`deactivate` run exactly once each, in pipeline order (forward
/// for activate, reverse for deactivate). `handle_init`/`handle_shutdown`
/// are polled only for plugins whose [`Plugin::reactions`] includes the
/// matching bit, and return `true` once that plugin's precondition for the
/// phase is satisfied.
pub trait Plugin: std::fmt::Debug {
    fn id(&self) -> PluginId;

    fn reactions(&self) -> Reaction;

    /// One-off setup; registers handlers, allocates resources.
    fn activate(&mut self, ctx: &mut ActorContext) {
        let _ = ctx;
    }

    /// Unsubscribes and releases resources; called in reverse pipeline
    /// order during shutdown.
    fn deactivate(&mut self, ctx: &mut ActorContext) {
        let _ = ctx;
    }

    /// Polled while `reactions()` contains [`Reaction::INIT`]; returns
    /// `true` once this plugin's init precondition holds.
    fn handle_init(&mut self, ctx: &mut ActorContext) -> bool {
        let _ = ctx;
        true
    }

    /// Polled while `reactions()` contains [`Reaction::SHUTDOWN`]; returns
    /// `true` once this plugin's shutdown precondition holds.
    fn handle_shutdown(&mut self, ctx: &mut ActorContext) -> bool {
        let _ = ctx;
        true
    }

    /// Incremental bookkeeping hook for subscription confirmations, for
    /// plugins advertising [`Reaction::SUBSCRIPTION`].
    fn handle_subscription(&mut self, ctx: &mut ActorContext, envelope: &Envelope) {
        let _ = (ctx, envelope);
    }

    /// A programming/lifecycle failure this plugin wants to record before
    /// the actor transitions to `ShuttingDown`. Most plugins never call
    /// this directly; it exists so `handle_init`/`handle_shutdown`
    /// implementations can stash a cause for `ActorBase::shutdown_reason`.
    fn on_failure(&mut self, ctx: &mut ActorContext, error: ExtendedError) {
        let _ = (ctx, error);
    }

    /// Called once every child of the owning supervisor has confirmed init
    /// and the supervisor has released the `start_trigger` (§4.4 "starter"
    /// plugin). Only [`plugins::StarterPlugin`](super::plugins::StarterPlugin)
    /// does anything here by default; the callback exists on the trait
    /// (rather than being special-cased by `PluginId`) so a user-supplied
    /// plugin can also react to start.
    fn on_start(&mut self, ctx: &mut ActorContext) {
        let _ = ctx;
    }
}
