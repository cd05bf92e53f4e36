//! The environment a plugin (or a user-supplied activation closure) gets
//! handed during one lifecycle callback (§4.4, §9 "Back-and-forth friend
//! access").
//!
//! `ActorContext` is deliberately a bundle of `&mut` borrows into
//! [`super::base::ActorBase`]'s fields plus the owning [`crate::supervisor::Core`]
//! rather than a method on `ActorBase` itself -- `ActorBase::run_phase`
//! needs to hand plugins a context while *also* holding the `plugins: Vec<Box<dyn
//! Plugin>>` it is currently iterating, so the fields a plugin is allowed to
//! touch are split out by destructuring rather than borrowed through `self`.
//! This is the Rust stand-in for the original's `access<lifetime_plugin_t>`
//! friend-class trick (`actor_base.h`): instead of granting one plugin type
//! friend access to private `actor_base_t` fields, every plugin receives
//! the same `&mut ActorContext` and can only reach what it exposes publicly.

use crate::actor::config::ActorConfig;
use crate::actor::control::ControlHandle;
use crate::actor::state::{ActorState, StateGuard};
use crate::address::Address;
use crate::error::ExtendedError;
use crate::message::{Envelope, Handler, Payload};
use crate::subscription::{OwnerTag, SubscriptionInfo, SubscriptionPoint};
use crate::supervisor::Core;
use crate::timer::TimerId;
use crate::util::ActorId;
use std::time::Duration;

pub struct ActorContext<'a> {
    pub(crate) id: ActorId,
    pub(crate) supervisor: &'a mut Core,
    pub(crate) addresses: &'a mut Vec<Address>,
    pub(crate) state: &'a mut StateGuard,
    pub(crate) config: &'a ActorConfig,
    pub(crate) shutdown_reason: &'a mut Option<ExtendedError>,
    pub(crate) pending_init_reply: &'a mut Option<Address>,
    pub(crate) pending_shutdown_reply: &'a mut Option<Address>,
    /// Set by a plugin whose `handle_init`/`handle_shutdown` completed
    /// asynchronously (e.g. link-client waiting on a response) to ask the
    /// driving loop to re-poll every plugin immediately (§4.4
    /// `init_continue`).
    pub(crate) continue_requested: &'a mut bool,
    pub(crate) control: &'a ControlHandle,
}

impl<'a> ActorContext<'a> {
    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn config(&self) -> &ActorConfig {
        self.config
    }

    pub fn state(&self) -> ActorState {
        self.state.current()
    }

    /// Allocate a fresh address for this actor (§4.1, address-maker plugin).
    pub fn mint_address(&mut self) -> Address {
        let address = self.supervisor.mint_address(self.id);
        self.addresses.push(address.clone());
        address
    }

    pub fn main_address(&self) -> Option<&Address> {
        self.addresses.first()
    }

    pub fn addresses(&self) -> &[Address] {
        self.addresses
    }

    /// Subscribe `handler` to `address` on this actor's behalf (§4.2).
    pub fn subscribe(&mut self, address: Address, handler: Handler, owner_tag: OwnerTag) -> SubscriptionInfo {
        let point = SubscriptionPoint { handler, address };
        self.supervisor.subscribe(point, self.id, owner_tag)
    }

    pub fn unsubscribe(&mut self, info: &SubscriptionInfo) {
        self.supervisor.unsubscribe(info);
    }

    /// Unsubscribe every subscription this actor ever registered (§4.4
    /// "lifetime" plugin deactivation).
    pub fn unsubscribe_all(&mut self) {
        for info in self.supervisor.subscriptions_owned_by(self.id) {
            self.supervisor.unsubscribe(&info);
        }
    }

    pub fn send<P: Payload>(&mut self, destination: Address, payload: P) {
        self.supervisor.route(Envelope::new(destination, payload));
    }

    pub fn send_envelope(&mut self, envelope: Envelope) {
        self.supervisor.route(envelope);
    }

    /// Send a correlated request to `destination` (§4.5 steps 1-3): mints a
    /// request id, arms its timeout timer against this actor's main
    /// address, and stamps the outgoing envelope so the eventual reply (or
    /// synthetic [`crate::message::RequestTimedOut`]) can be matched back
    /// to it. Returns `None` if this actor has not yet been given a main
    /// address to reply to (a caller outside `on_activate` never hits this).
    pub fn request<P: Payload>(&mut self, destination: Address, payload: P, timeout: Duration) -> Option<crate::util::RequestId> {
        let reply_to = self.main_address()?.clone();
        let id = self.supervisor.begin_request(self.id, reply_to, timeout);
        self.supervisor.route(Envelope::new(destination, payload).with_request_id(id));
        Some(id)
    }

    /// Send a reply stamped with the originating request's id (§4.5 step 4).
    /// `reply_to` and `request_id` are normally read straight off the
    /// envelope the responder is currently handling.
    pub fn reply<P: Payload>(&mut self, reply_to: Address, request_id: crate::util::RequestId, payload: P) {
        self.supervisor
            .route(Envelope::new(reply_to, payload).with_request_id(request_id));
    }

    /// Arm a raw timer against this actor (§5, §6.1). `callback` runs
    /// exactly once: with `cancelled=false` when the deadline is reached,
    /// or with `cancelled=true` if [`Self::cancel_timer`] fires first.
    pub fn start_timer<F>(&mut self, delay: Duration, callback: F) -> TimerId
    where
        F: FnOnce(bool) + 'static,
    {
        self.supervisor.start_timer_with_callback(self.id, delay, Box::new(callback))
    }

    /// Cancel a pending timer, invoking its callback with `cancelled=true`.
    /// A no-op if `id` already fired or is unknown (§5).
    pub fn cancel_timer(&mut self, id: TimerId) {
        self.supervisor.cancel_timer(id);
    }

    /// A plugin's init/shutdown precondition failed unrecoverably (§7
    /// "the actor immediately starts shutdown, propagating the cause").
    /// Queues a [`crate::actor::control::ControlMessage::BeginShutdown`]
    /// for this actor rather than transitioning state directly -- the same
    /// mechanism `link_client`'s `on_unlink` handler uses -- so the real
    /// shutdown pipeline (`ActorBase::begin_shutdown`/`shutdown_continue`,
    /// reached through `Supervisor::begin_shutdown`) actually runs instead
    /// of leaving the actor stuck with a flipped state flag and nothing
    /// else done.
    pub fn fail(&mut self, error: ExtendedError) {
        self.control.begin_shutdown(self.id, Some(error));
    }

    pub fn shutdown_reason(&self) -> Option<&ExtendedError> {
        self.shutdown_reason.as_ref()
    }

    pub fn request_continue(&mut self) {
        *self.continue_requested = true;
    }

    /// A clonable handle plugin-owned message handlers can capture so they
    /// can signal this actor's supervisor from outside an `ActorContext`
    /// (§4.7 `on_unlink`, §4.4 async init/shutdown continuation).
    pub fn control(&self) -> ControlHandle {
        self.control.clone()
    }

    pub fn capture_init_reply(&mut self, reply_to: Address) {
        *self.pending_init_reply = Some(reply_to);
    }

    pub fn take_init_reply(&mut self) -> Option<Address> {
        self.pending_init_reply.take()
    }

    pub fn capture_shutdown_reply(&mut self, reply_to: Address) {
        *self.pending_shutdown_reply = Some(reply_to);
    }

    pub fn take_shutdown_reply(&mut self) -> Option<Address> {
        self.pending_shutdown_reply.take()
    }

    pub fn transition(&mut self, next: ActorState) -> bool {
        self.state.transition(next)
    }

    pub(crate) fn supervisor_mut(&mut self) -> &mut Core {
        self.supervisor
    }
}
