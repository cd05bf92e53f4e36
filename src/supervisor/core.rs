use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::address::{Address, LocalityToken, SupervisorHandle, Waker};
use crate::error::{ErrorCode, ExtendedError};
use crate::message::{Envelope, Handler, Payload, RequestTimedOut};
use crate::monitoring::{Monitor, NoopMonitor, RequestEvent, RuntimeEvent, TimerEvent};
use crate::request::Correlator;
use crate::subscription::{HandlerBucket, OwnerTag, SubscriptionInfo, SubscriptionPoint, SubscriptionTable};
use crate::timer::{TimerId, TimerWheel};
use crate::util::{ActorId, Rc, RequestId};

use super::child_map::ChildMap;
use super::config::SupervisorConfig;
use super::error::SupervisorError;

/// The synchronous dispatch engine behind one supervisor (§4.3 `do_process`,
/// C9).
///
/// `Core` never blocks on I/O and knows nothing about a host event loop --
/// that is [`crate::backend::Backend`]'s job. It owns exactly the state
/// §3/§4.3 assign to a supervisor: the subscription table, the
/// address→child map, the request correlator, the timer wheel, and the two
/// physical queues (`inbound_tx`/`inbound_rx` for cross-locality handoff,
/// `queue` for same-locality in-flight messages).
pub struct Core {
    id: ActorId,
    locality: LocalityToken,
    config: SupervisorConfig,
    subscriptions: SubscriptionTable,
    children: ChildMap,
    correlator: Correlator,
    timers: TimerWheel,
    queue: VecDeque<Envelope>,
    inbound_tx: Sender<Envelope>,
    inbound_rx: Receiver<Envelope>,
    monitor: Rc<dyn Monitor>,
    own_address: Address,
    waker: Waker,
}

impl Core {
    pub fn new(config: SupervisorConfig) -> Self {
        Self::with_monitor(config, Rc::new(NoopMonitor))
    }

    pub fn with_monitor(config: SupervisorConfig, monitor: Rc<dyn Monitor>) -> Self {
        let id = ActorId::new();
        let locality = LocalityToken::new_leader();
        let (inbound_tx, inbound_rx) = mpsc::channel();
        let mut children = ChildMap::new();
        let waker = Waker::new();
        let handle = SupervisorHandle::with_waker(inbound_tx.clone(), waker.clone());
        let own_address = Address::new(id, locality.clone(), handle);
        children.insert(id, own_address.clone());

        Self {
            id,
            locality,
            config,
            subscriptions: SubscriptionTable::new(),
            children,
            correlator: Correlator::new(),
            timers: TimerWheel::new(),
            queue: VecDeque::new(),
            inbound_tx,
            inbound_rx,
            monitor,
            own_address,
            waker,
        }
    }

    /// Install the notifier a [`crate::backend::Backend`] uses to learn this
    /// supervisor's inbound queue received something cross-locality (§6.1
    /// `wake()`). Every address already minted from this core shares the
    /// same notifier cell, so this reaches all of them retroactively.
    pub fn set_waker(&mut self, notify: Rc<dyn Fn() + Send + Sync>) {
        self.waker.set(notify);
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn locality(&self) -> &LocalityToken {
        &self.locality
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    /// A cloneable handle new addresses use to reach this supervisor's
    /// inbound queue (§4.1: "created only by supervisor").
    fn handle(&self) -> SupervisorHandle {
        SupervisorHandle::with_waker(self.inbound_tx.clone(), self.waker.clone())
    }

    /// Allocate a fresh address owned by `owner` and register it as local
    /// (§4.1, §4.4 step 1 "address-maker").
    pub fn mint_address(&mut self, owner: ActorId) -> Address {
        let address = Address::new(owner, self.locality.clone(), self.handle());
        self.children.insert(owner, address.clone());
        address
    }

    pub fn is_local(&self, address: &Address) -> bool {
        self.children.is_local(address.id())
    }

    /// Classify and register a subscription point (§4.2 `materialise`),
    /// determining `internal_address` from the child map the way the spec
    /// assigns that job to "the supervisor, which alone knows its children
    /// map".
    pub fn subscribe(&mut self, point: SubscriptionPoint, owner: ActorId, owner_tag: OwnerTag) -> SubscriptionInfo {
        let internal_address = self.children.is_local(point.address.id());
        self.subscriptions.materialise(point, owner, owner_tag, internal_address, None)
    }

    /// Subscribe a handler belonging to an actor hosted on a different
    /// supervisor (§4.2 `external_subscription`): `home` is that actor's
    /// own address, used to forward a matched delivery back to it (§4.3
    /// step 3). Since this crate's localities all live in one process,
    /// the confirmation round-trip the original negotiates over the wire
    /// happens synchronously here -- the point is materialised
    /// `Subscribing` then immediately confirmed to `Established` once this
    /// (owning) table has validated and indexed it.
    pub fn subscribe_foreign(&mut self, point: SubscriptionPoint, owner: ActorId, home: Address) -> SubscriptionInfo {
        let internal_address = self.children.is_local(point.address.id());
        let mut info = self
            .subscriptions
            .materialise(point, owner, OwnerTag::Foreign, internal_address, Some(home));
        self.subscriptions.confirm(&mut info);
        info
    }

    pub fn unsubscribe(&mut self, info: &SubscriptionInfo) {
        self.subscriptions.forget(info);
    }

    /// Every subscription `actor` currently owns, across all of its
    /// addresses (§4.4 "lifetime" plugin deactivation).
    pub fn subscriptions_owned_by(&self, actor: ActorId) -> Vec<SubscriptionInfo> {
        self.subscriptions.infos_owned_by(actor)
    }

    pub fn recipients(&self, address: &Address, type_id: std::any::TypeId) -> Option<&HandlerBucket> {
        self.subscriptions.recipients(address.id(), type_id)
    }

    /// Route one envelope (§4.3 step 1/3): same-locality destinations go
    /// straight onto the local run queue; everything else is pushed to the
    /// destination's own supervisor inbound channel for later draining.
    pub fn route(&mut self, envelope: Envelope) {
        let destination_address = envelope.destination().clone();
        if destination_address.same_locality(&self.own_address()) {
            self.queue.push_back(envelope);
        } else {
            let _ = destination_address.supervisor_handle().enqueue(envelope);
        }
    }

    /// This supervisor's own address -- the `reply_to` children's
    /// `init_request`/`shutdown_request` target (§4.4).
    pub fn own_address(&self) -> Address {
        self.own_address.clone()
    }

    /// Move everything waiting on the inbound channel onto the local run
    /// queue, preserving arrival order (§4.3 "drain inbound into queue").
    pub fn drain_inbound(&mut self) {
        while let Ok(envelope) = self.inbound_rx.try_recv() {
            self.queue.push_back(envelope);
        }
    }

    /// Process every timer due at or before `now`: request-timeout timers
    /// synthesize and route a `RequestTimedOut` reply, raw actor timers
    /// invoke their callback with `cancelled=false` (§4.3, §5).
    pub fn process_timers(&mut self, now: DateTime<Utc>) {
        for entry in self.timers.pop_due(now) {
            self.monitor.record(RuntimeEvent::Timer(TimerEvent::Fired { at: now, owner: entry.owner }));

            // A raw actor-level timer (§5, §6.1 `start_timer`) carries its
            // own callback and bypasses the request-correlator path, which
            // only ever arms timers through `start_timer` with no callback.
            if let Some(callback) = entry.callback {
                callback(false);
                continue;
            }

            if let Some(request_id) = self.correlator.request_for_timer(entry.id) {
                if let Some(pending) = self.fire_request_timeout(request_id) {
                    let error = ExtendedError::new("request timed out before a reply arrived", ErrorCode::RequestTimeout)
                        .with_offending_request(request_id);
                    let timeout = RequestTimedOut { request_id, error };
                    let envelope = Envelope::new(pending.reply_to, timeout).with_request_id(request_id);
                    self.route(envelope);
                }
            }
        }
    }

    pub fn start_timer(&mut self, owner: ActorId, delay: Duration) -> TimerId {
        let deadline = Utc::now() + chrono::Duration::from_std(delay).unwrap_or(chrono::Duration::zero());
        let id = self.timers.start_timer(owner, deadline);
        self.monitor.record(RuntimeEvent::Timer(TimerEvent::Started { at: Utc::now(), owner }));
        id
    }

    /// Arm a raw actor-level timer (§5, §6.1 `start_timer`) whose callback
    /// is invoked exactly once by `process_timers` (with `cancelled=false`)
    /// or by `cancel_timer` (with `cancelled=true`).
    pub fn start_timer_with_callback(
        &mut self,
        owner: ActorId,
        delay: Duration,
        callback: crate::timer::TimerCallback,
    ) -> TimerId {
        let deadline = Utc::now() + chrono::Duration::from_std(delay).unwrap_or(chrono::Duration::zero());
        let id = self.timers.start_timer_with_callback(owner, deadline, callback);
        self.monitor.record(RuntimeEvent::Timer(TimerEvent::Started { at: Utc::now(), owner }));
        id
    }

    pub fn cancel_timer(&mut self, id: TimerId) {
        if let Some(entry) = self.timers.cancel(id) {
            self.monitor
                .record(RuntimeEvent::Timer(TimerEvent::Cancelled { at: Utc::now(), owner: entry.owner }));
        }
    }

    /// §4.5 steps 1-3: allocate a request id, arm a timeout timer, and
    /// return both so the caller can stamp the outgoing envelope and
    /// install its one-shot reply handler.
    pub fn begin_request(&mut self, requester: ActorId, reply_to: Address, timeout: Duration) -> RequestId {
        let id = self.correlator.allocate(requester, reply_to);
        let timer_id = self.start_timer(requester, timeout);
        self.correlator.attach_timer(id, timer_id);
        self.monitor.record(RuntimeEvent::Request(RequestEvent::Allocated { at: Utc::now(), id }));
        id
    }

    /// A reply bearing `id` arrived; cancels the backing timer and returns
    /// the pending entry, or `None` if it already timed out (R3, P6).
    pub fn resolve_request(&mut self, id: RequestId) -> Option<crate::request::PendingRequest> {
        let entry = self.correlator.resolve(id)?;
        if let Some(timer_id) = entry.timer_id {
            self.cancel_timer(timer_id);
        }
        self.monitor.record(RuntimeEvent::Request(RequestEvent::Resolved { at: Utc::now(), id }));
        Some(entry)
    }

    /// The timer backing `id` fired; cancels the correlator entry *before*
    /// the caller synthesizes the timeout error (§4.9 ordering note), then
    /// returns the entry so the caller can address the synthetic response.
    pub fn fire_request_timeout(&mut self, id: RequestId) -> Option<crate::request::PendingRequest> {
        let entry = self.correlator.fire_timeout(id)?;
        self.monitor.record(RuntimeEvent::Request(RequestEvent::TimedOut { at: Utc::now(), id }));
        Some(entry)
    }

    /// Cancel every timer and request this actor still owns (§4.4
    /// `shutdown_finish`, P5).
    pub fn cancel_all_for(&mut self, actor: ActorId) {
        for request_id in self.correlator.pending_for(actor) {
            self.correlator.fire_timeout(request_id);
        }
        for entry in self.timers.cancel_all_for(actor) {
            self.monitor
                .record(RuntimeEvent::Timer(TimerEvent::Cancelled { at: Utc::now(), owner: entry.owner }));
        }
    }

    pub fn forget_child(&mut self, actor: ActorId) {
        self.children.remove(actor);
    }

    pub fn children(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.children.children()
    }

    /// One iteration of §4.3 step 1-4: pop the front message, invoke its
    /// recipients in insertion order, then release the message --
    /// re-publishing to `next_route` if this was the last live reference.
    ///
    /// Returns the errors any handler raised, so the caller can route them
    /// to `system::SystemContext::on_error` (B4: a handler never recovers
    /// its own panic-equivalent locally).
    pub fn dispatch_one(&mut self) -> Option<Vec<ExtendedError>> {
        let envelope = self.queue.pop_front()?;
        let mut errors = Vec::new();

        // §4.5 step 4: any envelope stamped with a request id is a reply
        // (or a synthetic timeout, which carries its own id too but is
        // already resolved by the time it is routed) -- cancel the backing
        // timer before handlers run, so a handler observing `is_pending`
        // elsewhere never sees a reply that arrived but didn't yet clear
        // its correlator entry.
        if let Some(request_id) = envelope.request_id() {
            self.resolve_request(request_id);
        }

        // This table only ever indexes locally-owned addresses (P2); a
        // message destined elsewhere never reaches this lookup at all --
        // `route` sent it straight to the destination's own supervisor
        // inbound queue before it was ever enqueued here (§4.3 steps 1/3).
        // Recipients found here still split by who owns the *handler*:
        // `internal_handlers` belong to actors this supervisor itself
        // hosts and are invoked in-process; `external_handlers` belong to
        // a foreign actor that subscribed onto this local address, so
        // their copy of the envelope is packaged and pushed onto that
        // actor's own supervisor's inbound queue instead (§4.3 step 3).
        if let Some(bucket) = self
            .subscriptions
            .recipients(envelope.destination().id(), envelope.type_id())
        {
            for handler in bucket.internal_handlers.iter() {
                if let Err(err) = handler.invoke(&envelope) {
                    errors.push(err);
                }
            }

            for foreign in bucket.external_handlers.iter() {
                let _ = foreign.home.deliver(envelope.clone());
            }
        }

        // §4.3 step 4: once every handler has returned, release the
        // message; if this was the last live reference and a next_route
        // was stamped, re-publish to it. Handlers that need to retain the
        // envelope past this point (the chunked-continuation / IO-tag
        // pattern) clone it during `invoke`, which bumps the refcount and
        // so defers this check to their own eventual drop -- this crate
        // checks only at the end of the synchronous dispatch tick rather
        // than hooking `Envelope`'s `Drop`, since no handler may suspend
        // mid-dispatch (§5) and so "last reference" is already decided by
        // the time this line runs for the overwhelmingly common case.
        if envelope.ref_count() == 1 {
            if let Some(republished) = envelope.rerouted() {
                self.route(republished);
            }
        }

        Some(errors)
    }

    /// Drains the run queue to empty (§4.3 step 5's non-shutdown exit
    /// condition). The caller is responsible for checking supervisor state
    /// and stopping early on `SHUT_DOWN`.
    pub fn do_process(&mut self) -> Vec<ExtendedError> {
        let mut errors = Vec::new();
        while let Some(mut batch) = self.dispatch_one() {
            errors.append(&mut batch);
        }
        errors
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.timers.is_empty()
    }

    /// The earliest pending timer deadline, for a [`crate::backend::Backend`]
    /// to sleep until (§6.1).
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.timers.next_deadline()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::subscription::SubscriptionState;
    use crate::supervisor::config::SupervisorConfig;

    #[derive(Debug)]
    struct Ping;
    impl Payload for Ping {
        const TYPE_NAME: &'static str = "ping";
    }

    #[test]
    fn external_handler_is_forwarded_to_its_owners_supervisor_instead_of_invoked() {
        let mut owner_core = Core::new(SupervisorConfig::default());
        let local_address = owner_core.mint_address(owner_core.id());

        let mut foreign_core = Core::new(SupervisorConfig::default());
        let foreign_actor = ActorId::new();
        let foreign_home = foreign_core.mint_address(foreign_actor);

        let handler = Handler::new(foreign_actor, std::any::TypeId::of::<Ping>(), "ping", |_| {
            panic!("external handlers must never be invoked in-process")
        });
        let point = SubscriptionPoint { handler, address: local_address.clone() };
        let info = owner_core.subscribe_foreign(point, foreign_actor, foreign_home);
        assert_eq!(info.state, SubscriptionState::Established);
        assert_eq!(info.owner_tag, OwnerTag::Foreign);

        owner_core.route(Envelope::new(local_address, Ping));
        assert!(owner_core.do_process().is_empty());

        foreign_core.drain_inbound();
        assert_eq!(foreign_core.queue_len(), 1, "forwarded copy should land on the foreign owner's queue");
    }

    #[test]
    fn internal_handler_on_the_same_address_still_runs_in_process() {
        let mut core = Core::new(SupervisorConfig::default());
        let address = core.mint_address(core.id());
        let invoked = Rc::new(std::cell::Cell::new(false));
        let invoked_clone = invoked.clone();
        let handler = Handler::new(core.id(), std::any::TypeId::of::<Ping>(), "ping", move |_| {
            invoked_clone.set(true);
            Ok(())
        });
        let point = SubscriptionPoint { handler, address: address.clone() };
        core.subscribe(point, core.id(), OwnerTag::Anonymous);

        core.route(Envelope::new(address, Ping));
        assert!(core.do_process().is_empty());
        assert!(invoked.get());
    }
}
