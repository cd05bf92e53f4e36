use crate::address::Address;
use crate::message::Handler;
use crate::util::ActorId;

/// Who performed the subscription (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerTag {
    /// Subscribed directly by actor code with no plugin in between.
    Anonymous,
    /// Subscribed on behalf of the actor by one of its lifecycle plugins.
    Plugin,
    /// Temporarily instantiated by the supervisor itself for
    /// request/response handling (§4.5).
    Supervisor,
    /// Subscribed by an actor hosted on a different supervisor (§4.2
    /// "foreign addresses route through the owning supervisor via
    /// `external_subscription` messages"). Only ever materialised through
    /// [`crate::supervisor::Core::subscribe_foreign`]; the owning handler's
    /// home address is what `HandlerBucket` forwards delivery to.
    Foreign,
}

/// `(handler, address)` pair identifying a subscription point (§3).
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionPoint {
    pub handler: Handler,
    pub address: Address,
}

/// Lifecycle state of a [`SubscriptionInfo`] (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    /// Registered but not yet confirmed by the owning supervisor -- only
    /// reachable for a [`OwnerTag::Foreign`] point on an address this
    /// supervisor does not own, pending the `external_subscription`
    /// round-trip (§4.2 `materialise`: "`SUBSCRIBING` pending confirmation
    /// from owning supervisor").
    Subscribing,
    /// Confirmed and routable.
    Established,
    /// Being torn down; still routable until `forget` removes it.
    Unsubscribing,
}

/// A materialised subscription point with full bookkeeping (§3).
#[derive(Debug, Clone)]
pub struct SubscriptionInfo {
    pub point: SubscriptionPoint,
    pub owner: ActorId,
    pub owner_tag: OwnerTag,
    pub state: SubscriptionState,
    /// Whether `point.address` is owned by this supervisor (P2).
    pub internal_address: bool,
    /// For an [`OwnerTag::Foreign`] point: the subscribing actor's own
    /// address, i.e. where a matched message is forwarded to (§4.3 step 3).
    /// `None` for every other owner tag.
    pub home: Option<Address>,
}

impl SubscriptionInfo {
    pub fn new(
        point: SubscriptionPoint,
        owner: ActorId,
        owner_tag: OwnerTag,
        internal_address: bool,
        home: Option<Address>,
    ) -> Self {
        let state = if internal_address {
            SubscriptionState::Established
        } else {
            SubscriptionState::Subscribing
        };
        Self {
            point,
            owner,
            owner_tag,
            state,
            internal_address,
            home,
        }
    }

    /// Confirmation arrived from the owning supervisor (§4.2): a
    /// `Subscribing` foreign point becomes routable.
    pub fn confirm(&mut self) {
        if self.state == SubscriptionState::Subscribing {
            self.state = SubscriptionState::Established;
        }
    }

    pub fn begin_unsubscribe(&mut self) {
        self.state = SubscriptionState::Unsubscribing;
    }
}
