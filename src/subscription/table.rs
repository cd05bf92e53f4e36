use std::any::TypeId;
use std::collections::HashMap;

use super::point::{OwnerTag, SubscriptionInfo, SubscriptionPoint};
use crate::address::{Address, AddressId};
use crate::message::Handler;
use crate::util::ActorId;

/// A handler belonging to an actor hosted on a different supervisor,
/// together with where to forward a matched delivery (§4.2, §4.3 step 3).
#[derive(Debug, Clone)]
pub struct ForeignHandler {
    pub handler: Handler,
    pub home: Address,
}

/// Handlers registered for one `(address, message type)` key (§3, §4.2),
/// split the way `recipients(message)` returns them: `internal_handlers`
/// are invoked in-process, `external_handlers` are packaged into a forward
/// message and enqueued to their owner's supervisor (§4.3 step 3).
#[derive(Debug, Default, Clone)]
pub struct HandlerBucket {
    pub internal_handlers: Vec<Handler>,
    pub external_handlers: Vec<ForeignHandler>,
}

impl HandlerBucket {
    fn is_empty(&self) -> bool {
        self.internal_handlers.is_empty() && self.external_handlers.is_empty()
    }

    fn insert_internal(&mut self, handler: Handler) {
        if !self.internal_handlers.contains(&handler) {
            self.internal_handlers.push(handler);
        }
    }

    fn insert_external(&mut self, handler: Handler, home: Address) {
        if !self.external_handlers.iter().any(|fh| fh.handler == handler) {
            self.external_handlers.push(ForeignHandler { handler, home });
        }
    }

    fn remove(&mut self, handler: &Handler) {
        self.internal_handlers.retain(|h| h != handler);
        self.external_handlers.retain(|fh| &fh.handler != handler);
    }

    fn replace(&mut self, handler: &Handler, new_handler: Handler) {
        if let Some(slot) = self.internal_handlers.iter_mut().find(|h| *h == handler) {
            *slot = new_handler;
            return;
        }
        if let Some(slot) = self.external_handlers.iter_mut().find(|fh| &fh.handler == handler) {
            slot.handler = new_handler;
        }
    }
}

/// The per-supervisor subscription and routing table (§3, §4.2).
///
/// `internal_infos` and `mine_handlers` only ever hold entries for
/// addresses this supervisor owns (P2) -- a point materialised against a
/// foreign address is returned to the caller (state `Subscribing`) but not
/// stored here at all; driving it to `Established` is the job of whichever
/// supervisor *does* own that address, via [`SubscriptionTable::confirm`]
/// on its own table (see [`crate::supervisor::Core::subscribe_foreign`]).
/// A handler subscribed by a foreign owner onto one of *my* addresses, by
/// contrast, is indexed here in `external_handlers` rather than
/// `internal_handlers` so dispatch forwards to it instead of invoking it
/// in-process (§4.3 step 3).
#[derive(Debug, Default)]
pub struct SubscriptionTable {
    internal_infos: HashMap<AddressId, Vec<SubscriptionInfo>>,
    mine_handlers: HashMap<(AddressId, TypeId), HandlerBucket>,
}

impl SubscriptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify and register a subscription point (§4.2 `materialise`).
    ///
    /// `internal_address` is computed by the caller (the supervisor, which
    /// alone knows its children map) rather than by the table itself,
    /// keeping this a pure data structure. `home` is `Some` exactly when
    /// `owner_tag` is [`OwnerTag::Foreign`]: the subscribing actor's own
    /// address, used to forward matched deliveries back to it.
    pub fn materialise(
        &mut self,
        point: SubscriptionPoint,
        owner: ActorId,
        owner_tag: OwnerTag,
        internal_address: bool,
        home: Option<Address>,
    ) -> SubscriptionInfo {
        let info = SubscriptionInfo::new(point.clone(), owner, owner_tag, internal_address, home);

        if internal_address {
            self.internal_infos
                .entry(point.address.id())
                .or_default()
                .push(info.clone());

            // `Established` is indexed for dispatch immediately; a
            // `Foreign` point starts `Subscribing` and is only reachable
            // from `recipients` once `confirm` runs -- a message delivered
            // to this address before confirmation must not be forwarded to
            // an owner who does not yet know it is subscribed.
            if info.state == SubscriptionState::Established {
                self.index_handler(&point, owner_tag, info.home.clone());
            }
        }

        info
    }

    fn index_handler(&mut self, point: &SubscriptionPoint, owner_tag: OwnerTag, home: Option<Address>) {
        let bucket = self
            .mine_handlers
            .entry((point.address.id(), point.handler.type_id()))
            .or_default();

        match (owner_tag, home) {
            (OwnerTag::Foreign, Some(home)) => bucket.insert_external(point.handler.clone(), home),
            _ => bucket.insert_internal(point.handler.clone()),
        }
    }

    /// Confirmation arrived for a previously `Subscribing` foreign point
    /// (§4.2): index it for dispatch now that the owning supervisor has
    /// validated the request. No-op if `info` was never `Subscribing`.
    pub fn confirm(&mut self, info: &mut SubscriptionInfo) {
        if info.state != SubscriptionState::Subscribing {
            return;
        }
        info.confirm();
        if let Some(infos) = self.internal_infos.get_mut(&info.point.address.id()) {
            if let Some(stored) = infos.iter_mut().find(|i| i.point == info.point) {
                stored.confirm();
            }
        }
        if info.internal_address {
            self.index_handler(&info.point, info.owner_tag, info.home.clone());
        }
    }

    /// In-place handler replacement, used by tag upgrades (§4.2 `update`).
    pub fn update(&mut self, address: AddressId, old_handler: &Handler, new_handler: Handler) {
        if let Some(bucket) = self
            .mine_handlers
            .get_mut(&(address, old_handler.type_id()))
        {
            bucket.replace(old_handler, new_handler.clone());
        }
        if let Some(infos) = self.internal_infos.get_mut(&address) {
            for info in infos.iter_mut() {
                if &info.point.handler == old_handler {
                    info.point.handler = new_handler.clone();
                }
            }
        }
    }

    /// Remove a subscription from both indexes (§4.2 `forget`); drops the
    /// address key entirely once its info list is empty.
    pub fn forget(&mut self, info: &SubscriptionInfo) {
        let address = info.point.address.id();

        if let Some(infos) = self.internal_infos.get_mut(&address) {
            infos.retain(|i| i.point != info.point);
            if infos.is_empty() {
                self.internal_infos.remove(&address);
            }
        }

        let key = (address, info.point.handler.type_id());
        if let Some(bucket) = self.mine_handlers.get_mut(&key) {
            bucket.remove(&info.point.handler);
            if bucket.is_empty() {
                self.mine_handlers.remove(&key);
            }
        }
    }

    /// Look up recipients for `(address, type_id)` (§4.2 `recipients`).
    pub fn recipients(&self, address: AddressId, type_id: TypeId) -> Option<&HandlerBucket> {
        self.mine_handlers.get(&(address, type_id))
    }

    /// All subscription infos recorded for a locally-owned address.
    pub fn infos_for(&self, address: AddressId) -> &[SubscriptionInfo] {
        self.internal_infos
            .get(&address)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All subscription infos belonging to one actor, across all of its
    /// addresses -- used when an actor deactivates and must unsubscribe
    /// everything it ever registered (§4.4 "lifetime" plugin).
    pub fn infos_owned_by(&self, owner: ActorId) -> Vec<SubscriptionInfo> {
        self.internal_infos
            .values()
            .flatten()
            .filter(|info| info.owner == owner)
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.internal_infos.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::address::{Address, LocalityToken, SupervisorHandle};
    use crate::message::Payload;
    use std::any::TypeId as StdTypeId;
    use std::sync::mpsc::channel;

    #[derive(Debug)]
    struct Ping;
    impl Payload for Ping {
        const TYPE_NAME: &'static str = "ping";
    }

    fn test_address(owner: ActorId) -> Address {
        Address::new(owner, LocalityToken::new_leader(), SupervisorHandle::new(channel().0))
    }

    #[test]
    fn materialise_internal_address_is_established_and_indexed() {
        let mut table = SubscriptionTable::new();
        let owner = ActorId::new();
        let address = test_address(owner);
        let handler = Handler::new(owner, StdTypeId::of::<Ping>(), "ping", |_| Ok(()));
        let point = SubscriptionPoint { handler: handler.clone(), address: address.clone() };

        let info = table.materialise(point, owner, OwnerTag::Anonymous, true, None);
        assert_eq!(info.state, crate::subscription::SubscriptionState::Established);

        let bucket = table.recipients(address.id(), StdTypeId::of::<Ping>()).unwrap();
        assert_eq!(bucket.internal_handlers.len(), 1);
    }

    #[test]
    fn materialise_non_owned_address_is_not_indexed() {
        let mut table = SubscriptionTable::new();
        let owner = ActorId::new();
        let address = test_address(owner);
        let handler = Handler::new(owner, StdTypeId::of::<Ping>(), "ping", |_| Ok(()));
        let point = SubscriptionPoint { handler, address: address.clone() };

        // `internal_address=false` models a supervisor misuse case (P2):
        // a point on an address this table's owner does not hold. There is
        // no owning-supervisor confirmation protocol to promote it later,
        // so it is simply never indexed.
        let info = table.materialise(point, owner, OwnerTag::Anonymous, false, None);
        assert_eq!(info.state, crate::subscription::SubscriptionState::Established);
        assert!(table.recipients(address.id(), StdTypeId::of::<Ping>()).is_none());
    }

    #[test]
    fn forget_removes_from_both_indexes_and_drops_empty_key() {
        let mut table = SubscriptionTable::new();
        let owner = ActorId::new();
        let address = test_address(owner);
        let handler = Handler::new(owner, StdTypeId::of::<Ping>(), "ping", |_| Ok(()));
        let point = SubscriptionPoint { handler, address: address.clone() };
        let info = table.materialise(point, owner, OwnerTag::Anonymous, true, None);

        table.forget(&info);
        assert!(table.recipients(address.id(), StdTypeId::of::<Ping>()).is_none());
        assert!(table.infos_for(address.id()).is_empty());
    }

    #[test]
    fn recipients_returns_none_for_unknown_key() {
        let table = SubscriptionTable::new();
        assert!(table
            .recipients(AddressId::new(), StdTypeId::of::<Ping>())
            .is_none());
    }

    #[test]
    fn no_duplicate_handler_address_pairs() {
        let mut table = SubscriptionTable::new();
        let owner = ActorId::new();
        let address = test_address(owner);
        let handler = Handler::new(owner, StdTypeId::of::<Ping>(), "ping", |_| Ok(()));
        let point = SubscriptionPoint { handler: handler.clone(), address: address.clone() };

        table.materialise(point.clone(), owner, OwnerTag::Anonymous, true, None);
        table.materialise(point, owner, OwnerTag::Anonymous, true, None);

        let bucket = table.recipients(address.id(), StdTypeId::of::<Ping>()).unwrap();
        assert_eq!(bucket.internal_handlers.len(), 1);
    }

    #[test]
    fn infos_owned_by_filters_across_addresses() {
        let mut table = SubscriptionTable::new();
        let owner = ActorId::new();
        let other_owner = ActorId::new();
        let address_a = test_address(owner);
        let address_b = test_address(owner);
        let address_c = test_address(other_owner);

        for address in [&address_a, &address_b, &address_c] {
            let handler = Handler::new(owner, StdTypeId::of::<Ping>(), "ping", |_| Ok(()));
            let point = SubscriptionPoint { handler, address: address.clone() };
            let actual_owner = if address == &address_c { other_owner } else { owner };
            table.materialise(point, actual_owner, OwnerTag::Anonymous, true, None);
        }

        assert_eq!(table.infos_owned_by(owner).len(), 2);
        assert_eq!(table.infos_owned_by(other_owner).len(), 1);
    }
}
