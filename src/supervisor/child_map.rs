use std::collections::HashMap;

use crate::address::{Address, AddressId};
use crate::util::ActorId;

/// Address-to-local-actor lookup (§4.9 `address_mapping.h`), kept separate
/// from [`crate::subscription::SubscriptionTable`]: the subscription table
/// answers "who handles this (address, type)", while this answers "is this
/// address one of my children, and which one" -- the question the
/// children-manager-equivalent plugins (lifetime, link-server, registry)
/// ask constantly and would otherwise have to derive by scanning
/// subscriptions.
#[derive(Debug, Default)]
pub struct ChildMap {
    by_address: HashMap<AddressId, ActorId>,
    main_address: HashMap<ActorId, Address>,
}

impl ChildMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `actor`'s main address, making it and `actor` mutually
    /// discoverable.
    pub fn insert(&mut self, actor: ActorId, main_address: Address) {
        self.by_address.insert(main_address.id(), actor);
        self.main_address.insert(actor, main_address);
    }

    pub fn owner_of(&self, address: AddressId) -> Option<ActorId> {
        self.by_address.get(&address).copied()
    }

    pub fn main_address_of(&self, actor: ActorId) -> Option<&Address> {
        self.main_address.get(&actor)
    }

    pub fn is_local(&self, address: AddressId) -> bool {
        self.by_address.contains_key(&address)
    }

    pub fn remove(&mut self, actor: ActorId) {
        if let Some(address) = self.main_address.remove(&actor) {
            self.by_address.remove(&address.id());
        }
    }

    pub fn children(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.main_address.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.main_address.len()
    }

    pub fn is_empty(&self) -> bool {
        self.main_address.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{LocalityToken, SupervisorHandle};
    use std::sync::mpsc::channel;

    fn test_address(owner: ActorId) -> Address {
        Address::new(owner, LocalityToken::new_leader(), SupervisorHandle::new(channel().0))
    }

    #[test]
    fn inserted_child_is_local_and_reachable_both_ways() {
        let mut map = ChildMap::new();
        let actor = ActorId::new();
        let address = test_address(actor);
        map.insert(actor, address.clone());

        assert!(map.is_local(address.id()));
        assert_eq!(map.owner_of(address.id()), Some(actor));
        assert_eq!(map.main_address_of(actor).map(Address::id), Some(address.id()));
    }

    #[test]
    fn remove_drops_both_indexes() {
        let mut map = ChildMap::new();
        let actor = ActorId::new();
        let address = test_address(actor);
        map.insert(actor, address.clone());
        map.remove(actor);

        assert!(!map.is_local(address.id()));
        assert!(map.main_address_of(actor).is_none());
    }
}
