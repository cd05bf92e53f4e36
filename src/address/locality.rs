use crate::util::Rc;

/// Opaque, pointer-identity execution-context token (§4.1).
///
/// "A locality group" is the set of supervisors sharing one backend loop;
/// its leader is the one that physically owns the queues (§4.3). Every
/// address and every supervisor in a group clones its `LocalityToken` from
/// the leader at creation time, so `same_locality` is a cheap pointer-equal
/// check with no lookup involved, exactly mirroring the C++ `locality: const
/// void*` field on `address_t`.
#[derive(Clone)]
pub struct LocalityToken(Rc<()>);

impl LocalityToken {
    /// Mint a fresh token for a new locality-group leader.
    pub fn new_leader() -> Self {
        Self(Rc::new(()))
    }

    pub fn same_locality(&self, other: &LocalityToken) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_of_one_leader_share_locality() {
        let leader = LocalityToken::new_leader();
        let member = leader.clone();
        assert!(leader.same_locality(&member));
    }

    #[test]
    fn two_leaders_never_share_locality() {
        let a = LocalityToken::new_leader();
        let b = LocalityToken::new_leader();
        assert!(!a.same_locality(&b));
    }
}
