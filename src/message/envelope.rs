use std::any::{Any, TypeId};
use std::fmt;

use chrono::{DateTime, Utc};

use super::payload::Payload;
use crate::address::Address;
use crate::util::{MessageId, Rc, RequestId};

/// The type-erased envelope that actually flows through queues (§3
/// "Message").
///
/// Actor and plugin code works with strongly-typed `Payload`s; the
/// supervisor's queue and the subscription table cannot be generic over
/// every payload type that will ever exist in a running system, so at the
/// queue boundary the payload is boxed behind `Rc<dyn Any + Send + Sync>`
/// and recovered by [`Envelope::downcast`] using the statically-known
/// `TypeId` the subscriber registered for. This is the direct Rust
/// translation of the original's `message_t<M> : message_base_t` pattern,
/// where `message_base_t` erased the payload behind a `type_index`.
///
/// Ownership: the payload is reference-counted (`Rc`, §9 "Intrusive
/// reference counts"); the envelope itself is cheap to clone since cloning
/// only bumps that refcount plus the small fixed header. When the last
/// holder drops its clone and `next_route` is set, the runtime re-publishes
/// the same payload to `next_route` (§3, §4.3 step 4) -- the
/// "released-when-last-holder" pattern used for post-delivery cleanup.
#[derive(Clone)]
pub struct Envelope {
    id: MessageId,
    type_id: TypeId,
    type_name: &'static str,
    destination: Address,
    next_route: Option<Address>,
    timestamp: DateTime<Utc>,
    request_id: Option<RequestId>,
    payload: Rc<dyn Any + Send + Sync>,
}

impl Envelope {
    pub fn new<P: Payload>(destination: Address, payload: P) -> Self {
        Self {
            id: MessageId::new(),
            type_id: TypeId::of::<P>(),
            type_name: P::TYPE_NAME,
            destination,
            next_route: None,
            timestamp: Utc::now(),
            request_id: None,
            payload: Rc::new(payload),
        }
    }

    /// Stamp a post-delivery forward address: once every current holder of
    /// this envelope has dropped its reference, it is re-published to
    /// `route` (§4.1 "routed message").
    pub fn with_next_route(mut self, route: Address) -> Self {
        self.next_route = Some(route);
        self
    }

    /// Stamp the request/response correlation id (§4.5). Any payload type
    /// can serve as a reply; the correlator matches purely on this id, not
    /// on a dedicated "response" payload type.
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn request_id(&self) -> Option<RequestId> {
        self.request_id
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn destination(&self) -> &Address {
        &self.destination
    }

    pub fn next_route(&self) -> Option<&Address> {
        self.next_route.as_ref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Number of live references to the payload, including this one. The
    /// supervisor loop uses this to decide whether it just dropped the
    /// *last* holder (§4.3 step 4).
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.payload)
    }

    /// Build the post-delivery re-publication of this envelope to its
    /// `next_route`, if one was stamped (§3, §4.3 step 4). The caller is
    /// responsible for only calling this once it has confirmed no other
    /// holder is retaining the original (`ref_count() == 1`) -- this
    /// method itself just performs the rewrite, it does not check.
    pub fn rerouted(&self) -> Option<Self> {
        let next_route = self.next_route.clone()?;
        Some(Self {
            id: self.id,
            type_id: self.type_id,
            type_name: self.type_name,
            destination: next_route,
            next_route: None,
            timestamp: self.timestamp,
            request_id: self.request_id,
            payload: self.payload.clone(),
        })
    }

    /// Recover the strongly-typed payload, or `None` if `P` does not match
    /// the type this envelope was constructed with.
    pub fn downcast<P: Payload>(&self) -> Option<&P> {
        if self.type_id == TypeId::of::<P>() {
            self.payload.downcast_ref::<P>()
        } else {
            None
        }
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("id", &self.id)
            .field("type_name", &self.type_name)
            .field("destination", &self.destination)
            .field("has_next_route", &self.next_route.is_some())
            .finish()
    }
}
