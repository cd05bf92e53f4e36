//! Library-internal message payloads that drive the lifecycle, link, and
//! registry protocols (§4.4, §4.6, §4.7). User code sends and receives
//! these only indirectly, through `ActorContext`/plugin helper methods; the
//! crate's default [`crate::monitoring::Stringifier`] knows how to render
//! every one of them.

use super::payload::Payload;
use crate::address::Address;
use crate::error::ExtendedError;
use crate::util::RequestId;

/// Sent by a supervisor to a freshly-created child to begin init (§4.4).
#[derive(Debug, Clone)]
pub struct InitRequest {
    pub reply_to: Address,
}
impl Payload for InitRequest {
    const TYPE_NAME: &'static str = "init_request";
}

/// Reply to an [`InitRequest`] once every plugin's init precondition holds,
/// or the first failure encountered along the way.
#[derive(Debug, Clone)]
pub struct InitResponse {
    pub result: Result<(), ExtendedError>,
}
impl Payload for InitResponse {
    const TYPE_NAME: &'static str = "init_response";
}

/// Requests an actor begin shutdown (§4.4). `reason` is `None` for a plain
/// graceful stop and `Some` when shutdown was triggered by an error.
#[derive(Debug, Clone)]
pub struct ShutdownRequest {
    pub reply_to: Address,
    pub reason: Option<ExtendedError>,
}
impl Payload for ShutdownRequest {
    const TYPE_NAME: &'static str = "shutdown_request";
}

/// Reply once every plugin's shutdown precondition holds.
#[derive(Debug, Clone)]
pub struct ShutdownResponse {
    pub result: Result<(), ExtendedError>,
}
impl Payload for ShutdownResponse {
    const TYPE_NAME: &'static str = "shutdown_response";
}

/// Sent by the supervisor once every child has confirmed init; the starter
/// plugin reacts by calling `on_start` (§4.4).
#[derive(Debug, Clone)]
pub struct StartTrigger;
impl Payload for StartTrigger {
    const TYPE_NAME: &'static str = "start_trigger";
}

/// Asks a supervisor (or any actor acting as its own supervisor proxy) to
/// begin shutting down -- used for failure escalation (§4.4, §4.8) and for
/// `SupervisorConfig::shutdown_flag` polling (§6.2).
#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    pub reason: Option<ExtendedError>,
}
impl Payload for ShutdownTrigger {
    const TYPE_NAME: &'static str = "shutdown_trigger";
}

/// Delivered to a requester's `reply_to` address when a `request()` timed
/// out before any reply arrived (§4.5 R3). A successful reply can be any
/// payload type the callee chose to send back; a timeout has no such
/// per-call type, so it is always this one payload, matched by the
/// correlator on `request_id` just like a real reply would be.
#[derive(Debug, Clone)]
pub struct RequestTimedOut {
    pub request_id: RequestId,
    pub error: ExtendedError,
}
impl Payload for RequestTimedOut {
    const TYPE_NAME: &'static str = "request_timed_out";
}

// --- Link protocol (§4.7) ---------------------------------------------

#[derive(Debug, Clone)]
pub struct LinkRequest {
    pub client: Address,
}
impl Payload for LinkRequest {
    const TYPE_NAME: &'static str = "link_request";
}

#[derive(Debug, Clone)]
pub struct LinkResponse {
    pub result: Result<(), ExtendedError>,
}
impl Payload for LinkResponse {
    const TYPE_NAME: &'static str = "link_response";
}

#[derive(Debug, Clone)]
pub struct UnlinkRequest {
    pub client: Address,
}
impl Payload for UnlinkRequest {
    const TYPE_NAME: &'static str = "unlink_request";
}

#[derive(Debug, Clone)]
pub struct UnlinkResponse {
    pub result: Result<(), ExtendedError>,
}
impl Payload for UnlinkResponse {
    const TYPE_NAME: &'static str = "unlink_response";
}

/// Sent by a server to every linked client once it begins shutting down
/// (§4.7). `reason` is populated when the server is going down due to a
/// failure, which is how failure escalation reaches a linked client's
/// `on_unlink`.
#[derive(Debug, Clone)]
pub struct UnlinkNotify {
    pub server: Address,
    pub reason: Option<ExtendedError>,
}
impl Payload for UnlinkNotify {
    const TYPE_NAME: &'static str = "unlink_notify";
}

// --- Registry protocol (§4.6) ------------------------------------------

#[derive(Debug, Clone)]
pub struct RegisterName {
    pub name: String,
    pub address: Address,
}
impl Payload for RegisterName {
    const TYPE_NAME: &'static str = "register_name";
}

#[derive(Debug, Clone)]
pub struct RegisterNameResponse {
    pub result: Result<(), ExtendedError>,
}
impl Payload for RegisterNameResponse {
    const TYPE_NAME: &'static str = "register_name_response";
}

#[derive(Debug, Clone)]
pub enum DeregisterTarget {
    Name(String),
    Address(Address),
}

#[derive(Debug, Clone)]
pub struct DeregisterRequest {
    pub target: DeregisterTarget,
}
impl Payload for DeregisterRequest {
    const TYPE_NAME: &'static str = "deregister_request";
}

#[derive(Debug, Clone)]
pub struct DiscoveryRequest {
    pub name: String,
    pub requester: Address,
}
impl Payload for DiscoveryRequest {
    const TYPE_NAME: &'static str = "discovery_request";
}

#[derive(Debug, Clone)]
pub struct DiscoveryResponse {
    pub result: Result<Address, ExtendedError>,
}
impl Payload for DiscoveryResponse {
    const TYPE_NAME: &'static str = "discovery_response";
}

/// Registers interest in a name that may not exist yet (§4.6 race note): a
/// strict "wait then proceed" caller uses this instead of
/// [`DiscoveryRequest`], and receives a single [`DiscoveryFuture`] once the
/// name becomes registered.
#[derive(Debug, Clone)]
pub struct DiscoveryPromise {
    pub name: String,
    pub waiter: Address,
}
impl Payload for DiscoveryPromise {
    const TYPE_NAME: &'static str = "discovery_promise";
}

#[derive(Debug, Clone)]
pub struct DiscoveryFuture {
    pub name: String,
    pub address: Address,
}
impl Payload for DiscoveryFuture {
    const TYPE_NAME: &'static str = "discovery_future";
}

/// Cancels a still-pending [`DiscoveryPromise`].
#[derive(Debug, Clone)]
pub struct DiscoveryCancel {
    pub name: String,
    pub waiter: Address,
}
impl Payload for DiscoveryCancel {
    const TYPE_NAME: &'static str = "discovery_cancel";
}
