//! # locality-rt - a cooperative, plugin-driven actor runtime
//!
//! A general-purpose actor runtime: it hosts many small,
//! independently-addressable actors and routes typed messages between
//! them. Each actor is pinned to a [`supervisor::Supervisor`] (an
//! execution locality); actor lifecycles (init -> operate -> shutdown) are
//! driven by an ordered [`actor::Plugin`] pipeline; requests get
//! correlated responses with timeouts; dependent actors can link to one
//! another; and a [`registry::RegistryActor`] resolves names to addresses.
//!
//! # Quick start
//!
//! ```
//! use locality_rt::actor::ActorConfig;
//! use locality_rt::message::{Envelope, Handler, Payload};
//! use locality_rt::subscription::OwnerTag;
//! use locality_rt::supervisor::{Supervisor, SupervisorConfig};
//! use std::any::TypeId;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! #[derive(Debug, Clone)]
//! struct Ping;
//! impl Payload for Ping {
//!     const TYPE_NAME: &'static str = "ping";
//! }
//!
//! let mut supervisor = Supervisor::new(SupervisorConfig::default());
//! let seen = Rc::new(Cell::new(false));
//! let seen_in_hook = seen.clone();
//!
//! supervisor.spawn_with_hook(ActorConfig::default(), move |ctx| {
//!     let Some(address) = ctx.main_address().cloned() else { return };
//!     ctx.subscribe(
//!         address.clone(),
//!         Handler::new(ctx.id(), TypeId::of::<Ping>(), Ping::TYPE_NAME, move |_envelope| {
//!             seen_in_hook.set(true);
//!             Ok(())
//!         }),
//!         OwnerTag::Plugin,
//!     );
//!     ctx.send(address, Ping);
//! });
//!
//! supervisor.run_until_idle();
//! assert!(seen.get());
//! ```
//!
//! # Module organization
//!
//! Leaves first, matching the component table in the design document:
//!
//! - [`util`] - identifiers ([`util::ActorId`], [`util::AddressId`],
//!   [`util::MessageId`], [`util::RequestId`]) and the reference-counting
//!   strategy switch.
//! - [`error`] - the closed [`error::ErrorCode`] set and the chained
//!   [`error::ExtendedError`].
//! - [`address`] - [`address::Address`], the identity and delivery anchor,
//!   and [`address::LocalityToken`], which decides same-thread routing.
//! - [`message`] - [`message::Payload`], the type-erased
//!   [`message::Envelope`] that actually flows through queues, and
//!   [`message::Handler`].
//! - [`subscription`] - the per-supervisor subscription/routing table.
//! - [`timer`] - the logical timer wheel a backend's tick drains.
//! - [`request`] - request/response correlation with timers.
//! - [`actor`] - the actor lifecycle state machine and its 8-plugin
//!   pipeline (address-maker, lifetime, init-shutdown, link-server,
//!   link-client, registry, resources, starter).
//! - [`supervisor`] - the execution loop: queueing, dispatch, timers, and
//!   cross-supervisor delivery.
//! - [`registry`] - the name-registry actor built on top of the pipeline.
//! - [`spawner`] - the restart-policy engine for supervised children.
//! - [`system`] - the process-wide root object and its `on_error` hook.
//! - [`backend`] - the host event-loop contract, plus one reference
//!   implementation ([`backend::ThreadBackend`]).
//! - [`monitoring`] - typed runtime events and the pluggable stringifier;
//!   this crate's entire logging story.
//!
//! # Concurrency model
//!
//! Scheduling is cooperative and single-threaded per locality group: one
//! OS thread drives the backend loop for every supervisor sharing one
//! locality leader, and handlers run to completion without suspending.
//! Crossing locality groups (and therefore threads) happens only by
//! enqueueing onto another supervisor's inbound channel. See
//! [`address::LocalityToken`] and [`supervisor::Core::route`].

pub mod actor;
pub mod address;
pub mod backend;
pub mod error;
pub mod message;
pub mod monitoring;
pub mod registry;
pub mod request;
pub mod spawner;
pub mod subscription;
pub mod supervisor;
pub mod system;
pub mod timer;
pub mod util;

pub mod prelude;

pub use actor::{ActorBase, ActorConfig, ActorContext, ActorState, Plugin, PluginId, Reaction};
pub use address::Address;
pub use error::{ErrorCode, ExtendedError};
pub use message::{Envelope, Handler, Payload};
pub use registry::RegistryActor;
pub use spawner::{RestartPolicy, Spawner};
pub use supervisor::{Supervisor, SupervisorConfig};
pub use system::SystemContext;
pub use util::{ActorId, AddressId, MessageId, RequestId};
