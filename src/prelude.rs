//! Convenience re-exports for building actors on top of this runtime.
//!
//! ```
//! use locality_rt::prelude::*;
//! ```
//!
//! Pulls in the pieces almost every actor needs -- configuration,
//! addressing, messaging, subscription, and the supervisor/system
//! entry points -- without requiring a caller to know which leaf module
//! each type lives in.

pub use crate::actor::{
    default_pipeline, ActorConfig, ActorConfigBuilder, ActorContext, ActorState, Plugin, PluginId, Reaction,
};
pub use crate::address::Address;
pub use crate::backend::{Backend, ThreadBackend};
pub use crate::error::{ErrorCode, ExtendedError};
pub use crate::message::{Envelope, Handler, HandlerTag, Payload};
pub use crate::monitoring::{InMemoryMonitor, Monitor, NoopMonitor};
pub use crate::registry::RegistryActor;
pub use crate::spawner::{supervised, RestartPolicy, Spawner, SpawnerBuilder};
pub use crate::subscription::OwnerTag;
pub use crate::supervisor::{ShutdownFlag, Supervisor, SupervisorConfig, SupervisorConfigBuilder};
pub use crate::system::SystemContext;
pub use crate::util::{ActorId, AddressId, MessageId, RequestId};
