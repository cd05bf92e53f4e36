//! Typed payloads, the type-erased envelope that actually travels through
//! queues, and the handler registration that binds an (address, payload
//! type) pair to a callable (§3, §4.1).

mod envelope;
mod handler;
mod payload;
mod system;

pub use envelope::Envelope;
pub use handler::{Handler, HandlerKey, HandlerTag};
pub use payload::Payload;
pub use system::*;
