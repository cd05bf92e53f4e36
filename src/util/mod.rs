//! Small cross-cutting utilities: identifiers and the reference-counting
//! strategy shared by every handle-like type in the crate.

mod ids;
mod rc;

pub use ids::{ActorId, AddressId, MessageId, RequestId};
pub use rc::Rc;
