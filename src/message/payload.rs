use std::fmt::Debug;

/// A typed message payload (§3 "Message").
///
/// `TYPE_NAME` is the human-readable counterpart of the compiler-assigned
/// `TypeId` that [`crate::message::Envelope`] actually routes on; it exists
/// purely for the default message stringifier (§6.4) and monitoring events,
/// never for dispatch decisions -- unlike the original C++ runtime, which
/// had to hand-roll a "globally-unique interned token per payload type"
/// (§9), Rust's `std::any::TypeId` already gives us that for free, so
/// `Payload` only needs to supply the display name.
pub trait Payload: Debug + Send + Sync + 'static {
    /// Stable, human-readable name for this payload type.
    const TYPE_NAME: &'static str;
}
