//! Reference-counting strategy switch.
//!
//! The original `rotor` runtime picks between a thread-safe and a
//! thread-unsafe intrusive counter at build time
//! (`ROTOR_REFCOUNT_THREADUNSAFE`, see `arc.hpp`). We carry the same idea
//! forward as a Cargo feature instead of a preprocessor define: by default
//! every handle (`Address`, `Envelope`, ...) is wrapped in `std::sync::Arc`
//! so a program can freely run several locality groups on separate threads.
//! Enabling the `single-locality` feature swaps the alias to `std::rc::Rc`
//! for programs that never cross a thread boundary and want to shave the
//! atomic increment/decrement off the hot path.
//!
//! Code in this crate should use [`Rc`] rather than naming `Arc`/`Rc`
//! directly so it stays correct under either feature.

#[cfg(not(feature = "single-locality"))]
pub use std::sync::Arc as Rc;

#[cfg(feature = "single-locality")]
pub use std::rc::Rc;
