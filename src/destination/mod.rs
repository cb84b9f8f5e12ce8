//! The `destination` module names and describes the destinations that live
//! inside a virtual host's namespace.
//!
//! - `kind`: the four destination kinds and the handle returned to callers.
//! - `namer`: collision-free name generation scoped to a naming context.

pub mod kind;
pub mod namer;

pub use kind::{DestinationHandle, DestinationInfo, DestinationKind};
pub use namer::{DestinationNamer, NamingContext};
