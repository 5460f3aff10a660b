//! State Module - reactive values and named event channels.
//!
//! - **StateCell** - a single value with an initial snapshot and listeners
//! - **EventRegistry** - string-keyed publish/subscribe

mod cell;
mod events;

pub use cell::*;
pub use events::*;
