//! Fetch status state machine
//!
//! The status is explicit, finite, and deterministic. Only the pagination
//! controller drives it.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::Status;
