//! Status definition
//!
//! Whether a fetch may start is a function of the current status only.

use super::events::Event;
use crate::error::ErrorKind;

/// Operational status of one database instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    /// Nothing fetched yet, or recovered from an error
    #[default]
    Idle,
    /// One fetch in flight; every entry point reports busy
    Fetching,
    /// Last fetch succeeded
    Ready,
    /// Last fetch failed; the previous page is still displayed
    Error(ErrorKind),
}

impl Status {
    /// Check if a new fetch may be admitted
    pub fn accepts_fetch(&self) -> bool {
        !matches!(self, Status::Fetching)
    }

    /// Check if this is an error status
    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_))
    }

    /// Process an event and return the next status
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use Status::*;

        match (self, event) {
            (Idle | Ready | Error(_), FetchStarted) => Fetching,

            (Fetching, FetchSucceeded) => Ready,
            (Fetching, FetchFailed(kind)) => Error(kind),

            (Error(_), Recover) => Idle,

            // Default: stay in current status
            _ => self,
        }
    }
}
