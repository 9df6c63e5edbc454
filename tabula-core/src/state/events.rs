//! Events that trigger status transitions

use crate::error::ErrorKind;

/// Events that can trigger status transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// A fetch was admitted and is now in flight
    FetchStarted,
    /// The in-flight fetch produced a complete page
    FetchSucceeded,
    /// The in-flight fetch failed or was aborted
    FetchFailed(ErrorKind),
    /// Scheduled poll is about to run after a failure
    Recover,
}
