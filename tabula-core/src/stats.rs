//! Fetch counters
//!
//! Every recoverable failure is counted exactly once, at the point where the
//! fetch that produced it completes.

use crate::error::ErrorKind;

/// Running counters for one database instance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FetchStats {
    /// Fetches admitted
    pub started: u32,
    /// Fetches that produced a distinct page
    pub published: u32,
    /// Fetches that succeeded but matched the displayed page
    pub unchanged: u32,
    /// Entry points refused because a fetch was in flight
    pub busy: u32,
    /// Failures by kind, indexed like `ErrorKind::ALL`
    failures: [u32; ErrorKind::ALL.len()],
}

impl FetchStats {
    /// Create zeroed counters
    pub const fn new() -> Self {
        Self {
            started: 0,
            published: 0,
            unchanged: 0,
            busy: 0,
            failures: [0; ErrorKind::ALL.len()],
        }
    }

    /// Count one failure
    pub fn record_failure(&mut self, kind: ErrorKind) {
        let slot = &mut self.failures[kind.index()];
        *slot = slot.saturating_add(1);
    }

    /// Failures of one kind
    pub fn failures(&self, kind: ErrorKind) -> u32 {
        self.failures[kind.index()]
    }

    /// Failures of every kind
    pub fn total_failures(&self) -> u32 {
        self.failures.iter().fold(0u32, |acc, n| acc.saturating_add(*n))
    }
}
