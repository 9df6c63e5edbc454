//! Opaque forward-pagination token

use alloc::string::String;
use core::fmt;

/// Cursor issued by the remote API for the page that follows
///
/// The absence of a cursor (`Option::None`) denotes the first page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a token as received from the API
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Token text, as sent back in `start_cursor`
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Cursor {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for Cursor {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Cursor {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=str}", self.0.as_str())
    }
}
