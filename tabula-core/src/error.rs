//! Failure taxonomy
//!
//! `ConfigError` is fatal and only produced while binding configuration.
//! Every `FetchError` is recoverable: the displayed page is retained and the
//! failure is counted, but nothing is published.

use core::fmt;

/// Configuration errors detected at bind time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// API token is empty
    MissingToken,
    /// Database id is empty
    MissingDatabaseId,
    /// Query is not a JSON object
    InvalidQuery,
    /// A timeout or the parse buffer size is zero
    InvalidLimit,
    /// Line height is zero
    InvalidLineHeight,
    /// More columns or filters than the fixed capacity allows
    TooManyItems,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ConfigError::MissingToken => "API token not set",
            ConfigError::MissingDatabaseId => "database id not set",
            ConfigError::InvalidQuery => "query is not a JSON object",
            ConfigError::InvalidLimit => "timeouts and buffer size must be non-zero",
            ConfigError::InvalidLineHeight => "line height must be non-zero",
            ConfigError::TooManyItems => "too many columns or property filters",
        };
        f.write_str(msg)
    }
}

/// Why the network leg of a fetch failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetworkFailure {
    /// No link (e.g. WiFi down)
    NotConnected,
    /// TCP connect failed or timed out
    Connect,
    /// Transfer stalled past the overall timeout
    Timeout,
    /// Read or write failed mid-transfer
    Transfer,
}

/// Why a response body could not be turned into a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseFailure {
    /// Not valid JSON
    Syntax,
    /// Document ended before it was complete
    UnexpectedEof,
    /// Valid JSON with the wrong shape (missing `results`, bad property)
    Schema,
}

/// Recoverable fetch failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FetchError {
    /// Connect or transfer failure
    Network(NetworkFailure),
    /// Certificate or handshake failure
    Tls,
    /// Non-success response code
    HttpStatus(u16),
    /// Malformed response structure
    Parse(ParseFailure),
    /// Response larger than the configured parse buffer
    BufferOverflow {
        /// Configured buffer capacity in bytes
        capacity: usize,
    },
    /// Fetch exceeded the watchdog deadline
    WatchdogTimeout,
}

impl FetchError {
    /// Get the failure class of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Network(_) => ErrorKind::Network,
            FetchError::Tls => ErrorKind::Tls,
            FetchError::HttpStatus(_) => ErrorKind::HttpStatus,
            FetchError::Parse(_) => ErrorKind::Parse,
            FetchError::BufferOverflow { .. } => ErrorKind::BufferOverflow,
            FetchError::WatchdogTimeout => ErrorKind::WatchdogTimeout,
        }
    }
}

impl From<NetworkFailure> for FetchError {
    fn from(failure: NetworkFailure) -> Self {
        FetchError::Network(failure)
    }
}

impl From<ParseFailure> for FetchError {
    fn from(failure: ParseFailure) -> Self {
        FetchError::Parse(failure)
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Network(failure) => write!(f, "network error: {:?}", failure),
            FetchError::Tls => f.write_str("TLS handshake failed"),
            FetchError::HttpStatus(code) => write!(f, "HTTP status {}", code),
            FetchError::Parse(failure) => write!(f, "parse error: {:?}", failure),
            FetchError::BufferOverflow { capacity } => {
                write!(f, "response exceeds {} byte parse buffer", capacity)
            }
            FetchError::WatchdogTimeout => f.write_str("watchdog deadline exceeded"),
        }
    }
}

/// Failure classes, used for status and counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    Network,
    Tls,
    HttpStatus,
    Parse,
    BufferOverflow,
    WatchdogTimeout,
}

impl ErrorKind {
    /// All failure classes, in counter order
    pub const ALL: [ErrorKind; 6] = [
        ErrorKind::Network,
        ErrorKind::Tls,
        ErrorKind::HttpStatus,
        ErrorKind::Parse,
        ErrorKind::BufferOverflow,
        ErrorKind::WatchdogTimeout,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            ErrorKind::Network => 0,
            ErrorKind::Tls => 1,
            ErrorKind::HttpStatus => 2,
            ErrorKind::Parse => 3,
            ErrorKind::BufferOverflow => 4,
            ErrorKind::WatchdogTimeout => 5,
        }
    }
}
