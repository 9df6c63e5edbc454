//! Tabula Hardware Abstraction Layer
//!
//! This crate defines the contracts the fetch pipeline needs from the board:
//! an HTTPS client, a hardware watchdog and a periodic timer. Board crates
//! implement them on top of their network stack and timer driver.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  tabula-client (fetch pipeline)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tabula-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  board HTTPS  │       │  board timer  │
//! │  + TLS stack  │       │  + watchdog   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`transport::HttpsTransport`] - One POST with an incrementally read body
//! - [`watchdog::Watchdog`] - Hardware watchdog feeding
//! - [`timer::Ticker`] - Periodic poll tick

#![no_std]
#![deny(unsafe_code)]

pub mod timer;
pub mod transport;
pub mod watchdog;

// Re-export key traits at crate root for convenience
pub use timer::{DelayTicker, Ticker};
pub use transport::{Header, HttpsRequest, HttpsResponse, HttpsTransport, TransportError};
pub use watchdog::{NoopWatchdog, Watchdog};
