//! Board-agnostic core logic for the Tabula database table view
//!
//! This crate contains the application logic that does not depend on a
//! network stack or a display driver:
//!
//! - Configuration types and bind-time evaluation
//! - Fetch status state machine
//! - Cursor-stack pagination controller
//! - Page model and typed property values
//! - Failure taxonomy and counters
//! - Page-change notification seam
//!
//! # Testing
//!
//! Loading configuration from TOML is behind the `serde` feature, and so are
//! its tests. Run them with:
//!
//! ```text
//! cargo test -p tabula-core --features serde
//! ```

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod config;
pub mod error;
pub mod notify;
pub mod page;
pub mod pagination;
pub mod state;
pub mod stats;

pub use config::{DatabaseConfig, DatabaseSettings, TableSettings, TableViewConfig, Templatable};
pub use error::{ConfigError, ErrorKind, FetchError, NetworkFailure, ParseFailure};
pub use notify::PageChangeNotifier;
pub use page::{PageModel, ParsedPage, PropertyType, PropertyValue, Row, SharedPage};
pub use pagination::{
    Completion, Cursor, FetchPlan, Navigation, PaginationController, PaginationState, Rejection,
};
pub use state::Status;
pub use stats::FetchStats;
