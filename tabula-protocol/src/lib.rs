//! Database query wire format
//!
//! This crate turns bound database settings into the one request shape the
//! client issues, and turns a response body held in a fixed-size buffer into
//! a parsed page.
//!
//! # Request
//!
//! ```text
//! POST https://api.notion.com/v1/databases/{database_id}/query
//! Authorization: Bearer {api_key}
//! Notion-Version: 2022-06-28
//! Content-Type: application/json
//!
//! { ...query, "filter": {"and": [...]}, "start_cursor": "..." }
//! ```
//!
//! # Response
//!
//! Only `results`, `has_more` and `next_cursor` are read. Each result is a
//! page object whose `properties` are decoded by their `type` tag. Parsing is
//! all-or-nothing: any structural error rejects the whole page.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod property;
pub mod request;
pub mod response;

pub use property::{decode_property, PSEUDO_PROPERTIES};
pub use request::{QueryRequest, API_BASE, NOTION_VERSION};
pub use response::parse_page;
