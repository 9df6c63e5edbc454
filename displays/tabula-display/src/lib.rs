//! Table rendering for Tabula
//!
//! This crate provides:
//! - `Canvas` trait for the handful of drawing primitives a table needs
//! - Column layout and row capacity computation
//! - Cell formatting with ellipsis or clip overflow
//! - `TableView`, which redraws the latest published page on demand
//!
//! # Architecture
//!
//! The renderer never talks to the network. It reads a snapshot from the
//! `SharedPage` that the fetch service publishes into, so a redraw always
//! sees one complete page even while the next one is being fetched.
//!
//! Panel drivers implement `Canvas` over their framebuffer and font; the
//! renderer only needs text measurement from the font.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod backend;
pub mod format;
pub mod layout;
pub mod table;

pub use backend::{Canvas, Color, DisplayError, Rect, TextAlign};
pub use format::{cell_text, fit_text, format_value};
pub use layout::{column_widths, row_capacity};
pub use table::TableView;
