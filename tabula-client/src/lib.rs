//! Fetch pipeline for the Tabula database table view
//!
//! Ties the sans-IO pagination controller to an HTTPS transport:
//!
//! - `QueryClient` posts the query and reads the body into a bounded buffer
//! - `FetchService` admits navigations, enforces the watchdog deadline,
//!   parses, publishes pages and raises the page-changed notifier
//! - `Command` and `SignalNotifier` form the automation surface
//!
//! # Usage
//!
//! A board crate binds the configuration, builds one `FetchService` per
//! database and spawns a task that awaits [`FetchService::run`] with a poll
//! ticker and a [`CommandChannel`]. The display task owns a
//! `tabula_display::TableView` over the same `SharedPage` and redraws when
//! the page-changed signal fires.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

#[macro_use]
mod fmt;

pub mod channels;
pub mod client;
pub mod service;

pub use channels::{Command, CommandChannel, PageChangedSignal, SignalNotifier, COMMAND_QUEUE_SIZE};
pub use client::QueryClient;
pub use service::{FetchService, Outcome};
