//! Automation surface
//!
//! Navigation commands reach the fetch service through an embassy-sync
//! channel; page changes leave it through a signal.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use tabula_core::{Navigation, PageChangeNotifier};

/// Queue depth for navigation commands
pub const COMMAND_QUEUE_SIZE: usize = 4;

/// Navigation commands exposed to automations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    FirstPage,
    NextPage,
    PreviousPage,
}

impl Command {
    pub fn navigation(self) -> Navigation {
        match self {
            Command::FirstPage => Navigation::First,
            Command::NextPage => Navigation::Next,
            Command::PreviousPage => Navigation::Previous,
        }
    }
}

/// Command channel for one fetch service
pub type CommandChannel<M> = Channel<M, Command, COMMAND_QUEUE_SIZE>;

/// Page-change signal for one fetch service
pub type PageChangedSignal<M> = Signal<M, ()>;

/// Raises a signal whenever a new page is published
pub struct SignalNotifier<'a, M: RawMutex> {
    signal: &'a PageChangedSignal<M>,
}

impl<'a, M: RawMutex> SignalNotifier<'a, M> {
    pub fn new(signal: &'a PageChangedSignal<M>) -> Self {
        Self { signal }
    }
}

impl<M: RawMutex> PageChangeNotifier for SignalNotifier<'_, M> {
    fn page_changed(&self) {
        self.signal.signal(());
    }
}
