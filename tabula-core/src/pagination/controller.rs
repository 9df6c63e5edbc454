//! Pagination controller
//!
//! Sans-IO: [`PaginationController::begin`] admits a navigation and returns a
//! [`FetchPlan`] naming the cursor to request. The caller performs the fetch
//! and hands the result to [`PaginationController::complete`]. Cursor stack
//! changes are applied only when a fetch succeeds, so a failed or aborted
//! fetch leaves the pagination state exactly as it was.

use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use super::cursor::Cursor;
use crate::error::FetchError;
use crate::page::{PageModel, ParsedPage};
use crate::state::{Event, Status};
use crate::stats::FetchStats;

/// Navigation requests that may start a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Navigation {
    /// Periodic tick: reload the current page
    Refresh,
    /// Back to the first page, discarding history
    First,
    /// Forward one page
    Next,
    /// Back one page
    Previous,
}

/// Why a navigation request was not admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rejection {
    /// A fetch is already in flight
    Busy,
    /// The current page is the last one
    NoMorePages,
    /// The current page is the first one
    AtFirstPage,
    /// A certificate check failed earlier and configuration cannot change
    TlsBlocked,
}

/// An admitted fetch: which cursor to request and what to commit on success
#[derive(Debug, PartialEq, Eq)]
pub struct FetchPlan {
    navigation: Navigation,
    cursor: Option<Cursor>,
}

impl FetchPlan {
    /// Navigation this fetch serves
    pub fn navigation(&self) -> Navigation {
        self.navigation
    }

    /// Cursor to send as `start_cursor` (`None` for the first page)
    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }
}

/// Result of completing a fetch
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// A distinct page replaced the displayed one
    Published(Arc<PageModel>),
    /// The fetch succeeded but matched the displayed page
    Unchanged,
    /// The fetch failed; nothing changed besides status
    Failed(FetchError),
}

/// Pagination state of one database instance
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PaginationState {
    /// Cursors used to reach the current page; depth equals page index
    stack: Vec<Cursor>,
    has_more: bool,
    next_cursor: Option<Cursor>,
    status: Status,
}

impl PaginationState {
    /// Zero-based index of the current page
    pub fn page_index(&self) -> usize {
        self.stack.len()
    }

    /// Cursors used to reach the current page, oldest first
    pub fn cursor_stack(&self) -> &[Cursor] {
        &self.stack
    }

    /// Whether the last successful fetch reported more pages
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Cursor for the following page, if any
    pub fn next_cursor(&self) -> Option<&Cursor> {
        self.next_cursor.as_ref()
    }

    /// Operational status
    pub fn status(&self) -> Status {
        self.status
    }
}

/// Cursor-stack pagination controller
#[derive(Debug)]
pub struct PaginationController {
    state: PaginationState,
    /// TLS verification was requested at bind time
    verify_tls: bool,
    tls_blocked: bool,
    current: Option<Arc<PageModel>>,
    /// Fingerprint and page index of the displayed page
    displayed: Option<(u32, usize)>,
    available: BTreeSet<String>,
    stats: FetchStats,
}

impl PaginationController {
    /// Create a controller with no page loaded
    pub fn new(verify_tls: bool) -> Self {
        Self {
            state: PaginationState::default(),
            verify_tls,
            tls_blocked: false,
            current: None,
            displayed: None,
            available: BTreeSet::new(),
            stats: FetchStats::new(),
        }
    }

    /// Admit a navigation request
    pub fn begin(&mut self, navigation: Navigation) -> Result<FetchPlan, Rejection> {
        if !self.state.status.accepts_fetch() {
            self.stats.busy = self.stats.busy.saturating_add(1);
            return Err(Rejection::Busy);
        }
        if self.tls_blocked {
            return Err(Rejection::TlsBlocked);
        }

        let cursor = match navigation {
            Navigation::Refresh => {
                // Scheduled polls clear a previous failure before running
                self.state.status = self.state.status.transition(Event::Recover);
                self.state.stack.last().cloned()
            }
            Navigation::First => None,
            Navigation::Next => {
                if !self.state.has_more {
                    return Err(Rejection::NoMorePages);
                }
                match &self.state.next_cursor {
                    Some(cursor) => Some(cursor.clone()),
                    None => return Err(Rejection::NoMorePages),
                }
            }
            Navigation::Previous => {
                let depth = self.state.stack.len();
                if depth == 0 {
                    return Err(Rejection::AtFirstPage);
                }
                depth.checked_sub(2).map(|i| self.state.stack[i].clone())
            }
        };

        self.state.status = self.state.status.transition(Event::FetchStarted);
        self.stats.started = self.stats.started.saturating_add(1);
        Ok(FetchPlan { navigation, cursor })
    }

    /// Periodic refresh of the current page
    pub fn poll_tick(&mut self) -> Result<FetchPlan, Rejection> {
        self.begin(Navigation::Refresh)
    }

    /// Jump back to the first page
    pub fn first_page(&mut self) -> Result<FetchPlan, Rejection> {
        self.begin(Navigation::First)
    }

    /// Advance one page
    pub fn next_page(&mut self) -> Result<FetchPlan, Rejection> {
        self.begin(Navigation::Next)
    }

    /// Go back one page
    pub fn previous_page(&mut self) -> Result<FetchPlan, Rejection> {
        self.begin(Navigation::Previous)
    }

    /// Finish an admitted fetch
    pub fn complete(
        &mut self,
        plan: FetchPlan,
        result: Result<ParsedPage, FetchError>,
    ) -> Completion {
        let parsed = match result {
            Ok(parsed) => parsed,
            Err(err) => {
                let kind = err.kind();
                self.state.status = self.state.status.transition(Event::FetchFailed(kind));
                self.stats.record_failure(kind);
                if err == FetchError::Tls && self.verify_tls {
                    self.tls_blocked = true;
                }
                return Completion::Failed(err);
            }
        };

        let FetchPlan { navigation, cursor } = plan;
        match navigation {
            Navigation::Refresh => {}
            Navigation::First => self.state.stack.clear(),
            Navigation::Next => {
                if let Some(cursor) = cursor {
                    self.state.stack.push(cursor);
                }
            }
            Navigation::Previous => {
                self.state.stack.pop();
            }
        }

        self.state.has_more = parsed.has_more;
        self.state.next_cursor = if parsed.has_more {
            parsed.next_cursor
        } else {
            None
        };
        self.state.status = self.state.status.transition(Event::FetchSucceeded);
        if navigation == Navigation::First {
            self.available.clear();
        }
        self.available.extend(parsed.available_properties);

        let key = (parsed.fingerprint, self.state.page_index());
        if navigation != Navigation::First && self.displayed == Some(key) {
            self.stats.unchanged = self.stats.unchanged.saturating_add(1);
            return Completion::Unchanged;
        }

        let page = Arc::new(PageModel::new(
            parsed.rows,
            key.1,
            key.0,
            self.available.iter().cloned().collect(),
        ));
        self.current = Some(page.clone());
        self.displayed = Some(key);
        self.stats.published = self.stats.published.saturating_add(1);
        Completion::Published(page)
    }

    /// Pagination state
    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    pub fn status(&self) -> Status {
        self.state.status
    }

    pub fn page_index(&self) -> usize {
        self.state.page_index()
    }

    /// Page currently displayed, if any
    pub fn current_page(&self) -> Option<&Arc<PageModel>> {
        self.current.as_ref()
    }

    /// Every property name seen in any successful page, sorted
    pub fn available_properties(&self) -> impl Iterator<Item = &str> {
        self.available.iter().map(String::as_str)
    }

    pub fn stats(&self) -> &FetchStats {
        &self.stats
    }

    /// Count requests the caller dropped while a fetch was in flight
    pub fn record_busy(&mut self, count: u32) {
        self.stats.busy = self.stats.busy.saturating_add(count);
    }

    /// Whether a failed certificate check has disabled fetching
    pub fn is_tls_blocked(&self) -> bool {
        self.tls_blocked
    }
}
