//! Fetch service
//!
//! Owns one database's pagination controller and query client, and is the
//! only writer of its [`SharedPage`]. Every fetch runs under the watchdog
//! deadline: if connect, transfer and parse together take longer, the fetch
//! is dropped as a whole and the controller sees a `WatchdogTimeout`.
//!
//! Work arrives from two sources, the poll ticker and the command channel,
//! and is serialized here. Commands that arrive during a fetch are drained
//! and dropped. The poll period is measured from tick to tick; commands
//! served in between do not restart it.

use core::cell::Cell;
use core::convert::Infallible;
use core::pin::pin;

use alloc::vec::Vec;

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use embedded_hal_async::delay::DelayNs;
use tabula_core::config::{DatabaseSettings, PropertyFilter};
use tabula_core::error::{ConfigError, FetchError};
use tabula_core::{
    Completion, Cursor, Navigation, PageChangeNotifier, PaginationController, ParsedPage,
    Rejection, SharedPage, Status,
};
use tabula_hal::{HttpsTransport, Ticker, Watchdog};
use tabula_protocol::{parse_page, QueryRequest};

use crate::channels::Command;
use crate::client::QueryClient;

/// Result of one navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// A new page was published and the notifier raised
    Published,
    /// The page matched the one on display
    Unchanged,
    /// No fetch was started
    Rejected(Rejection),
    /// The fetch failed; the displayed page is untouched
    Failed(FetchError),
}

/// Fetch pipeline for one database
pub struct FetchService<'a, M, T, W, D, N>
where
    M: RawMutex,
    T: HttpsTransport,
    W: Watchdog,
    D: DelayNs,
    N: PageChangeNotifier,
{
    controller: PaginationController,
    request: QueryRequest,
    filters: Vec<PropertyFilter>,
    client: QueryClient<T>,
    watchdog: W,
    deadline: D,
    watchdog_timeout_ms: u32,
    shared: &'a SharedPage<M>,
    notifier: N,
}

impl<'a, M, T, W, D, N> FetchService<'a, M, T, W, D, N>
where
    M: RawMutex,
    T: HttpsTransport,
    W: Watchdog,
    D: DelayNs,
    N: PageChangeNotifier,
{
    /// Build the service from bound settings
    ///
    /// Fails only if the configured query is not a JSON object.
    pub fn new(
        settings: &DatabaseSettings,
        transport: T,
        watchdog: W,
        deadline: D,
        shared: &'a SharedPage<M>,
        notifier: N,
    ) -> Result<Self, ConfigError> {
        let request = QueryRequest::new(settings).inspect_err(|e| {
            error!("Invalid database query: {:?}", e);
        })?;
        Ok(Self {
            controller: PaginationController::new(settings.verify_tls),
            request,
            filters: settings.property_filters.clone(),
            client: QueryClient::new(transport, settings),
            watchdog,
            deadline,
            watchdog_timeout_ms: settings.watchdog_timeout_ms,
            shared,
            notifier,
        })
    }

    pub fn controller(&self) -> &PaginationController {
        &self.controller
    }

    pub fn status(&self) -> Status {
        self.controller.status()
    }

    pub fn page_index(&self) -> usize {
        self.controller.page_index()
    }

    pub fn client(&self) -> &QueryClient<T> {
        &self.client
    }

    /// Reload the current page
    pub async fn poll_tick(&mut self) -> Outcome {
        self.navigate(Navigation::Refresh).await
    }

    pub async fn first_page(&mut self) -> Outcome {
        self.navigate(Navigation::First).await
    }

    pub async fn next_page(&mut self) -> Outcome {
        self.navigate(Navigation::Next).await
    }

    pub async fn previous_page(&mut self) -> Outcome {
        self.navigate(Navigation::Previous).await
    }

    /// Admit, fetch and complete one navigation
    pub async fn navigate(&mut self, navigation: Navigation) -> Outcome {
        let plan = match self.controller.begin(navigation) {
            Ok(plan) => plan,
            Err(rejection) => {
                warn!("{:?} rejected: {:?}", navigation, rejection);
                return Outcome::Rejected(rejection);
            }
        };
        debug!("Fetching {:?}, cursor present: {}", navigation, plan.cursor().is_some());

        let result = self.fetch(plan.cursor()).await;
        match self.controller.complete(plan, result) {
            Completion::Published(page) => {
                info!("Page {} published, {} rows", page.page_index(), page.len());
                self.shared.publish(page);
                self.notifier.page_changed();
                Outcome::Published
            }
            Completion::Unchanged => {
                debug!("Page {} unchanged", self.controller.page_index());
                Outcome::Unchanged
            }
            Completion::Failed(err) => {
                warn!("Fetch failed: {:?}", err);
                Outcome::Failed(err)
            }
        }
    }

    /// Transfer and parse under the watchdog deadline
    async fn fetch(&mut self, cursor: Option<&Cursor>) -> Result<ParsedPage, FetchError> {
        let Self {
            client,
            request,
            filters,
            watchdog,
            deadline,
            watchdog_timeout_ms,
            ..
        } = self;

        let work = async {
            let body = client.execute(request, cursor, watchdog).await?;
            debug!("Received {} bytes", body.len());
            let page = parse_page(body, filters)?;
            Ok::<_, FetchError>(page)
        };

        match select(work, deadline.delay_ms(*watchdog_timeout_ms)).await {
            Either::First(result) => result,
            Either::Second(()) => Err(FetchError::WatchdogTimeout),
        }
    }

    /// Serve one navigation
    ///
    /// Commands received while the fetch is in flight are dropped and
    /// counted as busy.
    pub async fn serve<C, const Q: usize>(
        &mut self,
        navigation: Navigation,
        commands: &Channel<C, Command, Q>,
    ) -> Outcome
    where
        C: RawMutex,
    {
        let dropped = Cell::new(0u32);
        let outcome = match select(self.navigate(navigation), drop_while_busy(commands, &dropped)).await
        {
            Either::First(outcome) => outcome,
            Either::Second(never) => match never {},
        };
        self.controller.record_busy(dropped.get());
        outcome
    }

    /// Load the current page, then serve ticks and commands forever
    pub async fn run<K, C, const Q: usize>(&mut self, ticker: &mut K, commands: &Channel<C, Command, Q>)
    where
        K: Ticker,
        C: RawMutex,
    {
        info!("Fetch service started");
        self.poll_tick().await;
        loop {
            // One tick future per period
            let mut tick = pin!(ticker.next());
            loop {
                match select(tick.as_mut(), commands.receive()).await {
                    Either::First(()) => {
                        self.serve(Navigation::Refresh, commands).await;
                        break;
                    }
                    Either::Second(command) => {
                        info!("Command: {:?}", command);
                        self.serve(command.navigation(), commands).await;
                    }
                }
            }
        }
    }
}

/// Receive and drop commands until cancelled
async fn drop_while_busy<C: RawMutex, const Q: usize>(
    commands: &Channel<C, Command, Q>,
    dropped: &Cell<u32>,
) -> Infallible {
    loop {
        let command = commands.receive().await;
        warn!("Busy, dropping {:?}", command);
        dropped.set(dropped.get().saturating_add(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::sync::Arc;
    use alloc::string::{String, ToString};
    use alloc::vec;
    use embassy_futures::block_on;
    use embassy_futures::yield_now;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embassy_sync::signal::Signal;
    use core::task::Poll;
    use tabula_core::{DatabaseConfig, ErrorKind};
    use tabula_hal::{DelayTicker, HttpsRequest, HttpsResponse, NoopWatchdog, TransportError};

    use crate::channels::{CommandChannel, SignalNotifier};

    /// In-memory query endpoint
    ///
    /// Serves `pages[i]` for the request whose `start_cursor` equals
    /// `cursors[i]` (`None` for the first page).
    struct Server {
        cursors: Vec<Option<&'static str>>,
        pages: Vec<String>,
        requests: Vec<Option<String>>,
        fail: Option<TransportError>,
        hang: bool,
        yield_first: bool,
    }

    impl Server {
        fn new(pages: Vec<(Option<&'static str>, String)>) -> Self {
            let (cursors, pages) = pages.into_iter().unzip();
            Self {
                cursors,
                pages,
                requests: Vec::new(),
                fail: None,
                hang: false,
                yield_first: false,
            }
        }
    }

    fn start_cursor(body: &[u8]) -> Option<String> {
        let text = core::str::from_utf8(body).ok()?;
        let rest = text.split("\"start_cursor\":\"").nth(1)?;
        rest.split('"').next().map(String::from)
    }

    impl HttpsTransport for Server {
        type Body<'a> = &'a [u8];

        async fn post<'a>(
            &'a mut self,
            request: &HttpsRequest<'_>,
        ) -> Result<HttpsResponse<Self::Body<'a>>, TransportError> {
            if self.yield_first {
                yield_now().await;
            }
            if self.hang {
                core::future::pending::<()>().await;
            }
            if let Some(err) = self.fail {
                return Err(err);
            }
            let cursor = start_cursor(request.body);
            let index = self
                .cursors
                .iter()
                .position(|c| c.map(String::from) == cursor)
                .ok_or(TransportError::Io)?;
            self.requests.push(cursor);
            Ok(HttpsResponse {
                status: 200,
                content_length: None,
                body: self.pages[index].as_bytes(),
            })
        }
    }

    /// Deadline that either fires at once or never
    struct Deadline {
        expires: bool,
    }

    impl DelayNs for Deadline {
        async fn delay_ns(&mut self, _ns: u32) {
            if !self.expires {
                core::future::pending::<()>().await;
            }
        }
    }

    /// Delay over a millisecond clock the test advances by hand
    struct Sleep<'c> {
        now_ms: &'c Cell<u64>,
    }

    impl Sleep<'_> {
        async fn until(&self, wake_ms: u64) {
            core::future::poll_fn(|_| {
                if self.now_ms.get() >= wake_ms {
                    Poll::Ready(())
                } else {
                    Poll::Pending
                }
            })
            .await
        }
    }

    impl DelayNs for Sleep<'_> {
        async fn delay_ns(&mut self, ns: u32) {
            let wake_ms = self.now_ms.get() + u64::from(ns / 1_000_000);
            self.until(wake_ms).await
        }

        async fn delay_ms(&mut self, ms: u32) {
            let wake_ms = self.now_ms.get() + u64::from(ms);
            self.until(wake_ms).await
        }
    }

    /// A page of `rows` rows whose ids are derived from `tag`
    fn page(tag: &str, rows: usize, next: Option<&str>) -> String {
        let results: Vec<String> = (0..rows)
            .map(|i| {
                format!(
                    r#"{{"id": "{tag}-{i}", "last_edited_time": "2024-01-01T00:00:00.000Z", "properties": {{"Name": {{"type": "title", "title": [{{"plain_text": "Row {i}"}}]}}}}}}"#
                )
            })
            .collect();
        let tail = match next {
            Some(cursor) => format!(r#""has_more": true, "next_cursor": "{cursor}""#),
            None => r#""has_more": false, "next_cursor": null"#.to_string(),
        };
        format!(r#"{{"results": [{}], {}}}"#, results.join(", "), tail)
    }

    fn three_pages() -> Server {
        Server::new(vec![
            (None, page("a", 10, Some("XYZ"))),
            (Some("XYZ"), page("b", 10, Some("QRS"))),
            (Some("QRS"), page("c", 3, None)),
        ])
    }

    type Service<'a> = FetchService<
        'a,
        NoopRawMutex,
        Server,
        NoopWatchdog,
        Deadline,
        SignalNotifier<'a, NoopRawMutex>,
    >;

    fn service<'a>(
        server: Server,
        shared: &'a SharedPage<NoopRawMutex>,
        signal: &'a Signal<NoopRawMutex, ()>,
        buffer_size: usize,
    ) -> Service<'a> {
        let mut config = DatabaseConfig::new("token", "db");
        config.buffer_size = buffer_size.into();
        config.verify_tls = false.into();
        FetchService::new(
            &config.bind().unwrap(),
            server,
            NoopWatchdog,
            Deadline { expires: false },
            shared,
            SignalNotifier::new(signal),
        )
        .unwrap()
    }

    fn requests<'a>(svc: &'a Service<'_>) -> &'a [Option<String>] {
        &svc.client().transport().requests
    }

    #[test]
    fn test_first_tick_publishes_page_zero() {
        let shared = SharedPage::new();
        let signal = Signal::new();
        let mut svc = service(three_pages(), &shared, &signal, 20 * 1024);

        assert_eq!(block_on(svc.poll_tick()), Outcome::Published);
        assert_eq!(svc.page_index(), 0);
        assert!(svc.controller().state().cursor_stack().is_empty());
        assert_eq!(signal.try_take(), Some(()));

        let page = shared.snapshot().unwrap();
        assert_eq!(page.len(), 10);
        assert_eq!(page.page_index(), 0);
        assert_eq!(requests(&svc), &[None]);
    }

    #[test]
    fn test_next_then_previous_replays_cursors() {
        let shared = SharedPage::new();
        let signal = Signal::new();
        let mut svc = service(three_pages(), &shared, &signal, 20 * 1024);
        block_on(svc.poll_tick());

        assert_eq!(block_on(svc.next_page()), Outcome::Published);
        assert_eq!(svc.page_index(), 1);
        assert_eq!(
            svc.controller().state().cursor_stack(),
            &[Cursor::from("XYZ")]
        );
        assert_eq!(requests(&svc).last(), Some(&Some("XYZ".to_string())));

        assert_eq!(block_on(svc.previous_page()), Outcome::Published);
        assert_eq!(svc.page_index(), 0);
        assert!(svc.controller().state().cursor_stack().is_empty());
        assert_eq!(requests(&svc).last(), Some(&None));
        assert_eq!(shared.snapshot().unwrap().page_index(), 0);
    }

    #[test]
    fn test_next_on_last_page_is_rejected_without_request() {
        let shared = SharedPage::new();
        let signal = Signal::new();
        let mut svc = service(three_pages(), &shared, &signal, 20 * 1024);
        block_on(svc.poll_tick());
        block_on(svc.next_page());
        block_on(svc.next_page());
        assert_eq!(svc.page_index(), 2);

        let before = svc.controller().state().clone();
        assert_eq!(
            block_on(svc.next_page()),
            Outcome::Rejected(Rejection::NoMorePages)
        );
        assert_eq!(svc.controller().state(), &before);
        assert_eq!(requests(&svc).len(), 3);
    }

    #[test]
    fn test_oversized_body_keeps_prior_page() {
        let big = page("big", 200, None);
        assert!(big.len() > 20 * 1024);
        let server = Server::new(vec![(None, page("a", 2, Some("BIG"))), (Some("BIG"), big)]);

        let shared = SharedPage::new();
        let signal = Signal::new();
        let mut svc = service(server, &shared, &signal, 20 * 1024);
        block_on(svc.poll_tick());
        let shown = shared.snapshot().unwrap();
        signal.reset();

        assert_eq!(
            block_on(svc.next_page()),
            Outcome::Failed(FetchError::BufferOverflow { capacity: 20 * 1024 })
        );
        assert_eq!(svc.status(), Status::Error(ErrorKind::BufferOverflow));
        assert_eq!(svc.page_index(), 0);
        assert!(Arc::ptr_eq(&shared.snapshot().unwrap(), &shown));
        assert!(!signal.signaled());

        let stats = svc.controller().stats();
        assert_eq!(stats.failures(ErrorKind::BufferOverflow), 1);
        assert_eq!(stats.total_failures(), 1);
    }

    #[test]
    fn test_watchdog_timeout_leaves_state_unchanged() {
        let shared = SharedPage::new();
        let signal = Signal::new();
        let mut svc = service(three_pages(), &shared, &signal, 20 * 1024);
        block_on(svc.poll_tick());
        signal.reset();
        let before = svc.controller().state().cursor_stack().to_vec();

        svc.client.transport_mut().hang = true;
        svc.deadline.expires = true;
        assert_eq!(
            block_on(svc.next_page()),
            Outcome::Failed(FetchError::WatchdogTimeout)
        );
        assert_eq!(svc.status(), Status::Error(ErrorKind::WatchdogTimeout));
        assert_eq!(svc.controller().state().cursor_stack(), &before[..]);
        assert_eq!(shared.snapshot().unwrap().page_index(), 0);
        assert!(!signal.signaled());

        // The next tick recovers
        svc.client.transport_mut().hang = false;
        svc.deadline.expires = false;
        assert_eq!(block_on(svc.poll_tick()), Outcome::Unchanged);
        assert_eq!(svc.status(), Status::Ready);
    }

    #[test]
    fn test_page_changed_once_per_distinct_page() {
        let shared = SharedPage::new();
        let signal = Signal::new();
        let mut svc = service(three_pages(), &shared, &signal, 20 * 1024);

        assert_eq!(block_on(svc.poll_tick()), Outcome::Published);
        assert_eq!(signal.try_take(), Some(()));

        for _ in 0..3 {
            assert_eq!(block_on(svc.poll_tick()), Outcome::Unchanged);
            assert!(!signal.signaled());
        }

        svc.client.transport_mut().fail = Some(TransportError::Connect);
        assert!(matches!(block_on(svc.poll_tick()), Outcome::Failed(_)));
        assert!(!signal.signaled());

        svc.client.transport_mut().fail = None;
        assert_eq!(block_on(svc.next_page()), Outcome::Published);
        assert_eq!(signal.try_take(), Some(()));
        assert_eq!(svc.controller().stats().published, 2);
    }

    #[test]
    fn test_tls_failure_blocks_by_default() {
        let config = DatabaseConfig::new("token", "db");
        let mut server = three_pages();
        server.fail = Some(TransportError::Tls);

        let shared = SharedPage::new();
        let signal = Signal::new();
        let mut svc: Service<'_> = FetchService::new(
            &config.bind().unwrap(),
            server,
            NoopWatchdog,
            Deadline { expires: false },
            &shared,
            SignalNotifier::new(&signal),
        )
        .unwrap();

        assert_eq!(block_on(svc.poll_tick()), Outcome::Failed(FetchError::Tls));
        assert_eq!(
            block_on(svc.poll_tick()),
            Outcome::Rejected(Rejection::TlsBlocked)
        );
        assert!(svc.controller().is_tls_blocked());
    }

    #[test]
    fn test_invalid_query_fails_construction() {
        let mut config = DatabaseConfig::new("token", "db");
        config.query = "{\"filter\": }".to_string().into();
        let shared: SharedPage<NoopRawMutex> = SharedPage::new();
        let signal = Signal::new();
        let result: Result<Service<'_>, _> = FetchService::new(
            &config.bind().unwrap(),
            three_pages(),
            NoopWatchdog,
            Deadline { expires: false },
            &shared,
            SignalNotifier::new(&signal),
        );
        assert!(matches!(result, Err(ConfigError::InvalidQuery)));
    }

    #[test]
    fn test_serve_command_navigation() {
        let shared = SharedPage::new();
        let signal = Signal::new();
        let mut svc = service(three_pages(), &shared, &signal, 20 * 1024);
        block_on(svc.poll_tick());

        let commands: CommandChannel<NoopRawMutex> = Channel::new();
        let outcome = block_on(svc.serve(Command::NextPage.navigation(), &commands));
        assert_eq!(outcome, Outcome::Published);
        assert_eq!(svc.page_index(), 1);
        assert_eq!(svc.controller().stats().busy, 0);
    }

    #[test]
    fn test_commands_during_fetch_are_dropped() {
        let mut server = three_pages();
        server.yield_first = true;
        let shared = SharedPage::new();
        let signal = Signal::new();
        let mut svc = service(server, &shared, &signal, 20 * 1024);

        let commands: CommandChannel<NoopRawMutex> = Channel::new();
        commands.try_send(Command::NextPage).unwrap();
        commands.try_send(Command::PreviousPage).unwrap();

        // Both commands are taken while the refresh is in flight
        let outcome = block_on(svc.serve(Navigation::Refresh, &commands));
        assert_eq!(outcome, Outcome::Published);
        assert_eq!(svc.page_index(), 0);
        assert_eq!(svc.controller().stats().busy, 2);
        assert!(commands.is_empty());
        assert_eq!(requests(&svc).len(), 1);
    }

    #[test]
    fn test_commands_do_not_postpone_poll_ticks() {
        let shared = SharedPage::new();
        let signal = Signal::new();
        let mut svc = service(three_pages(), &shared, &signal, 20 * 1024);

        let now_ms = Cell::new(0u64);
        let mut ticker = DelayTicker::new(Sleep { now_ms: &now_ms }, 5_000);
        let commands: CommandChannel<NoopRawMutex> = Channel::new();

        // A command every 4 s, each one sooner than the pending tick
        let user = async {
            for second in (4u64..=48).step_by(4) {
                now_ms.set(second * 1_000);
                commands.send(Command::FirstPage).await;
                for _ in 0..4 {
                    yield_now().await;
                }
            }
        };
        block_on(select(svc.run(&mut ticker, &commands), user));

        let stats = svc.controller().stats();
        assert_eq!(stats.busy, 0);
        // Initial load plus twelve commands; the rest are poll ticks
        let ticks = stats.started - 13;
        assert!(ticks >= 5, "only {} poll ticks in 48 s", ticks);
    }
}
