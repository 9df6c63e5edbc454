//! Periodic timer abstraction

use embedded_hal_async::delay::DelayNs;

/// Source of periodic poll ticks
pub trait Ticker {
    /// Wait for the next tick
    ///
    /// The wait starts when the future is first polled. Dropping it early
    /// and calling again starts a new wait.
    fn next(&mut self) -> impl core::future::Future<Output = ()>;
}

/// Ticker that sleeps a fixed interval between ticks
///
/// Drift accumulates by however long the caller spends between ticks.
/// Callers that wait on other events too must keep one `next()` future
/// alive across them, or every other event restarts the interval.
pub struct DelayTicker<D> {
    delay: D,
    interval_ms: u32,
}

impl<D: DelayNs> DelayTicker<D> {
    /// Create a ticker over any async delay
    pub fn new(delay: D, interval_ms: u32) -> Self {
        Self { delay, interval_ms }
    }

    /// Tick interval
    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }
}

impl<D: DelayNs> Ticker for DelayTicker<D> {
    async fn next(&mut self) {
        self.delay.delay_ms(self.interval_ms).await
    }
}
