//! Hardware watchdog abstraction
//!
//! The fetch deadline itself is enforced in software by the client. The
//! hardware watchdog is fed around the long network operations so that a
//! fetch running up to its deadline does not reset the board.

/// Hardware watchdog
pub trait Watchdog {
    /// Restart the hardware countdown
    fn feed(&mut self);
}

/// Watchdog for boards without one, and for host tests
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopWatchdog;

impl Watchdog for NoopWatchdog {
    fn feed(&mut self) {}
}

impl<W: Watchdog + ?Sized> Watchdog for &mut W {
    fn feed(&mut self) {
        (**self).feed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counting(u32);

    impl Watchdog for Counting {
        fn feed(&mut self) {
            self.0 += 1;
        }
    }

    fn feed_twice(mut dog: impl Watchdog) {
        dog.feed();
        dog.feed();
    }

    #[test]
    fn test_feed_through_reference() {
        let mut dog = Counting(0);
        feed_twice(&mut dog);
        assert_eq!(dog.0, 2);
    }

    #[test]
    fn test_noop_watchdog() {
        feed_twice(NoopWatchdog);
    }
}
