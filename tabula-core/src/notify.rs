//! Page-change notification seam
//!
//! The fetch pipeline calls exactly one registered notifier, synchronously,
//! right after a distinct page has been published.

/// Observer for newly published pages
pub trait PageChangeNotifier {
    /// A distinct page is now displayed
    fn page_changed(&self);
}

impl<F: Fn()> PageChangeNotifier for F {
    fn page_changed(&self) {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    fn fire(notifier: &impl PageChangeNotifier) {
        notifier.page_changed();
    }

    #[test]
    fn test_closure_notifier() {
        let count = Cell::new(0u32);
        let notifier = || count.set(count.get() + 1);
        fire(&notifier);
        fire(&notifier);
        assert_eq!(count.get(), 2);
    }
}
