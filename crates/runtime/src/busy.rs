use std::sync::atomic::{AtomicUsize, Ordering};

/// UI hook shown while a query pipeline is in flight.
pub trait BusyIndicator: Send + Sync {
    fn show(&self);
    fn hide(&self);
}

/// Indicator that does nothing, for headless callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBusy;

impl BusyIndicator for NoopBusy {
    fn show(&self) {}
    fn hide(&self) {}
}

/// Counts show/hide calls.
#[derive(Debug, Default)]
pub struct BusyCounter {
    shown: AtomicUsize,
    hidden: AtomicUsize,
}

impl BusyCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> usize {
        self.shown.load(Ordering::SeqCst)
    }

    pub fn hidden(&self) -> usize {
        self.hidden.load(Ordering::SeqCst)
    }

    /// Shown more often than hidden.
    pub fn is_busy(&self) -> bool {
        self.shown() > self.hidden()
    }
}

impl BusyIndicator for BusyCounter {
    fn show(&self) {
        self.shown.fetch_add(1, Ordering::SeqCst);
    }

    fn hide(&self) {
        self.hidden.fetch_add(1, Ordering::SeqCst);
    }
}

/// Shows the indicator on creation and hides it exactly once on drop.
#[must_use = "the indicator is hidden as soon as the guard is dropped"]
pub struct BusyGuard<'a> {
    indicator: &'a dyn BusyIndicator,
}

impl<'a> BusyGuard<'a> {
    pub fn show(indicator: &'a dyn BusyIndicator) -> Self {
        indicator.show();
        Self { indicator }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.indicator.hide();
    }
}

#[cfg(test)]
mod tests {
    use super::{BusyCounter, BusyGuard};

    #[test]
    fn guard_hides_once() {
        let counter = BusyCounter::new();
        {
            let _guard = BusyGuard::show(&counter);
            assert!(counter.is_busy());
        }
        assert_eq!((counter.shown(), counter.hidden()), (1, 1));
    }

    #[test]
    fn guard_hides_on_unwind() {
        let counter = BusyCounter::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = BusyGuard::show(&counter);
            panic!("continuation failed");
        }));
        assert!(result.is_err());
        assert_eq!(counter.hidden(), 1);
        assert!(!counter.is_busy());
    }
}
