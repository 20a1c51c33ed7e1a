//! Trailing-edge debouncing with caller-supplied time.

use std::time::{Duration, Instant};

pub const TEXT_INPUT_DEBOUNCE: Duration = Duration::from_millis(300);
pub const SCROLL_SETTLE_DEBOUNCE: Duration = Duration::from_millis(150);

/// Holds the latest value until `delay` has passed without a newer one.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replaces any pending value and restarts the quiet period.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// Returns the pending value once the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|(_, at)| now.saturating_duration_since(*at) >= self.delay);
        if due {
            self.pending.take().map(|(value, _)| value)
        } else {
            None
        }
    }

    /// Commits immediately, ignoring the quiet period.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at + self.delay)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::{Debouncer, TEXT_INPUT_DEBOUNCE};
    use std::time::{Duration, Instant};

    #[test]
    fn only_the_last_value_is_committed() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(TEXT_INPUT_DEBOUNCE);
        d.push("d", t0);
        d.push("dr", t0 + Duration::from_millis(100));
        d.push("draw", t0 + Duration::from_millis(200));
        assert_eq!(d.poll(t0 + Duration::from_millis(400)), None);
        assert_eq!(d.poll(t0 + Duration::from_millis(500)), Some("draw"));
        assert_eq!(d.poll(t0 + Duration::from_millis(900)), None);
    }

    #[test]
    fn flush_and_cancel() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(150));
        d.push(1, t0);
        assert_eq!(d.deadline(), Some(t0 + Duration::from_millis(150)));
        assert_eq!(d.flush(), Some(1));
        d.push(2, t0);
        d.cancel();
        assert!(!d.is_pending());
    }
}
