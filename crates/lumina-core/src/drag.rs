// crates/lumina-core/src/drag.rs
//
// Single-slot, latest-wins mailbox for drag gestures.
//
// A pointer drag produces far more positions than the store needs. Every new
// position overwrites the slot; `take_due` releases the slot at most once per
// `interval`. Intermediate positions are discarded on purpose: only the last
// one of a gesture matters, and `flush` hands it over on pointer-up.
//
// Time is passed in by the caller so the throttle stays deterministic.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct DragThrottle<T> {
    interval:     Duration,
    pending:      Option<T>,
    last_applied: Option<Instant>,
}

impl<T> DragThrottle<T> {
    pub fn new(interval: Duration) -> Self {
        Self { interval, pending: None, last_applied: None }
    }

    /// Replace whatever is waiting with `value`.
    pub fn offer(&mut self, value: T) {
        self.pending = Some(value);
    }

    /// The pending value, if one is waiting and the interval has elapsed
    /// since the last release.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        let due = self
            .last_applied
            .map_or(true, |last| now.saturating_duration_since(last) >= self.interval);
        if !due {
            return None;
        }
        let value = self.pending.take()?;
        self.last_applied = Some(now);
        Some(value)
    }

    /// The pending value regardless of timing (gesture end).
    pub fn flush(&mut self) -> Option<T> {
        self.last_applied = None;
        self.pending.take()
    }

    /// Drop the pending value and forget timing (gesture cancel).
    pub fn reset(&mut self) {
        self.pending      = None;
        self.last_applied = None;
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS16: Duration = Duration::from_millis(16);

    #[test]
    fn latest_value_wins() {
        let mut t = DragThrottle::new(MS16);
        t.offer(1);
        t.offer(2);
        t.offer(3);
        assert_eq!(t.take_due(Instant::now()), Some(3));
        assert!(!t.has_pending());
    }

    #[test]
    fn releases_at_most_once_per_interval() {
        let mut t = DragThrottle::new(MS16);
        let t0 = Instant::now();
        t.offer(1.0);
        assert_eq!(t.take_due(t0), Some(1.0));
        t.offer(2.0);
        assert_eq!(t.take_due(t0 + Duration::from_millis(5)), None);
        t.offer(3.0);
        assert_eq!(t.take_due(t0 + Duration::from_millis(16)), Some(3.0));
    }

    #[test]
    fn flush_ignores_interval() {
        let mut t = DragThrottle::new(MS16);
        let t0 = Instant::now();
        t.offer('a');
        t.take_due(t0);
        t.offer('b');
        assert_eq!(t.flush(), Some('b'));
        assert_eq!(t.flush(), None);
    }

    #[test]
    fn reset_discards_pending() {
        let mut t = DragThrottle::new(MS16);
        t.offer(7);
        t.reset();
        assert_eq!(t.take_due(Instant::now()), None);
    }
}
