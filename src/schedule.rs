//! Debounce and throttle as plain values.
//!
//! Neither type owns a timer. The caller reports events with the current
//! `Instant` and polls at (or after) [`Debouncer::next_deadline`], which
//! keeps both deterministic under test and usable from any event loop.

use std::time::{Duration, Instant};

/// Holds the latest value of a burst until the burst has been quiet for
/// `window`.
///
/// A new trigger replaces the pending value and restarts the window, so
/// only the final value of a burst is ever delivered.
///
/// ```rust
/// use std::time::{Duration, Instant};
/// use vacancy_map::schedule::Debouncer;
///
/// let start = Instant::now();
/// let mut debouncer = Debouncer::new(Duration::from_millis(300));
///
/// debouncer.trigger(start, "first");
/// debouncer.trigger(start + Duration::from_millis(50), "second");
///
/// assert_eq!(debouncer.poll(start + Duration::from_millis(300)), None);
/// assert_eq!(debouncer.poll(start + Duration::from_millis(350)), Some("second"));
/// assert_eq!(debouncer.poll(start + Duration::from_millis(400)), None);
/// ```
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record an event, superseding any pending one.
    pub fn trigger(&mut self, now: Instant, value: T) {
        self.pending = Some((now + self.window, value));
    }

    /// Take the pending value if its window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if *deadline <= now => self.pending.take().map(|(_, value)| value),
            _ => None,
        }
    }

    /// When the pending value becomes due, if there is one.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop the pending value without delivering it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, value)| value)
    }
}

/// Accepts at most one event per `window`.
#[derive(Debug, Clone)]
pub struct Throttle {
    window: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Returns true and starts a new window if the previous accepted event
    /// is at least `window` old.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.window => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
