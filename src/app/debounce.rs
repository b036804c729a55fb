// src/app/debounce.rs
use std::time::{Duration, Instant};

/// Holds back a changing text value until it has been quiet for `delay`.
///
/// The UI feeds the live value every frame via [`Debouncer::observe`]; any change
/// restarts the quiet window. [`Debouncer::poll`] hands out the value once the
/// window has elapsed, and only if it differs from the last settled value.
pub struct Debouncer {
    delay: Duration,
    settled: String,
    pending: Option<Pending>,
}

struct Pending {
    value: String,
    changed_at: Instant,
}

impl Debouncer {
    pub fn new(delay: Duration, initial: impl Into<String>) -> Self {
        Self {
            delay,
            settled: initial.into(),
            pending: None,
        }
    }

    pub fn observe(&mut self, value: &str, now: Instant) {
        let unchanged = match &self.pending {
            Some(p) => p.value == value,
            None => self.settled == value,
        };
        if unchanged {
            return;
        }
        self.pending = Some(Pending {
            value: value.to_string(),
            changed_at: now,
        });
    }

    /// Returns the newly settled value, if the quiet window just closed on a change.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|p| now.saturating_duration_since(p.changed_at) >= self.delay);
        if !due {
            return None;
        }
        let pending = self.pending.take()?;
        if pending.value == self.settled {
            return None;
        }
        self.settled = pending.value;
        Some(self.settled.clone())
    }

    pub fn settled(&self) -> &str {
        &self.settled
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Time left before a pending value settles; used to schedule a repaint.
    pub fn time_remaining(&self, now: Instant) -> Option<Duration> {
        self.pending.as_ref().map(|p| {
            self.delay
                .saturating_sub(now.saturating_duration_since(p.changed_at))
        })
    }
}
