//! Owned recurring timer driven by an explicit clock.
//!
//! Nothing here sleeps or spawns: the owner calls `fire_due(now)` from its
//! own loop. Arming replaces any previous deadline, so a single
//! `RecurringTimer` can never have two schedules live at once.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct RecurringTimer {
    period: Duration,
    next_due: Option<Instant>,
}

impl RecurringTimer {
    /// `period` is clamped to at least one millisecond.
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            next_due: None,
        }
    }

    /// Cancel any current schedule and start a new one whose first tick is one
    /// period after `now`.
    pub fn arm(&mut self, now: Instant) {
        self.cancel();
        self.next_due = Some(now + self.period);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.next_due
    }

    /// Returns true at most once per call when a tick is due, and schedules the
    /// following one. Missed ticks are coalesced instead of replayed.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        if now < due {
            return false;
        }

        let next = due + self.period;
        self.next_due = Some(if next > now { next } else { now + self.period });
        true
    }
}
