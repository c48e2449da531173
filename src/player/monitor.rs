use std::time::{Duration, Instant};

use crate::timer::RecurringTimer;

/// Watchdog that reports when the playhead has crossed a finite window end.
///
/// There is one monitor per engine; `arm` cancels whatever was armed before,
/// so two schedules can never both call into `stop`.
#[derive(Debug)]
pub(super) struct WindowMonitor {
    timer: RecurringTimer,
    end: Option<Duration>,
}

impl WindowMonitor {
    pub fn new(period: Duration) -> Self {
        Self {
            timer: RecurringTimer::new(period),
            end: None,
        }
    }

    pub fn arm(&mut self, end: Duration, now: Instant) {
        self.cancel();
        self.end = Some(end);
        self.timer.arm(now);
    }

    pub fn cancel(&mut self) {
        self.timer.cancel();
        self.end = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// On a due tick, true when `elapsed` has reached the window end.
    pub fn expired(&mut self, now: Instant, elapsed: Duration) -> bool {
        let Some(end) = self.end else {
            return false;
        };
        self.timer.fire_due(now) && elapsed >= end
    }
}
