use std::collections::BTreeSet;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::timer::RecurringTimer;

use super::store::{AssetMatcher, CacheError, CacheStore};

/// Notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEvent {
    /// Some, but not all, assets are cached. `progress` is a percentage.
    Progress {
        progress: f64,
        downloaded: usize,
        total: usize,
    },
    /// Every expected asset is cached. Sent at most once per monitoring session.
    Ready,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheProgress {
    pub downloaded: usize,
    pub total: usize,
}

impl CacheProgress {
    pub fn is_complete(&self) -> bool {
        self.downloaded >= self.total
    }

    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.downloaded as f64 / self.total as f64 * 100.0
        }
    }
}

/// Polls a `CacheStore` and reports how many expected assets it holds.
pub struct AssetCacheTracker<S: CacheStore> {
    store: S,
    matcher: AssetMatcher,
    timer: RecurringTimer,
    progress: CacheProgress,
    /// Set once `Ready` has gone out for the current session.
    completed: bool,
    subscribers: Vec<Sender<CacheEvent>>,
}

impl<S: CacheStore> AssetCacheTracker<S> {
    pub fn new(store: S, matcher: AssetMatcher, poll_period: Duration, expected_total: usize) -> Self {
        Self {
            store,
            matcher,
            timer: RecurringTimer::new(poll_period),
            progress: CacheProgress {
                downloaded: 0,
                total: expected_total,
            },
            completed: false,
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self) -> Receiver<CacheEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn progress(&self) -> CacheProgress {
        self.progress
    }

    pub fn is_monitoring(&self) -> bool {
        self.timer.is_armed()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Begin a new monitoring session, replacing any running one.
    pub fn start_monitoring(&mut self, expected_total: usize, now: Instant) {
        self.timer.cancel();
        self.progress = CacheProgress {
            downloaded: 0,
            total: expected_total,
        };
        self.completed = false;
        self.timer.arm(now);
        info!("monitoring cache for {expected_total} assets");
    }

    /// One-shot check for the case where everything was cached before
    /// monitoring started. Only ever reports completion.
    pub fn check_status(&mut self) {
        match self.count_cached() {
            Ok(found) => {
                self.record(found);
                if self.progress.is_complete() {
                    self.complete();
                }
            }
            Err(e) => warn!("cache status check failed: {e}"),
        }
    }

    /// Poll when the timer is due.
    pub fn tick(&mut self, now: Instant) {
        if self.timer.fire_due(now) {
            self.poll();
        }
    }

    fn poll(&mut self) {
        let found = match self.count_cached() {
            Ok(n) => n,
            Err(e) => {
                warn!("cache poll failed, retrying next tick: {e}");
                return;
            }
        };
        self.record(found);

        let CacheProgress { downloaded, total } = self.progress;
        debug!("cache progress {downloaded}/{total}");
        if self.progress.is_complete() {
            self.complete();
        } else if downloaded > 0 {
            self.emit(CacheEvent::Progress {
                progress: self.progress.percent(),
                downloaded,
                total,
            });
        }
    }

    fn record(&mut self, found: usize) {
        self.progress.downloaded = found.min(self.progress.total);
    }

    fn complete(&mut self) {
        self.timer.cancel();
        if self.completed {
            return;
        }
        self.completed = true;
        info!("all {} assets cached", self.progress.total);
        self.emit(CacheEvent::Ready);
    }

    /// Matching identifiers across every named cache, counted once each.
    fn count_cached(&self) -> Result<usize, CacheError> {
        let mut unique = BTreeSet::new();
        for name in self.store.list_cache_names()? {
            for entry in self.store.list_entries(&name)? {
                if self.matcher.matches(&entry.identifier) {
                    unique.insert(entry.identifier);
                }
            }
        }
        Ok(unique.len())
    }

    fn emit(&mut self, event: CacheEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
