//! Application model types: `App` and `CacheStatus`.
//!
//! The `App` struct is what the renderer reads. It never talks to the engine
//! directly; the runtime feeds it snapshots and cache events and turns key
//! presses into engine intents.

use crate::cache::CacheEvent;
use crate::catalog::{Catalog, TrackDescriptor, TrackId};
use crate::player::PlaybackSnapshot;

/// Offline availability as last reported by the cache tracker.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CacheStatus {
    /// Nothing reported yet.
    #[default]
    Pending,
    Downloading {
        progress: f64,
        downloaded: usize,
        total: usize,
    },
    Ready,
    /// No cache directory; offline tracking is off for this session.
    Disabled,
}

/// The main application model.
pub struct App {
    pub catalog: Catalog,
    pub selected: usize,
    pub playback: PlaybackSnapshot,
    pub cache: CacheStatus,

    pub follow_playback: bool,
    pub pending_follow: Option<TrackId>,

    pub asset_root: Option<String>,
    pub metadata_window: bool,
}

impl App {
    /// Create a new `App` over `catalog` with the cursor on the first track.
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            selected: 0,
            playback: PlaybackSnapshot::default(),
            cache: CacheStatus::Pending,

            follow_playback: true,
            pending_follow: None,

            asset_root: None,
            metadata_window: false,
        }
    }

    /// Mark offline tracking as unavailable. Later cache events are ignored.
    pub fn disable_cache(&mut self) {
        self.cache = CacheStatus::Disabled;
    }

    pub fn toggle_metadata_window(&mut self) {
        self.metadata_window = !self.metadata_window;
    }

    /// Record the asset root shown in the status box.
    pub fn set_asset_root(&mut self, root: String) {
        self.asset_root = Some(root);
    }

    /// Enable following playback (cursor follows the active track).
    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }

    /// Disable follow-playback and clear any pending follow target.
    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
        self.pending_follow = None;
    }

    pub fn selected_track(&self) -> Option<&TrackDescriptor> {
        self.catalog.tracks().get(self.selected)
    }

    pub fn selected_id(&self) -> Option<TrackId> {
        self.selected_track().map(|t| t.id)
    }

    pub fn active_track(&self) -> Option<&TrackDescriptor> {
        self.playback
            .active_track
            .and_then(|id| self.catalog.get(id))
    }

    /// Mark the selected track as the one the cursor should stick to once
    /// the engine reports it active.
    pub fn follow_selected(&mut self) {
        self.follow_playback_on();
        self.pending_follow = self.selected_id();
    }

    /// Move selection to the next track, wrapping to the first.
    pub fn next(&mut self) {
        if self.catalog.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.catalog.len();
    }

    /// Move selection to the previous track, wrapping to the last.
    pub fn prev(&mut self) {
        if self.catalog.is_empty() {
            return;
        }
        let len = self.catalog.len();
        self.selected = (self.selected + len - 1) % len;
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.catalog.len().saturating_sub(1);
    }

    /// Take a snapshot from the engine and, in follow mode, move the cursor
    /// onto the active track.
    pub fn apply_snapshot(&mut self, snapshot: PlaybackSnapshot) {
        self.playback = snapshot;

        let Some(active) = self.playback.active_track else {
            return;
        };
        if !self.follow_playback {
            return;
        }
        if let Some(pending) = self.pending_follow {
            if pending != active {
                return;
            }
            self.pending_follow = None;
        }
        if let Some(pos) = self.catalog.position(active) {
            self.selected = pos;
        }
    }

    pub fn apply_cache_event(&mut self, event: CacheEvent) {
        if self.cache == CacheStatus::Disabled {
            return;
        }
        self.cache = match event {
            CacheEvent::Progress {
                progress,
                downloaded,
                total,
            } => {
                if self.cache == CacheStatus::Ready {
                    return;
                }
                CacheStatus::Downloading {
                    progress,
                    downloaded,
                    total,
                }
            }
            CacheEvent::Ready => CacheStatus::Ready,
        };
    }
}
