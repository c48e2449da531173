use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Stable identity of a track inside the catalog. Always positive.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(pub u32);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where playback of a track must stop.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WindowEnd {
    /// Stop once the playhead reaches this offset in the asset's own timeline.
    At(Duration),
    /// Play until the asset itself ends.
    NaturalEnd,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog has no tracks")]
    Empty,
    #[error("track id must be positive")]
    InvalidId,
    #[error("track id {0} appears more than once")]
    DuplicateId(TrackId),
    #[error("track {id}: window end {end:?} is not after window start {start:?}")]
    InvalidWindow {
        id: TrackId,
        start: Duration,
        end: Duration,
    },
}

/// One playable entry: a window over an asset.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackDescriptor {
    pub id: TrackId,
    pub asset_ref: String,
    pub display_name: String,
    pub window_start: Duration,
    pub window_end: WindowEnd,
}

impl TrackDescriptor {
    /// Build a descriptor, rejecting a zero id or an empty/inverted window.
    pub fn new(
        id: u32,
        asset_ref: impl Into<String>,
        display_name: impl Into<String>,
        window_start: Duration,
        window_end: WindowEnd,
    ) -> Result<Self, CatalogError> {
        if id == 0 {
            return Err(CatalogError::InvalidId);
        }
        let id = TrackId(id);
        if let WindowEnd::At(end) = window_end {
            if end <= window_start {
                return Err(CatalogError::InvalidWindow {
                    id,
                    start: window_start,
                    end,
                });
            }
        }

        Ok(Self {
            id,
            asset_ref: asset_ref.into(),
            display_name: display_name.into(),
            window_start,
            window_end,
        })
    }

    /// Length of the playable window.
    ///
    /// Natural-end tracks need the asset duration to answer; `None` until it
    /// is known.
    pub fn window_duration(&self, asset_duration: Option<Duration>) -> Option<Duration> {
        match self.window_end {
            WindowEnd::At(end) => Some(end - self.window_start),
            WindowEnd::NaturalEnd => {
                asset_duration.map(|total| total.saturating_sub(self.window_start))
            }
        }
    }
}

/// Immutable, ordered set of tracks known at startup.
#[derive(Debug, Clone)]
pub struct Catalog {
    tracks: Vec<TrackDescriptor>,
}

impl Catalog {
    pub fn new(tracks: Vec<TrackDescriptor>) -> Result<Self, CatalogError> {
        if tracks.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::with_capacity(tracks.len());
        for track in &tracks {
            if track.id.0 == 0 {
                return Err(CatalogError::InvalidId);
            }
            if !seen.insert(track.id) {
                return Err(CatalogError::DuplicateId(track.id));
            }
            // Descriptors built field by field never went through `new`.
            if let WindowEnd::At(end) = track.window_end {
                if end <= track.window_start {
                    return Err(CatalogError::InvalidWindow {
                        id: track.id,
                        start: track.window_start,
                        end,
                    });
                }
            }
        }

        Ok(Self { tracks })
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[TrackDescriptor] {
        &self.tracks
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackDescriptor> {
        self.tracks.iter()
    }

    pub fn get(&self, id: TrackId) -> Option<&TrackDescriptor> {
        self.iter().find(|t| t.id == id)
    }

    pub fn position(&self, id: TrackId) -> Option<usize> {
        self.iter().position(|t| t.id == id)
    }

    pub fn first(&self) -> Option<&TrackDescriptor> {
        self.tracks.first()
    }

    pub fn last(&self) -> Option<&TrackDescriptor> {
        self.tracks.last()
    }

    /// The entry after `id`, wrapping to the first one.
    /// Unknown ids start from the first entry.
    pub fn next_after(&self, id: TrackId) -> Option<&TrackDescriptor> {
        match self.position(id) {
            Some(p) => self.tracks.get((p + 1) % self.tracks.len()),
            None => self.first(),
        }
    }

    /// The entry before `id`, wrapping to the last one.
    /// Unknown ids start from the last entry.
    pub fn previous_before(&self, id: TrackId) -> Option<&TrackDescriptor> {
        match self.position(id) {
            Some(0) | None => self.last(),
            Some(p) => self.tracks.get(p - 1),
        }
    }

    /// Asset references in catalog order, without repeats.
    pub fn asset_refs(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.iter()
            .map(|t| t.asset_ref.as_str())
            .filter(|r| seen.insert(*r))
            .collect()
    }
}
