use thiserror::Error;

use crate::audio::MediaError;
use crate::catalog::TrackId;

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("track {0} is not in the catalog")]
    UnknownTrack(TrackId),
    #[error("playback of track {track} was rejected: {source}")]
    PlaybackRejected {
        track: TrackId,
        #[source]
        source: MediaError,
    },
}
