//! The playback engine: clipped playback of catalog tracks over a single
//! media handle, plus the watchdog that stops a track at its window end.

mod engine;
mod error;
mod monitor;
mod session;

pub use engine::{EngineOptions, PlaybackEngine};
pub use error::PlayerError;
pub use session::{PlaybackSnapshot, PlayerState};
