//! Audio output: the media seam used by the player and its rodio backend.

mod media;
mod output;
mod sink;

pub use media::{MediaError, MediaEvent, MediaOutput};
pub use output::RodioOutput;
