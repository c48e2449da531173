//! The fixed track catalog.
//!
//! A catalog is an ordered, validated list of `TrackDescriptor`s. Each
//! descriptor points at an asset and carves a playback window out of it.

mod builtin;
mod model;

pub use model::*;
