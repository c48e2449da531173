//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the catalog, the cursor,
//! the last published playback snapshot and the offline cache status.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;
