//! Utilities for creating `rodio` sinks from resolved asset paths.
//!
//! The helper here encapsulates opening/decoding a file and preparing a
//! paused `Sink` at the requested start position.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::thread;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use super::media::MediaError;

/// Create a paused `Sink` for the asset at `path`, starting at `start_at`.
///
/// Also returns the duration the decoder reports, when it knows it.
pub(super) fn create_sink_at(
    handle: &OutputStream,
    path: &Path,
    start_at: Duration,
) -> Result<(Sink, Option<Duration>), MediaError> {
    let asset = path.display().to_string();
    let file = File::open(path).map_err(|e| MediaError::Open {
        asset: asset.clone(),
        reason: e.to_string(),
    })?;

    let decoder = Decoder::new(BufReader::new(file)).map_err(|e| MediaError::Decode {
        asset,
        reason: e.to_string(),
    })?;
    let total = decoder.total_duration();
    // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
    let source = decoder.skip_duration(start_at);

    let sink = Sink::connect_new(handle.mixer());
    sink.pause();
    sink.append(source);
    Ok((sink, total))
}

/// Ramp `sink` from `from` down to silence over `fade_out`.
pub(super) fn fade_out_sink(sink: &Sink, from: f32, fade_out: Duration) {
    if fade_out.is_zero() {
        sink.set_volume(0.0);
        return;
    }
    let steps: u32 = 20;
    let step = (fade_out / steps).max(Duration::from_millis(1));
    for i in 1..=steps {
        let t = i as f32 / steps as f32;
        sink.set_volume(from * (1.0 - t));
        thread::sleep(step);
    }
    sink.set_volume(0.0);
}
