use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::prelude::*;
use log::{debug, warn};
use rodio::{OutputStream, OutputStreamBuilder, Sink};

use crate::cache::AssetLocator;

use super::media::{MediaError, MediaEvent, MediaOutput};
use super::sink::{create_sink_at, fade_out_sink};

/// `MediaOutput` backed by the default rodio output device.
///
/// Seeking rebuilds the sink and skips into the file, so the playhead is the
/// offset the current sink started at plus what it has played since.
pub struct RodioOutput {
    stream: OutputStream,
    locator: AssetLocator,
    sink: Option<Sink>,
    path: Option<PathBuf>,
    offset: Duration,
    volume: f32,
    playing: bool,
    ended_reported: bool,
    events: VecDeque<MediaEvent>,
}

impl RodioOutput {
    pub fn open(locator: AssetLocator) -> Result<Self, MediaError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| MediaError::Device(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            locator,
            sink: None,
            path: None,
            offset: Duration::ZERO,
            volume: 1.0,
            playing: false,
            ended_reported: false,
            events: VecDeque::new(),
        })
    }

    fn rebuild_sink(&mut self, start_at: Duration) -> Result<(), MediaError> {
        let path = self.path.clone().ok_or(MediaError::NotLoaded)?;
        // The current sink keeps playing unless the replacement opens.
        let (sink, _) = create_sink_at(&self.stream, &path, start_at)?;
        sink.set_volume(self.volume);
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        if self.playing {
            sink.play();
        }
        self.sink = Some(sink);
        self.offset = start_at;
        self.ended_reported = false;
        Ok(())
    }
}

/// Read the asset duration from its tags/stream properties.
fn probe_duration(path: &Path) -> Option<Duration> {
    match lofty::read_from_path(path) {
        Ok(tagged) => Some(tagged.properties().duration()).filter(|d| !d.is_zero()),
        Err(e) => {
            debug!("no metadata for {}: {e}", path.display());
            None
        }
    }
}

impl MediaOutput for RodioOutput {
    fn load(&mut self, asset_ref: &str) -> Result<(), MediaError> {
        self.unload();

        let path = self.locator.resolve(asset_ref);
        let (sink, decoder_total) = create_sink_at(&self.stream, &path, Duration::ZERO)?;
        sink.set_volume(self.volume);
        debug!("loaded {asset_ref} from {}", path.display());

        if let Some(total) = probe_duration(&path).or(decoder_total) {
            self.events.push_back(MediaEvent::DurationChanged(total));
        }
        self.sink = Some(sink);
        self.path = Some(path);
        Ok(())
    }

    fn play(&mut self) -> Result<(), MediaError> {
        let sink = self.sink.as_ref().ok_or(MediaError::NotLoaded)?;
        sink.play();
        if !self.playing {
            self.playing = true;
            self.events.push_back(MediaEvent::Playing);
        }
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = self.sink.as_ref() {
            sink.pause();
        }
        if self.playing {
            self.playing = false;
            self.events.push_back(MediaEvent::Paused);
        }
    }

    fn seek(&mut self, position: Duration) -> Result<(), MediaError> {
        self.rebuild_sink(position).map_err(|e| {
            warn!("seek rebuild failed: {e}");
            MediaError::Seek(position)
        })
    }

    fn position(&self) -> Duration {
        match self.sink.as_ref() {
            Some(sink) => self.offset + sink.get_pos(),
            None => Duration::ZERO,
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(sink) = self.sink.as_ref() {
            sink.set_volume(volume);
        }
    }

    fn unload(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.path = None;
        self.offset = Duration::ZERO;
        self.playing = false;
        self.ended_reported = false;
        self.events.clear();
    }

    fn drain_events(&mut self) -> Vec<MediaEvent> {
        if self.playing && !self.ended_reported {
            if let Some(sink) = self.sink.as_ref() {
                if sink.empty() {
                    self.ended_reported = true;
                    self.playing = false;
                    self.events.push_back(MediaEvent::Ended);
                }
            }
        }
        self.events.drain(..).collect()
    }

    fn fade_out(&mut self, duration: Duration) {
        if !self.playing {
            return;
        }
        if let Some(sink) = self.sink.as_ref() {
            fade_out_sink(sink, self.volume, duration);
        }
    }
}
