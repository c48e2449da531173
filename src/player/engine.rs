use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::audio::{MediaEvent, MediaOutput};
use crate::catalog::{Catalog, TrackDescriptor, TrackId, WindowEnd};
use crate::config::PlayerSettings;

use super::error::PlayerError;
use super::monitor::WindowMonitor;
use super::session::{ActiveTrack, PlaybackSession, PlaybackSnapshot, PlayerState};

#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    /// How often the window monitor compares the playhead to the window end.
    pub window_check: Duration,
    pub initial_volume: f32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            window_check: Duration::from_millis(100),
            initial_volume: 0.8,
        }
    }
}

impl From<&PlayerSettings> for EngineOptions {
    fn from(s: &PlayerSettings) -> Self {
        Self {
            window_check: Duration::from_millis(s.window_check_ms),
            initial_volume: s.initial_volume,
        }
    }
}

/// Plays catalog tracks, one at a time, inside their windows.
///
/// All intents are synchronous and meant to be called from one thread
/// together with `tick`. Media events are drained after every intent and on
/// every tick; the session only becomes `Playing` once the media handle
/// confirms it.
pub struct PlaybackEngine<M: MediaOutput> {
    catalog: Catalog,
    media: M,
    session: PlaybackSession,
    monitor: WindowMonitor,
    volume: f32,
    subscribers: Vec<Sender<PlaybackSnapshot>>,
    last_published: Option<PlaybackSnapshot>,
    torn_down: bool,
}

impl<M: MediaOutput> PlaybackEngine<M> {
    pub fn new(catalog: Catalog, mut media: M, options: EngineOptions) -> Self {
        let volume = if options.initial_volume.is_nan() {
            1.0
        } else {
            options.initial_volume.clamp(0.0, 1.0)
        };
        media.set_volume(volume);

        Self {
            catalog,
            media,
            session: PlaybackSession::default(),
            monitor: WindowMonitor::new(options.window_check),
            volume,
            subscribers: Vec::new(),
            last_published: None,
            torn_down: false,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.session.state
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn active_track(&self) -> Option<&TrackDescriptor> {
        self.session.active_id().and_then(|id| self.catalog.get(id))
    }

    /// Receive a snapshot after every observable change.
    pub fn subscribe(&mut self) -> Receiver<PlaybackSnapshot> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        let (window_start, window_end) = match self.session.active {
            Some(a) => (a.window_start, a.window_end),
            None => (Duration::ZERO, WindowEnd::NaturalEnd),
        };
        PlaybackSnapshot {
            active_track: self.session.active_id(),
            state: self.session.state,
            elapsed_absolute: self.session.elapsed_absolute,
            asset_duration: self.session.asset_duration,
            window_start,
            window_end,
            volume: self.volume,
        }
    }

    /// When the window monitor next wants a tick.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.monitor.deadline()
    }

    /// Select `id`: toggle it if it is already active, otherwise load it and
    /// start at its window start. Failures are logged and leave the engine idle
    /// (or untouched, for unknown ids).
    pub fn select(&mut self, id: TrackId) {
        if let Err(e) = self.try_select(id) {
            warn!("{e}");
        }
    }

    pub fn try_select(&mut self, id: TrackId) -> Result<(), PlayerError> {
        let track = self
            .catalog
            .get(id)
            .cloned()
            .ok_or(PlayerError::UnknownTrack(id))?;

        if self.session.active_id() == Some(id) {
            match self.session.state {
                PlayerState::Playing | PlayerState::Loading => {
                    self.pause();
                    return Ok(());
                }
                PlayerState::Paused => return self.try_resume(),
                PlayerState::Idle => {}
            }
        }

        self.load_and_play(&track)
    }

    fn load_and_play(&mut self, track: &TrackDescriptor) -> Result<(), PlayerError> {
        self.monitor.cancel();
        self.media.pause();
        // Anything still queued belongs to the asset being replaced.
        let _ = self.media.drain_events();

        let loaded = self.media.load(&track.asset_ref).and_then(|()| {
            if track.window_start.is_zero() {
                Ok(())
            } else {
                self.media.seek(track.window_start)
            }
        });
        if let Err(source) = loaded {
            self.reset_to_idle();
            return Err(PlayerError::PlaybackRejected {
                track: track.id,
                source,
            });
        }

        self.session.active = Some(ActiveTrack::from(track));
        self.session.state = PlayerState::Loading;
        self.session.elapsed_absolute = track.window_start;
        self.session.asset_duration = None;
        info!("loading {} ({})", track.id, track.display_name);
        self.publish();

        self.request_play()
    }

    fn request_play(&mut self) -> Result<(), PlayerError> {
        let Some(id) = self.session.active_id() else {
            return Ok(());
        };
        if let Err(source) = self.media.play() {
            self.reset_to_idle();
            return Err(PlayerError::PlaybackRejected { track: id, source });
        }
        self.pump(Instant::now());
        Ok(())
    }

    /// Halt playback, rewind and forget the active track. No-op when idle.
    pub fn stop(&mut self) {
        if self.session.active.is_none() {
            return;
        }
        info!("stopping {:?}", self.session.active_id());
        self.reset_to_idle();
    }

    fn reset_to_idle(&mut self) {
        self.monitor.cancel();
        self.media.unload();
        self.session.reset();
        self.publish();
    }

    pub fn pause(&mut self) {
        if matches!(
            self.session.state,
            PlayerState::Playing | PlayerState::Loading
        ) {
            self.media.pause();
            self.session.state = PlayerState::Paused;
            self.publish();

            // A confirmation still queued for the withdrawn play request must
            // not resume playback.
            let now = Instant::now();
            for event in self.media.drain_events() {
                if event != MediaEvent::Playing {
                    self.on_media_event(event, now);
                }
            }
        }
    }

    pub fn resume(&mut self) {
        if let Err(e) = self.try_resume() {
            warn!("{e}");
        }
    }

    fn try_resume(&mut self) -> Result<(), PlayerError> {
        if self.session.state != PlayerState::Paused {
            return Ok(());
        }
        self.request_play()
    }

    /// Move the playhead in the asset's own timeline. The window is not
    /// enforced here; the monitor catches positions past the end.
    pub fn seek(&mut self, position: Duration) {
        if self.session.active.is_none() {
            return;
        }
        match self.media.seek(position) {
            Ok(()) => {
                self.session.elapsed_absolute = position;
                self.publish();
            }
            Err(e) => warn!("{e}"),
        }
    }

    pub fn next(&mut self) {
        let target = match self.session.active_id() {
            Some(id) => self.catalog.next_after(id),
            None => self.catalog.first(),
        }
        .map(|t| t.id);
        if let Some(id) = target {
            self.select(id);
        }
    }

    pub fn previous(&mut self) {
        let target = match self.session.active_id() {
            Some(id) => self.catalog.previous_before(id),
            None => self.catalog.last(),
        }
        .map(|t| t.id);
        if let Some(id) = target {
            self.select(id);
        }
    }

    pub fn set_volume(&mut self, level: f32) {
        if level.is_nan() {
            warn!("ignoring NaN volume");
            return;
        }
        self.volume = level.clamp(0.0, 1.0);
        self.media.set_volume(self.volume);
        self.publish();
    }

    /// Drive media events, refresh the playhead and run the window monitor.
    pub fn tick(&mut self, now: Instant) {
        self.pump(now);

        if self.session.active.is_none() {
            return;
        }
        self.session.elapsed_absolute = self.media.position();

        if self.monitor.expired(now, self.session.elapsed_absolute) {
            info!(
                "window end reached for {:?} at {:?}",
                self.session.active_id(),
                self.session.elapsed_absolute
            );
            self.stop();
        }
    }

    fn pump(&mut self, now: Instant) {
        for event in self.media.drain_events() {
            self.on_media_event(event, now);
        }
    }

    fn on_media_event(&mut self, event: MediaEvent, now: Instant) {
        let Some(active) = self.session.active else {
            debug!("ignoring {event:?} with no active track");
            return;
        };

        match event {
            MediaEvent::Playing => {
                if matches!(
                    self.session.state,
                    PlayerState::Loading | PlayerState::Paused
                ) {
                    self.session.state = PlayerState::Playing;
                    if let WindowEnd::At(end) = active.window_end {
                        self.monitor.arm(end, now);
                    }
                    self.publish();
                }
            }
            MediaEvent::Paused => {
                if self.session.state == PlayerState::Playing {
                    self.session.state = PlayerState::Paused;
                    self.publish();
                }
            }
            MediaEvent::DurationChanged(d) => {
                self.session.asset_duration = Some(d);
                self.publish();
            }
            MediaEvent::Ended => {
                info!("{} reached the end of its asset", active.id);
                self.stop();
            }
            MediaEvent::Error(e) => {
                warn!("playback of {} failed: {e}", active.id);
                self.reset_to_idle();
            }
        }
    }

    fn publish(&mut self) {
        let snapshot = self.snapshot();
        if self.last_published.as_ref() == Some(&snapshot) {
            return;
        }
        self.subscribers.retain(|tx| tx.send(snapshot.clone()).is_ok());
        self.last_published = Some(snapshot);
    }

    /// Halt playback (fading out first if something is playing), cancel the
    /// monitor and detach every subscriber.
    pub fn shutdown(mut self, fade_out: Duration) {
        if self.session.state == PlayerState::Playing {
            self.media.fade_out(fade_out);
        }
        self.teardown();
    }

    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.monitor.cancel();
        self.media.unload();
        self.session.reset();
        self.subscribers.clear();
    }
}

impl<M: MediaOutput> Drop for PlaybackEngine<M> {
    fn drop(&mut self) {
        self.teardown();
    }
}
