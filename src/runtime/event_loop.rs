use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::MediaOutput;
use crate::cache::{AssetCacheTracker, CacheEvent, CacheStore};
use crate::config;
use crate::player::{PlaybackEngine, PlaybackSnapshot, PlayerState};
use crate::ui;

/// Upper bound on how long the loop waits for input before redrawing.
const FRAME: Duration = Duration::from_millis(50);

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
    pending_zz: bool,
}

/// Everything the loop drives besides the terminal.
pub struct Core<'a, M: MediaOutput, S: CacheStore> {
    pub engine: &'a mut PlaybackEngine<M>,
    pub tracker: Option<&'a mut AssetCacheTracker<S>>,
    pub playback_rx: &'a Receiver<PlaybackSnapshot>,
    pub cache_rx: Option<&'a Receiver<CacheEvent>>,
}

/// Main terminal event loop: ticks the engine and the cache tracker, drains
/// their notifications into `app`, draws and handles input. Returns `Ok(())`
/// when the user quits.
pub fn run<M: MediaOutput, S: CacheStore>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    core: &mut Core<'_, M, S>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let now = Instant::now();
        core.engine.tick(now);
        if let Some(tracker) = core.tracker.as_deref_mut() {
            tracker.tick(now);
        }

        while let Ok(snapshot) = core.playback_rx.try_recv() {
            app.apply_snapshot(snapshot);
        }
        if let Some(rx) = core.cache_rx {
            while let Ok(event) = rx.try_recv() {
                app.apply_cache_event(event);
            }
        }
        // The playhead moves without notifications; pull it once per frame.
        app.playback.elapsed_absolute = core.engine.snapshot().elapsed_absolute;

        terminal.draw(|f| ui::draw(f, app, &settings.ui, &settings.player))?;

        let deadlines = [
            core.engine.next_deadline(),
            core.tracker.as_ref().and_then(|t| t.next_deadline()),
        ];
        if event::poll(poll_timeout(Instant::now(), deadlines))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, core.engine, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Wait no longer than one frame, and no longer than the nearest timer.
pub fn poll_timeout(now: Instant, deadlines: impl IntoIterator<Item = Option<Instant>>) -> Duration {
    deadlines
        .into_iter()
        .flatten()
        .map(|d| d.saturating_duration_since(now))
        .fold(FRAME, Duration::min)
}

/// Returns `true` when the user asked to quit.
fn handle_key_event<M: MediaOutput>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    engine: &mut PlaybackEngine<M>,
    state: &mut EventLoopState,
) -> bool {
    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }
    if key.code != KeyCode::Char('z') {
        state.pending_zz = false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.follow_playback_off();
                app.select_first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            app.follow_playback_off();
            app.select_last();
        }
        KeyCode::Char('z') => {
            // `zz` jumps the cursor back to the clip that is playing.
            if state.pending_zz {
                state.pending_zz = false;
                if let Some(pos) = app
                    .playback
                    .active_track
                    .and_then(|id| app.catalog.position(id))
                {
                    app.selected = pos;
                }
            } else {
                state.pending_zz = true;
            }
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.follow_playback_off();
            app.next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.follow_playback_off();
            app.prev();
        }
        KeyCode::Enter => {
            if let Some(id) = app.selected_id() {
                app.follow_selected();
                engine.select(id);
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            app.follow_playback_on();
            match engine.state() {
                PlayerState::Idle => {
                    if let Some(id) = app.selected_id() {
                        app.follow_selected();
                        engine.select(id);
                    }
                }
                PlayerState::Loading | PlayerState::Playing => engine.pause(),
                PlayerState::Paused => engine.resume(),
            }
        }
        KeyCode::Char('x') => {
            app.follow_playback_on();
            engine.stop();
        }
        KeyCode::Char('l') => {
            app.follow_playback_on();
            engine.next();
        }
        KeyCode::Char('h') => {
            app.follow_playback_on();
            engine.previous();
        }
        KeyCode::Char('L') => {
            let step = Duration::from_secs(settings.player.scrub_seconds);
            let at = engine.snapshot().elapsed_absolute;
            engine.seek(at.saturating_add(step));
        }
        KeyCode::Char('H') => {
            let step = Duration::from_secs(settings.player.scrub_seconds);
            let at = engine.snapshot().elapsed_absolute;
            engine.seek(at.saturating_sub(step));
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            engine.set_volume(engine.volume() + settings.player.volume_step);
        }
        KeyCode::Char('-') => {
            engine.set_volume(engine.volume() - settings.player.volume_step);
        }
        KeyCode::Char('K') => app.toggle_metadata_window(),
        _ => {}
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_timeout_is_capped_at_one_frame() {
        let now = Instant::now();
        assert_eq!(poll_timeout(now, [None, None]), FRAME);
        assert_eq!(
            poll_timeout(now, [Some(now + Duration::from_secs(5))]),
            FRAME
        );
    }

    #[test]
    fn poll_timeout_follows_nearest_deadline() {
        let now = Instant::now();
        let timeout = poll_timeout(
            now,
            [
                Some(now + Duration::from_millis(30)),
                Some(now + Duration::from_millis(10)),
            ],
        );
        assert_eq!(timeout, Duration::from_millis(10));
        assert_eq!(
            poll_timeout(now, [Some(now - Duration::from_millis(1))]),
            Duration::ZERO
        );
    }
}
