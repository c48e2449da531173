use std::env;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use log::{error, info, warn};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::RodioOutput;
use crate::cache::{AssetCacheTracker, AssetLocator, AssetMatcher, DirCacheStore, spawn_prefetch};
use crate::catalog::Catalog;
use crate::player::{EngineOptions, PlaybackEngine};

mod event_loop;
mod logging;
mod settings;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (mut settings, config_problem) = settings::load_settings();
    if let Some(root) = env::args().nth(1) {
        settings.assets.root = PathBuf::from(root);
    }

    logging::init(&settings.log, settings.log_file().as_deref());
    if let Some(msg) = config_problem {
        warn!("{msg}");
    }
    info!("clipdeck starting, assets under {}", settings.assets.root.display());

    let catalog = Catalog::builtin()?;
    let cache_store = settings.cache_dir().map(DirCacheStore::new);
    if cache_store.is_none() {
        warn!("no cache directory could be determined; offline tracking disabled");
    }
    let locator = AssetLocator::new(settings.assets.root.clone(), cache_store.clone());

    let media = RodioOutput::open(locator.clone()).inspect_err(|e| error!("{e}"))?;
    let mut engine = PlaybackEngine::new(
        catalog.clone(),
        media,
        EngineOptions::from(&settings.player),
    );
    let playback_rx = engine.subscribe();

    let expected_total = settings.cache.expected_total.unwrap_or(catalog.len());
    let mut tracker = cache_store.clone().map(|store| {
        AssetCacheTracker::new(
            store,
            AssetMatcher::new(&settings.cache.extensions),
            Duration::from_millis(settings.cache.poll_ms),
            expected_total,
        )
    });
    let cache_rx = tracker.as_mut().map(|t| t.subscribe());
    if let Some(t) = tracker.as_mut() {
        t.start_monitoring(expected_total, Instant::now());
        t.check_status();
        let progress = t.progress();
        if t.is_monitoring() {
            info!(
                "{}/{} assets cached, watching for the rest",
                progress.downloaded, progress.total
            );
        }
    }

    let prefetch = match &cache_store {
        Some(store) if settings.cache.prefetch => Some(spawn_prefetch(
            catalog.asset_refs().into_iter().map(String::from).collect(),
            locator.clone(),
            store.clone(),
            settings.cache.name.clone(),
            store.root().with_extension("staging"),
        )),
        _ => None,
    };

    let mut app = App::new(catalog);
    app.follow_playback = settings.ui.follow_playback;
    app.set_asset_root(settings.assets.root.display().to_string());
    if tracker.is_none() {
        app.disable_cache();
    }
    app.apply_snapshot(engine.snapshot());

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::default();
        let mut core = event_loop::Core {
            engine: &mut engine,
            tracker: tracker.as_mut(),
            playback_rx: &playback_rx,
            cache_rx: cache_rx.as_ref(),
        };

        event_loop::run(&mut terminal, &settings, &mut app, &mut core, &mut state)
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Some(track) = engine.active_track() {
        info!("quitting during {} ({})", track.display_name, track.id);
    }
    engine.shutdown(Duration::from_millis(settings.player.quit_fade_out_ms));
    if prefetch.as_ref().is_some_and(|p| !p.is_finished()) {
        info!("waiting for the cache warmer to stop");
    }
    if let Some(report) = prefetch.and_then(|p| p.cancel_and_join()) {
        info!(
            "cache warmer stopped: {} copied, {} already cached, {} failed",
            report.copied, report.already_cached, report.failed
        );
    }
    if let Err(e) = &run_result {
        error!("event loop failed: {e}");
    }

    run_result
}
