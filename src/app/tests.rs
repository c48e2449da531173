use super::*;
use crate::cache::CacheEvent;
use crate::catalog::{Catalog, TrackDescriptor, TrackId, WindowEnd};
use crate::player::{PlaybackSnapshot, PlayerState};
use std::time::Duration;

fn catalog(n: u32) -> Catalog {
    let tracks = (1..=n)
        .map(|id| {
            TrackDescriptor::new(
                id,
                format!("/{id}.mp3"),
                format!("Track {id}"),
                Duration::ZERO,
                WindowEnd::NaturalEnd,
            )
            .unwrap()
        })
        .collect();
    Catalog::new(tracks).unwrap()
}

fn playing(id: u32) -> PlaybackSnapshot {
    PlaybackSnapshot {
        active_track: Some(TrackId(id)),
        state: PlayerState::Playing,
        ..PlaybackSnapshot::default()
    }
}

#[test]
fn next_prev_wrap_around() {
    let mut app = App::new(catalog(3));
    app.prev();
    assert_eq!(app.selected, 2);
    app.next();
    assert_eq!(app.selected, 0);
    app.next();
    app.next();
    assert_eq!(app.selected_id(), Some(TrackId(3)));
}

#[test]
fn select_first_and_last() {
    let mut app = App::new(catalog(4));
    app.select_last();
    assert_eq!(app.selected, 3);
    app.select_first();
    assert_eq!(app.selected, 0);
}

#[test]
fn snapshot_moves_cursor_when_following() {
    let mut app = App::new(catalog(4));
    app.apply_snapshot(playing(3));
    assert_eq!(app.selected, 2);
    assert_eq!(app.active_track().map(|t| t.id), Some(TrackId(3)));
}

#[test]
fn free_roam_cursor_is_left_alone() {
    let mut app = App::new(catalog(4));
    app.follow_playback_off();
    app.next();
    app.apply_snapshot(playing(4));
    assert_eq!(app.selected, 1);
    assert!(app.playback.is_playing());
}

#[test]
fn pending_follow_waits_for_the_selected_track() {
    let mut app = App::new(catalog(4));
    app.selected = 2;
    app.follow_selected();
    assert_eq!(app.pending_follow, Some(TrackId(3)));

    // A stale snapshot for the previous track must not yank the cursor back.
    app.apply_snapshot(playing(1));
    assert_eq!(app.selected, 2);
    assert_eq!(app.pending_follow, Some(TrackId(3)));

    app.apply_snapshot(playing(3));
    assert_eq!(app.selected, 2);
    assert!(app.pending_follow.is_none());

    app.apply_snapshot(playing(4));
    assert_eq!(app.selected, 3);
}

#[test]
fn idle_snapshot_keeps_cursor() {
    let mut app = App::new(catalog(4));
    app.selected = 1;
    app.apply_snapshot(PlaybackSnapshot::default());
    assert_eq!(app.selected, 1);
    assert!(app.active_track().is_none());
}

#[test]
fn cache_events_update_status_and_ready_sticks() {
    let mut app = App::new(catalog(2));
    assert_eq!(app.cache, CacheStatus::Pending);

    app.apply_cache_event(CacheEvent::Progress {
        progress: 50.0,
        downloaded: 1,
        total: 2,
    });
    assert!(matches!(
        app.cache,
        CacheStatus::Downloading {
            downloaded: 1,
            total: 2,
            ..
        }
    ));

    app.apply_cache_event(CacheEvent::Ready);
    assert_eq!(app.cache, CacheStatus::Ready);

    app.apply_cache_event(CacheEvent::Progress {
        progress: 50.0,
        downloaded: 1,
        total: 2,
    });
    assert_eq!(app.cache, CacheStatus::Ready);
}

#[test]
fn disabled_cache_ignores_tracker_events() {
    let mut app = App::new(catalog(2));
    app.disable_cache();
    assert_eq!(app.cache, CacheStatus::Disabled);

    app.apply_cache_event(CacheEvent::Progress {
        progress: 50.0,
        downloaded: 1,
        total: 2,
    });
    app.apply_cache_event(CacheEvent::Ready);
    assert_eq!(app.cache, CacheStatus::Disabled);
}

#[test]
fn metadata_window_toggles() {
    let mut app = App::new(catalog(1));
    assert!(!app.metadata_window);
    app.toggle_metadata_window();
    assert!(app.metadata_window);
}
