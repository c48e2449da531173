use super::*;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs;
use std::rc::Rc;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};
use tempfile::tempdir;

const POLL: Duration = Duration::from_millis(500);

/// In-memory cache whose contents the test changes between ticks.
#[derive(Clone, Default)]
struct SimulatedCache {
    caches: Rc<RefCell<BTreeMap<String, Vec<String>>>>,
    offline: Rc<Cell<bool>>,
}

impl SimulatedCache {
    fn add(&self, cache: &str, identifier: &str) {
        self.caches
            .borrow_mut()
            .entry(cache.to_string())
            .or_default()
            .push(identifier.to_string());
    }

    fn fill(&self, cache: &str, n: usize) {
        for i in 1..=n {
            self.add(cache, &format!("/{i}-track.mp3"));
        }
    }
}

impl CacheStore for SimulatedCache {
    fn list_cache_names(&self) -> Result<Vec<String>, CacheError> {
        if self.offline.get() {
            return Err(CacheError::unavailable("storage disabled"));
        }
        Ok(self.caches.borrow().keys().cloned().collect())
    }

    fn list_entries(&self, cache_name: &str) -> Result<Vec<CacheEntry>, CacheError> {
        Ok(self
            .caches
            .borrow()
            .get(cache_name)
            .map(|ids| {
                ids.iter()
                    .map(|id| CacheEntry {
                        identifier: id.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

fn tracker(cache: &SimulatedCache, total: usize) -> AssetCacheTracker<SimulatedCache> {
    AssetCacheTracker::new(cache.clone(), AssetMatcher::default(), POLL, total)
}

fn events(rx: &Receiver<CacheEvent>) -> Vec<CacheEvent> {
    rx.try_iter().collect()
}

#[test]
fn one_progress_per_tick_then_exactly_one_ready() {
    let cache = SimulatedCache::default();
    let mut tracker = tracker(&cache, 19);
    let rx = tracker.subscribe();
    let t0 = Instant::now();
    tracker.start_monitoring(19, t0);

    for i in 1..=19u32 {
        cache.add("audio-v1", &format!("/{i}-track.mp3"));
        tracker.tick(t0 + POLL * i);

        let got = events(&rx);
        assert_eq!(got.len(), 1, "tick {i}: {got:?}");
        if i < 19 {
            match &got[0] {
                CacheEvent::Progress {
                    downloaded, total, ..
                } => {
                    assert_eq!(*downloaded, i as usize);
                    assert_eq!(*total, 19);
                }
                other => panic!("tick {i}: unexpected {other:?}"),
            }
        } else {
            assert_eq!(got[0], CacheEvent::Ready);
        }
    }

    assert!(!tracker.is_monitoring());
    for i in 20..25u32 {
        tracker.tick(t0 + POLL * i);
    }
    assert!(events(&rx).is_empty());
}

#[test]
fn progress_is_monotonic_while_cache_grows() {
    let cache = SimulatedCache::default();
    let mut tracker = tracker(&cache, 5);
    let t0 = Instant::now();
    tracker.start_monitoring(5, t0);

    let mut last = 0;
    for i in 1..=5u32 {
        cache.add("a", &format!("/{i}.mp3"));
        tracker.tick(t0 + POLL * i);
        let now = tracker.progress().downloaded;
        assert!(now >= last);
        assert!(now <= tracker.progress().total);
        last = now;
    }
    assert!(tracker.progress().is_complete());
}

#[test]
fn empty_cache_emits_nothing() {
    let cache = SimulatedCache::default();
    let mut tracker = tracker(&cache, 19);
    let rx = tracker.subscribe();
    let t0 = Instant::now();
    tracker.start_monitoring(19, t0);

    tracker.tick(t0 + POLL);
    tracker.tick(t0 + POLL * 2);
    assert!(events(&rx).is_empty());
    assert!(tracker.is_monitoring());
}

#[test]
fn check_status_reports_an_already_full_cache() {
    let cache = SimulatedCache::default();
    cache.fill("audio-v1", 19);
    let mut tracker = tracker(&cache, 19);
    let rx = tracker.subscribe();

    tracker.check_status();
    assert_eq!(events(&rx), vec![CacheEvent::Ready]);
    assert_eq!(tracker.progress().downloaded, 19);
}

#[test]
fn check_status_is_silent_when_incomplete() {
    let cache = SimulatedCache::default();
    cache.fill("audio-v1", 7);
    let mut tracker = tracker(&cache, 19);
    let rx = tracker.subscribe();

    tracker.check_status();
    assert!(events(&rx).is_empty());
    assert_eq!(tracker.progress().downloaded, 7);
}

#[test]
fn one_shot_and_poll_never_both_report_ready() {
    let cache = SimulatedCache::default();
    cache.fill("audio-v1", 19);
    let mut tracker = tracker(&cache, 19);
    let rx = tracker.subscribe();
    let t0 = Instant::now();

    tracker.start_monitoring(19, t0);
    tracker.check_status();
    tracker.tick(t0 + POLL);
    tracker.check_status();

    assert_eq!(events(&rx), vec![CacheEvent::Ready]);
    assert!(!tracker.is_monitoring());
}

#[test]
fn poll_and_one_shot_in_the_other_order_also_report_once() {
    let cache = SimulatedCache::default();
    cache.fill("audio-v1", 19);
    let mut tracker = tracker(&cache, 19);
    let rx = tracker.subscribe();
    let t0 = Instant::now();

    tracker.start_monitoring(19, t0);
    tracker.tick(t0 + POLL);
    tracker.check_status();

    assert_eq!(events(&rx), vec![CacheEvent::Ready]);
}

#[test]
fn restarting_monitoring_replaces_the_previous_session() {
    let cache = SimulatedCache::default();
    let mut tracker = tracker(&cache, 3);
    let rx = tracker.subscribe();
    let t0 = Instant::now();

    tracker.start_monitoring(3, t0);
    tracker.start_monitoring(3, t0 + Duration::from_millis(200));
    cache.add("a", "/1.mp3");

    // The first schedule would have fired at +500ms; only the second exists.
    tracker.tick(t0 + POLL);
    assert!(events(&rx).is_empty());
    tracker.tick(t0 + Duration::from_millis(700));
    assert_eq!(events(&rx).len(), 1);
}

#[test]
fn duplicates_across_caches_count_once_and_non_audio_is_ignored() {
    let cache = SimulatedCache::default();
    cache.add("precache-v1", "/1-track.mp3");
    cache.add("runtime", "/1-track.mp3");
    cache.add("runtime", "/2-track.MP3");
    cache.add("runtime", "/index.html");
    cache.add("runtime", "/app.js");
    let mut tracker = tracker(&cache, 4);
    let rx = tracker.subscribe();
    let t0 = Instant::now();

    tracker.start_monitoring(4, t0);
    tracker.tick(t0 + POLL);
    assert_eq!(
        events(&rx),
        vec![CacheEvent::Progress {
            progress: 50.0,
            downloaded: 2,
            total: 4
        }]
    );
}

#[test]
fn unavailable_cache_keeps_polling() {
    let cache = SimulatedCache::default();
    cache.fill("a", 2);
    cache.offline.set(true);
    let mut tracker = tracker(&cache, 2);
    let rx = tracker.subscribe();
    let t0 = Instant::now();

    tracker.start_monitoring(2, t0);
    tracker.tick(t0 + POLL);
    assert!(events(&rx).is_empty());
    assert!(tracker.is_monitoring());
    assert_eq!(tracker.progress().downloaded, 0);

    cache.offline.set(false);
    tracker.tick(t0 + POLL * 2);
    assert_eq!(events(&rx), vec![CacheEvent::Ready]);
}

#[test]
fn zero_expected_assets_is_immediately_complete() {
    let cache = SimulatedCache::default();
    let mut tracker = tracker(&cache, 0);
    let rx = tracker.subscribe();
    let t0 = Instant::now();
    tracker.start_monitoring(0, t0);
    tracker.tick(t0 + POLL);
    assert_eq!(events(&rx), vec![CacheEvent::Ready]);
    assert_eq!(tracker.progress().percent(), 100.0);
}

#[test]
fn matcher_uses_configured_extensions() {
    let m = AssetMatcher::new([".OGG", " mp3 ", ""]);
    assert!(m.matches("/a.ogg"));
    assert!(m.matches("/A.Mp3"));
    assert!(m.matches("/clip.mp3?v=2"));
    assert!(!m.matches("/a.wav"));
    assert!(!m.matches("/mp3"));
}

#[test]
fn dir_store_lists_named_caches_and_nested_entries() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("audio-v1/sub")).unwrap();
    fs::create_dir_all(root.join("other")).unwrap();
    fs::write(root.join("audio-v1/1-Intro.mp3"), b"x").unwrap();
    fs::write(root.join("audio-v1/sub/2.mp3"), b"x").unwrap();
    fs::write(root.join("stray.txt"), b"x").unwrap();

    let store = DirCacheStore::new(root);
    assert_eq!(store.list_cache_names().unwrap(), vec!["audio-v1", "other"]);

    let ids: Vec<String> = store
        .list_entries("audio-v1")
        .unwrap()
        .into_iter()
        .map(|e| e.identifier)
        .collect();
    assert_eq!(ids, vec!["/1-Intro.mp3", "/sub/2.mp3"]);
    assert!(store.list_entries("other").unwrap().is_empty());
    assert!(store.list_entries("missing").is_err());
}

#[cfg(unix)]
#[test]
fn dir_store_skips_unreadable_subtrees() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let cache = dir.path().join("audio-v1");
    let locked = cache.join("locked");
    fs::create_dir_all(&locked).unwrap();
    fs::write(cache.join("1-Intro.mp3"), b"x").unwrap();
    fs::write(locked.join("2.mp3"), b"x").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    // Privileged users can still read the directory.
    let unreadable = fs::read_dir(&locked).is_err();

    let store = DirCacheStore::new(dir.path());
    let listed = store.list_entries("audio-v1");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    let ids: Vec<String> = listed
        .unwrap()
        .into_iter()
        .map(|e| e.identifier)
        .collect();
    if unreadable {
        assert_eq!(ids, vec!["/1-Intro.mp3"]);
    } else {
        assert_eq!(ids, vec!["/1-Intro.mp3", "/locked/2.mp3"]);
    }
}

#[test]
fn dir_store_missing_root_is_unavailable() {
    let dir = tempdir().unwrap();
    let store = DirCacheStore::new(dir.path().join("nope"));
    assert!(matches!(
        store.list_cache_names(),
        Err(CacheError::Unavailable { .. })
    ));
}

#[test]
fn tracker_counts_a_real_directory_cache() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("a")).unwrap();
    fs::create_dir_all(root.join("b")).unwrap();
    fs::write(root.join("a/1.mp3"), b"x").unwrap();
    fs::write(root.join("b/1.mp3"), b"x").unwrap();
    fs::write(root.join("b/2.mp3"), b"x").unwrap();

    let mut tracker =
        AssetCacheTracker::new(DirCacheStore::new(root), AssetMatcher::default(), POLL, 2);
    let rx = tracker.subscribe();
    tracker.check_status();
    assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![CacheEvent::Ready]);
}

#[test]
fn locator_prefers_cached_copy() {
    let dir = tempdir().unwrap();
    let assets = dir.path().join("assets");
    let caches = dir.path().join("caches");
    fs::create_dir_all(&assets).unwrap();
    fs::create_dir_all(caches.join("audio-v1")).unwrap();
    fs::write(assets.join("1-Intro.mp3"), b"origin").unwrap();
    fs::write(assets.join("2-Alone.mp3"), b"origin").unwrap();
    fs::write(caches.join("audio-v1/1-Intro.mp3"), b"cached").unwrap();

    let locator = AssetLocator::new(&assets, Some(DirCacheStore::new(&caches)));
    assert_eq!(
        locator.resolve("/1-Intro.mp3"),
        caches.join("audio-v1").join("1-Intro.mp3")
    );
    assert_eq!(locator.resolve("/2-Alone.mp3"), assets.join("2-Alone.mp3"));

    let no_cache = AssetLocator::new(&assets, None);
    assert_eq!(no_cache.resolve("/1-Intro.mp3"), assets.join("1-Intro.mp3"));
}

#[test]
fn locator_does_not_escape_the_asset_root() {
    let locator = AssetLocator::new("/srv/assets", None);
    assert_eq!(
        locator.origin_path("/../etc/passwd"),
        std::path::PathBuf::from("/../etc/passwd")
    );
    assert_eq!(
        locator.origin_path("/a b/c.mp3"),
        std::path::PathBuf::from("/srv/assets/a b/c.mp3")
    );
}

#[test]
fn prefetch_fills_the_cache_and_skips_cached_assets() {
    let dir = tempdir().unwrap();
    let assets = dir.path().join("assets");
    let caches = dir.path().join("caches");
    let staging = dir.path().join("staging");
    fs::create_dir_all(&assets).unwrap();
    fs::create_dir_all(caches.join("audio-v1")).unwrap();
    fs::write(assets.join("1.mp3"), b"one").unwrap();
    fs::write(assets.join("2.mp3"), b"two").unwrap();
    fs::write(caches.join("audio-v1/2.mp3"), b"two").unwrap();

    let store = DirCacheStore::new(&caches);
    let locator = AssetLocator::new(&assets, Some(store.clone()));
    let refs = vec![
        "/1.mp3".to_string(),
        "/2.mp3".to_string(),
        "/3-missing.mp3".to_string(),
    ];

    let handle = spawn_prefetch(refs, locator, store.clone(), "audio-v1".into(), staging);
    while !handle.is_finished() {
        std::thread::sleep(Duration::from_millis(5));
    }
    let report = handle.cancel_and_join().unwrap();

    assert_eq!(
        report,
        PrefetchReport {
            copied: 1,
            already_cached: 1,
            failed: 1
        }
    );
    assert_eq!(fs::read(caches.join("audio-v1/1.mp3")).unwrap(), b"one");
    // Nothing partial is left where the tracker could count it.
    let ids: Vec<String> = store
        .list_entries("audio-v1")
        .unwrap()
        .into_iter()
        .map(|e| e.identifier)
        .collect();
    assert_eq!(ids, vec!["/1.mp3", "/2.mp3"]);
}
