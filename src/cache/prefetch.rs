//! Background cache warmer.
//!
//! Copies catalog assets from the asset root into a named cache so playback
//! keeps working offline. Files are staged outside the cache root and renamed
//! into place, so a poll never sees a half-written asset.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};

use super::dir_store::DirCacheStore;
use super::locator::AssetLocator;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PrefetchReport {
    pub copied: usize,
    pub already_cached: usize,
    pub failed: usize,
}

pub struct PrefetchHandle {
    stop: Arc<AtomicBool>,
    join: Option<JoinHandle<PrefetchReport>>,
}

impl PrefetchHandle {
    /// Ask the warmer to stop after the current file and wait for it.
    pub fn cancel_and_join(mut self) -> Option<PrefetchReport> {
        self.stop.store(true, Ordering::Relaxed);
        self.join.take().and_then(|h| h.join().ok())
    }

    pub fn is_finished(&self) -> bool {
        self.join.as_ref().map(|h| h.is_finished()).unwrap_or(true)
    }
}

impl Drop for PrefetchHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

pub fn spawn_prefetch(
    asset_refs: Vec<String>,
    locator: AssetLocator,
    store: DirCacheStore,
    cache_name: String,
    staging_dir: PathBuf,
) -> PrefetchHandle {
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = stop.clone();

    let join = thread::spawn(move || {
        let mut report = PrefetchReport::default();
        for (i, asset_ref) in asset_refs.iter().enumerate() {
            if stop_flag.load(Ordering::Relaxed) {
                debug!("cache warmer cancelled");
                break;
            }
            let staged = staging_dir.join(format!("prefetch-{i}.part"));
            match warm_one(asset_ref, &locator, &store, &cache_name, &staged) {
                Ok(true) => report.copied += 1,
                Ok(false) => report.already_cached += 1,
                Err(e) => {
                    warn!("could not cache {asset_ref}: {e}");
                    let _ = fs::remove_file(&staged);
                    report.failed += 1;
                }
            }
        }
        info!(
            "cache warmer done: {} copied, {} already cached, {} failed",
            report.copied, report.already_cached, report.failed
        );
        report
    });

    PrefetchHandle {
        stop,
        join: Some(join),
    }
}

/// Returns `Ok(false)` when the asset was already cached.
fn warm_one(
    asset_ref: &str,
    locator: &AssetLocator,
    store: &DirCacheStore,
    cache_name: &str,
    staged: &Path,
) -> std::io::Result<bool> {
    if store.locate(asset_ref).is_some() {
        return Ok(false);
    }
    let Some(dest) = store.entry_path(cache_name, asset_ref) else {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "asset reference is not a relative path",
        ));
    };

    let src = locator.origin_path(asset_ref);
    if let Some(parent) = staged.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(&src, staged)?;
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::rename(staged, &dest)?;
    debug!("cached {asset_ref} at {}", dest.display());
    Ok(true)
}
