use std::path::PathBuf;

use super::dir_store::{DirCacheStore, relative_asset_path};

/// Resolves catalog asset references to files, preferring cached copies.
#[derive(Debug, Clone)]
pub struct AssetLocator {
    asset_root: PathBuf,
    cache: Option<DirCacheStore>,
}

impl AssetLocator {
    pub fn new(asset_root: impl Into<PathBuf>, cache: Option<DirCacheStore>) -> Self {
        Self {
            asset_root: asset_root.into(),
            cache,
        }
    }

    /// The file under the asset root for `asset_ref`, ignoring the cache.
    pub fn origin_path(&self, asset_ref: &str) -> PathBuf {
        match relative_asset_path(asset_ref) {
            Some(rel) => self.asset_root.join(rel),
            // Leave unusual references as-is; opening them reports the problem.
            None => PathBuf::from(asset_ref),
        }
    }

    pub fn resolve(&self, asset_ref: &str) -> PathBuf {
        self.cache
            .as_ref()
            .and_then(|c| c.locate(asset_ref))
            .unwrap_or_else(|| self.origin_path(asset_ref))
    }
}
