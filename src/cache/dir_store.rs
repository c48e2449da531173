use std::fs;
use std::path::{Component, Path, PathBuf};

use log::warn;
use walkdir::WalkDir;

use super::store::{CacheEntry, CacheError, CacheStore};

/// A cache laid out on disk: `<root>/<cache name>/<identifier path>`.
#[derive(Debug, Clone)]
pub struct DirCacheStore {
    root: PathBuf,
}

/// Turn `/a/b.mp3` into the relative path `a/b.mp3`, refusing anything that
/// could escape the directory it is joined onto.
pub(super) fn relative_asset_path(identifier: &str) -> Option<PathBuf> {
    let rel = Path::new(identifier.trim_start_matches('/'));
    let safe = rel.components().all(|c| matches!(c, Component::Normal(_)));
    if rel.as_os_str().is_empty() || !safe {
        return None;
    }
    Some(rel.to_path_buf())
}

fn identifier_for(rel: &Path) -> String {
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    format!("/{}", parts.join("/"))
}

impl DirCacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where `identifier` lives (or would live) inside the named cache.
    pub fn entry_path(&self, cache_name: &str, identifier: &str) -> Option<PathBuf> {
        relative_asset_path(identifier).map(|rel| self.root.join(cache_name).join(rel))
    }

    /// First cached file for `identifier`, searching named caches in order.
    pub fn locate(&self, identifier: &str) -> Option<PathBuf> {
        let names = self.list_cache_names().ok()?;
        names
            .iter()
            .filter_map(|name| self.entry_path(name, identifier))
            .find(|p| p.is_file())
    }
}

impl CacheStore for DirCacheStore {
    fn list_cache_names(&self) -> Result<Vec<String>, CacheError> {
        let read = fs::read_dir(&self.root).map_err(|e| {
            CacheError::unavailable(format!("{}: {e}", self.root.display()))
        })?;

        let mut names: Vec<String> = read
            .filter_map(|e| {
                e.inspect_err(|e| warn!("skipping cache entry in {}: {e}", self.root.display()))
                    .ok()
            })
            .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .collect();
        names.sort();
        Ok(names)
    }

    fn list_entries(&self, cache_name: &str) -> Result<Vec<CacheEntry>, CacheError> {
        let dir = self.root.join(cache_name);
        if !dir.is_dir() {
            return Err(CacheError::unavailable(format!(
                "no cache named {cache_name:?} under {}",
                self.root.display()
            )));
        }

        let mut entries = Vec::new();
        for entry in WalkDir::new(&dir).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    // The rest of the cache still counts.
                    warn!("skipping unreadable entry in cache {cache_name:?}: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(rel) = entry.path().strip_prefix(&dir) {
                entries.push(CacheEntry {
                    identifier: identifier_for(rel),
                });
            }
        }
        entries.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        Ok(entries)
    }
}
