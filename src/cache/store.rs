use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache unavailable: {reason}")]
    Unavailable { reason: String },
}

impl CacheError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

/// One stored item of a named cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub identifier: String,
}

/// Read-only view of a persistent content cache keyed by asset identifier.
pub trait CacheStore {
    fn list_cache_names(&self) -> Result<Vec<String>, CacheError>;

    fn list_entries(&self, cache_name: &str) -> Result<Vec<CacheEntry>, CacheError>;
}

/// Decides which cache identifiers count as audio assets.
///
/// An identifier matches when it contains `.<ext>` for any configured
/// extension, ignoring case.
#[derive(Debug, Clone)]
pub struct AssetMatcher {
    needles: Vec<String>,
}

impl AssetMatcher {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let needles = extensions
            .into_iter()
            .map(|e| e.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .map(|e| format!(".{e}"))
            .collect();
        Self { needles }
    }

    pub fn matches(&self, identifier: &str) -> bool {
        let id = identifier.to_ascii_lowercase();
        self.needles.iter().any(|n| id.contains(n.as_str()))
    }
}

impl Default for AssetMatcher {
    fn default() -> Self {
        Self::new(["mp3"])
    }
}
