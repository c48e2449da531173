//! Offline asset cache: inspection, availability tracking and warming.
//!
//! A cache root holds named caches (subdirectories); each file below a named
//! cache is one entry whose identifier has the same `/path` shape as a
//! catalog asset reference.

mod dir_store;
mod locator;
mod prefetch;
mod store;
mod tracker;

pub use dir_store::DirCacheStore;
pub use locator::AssetLocator;
pub use prefetch::{PrefetchHandle, PrefetchReport, spawn_prefetch};
pub use store::{AssetMatcher, CacheEntry, CacheError, CacheStore};
pub use tracker::{AssetCacheTracker, CacheEvent, CacheProgress};

#[cfg(test)]
mod tests;
