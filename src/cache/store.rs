//! LRU-backed memoisation of path work and parsed files
//!
//! One [`EvaluatorCaches`] instance is created by the driver and handed to
//! every evaluator it spawns as a [`SharedCaches`]. Dropping the last handle,
//! or calling [`EvaluatorCaches::clear`], is the teardown.

use super::config::CacheConfig;
use super::keys::{FileInfoCacheKey, FixStringCacheKey};
use crate::ast::ProFile;
use lru::LruCache;
use parking_lot::Mutex;
use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Caches shared between a driver and the evaluators it creates
pub type SharedCaches = Arc<Mutex<EvaluatorCaches>>;

/// What the file system said about a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileInfo {
    pub exists: bool,
    pub is_dir: bool,
    pub is_file: bool,
}

impl FileInfo {
    /// Query the file system
    pub fn probe(path: &str) -> Self {
        match std::fs::metadata(path) {
            Ok(meta) => Self {
                exists: true,
                is_dir: meta.is_dir(),
                is_file: meta.is_file(),
            },
            Err(_) => Self::default(),
        }
    }
}

/// Basic cache statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
}

impl CacheStats {
    /// Calculate hit ratio as percentage
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }

    fn record(&mut self, hit: bool) {
        if hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits: {}, misses: {}, hit ratio: {:.1}%",
            self.hits,
            self.misses,
            self.hit_ratio()
        )
    }
}

/// Statistics for every cache
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStatistics {
    pub fix_string: CacheStats,
    pub file_info: CacheStats,
    pub parsed_files: CacheStats,
}

fn make_lru<K: Hash + Eq, V>(capacity: usize) -> Option<LruCache<K, V>> {
    NonZeroUsize::new(capacity).map(LruCache::new)
}

/// The evaluator caches
pub struct EvaluatorCaches {
    config: CacheConfig,
    fix_string: Option<LruCache<FixStringCacheKey, String>>,
    file_info: Option<LruCache<FileInfoCacheKey, FileInfo>>,
    parsed_files: Option<LruCache<String, Arc<ProFile>>>,
    stats: CacheStatistics,
}

impl EvaluatorCaches {
    /// Create the caches with the given capacities
    pub fn new(config: CacheConfig) -> Self {
        Self {
            fix_string: make_lru(config.fix_string_cache_size),
            file_info: make_lru(config.file_info_cache_size),
            parsed_files: make_lru(config.parsed_file_cache_size),
            config,
            stats: CacheStatistics::default(),
        }
    }

    /// Create the caches behind a shared handle
    pub fn shared(config: CacheConfig) -> SharedCaches {
        Arc::new(Mutex::new(Self::new(config)))
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Look up a `fix_string` result, computing and storing it on a miss
    pub fn fix_string_with<F>(&mut self, key: FixStringCacheKey, compute: F) -> String
    where
        F: FnOnce(&FixStringCacheKey) -> String,
    {
        let Some(cache) = self.fix_string.as_mut() else {
            return compute(&key);
        };
        if let Some(hit) = cache.get(&key) {
            self.stats.fix_string.record(true);
            return hit.clone();
        }
        self.stats.fix_string.record(false);
        let value = compute(&key);
        cache.put(key, value.clone());
        value
    }

    /// Look up a file classification, probing on a miss
    pub fn file_info_with<F>(&mut self, key: FileInfoCacheKey, compute: F) -> FileInfo
    where
        F: FnOnce(&FileInfoCacheKey) -> FileInfo,
    {
        let Some(cache) = self.file_info.as_mut() else {
            return compute(&key);
        };
        if let Some(hit) = cache.get(&key) {
            self.stats.file_info.record(true);
            return *hit;
        }
        self.stats.file_info.record(false);
        let info = compute(&key);
        cache.put(key, info);
        info
    }

    /// Previously parsed file at an absolute path
    pub fn parsed_file(&mut self, path: &str) -> Option<Arc<ProFile>> {
        let cache = self.parsed_files.as_mut()?;
        let hit = cache.get(path).cloned();
        self.stats.parsed_files.record(hit.is_some());
        hit
    }

    /// Remember a parsed file
    pub fn insert_parsed_file(&mut self, path: impl Into<String>, file: Arc<ProFile>) {
        if let Some(cache) = self.parsed_files.as_mut() {
            cache.put(path.into(), file);
        }
    }

    /// Forget every file classification; used after the file system changed
    pub fn invalidate_file_info(&mut self) {
        if let Some(cache) = self.file_info.as_mut() {
            cache.clear();
        }
    }

    /// Number of entries in (fix-string, file-info, parsed-file) caches
    pub fn len(&self) -> (usize, usize, usize) {
        (
            self.fix_string.as_ref().map_or(0, LruCache::len),
            self.file_info.as_ref().map_or(0, LruCache::len),
            self.parsed_files.as_ref().map_or(0, LruCache::len),
        )
    }

    /// Hit/miss counters
    pub fn stats(&self) -> CacheStatistics {
        self.stats
    }

    /// Drop every entry and reset the statistics
    pub fn clear(&mut self) {
        if let Some(cache) = self.fix_string.as_mut() {
            cache.clear();
        }
        if let Some(cache) = self.file_info.as_mut() {
            cache.clear();
        }
        if let Some(cache) = self.parsed_files.as_mut() {
            cache.clear();
        }
        self.stats = CacheStatistics::default();
    }
}

impl Default for EvaluatorCaches {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl fmt::Debug for EvaluatorCaches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluatorCaches")
            .field("config", &self.config)
            .field("len", &self.len())
            .field("stats", &self.stats)
            .finish()
    }
}
