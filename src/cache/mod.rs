//! Evaluator caches
//!
//! Normalising strings and classifying paths happens over and over while a
//! large project tree is evaluated. The keys in [`keys`] identify those
//! operations; [`store`] keeps their results in bounded LRU maps.

pub mod config;
pub mod keys;
pub mod store;

pub use config::CacheConfig;
pub use keys::{is_relative_path, FileInfoCacheKey, FixStringCacheKey};
pub use store::{CacheStatistics, CacheStats, EvaluatorCaches, FileInfo, SharedCaches};
