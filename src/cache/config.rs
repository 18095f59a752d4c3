// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Cache configuration options

/// Capacities of the evaluator caches; a capacity of zero disables that cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of memoised `fix_string` results
    pub fix_string_cache_size: usize,

    /// Maximum number of memoised file classifications
    pub file_info_cache_size: usize,

    /// Maximum number of parsed project files kept around
    pub parsed_file_cache_size: usize,
}

impl CacheConfig {
    /// Create a new cache configuration with custom settings
    pub fn new(
        fix_string_cache_size: usize,
        file_info_cache_size: usize,
        parsed_file_cache_size: usize,
    ) -> Self {
        Self {
            fix_string_cache_size,
            file_info_cache_size,
            parsed_file_cache_size,
        }
    }

    /// Create a configuration for large project trees
    pub fn high_performance() -> Self {
        Self {
            fix_string_cache_size: 100_000,
            file_info_cache_size: 50_000,
            parsed_file_cache_size: 2_000,
        }
    }

    /// Create a configuration optimized for low memory usage
    pub fn low_memory() -> Self {
        Self {
            fix_string_cache_size: 256,
            file_info_cache_size: 256,
            parsed_file_cache_size: 16,
        }
    }

    /// Create a configuration with caching disabled
    pub fn disabled() -> Self {
        Self {
            fix_string_cache_size: 0,
            file_info_cache_size: 0,
            parsed_file_cache_size: 0,
        }
    }

    /// Whether any cache is enabled at all
    pub fn is_enabled(&self) -> bool {
        self.fix_string_cache_size > 0
            || self.file_info_cache_size > 0
            || self.parsed_file_cache_size > 0
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            fix_string_cache_size: 10_000,
            file_info_cache_size: 5_000,
            parsed_file_cache_size: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.fix_string_cache_size, 10_000);
        assert_eq!(config.file_info_cache_size, 5_000);
        assert_eq!(config.parsed_file_cache_size, 256);
        assert!(config.is_enabled());
    }

    #[test]
    fn test_cache_config_high_performance() {
        let config = CacheConfig::high_performance();
        assert!(config.fix_string_cache_size > CacheConfig::default().fix_string_cache_size);
        assert!(config.is_enabled());
    }

    #[test]
    fn test_cache_config_low_memory() {
        let config = CacheConfig::low_memory();
        assert_eq!(config.fix_string_cache_size, 256);
        assert_eq!(config.parsed_file_cache_size, 16);
    }

    #[test]
    fn test_cache_config_disabled() {
        let config = CacheConfig::disabled();
        assert_eq!(config, CacheConfig::new(0, 0, 0));
        assert!(!config.is_enabled());
    }
}
