//! Evaluator configuration

use crate::cache::CacheConfig;
use indexmap::IndexMap;
use std::ops::BitOr;

/// Which parts of the evaluation sequence `read()` runs, and how loudly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadFlags(u8);

impl LoadFlags {
    /// Only the project file itself
    pub const PRO_ONLY: Self = Self(0x00);
    /// Pre-assignments and the spec's `qmake.conf`
    pub const PRE_FILES: Self = Self(0x01);
    /// Post-assignments and CONFIG features
    pub const POST_FILES: Self = Self(0x02);
    /// Everything
    pub const ALL: Self = Self(0x03);
    /// Do not complain about unreadable files
    pub const SILENT: Self = Self(0x10);
    /// Do not record the file in `.QMAKE_INTERNAL_INCLUDED_FILES`
    pub const HIDDEN: Self = Self(0x20);

    #[inline]
    pub fn contains(self, other: LoadFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Copy of `self` without the bits of `other`
    #[inline]
    pub fn without(self, other: LoadFlags) -> Self {
        Self(self.0 & !other.0)
    }
}

impl Default for LoadFlags {
    fn default() -> Self {
        Self::ALL
    }
}

impl BitOr for LoadFlags {
    type Output = LoadFlags;

    fn bitor(self, rhs: LoadFlags) -> LoadFlags {
        LoadFlags(self.0 | rhs.0)
    }
}

/// Default limit for nested user function calls
pub const DEFAULT_MAX_CALL_DEPTH: usize = 100;

/// Settings an evaluator is created with
#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    /// Directory relative paths are resolved against
    pub pwd: String,
    /// Assignments evaluated before the project (`--set`)
    pub extra_vars: Vec<String>,
    /// Assignments evaluated after the project (`--after`)
    pub post_vars: Vec<String>,
    /// Values appended to CONFIG before the project is read
    pub extra_configs: Vec<String>,
    /// Evaluate for the host rather than the target
    pub host_build: bool,
    /// Directory holding `qmake.conf`
    pub spec_dir: Option<String>,
    /// Directories searched for `<feature>.prf`
    pub feature_roots: Vec<String>,
    /// Values returned by `$$[NAME]`
    pub properties: IndexMap<String, String>,
    /// Maximum nesting of user function calls
    pub max_call_depth: usize,
    /// Cache capacities
    pub cache: CacheConfig,
}

impl EvaluatorConfig {
    /// Create a configuration rooted at the process's working directory
    pub fn new() -> Self {
        let pwd = std::env::current_dir()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|_| ".".to_string());
        Self::with_pwd(pwd)
    }

    /// Create a configuration rooted at `pwd`
    pub fn with_pwd(pwd: impl Into<String>) -> Self {
        Self {
            pwd: pwd.into(),
            extra_vars: Vec::new(),
            post_vars: Vec::new(),
            extra_configs: Vec::new(),
            host_build: false,
            spec_dir: None,
            feature_roots: Vec::new(),
            properties: IndexMap::new(),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            cache: CacheConfig::default(),
        }
    }

    pub fn with_extra_var(mut self, assignment: impl Into<String>) -> Self {
        self.extra_vars.push(assignment.into());
        self
    }

    pub fn with_post_var(mut self, assignment: impl Into<String>) -> Self {
        self.post_vars.push(assignment.into());
        self
    }

    pub fn with_config(mut self, value: impl Into<String>) -> Self {
        self.extra_configs.push(value.into());
        self
    }

    pub fn with_host_build(mut self, host_build: bool) -> Self {
        self.host_build = host_build;
        self
    }

    pub fn with_spec_dir(mut self, dir: impl Into<String>) -> Self {
        self.spec_dir = Some(dir.into());
        self
    }

    pub fn with_feature_root(mut self, dir: impl Into<String>) -> Self {
        self.feature_roots.push(dir.into());
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_flags() {
        assert!(LoadFlags::ALL.contains(LoadFlags::PRE_FILES));
        assert!(LoadFlags::ALL.contains(LoadFlags::POST_FILES));
        assert!(!LoadFlags::PRO_ONLY.contains(LoadFlags::PRE_FILES));
        let flags = LoadFlags::ALL | LoadFlags::SILENT;
        assert!(flags.contains(LoadFlags::SILENT));
        assert!(!flags.without(LoadFlags::SILENT).contains(LoadFlags::SILENT));
    }

    #[test]
    fn test_builder() {
        let config = EvaluatorConfig::with_pwd("/w")
            .with_extra_var("A = 1")
            .with_config("debug")
            .with_property("QT_VERSION", "5.6.0")
            .with_cache(CacheConfig::disabled());
        assert_eq!(config.pwd, "/w");
        assert_eq!(config.extra_vars, vec!["A = 1".to_string()]);
        assert_eq!(config.extra_configs, vec!["debug".to_string()]);
        assert_eq!(config.properties.get("QT_VERSION").map(String::as_str), Some("5.6.0"));
        assert_eq!(config.max_call_depth, DEFAULT_MAX_CALL_DEPTH);
        assert!(!config.cache.is_enabled());
    }
}
