//! Cache keys for memoised path operations
//!
//! Both key types capture a working directory that takes part in equality
//! but not in the hash. Two keys that only differ by directory therefore land
//! in the same bucket and are told apart by `==`.

use crate::paths::FixFlags;
use once_cell::unsync::OnceCell;
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

fn hash_str(s: &str) -> u64 {
    let mut hasher = FxHasher::default();
    s.hash(&mut hasher);
    hasher.finish()
}

fn hash_byte(b: u8) -> u64 {
    let mut hasher = FxHasher::default();
    b.hash(&mut hasher);
    hasher.finish()
}

/// Whether `file` has to be resolved against a directory
///
/// Empty paths are relative. Paths starting with `/` or `\` (which covers
/// `//server` and `\\server`) and paths starting with a drive letter and a
/// colon are absolute.
pub fn is_relative_path(file: &str) -> bool {
    let mut chars = file.chars();
    let Some(c0) = chars.next() else {
        return true;
    };
    let c1 = chars.next();
    !(c0 == '/' || c0 == '\\' || (c0.is_alphabetic() && c1 == Some(':')))
}

/// Key for the `fix_string` cache: (string, flags, working directory)
#[derive(Debug, Clone)]
pub struct FixStringCacheKey {
    string: String,
    pwd: String,
    flags: FixFlags,
    hash: OnceCell<u64>,
}

impl FixStringCacheKey {
    /// Create a key; `pwd` is the directory in effect when the key is built
    pub fn new(string: impl Into<String>, flags: FixFlags, pwd: impl Into<String>) -> Self {
        Self {
            string: string.into(),
            pwd: pwd.into(),
            flags,
            hash: OnceCell::new(),
        }
    }

    /// Hash of (string, flags), computed on first use
    pub fn hash_code(&self) -> u64 {
        *self
            .hash
            .get_or_init(|| hash_str(&self.string) ^ hash_byte(self.flags.bits()))
    }

    pub fn string(&self) -> &str {
        &self.string
    }

    pub fn flags(&self) -> FixFlags {
        self.flags
    }

    pub fn pwd(&self) -> &str {
        &self.pwd
    }
}

impl PartialEq for FixStringCacheKey {
    fn eq(&self, other: &Self) -> bool {
        self.hash_code() == other.hash_code()
            && self.flags == other.flags
            && self.string == other.string
            && self.pwd == other.pwd
    }
}

impl Eq for FixStringCacheKey {}

impl Hash for FixStringCacheKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

/// Key for the file-info cache: (file, directory if the file is relative)
#[derive(Debug, Clone)]
pub struct FileInfoCacheKey {
    file: String,
    pwd: String,
    hash: OnceCell<u64>,
}

impl FileInfoCacheKey {
    /// Create a key; `pwd` is only kept when `file` is relative
    pub fn new(file: impl Into<String>, pwd: &str) -> Self {
        let file = file.into();
        let pwd = if is_relative_path(&file) {
            pwd.to_string()
        } else {
            String::new()
        };
        Self {
            file,
            pwd,
            hash: OnceCell::new(),
        }
    }

    /// Hash of the file string, computed on first use
    pub fn hash_code(&self) -> u64 {
        *self.hash.get_or_init(|| hash_str(&self.file))
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// Captured directory, empty for absolute paths
    pub fn pwd(&self) -> &str {
        &self.pwd
    }
}

impl PartialEq for FileInfoCacheKey {
    fn eq(&self, other: &Self) -> bool {
        self.hash_code() == other.hash_code() && self.file == other.file && self.pwd == other.pwd
    }
}

impl Eq for FileInfoCacheKey {}

impl Hash for FileInfoCacheKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}
