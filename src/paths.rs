//! Path and string normalisation helpers
//!
//! These are pure functions; callers that want memoisation go through the
//! evaluator caches in [`crate::cache`].

use std::ops::BitOr;

/// Separator placed between path components on the host
pub const DIR_SEPARATOR: &str = if cfg!(windows) { "\\" } else { "/" };

/// Separator placed between entries of a path list on the host
pub const DIRLIST_SEPARATOR: &str = if cfg!(windows) { ";" } else { ":" };

/// Transformations applied by [`fix_string`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FixFlags(u8);

impl FixFlags {
    /// Leave the string alone (apart from quote stripping)
    pub const NONE: Self = Self(0x00);
    /// Replace `$(NAME)` with the value of the environment variable
    pub const ENV_VARS: Self = Self(0x01);
    /// Collapse `.`/`..` components and duplicate separators
    pub const CANONICALIZE: Self = Self(0x02);
    /// Use the host's directory separator
    pub const TO_LOCAL_SEPARATORS: Self = Self(0x04);
    /// Use the target's directory separator
    pub const TO_TARGET_SEPARATORS: Self = Self(0x08);
    /// Use forward slashes
    pub const TO_NORMAL_SEPARATORS: Self = Self(0x10);

    /// Raw flag byte
    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Build flags from a raw byte
    #[inline]
    pub fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Whether every flag in `other` is set
    #[inline]
    pub fn contains(self, other: FixFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for FixFlags {
    type Output = FixFlags;

    fn bitor(self, rhs: FixFlags) -> FixFlags {
        FixFlags(self.0 | rhs.0)
    }
}

/// Normalise `input` according to `flags`
pub fn fix_string(input: &str, flags: FixFlags) -> String {
    let mut s = if flags.contains(FixFlags::ENV_VARS) {
        expand_make_env(input)
    } else {
        input.to_string()
    };

    if flags.contains(FixFlags::CANONICALIZE) {
        s = clean_path(&s);
    }

    let bytes = s.as_bytes();
    if bytes.len() > 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        s[..1].make_ascii_lowercase();
    }

    if flags.contains(FixFlags::TO_LOCAL_SEPARATORS) || flags.contains(FixFlags::TO_TARGET_SEPARATORS) {
        s = to_native_separators(&s);
    } else if flags.contains(FixFlags::TO_NORMAL_SEPARATORS) {
        s = s.replace('\\', "/");
    }

    let quoted = s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')));
    if quoted {
        s = s[1..s.len() - 1].to_string();
    }
    s
}

/// Replace `$(NAME)` references with environment values
fn expand_make_env(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("$(") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find(')') {
            Some(end) => {
                let name = &after[..end];
                out.push_str(&std::env::var(name).unwrap_or_default());
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Convert forward slashes to the host separator
pub fn to_native_separators(path: &str) -> String {
    if cfg!(windows) {
        path.replace('/', "\\")
    } else {
        path.to_string()
    }
}

/// Remove `.` and `..` components, duplicate and trailing separators
pub fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    let normalized;
    let path = if cfg!(windows) {
        normalized = path.replace('\\', "/");
        normalized.as_str()
    } else {
        path
    };

    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&"..") => parts.push(".."),
                Some(last) if parts.len() == 1 && !absolute && last.ends_with(':') => {}
                Some(_) => {
                    parts.pop();
                }
                None if absolute => {}
                None => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Resolve `path` against `base` unless it is already absolute
pub fn absolute_path(path: &str, base: &str) -> String {
    if path.is_empty() {
        clean_path(base)
    } else if crate::cache::is_relative_path(path) {
        clean_path(&format!("{base}/{path}"))
    } else {
        clean_path(path)
    }
}

/// Express `path` relative to `base`; both are made absolute against `base`
pub fn relative_path(path: &str, base: &str) -> String {
    let target = absolute_path(path, base);
    let base = clean_path(base);
    let target_parts: Vec<&str> = target.split('/').filter(|p| !p.is_empty()).collect();
    let base_parts: Vec<&str> = base.split('/').filter(|p| !p.is_empty()).collect();

    let common = target_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut out: Vec<&str> = Vec::new();
    out.extend(std::iter::repeat_n("..", base_parts.len() - common));
    out.extend(&target_parts[common..]);
    if out.is_empty() {
        ".".to_string()
    } else {
        out.join("/")
    }
}

/// Directory part of `path`, `.` when there is none
pub fn dir_part(path: &str) -> String {
    match path.rfind('/') {
        None => ".".to_string(),
        Some(0) => "/".to_string(),
        Some(i) => path[..i].to_string(),
    }
}

/// File name part of `path`
pub fn file_name(path: &str) -> &str {
    match path.rfind('/') {
        None => path,
        Some(i) => &path[i + 1..],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path("/a/b/../c/./d/"), "/a/c/d");
        assert_eq!(clean_path("a//b"), "a/b");
        assert_eq!(clean_path("../x/../../y"), "../../y");
        assert_eq!(clean_path("/.."), "/");
        assert_eq!(clean_path("a/.."), ".");
        assert_eq!(clean_path(""), "");
    }

    #[test]
    fn test_absolute_and_relative() {
        assert_eq!(absolute_path("src/main.cpp", "/work"), "/work/src/main.cpp");
        assert_eq!(absolute_path("/etc/hosts", "/work"), "/etc/hosts");
        assert_eq!(absolute_path("", "/work/"), "/work");
        assert_eq!(relative_path("/work/src/a.cpp", "/work"), "src/a.cpp");
        assert_eq!(relative_path("/other/a.cpp", "/work/sub"), "../../other/a.cpp");
        assert_eq!(relative_path("/work", "/work"), ".");
    }

    #[test]
    fn test_dir_and_file_name() {
        assert_eq!(dir_part("/work/app.pro"), "/work");
        assert_eq!(dir_part("/app.pro"), "/");
        assert_eq!(dir_part("(stdin)"), ".");
        assert_eq!(file_name("/work/app.pro"), "app.pro");
        assert_eq!(file_name("app.pro"), "app.pro");
    }

    #[test]
    fn test_fix_string() {
        assert_eq!(fix_string("\"quoted\"", FixFlags::NONE), "quoted");
        assert_eq!(fix_string("a/./b/../c", FixFlags::CANONICALIZE), "a/c");
        assert_eq!(fix_string("C:/Dir", FixFlags::NONE), "c:/Dir");
        assert_eq!(
            fix_string("a\\b", FixFlags::TO_NORMAL_SEPARATORS),
            "a/b"
        );
        let flags = FixFlags::CANONICALIZE | FixFlags::TO_NORMAL_SEPARATORS;
        assert!(flags.contains(FixFlags::CANONICALIZE));
        assert!(!flags.contains(FixFlags::ENV_VARS));
    }

    #[test]
    fn test_make_env_is_left_alone_without_flag() {
        assert_eq!(fix_string("$(NOPE_NOT_SET)/x", FixFlags::NONE), "$(NOPE_NOT_SET)/x");
        assert_eq!(fix_string("$(PROEVAL_SURELY_UNSET)/x", FixFlags::ENV_VARS), "/x");
    }
}
