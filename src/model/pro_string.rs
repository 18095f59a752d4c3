//! String values and variable keys

use serde::{Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// A single value bound to a project variable
///
/// Values are shared between scopes and function results, so the text is
/// reference counted and cloning is cheap.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ProString(Arc<str>);

impl ProString {
    /// Create a value from anything string-like
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(Arc::from(s.as_ref()))
    }

    /// The value as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for ProString {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ProString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ProString {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProString {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for ProString {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl From<&String> for ProString {
    fn from(s: &String) -> Self {
        Self(Arc::from(s.as_str()))
    }
}

impl PartialEq<str> for ProString {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for ProString {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl fmt::Display for ProString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ProString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl Serialize for ProString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Name of a project variable or function
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ProKey(Arc<str>);

impl ProKey {
    /// Create a key
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(Arc::from(s.as_ref()))
    }

    /// The key as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Keys starting with a dot are evaluator bookkeeping and never dumped
    #[inline]
    pub fn is_internal(&self) -> bool {
        self.0.starts_with('.')
    }
}

impl Deref for ProKey {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ProKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProKey {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for ProKey {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl From<&ProString> for ProKey {
    fn from(s: &ProString) -> Self {
        Self(Arc::clone(&s.0))
    }
}

impl fmt::Display for ProKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ProKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl Serialize for ProKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Ordered list of values bound to one variable
#[derive(Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct ProStringList(Vec<ProString>);

impl ProStringList {
    /// Create an empty list
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Create a list holding a single value
    pub fn single(value: impl Into<ProString>) -> Self {
        Self(vec![value.into()])
    }

    /// Join all values with `sep`
    pub fn join(&self, sep: &str) -> String {
        let mut out = String::new();
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                out.push_str(sep);
            }
            out.push_str(v);
        }
        out
    }

    /// Whether any value equals `value`
    pub fn contains_str(&self, value: &str) -> bool {
        self.0.iter().any(|v| v.as_str() == value)
    }

    /// Append `value` unless it is already present
    pub fn push_unique(&mut self, value: ProString) {
        if !self.contains_str(&value) {
            self.0.push(value);
        }
    }

    /// Remove every occurrence of `value`, returning how many were removed
    pub fn remove_all(&mut self, value: &str) -> usize {
        let before = self.0.len();
        self.0.retain(|v| v.as_str() != value);
        before - self.0.len()
    }

    /// Drop duplicates, keeping the first occurrence of each value
    pub fn dedup_keep_first(&mut self) {
        let mut seen = rustc_hash::FxHashSet::default();
        self.0.retain(|v| seen.insert(v.clone()));
    }

    /// Consume the list, returning the underlying vector
    pub fn into_vec(self) -> Vec<ProString> {
        self.0
    }
}

impl Deref for ProStringList {
    type Target = Vec<ProString>;

    fn deref(&self) -> &Vec<ProString> {
        &self.0
    }
}

impl DerefMut for ProStringList {
    fn deref_mut(&mut self) -> &mut Vec<ProString> {
        &mut self.0
    }
}

impl From<Vec<ProString>> for ProStringList {
    fn from(v: Vec<ProString>) -> Self {
        Self(v)
    }
}

impl<'a> From<Vec<&'a str>> for ProStringList {
    fn from(v: Vec<&'a str>) -> Self {
        Self(v.into_iter().map(ProString::from).collect())
    }
}

impl FromIterator<ProString> for ProStringList {
    fn from_iter<I: IntoIterator<Item = ProString>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<ProString> for ProStringList {
    fn extend<I: IntoIterator<Item = ProString>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

impl IntoIterator for ProStringList {
    type Item = ProString;
    type IntoIter = std::vec::IntoIter<ProString>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ProStringList {
    type Item = &'a ProString;
    type IntoIter = std::slice::Iter<'a, ProString>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Debug for ProStringList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_helpers() {
        let mut list = ProStringList::from(vec!["a", "b", "a", "c"]);
        assert_eq!(list.join(" "), "a b a c");
        assert!(list.contains_str("c"));
        assert_eq!(list.remove_all("a"), 2);
        assert_eq!(list.join(","), "b,c");

        list.push_unique("b".into());
        list.push_unique("d".into());
        assert_eq!(list.join(","), "b,c,d");
    }

    #[test]
    fn test_dedup_keeps_first() {
        let mut list = ProStringList::from(vec!["x", "y", "x", "z", "y"]);
        list.dedup_keep_first();
        assert_eq!(list.join(" "), "x y z");
    }

    #[test]
    fn test_key_lookup_by_str() {
        let mut map = indexmap::IndexMap::new();
        map.insert(ProKey::from("SOURCES"), 1);
        assert_eq!(map.get("SOURCES"), Some(&1));
        assert!(ProKey::from(".hidden").is_internal());
        assert!(!ProKey::from("visible").is_internal());
    }
}
