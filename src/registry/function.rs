//! User-defined function tables

use crate::ast::{Block, FunctionKind};
use crate::model::ProKey;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use thiserror::Error;

use super::builtins::{ExpandFunc, TestFunc};
use super::signature::Arity;

/// Result type for function operations
pub type FunctionResult<T> = Result<T, FunctionError>;

/// Problems detected before a function body runs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FunctionError {
    /// Invalid number of arguments
    #[error("{name}(...) requires {expected} argument(s), got {actual}.")]
    InvalidArity {
        /// Function name
        name: String,
        /// Accepted number of arguments
        expected: Arity,
        /// Actual arguments provided
        actual: usize,
    },

    /// Name resolves to nothing
    #[error("'{name}' is not a recognized {kind} function.")]
    Unknown {
        /// Function name
        name: String,
        /// Which table was searched
        kind: FunctionKind,
    },
}

/// A `defineTest` / `defineReplace` body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDef {
    /// Function name
    pub name: ProKey,
    /// Which table it lives in
    pub kind: FunctionKind,
    /// Statements run on each call
    pub body: Arc<Block>,
    /// File the definition appeared in
    pub file: Arc<str>,
    /// Directory of that file
    pub dir: String,
    /// Line of the definition
    pub line: u32,
}

/// User-defined test and replace functions
///
/// The two kinds are independent namespaces; defining a replace function
/// never affects the test function of the same name.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    test_functions: FxHashMap<ProKey, FunctionDef>,
    replace_functions: FxHashMap<ProKey, FunctionDef>,
}

impl FunctionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, kind: FunctionKind) -> &FxHashMap<ProKey, FunctionDef> {
        match kind {
            FunctionKind::Test => &self.test_functions,
            FunctionKind::Replace => &self.replace_functions,
        }
    }

    /// Register a definition, replacing an earlier one of the same kind and name
    pub fn define(&mut self, def: FunctionDef) {
        log::trace!("defining {} function '{}'", def.kind, def.name);
        let table = match def.kind {
            FunctionKind::Test => &mut self.test_functions,
            FunctionKind::Replace => &mut self.replace_functions,
        };
        table.insert(def.name.clone(), def);
    }

    pub fn test_function(&self, name: &str) -> Option<&FunctionDef> {
        self.test_functions.get(name)
    }

    pub fn replace_function(&self, name: &str) -> Option<&FunctionDef> {
        self.replace_functions.get(name)
    }

    /// Whether a user function of `kind` named `name` exists
    pub fn is_user_defined(&self, kind: FunctionKind, name: &str) -> bool {
        self.table(kind).contains_key(name)
    }

    /// Whether `name` resolves to anything, built-in or user-defined
    pub fn is_defined(&self, kind: FunctionKind, name: &str) -> bool {
        let builtin = match kind {
            FunctionKind::Test => TestFunc::lookup(name).is_some(),
            FunctionKind::Replace => ExpandFunc::lookup(name).is_some(),
        };
        builtin || self.is_user_defined(kind, name)
    }

    /// Sorted names of user functions of `kind`
    pub fn names(&self, kind: FunctionKind) -> Vec<ProKey> {
        let mut names: Vec<ProKey> = self.table(kind).keys().cloned().collect();
        names.sort();
        names
    }

    /// Total number of user functions
    pub fn len(&self) -> usize {
        self.test_functions.len() + self.replace_functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.test_functions.clear();
        self.replace_functions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(name: &str, kind: FunctionKind) -> FunctionDef {
        FunctionDef {
            name: ProKey::from(name),
            kind,
            body: Arc::new(Block::new()),
            file: Arc::from("f.pri"),
            dir: "/".to_string(),
            line: 1,
        }
    }

    #[test]
    fn test_kinds_do_not_collide() {
        let mut registry = FunctionRegistry::new();
        registry.define(def("helper", FunctionKind::Replace));
        assert!(registry.replace_function("helper").is_some());
        assert!(registry.test_function("helper").is_none());
        assert!(!registry.is_defined(FunctionKind::Test, "helper"));
        assert!(registry.is_defined(FunctionKind::Replace, "helper"));
    }

    #[test]
    fn test_builtins_count_as_defined() {
        let registry = FunctionRegistry::new();
        assert!(registry.is_defined(FunctionKind::Test, "exists"));
        assert!(!registry.is_user_defined(FunctionKind::Test, "exists"));
        assert!(registry.is_defined(FunctionKind::Replace, "join"));
    }

    #[test]
    fn test_redefinition_replaces() {
        let mut registry = FunctionRegistry::new();
        registry.define(def("f", FunctionKind::Test));
        let mut second = def("f", FunctionKind::Test);
        second.line = 9;
        registry.define(second);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.test_function("f").map(|d| d.line), Some(9));
        assert_eq!(registry.names(FunctionKind::Test), vec![ProKey::from("f")]);
    }

    #[test]
    fn test_error_messages() {
        let err = FunctionError::Unknown {
            name: "totallyUnknownFunc".into(),
            kind: FunctionKind::Test,
        };
        assert_eq!(err.to_string(), "'totallyUnknownFunc' is not a recognized test function.");
        let err = FunctionError::InvalidArity {
            name: "exists".into(),
            expected: Arity::exactly(1),
            actual: 2,
        };
        assert_eq!(err.to_string(), "exists(...) requires 1 argument(s), got 2.");
    }
}
