//! Argument-count signatures for built-in functions

use std::fmt;

/// How many (flattened) arguments a built-in accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Arity {
    /// Minimum number of arguments
    pub min: usize,
    /// Maximum number of arguments (None for variadic)
    pub max: Option<usize>,
}

impl Arity {
    /// Exactly `n` arguments
    pub const fn exactly(n: usize) -> Self {
        Self { min: n, max: Some(n) }
    }

    /// Between `min` and `max` arguments
    pub const fn range(min: usize, max: usize) -> Self {
        Self { min, max: Some(max) }
    }

    /// At least `min` arguments
    pub const fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    /// Whether `actual` arguments are acceptable
    pub fn accepts(&self, actual: usize) -> bool {
        actual >= self.min && self.max.is_none_or(|max| actual <= max)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{}", self.min),
            Some(max) => write!(f, "{}-{}", self.min, max),
            None => write!(f, "at least {}", self.min),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts() {
        assert!(Arity::exactly(2).accepts(2));
        assert!(!Arity::exactly(2).accepts(1));
        assert!(Arity::range(1, 3).accepts(3));
        assert!(!Arity::range(1, 3).accepts(4));
        assert!(Arity::at_least(0).accepts(10));
    }

    #[test]
    fn test_display() {
        assert_eq!(Arity::exactly(1).to_string(), "1");
        assert_eq!(Arity::range(1, 2).to_string(), "1-2");
        assert_eq!(Arity::at_least(1).to_string(), "at least 1");
    }
}
