//! Parser error types

use crate::diagnostics::{Diagnostic, DiagnosticCode, SourceLocation};
use thiserror::Error;

/// Result type for parser operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Parse error with location information
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A character that cannot start or continue what is being parsed
    #[error("{location}: unexpected character '{found}'")]
    UnexpectedChar {
        /// The offending character
        found: char,
        /// Where it was found
        location: SourceLocation,
    },

    /// A `{` without its `}`
    #[error("{location}: missing closing brace")]
    MissingBrace {
        /// Line of the opening brace
        location: SourceLocation,
    },

    /// A `(` without its `)`
    #[error("{location}: missing closing parenthesis")]
    MissingParen {
        /// Line of the opening parenthesis
        location: SourceLocation,
    },

    /// A `"` without its partner on the same line
    #[error("{location}: missing closing quote")]
    MissingQuote {
        /// Line of the opening quote
        location: SourceLocation,
    },

    /// A `}` with no open block
    #[error("{location}: excess closing brace")]
    ExcessBrace {
        /// Where it was found
        location: SourceLocation,
    },

    /// `else` not following a condition
    #[error("{location}: unexpected 'else'")]
    MisplacedElse {
        /// Where it was found
        location: SourceLocation,
    },

    /// Malformed `defineTest`, `defineReplace` or `for`
    #[error("{location}: {message}")]
    InvalidControl {
        /// What is wrong
        message: String,
        /// Where it was found
        location: SourceLocation,
    },

    /// Input left over after a complete condition or expression
    #[error("{location}: trailing input after {what}")]
    TrailingInput {
        /// What was parsed before the leftovers
        what: &'static str,
        /// Where the leftovers start
        location: SourceLocation,
    },
}

impl ParseError {
    /// Where the error was detected
    pub fn location(&self) -> &SourceLocation {
        match self {
            ParseError::UnexpectedChar { location, .. }
            | ParseError::MissingBrace { location }
            | ParseError::MissingParen { location }
            | ParseError::MissingQuote { location }
            | ParseError::ExcessBrace { location }
            | ParseError::MisplacedElse { location }
            | ParseError::InvalidControl { location, .. }
            | ParseError::TrailingInput { location, .. } => location,
        }
    }

    /// The message without the location prefix
    pub fn message(&self) -> String {
        let full = self.to_string();
        let prefix = format!("{}: ", self.location());
        full.strip_prefix(&prefix).map(str::to_string).unwrap_or(full)
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(DiagnosticCode::ParseError, self.message())
            .with_location(Some(self.location().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_conversion() {
        let err = ParseError::MissingBrace {
            location: SourceLocation::new("app.pro", 4),
        };
        assert_eq!(err.to_string(), "app.pro:4: missing closing brace");
        let diagnostic = err.to_diagnostic();
        assert_eq!(diagnostic.message, "missing closing brace");
        assert_eq!(diagnostic.code, DiagnosticCode::ParseError);
        assert_eq!(diagnostic.location.map(|l| l.line), Some(4));
    }
}
