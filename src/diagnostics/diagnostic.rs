//! Core diagnostic types

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Evaluation could not do what the project asked
    Error,
    /// Suspicious but harmless
    Warning,
    /// Informational
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Machine-readable diagnostic category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    /// The project file (or an evaluated snippet) does not parse
    ParseError,
    /// A test function name resolved to nothing
    UnknownTestFunction,
    /// A replace function name resolved to nothing
    UnknownReplaceFunction,
    /// Wrong number of arguments to a built-in
    InvalidArity,
    /// A file could not be read or written
    FileAccess,
    /// `return()`, `break()` or `next()` outside of their context
    MisplacedControl,
    /// Function calls nested deeper than the configured limit
    RecursionLimit,
    /// Invalid regular expression or pattern
    InvalidPattern,
    /// Any other evaluation failure
    Evaluation,
}

impl DiagnosticCode {
    /// Short code string shown next to messages
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::ParseError => "E001",
            DiagnosticCode::UnknownTestFunction => "E002",
            DiagnosticCode::UnknownReplaceFunction => "E003",
            DiagnosticCode::InvalidArity => "E004",
            DiagnosticCode::FileAccess => "E005",
            DiagnosticCode::MisplacedControl => "E006",
            DiagnosticCode::RecursionLimit => "E007",
            DiagnosticCode::InvalidPattern => "E008",
            DiagnosticCode::Evaluation => "E009",
        }
    }
}

/// File and line a diagnostic refers to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    /// File name as it was given to the evaluator
    #[serde(serialize_with = "serialize_file")]
    pub file: Arc<str>,
    /// Line number (1-based, 0 when unknown)
    pub line: u32,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(file: impl Into<Arc<str>>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

fn serialize_file<S: serde::Serializer>(file: &Arc<str>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(file)
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(f, "{}:{}", self.file, self.line)
        } else {
            write!(f, "{}", self.file)
        }
    }
}

/// A diagnostic produced while parsing or evaluating a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Severity
    pub severity: Severity,
    /// Category
    pub code: DiagnosticCode,
    /// Human-readable message
    pub message: String,
    /// Where it happened, if known
    pub location: Option<SourceLocation>,
}

impl Diagnostic {
    /// Create an error diagnostic
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            location: None,
        }
    }

    /// Create a warning diagnostic
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            location: None,
        }
    }

    /// Attach a location
    pub fn with_location(mut self, location: Option<SourceLocation>) -> Self {
        self.location = location;
        self
    }

    /// The code as shown to users
    pub fn code_string(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "{loc}: {}: {}", self.severity, self.message),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}
