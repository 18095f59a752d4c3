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

//! Error types for project evaluation

use crate::diagnostics::{Diagnostic, DiagnosticCode, SourceLocation};
use thiserror::Error;

pub use crate::parser::ParseError;

/// Result type for evaluation operations
pub type EvalResult<T> = Result<T, EvalError>;

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Errors that end an evaluation
///
/// Recoverable problems (unknown functions, unreadable includes) never show
/// up here; they are reported to the diagnostic sink and evaluation goes on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// The project is malformed beyond recovery
    #[error("fatal evaluation error: {message}")]
    Fatal {
        /// What went wrong
        message: String,
        /// Where evaluation was when it gave up
        location: Option<SourceLocation>,
    },
}

impl EvalError {
    /// Process exit status used for fatal errors
    pub const EXIT_CODE: i32 = 3;

    /// Create a fatal error
    pub fn fatal(message: impl Into<String>, location: Option<SourceLocation>) -> Self {
        EvalError::Fatal {
            message: message.into(),
            location,
        }
    }

    /// Exit status a command-line host should terminate with
    pub fn exit_code(&self) -> i32 {
        match self {
            EvalError::Fatal { .. } => Self::EXIT_CODE,
        }
    }

    /// Where the error happened, if known
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            EvalError::Fatal { location, .. } => location.as_ref(),
        }
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            EvalError::Fatal { message, location } => {
                Diagnostic::error(DiagnosticCode::Evaluation, message.clone())
                    .with_location(location.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_error() {
        let err = EvalError::fatal("boom", Some(SourceLocation::new("a.pro", 2)));
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.to_string(), "fatal evaluation error: boom");
        assert_eq!(err.location().map(|l| l.line), Some(2));
        assert_eq!(err.to_diagnostic().to_string(), "a.pro:2: error: boom");
    }
}
