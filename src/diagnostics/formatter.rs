//! Rendering diagnostics as `file:line: severity: message [code]` lines

use super::diagnostic::{Diagnostic, Severity};

/// Output format for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `file:line: severity: message [code]`
    Text,
    /// One JSON object per diagnostic
    Json,
    /// `file:line:severity:code: message`, with `-` for an unknown location
    Compact,
}

/// Turns diagnostics into single lines for a sink
pub struct DiagnosticFormatter {
    format: Format,
    color: bool,
}

impl DiagnosticFormatter {
    pub fn new(format: Format) -> Self {
        Self { format, color: false }
    }

    /// Colour the severity in text output (terminal feature only)
    #[cfg(feature = "terminal")]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn format(&self, diagnostic: &Diagnostic) -> String {
        match self.format {
            Format::Text => {
                let prefix = diagnostic
                    .location
                    .as_ref()
                    .map(|location| format!("{location}: "))
                    .unwrap_or_default();
                format!(
                    "{prefix}{}: {} [{}]",
                    self.severity(diagnostic.severity),
                    diagnostic.message,
                    diagnostic.code_string()
                )
            }
            Format::Json => {
                serde_json::to_string(diagnostic).unwrap_or_else(|_| diagnostic.to_string())
            }
            Format::Compact => {
                let location = diagnostic
                    .location
                    .as_ref()
                    .map_or_else(|| "-".to_string(), ToString::to_string);
                format!(
                    "{location}:{}:{}: {}",
                    diagnostic.severity,
                    diagnostic.code_string(),
                    diagnostic.message
                )
            }
        }
    }

    #[cfg(feature = "terminal")]
    fn severity(&self, severity: Severity) -> String {
        use colored::Colorize;
        if !self.color {
            return severity.to_string();
        }
        let word = severity.to_string();
        match severity {
            Severity::Error => word.red().bold().to_string(),
            Severity::Warning => word.yellow().bold().to_string(),
            Severity::Info => word.blue().to_string(),
        }
    }

    #[cfg(not(feature = "terminal"))]
    fn severity(&self, severity: Severity) -> String {
        let _ = self.color;
        severity.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{DiagnosticCode, SourceLocation};

    fn unknown_function() -> Diagnostic {
        Diagnostic::error(DiagnosticCode::UnknownTestFunction, "'foo' is not a recognized test function.")
            .with_location(Some(SourceLocation::new("app.pro", 3)))
    }

    #[test]
    fn test_text_format() {
        let text = DiagnosticFormatter::new(Format::Text).format(&unknown_function());
        assert_eq!(
            text,
            "app.pro:3: error: 'foo' is not a recognized test function. [E002]"
        );
    }

    #[test]
    fn test_text_without_location() {
        let diagnostic = Diagnostic::warning(DiagnosticCode::Evaluation, "odd");
        let text = DiagnosticFormatter::new(Format::Text).format(&diagnostic);
        assert_eq!(text, "warning: odd [E009]");
    }

    #[test]
    fn test_compact_format() {
        let text = DiagnosticFormatter::new(Format::Compact).format(&unknown_function());
        assert_eq!(text, "app.pro:3:error:E002: 'foo' is not a recognized test function.");
    }

    #[test]
    fn test_json_format() {
        let text = DiagnosticFormatter::new(Format::Json).format(&unknown_function());
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["severity"], "error");
        assert_eq!(value["code"], "unknown_test_function");
        assert_eq!(value["location"]["line"], 3);
    }
}
