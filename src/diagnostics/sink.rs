//! Where diagnostics and project messages end up

use super::diagnostic::{Diagnostic, Severity};
use super::formatter::DiagnosticFormatter;
use parking_lot::Mutex;
use std::io::Write;

/// Kind of output requested by the project itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// `message()`
    Message,
    /// `warning()`
    Warning,
    /// `error()`
    Error,
    /// `log()`, printed verbatim
    Log,
}

impl MessageKind {
    /// Prefix used when printing the message
    pub fn prefix(&self) -> &'static str {
        match self {
            MessageKind::Message => "Project MESSAGE: ",
            MessageKind::Warning => "Project WARNING: ",
            MessageKind::Error => "Project ERROR: ",
            MessageKind::Log => "",
        }
    }
}

/// Receiver for evaluation diagnostics and project output
pub trait DiagnosticSink: Send + Sync {
    /// A diagnostic raised by the parser or evaluator
    fn report(&self, diagnostic: Diagnostic);

    /// Text produced by `message()`, `warning()`, `error()` or `log()`
    fn user_message(&self, kind: MessageKind, text: &str);
}

/// Forwards everything to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => log::error!("{diagnostic}"),
            Severity::Warning => log::warn!("{diagnostic}"),
            Severity::Info => log::info!("{diagnostic}"),
        }
    }

    fn user_message(&self, kind: MessageKind, text: &str) {
        match kind {
            MessageKind::Error => log::error!("{}{}", kind.prefix(), text),
            MessageKind::Warning => log::warn!("{}{}", kind.prefix(), text),
            MessageKind::Message | MessageKind::Log => log::info!("{}{}", kind.prefix(), text),
        }
    }
}

/// Keeps everything in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
    messages: Mutex<Vec<(MessageKind, String)>>,
}

impl CollectingSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Diagnostics received so far
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().clone()
    }

    /// Project messages received so far
    pub fn messages(&self) -> Vec<(MessageKind, String)> {
        self.messages.lock().clone()
    }

    /// Whether any error-severity diagnostic was received
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .lock()
            .iter()
            .any(|d| d.severity == Severity::Error)
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.diagnostics.lock().push(diagnostic);
    }

    fn user_message(&self, kind: MessageKind, text: &str) {
        self.messages.lock().push((kind, text.to_string()));
    }
}

/// Prints formatted diagnostics and project messages to stderr
pub struct StderrSink {
    formatter: DiagnosticFormatter,
}

impl StderrSink {
    /// Create a sink printing with `formatter`
    pub fn new(formatter: DiagnosticFormatter) -> Self {
        Self { formatter }
    }
}

impl DiagnosticSink for StderrSink {
    fn report(&self, diagnostic: Diagnostic) {
        let mut err = std::io::stderr().lock();
        let _ = writeln!(err, "{}", self.formatter.format(&diagnostic));
    }

    fn user_message(&self, kind: MessageKind, text: &str) {
        let mut err = std::io::stderr().lock();
        match kind {
            MessageKind::Log => {
                let _ = write!(err, "{text}");
            }
            _ => {
                let _ = writeln!(err, "{}{}", kind.prefix(), text);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticCode;

    #[test]
    fn test_collecting_sink() {
        let sink = CollectingSink::new();
        sink.user_message(MessageKind::Message, "hello");
        assert!(!sink.has_errors());

        sink.report(Diagnostic::warning(DiagnosticCode::Evaluation, "careful"));
        assert!(!sink.has_errors());

        sink.report(Diagnostic::error(DiagnosticCode::Evaluation, "broken"));
        assert!(sink.has_errors());
        assert_eq!(sink.diagnostics().len(), 2);
        assert_eq!(sink.messages(), vec![(MessageKind::Message, "hello".to_string())]);
    }
}
