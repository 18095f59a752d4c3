//! Diagnostic system for project parsing and evaluation errors
//!
//! Diagnostics are handed to a [`DiagnosticSink`], the error-reporting
//! collaborator of the evaluator. The sink also receives the output of the
//! `message()`, `warning()`, `error()` and `log()` functions.

pub mod diagnostic;
pub mod formatter;
pub mod sink;

pub use diagnostic::{Diagnostic, DiagnosticCode, Severity, SourceLocation};
pub use formatter::{DiagnosticFormatter, Format};
pub use sink::{CollectingSink, DiagnosticSink, LogSink, MessageKind, StderrSink};
