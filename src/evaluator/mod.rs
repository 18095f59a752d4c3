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

//! Project-file evaluator
//!
//! The [`Evaluator`] walks parsed project files statement by statement. It owns
//! the variable scopes and the user function tables, and borrows the shared
//! caches and the diagnostic sink from its driver.
//!
//! Every visit yields a [`VisitReturn`]. `True`/`False` are ordinary outcomes
//! of a condition; `Return`, `Break` and `Next` unwind to the enclosing
//! function or loop; `Error` unwinds all the way to the driver, which turns it
//! into [`EvalError::Fatal`](crate::error::EvalError::Fatal).

mod call;
mod expand;
mod files;
mod replace_builtins;
mod test_builtins;
mod visit;

pub use files::EvalFileType;

use crate::cache::SharedCaches;
use crate::config::EvaluatorConfig;
use crate::diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink, SourceLocation};
use crate::error::{EvalError, EvalResult};
use crate::model::{ProKey, ProString, ProStringList, ValueMapStack};
use crate::paths::{DIRLIST_SEPARATOR, DIR_SEPARATOR};
use crate::registry::FunctionRegistry;
use std::sync::Arc;

/// Outcome of visiting a statement, condition or file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitReturn {
    True,
    False,
    /// Unrecoverable; evaluation stops
    Error,
    /// `return()` inside a function body
    Return,
    /// `break()` inside a loop
    Break,
    /// `next()` inside a loop
    Next,
}

impl VisitReturn {
    #[inline]
    pub fn from_bool(value: bool) -> Self {
        if value { VisitReturn::True } else { VisitReturn::False }
    }

    #[inline]
    pub fn is_true(self) -> bool {
        self == VisitReturn::True
    }
}

/// File currently being evaluated, or the file a running function came from
#[derive(Debug, Clone)]
struct FileFrame {
    path: Arc<str>,
    dir: String,
}

/// Stateful walker over parsed project files
pub struct Evaluator {
    config: Arc<EvaluatorConfig>,
    caches: SharedCaches,
    sink: Arc<dyn DiagnosticSink>,
    stack: ValueMapStack,
    functions: FunctionRegistry,
    /// Location attached to diagnostics
    current: Option<SourceLocation>,
    files: Vec<FileFrame>,
    return_value: ProStringList,
    call_depth: usize,
    loop_depth: usize,
    tmp_counter: usize,
    /// Message and location of the failure behind a pending `Error`
    last_error: Option<(String, Option<SourceLocation>)>,
    /// Source served for `-` instead of standard input, consumed once
    stdin_source: Option<String>,
}

impl Evaluator {
    /// Create an evaluator with empty scopes
    pub fn new(config: Arc<EvaluatorConfig>, caches: SharedCaches, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            config,
            caches,
            sink,
            stack: ValueMapStack::new(),
            functions: FunctionRegistry::new(),
            current: None,
            files: Vec::new(),
            return_value: ProStringList::new(),
            call_depth: 0,
            loop_depth: 0,
            tmp_counter: 0,
            last_error: None,
            stdin_source: None,
        }
    }

    /// Create an evaluator sharing configuration, caches and sink with
    /// `other`, starting from a copy of its root scope and user functions
    pub fn fork(other: &Evaluator) -> Self {
        let mut evaluator = Self::new(other.config.clone(), other.caches.clone(), other.sink.clone());
        evaluator.stack.reset_to(other.stack.first().clone());
        evaluator.functions = other.functions.clone();
        evaluator
    }

    /// Serve `source` the next time the project `-` is loaded
    pub(crate) fn set_stdin_source(&mut self, source: String) {
        self.stdin_source = Some(source);
    }

    pub fn config(&self) -> &Arc<EvaluatorConfig> {
        &self.config
    }

    pub fn caches(&self) -> &SharedCaches {
        &self.caches
    }

    pub fn sink(&self) -> &Arc<dyn DiagnosticSink> {
        &self.sink
    }

    pub fn stack(&self) -> &ValueMapStack {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut ValueMapStack {
        &mut self.stack
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Forget the diagnostic location and any pending error message
    pub fn reset_current(&mut self) {
        self.current = None;
        self.last_error = None;
    }

    /// Collapse a visit result for a caller that only understands booleans
    ///
    /// `Error` is never downgraded to `false`.
    pub fn bool_ret(&mut self, result: VisitReturn) -> EvalResult<bool> {
        match result {
            VisitReturn::True => Ok(true),
            VisitReturn::Error => Err(self.take_fatal(|| "evaluation failed".to_string())),
            _ => Ok(false),
        }
    }

    /// Values of `name` as seen from the current scope, built-ins included
    pub fn values(&self, name: &str) -> ProStringList {
        if let Some(special) = self.special_value(name) {
            return special;
        }
        self.stack.lookup(name).cloned().unwrap_or_default()
    }

    /// First value of `name`, or an empty string
    pub(crate) fn first_value(&self, name: &str) -> ProString {
        self.values(name).first().cloned().unwrap_or_default()
    }

    /// Value of `$$[name]`
    pub fn property_value(&self, name: &str) -> Option<String> {
        if let Some(value) = self.config.properties.get(name) {
            return Some(value.clone());
        }
        // `$$[NAME/get]` and friends fall back to the plain property
        let (base, _) = name.rsplit_once('/')?;
        self.config.properties.get(base).cloned()
    }

    fn special_value(&self, name: &str) -> Option<ProStringList> {
        let value = match name {
            "PWD" | "IN_PWD" => self.current_dir().to_string(),
            "_FILE_" => self.current_file().to_string(),
            "_LINE_" => self.current.as_ref().map_or(0, |l| l.line).to_string(),
            "_DATE_" => chrono::Local::now().format("%a %b %e %H:%M:%S %Y").to_string(),
            "LITERAL_HASH" => "#".to_string(),
            "LITERAL_DOLLAR" => "$".to_string(),
            "LITERAL_WHITESPACE" => "\t".to_string(),
            "DIR_SEPARATOR" => DIR_SEPARATOR.to_string(),
            "DIRLIST_SEPARATOR" => DIRLIST_SEPARATOR.to_string(),
            _ => return None,
        };
        Some(ProStringList::single(value))
    }

    /// Directory relative paths are resolved against
    pub(crate) fn current_dir(&self) -> &str {
        self.files.last().map_or(self.config.pwd.as_str(), |f| f.dir.as_str())
    }

    pub(crate) fn current_file(&self) -> &str {
        self.files.last().map_or("", |f| &f.path)
    }

    pub(crate) fn set_line(&mut self, line: u32) {
        if let Some(frame) = self.files.last() {
            self.current = Some(SourceLocation::new(frame.path.clone(), line));
        }
    }

    pub(crate) fn current_line(&self) -> u32 {
        self.current.as_ref().map_or(1, |l| l.line)
    }

    /// Report a non-fatal problem at the current location
    pub(crate) fn report(&self, code: DiagnosticCode, message: impl Into<String>) {
        self.sink
            .report(Diagnostic::error(code, message).with_location(self.current.clone()));
    }

    pub(crate) fn warn(&self, code: DiagnosticCode, message: impl Into<String>) {
        self.sink
            .report(Diagnostic::warning(code, message).with_location(self.current.clone()));
    }

    /// Report a problem that ends the evaluation
    pub(crate) fn fail(&mut self, code: DiagnosticCode, message: impl Into<String>) -> VisitReturn {
        let message = message.into();
        self.report(code, message.clone());
        self.record_error(message, self.current.clone());
        VisitReturn::Error
    }

    /// Remember why evaluation is about to unwind with `Error`
    pub(crate) fn record_error(&mut self, message: String, location: Option<SourceLocation>) {
        self.last_error = Some((message, location));
    }

    /// Turn the pending failure into a fatal error
    pub(crate) fn take_fatal(&mut self, fallback: impl FnOnce() -> String) -> EvalError {
        match self.last_error.take() {
            Some((message, location)) => EvalError::fatal(message, location),
            None => EvalError::fatal(fallback(), self.current.clone()),
        }
    }

    fn push_file(&mut self, path: Arc<str>, dir: String) {
        self.files.push(FileFrame { path, dir });
    }

    /// Pop a file frame and restore the location saved before it was pushed
    fn pop_file(&mut self, saved: Option<SourceLocation>) {
        self.files.pop();
        self.current = saved;
    }

    /// Run `f` as if evaluating inside `file`, resolving relative paths
    /// against `dir`
    pub(crate) fn in_file<T>(&mut self, file: &str, dir: &str, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = self.current.clone();
        let dir = if dir.is_empty() {
            self.config.pwd.clone()
        } else {
            dir.to_string()
        };
        self.push_file(Arc::from(file), dir);
        let result = f(self);
        self.pop_file(saved);
        result
    }

    /// Append `value` to `key` in the root scope unless already present
    pub(crate) fn record_root(&mut self, key: &str, value: impl Into<ProString>) {
        self.stack
            .first_mut()
            .entry(ProKey::from(key))
            .or_default()
            .push_unique(value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::EvaluatorCaches;
    use crate::cache::CacheConfig;
    use crate::diagnostics::CollectingSink;

    pub(crate) fn evaluator_with(sink: Arc<CollectingSink>) -> Evaluator {
        let config = Arc::new(EvaluatorConfig::with_pwd("/work"));
        Evaluator::new(config, EvaluatorCaches::shared(CacheConfig::default()), sink)
    }

    #[test]
    fn test_special_variables() {
        let evaluator = evaluator_with(Arc::new(CollectingSink::new()));
        assert_eq!(evaluator.values("LITERAL_HASH"), ProStringList::single("#"));
        assert_eq!(evaluator.values("PWD"), ProStringList::single("/work"));
        assert!(evaluator.values("NOT_SET").is_empty());
    }

    #[test]
    fn test_bool_ret_error_is_fatal() {
        let mut evaluator = evaluator_with(Arc::new(CollectingSink::new()));
        assert_eq!(evaluator.bool_ret(VisitReturn::True), Ok(true));
        assert_eq!(evaluator.bool_ret(VisitReturn::False), Ok(false));
        assert_eq!(evaluator.bool_ret(VisitReturn::Break), Ok(false));

        let result = evaluator.fail(DiagnosticCode::Evaluation, "boom");
        let err = evaluator.bool_ret(result).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_fork_copies_root_scope() {
        let mut parent = evaluator_with(Arc::new(CollectingSink::new()));
        parent.stack_mut().set("A".into(), ProStringList::single("1"));
        let child = Evaluator::fork(&parent);
        assert_eq!(child.values("A"), ProStringList::single("1"));
    }
}
