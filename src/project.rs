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

//! Project driver
//!
//! [`Project`] is the surface the rest of a build tool talks to: read a
//! project file, then query the resulting variables, run conditions against
//! them or expand expressions in their context.

use crate::cache::EvaluatorCaches;
use crate::config::{EvaluatorConfig, LoadFlags};
use crate::diagnostics::{DiagnosticSink, LogSink};
use crate::error::EvalResult;
use crate::evaluator::Evaluator;
use crate::model::{format_value, parse_c_int, ProKey, ProString, ProStringList, ValueMap};
use crate::parser::{parse_condition, parse_value_expression};
use crate::paths::{absolute_path, dir_part};
use serde_json::{Map, Value};
use std::io::{self, Write};
use std::sync::Arc;

/// A project file and the variables it produced
pub struct Project {
    evaluator: Evaluator,
    project_file: String,
    project_dir: String,
}

impl Project {
    /// Create an unread project that reports to the `log` facade
    pub fn new(config: EvaluatorConfig) -> Self {
        Self::with_sink(config, Arc::new(LogSink))
    }

    /// Create an unread project reporting to `sink`
    pub fn with_sink(config: EvaluatorConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        let caches = EvaluatorCaches::shared(config.cache.clone());
        Self {
            evaluator: Evaluator::new(Arc::new(config), caches, sink),
            project_file: String::new(),
            project_dir: String::new(),
        }
    }

    /// Create an unread project sharing configuration, caches and sink with
    /// `other` and starting from its variables and user functions
    pub fn init_from(other: &Project) -> Self {
        Self {
            evaluator: Evaluator::fork(&other.evaluator),
            project_file: String::new(),
            project_dir: String::new(),
        }
    }

    /// Evaluate `project`; `-` reads the project from standard input
    ///
    /// Returns `Ok(false)` when the file could not be read and an error when
    /// evaluation failed fatally.
    pub fn read(&mut self, project: &str, flags: LoadFlags) -> EvalResult<bool> {
        self.evaluator.reset_current();
        self.project_file = project.to_string();
        let path = if project == "-" {
            self.project_dir = self.evaluator.config().pwd.clone();
            project.to_string()
        } else {
            let absolute = absolute_path(project, &self.evaluator.config().pwd);
            self.project_dir = dir_part(&absolute);
            absolute
        };
        log::debug!("reading project {path}");
        let result = self.evaluator.evaluate_project(&path, flags)?;
        self.evaluator.bool_ret(result)
    }

    /// Evaluate `source` as the project `-`, as if it came from standard
    /// input
    pub fn read_source(&mut self, source: impl Into<String>, flags: LoadFlags) -> EvalResult<bool> {
        self.evaluator.set_stdin_source(source.into());
        self.read("-", flags)
    }

    /// The project name exactly as passed to [`Project::read`]
    pub fn project_file(&self) -> &str {
        &self.project_file
    }

    /// Directory containing the project file; the working directory for
    /// a project read from standard input
    pub fn project_dir(&self) -> &str {
        &self.project_dir
    }


    /// Top-level variables
    pub fn variables(&self) -> &ValueMap {
        self.evaluator.stack().first()
    }

    pub fn variables_mut(&mut self) -> &mut ValueMap {
        self.evaluator.stack_mut().first_mut()
    }

    /// Mutable values of `key`, created empty when absent
    pub fn values(&mut self, key: &str) -> &mut ProStringList {
        self.variables_mut().entry(ProKey::from(key)).or_default()
    }

    /// Values of `key`, empty when absent
    pub fn values_of(&self, key: &str) -> &[ProString] {
        self.variables()
            .get(key)
            .map(|values| values.as_slice())
            .unwrap_or_default()
    }

    /// First value of `key`, or an empty string
    pub fn first(&self, key: &str) -> ProString {
        self.values_of(key).first().cloned().unwrap_or_default()
    }

    /// Whether `key` is bound, even to an empty list
    pub fn is_set(&self, key: &str) -> bool {
        self.variables().contains_key(key)
    }

    /// Whether `key` is unbound or bound to an empty list
    pub fn is_empty(&self, key: &str) -> bool {
        self.values_of(key).is_empty()
    }

    /// First value of `key` parsed as a C integer literal, or `default`
    pub fn int_value(&self, key: &str, default: i64) -> i64 {
        self.values_of(key)
            .first()
            .and_then(|value| parse_c_int(value))
            .unwrap_or(default)
    }

    /// Value of the property `name` (`$$[name]`)
    pub fn property_value(&self, name: &str) -> Option<String> {
        self.evaluator.property_value(name)
    }

    /// Call the test function `name`
    pub fn test(&mut self, name: &str, args: &[ProStringList]) -> EvalResult<bool> {
        self.evaluator.reset_current();
        let result = self.evaluator.call_test(name, args)?;
        self.evaluator.bool_ret(result)
    }

    /// Evaluate the condition `condition` as if it appeared at `file:line`
    ///
    /// A condition that does not parse is reported and counts as false.
    pub fn test_condition(&mut self, condition: &str, file: &str, line: u32) -> EvalResult<bool> {
        self.evaluator.reset_current();
        let parsed = match parse_condition(condition, file, line) {
            Ok(parsed) => parsed,
            Err(err) => {
                self.evaluator.sink().report(err.to_diagnostic());
                return Ok(false);
            }
        };
        let dir = self.project_dir.clone();
        let result = self
            .evaluator
            .in_file(file, &dir, |evaluator| evaluator.evaluate_condition(&parsed))?;
        self.evaluator.bool_ret(result)
    }

    /// Call the replace function `name`
    pub fn expand_function(&mut self, name: &str, args: &[ProStringList]) -> EvalResult<ProStringList> {
        self.evaluator.reset_current();
        self.evaluator.call_replace(name, args)
    }

    /// Expand the value expression `expr` as if it appeared at `file:line`
    ///
    /// Returns the first resulting value. Anything that goes wrong, parse
    /// errors included, yields an empty value.
    pub fn expand(&mut self, expr: &str, file: &str, line: u32) -> ProString {
        self.evaluator.reset_current();
        let Ok(parsed) = parse_value_expression(expr, file, line) else {
            return ProString::default();
        };
        let dir = self.project_dir.clone();
        let expanded = self
            .evaluator
            .in_file(file, &dir, |evaluator| evaluator.expand_expr(&parsed));
        match expanded {
            Ok(values) => values.first().cloned().unwrap_or_default(),
            Err(err) => {
                log::debug!("expansion of '{expr}' failed: {err}");
                ProString::default()
            }
        }
    }

    /// One `key = values` line per top-level variable, internal variables
    /// excluded, sorted by the formatted line
    pub fn dump_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .variables()
            .iter()
            .filter(|(key, _)| !key.is_internal())
            .map(|(key, values)| {
                let mut line = format!("{key} =");
                for value in values {
                    line.push(' ');
                    line.push_str(&format_value(value));
                }
                line
            })
            .collect();
        lines.sort();
        lines
    }

    /// Write [`Project::dump_lines`] to standard output
    pub fn dump(&self) -> io::Result<()> {
        let stdout = io::stdout();
        self.dump_to(&mut stdout.lock())
    }

    pub fn dump_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for line in self.dump_lines() {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }

    /// Top-level variables as a JSON object, internal variables excluded
    pub fn dump_json(&self) -> Value {
        let mut map = Map::new();
        for (key, values) in self.variables() {
            if key.is_internal() {
                continue;
            }
            let values = values.iter().map(|v| Value::String(v.to_string())).collect();
            map.insert(key.to_string(), Value::Array(values));
        }
        Value::Object(map)
    }

    /// The underlying evaluator
    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;
    use pretty_assertions::assert_eq;

    fn project() -> Project {
        Project::with_sink(EvaluatorConfig::with_pwd("/work"), Arc::new(CollectingSink::new()))
    }

    #[test]
    fn test_int_value() {
        let mut p = project();
        assert_eq!(p.int_value("FOO", 7), 7);
        *p.values("FOO") = ProStringList::single("abc");
        assert_eq!(p.int_value("FOO", 7), 7);
        *p.values("FOO") = ProStringList::single("42");
        assert_eq!(p.int_value("FOO", 7), 42);
        *p.values("FOO") = ProStringList::single("0xFF");
        assert_eq!(p.int_value("FOO", 7), 255);
    }

    #[test]
    fn test_dump_is_sorted_and_hides_internal_keys() {
        let mut p = project();
        *p.values("B") = ProStringList::single("1");
        *p.values("A") = ProStringList::from(vec!["2", "3"]);
        *p.values(".internal") = ProStringList::single("x");
        assert_eq!(p.dump_lines(), vec!["A = 2 3".to_string(), "B = 1".to_string()]);

        let mut out = Vec::new();
        p.dump_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "A = 2 3\nB = 1\n");
    }

    #[test]
    fn test_is_set_versus_is_empty() {
        let mut p = project();
        p.values("EMPTY");
        assert!(p.is_set("EMPTY"));
        assert!(p.is_empty("EMPTY"));
        assert!(!p.is_set("MISSING"));
        assert!(p.is_empty("MISSING"));
    }

    #[test]
    fn test_expand_returns_first_value() {
        let mut p = project();
        *p.values("X") = ProStringList::from(vec!["a", "b"]);
        assert_eq!(p.expand("$$X", "t.pro", 1), "a");
        assert_eq!(p.expand("pre-$$X", "t.pro", 1), "pre-a b");
        assert_eq!(p.expand("\"unterminated", "t.pro", 1), "");
    }

    #[test]
    fn test_dump_json() {
        let mut p = project();
        *p.values("A") = ProStringList::from(vec!["1", "2"]);
        assert_eq!(p.dump_json(), serde_json::json!({ "A": ["1", "2"] }));
    }
}
