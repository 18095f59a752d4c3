//! Built-in test functions

use super::files::EvalFileType;
use super::visit::is_wildcard;
use super::{Evaluator, VisitReturn};
use crate::ast::FunctionKind;
use crate::diagnostics::{DiagnosticCode, MessageKind};
use crate::error::EvalResult;
use crate::model::{parse_c_int, split_value_list, ProKey, ProString, ProStringList};
use crate::parser::parse_condition;
use crate::registry::TestFunc;
use regex::Regex;
use std::cmp::Ordering;
use std::fs::OpenOptions;
use std::io::Write;

/// Compare dotted version strings numerically, component by component
fn compare_versions(lhs: &str, rhs: &str) -> Ordering {
    let parse = |v: &str| -> Vec<i64> {
        v.split('.')
            .map(|part| {
                let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
                digits.parse().unwrap_or(0)
            })
            .collect()
    };
    let (a, b) = (parse(lhs), parse(rhs));
    for i in 0..a.len().max(b.len()) {
        let ordering = a.get(i).unwrap_or(&0).cmp(b.get(i).unwrap_or(&0));
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Anchored regex for `contains()`; invalid patterns match literally
enum Matcher {
    Regex(Regex),
    Literal(String),
}

impl Matcher {
    fn new(pattern: &str) -> Self {
        match Regex::new(&format!("^(?:{pattern})$")) {
            Ok(re) => Matcher::Regex(re),
            Err(_) => Matcher::Literal(pattern.to_string()),
        }
    }

    fn matches(&self, value: &str) -> bool {
        match self {
            Matcher::Regex(re) => re.is_match(value),
            Matcher::Literal(text) => text == value,
        }
    }
}

/// Whether the last entry of `values` that is one of `alternatives` (or
/// matches `wanted`) matches `wanted`
fn last_of_alternatives(values: &ProStringList, alternatives: &str, wanted: impl Fn(&str) -> bool) -> bool {
    let alternatives: Vec<&str> = alternatives.split('|').collect();
    for value in values.iter().rev() {
        if wanted(value.as_str()) {
            return true;
        }
        if alternatives.contains(&value.as_str()) {
            return false;
        }
    }
    false
}

impl Evaluator {
    pub(crate) fn evaluate_builtin_test(&mut self, func: TestFunc, args: &[ProString]) -> EvalResult<VisitReturn> {
        let arg = |i: usize| args.get(i).map_or("", ProString::as_str);

        match func {
            TestFunc::Requires => {
                for requirement in args.iter().filter(|a| !a.is_empty()) {
                    match self.evaluate_condition_text(requirement)? {
                        VisitReturn::True => {}
                        VisitReturn::Error => return Ok(VisitReturn::Error),
                        _ => self
                            .stack
                            .values_mut(&ProKey::from("QMAKE_FAILED_REQUIREMENTS"))
                            .push(requirement.clone()),
                    }
                }
                Ok(VisitReturn::True)
            }
            TestFunc::GreaterThan | TestFunc::LessThan => {
                let lhs = self.first_value(arg(0));
                let rhs = arg(1);
                let ordering = match (parse_c_int(&lhs), parse_c_int(rhs)) {
                    (Some(a), Some(b)) => a.cmp(&b),
                    _ => lhs.as_str().cmp(rhs),
                };
                let wanted = if func == TestFunc::GreaterThan {
                    Ordering::Greater
                } else {
                    Ordering::Less
                };
                Ok(VisitReturn::from_bool(ordering == wanted))
            }
            TestFunc::Equals | TestFunc::IsEqual => {
                Ok(VisitReturn::from_bool(self.values(arg(0)).join(" ") == arg(1)))
            }
            TestFunc::VersionAtLeast | TestFunc::VersionAtMost => {
                let ordering = compare_versions(&self.first_value(arg(0)), arg(1));
                let result = if func == TestFunc::VersionAtLeast {
                    ordering != Ordering::Less
                } else {
                    ordering != Ordering::Greater
                };
                Ok(VisitReturn::from_bool(result))
            }
            TestFunc::Exists => Ok(VisitReturn::from_bool(self.path_exists(arg(0)))),
            TestFunc::Export => {
                let key = ProKey::from(arg(0));
                if !self.stack.export(&key) {
                    self.stack.first_mut().entry(key).or_default();
                }
                Ok(VisitReturn::True)
            }
            TestFunc::Clear => {
                if !self.stack.contains(arg(0)) {
                    return Ok(VisitReturn::False);
                }
                self.stack.set(ProKey::from(arg(0)), ProStringList::new());
                Ok(VisitReturn::True)
            }
            TestFunc::Unset => Ok(VisitReturn::from_bool(self.stack.unset(&ProKey::from(arg(0))))),
            TestFunc::Eval => self.evaluate_snippet(arg(0), EvalFileType::Eval),
            TestFunc::Config => {
                if args.len() == 1 {
                    return Ok(VisitReturn::from_bool(self.is_active_config(arg(0))));
                }
                let wanted = arg(0);
                let config = self.values("CONFIG");
                Ok(VisitReturn::from_bool(last_of_alternatives(&config, arg(1), |v| v == wanted)))
            }
            TestFunc::If => self.evaluate_condition_text(arg(0)),
            TestFunc::Load => self.load_feature(arg(0), arg(1) == "true"),
            TestFunc::Include => self.include_file(arg(0), arg(1), arg(2) == "true"),
            TestFunc::Debug => {
                let level = parse_c_int(arg(0)).unwrap_or(0);
                log::debug!("DEBUG {level}: {}", arg(1));
                Ok(VisitReturn::True)
            }
            TestFunc::Log => {
                self.sink.user_message(MessageKind::Log, arg(0));
                Ok(VisitReturn::True)
            }
            TestFunc::Message => {
                self.sink.user_message(MessageKind::Message, arg(0));
                Ok(VisitReturn::True)
            }
            TestFunc::Warning => {
                self.sink.user_message(MessageKind::Warning, arg(0));
                Ok(VisitReturn::True)
            }
            TestFunc::Error => {
                let message = arg(0).to_string();
                self.sink.user_message(MessageKind::Error, &message);
                self.record_error(message, self.current.clone());
                Ok(VisitReturn::Error)
            }
            TestFunc::Return => {
                if self.call_depth == 0 {
                    return Ok(self.fail(DiagnosticCode::MisplacedControl, "unexpected return()."));
                }
                self.return_value = args.first().map(|v| split_value_list(v)).unwrap_or_default();
                Ok(VisitReturn::Return)
            }
            TestFunc::Break | TestFunc::Next => {
                if self.loop_depth == 0 {
                    let message = format!("unexpected {}().", func.name());
                    return Ok(self.fail(DiagnosticCode::MisplacedControl, message));
                }
                Ok(if func == TestFunc::Break {
                    VisitReturn::Break
                } else {
                    VisitReturn::Next
                })
            }
            TestFunc::Defined => {
                let name = arg(0);
                let defined = match arg(1) {
                    "" => {
                        self.functions.is_defined(FunctionKind::Test, name)
                            || self.functions.is_defined(FunctionKind::Replace, name)
                    }
                    "test" => self.functions.is_defined(FunctionKind::Test, name),
                    "replace" => self.functions.is_defined(FunctionKind::Replace, name),
                    "var" => self.stack.contains(name),
                    other => {
                        self.report(
                            DiagnosticCode::Evaluation,
                            format!("defined(function, type): unexpected type [{other}]."),
                        );
                        false
                    }
                };
                Ok(VisitReturn::from_bool(defined))
            }
            TestFunc::Contains => {
                let values = self.values(arg(0));
                let matcher = Matcher::new(arg(1));
                let found = if args.len() == 2 {
                    values.iter().any(|v| matcher.matches(v))
                } else {
                    last_of_alternatives(&values, arg(2), |v| matcher.matches(v))
                };
                Ok(VisitReturn::from_bool(found))
            }
            TestFunc::Count => {
                let Some(expected) = parse_c_int(arg(1)) else {
                    self.report(
                        DiagnosticCode::Evaluation,
                        format!("count(): expected a number, got '{}'.", arg(1)),
                    );
                    return Ok(VisitReturn::False);
                };
                let actual = self.values(arg(0)).len() as i64;
                let result = match arg(2) {
                    "" | "equals" | "isEqual" | "==" => actual == expected,
                    "greaterThan" | ">" => actual > expected,
                    "greaterThanOrEqual" | ">=" => actual >= expected,
                    "lessThan" | "<" => actual < expected,
                    "lessThanOrEqual" | "<=" => actual <= expected,
                    other => {
                        self.report(
                            DiagnosticCode::Evaluation,
                            format!("Unexpected modifier to count({other})."),
                        );
                        false
                    }
                };
                Ok(VisitReturn::from_bool(result))
            }
            TestFunc::IsEmpty => Ok(VisitReturn::from_bool(self.values(arg(0)).is_empty())),
            TestFunc::Mkpath => {
                let path = self.resolve_path(arg(0));
                let result = std::fs::create_dir_all(&path);
                self.caches.lock().invalidate_file_info();
                match result {
                    Ok(()) => Ok(VisitReturn::True),
                    Err(err) => {
                        self.report(DiagnosticCode::FileAccess, format!("Cannot create directory {path}: {err}"));
                        Ok(VisitReturn::False)
                    }
                }
            }
            TestFunc::WriteFile => {
                let path = self.resolve_path(arg(0));
                let mut contents = String::new();
                if !arg(1).is_empty() {
                    for value in &self.values(arg(1)) {
                        contents.push_str(value);
                        contents.push('\n');
                    }
                }
                let result = write_file(&path, &contents, arg(2) == "append");
                self.caches.lock().invalidate_file_info();
                match result {
                    Ok(()) => Ok(VisitReturn::True),
                    Err(err) => {
                        self.report(DiagnosticCode::FileAccess, format!("Cannot write file {path}: {err}"));
                        Ok(VisitReturn::False)
                    }
                }
            }
            TestFunc::Touch => {
                let target = self.resolve_path(arg(0));
                let reference = self.resolve_path(arg(1));
                let result = touch(&target, &reference);
                self.caches.lock().invalidate_file_info();
                match result {
                    Ok(()) => Ok(VisitReturn::True),
                    Err(err) => {
                        self.report(DiagnosticCode::FileAccess, format!("Cannot touch {target}: {err}"));
                        Ok(VisitReturn::False)
                    }
                }
            }
        }
    }

    /// Parse `text` as a condition at the current location and evaluate it
    pub(crate) fn evaluate_condition_text(&mut self, text: &str) -> EvalResult<VisitReturn> {
        let condition = match parse_condition(text, self.current_file(), self.current_line()) {
            Ok(condition) => condition,
            Err(err) => {
                self.sink.report(err.to_diagnostic());
                return Ok(VisitReturn::False);
            }
        };
        self.evaluate_condition(&condition)
    }

    fn path_exists(&self, file: &str) -> bool {
        if file.is_empty() {
            return false;
        }
        if self.file_info(file).exists {
            return true;
        }
        if !is_wildcard(file) {
            return false;
        }
        let pattern = self.resolve_path(file);
        glob::glob(&pattern)
            .map(|mut paths| paths.any(|p| p.is_ok()))
            .unwrap_or(false)
    }
}

fn write_file(path: &str, contents: &str, append: bool) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)?;
    file.write_all(contents.as_bytes())
}

fn touch(target: &str, reference: &str) -> std::io::Result<()> {
    let modified = std::fs::metadata(reference)?.modified()?;
    let file = OpenOptions::new().write(true).open(target)?;
    file.set_modified(modified)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_versions() {
        assert_eq!(compare_versions("5.12.1", "5.9"), Ordering::Greater);
        assert_eq!(compare_versions("5.9", "5.9.0"), Ordering::Equal);
        assert_eq!(compare_versions("4", "5.0"), Ordering::Less);
    }

    #[test]
    fn test_matcher_falls_back_to_literal() {
        assert!(Matcher::new("deb.*").matches("debug"));
        assert!(!Matcher::new("deb").matches("debug"));
        assert!(Matcher::new("a(").matches("a("));
    }

    #[test]
    fn test_last_of_alternatives() {
        let config = ProStringList::from(vec!["debug", "release", "x"]);
        assert!(last_of_alternatives(&config, "debug|release", |v| v == "release"));
        assert!(!last_of_alternatives(&config, "debug|release", |v| v == "debug"));
    }
}
