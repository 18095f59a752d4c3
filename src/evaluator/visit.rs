//! Statement and condition visiting

use super::{Evaluator, VisitReturn};
use crate::ast::{AssignOp, Block, Condition, Expr, Otherwise, Statement, Word};
use crate::diagnostics::DiagnosticCode;
use crate::error::EvalResult;
use crate::model::{parse_c_int, ProKey, ProString, ProStringList};
use crate::paths::file_name;
use crate::registry::FunctionDef;
use regex::{Regex, RegexBuilder};
use std::sync::Arc;

/// Rewrite `\N` back-references as `${N}` and protect literal `$`
pub(crate) fn convert_backrefs(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len());
    let mut chars = replacement.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.peek() {
                Some(d) if d.is_ascii_digit() => {
                    out.push_str("${");
                    out.push(*d);
                    out.push('}');
                    chars.next();
                }
                Some('\\') => {
                    out.push('\\');
                    chars.next();
                }
                _ => out.push('\\'),
            },
            '$' => out.push_str("$$"),
            c => out.push(c),
        }
    }
    out
}

/// Translate a CONFIG wildcard (`*`, `?`, `[...]`) into an anchored regex
pub(crate) fn wildcard_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let mut re = String::from("^");
    for c in pattern.chars() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            '[' | ']' => re.push(c),
            c => re.push_str(&regex::escape(&c.to_string())),
        }
    }
    re.push('$');
    Regex::new(&re)
}

pub(crate) fn is_wildcard(text: &str) -> bool {
    text.contains(['*', '?', '['])
}

/// Parse `a..b` into an inclusive integer range
fn parse_range(text: &str) -> Option<(i64, i64)> {
    let (start, end) = text.split_once("..")?;
    Some((parse_c_int(start)?, parse_c_int(end)?))
}

impl Evaluator {
    /// Visit statements in order, stopping at the first control transfer
    pub(crate) fn visit_block(&mut self, block: &Block) -> EvalResult<VisitReturn> {
        for statement in block {
            match self.visit_statement(statement)? {
                VisitReturn::True | VisitReturn::False => {}
                other => return Ok(other),
            }
        }
        Ok(VisitReturn::True)
    }

    fn visit_statement(&mut self, statement: &Statement) -> EvalResult<VisitReturn> {
        self.set_line(statement.line());
        match statement {
            Statement::Assign { name, op, value, .. } => {
                self.visit_assignment(name, *op, value)?;
                Ok(VisitReturn::True)
            }
            Statement::Conditional {
                condition,
                then,
                otherwise,
                ..
            } => match self.evaluate_condition(condition)? {
                VisitReturn::True => match then {
                    Some(block) => self.visit_block(block),
                    None => Ok(VisitReturn::True),
                },
                VisitReturn::False => match otherwise {
                    Some(Otherwise::Block(block)) => self.visit_block(block),
                    Some(Otherwise::Chain(chained)) => self.visit_statement(chained),
                    None => Ok(VisitReturn::False),
                },
                other => Ok(other),
            },
            Statement::FunctionDef { kind, name, body, line } => {
                let def = FunctionDef {
                    name: ProKey::from(name.as_str()),
                    kind: *kind,
                    body: body.clone(),
                    file: Arc::from(self.current_file()),
                    dir: self.current_dir().to_string(),
                    line: *line,
                };
                self.functions.define(def);
                Ok(VisitReturn::True)
            }
            Statement::For { var, list, body, .. } => self.visit_for(var, list, body),
        }
    }

    fn visit_assignment(&mut self, name: &Word, op: AssignOp, value: &Expr) -> EvalResult<()> {
        let name = self.expand_word_joined(name)?;
        if name.is_empty() || name.contains(char::is_whitespace) {
            self.report(
                DiagnosticCode::Evaluation,
                "Left hand side of assignment must expand to exactly one word.",
            );
            return Ok(());
        }
        let key = ProKey::from(name);

        match op {
            AssignOp::Set => {
                let values = self.expand_expr(value)?;
                self.stack.set(key, values);
            }
            AssignOp::Append => {
                let values = self.expand_expr(value)?;
                self.stack.values_mut(&key).extend(values);
            }
            AssignOp::AppendUnique => {
                let values = self.expand_expr(value)?;
                let list = self.stack.values_mut(&key);
                for v in values {
                    list.push_unique(v);
                }
            }
            AssignOp::Remove => {
                let values = self.expand_expr(value)?;
                let list = self.stack.values_mut(&key);
                for v in &values {
                    list.remove_all(v);
                }
            }
            AssignOp::Replace => {
                let spec = self.expand_expr(value)?.join(" ");
                self.apply_substitution(&key, &spec);
            }
        }
        Ok(())
    }

    /// `VAR ~= s/regex/replacement/[g][i][q]`
    fn apply_substitution(&mut self, key: &ProKey, spec: &str) {
        let mut chars = spec.chars();
        let delimiter = match (chars.next(), chars.next()) {
            (Some('s'), Some(d)) => d,
            _ => {
                self.report(
                    DiagnosticCode::Evaluation,
                    "The ~= operator can handle only the s/// function.",
                );
                return;
            }
        };
        let parts: Vec<&str> = chars.as_str().splitn(3, delimiter).collect();
        let [pattern, replacement, flags] = parts.as_slice() else {
            self.report(
                DiagnosticCode::Evaluation,
                "The s/// function expects 3 arguments.",
            );
            return;
        };

        let global = flags.contains('g');
        let pattern = if flags.contains('q') {
            regex::escape(pattern)
        } else {
            (*pattern).to_string()
        };
        let re = match RegexBuilder::new(&pattern)
            .case_insensitive(flags.contains('i'))
            .build()
        {
            Ok(re) => re,
            Err(err) => {
                self.report(DiagnosticCode::InvalidPattern, format!("Invalid regex '{pattern}': {err}"));
                return;
            }
        };
        let replacement = convert_backrefs(replacement);

        for value in self.stack.values_mut(key).iter_mut() {
            let replaced = if global {
                re.replace_all(value.as_str(), replacement.as_str()).into_owned()
            } else {
                re.replace(value.as_str(), replacement.as_str()).into_owned()
            };
            *value = ProString::from(replaced);
        }
    }

    fn visit_for(&mut self, var: &str, list: &Expr, body: &Block) -> EvalResult<VisitReturn> {
        let items = self.expand_expr(list)?;
        let values: ProStringList = if items.len() == 1 {
            let name = items[0].as_str();
            match self.stack.lookup(name) {
                Some(values) => values.clone(),
                None => match parse_range(name) {
                    Some((start, end)) if start <= end => {
                        (start..=end).map(|i| ProString::from(i.to_string())).collect()
                    }
                    Some((start, end)) => (end..=start)
                        .rev()
                        .map(|i| ProString::from(i.to_string()))
                        .collect(),
                    None => ProStringList::new(),
                },
            }
        } else {
            items
        };

        let key = ProKey::from(var);
        let saved = self.stack.top().get(var).cloned();
        self.loop_depth += 1;

        let mut result = Ok(VisitReturn::True);
        for item in values {
            self.stack.set(key.clone(), ProStringList::single(item));
            match self.visit_block(body) {
                Ok(VisitReturn::Break) => break,
                Ok(VisitReturn::True | VisitReturn::False | VisitReturn::Next) => {}
                other => {
                    result = other;
                    break;
                }
            }
        }

        self.loop_depth -= 1;
        match saved {
            Some(values) => self.stack.set(key, values),
            None => {
                self.stack.remove_local(var);
            }
        }
        result
    }

    /// Evaluate a condition tree; `:` short-circuits on anything but `True`,
    /// `|` on anything but `False`
    pub(crate) fn evaluate_condition(&mut self, condition: &Condition) -> EvalResult<VisitReturn> {
        match condition {
            Condition::Test { name, args, line } => {
                self.set_line(*line);
                let args = self.expand_args(args)?;
                self.call_test(name, &args)
            }
            Condition::Config { word, line } => {
                self.set_line(*line);
                let name = self.expand_word_joined(word)?;
                Ok(VisitReturn::from_bool(self.is_active_config(&name)))
            }
            Condition::Not(inner) => Ok(match self.evaluate_condition(inner)? {
                VisitReturn::True => VisitReturn::False,
                VisitReturn::False => VisitReturn::True,
                other => other,
            }),
            Condition::And(terms) => {
                for term in terms {
                    let result = self.evaluate_condition(term)?;
                    if result != VisitReturn::True {
                        return Ok(result);
                    }
                }
                Ok(VisitReturn::True)
            }
            Condition::Or(terms) => {
                for term in terms {
                    let result = self.evaluate_condition(term)?;
                    if result != VisitReturn::False {
                        return Ok(result);
                    }
                }
                Ok(VisitReturn::False)
            }
        }
    }

    /// Name of the active spec, taken from the last component of QMAKESPEC
    fn spec_name(&self) -> String {
        let spec = self.first_value("QMAKESPEC");
        file_name(spec.trim_end_matches('/')).to_string()
    }

    /// Whether a bare condition word is active: `true`, the spec name, or a
    /// CONFIG entry (wildcards allowed)
    pub(crate) fn is_active_config(&self, name: &str) -> bool {
        match name {
            "true" => return true,
            "false" | "" => return false,
            _ => {}
        }
        let spec = self.spec_name();
        let config = self.values("CONFIG");

        if is_wildcard(name) {
            return match wildcard_regex(name) {
                Ok(re) => re.is_match(&spec) || config.iter().any(|c| re.is_match(c)),
                Err(_) => false,
            };
        }
        spec == name || config.contains_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_backrefs() {
        assert_eq!(convert_backrefs("\\1_x"), "${1}_x");
        assert_eq!(convert_backrefs("a$b"), "a$$b");
        assert_eq!(convert_backrefs("\\\\"), "\\");
        assert_eq!(convert_backrefs("\\n"), "\\n");
    }

    #[test]
    fn test_wildcards() {
        let re = wildcard_regex("linux-*").unwrap();
        assert!(re.is_match("linux-g++"));
        assert!(!re.is_match("macx-clang"));
        assert!(is_wildcard("a*"));
        assert!(!is_wildcard("debug"));
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("1..3"), Some((1, 3)));
        assert_eq!(parse_range("3..1"), Some((3, 1)));
        assert_eq!(parse_range("a..b"), None);
        assert_eq!(parse_range("12"), None);
    }
}
