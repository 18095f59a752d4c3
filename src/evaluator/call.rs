//! Two-tier function dispatch
//!
//! A name is first looked up among the built-ins of the requested kind and
//! only then among the user definitions of that kind. Built-ins receive
//! flattened arguments (each argument list joined with a space); user
//! functions receive the argument lists unchanged.

use super::{Evaluator, VisitReturn};
use crate::ast::FunctionKind;
use crate::diagnostics::DiagnosticCode;
use crate::error::EvalResult;
use crate::model::{parse_c_int, ProKey, ProString, ProStringList};
use crate::registry::{ExpandFunc, FunctionDef, FunctionError, TestFunc};

/// Join each argument list into a single value
pub(crate) fn flatten(args: &[ProStringList]) -> Vec<ProString> {
    args.iter().map(|arg| ProString::from(arg.join(" "))).collect()
}

impl Evaluator {
    /// Call a test function by name
    pub(crate) fn call_test(&mut self, name: &str, args: &[ProStringList]) -> EvalResult<VisitReturn> {
        if let Some(func) = TestFunc::lookup(name) {
            let flat = flatten(args);
            if !func.arity().accepts(flat.len()) {
                self.report_arity(name, func.arity(), flat.len());
                return Ok(VisitReturn::False);
            }
            log::trace!("calling built-in test function {name}");
            return self.evaluate_builtin_test(func, &flat);
        }

        if let Some(def) = self.functions.test_function(name).cloned() {
            return self.call_user_test(&def, args);
        }

        self.report_function_error(FunctionError::Unknown {
            name: name.to_string(),
            kind: FunctionKind::Test,
        });
        Ok(VisitReturn::False)
    }

    /// Call a replace function by name
    pub(crate) fn call_replace(&mut self, name: &str, args: &[ProStringList]) -> EvalResult<ProStringList> {
        if let Some(func) = ExpandFunc::lookup(name) {
            let flat = flatten(args);
            if !func.arity().accepts(flat.len()) {
                self.report_arity(name, func.arity(), flat.len());
                return Ok(ProStringList::new());
            }
            log::trace!("calling built-in replace function {name}");
            return self.evaluate_builtin_replace(func, &flat);
        }

        if let Some(def) = self.functions.replace_function(name).cloned() {
            return self.call_user_replace(&def, args);
        }

        self.report_function_error(FunctionError::Unknown {
            name: name.to_string(),
            kind: FunctionKind::Replace,
        });
        Ok(ProStringList::new())
    }

    fn report_arity(&self, name: &str, expected: crate::registry::Arity, actual: usize) {
        self.report_function_error(FunctionError::InvalidArity {
            name: name.to_string(),
            expected,
            actual,
        });
    }

    fn report_function_error(&self, error: FunctionError) {
        let code = match error {
            FunctionError::InvalidArity { .. } => DiagnosticCode::InvalidArity,
            FunctionError::Unknown {
                kind: FunctionKind::Test,
                ..
            } => DiagnosticCode::UnknownTestFunction,
            FunctionError::Unknown {
                kind: FunctionKind::Replace,
                ..
            } => DiagnosticCode::UnknownReplaceFunction,
        };
        self.report(code, error.to_string());
    }

    fn call_user_test(&mut self, def: &FunctionDef, args: &[ProStringList]) -> EvalResult<VisitReturn> {
        match self.call_user_function(def, args)? {
            VisitReturn::Return => {
                let value = std::mem::take(&mut self.return_value);
                Ok(self.interpret_test_return(&def.name, &value))
            }
            VisitReturn::Error => Ok(VisitReturn::Error),
            _ => Ok(VisitReturn::True),
        }
    }

    fn interpret_test_return(&self, name: &ProKey, value: &ProStringList) -> VisitReturn {
        let Some(first) = value.first() else {
            return VisitReturn::True;
        };
        match first.as_str() {
            "true" => VisitReturn::True,
            "false" => VisitReturn::False,
            text => match parse_c_int(text) {
                Some(n) => VisitReturn::from_bool(n != 0),
                None => {
                    self.report(
                        DiagnosticCode::Evaluation,
                        format!("Unexpected return value from test '{name}': {}.", value.join(" ")),
                    );
                    VisitReturn::False
                }
            },
        }
    }

    fn call_user_replace(&mut self, def: &FunctionDef, args: &[ProStringList]) -> EvalResult<ProStringList> {
        match self.call_user_function(def, args)? {
            VisitReturn::Error => {
                Err(self.take_fatal(|| format!("error in replace function '{}'", def.name)))
            }
            VisitReturn::Return => Ok(std::mem::take(&mut self.return_value)),
            _ => Ok(ProStringList::new()),
        }
    }

    /// Run a user function body in a fresh scope holding `ARGS` and `1`..`N`
    fn call_user_function(&mut self, def: &FunctionDef, args: &[ProStringList]) -> EvalResult<VisitReturn> {
        if self.call_depth >= self.config.max_call_depth {
            return Ok(self.fail(
                DiagnosticCode::RecursionLimit,
                format!(
                    "Function call depth exceeded {} while calling '{}'.",
                    self.config.max_call_depth, def.name
                ),
            ));
        }
        log::trace!("calling user {} function {}", def.kind, def.name);

        self.stack.push();
        let mut all = ProStringList::new();
        for (i, arg) in args.iter().enumerate() {
            self.stack.set(ProKey::from((i + 1).to_string()), arg.clone());
            all.extend(arg.iter().cloned());
        }
        self.stack.set(ProKey::from("ARGS"), all);

        let saved_current = self.current.clone();
        let saved_loop_depth = std::mem::replace(&mut self.loop_depth, 0);
        self.push_file(def.file.clone(), def.dir.clone());
        self.call_depth += 1;
        self.return_value.clear();

        let result = self.visit_block(&def.body);

        self.call_depth -= 1;
        self.pop_file(saved_current);
        self.loop_depth = saved_loop_depth;
        self.stack.pop();
        result
    }
}
