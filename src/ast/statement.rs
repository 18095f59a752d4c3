//! Statements, conditions and parsed files

use super::word::{Expr, Word};
use std::fmt;
use std::sync::Arc;

/// Statements in source order
pub type Block = Vec<Statement>;

/// A parsed project file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProFile {
    /// Name the file was parsed under, used in diagnostics
    pub file: Arc<str>,
    /// Top-level statements
    pub statements: Block,
}

impl ProFile {
    pub fn new(file: impl Into<Arc<str>>, statements: Block) -> Self {
        Self {
            file: file.into(),
            statements,
        }
    }
}

/// Assignment operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    /// `=`
    Set,
    /// `+=`
    Append,
    /// `*=`
    AppendUnique,
    /// `-=`
    Remove,
    /// `~=`
    Replace,
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            AssignOp::Set => "=",
            AssignOp::Append => "+=",
            AssignOp::AppendUnique => "*=",
            AssignOp::Remove => "-=",
            AssignOp::Replace => "~=",
        };
        f.write_str(op)
    }
}

/// The two kinds of user-definable functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    /// `defineTest`, usable as a condition
    Test,
    /// `defineReplace`, usable in `$$name(...)`
    Replace,
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionKind::Test => f.write_str("test"),
            FunctionKind::Replace => f.write_str("replace"),
        }
    }
}

/// A boolean condition
///
/// `|` binds tighter than `:`, so `a|b:c` is `And[Or[a, b], c]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// `name(args)`
    Test {
        name: String,
        args: Vec<Expr>,
        line: u32,
    },
    /// A bare word matched against CONFIG and the spec name
    Config { word: Word, line: u32 },
    /// `!cond`
    Not(Box<Condition>),
    /// `a:b`
    And(Vec<Condition>),
    /// `a|b`
    Or(Vec<Condition>),
}

/// What runs when a condition is false
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Otherwise {
    /// `else { ... }`
    Block(Block),
    /// `else: statement`, including `else: cond { ... }` chains
    Chain(Box<Statement>),
}

/// A statement of the project language
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `NAME op values`
    Assign {
        name: Word,
        op: AssignOp,
        value: Expr,
        line: u32,
    },
    /// A condition with optional branches; a bare condition has neither
    Conditional {
        condition: Condition,
        then: Option<Block>,
        otherwise: Option<Otherwise>,
        line: u32,
    },
    /// `defineTest(name)` / `defineReplace(name)`
    FunctionDef {
        kind: FunctionKind,
        name: String,
        body: Arc<Block>,
        line: u32,
    },
    /// `for(var, list)`
    For {
        var: String,
        list: Expr,
        body: Block,
        line: u32,
    },
}

impl Statement {
    /// Line the statement starts on
    pub fn line(&self) -> u32 {
        match self {
            Statement::Assign { line, .. }
            | Statement::Conditional { line, .. }
            | Statement::FunctionDef { line, .. }
            | Statement::For { line, .. } => *line,
        }
    }
}
