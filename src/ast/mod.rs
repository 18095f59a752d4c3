//! Abstract Syntax Tree (AST) definitions for project files
//!
//! The parser produces these types and the evaluator walks them. Nothing in
//! here knows about variables or functions.

mod statement;
mod word;

pub use statement::*;
pub use word::*;
