//! Project-file evaluator in Rust
//!
//! Parses qmake-style project files and evaluates them into a table of
//! variables: assignments, scopes, conditions, `for` loops, user-defined test
//! and replace functions, includes and feature files.
//!
//! ```no_run
//! use proeval::{EvaluatorConfig, LoadFlags, Project};
//!
//! let mut project = Project::new(EvaluatorConfig::new());
//! if project.read("app.pro", LoadFlags::ALL)? {
//!     println!("SOURCES = {:?}", project.values_of("SOURCES"));
//! }
//! # Ok::<(), proeval::EvalError>(())
//! ```

pub mod ast;
pub mod cache;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod parser;
pub mod paths;
pub mod project;
pub mod registry;

// Re-export main types
pub use cache::{CacheConfig, EvaluatorCaches, FileInfoCacheKey, FixStringCacheKey};
pub use config::{EvaluatorConfig, LoadFlags};
pub use diagnostics::{
    CollectingSink, Diagnostic, DiagnosticCode, DiagnosticFormatter, DiagnosticSink, LogSink,
    MessageKind, StderrSink,
};
pub use error::{EvalError, EvalResult};
pub use evaluator::{Evaluator, VisitReturn};
pub use model::{ProKey, ProString, ProStringList, ValueMap, ValueMapStack};
pub use parser::{ParseError, parse_project as parse};
pub use project::Project;
pub use registry::FunctionRegistry;
