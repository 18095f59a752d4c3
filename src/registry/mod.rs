//! Function registry
//!
//! Name resolution is two-tier and kind-scoped: a built-in of the requested
//! kind always wins, the user table of that kind is consulted only when no
//! built-in matches.

pub mod builtins;
pub mod function;
pub mod signature;

pub use builtins::{ExpandFunc, TestFunc};
pub use function::{FunctionDef, FunctionError, FunctionRegistry, FunctionResult};
pub use signature::Arity;
