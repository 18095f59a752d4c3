//! Value model for project variables
//!
//! Every variable holds an ordered list of string values. Lists live in
//! [`ValueMap`]s arranged as a [`ValueMapStack`] of scopes.

pub mod format;
pub mod pro_string;
pub mod value_map;

pub use format::{format_value, format_value_with, parse_c_int, split_value_list};
pub use pro_string::{ProKey, ProString, ProStringList};
pub use value_map::{ValueMap, ValueMapStack};
