//! Command-line interface for petwatch.

mod commands;

pub use commands::{is_verbose, run};
