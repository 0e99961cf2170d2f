//! CLI module
//!
//! Command-line interface for listing buckets.
//!
//! # Commands
//!
//! - `list` - Print every item of a paginated listing
//! - `paginators` - List the paginators a store supports
//! - `validate` - Validate a job file

mod commands;
mod runner;

pub use commands::{Cli, Commands, ListArgs, OutputFormat};
pub use runner::{apply_overrides, parse_param, store_client, Runner};
