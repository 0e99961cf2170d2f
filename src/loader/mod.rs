//! YAML Loader module
//!
//! Parse listing job definitions from YAML files.
//!
//! # Example
//!
//! ```yaml
//! store: s3
//! paginator: list_objects
//! response_key: Contents
//! params:
//!   Bucket: my-bucket
//!   Prefix: raw/
//! pagination:
//!   PageSize: 500
//! ```

mod parser;
mod types;

pub use parser::{load_job, load_job_from_str, validate_job};
pub use types::ListingJob;

#[cfg(test)]
mod tests;
