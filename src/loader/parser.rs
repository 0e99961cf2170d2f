//! YAML parser for listing jobs
//!
//! Parses and validates job files.

use crate::error::{Error, Result};
use crate::loader::types::ListingJob;
use crate::pagination::PAGINATION_CONFIG_KEY;
use std::fs;
use std::path::Path;

/// Load a listing job from a YAML file
pub fn load_job(path: impl AsRef<Path>) -> Result<ListingJob> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::Io(e)
        }
    })?;
    load_job_from_str(&content)
}

/// Load a listing job from a YAML string
pub fn load_job_from_str(yaml: &str) -> Result<ListingJob> {
    let job: ListingJob = serde_yaml::from_str(yaml)?;

    validate_job(&job)?;
    Ok(job)
}

/// Validate a listing job
pub fn validate_job(job: &ListingJob) -> Result<()> {
    if job.store.trim().is_empty() {
        return Err(Error::config("Job store cannot be empty"));
    }

    if job.paginator.trim().is_empty() {
        return Err(Error::config("Job paginator cannot be empty"));
    }

    if job.response_key.trim().is_empty() {
        return Err(Error::config("Job response_key cannot be empty"));
    }

    // Pagination settings belong in the `pagination` section
    if job.params.contains_key(PAGINATION_CONFIG_KEY) {
        return Err(Error::config(format!(
            "Job params must not contain {PAGINATION_CONFIG_KEY}, use the pagination section"
        )));
    }

    if job.pagination.page_size == Some(0) {
        return Err(Error::config("Job pagination PageSize must be at least 1"));
    }

    Ok(())
}
