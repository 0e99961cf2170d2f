//! Tests for YAML loader module

use super::*;
use crate::error::Error;
use crate::pagination::PaginationConfig;
use pretty_assertions::assert_eq;
use serde_json::json;

// ============================================================================
// Basic Loading Tests
// ============================================================================

#[test]
fn test_load_minimal_job() {
    let yaml = r"
params:
  Bucket: yolt-dp-dta-data
";

    let job = load_job_from_str(yaml).unwrap();
    assert_eq!(job.store, "s3");
    assert_eq!(job.paginator, "list_objects");
    assert_eq!(job.response_key, "Contents");
    assert_eq!(job.params["Bucket"], json!("yolt-dp-dta-data"));
    assert!(job.pagination.is_empty());
}

#[test]
fn test_load_empty_job_uses_defaults() {
    let job = load_job_from_str("{}").unwrap();
    assert_eq!(job, ListingJob::default());
}

#[test]
fn test_load_full_job() {
    let yaml = r"
store: gs://
region: europe-west4
paginator: list_objects_v2
response_key: Contents
params:
  Bucket: archive
  Prefix: raw/2024/
pagination:
  MaxItems: 100
  PageSize: 25
";

    let job = load_job_from_str(yaml).unwrap();
    assert_eq!(job.store, "gs://");
    assert_eq!(job.region.as_deref(), Some("europe-west4"));
    assert_eq!(job.paginator, "list_objects_v2");
    assert_eq!(job.params.len(), 2);
    assert_eq!(
        job.pagination,
        PaginationConfig::new().with_max_items(100).with_page_size(25)
    );
}

#[test]
fn test_pagination_params_includes_config() {
    let mut job = ListingJob::default();
    job.set_param("Bucket", "data");
    job.pagination = PaginationConfig::new().with_page_size(10);

    assert_eq!(
        serde_json::Value::Object(job.pagination_params()),
        json!({"Bucket": "data", "PaginationConfig": {"PageSize": 10}})
    );
}

#[test]
fn test_pagination_params_empty_config() {
    let mut job = ListingJob::default();
    job.set_param("Bucket", "data");

    assert_eq!(
        serde_json::Value::Object(job.pagination_params()),
        json!({"Bucket": "data", "PaginationConfig": {}})
    );
}

// ============================================================================
// Validation Tests
// ============================================================================

#[test]
fn test_reject_empty_paginator() {
    let err = load_job_from_str("paginator: ''").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Configuration error: Job paginator cannot be empty"
    );
}

#[test]
fn test_reject_empty_response_key() {
    assert!(load_job_from_str("response_key: ' '").is_err());
}

#[test]
fn test_reject_pagination_config_in_params() {
    let yaml = r"
params:
  Bucket: data
  PaginationConfig:
    PageSize: 5
";
    let err = load_job_from_str(yaml).unwrap_err();
    assert!(err.to_string().contains("use the pagination section"));
}

#[test]
fn test_reject_zero_page_size() {
    let yaml = r"
pagination:
  PageSize: 0
";
    assert!(load_job_from_str(yaml).is_err());
}

#[test]
fn test_reject_unknown_pagination_field() {
    let yaml = r"
pagination:
  MaxKeys: 5
";
    let err = load_job_from_str(yaml).unwrap_err();
    assert!(matches!(err, Error::YamlParse(_)));
}

#[test]
fn test_load_job_unreadable_path() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_job(dir.path()).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_load_job_missing_file() {
    let err = load_job("/definitely/not/here.yaml").unwrap_err();
    assert!(matches!(err, Error::FileNotFound { .. }));
}

#[test]
fn test_load_job_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("job.yaml");
    std::fs::write(&path, "store: /tmp/buckets\nparams:\n  Bucket: b\n").unwrap();

    let job = load_job(&path).unwrap();
    assert_eq!(job.store, "/tmp/buckets");
    assert_eq!(job.params["Bucket"], json!("b"));
}
