//! Object store backed client (S3, R2, GCS, Azure, local filesystem)
//!
//! Exposes `list_objects` and `list_objects_v2` paginators shaped after the
//! S3 listing APIs. Buckets are addressed per call through the `Bucket`
//! parameter; the matching `ObjectStore` is built on first use and cached.
//!
//! Keys, prefixes and markers are plain object keys. Continuation tokens are
//! `object_store` paths in their encoded form and only round-trip through
//! [`ObjectPath::parse`].

use super::types::{unknown_paginator, Client, Operation, PageResponse};
use crate::error::{Error, Result};
use crate::types::{json_type_name, JsonObject, JsonValue};
use async_trait::async_trait;
use chrono::SecondsFormat;
use futures::future;
use futures::{StreamExt, TryStreamExt};
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectMeta, ObjectStore};
use percent_encoding::percent_decode_str;
use serde_json::json;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Largest page the listing APIs return
pub const MAX_KEYS: u32 = 1000;

/// `list_objects` paginator name
pub const LIST_OBJECTS: &str = "list_objects";

/// `list_objects_v2` paginator name
pub const LIST_OBJECTS_V2: &str = "list_objects_v2";

/// Storage backend a `StoreClient` talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// AWS S3
    S3,
    /// Cloudflare R2 (S3-compatible)
    R2,
    /// Google Cloud Storage
    Gcs,
    /// Azure Blob Storage
    Azure,
    /// Local directory, one subdirectory per bucket
    Local(PathBuf),
}

impl Backend {
    /// Parse a store location
    ///
    /// Supported formats:
    /// - `s3` / `s3://` - AWS S3
    /// - `r2` / `r2://` - Cloudflare R2
    /// - `gs` / `gs://` - Google Cloud Storage
    /// - `az` / `az://` - Azure Blob Storage
    /// - `file:///path` or `/path` - Local directory
    pub fn parse(location: &str) -> Result<Self> {
        let location = location.trim();
        if location.is_empty() {
            return Err(Error::config("Store location cannot be empty"));
        }

        for (scheme, backend) in [
            ("s3", Self::S3),
            ("r2", Self::R2),
            ("gs", Self::Gcs),
            ("az", Self::Azure),
        ] {
            if location == scheme {
                return Ok(backend);
            }
            if let Some(rest) = location.strip_prefix(&format!("{scheme}://")) {
                if !rest.trim_matches('/').is_empty() {
                    return Err(Error::config(format!(
                        "Store location '{location}' must not name a bucket, pass it as the Bucket parameter"
                    )));
                }
                return Ok(backend);
            }
        }

        let path = location.strip_prefix("file://").unwrap_or(location);
        Ok(Self::Local(PathBuf::from(path)))
    }

    /// Scheme name (s3, r2, gs, az, file)
    pub fn scheme(&self) -> &str {
        match self {
            Self::S3 => "s3",
            Self::R2 => "r2",
            Self::Gcs => "gs",
            Self::Azure => "az",
            Self::Local(_) => "file",
        }
    }

    /// Whether listings come back in lexicographic key order
    fn lists_in_order(&self) -> bool {
        !matches!(self, Self::Local(_))
    }

    /// Build the object store for one bucket
    fn build(&self, bucket: &str, region: Option<&str>) -> Result<Arc<dyn ObjectStore>> {
        let store: Arc<dyn ObjectStore> = match self {
            Self::S3 | Self::R2 => {
                let scheme = self.scheme();
                let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);
                if let Some(region) = region {
                    builder = builder.with_region(region);
                }
                // AWS_ENDPOINT is read by from_env(); R2 also has its own variable
                if matches!(self, Self::R2) {
                    if let Ok(endpoint) = std::env::var("R2_ENDPOINT_URL") {
                        builder = builder.with_endpoint(endpoint);
                    }
                }
                Arc::new(builder.build().map_err(|e| {
                    Error::config(format!("Failed to create {scheme} client: {e}"))
                })?)
            }
            Self::Gcs => Arc::new(
                GoogleCloudStorageBuilder::from_env()
                    .with_bucket_name(bucket)
                    .build()
                    .map_err(|e| Error::config(format!("Failed to create GCS client: {e}")))?,
            ),
            Self::Azure => Arc::new(
                MicrosoftAzureBuilder::from_env()
                    .with_container_name(bucket)
                    .build()
                    .map_err(|e| Error::config(format!("Failed to create Azure client: {e}")))?,
            ),
            Self::Local(root) => {
                let dir = root.join(bucket);
                if !dir.is_dir() {
                    return Err(Error::NoSuchBucket {
                        bucket: bucket.to_string(),
                    });
                }
                Arc::new(LocalFileSystem::new_with_prefix(&dir).map_err(|e| {
                    Error::config(format!(
                        "Failed to create local store at {}: {e}",
                        dir.display()
                    ))
                })?)
            }
        };
        Ok(store)
    }
}

#[derive(Debug, Clone)]
struct BucketStore {
    store: Arc<dyn ObjectStore>,
    ordered: bool,
}

#[derive(Debug)]
struct StoreInner {
    backend: Backend,
    region: Option<String>,
    buckets: Mutex<HashMap<String, BucketStore>>,
}

impl StoreInner {
    fn bucket(&self, bucket: &str) -> Result<BucketStore> {
        if bucket.is_empty() || bucket.contains('/') {
            return Err(Error::invalid_param(
                "Bucket",
                format!("'{bucket}' is not a valid bucket name"),
            ));
        }

        let mut buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = buckets.get(bucket) {
            return Ok(entry.clone());
        }

        debug!("Opening {} bucket {}", self.backend.scheme(), bucket);
        let entry = BucketStore {
            store: self.backend.build(bucket, self.region.as_deref())?,
            ordered: self.backend.lists_in_order(),
        };
        buckets.insert(bucket.to_string(), entry.clone());
        Ok(entry)
    }
}

/// Client for an object storage service
///
/// Created once and shared; cloning is cheap and shares the bucket cache.
#[derive(Debug, Clone)]
pub struct StoreClient {
    inner: Arc<StoreInner>,
}

impl StoreClient {
    /// Create a client for a backend
    pub fn new(backend: Backend) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                backend,
                region: None,
                buckets: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Use a region for S3 and R2 stores instead of `AWS_REGION`
    #[must_use]
    pub fn with_region(self, region: impl Into<String>) -> Self {
        let buckets = self
            .inner
            .buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        Self {
            inner: Arc::new(StoreInner {
                backend: self.inner.backend.clone(),
                region: Some(region.into()),
                buckets: Mutex::new(buckets),
            }),
        }
    }

    /// Create a client from a location string (see [`Backend::parse`])
    pub fn from_location(location: &str) -> Result<Self> {
        Ok(Self::new(Backend::parse(location)?))
    }

    /// Serve a bucket from an existing object store
    ///
    /// The store's listing order is not assumed, each page is sorted.
    #[must_use]
    pub fn with_bucket(self, bucket: impl Into<String>, store: Arc<dyn ObjectStore>) -> Self {
        self.inner
            .buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                bucket.into(),
                BucketStore {
                    store,
                    ordered: false,
                },
            );
        self
    }

    /// Backend of this client
    pub fn backend(&self) -> &Backend {
        &self.inner.backend
    }

    /// Region applied to S3 and R2 stores, if any
    pub fn region(&self) -> Option<&str> {
        self.inner.region.as_deref()
    }
}

impl Client for StoreClient {
    fn operation(&self, name: &str) -> Result<Arc<dyn Operation>> {
        let version = match name {
            LIST_OBJECTS => ListVersion::V1,
            LIST_OBJECTS_V2 => ListVersion::V2,
            _ => return Err(unknown_paginator(name, &self.operation_names())),
        };
        Ok(Arc::new(ListObjects {
            inner: Arc::clone(&self.inner),
            version,
        }))
    }

    fn operation_names(&self) -> Vec<String> {
        vec![LIST_OBJECTS.to_string(), LIST_OBJECTS_V2.to_string()]
    }
}

// ============================================================================
// Listing operations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListVersion {
    V1,
    V2,
}

impl ListVersion {
    fn operation_name(self) -> &'static str {
        match self {
            Self::V1 => LIST_OBJECTS,
            Self::V2 => LIST_OBJECTS_V2,
        }
    }

    fn valid_params(self) -> &'static [&'static str] {
        match self {
            Self::V1 => &["Bucket", "Prefix", "Marker"],
            Self::V2 => &["Bucket", "Prefix", "StartAfter", "ContinuationToken"],
        }
    }
}

#[derive(Debug)]
struct ListObjects {
    inner: Arc<StoreInner>,
    version: ListVersion,
}

#[async_trait]
impl Operation for ListObjects {
    fn name(&self) -> &str {
        self.version.operation_name()
    }

    fn result_key(&self) -> Option<&str> {
        Some("Contents")
    }

    async fn call(
        &self,
        params: &JsonObject,
        token: Option<&str>,
        page_size: Option<u32>,
    ) -> Result<Option<PageResponse>> {
        let valid = self.version.valid_params();
        if let Some(unknown) = params.keys().find(|k| !valid.contains(&k.as_str())) {
            return Err(Error::UnknownParameter {
                name: unknown.clone(),
                valid: valid.join(", "),
            });
        }

        let bucket = required_str(params, "Bucket")?;
        let prefix = optional_str(params, "Prefix")?.unwrap_or_default();
        let marker = match self.version {
            ListVersion::V1 => optional_str(params, "Marker")?,
            ListVersion::V2 => optional_str(params, "StartAfter")?,
        };
        let continuation = match (token, self.version) {
            (Some(token), _) => Some(token.to_string()),
            (None, ListVersion::V2) => optional_str(params, "ContinuationToken")?,
            (None, ListVersion::V1) => None,
        };
        let offset = match &continuation {
            Some(token) => Some(ObjectPath::parse(token).map_err(|e| {
                Error::invalid_param(
                    "ContinuationToken",
                    format!("'{token}' is malformed: {e}"),
                )
            })?),
            None => marker.as_deref().map(ObjectPath::from),
        };
        let max_keys = page_size.unwrap_or(MAX_KEYS).clamp(1, MAX_KEYS);

        let entry = self.inner.bucket(&bucket)?;
        let mut objects = list_page(
            entry.store.as_ref(),
            &prefix,
            offset.as_ref(),
            max_keys as usize + 1,
            entry.ordered,
        )
        .await?;

        let is_truncated = objects.len() > max_keys as usize;
        objects.truncate(max_keys as usize);
        let last = objects.last().filter(|_| is_truncated);
        let next_token = last.map(|meta| meta.location.to_string());

        let contents: Vec<JsonValue> = objects.iter().map(object_entry).collect();
        let mut body = JsonObject::new();
        body.insert("Name".to_string(), json!(bucket));
        body.insert("Prefix".to_string(), json!(prefix));
        body.insert("MaxKeys".to_string(), json!(max_keys));
        body.insert("IsTruncated".to_string(), json!(is_truncated));

        match self.version {
            ListVersion::V1 => {
                let marker = match &offset {
                    Some(offset) if continuation.is_some() => object_key(offset),
                    _ => marker.unwrap_or_default(),
                };
                body.insert("Marker".to_string(), json!(marker));
                if let Some(meta) = last {
                    body.insert("NextMarker".to_string(), json!(object_key(&meta.location)));
                }
            }
            ListVersion::V2 => {
                body.insert("KeyCount".to_string(), json!(contents.len()));
                if let Some(start_after) = marker {
                    body.insert("StartAfter".to_string(), json!(start_after));
                }
                if let Some(token) = &continuation {
                    body.insert("ContinuationToken".to_string(), json!(token));
                }
                if let Some(next) = &next_token {
                    body.insert("NextContinuationToken".to_string(), json!(next));
                }
            }
        }
        body.insert("Contents".to_string(), JsonValue::Array(contents));

        Ok(Some(PageResponse { body, next_token }))
    }
}

/// List up to `limit` objects after `offset` whose key starts with `prefix`
///
/// Unordered stores are listed and sorted in full for every page, which makes
/// walking all pages quadratic in the bucket size.
async fn list_page(
    store: &dyn ObjectStore,
    prefix: &str,
    offset: Option<&ObjectPath>,
    limit: usize,
    ordered: bool,
) -> Result<Vec<ObjectMeta>> {
    // object_store prefixes match whole segments, list from the last complete one
    let parent = match prefix.rsplit_once('/') {
        Some((dir, _)) if !dir.is_empty() => Some(ObjectPath::from(dir)),
        _ => None,
    };
    let listing = match offset {
        Some(offset) => store.list_with_offset(parent.as_ref(), offset),
        None => store.list(parent.as_ref()),
    };
    let listing =
        listing.try_filter(|meta| future::ready(object_key(&meta.location).starts_with(prefix)));

    if ordered {
        let objects: Vec<ObjectMeta> = listing.take(limit).try_collect().await?;
        return Ok(objects);
    }

    let mut objects: Vec<ObjectMeta> = listing.try_collect().await?;
    objects.sort_by(|a, b| a.location.cmp(&b.location));
    objects.truncate(limit);
    Ok(objects)
}

/// Key of an object as it was written
fn object_key(location: &ObjectPath) -> String {
    percent_decode_str(location.as_ref())
        .decode_utf8_lossy()
        .into_owned()
}

/// Render one listing entry
fn object_entry(meta: &ObjectMeta) -> JsonValue {
    let mut entry = JsonObject::new();
    entry.insert("Key".to_string(), json!(object_key(&meta.location)));
    entry.insert(
        "LastModified".to_string(),
        json!(meta
            .last_modified
            .to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    entry.insert("Size".to_string(), json!(meta.size));
    if let Some(e_tag) = &meta.e_tag {
        entry.insert("ETag".to_string(), json!(e_tag));
    }
    if let Some(version) = &meta.version {
        entry.insert("VersionId".to_string(), json!(version));
    }
    JsonValue::Object(entry)
}

fn required_str(params: &JsonObject, name: &str) -> Result<String> {
    optional_str(params, name)?.ok_or_else(|| Error::missing_param(name))
}

fn optional_str(params: &JsonObject, name: &str) -> Result<Option<String>> {
    match params.get(name) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(Error::invalid_param(
            name,
            format!("expected a string, got {}", json_type_name(other)),
        )),
    }
}
