//! Loader types
//!
//! Declarative listing job definition for YAML parsing.

use crate::pagination::{PaginationConfig, PAGINATION_CONFIG_KEY};
use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};

/// A listing job: which store, which paginator, which items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListingJob {
    /// Store location (`s3`, `r2`, `gs`, `az`, or a local directory)
    #[serde(default = "default_store")]
    pub store: String,
    /// Region for S3 and R2 stores
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Paginator name
    #[serde(default = "default_paginator")]
    pub paginator: String,
    /// Key holding the item list in each page
    #[serde(default = "default_response_key")]
    pub response_key: String,
    /// Operation parameters (e.g. `Bucket`, `Prefix`)
    #[serde(default)]
    pub params: JsonObject,
    /// Pagination configuration
    #[serde(default)]
    pub pagination: PaginationConfig,
}

fn default_store() -> String {
    "s3".to_string()
}

fn default_paginator() -> String {
    "list_objects".to_string()
}

fn default_response_key() -> String {
    "Contents".to_string()
}

impl Default for ListingJob {
    fn default() -> Self {
        Self {
            store: default_store(),
            region: None,
            paginator: default_paginator(),
            response_key: default_response_key(),
            params: JsonObject::new(),
            pagination: PaginationConfig::default(),
        }
    }
}

impl ListingJob {
    /// Set an operation parameter
    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<JsonValue>) {
        self.params.insert(name.into(), value.into());
    }

    /// Parameters as handed to `all_items`, `PaginationConfig` included
    pub fn pagination_params(&self) -> JsonObject {
        let mut params = self.params.clone();
        params.insert(
            PAGINATION_CONFIG_KEY.to_string(),
            JsonValue::Object(self.pagination.to_json()),
        );
        params
    }
}
