//! Pagination types
//!
//! Defines the request shape handed to paginators: operation parameters plus
//! a `PaginationConfig`, and the opaque resume token used by `MaxItems`.

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Parameter name carrying the pagination configuration
pub const PAGINATION_CONFIG_KEY: &str = "PaginationConfig";

/// Configuration for pagination behavior
///
/// Every field is optional; an empty config means "use service defaults".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct PaginationConfig {
    /// Total number of items to return across all pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,

    /// Number of items requested per page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,

    /// Resume token returned by a previous truncated listing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_token: Option<String>,
}

impl PaginationConfig {
    /// Create an empty config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the item cap
    #[must_use]
    pub fn with_max_items(mut self, max_items: u64) -> Self {
        self.max_items = Some(max_items);
        self
    }

    /// Set the page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Set the starting token
    #[must_use]
    pub fn with_starting_token(mut self, token: impl Into<String>) -> Self {
        self.starting_token = Some(token.into());
        self
    }

    /// Check if no field is set
    pub fn is_empty(&self) -> bool {
        self.max_items.is_none() && self.page_size.is_none() && self.starting_token.is_none()
    }

    /// Layer `self` on top of `base`: fields set here win, the rest come from `base`
    #[must_use]
    pub fn merged_over(&self, base: &PaginationConfig) -> PaginationConfig {
        PaginationConfig {
            max_items: self.max_items.or(base.max_items),
            page_size: self.page_size.or(base.page_size),
            starting_token: self
                .starting_token
                .clone()
                .or_else(|| base.starting_token.clone()),
        }
    }

    /// Parse a config from a JSON value (`null` is an empty config)
    pub fn from_value(value: JsonValue) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value)
            .map_err(|e| Error::invalid_param(PAGINATION_CONFIG_KEY, e.to_string()))
    }

    /// Render the config as a JSON object with only the set fields
    pub fn to_json(&self) -> JsonObject {
        let mut map = JsonObject::new();
        if let Some(max_items) = self.max_items {
            map.insert("MaxItems".to_string(), max_items.into());
        }
        if let Some(page_size) = self.page_size {
            map.insert("PageSize".to_string(), page_size.into());
        }
        if let Some(token) = &self.starting_token {
            map.insert("StartingToken".to_string(), token.clone().into());
        }
        map
    }
}

/// Operation parameters plus pagination configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaginationRequest {
    /// Parameters passed to every operation call (e.g. `Bucket`)
    pub params: JsonObject,
    /// How to paginate
    pub config: PaginationConfig,
}

impl PaginationRequest {
    /// Create a request from operation parameters and a config
    pub fn new(params: JsonObject, config: PaginationConfig) -> Self {
        Self { params, config }
    }

    /// Split a caller mapping into operation parameters and pagination config
    ///
    /// A `PaginationConfig` entry, if present, is removed from the parameters
    /// and parsed as the caller's config.
    pub fn from_params(mut params: JsonObject) -> Result<Self> {
        let config = match params.remove(PAGINATION_CONFIG_KEY) {
            Some(value) => PaginationConfig::from_value(value)?,
            None => PaginationConfig::default(),
        };
        Ok(Self { params, config })
    }

    /// Reassemble the caller-facing mapping, `PaginationConfig` included
    pub fn to_params(&self) -> JsonObject {
        let mut params = self.params.clone();
        params.insert(
            PAGINATION_CONFIG_KEY.to_string(),
            JsonValue::Object(self.config.to_json()),
        );
        params
    }
}

/// Merge a helper pagination config into a caller request
///
/// Caller operation parameters pass through untouched. Caller config fields
/// are only replaced by fields the helper config sets, so an empty helper
/// config returns the request unchanged.
pub fn merge_pagination(
    request: PaginationRequest,
    config: &PaginationConfig,
) -> PaginationRequest {
    PaginationRequest {
        config: config.merged_over(&request.config),
        params: request.params,
    }
}

/// Position inside a listing that was cut short by `MaxItems`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeToken {
    /// Service token of the page to fetch next (`None` means the first page)
    pub token: Option<String>,
    /// Items of that page already returned to the caller
    #[serde(default)]
    pub skip: usize,
}

impl ResumeToken {
    /// Encode as an opaque string
    pub fn encode(&self) -> String {
        // Serializing a struct of an Option<String> and a usize cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        STANDARD.encode(json)
    }

    /// Decode a string produced by [`ResumeToken::encode`]
    pub fn decode(token: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(token.trim())
            .map_err(|e| Error::invalid_token(format!("not base64: {e}")))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| Error::invalid_token(format!("malformed token: {e}")))
    }
}
