//! Client and operation traits
//!
//! A `Client` is a handle to a remote service exposing named, pageable
//! operations. Each `Operation` fetches one page at a time.

use crate::error::{Error, Result};
use crate::pagination::Paginator;
use crate::types::JsonObject;
use async_trait::async_trait;
use std::sync::Arc;

/// One page returned by an operation call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageResponse {
    /// Response body
    pub body: JsonObject,
    /// Token for the following page, `None` on the last page
    pub next_token: Option<String>,
}

impl PageResponse {
    /// Create the last page of a listing
    pub fn last(body: JsonObject) -> Self {
        Self {
            body,
            next_token: None,
        }
    }

    /// Create a page followed by another one
    pub fn with_next(body: JsonObject, next_token: impl Into<String>) -> Self {
        Self {
            body,
            next_token: Some(next_token.into()),
        }
    }
}

/// A pageable service operation
#[async_trait]
pub trait Operation: Send + Sync {
    /// Operation name (e.g. "list_objects")
    fn name(&self) -> &str;

    /// Key of the main result list in each page, used to apply `MaxItems`
    fn result_key(&self) -> Option<&str> {
        None
    }

    /// Fetch one page
    ///
    /// `token` is `None` for the first page. Returns `Ok(None)` when the
    /// service has no page at all to return.
    async fn call(
        &self,
        params: &JsonObject,
        token: Option<&str>,
        page_size: Option<u32>,
    ) -> Result<Option<PageResponse>>;
}

/// Handle to a remote service
pub trait Client: Send + Sync {
    /// Look up an operation by name
    fn operation(&self, name: &str) -> Result<Arc<dyn Operation>>;

    /// Names of all pageable operations
    fn operation_names(&self) -> Vec<String>;

    /// Check whether an operation can be paginated
    fn can_paginate(&self, name: &str) -> bool {
        self.operation_names().iter().any(|n| n == name)
    }

    /// Get a paginator for an operation
    fn get_paginator(&self, name: &str) -> Result<Paginator> {
        Ok(Paginator::new(self.operation(name)?))
    }
}

/// Build the error returned for an unknown operation name
pub fn unknown_paginator(name: &str, available: &[String]) -> Error {
    Error::UnknownPaginator {
        name: name.to_string(),
        available: available.join(", "),
    }
}
