//! Paginator and page iterator
//!
//! A `Paginator` wraps one client operation. `paginate` turns a request into
//! a `PageIterator` that calls the operation once per page, threading the
//! service token from each response into the next call.

use super::types::{PaginationRequest, ResumeToken};
use crate::client::Operation;
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use futures::stream::{self, BoxStream};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Splits a listing operation into sequential pages
#[derive(Clone)]
pub struct Paginator {
    operation: Arc<dyn Operation>,
}

impl fmt::Debug for Paginator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Paginator")
            .field("operation", &self.operation.name())
            .finish()
    }
}

impl Paginator {
    /// Create a paginator for an operation
    pub fn new(operation: Arc<dyn Operation>) -> Self {
        Self { operation }
    }

    /// Name of the wrapped operation
    pub fn name(&self) -> &str {
        self.operation.name()
    }

    /// Start paginating
    ///
    /// No request is sent until the first page is pulled.
    pub fn paginate(&self, request: PaginationRequest) -> Result<PageIterator> {
        let PaginationRequest { params, config } = request;

        let resume = match &config.starting_token {
            Some(token) => ResumeToken::decode(token)?,
            None => ResumeToken::default(),
        };

        if (config.max_items.is_some() || resume.skip > 0) && self.operation.result_key().is_none()
        {
            return Err(Error::config(format!(
                "Paginator '{}' has no result key, MaxItems and StartingToken skips are unsupported",
                self.operation.name()
            )));
        }

        Ok(PageIterator {
            operation: Arc::clone(&self.operation),
            params,
            page_size: config.page_size,
            max_items: config.max_items,
            next_token: resume.token,
            skip: resume.skip,
            done: false,
            pages: 0,
            items: 0,
            resume_token: None,
        })
    }
}

/// Lazy, finite, non-restartable sequence of pages
pub struct PageIterator {
    operation: Arc<dyn Operation>,
    params: JsonObject,
    page_size: Option<u32>,
    max_items: Option<u64>,
    next_token: Option<String>,
    skip: usize,
    done: bool,
    pages: u64,
    items: u64,
    resume_token: Option<String>,
}

impl fmt::Debug for PageIterator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageIterator")
            .field("operation", &self.operation.name())
            .field("next_token", &self.next_token)
            .field("done", &self.done)
            .field("pages", &self.pages)
            .finish_non_exhaustive()
    }
}

impl PageIterator {
    /// Fetch the next page
    ///
    /// Returns `None` once the service reports no further pages, once
    /// `MaxItems` is reached, or after an error has been returned.
    pub async fn next_page(&mut self) -> Option<Result<JsonObject>> {
        if self.done {
            return None;
        }

        match self.fetch().await {
            Ok(page) => page.map(Ok),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }

    /// Number of pages fetched so far
    pub fn pages_fetched(&self) -> u64 {
        self.pages
    }

    /// Token to pass as `StartingToken` to continue a listing cut short by
    /// `MaxItems`; `None` if the listing ran to completion
    pub fn resume_token(&self) -> Option<&str> {
        self.resume_token.as_deref()
    }

    /// Turn the iterator into a stream of pages
    pub fn into_stream(self) -> BoxStream<'static, Result<JsonObject>> {
        Box::pin(stream::unfold(self, |mut pages| async move {
            pages.next_page().await.map(|page| (page, pages))
        }))
    }

    async fn fetch(&mut self) -> Result<Option<JsonObject>> {
        let token = self.next_token.take();
        let Some(response) = self
            .operation
            .call(&self.params, token.as_deref(), self.page_size)
            .await?
        else {
            self.done = true;
            return Ok(None);
        };

        self.pages += 1;
        let mut body = response.body;

        if let (Some(next), Some(previous)) = (&response.next_token, &token) {
            if next == previous {
                return Err(Error::RepeatedToken {
                    operation: self.operation.name().to_string(),
                    token: next.clone(),
                });
            }
        }

        let skip = std::mem::take(&mut self.skip);
        if skip > 0 || self.max_items.is_some() {
            let truncated = self.apply_limits(
                &mut body,
                skip,
                token.as_deref(),
                response.next_token.as_deref(),
            );
            if truncated {
                self.log_page(&body);
                return Ok(Some(body));
            }
        }

        match response.next_token {
            Some(next) => self.next_token = Some(next),
            None => self.done = true,
        }

        self.log_page(&body);
        Ok(Some(body))
    }

    /// Drop resumed items and enforce `MaxItems` on a page's result list.
    /// Returns true when the listing stops at this page.
    fn apply_limits(
        &mut self,
        body: &mut JsonObject,
        skip: usize,
        token: Option<&str>,
        next_token: Option<&str>,
    ) -> bool {
        let Some(key) = self.operation.result_key() else {
            return false;
        };
        let key = key.to_string();

        let Some(JsonValue::Array(items)) = body.get_mut(&key) else {
            return false;
        };

        if skip > 0 {
            items.drain(..skip.min(items.len()));
        }

        let count = items.len() as u64;
        let Some(max_items) = self.max_items else {
            self.items += count;
            return false;
        };

        let remaining = max_items.saturating_sub(self.items);
        if count > remaining {
            items.truncate(remaining as usize);
            self.items += remaining;
            self.done = true;
            self.resume_token = Some(
                ResumeToken {
                    token: token.map(str::to_string),
                    skip: skip + remaining as usize,
                }
                .encode(),
            );
            return true;
        }

        self.items += count;
        if self.items >= max_items {
            self.done = true;
            self.resume_token = next_token.map(|next| {
                ResumeToken {
                    token: Some(next.to_string()),
                    skip: 0,
                }
                .encode()
            });
            return true;
        }

        false
    }

    fn log_page(&self, body: &JsonObject) {
        let count = self
            .operation
            .result_key()
            .and_then(|key| body.get(key))
            .and_then(JsonValue::as_array)
            .map_or(0, Vec::len);
        debug!(
            "Fetched page {} from {} ({} result items, more: {})",
            self.pages,
            self.operation.name(),
            count,
            !self.done
        );
    }
}
