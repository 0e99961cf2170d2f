//! Flat item iteration over paginated responses
//!
//! `all_items` hides pagination entirely: it yields the elements of the list
//! stored under a response key, page after page, in service order.

use super::paginator::PageIterator;
use super::types::{merge_pagination, PaginationConfig, PaginationRequest};
use crate::client::Client;
use crate::error::{Error, Result};
use crate::types::{json_type_name, JsonObject, JsonValue};
use futures::stream::{self, BoxStream};
use std::collections::VecDeque;

/// Iterate over every item stored under `response_dict_key` across all pages
/// of `paginator_name`
///
/// `pagination_params` holds the operation parameters and, optionally, a
/// `PaginationConfig` entry. It is merged with an empty helper config, so the
/// caller's values are used as given.
///
/// # Example
///
/// ```ignore
/// let params = serde_json::json!({"Bucket": "my-bucket", "PaginationConfig": {}});
/// let mut items = all_items(&client, "list_objects", "Contents", params.as_object().cloned().unwrap_or_default());
/// while let Some(object) = items.next().await {
///     println!("{}", object?);
/// }
/// ```
pub fn all_items<'a, C>(
    client: &'a C,
    paginator_name: impl Into<String>,
    response_dict_key: impl Into<String>,
    pagination_params: JsonObject,
) -> ItemIterator<'a, C>
where
    C: Client + ?Sized,
{
    all_items_with_config(
        client,
        paginator_name,
        response_dict_key,
        pagination_params,
        PaginationConfig::default(),
    )
}

/// Like [`all_items`], with a helper pagination config layered over the
/// caller's `PaginationConfig`
pub fn all_items_with_config<'a, C>(
    client: &'a C,
    paginator_name: impl Into<String>,
    response_dict_key: impl Into<String>,
    pagination_params: JsonObject,
    pagination_config: PaginationConfig,
) -> ItemIterator<'a, C>
where
    C: Client + ?Sized,
{
    ItemIterator {
        client,
        paginator_name: paginator_name.into(),
        response_key: response_dict_key.into(),
        pending: Some((pagination_params, pagination_config)),
        pages: None,
        buffer: VecDeque::new(),
        page_number: 0,
        done: false,
    }
}

/// Lazy, finite, non-restartable sequence of items
///
/// Nothing is requested, not even the paginator lookup, until the first call
/// to [`ItemIterator::next`]. After an error the iterator is exhausted.
pub struct ItemIterator<'a, C: ?Sized> {
    client: &'a C,
    paginator_name: String,
    response_key: String,
    pending: Option<(JsonObject, PaginationConfig)>,
    pages: Option<PageIterator>,
    buffer: VecDeque<JsonValue>,
    page_number: u64,
    done: bool,
}

impl<'a, C> ItemIterator<'a, C>
where
    C: Client + ?Sized,
{
    /// Get the next item
    pub async fn next(&mut self) -> Option<Result<JsonValue>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }
            if self.done {
                return None;
            }
            match self.advance().await {
                Ok(true) => {}
                Ok(false) => {
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }

    /// Pages fetched so far
    pub fn pages_fetched(&self) -> u64 {
        self.page_number
    }

    /// Token to continue a listing cut short by `MaxItems`
    pub fn resume_token(&self) -> Option<&str> {
        self.pages.as_ref().and_then(PageIterator::resume_token)
    }

    /// Collect all remaining items, stopping at the first error
    pub async fn try_collect_all(mut self) -> Result<Vec<JsonValue>> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await {
            items.push(item?);
        }
        Ok(items)
    }

    /// Turn the iterator into a stream of items
    pub fn into_stream(self) -> BoxStream<'a, Result<JsonValue>> {
        Box::pin(stream::unfold(self, |mut items| async move {
            items.next().await.map(|item| (item, items))
        }))
    }

    /// Pull the next page into the buffer. Returns false when there are no
    /// more pages.
    async fn advance(&mut self) -> Result<bool> {
        if let Some((params, config)) = self.pending.take() {
            let paginator = self.client.get_paginator(&self.paginator_name)?;
            let request = merge_pagination(PaginationRequest::from_params(params)?, &config);
            self.pages = Some(paginator.paginate(request)?);
        }

        let Some(pages) = self.pages.as_mut() else {
            return Ok(false);
        };

        match pages.next_page().await {
            None => Ok(false),
            Some(page) => {
                self.page_number += 1;
                let items = extract_items(page?, &self.response_key, self.page_number)?;
                self.buffer.extend(items);
                Ok(true)
            }
        }
    }
}

/// Take the list stored under `key` out of a page
pub fn extract_items(mut page: JsonObject, key: &str, page_number: u64) -> Result<Vec<JsonValue>> {
    match page.remove(key) {
        Some(JsonValue::Array(items)) => Ok(items),
        Some(other) => Err(Error::InvalidResponseKey {
            key: key.to_string(),
            page: page_number,
            found: json_type_name(&other).to_string(),
        }),
        None => Err(Error::MissingResponseKey {
            key: key.to_string(),
            page: page_number,
        }),
    }
}
