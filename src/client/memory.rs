//! In-memory client replaying scripted pages
//!
//! Useful for tests and dry runs: each operation returns a fixed list of
//! pages (or failures) in order and records every call it receives.

use super::types::{unknown_paginator, Client, Operation, PageResponse};
use crate::error::{Error, Result};
use crate::types::{json_type_name, JsonObject, JsonValue};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

/// One scripted response
#[derive(Debug, Clone)]
enum Step {
    Page(JsonValue),
    Fail(String),
}

/// A call received by a scripted operation
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Operation parameters
    pub params: JsonObject,
    /// Token passed for this page
    pub token: Option<String>,
    /// Requested page size
    pub page_size: Option<u32>,
}

/// Operation that replays scripted pages
///
/// Tokens are page indexes: the response to page `n` carries `n + 1` as its
/// next token while more steps remain.
#[derive(Debug)]
pub struct ScriptedOperation {
    name: String,
    result_key: Option<String>,
    steps: Vec<Step>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedOperation {
    /// Create an operation with no pages
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            result_key: None,
            steps: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Set the result key used for `MaxItems`
    #[must_use]
    pub fn with_result_key(mut self, key: impl Into<String>) -> Self {
        self.result_key = Some(key.into());
        self
    }

    /// Append a page
    #[must_use]
    pub fn with_page(mut self, page: JsonValue) -> Self {
        self.steps.push(Step::Page(page));
        self
    }

    /// Append several pages
    #[must_use]
    pub fn with_pages(mut self, pages: impl IntoIterator<Item = JsonValue>) -> Self {
        self.steps.extend(pages.into_iter().map(Step::Page));
        self
    }

    /// Append a failing step
    #[must_use]
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.steps.push(Step::Fail(message.into()));
        self
    }

    /// Calls received so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of calls received so far
    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl Operation for ScriptedOperation {
    fn name(&self) -> &str {
        &self.name
    }

    fn result_key(&self) -> Option<&str> {
        self.result_key.as_deref()
    }

    async fn call(
        &self,
        params: &JsonObject,
        token: Option<&str>,
        page_size: Option<u32>,
    ) -> Result<Option<PageResponse>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                params: params.clone(),
                token: token.map(str::to_string),
                page_size,
            });

        let index = match token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| Error::service(&self.name, format!("invalid token '{token}'")))?,
            None => 0,
        };

        let Some(step) = self.steps.get(index) else {
            return Ok(None);
        };

        let body = match step {
            Step::Fail(message) => return Err(Error::service(&self.name, message.clone())),
            Step::Page(JsonValue::Object(body)) => body.clone(),
            Step::Page(other) => {
                return Err(Error::service(
                    &self.name,
                    format!("page {index} is {}, not an object", json_type_name(other)),
                ))
            }
        };

        if index + 1 < self.steps.len() {
            Ok(Some(PageResponse::with_next(body, (index + 1).to_string())))
        } else {
            Ok(Some(PageResponse::last(body)))
        }
    }
}

/// Client whose operations replay scripted pages
#[derive(Debug, Default, Clone)]
pub struct MemoryClient {
    operations: BTreeMap<String, Arc<ScriptedOperation>>,
}

impl MemoryClient {
    /// Create a client with no operations
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operation
    #[must_use]
    pub fn with_operation(mut self, operation: ScriptedOperation) -> Self {
        self.operations
            .insert(operation.name.clone(), Arc::new(operation));
        self
    }

    /// Register an operation returning the given pages, with no result key
    #[must_use]
    pub fn with_pages(
        self,
        name: impl Into<String>,
        pages: impl IntoIterator<Item = JsonValue>,
    ) -> Self {
        self.with_operation(ScriptedOperation::new(name).with_pages(pages))
    }

    /// Get a registered operation, e.g. to inspect its calls
    pub fn scripted(&self, name: &str) -> Option<Arc<ScriptedOperation>> {
        self.operations.get(name).cloned()
    }
}

impl Client for MemoryClient {
    fn operation(&self, name: &str) -> Result<Arc<dyn Operation>> {
        match self.operations.get(name) {
            Some(op) => Ok(Arc::clone(op) as Arc<dyn Operation>),
            None => Err(unknown_paginator(name, &self.operation_names())),
        }
    }

    fn operation_names(&self) -> Vec<String> {
        self.operations.keys().cloned().collect()
    }
}
