//! Client module
//!
//! Service handles exposing named, pageable operations.
//!
//! # Clients
//!
//! - `StoreClient` - object storage (S3, R2, GCS, Azure, local directory)
//! - `MemoryClient` - scripted pages, for tests and dry runs

mod memory;
mod store;
mod types;

pub use memory::{MemoryClient, RecordedCall, ScriptedOperation};
pub use store::{Backend, StoreClient, LIST_OBJECTS, LIST_OBJECTS_V2, MAX_KEYS};
pub use types::{unknown_paginator, Client, Operation, PageResponse};

#[cfg(test)]
mod tests;
