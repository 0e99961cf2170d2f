//! # bucket-pager
//!
//! Walk paginated cloud storage listings as a flat sequence of items.
//!
//! ## Features
//!
//! - **Generic pagination**: any client operation that returns pages with a
//!   continuation token can be flattened with [`all_items`]
//! - **Object storage**: `list_objects` / `list_objects_v2` paginators over
//!   S3, R2, GCS, Azure and local directories
//! - **Pagination config**: `PageSize`, `MaxItems` and resumable
//!   `StartingToken`s
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bucket_pager::{all_items, StoreClient, Result};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = StoreClient::from_location("s3")?;
//!     let params = json!({"Bucket": "my-bucket", "PaginationConfig": {}});
//!
//!     let mut objects = all_items(
//!         &client,
//!         "list_objects",
//!         "Contents",
//!         params.as_object().cloned().unwrap_or_default(),
//!     );
//!     while let Some(object) = objects.next().await {
//!         println!("{}", object?);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  all_items(client, paginator, key, params) → items       │
//! └──────────────────────────────────────────────────────────┘
//!                              │
//! ┌──────────────┬─────────────┴──────────┬──────────────────┐
//! │   Client     │   Paginator            │   Loader / CLI   │
//! ├──────────────┼────────────────────────┼──────────────────┤
//! │ StoreClient  │ PageSize               │ YAML jobs        │
//! │ MemoryClient │ MaxItems               │ list             │
//! │              │ StartingToken          │ paginators       │
//! └──────────────┴────────────────────────┴──────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Service clients and pageable operations
pub mod client;

/// Paginators and item iteration
pub mod pagination;

/// YAML loader for listing jobs
pub mod loader;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use client::{Client, MemoryClient, StoreClient};
pub use loader::{load_job, ListingJob};
pub use pagination::{all_items, PaginationConfig, Paginator};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
