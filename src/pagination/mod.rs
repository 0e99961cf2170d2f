//! Pagination module
//!
//! Turns a pageable client operation into a flat sequence of items.
//!
//! # Overview
//!
//! - `Paginator` wraps one operation and produces a `PageIterator`
//! - `PaginationConfig` controls page size, item caps and resumption
//! - `all_items` flattens the pages into the items stored under a response key

mod items;
mod paginator;
mod types;

pub use items::{all_items, all_items_with_config, extract_items, ItemIterator};
pub use paginator::{PageIterator, Paginator};
pub use types::{
    merge_pagination, PaginationConfig, PaginationRequest, ResumeToken, PAGINATION_CONFIG_KEY,
};
