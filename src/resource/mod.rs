//! Lazy resource engine
//!
//! The generic engine every resource type runs on.
//!
//! # Features
//!
//! - **Lazy Loading**: the first read of a declared field fetches the object
//! - **Identity Tracking**: rewriting a fetch field forces a refetch by the
//!   new value
//! - **CRUD**: create, save, delete driven by the schema's URL fields
//! - **Actions**: typed action dispatch, single-target and by tag
//! - **Collections**: one page per call, materialized in response order

mod collection;
mod instance;
mod ops;

pub use collection::{list_raw, ListParams, DEFAULT_PAGE, DEFAULT_PER_PAGE};
pub use instance::Resource;

#[cfg(test)]
mod tests;
