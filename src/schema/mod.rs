//! Resource schemas
//!
//! Declarative description of a resource type: endpoint, response keys,
//! field categories, identifier fields and supported actions.
//!
//! # Features
//!
//! - **Field Categories**: fetch, static and dynamic fields
//! - **Endpoint Templates**: positional placeholders for nested resources
//! - **Typed Actions**: one enum variant per action with its parameters

mod action;
mod template;
mod types;

pub use action::{ActionKind, ActionType};
pub use template::{placeholder_count, resolve_endpoint};
pub use types::{FieldCategory, ResourceSchema};
