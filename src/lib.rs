// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # do-resource
//!
//! A schema-driven client for the DigitalOcean REST API.
//!
//! Every resource type is a static [`ResourceSchema`]: its endpoint, which
//! fields identify it, which the server owns, which the client may set and
//! which actions it supports. One generic engine turns a schema into lazy
//! attribute loading, CRUD, nested object materialization and action
//! dispatch.
//!
//! ## Features
//!
//! - **Lazy loading**: the first read of an unknown field fetches the object once
//! - **Typed sub-objects**: timestamps, firewall rules, load balancer settings
//!   and embedded resources are materialized on read and serialized back on write
//! - **Actions**: typed action kinds, dispatched per instance or per tag
//! - **Explicit client**: credentials live in a [`Client`] passed to every
//!   resource, never in global state
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use do_resource::resources::Droplet;
//! use do_resource::{Client, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Token from DO_TOKEN
//!     let client = Client::from_env()?;
//!
//!     // Nothing is fetched until a field is read
//!     let mut droplet = Droplet::lookup(&client, 3164444u64);
//!     println!("{:?}", droplet.get("status").await?);
//!
//!     droplet.set("name", "web-2");
//!     droplet.save().await?;
//!     droplet.reboot().await?.wait(&client).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                resources (schema table + wrappers)           │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌──────────────┬──────────────┴──────────────┬─────────────────┐
//! │   resource   │         materialize         │     action      │
//! ├──────────────┼─────────────────────────────┼─────────────────┤
//! │ lazy fetch   │ timestamps, rules, windows  │ typed records   │
//! │ CRUD         │ embedded resources          │ poll / wait     │
//! │ collections  │ serialization               │ bulk by tag     │
//! └──────────────┴─────────────────────────────┴─────────────────┘
//!                               │
//! ┌──────────────────────────────────────────────────────────────┐
//! │      client → http (verbs + status classifier) → auth        │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
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

/// Client configuration
pub mod config;

/// Credential providers
pub mod auth;

/// HTTP verb layer and status classifier
pub mod http;

/// Explicit API context shared by every resource
pub mod client;

/// Resource schemas, endpoint templates and action kinds
pub mod schema;

/// Field materialization and serialization
pub mod materialize;

/// Lazy resource instances and collections
pub mod resource;

/// Server-side action records
pub mod action;

/// Built-in resource table
pub mod resources;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use action::{Action, ActionStatus};
pub use client::Client;
pub use config::ClientConfig;
pub use materialize::{FieldMap, FieldValue};
pub use resource::{ListParams, Resource};
pub use schema::{ActionKind, ActionType, ResourceSchema};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
