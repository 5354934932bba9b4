//! CLI module
//!
//! Command-line front end over the resource table.
//!
//! # Commands
//!
//! - `get` - Fetch one resource by kind and id
//! - `list` - List one page of a collection
//! - `delete` - Delete one resource
//! - `action` - Show (and optionally wait for) an action
//! - `kinds` - List known resource kinds

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
