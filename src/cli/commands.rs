//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Inspect and manage DigitalOcean resources
#[derive(Parser, Debug)]
#[command(name = "do-resource")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// API token (defaults to DO_TOKEN)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// API base URL (defaults to DO_API_URL, then the public API)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Client configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch one resource
    Get {
        /// Resource kind or plural name, e.g. `droplet`
        kind: String,

        /// Identifier; omit for account, balance and registry
        id: Option<String>,

        /// Parent identifiers for nested kinds, outermost first
        #[arg(long = "parent")]
        parents: Vec<String>,
    },

    /// List one page of a collection
    List {
        /// Resource kind or plural name
        kind: String,

        /// Page number
        #[arg(long, default_value = "1")]
        page: u32,

        /// Page size
        #[arg(long, default_value = "20")]
        per_page: u32,

        /// Only instances carrying this tag
        #[arg(long)]
        tag: Option<String>,

        /// Parent identifiers for nested kinds, outermost first
        #[arg(long = "parent")]
        parents: Vec<String>,
    },

    /// Delete one resource
    Delete {
        /// Resource kind or plural name
        kind: String,

        /// Value of the kind's delete field
        id: String,

        /// Parent identifiers for nested kinds, outermost first
        #[arg(long = "parent")]
        parents: Vec<String>,
    },

    /// Show an action by id
    Action {
        /// Action id
        id: u64,

        /// Poll until the action completes or errors
        #[arg(long)]
        wait: bool,
    },

    /// List known resource kinds
    Kinds,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One JSON document per line
    Json,
    /// Indented JSON
    Pretty,
}
