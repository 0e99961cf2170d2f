//! CLI commands and argument parsing

use crate::types::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// bucket-pager CLI
#[derive(Parser, Debug)]
#[command(name = "bucket-pager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Listing job file (YAML)
    #[arg(short, long, global = true)]
    pub job: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (overrides --verbose)
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Effective log level
    pub fn log_level(&self) -> tracing::Level {
        match (self.log_level, self.verbose) {
            (Some(level), _) => level.into(),
            (None, true) => tracing::Level::DEBUG,
            (None, false) => tracing::Level::INFO,
        }
    }
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every item of a paginated listing
    List(ListArgs),

    /// List the paginators a store supports
    Paginators {
        /// Store location (s3, r2, gs, az, or a local directory)
        #[arg(long)]
        store: Option<String>,
    },

    /// Validate the job file
    Validate,
}

/// Arguments of the `list` command; each one overrides the job file
#[derive(clap::Args, Debug, Default, Clone)]
pub struct ListArgs {
    /// Store location (s3, r2, gs, az, or a local directory)
    #[arg(long)]
    pub store: Option<String>,

    /// Region for S3 and R2 stores (defaults to AWS_REGION)
    #[arg(long)]
    pub region: Option<String>,

    /// Bucket to list
    #[arg(short, long)]
    pub bucket: Option<String>,

    /// Only list keys under this prefix
    #[arg(long)]
    pub prefix: Option<String>,

    /// Paginator name
    #[arg(long)]
    pub paginator: Option<String>,

    /// Key holding the item list in each page
    #[arg(short, long)]
    pub key: Option<String>,

    /// Extra operation parameter as KEY=VALUE (VALUE parsed as JSON when possible)
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Stop after this many items
    #[arg(long)]
    pub max_items: Option<u64>,

    /// Items requested per page
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Resume token from a previous run
    #[arg(long)]
    pub starting_token: Option<String>,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one item per line)
    Json,
    /// Indented JSON
    Pretty,
}
