//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use harvester_core::fetch::{DEFAULT_BACKOFF_MS, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS};

/// Crawl academic paper listings and extract structured metadata.
///
/// Harvester checks each target against the host's robots.txt, fetches the
/// page, extracts title/authors/subjects/link, and writes the deduplicated
/// records as CSV.
#[derive(Parser, Debug)]
#[command(name = "harvester")]
#[command(author, version, about)]
pub struct Args {
    /// Target URLs to crawl (reads stdin when omitted)
    pub urls: Vec<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Agent string for robots checks and fetches (defaults to the tool UA)
    #[arg(short, long)]
    pub agent: Option<String>,

    /// Per-page fetch timeout in seconds (1-300)
    #[arg(short = 't', long, default_value_t = DEFAULT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=300))]
    pub timeout: u64,

    /// Maximum retry attempts for transient failures (0-10)
    #[arg(short = 'r', long, default_value_t = DEFAULT_MAX_RETRIES, value_parser = clap::value_parser!(u32).range(0..=10))]
    pub max_retries: u32,

    /// Fixed backoff between retries in milliseconds (0-60000)
    #[arg(short = 'b', long, default_value_t = DEFAULT_BACKOFF_MS, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub backoff: u64,

    /// Write CSV records to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
