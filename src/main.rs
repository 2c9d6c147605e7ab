//! CLI entry point for the harvester tool.
//!
//! Thin consumer of the crawl pipeline: parses targets, runs the pipeline,
//! writes the assembled records as CSV, and logs the outcome summary.

use std::io::{self, IsTerminal, Read, Write};
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use harvester_core::fetch::RetryPolicy;
use harvester_core::pipeline::{CrawlPipeline, CrawlTarget, Outcome, PipelineConfig};
use harvester_core::{record::PaperRecord, user_agent};
use tracing::{debug, info, warn};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");
    info!("Harvester starting");

    // Read input: from positional args or stdin
    let urls: Vec<String> = if args.urls.is_empty() {
        if io::stdin().is_terminal() {
            info!("No input provided. Pipe URLs via stdin or pass as arguments.");
            info!("Example: echo 'https://arxiv.org/list/cs.CL/recent' | harvester");
            return Ok(());
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(ToString::to_string)
            .collect()
    } else {
        args.urls.clone()
    };

    if urls.is_empty() {
        info!("No target URLs found in input");
        return Ok(());
    }

    let agent = args.agent.unwrap_or_else(user_agent::default_user_agent);
    let targets: Vec<CrawlTarget> = urls
        .iter()
        .map(|url| CrawlTarget::new(url, &agent))
        .collect();
    info!(targets = targets.len(), agent = %agent, "Targets parsed");

    let config = PipelineConfig {
        timeout: Duration::from_secs(args.timeout),
        retry: RetryPolicy::new(args.max_retries, Duration::from_millis(args.backoff)),
    };
    let pipeline = CrawlPipeline::new(&config);

    // Stop between targets on Ctrl-C; in-flight fetches finish naturally.
    let stop = pipeline.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; finishing current target");
            stop.store(true, std::sync::atomic::Ordering::SeqCst);
        }
    });

    let report = pipeline.run(&targets).await;

    match &args.output {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            write_csv(file, &report.records)?;
            info!(path = %path.display(), records = report.records.len(), "Records written");
        }
        None => {
            let stdout = io::stdout().lock();
            write_csv(stdout, &report.records)?;
        }
    }

    info!(
        crawled = report.count(Outcome::Crawled),
        policy_skipped = report.count(Outcome::PolicySkipped),
        fetch_failed = report.count(Outcome::FetchFailed),
        assembly_skipped = report.count(Outcome::AssemblySkipped),
        "Done"
    );
    Ok(())
}

/// Writes records as CSV rows: title, authors, subjects, link, source_host.
fn write_csv<W: Write>(writer: W, records: &[PaperRecord]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}
