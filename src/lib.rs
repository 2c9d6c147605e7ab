//! Harvester Core Library
//!
//! This library provides the crawl-and-extract pipeline for harvesting
//! publicly listed academic paper records: robots-policy evaluation, page
//! retrieval, structured-field extraction from markup, and assembly into a
//! uniform record schema.
//!
//! # Architecture
//!
//! The library is organized into the following modules, leaf-first:
//! - [`policy`] - robots.txt fetching, parsing, and per-host decision cache
//! - [`fetch`] - bounded-timeout page retrieval with fixed-backoff retry
//! - [`extract`] - best-effort metadata extraction from parsed HTML
//! - [`record`] - canonical paper record schema and deduplicating assembly
//! - [`pipeline`] - orchestration over a target list with an outcome log
//!
//! The terminal artifact is a collection of [`record::PaperRecord`] values
//! plus a per-target outcome log; persistence and presentation are left to
//! external consumers.

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod extract;
pub mod fetch;
pub mod pipeline;
pub mod policy;
pub mod record;
pub mod user_agent;

// Re-export commonly used types
pub use extract::{ExtractedFields, extract};
pub use fetch::{
    DEFAULT_BACKOFF_MS, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS, FetchError, HttpClient,
    PageFetcher, RawPage, RetryPolicy,
};
pub use pipeline::{CrawlPipeline, CrawlReport, CrawlTarget, Outcome, PipelineConfig, TargetOutcome};
pub use policy::{PolicyChecker, PolicyDecision};
pub use record::{AssemblyError, PaperRecord, RunContext, assemble};
