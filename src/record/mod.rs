//! Canonical paper record schema and deduplicating assembly.
//!
//! [`assemble`] validates and normalizes extracted fields into a
//! [`PaperRecord`]. The canonical link is the record's identity: assembly
//! fails without one, and a [`RunContext`] passed explicitly through one
//! pipeline run (never ambient global state) deduplicates repeated links,
//! keeping the first occurrence.

mod error;

pub use error::AssemblyError;

use std::collections::{BTreeSet, HashSet};

use serde::{Serialize, Serializer};
use tracing::{debug, instrument};
use url::Url;

use crate::extract::ExtractedFields;

/// Title used when no title landmark was found; records never carry a null
/// title.
pub const UNTITLED: &str = "Untitled";

/// The canonical paper entity handed to external consumers.
///
/// Serializes flat (authors joined with `; `, subjects with `, `) so a CSV
/// row matches the columns the presentation layer expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaperRecord {
    /// Paper title, `"Untitled"` when absent.
    pub title: String,
    /// Authors in authorship order, possibly empty.
    #[serde(serialize_with = "join_semicolon")]
    pub authors: Vec<String>,
    /// Subject tags, unordered, possibly empty.
    #[serde(serialize_with = "join_comma")]
    pub subjects: BTreeSet<String>,
    /// Canonical link: non-empty, syntactically a URL, unique per run.
    pub link: String,
    /// Host the record was crawled from.
    pub source_host: String,
}

fn join_semicolon<S: Serializer>(v: &[String], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&v.join("; "))
}

fn join_comma<S: Serializer>(v: &BTreeSet<String>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&v.iter().cloned().collect::<Vec<_>>().join(", "))
}

/// Per-run assembly state: the set of links already assembled.
///
/// Created fresh for each pipeline run so repeated runs and concurrent
/// pipelines stay independent.
#[derive(Debug, Default)]
pub struct RunContext {
    seen_links: HashSet<String>,
}

impl RunContext {
    /// Creates an empty run context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct links assembled so far.
    #[must_use]
    pub fn seen_count(&self) -> usize {
        self.seen_links.len()
    }
}

/// Assembles extracted fields into a canonical record.
///
/// Missing title defaults to [`UNTITLED`]; missing authors and subjects
/// become empty collections. Relative links are resolved against
/// `page_url`. Returns `Ok(None)` when the link was already assembled in
/// this run (first occurrence kept).
///
/// # Errors
///
/// [`AssemblyError::MissingLink`] if and only if no link was extracted;
/// [`AssemblyError::InvalidLink`] when the extracted link is not a URL even
/// after resolution against the page.
#[instrument(skip(fields, ctx), fields(page_url = %page_url))]
pub fn assemble(
    fields: ExtractedFields,
    page_url: &str,
    ctx: &mut RunContext,
) -> Result<Option<PaperRecord>, AssemblyError> {
    let Some(raw_link) = fields.link else {
        return Err(AssemblyError::missing_link(page_url));
    };
    let link = resolve_link(&raw_link, page_url)
        .ok_or_else(|| AssemblyError::invalid_link(page_url, &raw_link))?;

    if !ctx.seen_links.insert(link.as_str().to_string()) {
        debug!(link = %link, "duplicate link; keeping first occurrence");
        return Ok(None);
    }

    let source_host = Url::parse(page_url)
        .ok()
        .and_then(|u| u.host_str().map(ToString::to_string))
        .or_else(|| link.host_str().map(ToString::to_string))
        .unwrap_or_default();

    Ok(Some(PaperRecord {
        title: fields.title.unwrap_or_else(|| UNTITLED.to_string()),
        authors: fields.authors.unwrap_or_default(),
        subjects: fields.subjects.unwrap_or_default().into_iter().collect(),
        link: link.into(),
        source_host,
    }))
}

/// Parses the extracted link, resolving relative links against the page URL.
fn resolve_link(raw: &str, page_url: &str) -> Option<Url> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(url) = Url::parse(raw) {
        return Some(url);
    }
    Url::parse(page_url).ok()?.join(raw).ok()
}
