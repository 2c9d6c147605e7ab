//! Best-effort metadata extraction from fetched markup.
//!
//! The extractor scans a parsed HTML tree for structural landmarks: citation
//! meta tags, dedicated metadata containers, heading and anchor elements.
//! Each field has a prioritized list of independent matcher functions, most
//! specific first; the first hit wins. Extraction is total: it never fails,
//! and any field it cannot locate is simply absent from the result.
//!
//! Adding a heuristic is a pure extension: append a matcher to the relevant
//! list and test it in isolation.

mod text;

pub use text::{dedup_preserve_order, normalize_ws, split_delimited, strip_label};

use scraper::{Html, Selector};
use tracing::instrument;

use crate::fetch::RawPage;

/// Fields recovered from one page. Any field may be absent.
///
/// `authors` preserves authorship order; `subjects` keeps extraction order
/// here and becomes an unordered set at assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    /// Paper title.
    pub title: Option<String>,
    /// Ordered author list, deduplicated.
    pub authors: Option<Vec<String>>,
    /// Subject tags.
    pub subjects: Option<Vec<String>>,
    /// Canonical self-link.
    pub link: Option<String>,
}

type ScalarMatcher = fn(&Html) -> Option<String>;
type ListMatcher = fn(&Html) -> Option<Vec<String>>;

/// Title landmarks, most specific first.
const TITLE_MATCHERS: &[ScalarMatcher] = &[
    title_from_citation_meta,
    title_from_title_container,
    title_from_listing_container,
    title_from_heading,
    title_from_document_title,
];

/// Author landmarks, most specific first.
const AUTHOR_MATCHERS: &[ListMatcher] = &[
    authors_from_citation_meta,
    authors_from_container_anchors,
    authors_from_container_text,
];

/// Subject landmarks, most specific first.
const SUBJECT_MATCHERS: &[ListMatcher] = &[
    subjects_from_citation_meta,
    subjects_from_table_cell,
    subjects_from_listing_container,
    subjects_from_primary_tag,
];

/// Canonical-link landmarks, most specific first.
const LINK_MATCHERS: &[ScalarMatcher] = &[
    link_from_canonical_rel,
    link_from_citation_meta,
    link_from_identifier_anchor,
    link_from_abstract_anchor,
];

/// Extracts structured fields from a fetched page.
///
/// Never fails: malformed or empty markup yields a result with zero or more
/// recognized fields.
#[must_use]
#[instrument(skip(page), fields(url = %page.url, bytes = page.body.len()))]
pub fn extract(page: &RawPage) -> ExtractedFields {
    extract_from_markup(&page.body)
}

/// Extraction over a raw markup string, for callers that already own a body.
#[must_use]
pub fn extract_from_markup(body: &str) -> ExtractedFields {
    let doc = Html::parse_document(body);
    ExtractedFields {
        title: first_scalar(&doc, TITLE_MATCHERS),
        authors: first_list(&doc, AUTHOR_MATCHERS).map(dedup_preserve_order),
        subjects: first_list(&doc, SUBJECT_MATCHERS).map(dedup_preserve_order),
        link: first_scalar(&doc, LINK_MATCHERS),
    }
}

fn first_scalar(doc: &Html, matchers: &[ScalarMatcher]) -> Option<String> {
    matchers.iter().find_map(|m| m(doc))
}

fn first_list(doc: &Html, matchers: &[ListMatcher]) -> Option<Vec<String>> {
    matchers.iter().find_map(|m| m(doc))
}

/// Normalized text content of the first element matching `css`.
fn container_text(doc: &Html, css: &str) -> Option<String> {
    let sel = Selector::parse(css).ok()?;
    let el = doc.select(&sel).next()?;
    let joined = el.text().collect::<Vec<_>>().join(" ");
    let normalized = normalize_ws(&joined);
    (!normalized.is_empty()).then_some(normalized)
}

/// Normalized attribute value of the first element matching `css`.
fn attr_value(doc: &Html, css: &str, attr: &str) -> Option<String> {
    let sel = Selector::parse(css).ok()?;
    let el = doc.select(&sel).next()?;
    let value = normalize_ws(el.value().attr(attr)?);
    (!value.is_empty()).then_some(value)
}

/// Normalized text of every element matching `css`, empties dropped.
fn all_texts(doc: &Html, css: &str) -> Option<Vec<String>> {
    let sel = Selector::parse(css).ok()?;
    let values: Vec<String> = doc
        .select(&sel)
        .map(|el| normalize_ws(&el.text().collect::<Vec<_>>().join(" ")))
        .filter(|v| !v.is_empty())
        .collect();
    (!values.is_empty()).then_some(values)
}

/// Normalized attribute of every element matching `css`, empties dropped.
fn all_attrs(doc: &Html, css: &str, attr: &str) -> Option<Vec<String>> {
    let sel = Selector::parse(css).ok()?;
    let values: Vec<String> = doc
        .select(&sel)
        .filter_map(|el| el.value().attr(attr))
        .map(normalize_ws)
        .filter(|v| !v.is_empty())
        .collect();
    (!values.is_empty()).then_some(values)
}

// --- title ---

fn title_from_citation_meta(doc: &Html) -> Option<String> {
    attr_value(doc, r#"meta[name="citation_title"]"#, "content")
}

fn title_from_title_container(doc: &Html) -> Option<String> {
    container_text(doc, "h1.title, .title").map(|t| strip_label(&t, "title"))
}

fn title_from_listing_container(doc: &Html) -> Option<String> {
    container_text(doc, ".list-title").map(|t| strip_label(&t, "title"))
}

fn title_from_heading(doc: &Html) -> Option<String> {
    container_text(doc, "h1")
}

fn title_from_document_title(doc: &Html) -> Option<String> {
    container_text(doc, "title")
}

// --- authors ---

fn authors_from_citation_meta(doc: &Html) -> Option<Vec<String>> {
    all_attrs(doc, r#"meta[name="citation_author"]"#, "content")
}

fn authors_from_container_anchors(doc: &Html) -> Option<Vec<String>> {
    all_texts(doc, ".authors a, .list-authors a")
}

fn authors_from_container_text(doc: &Html) -> Option<Vec<String>> {
    let raw = container_text(doc, ".authors, .list-authors")?;
    let values = split_delimited(&strip_label(&raw, "authors"));
    (!values.is_empty()).then_some(values)
}

// --- subjects ---

fn subjects_from_citation_meta(doc: &Html) -> Option<Vec<String>> {
    let raw = attr_value(doc, r#"meta[name="citation_keywords"]"#, "content")?;
    let values = split_delimited(&raw);
    (!values.is_empty()).then_some(values)
}

fn subjects_from_table_cell(doc: &Html) -> Option<Vec<String>> {
    let raw = container_text(doc, ".tablecell.subjects")?;
    let values = split_delimited(&strip_label(&raw, "subjects"));
    (!values.is_empty()).then_some(values)
}

fn subjects_from_listing_container(doc: &Html) -> Option<Vec<String>> {
    let raw = container_text(doc, ".list-subjects")?;
    let values = split_delimited(&strip_label(&raw, "subjects"));
    (!values.is_empty()).then_some(values)
}

fn subjects_from_primary_tag(doc: &Html) -> Option<Vec<String>> {
    all_texts(doc, ".primary-subject")
}

// --- canonical link ---

fn link_from_canonical_rel(doc: &Html) -> Option<String> {
    attr_value(doc, r#"link[rel="canonical"]"#, "href")
}

fn link_from_citation_meta(doc: &Html) -> Option<String> {
    attr_value(doc, r#"meta[name="citation_abstract_html_url"]"#, "content")
}

fn link_from_identifier_anchor(doc: &Html) -> Option<String> {
    attr_value(doc, ".list-identifier a[href]", "href")
}

fn link_from_abstract_anchor(doc: &Html) -> Option<String> {
    attr_value(doc, r#"a[title="Abstract"]"#, "href")
}
