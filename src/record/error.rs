//! Error types for record assembly.

use thiserror::Error;

/// Errors that can occur while assembling a paper record.
///
/// Assembly is the one hard rejection point in the pipeline: a record
/// without a canonical link has no identity, so it cannot be deduplicated or
/// displayed. Every other missing field gets a documented default instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssemblyError {
    /// No link field was extracted from the page.
    #[error("no canonical link extracted from {page_url}")]
    MissingLink {
        /// The page the fields came from.
        page_url: String,
    },

    /// The extracted link is not a syntactically valid URL, even after
    /// resolving it against the page URL.
    #[error("extracted link {link:?} from {page_url} is not a valid URL")]
    InvalidLink {
        /// The page the fields came from.
        page_url: String,
        /// The raw extracted link value.
        link: String,
    },
}

impl AssemblyError {
    /// Creates a missing-link error.
    pub fn missing_link(page_url: impl Into<String>) -> Self {
        Self::MissingLink {
            page_url: page_url.into(),
        }
    }

    /// Creates an invalid-link error.
    pub fn invalid_link(page_url: impl Into<String>, link: impl Into<String>) -> Self {
        Self::InvalidLink {
            page_url: page_url.into(),
            link: link.into(),
        }
    }
}
