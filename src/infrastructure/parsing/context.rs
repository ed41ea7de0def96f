//! Parsing context for HTML extraction
//!
//! Per-call information the extractors need besides the document itself.

use crate::infrastructure::config::allabolag;

/// Context information for parsing operations
#[derive(Debug, Clone)]
pub struct ParseContext {
    /// URL the document was fetched from
    pub page_url: String,

    /// Site origin for resolving relative links
    pub base_url: String,

    /// Location the caller searched for, already normalised
    pub requested_location: Option<String>,
}

impl ParseContext {
    /// Create new parse context
    pub fn new(page_url: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            page_url: page_url.into(),
            base_url: base_url.into(),
            requested_location: None,
        }
    }

    /// Context for a page on the default site
    pub fn for_page(page_url: impl Into<String>) -> Self {
        Self::new(page_url, allabolag::BASE_URL)
    }

    /// Set the caller-supplied location, which takes precedence over scraped ones
    pub fn with_requested_location(mut self, location: Option<String>) -> Self {
        self.requested_location = location.filter(|l| !l.trim().is_empty());
        self
    }
}
