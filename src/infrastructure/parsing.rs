//! HTML parsing for registry pages
//!
//! Listing and detail parsers share one table of per-field extractors that
//! work on entry fragments, so a layout change is patched in one extractor.

pub mod company_detail_parser;
pub mod company_list_parser;
pub mod config;
pub mod context;
pub mod field_extractors;
pub mod fragment;
pub mod structured_payload;

pub use company_detail_parser::CompanyDetailParser;
pub use company_list_parser::{CompanyListParser, EntrySource, ListingPage};
pub use config::ParsingConfig;
pub use context::ParseContext;
pub use field_extractors::{Field, FieldExtractor, FieldExtractors};
pub use fragment::{EntryFragment, LocatorStrategy};

use scraper::Html;

use crate::infrastructure::parsing_error::ScrapeResult;

/// Parser over an already loaded document with per-call context
pub trait ContextualParser {
    type Output;
    type Context;

    /// Parse HTML with contextual information
    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ScrapeResult<Self::Output>;

    /// Load the raw HTML and parse it
    fn parse_str(&self, html: &str, context: &Self::Context) -> ScrapeResult<Self::Output> {
        let document = Html::parse_document(html);
        self.parse_with_context(&document, context)
    }
}
