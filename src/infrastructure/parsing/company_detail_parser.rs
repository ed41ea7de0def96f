//! Company detail page parser
//!
//! The page title is the structural anchor ("Fortnox Aktiebolag - 556469-6291");
//! everything else is read with the same field extractors the listing uses,
//! applied to the whole document.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use super::config::ParsingConfig;
use super::context::ParseContext;
use super::field_extractors::{FieldExtractor, FieldExtractors};
use super::fragment::{EntryFragment, LabelMatcher, LocatorStrategy, element_text, find_labeled};
use super::ContextualParser;
use crate::domain::company::{CompanyInfo, NOT_AVAILABLE};
use crate::infrastructure::parsing_error::{ScrapeError, ScrapeResult};

static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(.+?)\s+-\s+(\d{6}-\d{4})\b").expect("valid detail title regex"));
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?\d[\d -]{4,}\d").expect("valid phone regex"));
static STATUS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\p{L}][\p{L} ,]*").expect("valid status regex"));

/// Parser for single-company detail pages
pub struct CompanyDetailParser {
    title_selector: Selector,
    description_selector: Selector,
    status_labels: Vec<LabelMatcher>,
    phone_labels: Vec<LabelMatcher>,
    extractors: FieldExtractors,
}

impl CompanyDetailParser {
    pub fn new() -> ScrapeResult<Self> {
        Self::with_config(&ParsingConfig::default())
    }

    pub fn with_config(config: &ParsingConfig) -> ScrapeResult<Self> {
        Ok(Self {
            title_selector: Self::compile("title")?,
            description_selector: Self::compile("meta[name='description']")?,
            status_labels: LabelMatcher::compile_all(&config.labels.status)?,
            phone_labels: LabelMatcher::compile_all(&config.labels.phone)?,
            extractors: FieldExtractors::new(config)?,
        })
    }

    fn compile(selector: &str) -> ScrapeResult<Selector> {
        Selector::parse(selector).map_err(|e| ScrapeError::invalid_selector(selector, &e.to_string()))
    }

    /// Company name and org number from "<name> - <NNNNNN-NNNN>"
    pub fn parse_title(title: &str) -> Option<(String, String)> {
        TITLE_RE
            .captures(title)
            .map(|caps| (caps[1].trim().to_string(), caps[2].to_string()))
    }

    fn parse_status(text: &str) -> Option<String> {
        STATUS_RE
            .find(text)
            .map(|found| found.as_str().trim().trim_end_matches(',').to_string())
            .filter(|status| !status.is_empty())
    }

    fn parse_phone(text: &str) -> Option<String> {
        PHONE_RE.find(text).map(|found| found.as_str().trim().to_string())
    }

    fn description(&self, document: &Html) -> Option<String> {
        document
            .select(&self.description_selector)
            .find_map(|meta| meta.value().attr("content"))
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
    }
}

impl ContextualParser for CompanyDetailParser {
    type Output = CompanyInfo;
    type Context = ParseContext;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ScrapeResult<Self::Output> {
        let title = html
            .select(&self.title_selector)
            .next()
            .map(|t| element_text(&t))
            .unwrap_or_default();

        let (name, org_number) = Self::parse_title(&title).ok_or_else(|| {
            ScrapeError::parse_failure(
                &format!("page title '{title}' does not name a company and org number"),
                Some(&context.page_url),
            )
        })?;
        debug!("Parsing detail page for {} ({})", name, org_number);

        let fragment = EntryFragment::new(html.root_element(), LocatorStrategy::Document);

        Ok(CompanyInfo {
            name,
            org_number,
            location: self
                .extractors
                .location
                .extract(&fragment, context)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            status: find_labeled(&fragment, &self.status_labels, Self::parse_status)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            revenue: self.extractors.revenue.extract(&fragment, context).map(|r| r.amount),
            employees: self.extractors.employees.extract(&fragment, context),
            description: self.description(html),
            phone: find_labeled(&fragment, &self.phone_labels, Self::parse_phone),
            industry: self.extractors.industry.extract(&fragment, context),
        })
    }
}
