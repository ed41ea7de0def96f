//! Company list parser for segmentation and free-text result pages
//!
//! Locates one fragment per company (marker cards first, company-linking
//! headings as fallback), reads the population size from the result heading
//! and runs the field extractors over each fragment. An embedded structured
//! payload, when present, drives the entry list instead.

use std::collections::HashMap;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::config::ParsingConfig;
use super::context::ParseContext;
use super::field_extractors::{FieldExtractor, FieldExtractors, is_company_link};
use super::fragment::{EntryFragment, LocatorStrategy, element_text};
use super::structured_payload::StructuredPayloadReader;
use super::ContextualParser;
use crate::domain::company::CompanyEntry;
use crate::infrastructure::parsing_error::{ScrapeError, ScrapeResult};

/// Where the entries of a listing page came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySource {
    /// Embedded JSON payload, DOM used only to fill gaps
    StructuredPayload,
    /// DOM fragments found by the given locator strategy
    Dom(LocatorStrategy),
    /// Nothing located
    Empty,
}

/// One parsed listing page
#[derive(Debug, Clone)]
pub struct ListingPage {
    pub entries: Vec<CompanyEntry>,
    /// Population size from the result heading, independent of `entries`
    pub total_count: u64,
    pub source: EntrySource,
}

/// Parser for company listing pages
pub struct CompanyListParser {
    card_selectors: Vec<Selector>,
    heading_selector: Selector,
    total_count_selector: Selector,
    total_count_pattern: Regex,
    promotional_headings: Vec<String>,
    company_path_segment: String,
    payload_reader: StructuredPayloadReader,
    extractors: FieldExtractors,
}

impl CompanyListParser {
    /// Create a parser with the default site configuration
    pub fn new() -> ScrapeResult<Self> {
        Self::with_config(&ParsingConfig::default())
    }

    /// Create a parser with custom labels and selectors
    pub fn with_config(config: &ParsingConfig) -> ScrapeResult<Self> {
        let selectors = &config.listing_selectors;
        let total_count_pattern = Regex::new(&format!(
            r"(?i)(\d[\d ]*)\s*{}",
            regex::escape(&config.total_count_noun)
        ))
        .map_err(|e| ScrapeError::invalid_selector(&config.total_count_noun, &e.to_string()))?;

        Ok(Self {
            card_selectors: Self::compile_selectors(&selectors.entry_card)?,
            heading_selector: Self::compile_selector(&selectors.entry_heading)?,
            total_count_selector: Self::compile_selector(&selectors.total_count_heading)?,
            total_count_pattern,
            promotional_headings: config.promotional_headings.clone(),
            company_path_segment: config.company_path_segment.clone(),
            payload_reader: StructuredPayloadReader::new(&selectors.payload_script)?,
            extractors: FieldExtractors::new(config)?,
        })
    }

    fn compile_selector(selector: &str) -> ScrapeResult<Selector> {
        Selector::parse(selector).map_err(|e| ScrapeError::invalid_selector(selector, &e.to_string()))
    }

    /// Compile selector strings, skipping broken ones as long as one survives
    fn compile_selectors(selector_strings: &[String]) -> ScrapeResult<Vec<Selector>> {
        let mut selectors = Vec::new();
        let mut errors = Vec::new();

        for selector_str in selector_strings {
            match Selector::parse(selector_str) {
                Ok(selector) => selectors.push(selector),
                Err(e) => {
                    warn!("Failed to compile selector '{}': {}", selector_str, e);
                    errors.push(format!("'{selector_str}': {e}"));
                }
            }
        }

        if selectors.is_empty() && !selector_strings.is_empty() {
            return Err(ScrapeError::invalid_selector(
                &selector_strings.join(", "),
                &errors.join(", "),
            ));
        }

        Ok(selectors)
    }

    /// The shared extractor table
    pub fn extractors(&self) -> &FieldExtractors {
        &self.extractors
    }

    /// Population size from the first heading reading like "13 170 företag"; 0 when absent
    pub fn extract_total_count(&self, document: &Html) -> u64 {
        document
            .select(&self.total_count_selector)
            .find_map(|heading| {
                let text = element_text(&heading);
                let caps = self.total_count_pattern.captures(&text)?;
                caps[1].replace(' ', "").parse::<u64>().ok()
            })
            .unwrap_or(0)
    }

    /// One fragment per company, in document order
    pub fn locate_entries<'a>(&self, document: &'a Html) -> Vec<EntryFragment<'a>> {
        for selector in &self.card_selectors {
            let cards: Vec<EntryFragment<'a>> = document
                .select(selector)
                .map(|card| {
                    let fragment = EntryFragment::new(card, LocatorStrategy::MarkerCard);
                    match card.select(&self.heading_selector).find(|h| self.company_heading_link(h)) {
                        Some(heading) => fragment.with_heading(heading),
                        None => fragment,
                    }
                })
                .collect();
            if !cards.is_empty() {
                debug!("Located {} entry cards", cards.len());
                return cards;
            }
        }

        let headings: Vec<ElementRef<'a>> = document
            .select(&self.heading_selector)
            .filter(|heading| self.company_heading_link(heading))
            .filter(|heading| !self.is_promotional(heading))
            .collect();

        let mut per_parent: HashMap<_, usize> = HashMap::new();
        for heading in &headings {
            if let Some(parent) = heading.parent() {
                *per_parent.entry(parent.id()).or_default() += 1;
            }
        }

        let fragments: Vec<EntryFragment<'a>> = headings
            .into_iter()
            .map(|heading| {
                // A parent holding several company headings is the list itself, not an entry
                let container = heading
                    .parent()
                    .filter(|parent| per_parent.get(&parent.id()) == Some(&1))
                    .and_then(ElementRef::wrap)
                    .unwrap_or(heading);
                EntryFragment::new(container, LocatorStrategy::CompanyHeading).with_heading(heading)
            })
            .collect();

        debug!("Located {} company headings", fragments.len());
        fragments
    }

    fn company_heading_link(&self, heading: &ElementRef<'_>) -> bool {
        EntryFragment::new(*heading, LocatorStrategy::CompanyHeading)
            .links()
            .any(|(_, href)| is_company_link(href, &self.company_path_segment))
    }

    fn is_promotional(&self, heading: &ElementRef<'_>) -> bool {
        let text = element_text(heading).to_lowercase();
        self.promotional_headings.iter().any(|promo| text.contains(promo.as_str()))
    }

    fn entries_from_dom(&self, fragments: &[EntryFragment<'_>], context: &ParseContext) -> Vec<CompanyEntry> {
        fragments
            .iter()
            .filter_map(|fragment| self.extractors.extract_entry(fragment, context))
            .collect()
    }

    fn entries_from_payload(
        &self,
        companies: &[super::structured_payload::PayloadCompany],
        fragments: &[EntryFragment<'_>],
        context: &ParseContext,
    ) -> Vec<CompanyEntry> {
        let fragment_org_digits: Vec<Option<String>> = fragments
            .iter()
            .map(|fragment| {
                self.extractors
                    .org_number
                    .extract(fragment, context)
                    .map(|org| org.chars().filter(char::is_ascii_digit).collect())
            })
            .collect();
        let aligned = fragments.len() == companies.len();

        companies
            .iter()
            .enumerate()
            .filter_map(|(index, company)| {
                let mut entry = company.to_entry(context);

                let matched = entry
                    .org_number_digits()
                    .and_then(|digits| {
                        fragment_org_digits
                            .iter()
                            .position(|candidate| candidate.as_deref() == Some(digits.as_str()))
                    })
                    .or_else(|| aligned.then_some(index));

                if let Some(fragment) = matched.and_then(|i| fragments.get(i)) {
                    self.extractors.fill_missing(&mut entry, fragment, context);
                }

                (!entry.name.is_empty() || !entry.link.is_empty()).then_some(entry)
            })
            .collect()
    }
}

impl ContextualParser for CompanyListParser {
    type Output = ListingPage;
    type Context = ParseContext;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ScrapeResult<Self::Output> {
        debug!("Parsing company listing {}", context.page_url);

        let total_count = self.extract_total_count(html);
        let fragments = self.locate_entries(html);

        if let Some(companies) = self.payload_reader.read(html) {
            let entries = self.entries_from_payload(&companies, &fragments, context);
            return Ok(ListingPage {
                entries,
                total_count,
                source: EntrySource::StructuredPayload,
            });
        }

        let source = fragments
            .first()
            .map(|fragment| EntrySource::Dom(fragment.strategy))
            .unwrap_or(EntrySource::Empty);
        let entries = self.entries_from_dom(&fragments, context);

        debug!(
            "Extracted {} entries from {} fragments (total count {})",
            entries.len(),
            fragments.len(),
            total_count
        );

        Ok(ListingPage {
            entries,
            total_count,
            source,
        })
    }
}
