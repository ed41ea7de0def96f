//! Per-field extractors for company entry fragments
//!
//! Each extractor turns one fragment into an optional typed value. A missing
//! label, an unparsable value or an unexpected layout yields `None`; it never
//! fails the page. Layout changes are patched in one extractor, not in the
//! pipeline.

use std::collections::HashSet;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;
use tracing::debug;
use url::Url;

use super::config::ParsingConfig;
use super::context::ParseContext;
use super::fragment::{
    EntryFragment, LabelMatcher, element_text, find_labeled, labeled_candidates, normalize_text,
};
use crate::domain::company::{CompanyEntry, FinancialFigure, NOT_AVAILABLE};
use crate::infrastructure::parsing_error::ScrapeResult;

static ORG_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+-\d+").expect("valid org number regex"));
static ORG_NUMBER_STRICT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{6}-\d{4}$").expect("valid strict org number regex"));
static ORG_NUMBER_DIGITS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{6})(\d{4})\b").expect("valid org number digits regex"));
static POSTAL_ADDRESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{3} ?\d{2} +(\p{L}[\p{L} \-]*)$").expect("valid postal address regex")
});
static LEADING_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\(?((?:19|20)\d{2})\)?[ :]*").expect("valid leading year regex"));
static TRAILING_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(((?:19|20)\d{2})\)").expect("valid trailing year regex"));
static AMOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<sign>[-−–])? ?(?P<number>\d{1,3}(?: \d{3})+|\d+)(?: \d)?").expect("valid amount regex")
});
static COUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<number>\d{1,3}(?: \d{3})+|\d+)(?P<range> ?[-–] ?\d)?").expect("valid count regex")
});
static ISO_DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("valid iso date regex"));
static DOTTED_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{2}\.\d{2}\.\d{4}").expect("valid dotted date regex"));
static LEGACY_COMPANY_PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:https?://[^/]+)?/\d{10}(?:[/?#]|$)").expect("valid legacy path regex"));

/// Company entry fields, the key of the extractor table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Link,
    OrgNumber,
    Location,
    Employees,
    Revenue,
    Profit,
    RegistrationDate,
    Industry,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Name,
        Field::Link,
        Field::OrgNumber,
        Field::Location,
        Field::Employees,
        Field::Revenue,
        Field::Profit,
        Field::RegistrationDate,
        Field::Industry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Link => "link",
            Self::OrgNumber => "orgNumber",
            Self::Location => "location",
            Self::Employees => "employees",
            Self::Revenue => "revenue",
            Self::Profit => "profit",
            Self::RegistrationDate => "registrationDate",
            Self::Industry => "industry",
        }
    }
}

/// Given an entry fragment, produce an optional typed value
pub trait FieldExtractor {
    type Value;

    fn field(&self) -> Field;

    fn extract(&self, fragment: &EntryFragment<'_>, context: &ParseContext) -> Option<Self::Value>;
}

/// Whether an href points at a company detail page
pub fn is_company_link(href: &str, company_path_segment: &str) -> bool {
    href.contains(company_path_segment) || LEGACY_COMPANY_PATH_RE.is_match(href)
}

/// Resolve a possibly relative href against the site origin
pub fn resolve_link(href: &str, base_url: &str) -> Option<String> {
    let base = Url::parse(base_url).ok()?;
    base.join(href.trim()).ok().map(String::from)
}

fn company_link<'a>(fragment: &EntryFragment<'a>, company_path_segment: &str) -> Option<(ElementRef<'a>, &'a str)> {
    let heading_link = fragment.heading.and_then(|heading| {
        EntryFragment::new(heading, fragment.strategy)
            .links()
            .find(|(_, href)| is_company_link(href, company_path_segment))
    });
    heading_link.or_else(|| {
        fragment
            .links()
            .find(|(_, href)| is_company_link(href, company_path_segment))
    })
}

/// Company name: anchoring heading, else first heading in the fragment, else the company link text
pub struct NameExtractor {
    company_path_segment: String,
}

impl FieldExtractor for NameExtractor {
    type Value = String;

    fn field(&self) -> Field {
        Field::Name
    }

    fn extract(&self, fragment: &EntryFragment<'_>, _context: &ParseContext) -> Option<String> {
        let heading = fragment.heading.or_else(|| {
            fragment
                .elements()
                .find(|el| matches!(el.value().name(), "h1" | "h2" | "h3" | "h4"))
        });

        heading
            .map(|h| element_text(&h))
            .filter(|text| !text.is_empty())
            .or_else(|| {
                company_link(fragment, &self.company_path_segment)
                    .map(|(link, _)| element_text(&link))
                    .filter(|text| !text.is_empty())
            })
    }
}

/// Absolute URL of the company detail page
pub struct LinkExtractor {
    company_path_segment: String,
}

impl FieldExtractor for LinkExtractor {
    type Value = String;

    fn field(&self) -> Field {
        Field::Link
    }

    fn extract(&self, fragment: &EntryFragment<'_>, context: &ParseContext) -> Option<String> {
        let (_, href) = company_link(fragment, &self.company_path_segment)?;
        resolve_link(href, &context.base_url)
    }
}

/// Org number in registry format `NNNNNN-NNNN`
pub struct OrgNumberExtractor {
    labels: Vec<LabelMatcher>,
}

impl OrgNumberExtractor {
    /// Constrain labelled text to a registry org number
    pub fn parse_org_number(text: &str) -> Option<String> {
        let mut dashed = ORG_NUMBER_RE.find_iter(text).peekable();
        if dashed.peek().is_some() {
            return dashed
                .map(|found| found.as_str())
                .find(|candidate| ORG_NUMBER_STRICT_RE.is_match(candidate))
                .map(str::to_string);
        }
        ORG_NUMBER_DIGITS_RE
            .captures(text)
            .map(|caps| format!("{}-{}", &caps[1], &caps[2]))
    }
}

impl FieldExtractor for OrgNumberExtractor {
    type Value = String;

    fn field(&self) -> Field {
        Field::OrgNumber
    }

    fn extract(&self, fragment: &EntryFragment<'_>, _context: &ParseContext) -> Option<String> {
        find_labeled(fragment, &self.labels, Self::parse_org_number)
    }
}

/// Location: caller intent, then a postal address, then the city slug of the detail link
pub struct LocationExtractor {
    company_path_segment: String,
}

impl LocationExtractor {
    /// City from a `123 45 City` address line
    pub fn parse_postal_address(text: &str) -> Option<String> {
        POSTAL_ADDRESS_RE
            .captures(text)
            .map(|caps| caps[1].trim().to_string())
            .filter(|city| !city.is_empty())
    }

    /// City from `/foretag/<name>/<city>/...`
    pub fn city_from_link(href: &str, company_path_segment: &str) -> Option<String> {
        let (_, rest) = href.split_once(company_path_segment)?;
        let slug = rest.split('/').nth(1)?;
        if slug.is_empty() || slug == "-" || slug.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let city = slug
            .split('-')
            .filter(|part| !part.is_empty())
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" ");
        (!city.is_empty()).then_some(city)
    }
}

impl FieldExtractor for LocationExtractor {
    type Value = String;

    fn field(&self) -> Field {
        Field::Location
    }

    fn extract(&self, fragment: &EntryFragment<'_>, context: &ParseContext) -> Option<String> {
        if let Some(location) = &context.requested_location {
            return Some(location.clone());
        }

        let from_address = fragment.elements().find_map(|el| {
            let own_text: String = el
                .children()
                .filter_map(|child| child.value().as_text().map(|t| t.to_string()))
                .collect::<Vec<_>>()
                .join(" ");
            Self::parse_postal_address(&normalize_text(&own_text))
        });
        if from_address.is_some() {
            return from_address;
        }

        company_link(fragment, &self.company_path_segment)
            .and_then(|(_, href)| Self::city_from_link(href, &self.company_path_segment))
    }
}

/// Uppercase the first character, lowercase the rest
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Employee count, strict integer schema: range buckets such as "1-4" are absent
pub struct EmployeesExtractor {
    labels: Vec<LabelMatcher>,
}

impl EmployeesExtractor {
    pub fn parse_count(text: &str) -> Option<u64> {
        let caps = COUNT_RE.captures(text.trim())?;
        if caps.name("range").is_some() {
            return None;
        }
        caps["number"].replace(' ', "").parse().ok()
    }
}

impl FieldExtractor for EmployeesExtractor {
    type Value = u64;

    fn field(&self) -> Field {
        Field::Employees
    }

    fn extract(&self, fragment: &EntryFragment<'_>, _context: &ParseContext) -> Option<u64> {
        find_labeled(fragment, &self.labels, Self::parse_count)
    }
}

/// Revenue or profit with its fiscal year
pub struct FinancialExtractor {
    field: Field,
    labels: Vec<LabelMatcher>,
}

impl FinancialExtractor {
    /// Parse "2023 1 234 tkr", "(2023) -56", "1 234 (2023)" into amount and year.
    /// A leading year-like token is only a year when an amount follows it.
    pub fn parse_figure(text: &str) -> Option<FinancialFigure> {
        let text = text.trim();
        if let Some(caps) = LEADING_YEAR_RE.captures(text) {
            let rest = &text[caps.get(0)?.end()..];
            if let Some(amount) = Self::parse_amount(rest) {
                return Some(FinancialFigure {
                    amount,
                    year: Some(caps[1].to_string()),
                });
            }
        }

        let amount = Self::parse_amount(text)?;
        let year = TRAILING_YEAR_RE.captures(text).map(|c| c[1].to_string());
        Some(FinancialFigure { amount, year })
    }

    fn parse_amount(text: &str) -> Option<i64> {
        let caps = AMOUNT_RE.captures(text)?;
        // "2 0" would be a year glued to a short amount, not a grouped number
        if caps.get(0)?.as_str().len() > caps.name("number")?.end() {
            return None;
        }
        let magnitude: i64 = caps["number"].replace(' ', "").parse().ok()?;
        Some(if caps.name("sign").is_some() { -magnitude } else { magnitude })
    }

    fn is_bare_year(text: &str) -> bool {
        LEADING_YEAR_RE
            .find(text.trim())
            .is_some_and(|m| m.end() == text.trim().len())
    }
}

impl FieldExtractor for FinancialExtractor {
    type Value = FinancialFigure;

    fn field(&self) -> Field {
        self.field
    }

    fn extract(&self, fragment: &EntryFragment<'_>, _context: &ParseContext) -> Option<FinancialFigure> {
        // "Omsättning 2023" carries the year in the label node; the amount is in the next candidate
        self.labels.iter().find_map(|matcher| {
            let candidates = labeled_candidates(fragment, matcher);
            let last = candidates.len().saturating_sub(1);
            candidates.iter().enumerate().find_map(|(i, candidate)| {
                if i < last && Self::is_bare_year(candidate) {
                    return None;
                }
                Self::parse_figure(candidate)
            })
        })
    }
}

/// Registration date in the site's `YYYY-MM-DD` (or `DD.MM.YYYY`) format
pub struct RegistrationDateExtractor {
    labels: Vec<LabelMatcher>,
}

impl RegistrationDateExtractor {
    pub fn parse_date(text: &str) -> Option<NaiveDate> {
        if let Some(found) = ISO_DATE_RE.find(text) {
            if let Ok(date) = NaiveDate::parse_from_str(found.as_str(), "%Y-%m-%d") {
                return Some(date);
            }
        }
        DOTTED_DATE_RE
            .find(text)
            .and_then(|found| NaiveDate::parse_from_str(found.as_str(), "%d.%m.%Y").ok())
    }
}

impl FieldExtractor for RegistrationDateExtractor {
    type Value = NaiveDate;

    fn field(&self) -> Field {
        Field::RegistrationDate
    }

    fn extract(&self, fragment: &EntryFragment<'_>, _context: &ParseContext) -> Option<NaiveDate> {
        find_labeled(fragment, &self.labels, Self::parse_date)
    }
}

/// Industry tags: texts of links into the industry taxonomy, page order, no repeats
pub struct IndustryExtractor {
    path_segments: Vec<String>,
}

impl FieldExtractor for IndustryExtractor {
    type Value = Vec<String>;

    fn field(&self) -> Field {
        Field::Industry
    }

    fn extract(&self, fragment: &EntryFragment<'_>, _context: &ParseContext) -> Option<Vec<String>> {
        let mut seen = HashSet::new();
        let tags: Vec<String> = fragment
            .links()
            .filter(|(_, href)| self.path_segments.iter().any(|segment| href.contains(segment.as_str())))
            .map(|(link, _)| element_text(&link))
            .filter(|text| !text.is_empty() && seen.insert(text.clone()))
            .collect();

        (!tags.is_empty()).then_some(tags)
    }
}

/// The extractor table: one extractor per field, shared by listing and detail parsing
pub struct FieldExtractors {
    pub name: NameExtractor,
    pub link: LinkExtractor,
    pub org_number: OrgNumberExtractor,
    pub location: LocationExtractor,
    pub employees: EmployeesExtractor,
    pub revenue: FinancialExtractor,
    pub profit: FinancialExtractor,
    pub registration_date: RegistrationDateExtractor,
    pub industry: IndustryExtractor,
}

impl FieldExtractors {
    pub fn new(config: &ParsingConfig) -> ScrapeResult<Self> {
        let labels = &config.labels;
        Ok(Self {
            name: NameExtractor {
                company_path_segment: config.company_path_segment.clone(),
            },
            link: LinkExtractor {
                company_path_segment: config.company_path_segment.clone(),
            },
            org_number: OrgNumberExtractor {
                labels: LabelMatcher::compile_all(&labels.org_number)?,
            },
            location: LocationExtractor {
                company_path_segment: config.company_path_segment.clone(),
            },
            employees: EmployeesExtractor {
                labels: LabelMatcher::compile_all(&labels.employees)?,
            },
            revenue: FinancialExtractor {
                field: Field::Revenue,
                labels: LabelMatcher::compile_all(&labels.revenue)?,
            },
            profit: FinancialExtractor {
                field: Field::Profit,
                labels: LabelMatcher::compile_all(&labels.profit)?,
            },
            registration_date: RegistrationDateExtractor {
                labels: LabelMatcher::compile_all(&labels.registration_date)?,
            },
            industry: IndustryExtractor {
                path_segments: config.industry_path_segments.clone(),
            },
        })
    }

    /// Build a company entry from a fragment; `None` when it has neither name nor link
    pub fn extract_entry(&self, fragment: &EntryFragment<'_>, context: &ParseContext) -> Option<CompanyEntry> {
        let name = self.name.extract(fragment, context);
        let link = self.link.extract(fragment, context);
        if name.is_none() && link.is_none() {
            debug!("Discarding fragment without name or link ({:?})", fragment.strategy);
            return None;
        }

        let revenue = self.revenue.extract(fragment, context);
        let profit = self.profit.extract(fragment, context);

        Some(CompanyEntry {
            name: name.unwrap_or_default(),
            org_number: self
                .org_number
                .extract(fragment, context)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            location: self
                .location
                .extract(fragment, context)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            link: link.unwrap_or_default(),
            revenue: revenue.as_ref().map(|r| r.amount),
            revenue_year: revenue.and_then(|r| r.year),
            employees: self.employees.extract(fragment, context),
            profit: profit.as_ref().map(|p| p.amount),
            profit_year: profit.and_then(|p| p.year),
            registration_date: self.registration_date.extract(fragment, context),
            industry: self.industry.extract(fragment, context),
        })
    }

    /// Fill the fields a structured payload left empty from the matching fragment
    pub fn fill_missing(&self, entry: &mut CompanyEntry, fragment: &EntryFragment<'_>, context: &ParseContext) {
        if entry.name.is_empty() {
            entry.name = self.name.extract(fragment, context).unwrap_or_default();
        }
        if entry.link.is_empty() {
            entry.link = self.link.extract(fragment, context).unwrap_or_default();
        }
        if !entry.has_org_number() {
            if let Some(org_number) = self.org_number.extract(fragment, context) {
                entry.org_number = org_number;
            }
        }
        if entry.location == NOT_AVAILABLE {
            if let Some(location) = self.location.extract(fragment, context) {
                entry.location = location;
            }
        }
        if entry.revenue.is_none() {
            if let Some(revenue) = self.revenue.extract(fragment, context) {
                entry.revenue = Some(revenue.amount);
                entry.revenue_year = entry.revenue_year.take().or(revenue.year);
            }
        }
        if entry.profit.is_none() {
            if let Some(profit) = self.profit.extract(fragment, context) {
                entry.profit = Some(profit.amount);
                entry.profit_year = entry.profit_year.take().or(profit.year);
            }
        }
        if entry.employees.is_none() {
            entry.employees = self.employees.extract(fragment, context);
        }
        if entry.registration_date.is_none() {
            entry.registration_date = self.registration_date.extract(fragment, context);
        }
        if entry.industry.is_none() {
            entry.industry = self.industry.extract(fragment, context);
        }
    }
}
