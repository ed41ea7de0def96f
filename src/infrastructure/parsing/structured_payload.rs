//! Structured payload fast path
//!
//! Listing pages are server-rendered from a JSON payload embedded in a
//! `<script>` tag. When that payload is present it is preferred over the DOM
//! label heuristics; the heuristics only fill what the payload leaves out.

use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::context::ParseContext;
use super::field_extractors::{
    EmployeesExtractor, FinancialExtractor, OrgNumberExtractor, RegistrationDateExtractor, resolve_link,
};
use crate::domain::company::{CompanyEntry, NOT_AVAILABLE};
use crate::infrastructure::parsing_error::{ScrapeError, ScrapeResult};

/// Keys under which the payload carries an org number
pub const ORG_NUMBER_KEYS: [&str; 3] = ["orgnr", "orgNumber", "organisationNumber"];

/// Deepest nesting searched for the company array
const MAX_SEARCH_DEPTH: usize = 32;

/// One company as the embedded payload describes it. Scalar fields arrive as
/// numbers or strings depending on the page, so they are kept loose.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadCompany {
    #[serde(default, alias = "companyName", alias = "legalName")]
    pub name: Option<String>,

    #[serde(default, alias = "orgnr", alias = "organisationNumber")]
    pub org_number: Option<Value>,

    #[serde(default)]
    pub location: Option<Value>,

    #[serde(default, alias = "url", alias = "href")]
    pub link: Option<String>,

    #[serde(default)]
    pub revenue: Option<Value>,

    #[serde(default)]
    pub revenue_year: Option<Value>,

    #[serde(default, alias = "numberOfEmployees", alias = "numEmployees")]
    pub employees: Option<Value>,

    #[serde(default)]
    pub profit: Option<Value>,

    #[serde(default)]
    pub profit_year: Option<Value>,

    #[serde(default, alias = "registeredDate", alias = "foundationDate")]
    pub registration_date: Option<String>,

    #[serde(default, alias = "industries")]
    pub industry: Option<Value>,
}

impl PayloadCompany {
    /// Org number in registry format, if the payload value is one
    pub fn org_number(&self) -> Option<String> {
        self.org_number
            .as_ref()
            .and_then(value_as_text)
            .and_then(|text| OrgNumberExtractor::parse_org_number(&text))
    }

    /// Map onto a company entry; fields the payload omits stay empty for the DOM to fill
    pub fn to_entry(&self, context: &ParseContext) -> CompanyEntry {
        let location = context
            .requested_location
            .clone()
            .or_else(|| self.location.as_ref().and_then(location_text))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        let link = self
            .link
            .as_deref()
            .and_then(|href| resolve_link(href, &context.base_url))
            .unwrap_or_default();

        CompanyEntry {
            name: self
                .name
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            org_number: self.org_number().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            location,
            link,
            revenue: self.revenue.as_ref().and_then(value_as_amount),
            revenue_year: self.revenue_year.as_ref().and_then(value_as_text),
            employees: self.employees.as_ref().and_then(value_as_count),
            profit: self.profit.as_ref().and_then(value_as_amount),
            profit_year: self.profit_year.as_ref().and_then(value_as_text),
            registration_date: self
                .registration_date
                .as_deref()
                .and_then(RegistrationDateExtractor::parse_date),
            industry: self.industry.as_ref().and_then(industry_tags),
        }
    }
}

/// Compiled payload script selectors
pub struct StructuredPayloadReader {
    script_selectors: Vec<Selector>,
}

impl StructuredPayloadReader {
    pub fn new(selectors: &[String]) -> ScrapeResult<Self> {
        let script_selectors = selectors
            .iter()
            .map(|s| Selector::parse(s).map_err(|e| ScrapeError::invalid_selector(s, &e.to_string())))
            .collect::<ScrapeResult<Vec<_>>>()?;
        Ok(Self { script_selectors })
    }

    /// Companies from the first payload script that carries a company array
    pub fn read(&self, document: &Html) -> Option<Vec<PayloadCompany>> {
        for selector in &self.script_selectors {
            for script in document.select(selector) {
                let raw: String = script.text().collect();
                let payload: Value = match serde_json::from_str(raw.trim()) {
                    Ok(value) => value,
                    Err(e) => {
                        warn!("Ignoring unparsable payload script: {}", e);
                        continue;
                    }
                };

                if let Some(companies) = find_company_array(&payload, 0) {
                    let parsed: Vec<PayloadCompany> = companies
                        .iter()
                        .filter_map(|item| serde_json::from_value(item.clone()).ok())
                        .collect();
                    if !parsed.is_empty() {
                        debug!("Structured payload carries {} companies", parsed.len());
                        return Some(parsed);
                    }
                }
            }
        }
        None
    }
}

fn is_company_object(value: &Value) -> bool {
    value.as_object().is_some_and(|object| {
        object.contains_key("name") && ORG_NUMBER_KEYS.iter().any(|key| object.contains_key(*key))
    })
}

/// First array (depth-first, document order) whose elements look like companies
pub fn find_company_array(value: &Value, depth: usize) -> Option<&Vec<Value>> {
    if depth > MAX_SEARCH_DEPTH {
        return None;
    }
    match value {
        Value::Array(items) => {
            if !items.is_empty() && items.iter().all(Value::is_object) && items.iter().any(is_company_object) {
                return Some(items);
            }
            items.iter().find_map(|item| find_company_array(item, depth + 1))
        }
        Value::Object(object) => object.values().find_map(|item| find_company_array(item, depth + 1)),
        _ => None,
    }
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_as_amount(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        // A bare digit string is an amount even when it starts like a year
        Value::String(s) => s
            .trim()
            .replace(' ', "")
            .parse()
            .ok()
            .or_else(|| FinancialExtractor::parse_figure(s).map(|figure| figure.amount)),
        _ => None,
    }
}

fn value_as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => EmployeesExtractor::parse_count(s),
        _ => None,
    }
}

fn location_text(value: &Value) -> Option<String> {
    match value {
        Value::Object(object) => ["municipality", "city", "postPlace", "county"]
            .iter()
            .find_map(|key| object.get(*key).and_then(value_as_text)),
        other => value_as_text(other),
    }
}

fn industry_tags(value: &Value) -> Option<Vec<String>> {
    let mut tags: Vec<String> = Vec::new();
    let items = match value {
        Value::Array(items) => items.iter().collect::<Vec<_>>(),
        other => vec![other],
    };
    for item in items {
        let tag = match item {
            Value::Object(object) => object.get("name").and_then(value_as_text),
            other => value_as_text(other),
        };
        if let Some(tag) = tag {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
    }
    (!tags.is_empty()).then_some(tags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reader() -> StructuredPayloadReader {
        StructuredPayloadReader::new(&[
            "script#__NEXT_DATA__".to_string(),
            "script[type='application/json']".to_string(),
        ])
        .unwrap()
    }

    #[test]
    fn test_finds_nested_company_array() {
        let payload = json!({
            "props": {
                "pageProps": {
                    "menu": [{"label": "Hem"}, {"label": "Branscher"}],
                    "hydrationData": {
                        "searchStore": {
                            "companies": {
                                "companies": [
                                    {"name": "Fortnox Aktiebolag", "orgnr": "5564696291"},
                                    {"name": "Visma Spcs AB", "orgnr": "5560596835"}
                                ]
                            }
                        }
                    }
                }
            }
        });
        let found = find_company_array(&payload, 0).unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_reads_next_data_script() {
        let html = Html::parse_document(
            r#"<html><body>
            <script id="__NEXT_DATA__" type="application/json">
              {"props":{"pageProps":{"companies":[
                {"name":"Fortnox Aktiebolag","orgnr":"5564696291","employees":"45",
                 "revenue":"1 850 000","revenueYear":2023,
                 "location":{"municipality":"Växjö"},
                 "industries":[{"name":"Data, IT"},{"name":"Data, IT"},{"name":"Programvara"}]}
              ]}}}
            </script></body></html>"#,
        );
        let companies = reader().read(&html).unwrap();
        let entry = companies[0].to_entry(&ParseContext::for_page("https://www.allabolag.se/segmentering"));

        assert_eq!(entry.name, "Fortnox Aktiebolag");
        assert_eq!(entry.org_number, "556469-6291");
        assert_eq!(entry.employees, Some(45));
        assert_eq!(entry.revenue, Some(1_850_000));
        assert_eq!(entry.revenue_year.as_deref(), Some("2023"));
        assert_eq!(entry.location, "Växjö");
        assert_eq!(entry.industry, Some(vec!["Data, IT".to_string(), "Programvara".to_string()]));
        assert_eq!(entry.profit, None);
        assert!(entry.link.is_empty());
    }

    #[test]
    fn test_payload_without_companies_is_ignored() {
        let html = Html::parse_document(
            r#"<script id="__NEXT_DATA__">{"props":{"pageProps":{"title":"Segmentering"}}}</script>"#,
        );
        assert!(reader().read(&html).is_none());
    }

    #[test]
    fn test_malformed_payload_is_ignored() {
        let html = Html::parse_document(r#"<script id="__NEXT_DATA__">{"props": </script>"#);
        assert!(reader().read(&html).is_none());
    }

    #[test]
    fn test_range_employee_bucket_is_absent() {
        let company: PayloadCompany =
            serde_json::from_value(json!({"name": "Liten AB", "orgNumber": "559000-0001", "employees": "1-4"}))
                .unwrap();
        let entry = company.to_entry(&ParseContext::for_page("https://www.allabolag.se/segmentering"));
        assert_eq!(entry.employees, None);
        assert_eq!(entry.org_number, "559000-0001");
    }
}
