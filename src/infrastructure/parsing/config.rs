//! Parsing configuration for HTML extraction
//!
//! Centralized labels, CSS selectors and heuristics for registry pages. The
//! site has no schema, so layout drift is handled here rather than in the
//! extractors.

use serde::{Deserialize, Serialize};

/// Main parsing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsingConfig {
    /// Text labels anchoring each field
    pub labels: FieldLabels,

    /// Listing page selectors
    pub listing_selectors: ListingSelectors,

    /// Lower-cased heading texts that are promotions, not companies
    pub promotional_headings: Vec<String>,

    /// Word following the population size in the result heading ("13 170 företag")
    pub total_count_noun: String,

    /// Path segments that mark an industry taxonomy link
    pub industry_path_segments: Vec<String>,

    /// Path segment that marks a company detail link
    pub company_path_segment: String,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            labels: FieldLabels::default(),
            listing_selectors: ListingSelectors::default(),
            promotional_headings: vec![
                "köp listan".to_string(),
                "köp lista".to_string(),
                "köp denna lista".to_string(),
                "buy this list".to_string(),
                "uppgradera".to_string(),
                "prova gratis".to_string(),
                "bli medlem".to_string(),
            ],
            total_count_noun: "företag".to_string(),
            industry_path_segments: vec!["/bransch/".to_string(), "/branscher/".to_string()],
            company_path_segment: "/foretag/".to_string(),
        }
    }
}

/// Labels for label-anchored extraction, each with alternate phrasings in priority order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldLabels {
    pub org_number: Vec<String>,
    pub employees: Vec<String>,
    pub revenue: Vec<String>,
    pub profit: Vec<String>,
    pub registration_date: Vec<String>,
    pub status: Vec<String>,
    pub phone: Vec<String>,
}

impl Default for FieldLabels {
    fn default() -> Self {
        Self {
            org_number: vec!["Org.nr".to_string(), "Org nr".to_string(), "Organisationsnummer".to_string()],
            employees: vec!["Anställda".to_string(), "Antal anställda".to_string()],
            revenue: vec!["Omsättning".to_string()],
            profit: vec![
                "Vinst".to_string(),
                "Resultat efter finansnetto".to_string(),
                "Årets resultat".to_string(),
            ],
            registration_date: vec![
                "Registreringsdatum".to_string(),
                "Registrerad".to_string(),
                "Bolaget registrerat".to_string(),
            ],
            status: vec!["Status".to_string()],
            phone: vec!["Telefon".to_string(), "Tel".to_string()],
        }
    }
}

/// CSS selectors for listing pages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSelectors {
    /// Card containers, one per company, when the layout marks them
    pub entry_card: Vec<String>,

    /// Headings that may carry a company link
    pub entry_heading: String,

    /// Headings scanned for the population size
    pub total_count_heading: String,

    /// Embedded structured payload scripts
    pub payload_script: Vec<String>,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            entry_card: vec![
                "[data-testid='company-card']".to_string(),
                ".company-card".to_string(),
                "div[class*='SegmentationSearchResultCard']".to_string(),
                "article.search-result".to_string(),
            ],
            entry_heading: "h2, h3".to_string(),
            total_count_heading: "h1, h2, h3, h4, h5, h6".to_string(),
            payload_script: vec![
                "script#__NEXT_DATA__".to_string(),
                "script[type='application/json']".to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    #[test]
    fn test_default_selectors_compile() {
        let config = ParsingConfig::default();
        let selectors = &config.listing_selectors;
        for selector in selectors
            .entry_card
            .iter()
            .chain(selectors.payload_script.iter())
            .chain([&selectors.entry_heading, &selectors.total_count_heading])
        {
            assert!(Selector::parse(selector).is_ok(), "selector failed: {selector}");
        }
    }

    #[test]
    fn test_promotional_headings_are_lower_case() {
        let config = ParsingConfig::default();
        assert!(config.promotional_headings.iter().all(|h| h == &h.to_lowercase()));
    }
}
