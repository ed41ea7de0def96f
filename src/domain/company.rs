use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sentinel used when a listing does not expose a value for a required text field
pub const NOT_AVAILABLE: &str = "N/A";

/// Company basic information from segmentation and free-text listing pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyEntry {
    pub name: String,
    /// Registry format `NNNNNN-NNNN`, or `"N/A"` when the listing omits it
    pub org_number: String,
    pub location: String,
    /// Absolute URL of the company detail page
    pub link: String,
    /// Thousand SEK
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employees: Option<u64>,
    /// Thousand SEK
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_date: Option<NaiveDate>,
    /// Industry tags in page order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<Vec<String>>,
}

impl CompanyEntry {
    /// True when the org number carries a real registry value rather than the sentinel
    pub fn has_org_number(&self) -> bool {
        self.org_number != NOT_AVAILABLE
    }

    /// Digits of the org number, used to join listing data from different sources
    pub fn org_number_digits(&self) -> Option<String> {
        self.has_org_number()
            .then(|| self.org_number.chars().filter(char::is_ascii_digit).collect())
    }
}

/// An amount with the fiscal year it was reported for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialFigure {
    pub amount: i64,
    pub year: Option<String>,
}

/// Single-company information from a detail page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    pub name: String,
    pub org_number: String,
    pub location: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employees: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<Vec<String>>,
}
