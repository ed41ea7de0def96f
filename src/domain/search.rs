use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::company::CompanyEntry;
use crate::infrastructure::parsing_error::ScrapeError;

/// Segmentation search request as supplied by the caller
///
/// Revenue bounds are in thousand SEK. `sort` holds the caller's raw value so
/// that an unsupported value can be reported back verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue_from: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue_to: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employees_from: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employees_to: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

impl SearchParams {
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn with_revenue_range(mut self, from: Option<i64>, to: Option<i64>) -> Self {
        self.revenue_from = from;
        self.revenue_to = to;
        self
    }

    pub fn with_employee_range(mut self, from: Option<u64>, to: Option<u64>) -> Self {
        self.employees_from = from;
        self.employees_to = to;
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }
}

/// Sort orders accepted by the listing endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    CompanyNameAsc,
    CompanyNameDesc,
    RegistrationDateAsc,
    RegistrationDateDesc,
    NumEmployeesAsc,
    NumEmployeesDesc,
    Relevance,
    RevenueAsc,
    RevenueDesc,
    ProfitAsc,
    ProfitDesc,
}

impl SortOrder {
    pub const ALL: [SortOrder; 11] = [
        SortOrder::CompanyNameAsc,
        SortOrder::CompanyNameDesc,
        SortOrder::RegistrationDateAsc,
        SortOrder::RegistrationDateDesc,
        SortOrder::NumEmployeesAsc,
        SortOrder::NumEmployeesDesc,
        SortOrder::Relevance,
        SortOrder::RevenueAsc,
        SortOrder::RevenueDesc,
        SortOrder::ProfitAsc,
        SortOrder::ProfitDesc,
    ];

    /// Value sent in the `sort` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CompanyNameAsc => "companyNameAsc",
            Self::CompanyNameDesc => "companyNameDesc",
            Self::RegistrationDateAsc => "registrationDateAsc",
            Self::RegistrationDateDesc => "registrationDateDesc",
            Self::NumEmployeesAsc => "numEmployeesAsc",
            Self::NumEmployeesDesc => "numEmployeesDesc",
            Self::Relevance => "relevance",
            Self::RevenueAsc => "revenueAsc",
            Self::RevenueDesc => "revenueDesc",
            Self::ProfitAsc => "profitAsc",
            Self::ProfitDesc => "profitDesc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = ScrapeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|order| order.as_str() == value)
            .ok_or_else(|| ScrapeError::invalid_parameter("sort", value))
    }
}

/// One fetched page of results plus the population size the page announces
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<CompanyEntry>,
    /// Size of the full matching population, not the length of `results`
    pub total_count: u64,
}
