//! Request validation and URL construction
//!
//! Validation runs before any network access; an unsupported sort value never
//! reaches the fetcher.

use url::Url;
use url::form_urlencoded::Serializer;

use crate::domain::search::{SearchParams, SortOrder};
use crate::infrastructure::parsing::field_extractors::capitalize;
use crate::infrastructure::parsing_error::{ScrapeError, ScrapeResult};

/// Reject parameters the listing endpoint cannot serve. Numeric ranges pass
/// through unchecked, even when `from > to`.
pub fn validate_params(params: &SearchParams) -> ScrapeResult<Option<SortOrder>> {
    if params.page == Some(0) {
        return Err(ScrapeError::invalid_parameter("page", "0"));
    }

    match params.sort.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(sort) => sort.parse().map(Some),
    }
}

/// Capitalise each whitespace-separated word: "umeå" and "UMEÅ" both become "Umeå"
pub fn normalize_location(location: &str) -> String {
    location
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<String>>()
        .join(" ")
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Listing URL with query keys in fixed order; absent and empty values are omitted
pub fn build_segmentation_url(base: &str, params: &SearchParams) -> String {
    let mut query = Serializer::new(String::new());

    if let Some(industry_code) = non_empty(params.industry_code.as_deref()) {
        query.append_pair("industryCode", industry_code);
    }
    if let Some(location) = non_empty(params.location.as_deref()) {
        query.append_pair("location", &normalize_location(location));
    }
    if let Some(company_type) = non_empty(params.company_type.as_deref()) {
        query.append_pair("companyType", company_type);
    }
    if let Some(revenue_from) = params.revenue_from {
        query.append_pair("revenueFrom", &revenue_from.to_string());
    }
    if let Some(revenue_to) = params.revenue_to {
        query.append_pair("revenueTo", &revenue_to.to_string());
    }
    if let Some(employees_from) = params.employees_from {
        query.append_pair("employeesFrom", &employees_from.to_string());
    }
    if let Some(employees_to) = params.employees_to {
        query.append_pair("employeesTo", &employees_to.to_string());
    }
    if let Some(sort) = non_empty(params.sort.as_deref()) {
        query.append_pair("sort", sort);
    }
    if let Some(page) = params.page {
        query.append_pair("page", &page.to_string());
    }

    let query = query.finish();
    if query.is_empty() {
        base.to_string()
    } else {
        format!("{base}?{query}")
    }
}

/// Free-text search URL: the query becomes one percent-encoded path segment
pub fn build_free_text_url(base: &str, query: &str) -> ScrapeResult<String> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ScrapeError::invalid_parameter("query", query));
    }

    let mut url = Url::parse(base).map_err(|_| ScrapeError::invalid_parameter("base_url", base))?;
    url.path_segments_mut()
        .map_err(|_| ScrapeError::invalid_parameter("base_url", base))?
        .pop_if_empty()
        .push(query);
    Ok(url.into())
}

/// Absolute detail page URL; relative paths resolve against the site origin
pub fn build_detail_url(base: &str, path: &str) -> ScrapeResult<String> {
    let path = path.trim();
    if path.is_empty() {
        return Err(ScrapeError::invalid_parameter("path", path));
    }

    let origin = Url::parse(base).map_err(|_| ScrapeError::invalid_parameter("base_url", base))?;
    let url = origin
        .join(path)
        .map_err(|_| ScrapeError::invalid_parameter("path", path))?;

    match url.scheme() {
        "http" | "https" => Ok(url.into()),
        _ => Err(ScrapeError::invalid_parameter("path", path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::allabolag;
    use proptest::prelude::*;

    #[test]
    fn test_location_is_capitalised_and_encoded() {
        let params = SearchParams::default().with_location("umeå");
        let url = build_segmentation_url(allabolag::SEGMENTATION_PAGE, &params);
        assert_eq!(url, "https://www.allabolag.se/segmentering?location=Ume%C3%A5");
    }

    #[test]
    fn test_query_key_order() {
        let params = SearchParams {
            industry_code: Some("62010".to_string()),
            location: Some("upplands väsby".to_string()),
            company_type: Some("AB".to_string()),
            revenue_from: Some(1000),
            revenue_to: Some(50_000),
            employees_from: Some(10),
            employees_to: Some(49),
            page: Some(2),
            sort: Some("revenueDesc".to_string()),
        };
        let url = build_segmentation_url(allabolag::SEGMENTATION_PAGE, &params);
        assert_eq!(
            url,
            "https://www.allabolag.se/segmentering?industryCode=62010&location=Upplands+V%C3%A4sby\
             &companyType=AB&revenueFrom=1000&revenueTo=50000&employeesFrom=10&employeesTo=49\
             &sort=revenueDesc&page=2"
        );
    }

    #[test]
    fn test_empty_values_are_omitted() {
        let params = SearchParams {
            industry_code: Some(String::new()),
            location: Some("  ".to_string()),
            sort: Some(String::new()),
            ..SearchParams::default()
        };
        assert_eq!(
            build_segmentation_url(allabolag::SEGMENTATION_PAGE, &params),
            allabolag::SEGMENTATION_PAGE
        );
    }

    #[test]
    fn test_validate_rejects_unknown_sort() {
        let params = SearchParams::default().with_sort("invalidSortValue");
        let err = validate_params(&params).unwrap_err();
        assert_eq!(err, ScrapeError::invalid_parameter("sort", "invalidSortValue"));
    }

    #[test]
    fn test_validate_is_permissive_about_ranges() {
        let params = SearchParams::default()
            .with_revenue_range(Some(5000), Some(100))
            .with_sort("profitAsc");
        assert_eq!(validate_params(&params).unwrap(), Some(SortOrder::ProfitAsc));
    }

    #[test]
    fn test_validate_rejects_page_zero() {
        assert!(validate_params(&SearchParams::default().with_page(0)).is_err());
        assert!(validate_params(&SearchParams::default().with_page(1)).is_ok());
    }

    #[test]
    fn test_free_text_url() {
        assert_eq!(
            build_free_text_url(allabolag::FREE_TEXT_PAGE, "fortnox växjö").unwrap(),
            "https://www.allabolag.se/what/fortnox%20v%C3%A4xj%C3%B6"
        );
        assert!(build_free_text_url(allabolag::FREE_TEXT_PAGE, " ").is_err());
    }

    #[test]
    fn test_detail_url() {
        assert_eq!(
            build_detail_url(allabolag::BASE_URL, "/foretag/fortnox-aktiebolag/vaxjo/-/2K0PNMRI5YDL3").unwrap(),
            "https://www.allabolag.se/foretag/fortnox-aktiebolag/vaxjo/-/2K0PNMRI5YDL3"
        );
        assert_eq!(
            build_detail_url(allabolag::BASE_URL, "https://www.allabolag.se/5564696291").unwrap(),
            "https://www.allabolag.se/5564696291"
        );
        assert!(build_detail_url(allabolag::BASE_URL, "").is_err());
        assert!(build_detail_url(allabolag::BASE_URL, "mailto:info@example.se").is_err());
    }

    proptest! {
        #[test]
        fn prop_normalize_location_is_idempotent(location in "[a-zA-ZåäöÅÄÖéü \t-]{0,40}") {
            let once = normalize_location(&location);
            prop_assert_eq!(normalize_location(&once), once);
        }

        #[test]
        fn prop_segmentation_url_is_deterministic(
            location in "[a-zåäö ]{0,20}",
            revenue_from in proptest::option::of(0i64..1_000_000),
            page in proptest::option::of(1u32..500),
        ) {
            let params = SearchParams {
                location: Some(location),
                revenue_from,
                page,
                ..SearchParams::default()
            };
            let first = build_segmentation_url(allabolag::SEGMENTATION_PAGE, &params);
            let second = build_segmentation_url(allabolag::SEGMENTATION_PAGE, &params);
            prop_assert_eq!(&first, &second);
            prop_assert!(first.starts_with(allabolag::SEGMENTATION_PAGE));
        }
    }
}
