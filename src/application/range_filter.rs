//! Client-side range filtering and response assembly

use crate::domain::company::CompanyEntry;
use crate::domain::search::{SearchParams, SearchResponse};

fn within<T: PartialOrd>(value: Option<T>, from: Option<T>, to: Option<T>) -> bool {
    let Some(value) = value else {
        return true;
    };
    from.is_none_or(|from| value >= from) && to.is_none_or(|to| value <= to)
}

/// Drop an entry only when a value it has violates a bound the caller set.
/// Entries with an absent value are kept.
pub fn apply_range_filters(entries: Vec<CompanyEntry>, params: &SearchParams) -> Vec<CompanyEntry> {
    entries
        .into_iter()
        .filter(|entry| {
            within(entry.revenue, params.revenue_from, params.revenue_to)
                && within(entry.employees, params.employees_from, params.employees_to)
        })
        .collect()
}

/// Pair the entries with the page's announced population size
pub fn assemble_response(entries: Vec<CompanyEntry>, total_count: u64) -> SearchResponse {
    SearchResponse {
        results: entries,
        total_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::company::NOT_AVAILABLE;
    use rstest::rstest;

    fn entry(name: &str, revenue: Option<i64>, employees: Option<u64>) -> CompanyEntry {
        CompanyEntry {
            name: name.to_string(),
            org_number: NOT_AVAILABLE.to_string(),
            location: NOT_AVAILABLE.to_string(),
            link: format!("https://www.allabolag.se/foretag/{name}/umea/-/1"),
            revenue,
            revenue_year: None,
            employees,
            profit: None,
            profit_year: None,
            registration_date: None,
            industry: None,
        }
    }

    #[rstest]
    #[case(Some(999), false)]
    #[case(Some(1000), true)]
    #[case(Some(5000), true)]
    #[case(Some(5001), false)]
    #[case(None, true)]
    fn test_revenue_bounds(#[case] revenue: Option<i64>, #[case] kept: bool) {
        let params = SearchParams::default().with_revenue_range(Some(1000), Some(5000));
        let filtered = apply_range_filters(vec![entry("a", revenue, None)], &params);
        assert_eq!(filtered.len() == 1, kept);
    }

    #[test]
    fn test_employee_bounds_keep_order() {
        let params = SearchParams::default().with_employee_range(Some(10), None);
        let filtered = apply_range_filters(
            vec![
                entry("a", None, Some(45)),
                entry("b", None, Some(3)),
                entry("c", None, None),
                entry("d", None, Some(10)),
            ],
            &params,
        );
        let names: Vec<_> = filtered.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c", "d"]);
    }

    #[test]
    fn test_inverted_range_filters_everything_with_a_value() {
        let params = SearchParams::default().with_revenue_range(Some(5000), Some(100));
        let filtered = apply_range_filters(vec![entry("a", Some(1000), None), entry("b", None, None)], &params);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "b");
    }

    #[test]
    fn test_total_count_is_not_recomputed() {
        let response = assemble_response(vec![entry("a", None, None)], 13_170);
        assert_eq!(response.total_count, 13_170);
        assert_eq!(response.results.len(), 1);

        let empty = assemble_response(Vec::new(), 0);
        assert_eq!(empty.total_count, 0);
    }
}
