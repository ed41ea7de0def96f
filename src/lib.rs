//! Company Scout - structured company records from a business-registry website
//!
//! Segmentation search (filtered, sorted, paginated listings), free-text
//! search and single-company detail lookup over allabolag.se pages. The
//! network is behind the `PageFetcher` trait; extraction is a set of
//! per-field extractors over located entry fragments, with an embedded
//! structured payload preferred when the page carries one.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{CompanySearchService, SearchEvent, SearchEventSink};
pub use domain::{CompanyEntry, CompanyInfo, SearchParams, SearchResponse, SortOrder};
pub use infrastructure::{HttpClient, PageFetcher, ScrapeError, ScrapeResult};
