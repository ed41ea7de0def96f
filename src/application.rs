//! Application layer module
//!
//! Request validation, URL construction, range filtering and the search
//! service that ties them to the fetcher and the parsers.

pub mod events;
pub mod range_filter;
pub mod search_service;
pub mod url_builder;

pub use events::{NoopEventSink, SearchEvent, SearchEventSink, TracingEventSink};
pub use range_filter::{apply_range_filters, assemble_response};
pub use search_service::{CompanySearchService, SearchOperation};
pub use url_builder::{build_detail_url, build_free_text_url, build_segmentation_url, normalize_location, validate_params};
