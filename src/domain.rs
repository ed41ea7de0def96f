//! Domain module - company records and search request/response types
//!
//! All entities are transient: built per call from one fetched document.

pub mod company;
pub mod search;

pub use company::{CompanyEntry, CompanyInfo, FinancialFigure, NOT_AVAILABLE};
pub use search::{SearchParams, SearchResponse, SortOrder};
