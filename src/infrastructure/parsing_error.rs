//! Error types for company search operations
//!
//! Field-level extraction never fails a page; these errors cover rejected
//! parameters, failed fetches, missing structural anchors and parser
//! configuration.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScrapeError {
    #[error("Invalid value for parameter '{name}': '{value}'")]
    InvalidParameter { name: String, value: String },

    #[error("Failed to fetch {url}: {message}")]
    FetchFailure { url: String, message: String },

    #[error("Page parsing failed: {reason}")]
    ParseFailure { reason: String, url: Option<String> },

    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },
}

impl ScrapeError {
    /// Create an invalid parameter error carrying the offending value
    pub fn invalid_parameter(name: &str, value: &str) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    /// Create a fetch failure; the whole `anyhow` context chain goes into the message
    pub fn fetch_failure(url: &str, error: &anyhow::Error) -> Self {
        Self::FetchFailure {
            url: url.to_string(),
            message: format!("{error:#}"),
        }
    }

    pub fn parse_failure(reason: &str, url: Option<&str>) -> Self {
        Self::ParseFailure {
            reason: reason.to_string(),
            url: url.map(|s| s.to_string()),
        }
    }

    pub fn invalid_selector(selector: &str, reason: &str) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Check if retrying the same call could succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::InvalidParameter { .. } => false,
            Self::FetchFailure { .. } => true,
            Self::ParseFailure { .. } => false,
            Self::InvalidSelector { .. } => false,
        }
    }
}

pub type ScrapeResult<T> = Result<T, ScrapeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_invalid_parameter_names_the_value() {
        let err = ScrapeError::invalid_parameter("sort", "invalidSortValue");
        assert_eq!(
            err.to_string(),
            "Invalid value for parameter 'sort': 'invalidSortValue'"
        );
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_fetch_failure_keeps_error_chain() {
        let source: anyhow::Result<()> = Err(anyhow::anyhow!("connection refused"));
        let error = source.context("Failed to send request").unwrap_err();

        let err = ScrapeError::fetch_failure("https://www.allabolag.se/segmentering", &error);
        match &err {
            ScrapeError::FetchFailure { url, message } => {
                assert_eq!(url, "https://www.allabolag.se/segmentering");
                assert_eq!(message, "Failed to send request: connection refused");
            }
            other => panic!("expected fetch failure, got {other:?}"),
        }
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_parse_failure_and_selector_errors_are_not_recoverable() {
        let parse = ScrapeError::parse_failure("missing title", Some("https://www.allabolag.se/x"));
        assert_eq!(parse.to_string(), "Page parsing failed: missing title");
        assert!(!parse.is_recoverable());

        let selector = ScrapeError::invalid_selector("div[", "unexpected end of input");
        assert!(selector.to_string().contains("div["));
        assert!(!selector.is_recoverable());
    }
}
