//! Infrastructure layer: configuration, logging, page fetching and HTML parsing

pub mod config;
pub mod http_client;
pub mod logging;
pub mod parsing;
pub mod parsing_error;

pub use config::{AppConfig, HttpConfig, LoggingConfig, SiteConfig, allabolag};
pub use http_client::{HttpClient, PageFetcher};
pub use logging::{init_logging, init_logging_with_config};
pub use parsing::{CompanyDetailParser, CompanyListParser, ContextualParser, ParseContext, ParsingConfig};
pub use parsing_error::{ScrapeError, ScrapeResult};
