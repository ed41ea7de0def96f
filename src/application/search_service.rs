//! Company search service
//!
//! The public operations: segmentation search, free-text search and detail
//! lookup. Each call validates its input, builds one URL, fetches one page
//! and runs the shared parsers over it. No retries, no caching.

use std::sync::Arc;

use scraper::Html;
use tracing::debug;

use crate::application::events::{SearchEvent, SearchEventSink, TracingEventSink};
use crate::application::range_filter::{apply_range_filters, assemble_response};
use crate::application::url_builder::{
    build_detail_url, build_free_text_url, build_segmentation_url, normalize_location, validate_params,
};
use crate::domain::company::CompanyInfo;
use crate::domain::search::{SearchParams, SearchResponse};
use crate::infrastructure::config::SiteConfig;
use crate::infrastructure::http_client::PageFetcher;
use crate::infrastructure::parsing::{
    CompanyDetailParser, CompanyListParser, ContextualParser, EntrySource, ListingPage, ParseContext,
    ParsingConfig,
};
use crate::infrastructure::parsing_error::{ScrapeError, ScrapeResult};

/// Public operation names, as reported in events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOperation {
    Segmentation,
    FreeText,
    Detail,
}

impl SearchOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Segmentation => "segmentation",
            Self::FreeText => "free-text",
            Self::Detail => "detail",
        }
    }
}

/// Coordinates fetching and parsing for the public search operations
pub struct CompanySearchService {
    fetcher: Arc<dyn PageFetcher>,
    events: Arc<dyn SearchEventSink>,
    site: SiteConfig,
    list_parser: Arc<CompanyListParser>,
    detail_parser: Arc<CompanyDetailParser>,
}

impl CompanySearchService {
    /// Create a service with the default labels and selectors, reporting to `tracing`
    pub fn new(fetcher: Arc<dyn PageFetcher>, site: SiteConfig) -> ScrapeResult<Self> {
        Self::with_parsing_config(fetcher, site, &ParsingConfig::default())
    }

    pub fn with_parsing_config(
        fetcher: Arc<dyn PageFetcher>,
        site: SiteConfig,
        parsing: &ParsingConfig,
    ) -> ScrapeResult<Self> {
        Ok(Self {
            fetcher,
            events: Arc::new(TracingEventSink),
            site,
            list_parser: Arc::new(CompanyListParser::with_config(parsing)?),
            detail_parser: Arc::new(CompanyDetailParser::with_config(parsing)?),
        })
    }

    /// Replace the event sink
    pub fn with_event_sink(mut self, events: Arc<dyn SearchEventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    /// Filtered, sorted, paginated listing query
    pub async fn segmentation_search(&self, params: &SearchParams) -> ScrapeResult<SearchResponse> {
        let operation = SearchOperation::Segmentation;
        validate_params(params).map_err(|e| self.failed(operation, e))?;

        let url = build_segmentation_url(&self.site.listing_url, params);
        self.request_built(operation, &url);

        let html = self.fetch(operation, &url).await?;

        let requested_location = params
            .location
            .as_deref()
            .map(normalize_location)
            .filter(|location| !location.is_empty());
        let context = ParseContext::new(url.as_str(), self.site.base_url.as_str())
            .with_requested_location(requested_location);
        let page = self.parse_listing(operation, &html, &context)?;

        let before = page.entries.len();
        let entries = apply_range_filters(page.entries, params);
        self.events.record(SearchEvent::EntriesFiltered {
            before,
            after: entries.len(),
        });

        Ok(assemble_response(entries, page.total_count))
    }

    /// Free-text company search over the same extraction pipeline
    pub async fn search_companies(&self, query: &str) -> ScrapeResult<SearchResponse> {
        let operation = SearchOperation::FreeText;
        let url = build_free_text_url(&self.site.free_text_url, query).map_err(|e| self.failed(operation, e))?;
        self.request_built(operation, &url);

        let html = self.fetch(operation, &url).await?;

        let context = ParseContext::new(url.as_str(), self.site.base_url.as_str());
        let page = self.parse_listing(operation, &html, &context)?;

        Ok(assemble_response(page.entries, page.total_count))
    }

    /// Single-company lookup by detail path (or absolute detail URL)
    pub async fn get_company_info(&self, path: &str) -> ScrapeResult<CompanyInfo> {
        let operation = SearchOperation::Detail;
        let url = build_detail_url(&self.site.base_url, path).map_err(|e| self.failed(operation, e))?;
        self.request_built(operation, &url);

        let html = self.fetch(operation, &url).await?;

        let context = ParseContext::new(url.as_str(), self.site.base_url.as_str());
        let document = Html::parse_document(&html);
        self.detail_parser
            .parse_with_context(&document, &context)
            .map_err(|e| self.failed(operation, e))
    }

    async fn fetch(&self, operation: SearchOperation, url: &str) -> ScrapeResult<String> {
        match self.fetcher.fetch_page(url).await {
            Ok(html) => {
                self.events.record(SearchEvent::PageFetched {
                    url: url.to_string(),
                    bytes: html.len(),
                });
                Ok(html)
            }
            Err(e) => Err(self.failed(operation, ScrapeError::fetch_failure(url, &e))),
        }
    }

    fn parse_listing(
        &self,
        operation: SearchOperation,
        html: &str,
        context: &ParseContext,
    ) -> ScrapeResult<ListingPage> {
        let document = Html::parse_document(html);
        let page = self
            .list_parser
            .parse_with_context(&document, context)
            .map_err(|e| self.failed(operation, e))?;

        if page.source == EntrySource::StructuredPayload {
            self.events.record(SearchEvent::PayloadUsed {
                url: context.page_url.clone(),
                count: page.entries.len(),
            });
        }
        self.events.record(SearchEvent::EntriesExtracted {
            url: context.page_url.clone(),
            count: page.entries.len(),
            total_count: page.total_count,
        });
        debug!("{} listing parsed from {:?}", operation.as_str(), page.source);

        Ok(page)
    }

    fn request_built(&self, operation: SearchOperation, url: &str) {
        self.events.record(SearchEvent::RequestBuilt {
            operation: operation.as_str().to_string(),
            url: url.to_string(),
        });
    }

    fn failed(&self, operation: SearchOperation, error: ScrapeError) -> ScrapeError {
        self.events.record(SearchEvent::Failed {
            operation: operation.as_str().to_string(),
            message: error.to_string(),
        });
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::NoopEventSink;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StaticFetcher {
        html: String,
        requested: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PageFetcher for StaticFetcher {
        async fn fetch_page(&self, url: &str) -> anyhow::Result<String> {
            self.requested.lock().unwrap().push(url.to_string());
            Ok(self.html.clone())
        }
    }

    fn service(html: &str) -> (CompanySearchService, Arc<StaticFetcher>) {
        let fetcher = Arc::new(StaticFetcher {
            html: html.to_string(),
            requested: Mutex::new(Vec::new()),
        });
        let service = CompanySearchService::new(fetcher.clone(), SiteConfig::default())
            .unwrap()
            .with_event_sink(Arc::new(NoopEventSink));
        (service, fetcher)
    }

    #[tokio::test]
    async fn test_free_text_search_uses_listing_pipeline() {
        let (service, fetcher) = service(
            r#"<h1>1 företag</h1>
               <div><h2><a href="/foretag/fortnox-aktiebolag/vaxjo/-/2K0PNMRI5YDL3">Fortnox Aktiebolag</a></h2>
               <span>Org.nr 556469-6291</span></div>"#,
        );

        let response = service.search_companies("fortnox").await.unwrap();
        assert_eq!(response.total_count, 1);
        assert_eq!(response.results[0].org_number, "556469-6291");
        assert_eq!(
            fetcher.requested.lock().unwrap().as_slice(),
            ["https://www.allabolag.se/what/fortnox"]
        );
    }

    #[tokio::test]
    async fn test_detail_lookup_resolves_relative_path() {
        let (service, fetcher) = service("<title>Fortnox Aktiebolag - 556469-6291</title>");

        let info = service
            .get_company_info("/foretag/fortnox-aktiebolag/vaxjo/-/2K0PNMRI5YDL3")
            .await
            .unwrap();
        assert_eq!(info.name, "Fortnox Aktiebolag");
        assert_eq!(
            fetcher.requested.lock().unwrap()[0],
            "https://www.allabolag.se/foretag/fortnox-aktiebolag/vaxjo/-/2K0PNMRI5YDL3"
        );
    }

    #[tokio::test]
    async fn test_blank_query_is_rejected_without_fetching() {
        let (service, fetcher) = service("");
        let err = service.search_companies("   ").await.unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidParameter { .. }));
        assert!(fetcher.requested.lock().unwrap().is_empty());
    }

    #[test]
    fn test_service_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CompanySearchService>();
    }
}
