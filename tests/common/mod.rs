//! Shared test doubles for integration tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use company_scout_lib::application::{CompanySearchService, SearchEvent, SearchEventSink};
use company_scout_lib::infrastructure::{PageFetcher, SiteConfig};

pub const SEGMENTATION_UMEA: &str = include_str!("../fixtures/segmentation_umea.html");

/// Serves canned HTML and counts fetches
pub struct CountingFetcher {
    html: Option<String>,
    calls: AtomicUsize,
    urls: Mutex<Vec<String>>,
}

impl CountingFetcher {
    pub fn serving(html: &str) -> Arc<Self> {
        Arc::new(Self {
            html: Some(html.to_string()),
            calls: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
        })
    }

    /// A fetcher whose every request fails
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            html: None,
            calls: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for CountingFetcher {
    async fn fetch_page(&self, url: &str) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());
        match &self.html {
            Some(html) => Ok(html.clone()),
            None => Err(anyhow::anyhow!("connection refused").context(format!("Failed to fetch URL: {url}"))),
        }
    }
}

/// Keeps every event for inspection
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SearchEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<SearchEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl SearchEventSink for RecordingSink {
    fn record(&self, event: SearchEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn service_with(fetcher: Arc<CountingFetcher>) -> (CompanySearchService, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let service = CompanySearchService::new(fetcher, SiteConfig::default())
        .unwrap()
        .with_event_sink(sink.clone());
    (service, sink)
}
