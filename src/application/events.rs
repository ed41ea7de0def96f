//! Search lifecycle events
//!
//! The search service reports what it did through an injected
//! `SearchEventSink` instead of writing logs on its own, so callers decide
//! where observability goes.

use serde::Serialize;
use tracing::{debug, info, warn};

/// Something the search pipeline did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SearchEvent {
    /// Request URL built from validated parameters
    RequestBuilt { operation: String, url: String },
    /// Page fetched
    PageFetched { url: String, bytes: usize },
    /// Entries extracted from the page
    EntriesExtracted { url: String, count: usize, total_count: u64 },
    /// Range filters applied
    EntriesFiltered { before: usize, after: usize },
    /// Entries came from the embedded structured payload
    PayloadUsed { url: String, count: usize },
    /// Operation failed
    Failed { operation: String, message: String },
}

impl SearchEvent {
    /// Get the event name
    pub fn event_name(&self) -> &'static str {
        match self {
            SearchEvent::RequestBuilt { .. } => "search-request-built",
            SearchEvent::PageFetched { .. } => "search-page-fetched",
            SearchEvent::EntriesExtracted { .. } => "search-entries-extracted",
            SearchEvent::EntriesFiltered { .. } => "search-entries-filtered",
            SearchEvent::PayloadUsed { .. } => "search-payload-used",
            SearchEvent::Failed { .. } => "search-failed",
        }
    }
}

/// Receives search events
pub trait SearchEventSink: Send + Sync {
    fn record(&self, event: SearchEvent);
}

/// Forwards events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl SearchEventSink for TracingEventSink {
    fn record(&self, event: SearchEvent) {
        let name = event.event_name();
        match &event {
            SearchEvent::RequestBuilt { operation, url } => {
                info!(event = name, operation = %operation, url = %url, "Search request built");
            }
            SearchEvent::PageFetched { url, bytes } => {
                debug!(event = name, url = %url, bytes = *bytes, "Page fetched");
            }
            SearchEvent::EntriesExtracted { url, count, total_count } => {
                info!(
                    event = name,
                    url = %url,
                    count = *count,
                    total_count = *total_count,
                    "Entries extracted"
                );
            }
            SearchEvent::EntriesFiltered { before, after } => {
                debug!(event = name, before = *before, after = *after, "Range filters applied");
            }
            SearchEvent::PayloadUsed { url, count } => {
                debug!(event = name, url = %url, count = *count, "Structured payload used");
            }
            SearchEvent::Failed { operation, message } => {
                warn!(event = name, operation = %operation, "Search failed: {}", message);
            }
        }
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl SearchEventSink for NoopEventSink {
    fn record(&self, _event: SearchEvent) {}
}
