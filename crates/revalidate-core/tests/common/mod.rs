//! Test doubles and common utilities for contract tests
//!
//! This module provides minimal test doubles that record what the engine
//! asked for without touching the network.

#![allow(dead_code)]

use revalidate_core::error::{Error, Result};
use revalidate_core::traits::{
    ContentResolver, OutboundRequest, PostRef, RevalidationTransport, TermRef, TransportResponse,
};
use revalidate_core::{
    EngineEvent, MemoryConfigProvider, MemoryContentStore, RevalidateConfig, RevalidateEngine,
    SiteOptions,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// What the recording transport answers
#[derive(Debug, Clone)]
pub enum MockResponse {
    Status(u16),
    TransportError(String),
}

/// One request as the transport saw it
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: serde_json::Value,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A transport that records every call and answers with a fixed response
pub struct RecordingTransport {
    response: MockResponse,
    call_count: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl RecordingTransport {
    pub fn new(response: MockResponse) -> Self {
        Self {
            response,
            call_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn ok() -> Self {
        Self::new(MockResponse::Status(200))
    }

    /// Get the number of times post() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Get every request seen so far
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Create a new RecordingTransport that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            response: other.response.clone(),
            call_count: Arc::clone(&other.call_count),
            requests: Arc::clone(&other.requests),
        }
    }
}

#[async_trait::async_trait]
impl RevalidationTransport for RecordingTransport {
    async fn post(&self, request: &OutboundRequest) -> Result<TransportResponse> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(CapturedRequest {
            url: request.url().to_string(),
            headers: request
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: serde_json::from_str(request.body()).unwrap(),
        });

        match &self.response {
            MockResponse::Status(status) => Ok(TransportResponse::new(*status)),
            MockResponse::TransportError(message) => Err(Error::transport(message.clone())),
        }
    }

    fn transport_name(&self) -> &'static str {
        "recording"
    }
}

/// A resolver whose lookups always fail
pub struct FailingResolver;

#[async_trait::async_trait]
impl ContentResolver for FailingResolver {
    async fn resolve_post(&self, _post_id: u64) -> Result<Option<PostRef>> {
        Err(Error::content_lookup("database unavailable"))
    }

    async fn resolve_term(&self, _term_id: u64, _taxonomy: &str) -> Result<Option<TermRef>> {
        Err(Error::content_lookup("database unavailable"))
    }
}

/// A config provider whose reads always fail
pub struct BrokenConfigProvider;

#[async_trait::async_trait]
impl revalidate_core::ConfigProvider for BrokenConfigProvider {
    async fn site_options(&self) -> Result<SiteOptions> {
        Err(Error::config("option file unreadable"))
    }

    fn provider_name(&self) -> &'static str {
        "broken"
    }
}

/// Options from the reference scenario
pub fn scenario_options() -> SiteOptions {
    SiteOptions::new("https://site.example", "abc")
}

/// A test harness around one engine
pub struct Harness {
    pub engine: RevalidateEngine,
    pub events: mpsc::Receiver<EngineEvent>,
    pub transport: RecordingTransport,
    pub store: MemoryContentStore,
    pub options: MemoryConfigProvider,
}

impl Harness {
    /// Build an engine with an in-memory store and settable options
    pub fn new(response: MockResponse, options: SiteOptions) -> Self {
        let transport = RecordingTransport::new(response);
        let store = MemoryContentStore::new();
        let provider = MemoryConfigProvider::with_options(options);

        let (engine, events) = RevalidateEngine::new(
            Box::new(store.clone()),
            Box::new(provider.clone()),
            Box::new(RecordingTransport::sharing_counters_with(&transport)),
            RevalidateConfig::default(),
        )
        .expect("engine construction succeeds");

        Self {
            engine,
            events,
            transport,
            store,
            options: provider,
        }
    }

    /// Configured engine answering 200
    pub fn configured() -> Self {
        Self::new(MockResponse::Status(200), scenario_options())
    }

    /// Collect every engine event emitted so far
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}
