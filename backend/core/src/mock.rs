//! Test doubles for the adapter traits.
//!
//! Each double counts its calls so tests can assert that an adapter was (or
//! was not) reached, and can be given a delay to exercise interleaving.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::AdapterError;
use crate::traits::{CompletionProvider, CompletionRequest, PageFetcher, ReportRenderer, TextExtractor};
use crate::types::Blob;

async fn pause(delay: Option<Duration>) {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

/// Extractor returning a fixed result.
pub struct MockExtractor {
    result: Result<String, AdapterError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockExtractor {
    pub fn returning(text: impl Into<String>) -> Self {
        Self { result: Ok(text.into()), delay: None, calls: AtomicUsize::new(0) }
    }

    pub fn failing(err: AdapterError) -> Self {
        Self { result: Err(err), delay: None, calls: AtomicUsize::new(0) }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextExtractor for MockExtractor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn extract(&self, _blob: &Blob) -> Result<String, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        pause(self.delay).await;
        self.result.clone()
    }
}

/// Fetcher returning a fixed result.
pub struct MockFetcher {
    result: Result<String, AdapterError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockFetcher {
    pub fn returning(text: impl Into<String>) -> Self {
        Self { result: Ok(text.into()), delay: None, calls: AtomicUsize::new(0) }
    }

    pub fn failing(err: AdapterError) -> Self {
        Self { result: Err(err), delay: None, calls: AtomicUsize::new(0) }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, _url: &str) -> Result<String, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        pause(self.delay).await;
        self.result.clone()
    }
}

/// Completion provider returning a fixed reply and recording every request.
pub struct MockCompletion {
    result: Result<String, AdapterError>,
    delay: Option<Duration>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletion {
    pub fn returning(reply: impl Into<String>) -> Self {
        Self { result: Ok(reply.into()), delay: None, requests: Mutex::new(Vec::new()) }
    }

    pub fn failing(err: AdapterError) -> Self {
        Self { result: Err(err), delay: None, requests: Mutex::new(Vec::new()) }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Requests seen so far, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CompletionProvider for MockCompletion {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, AdapterError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        pause(self.delay).await;
        self.result.clone()
    }
}

/// Renderer that echoes the body as bytes and records what it was given.
pub struct MockRenderer {
    fail_with: Option<AdapterError>,
    rendered: Mutex<Vec<(String, String)>>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self { fail_with: None, rendered: Mutex::new(Vec::new()) }
    }

    pub fn failing(err: AdapterError) -> Self {
        Self { fail_with: Some(err), rendered: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> usize {
        self.rendered.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// `(title, body)` pairs in call order.
    pub fn rendered(&self) -> Vec<(String, String)> {
        self.rendered.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl Default for MockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReportRenderer for MockRenderer {
    async fn render(&self, title: &str, body: &str) -> Result<Vec<u8>, AdapterError> {
        if let Ok(mut rendered) = self.rendered.lock() {
            rendered.push((title.to_string(), body.to_string()));
        }
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(format!("%PDF-mock\n{title}\n{body}").into_bytes()),
        }
    }
}
