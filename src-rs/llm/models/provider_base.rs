use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio_stream::Stream;

use crate::llm::error::ClipResult;
use crate::llm::utils::sse::{FragmentStream, StreamStats};

/// One single-turn request: the composed system prompt plus the page content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub system_prompt: String,
    pub user_content: String,
}

impl ChatRequest {
    pub fn new(system_prompt: impl Into<String>, user_content: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_content: user_content.into(),
        }
    }
}

/// A fully built POST call, independent of the HTTP client that sends it.
#[derive(Debug, Clone)]
pub struct WireRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Value,
}

impl WireRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// URL without the query string, safe to log (Gemini carries the key there).
    pub fn endpoint(&self) -> &str {
        self.url.split('?').next().unwrap_or(&self.url)
    }
}

/// Pulls the text of one decoded SSE payload, if it carries any.
pub type FragmentExtractor = fn(&Value) -> Option<String>;

/// Per-vendor wire format: how to build requests and where the text lives.
pub trait ProviderClient: Send + Sync {
    fn stream_request(&self, request: &ChatRequest) -> WireRequest;

    /// Minimal non-streaming request used to check credentials.
    fn probe_request(&self) -> WireRequest;

    fn fragment_extractor(&self) -> FragmentExtractor;
}

/// Lazy fragment sequence of one chat call. Finite and non-restartable.
pub struct ChatStream {
    inner: FragmentStream,
    stats: Arc<StreamStats>,
}

impl ChatStream {
    pub fn new(inner: FragmentStream, stats: Arc<StreamStats>) -> Self {
        Self { inner, stats }
    }

    pub fn stats(&self) -> Arc<StreamStats> {
        Arc::clone(&self.stats)
    }
}

impl Stream for ChatStream {
    type Item = ClipResult<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}
