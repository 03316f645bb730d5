use serde_json::Value;

use crate::cons::provider_cons::ANTHROPIC_VERSION;
use crate::llm::models::openai::{
    build_chat_completions_probe_body, build_chat_completions_request_body, chat_completions_url,
    extract_chat_completions_delta,
};
use crate::llm::models::provider_base::{ChatRequest, FragmentExtractor, ProviderClient, WireRequest};

/// Anthropic-style endpoint: chat-completions body, but key and version
/// headers instead of a bearer token.
#[derive(Debug, Clone)]
pub struct ClaudeClient {
    pub base_url: String,
    pub api_key: String,
    pub model_name: String,
    pub temperature: f32,
}

impl ClaudeClient {
    pub fn new(base_url: String, api_key: String, model_name: String) -> Self {
        Self {
            base_url,
            api_key,
            model_name,
            temperature: 0.7,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Content-Type", "application/json".to_string()),
            ("x-api-key", self.api_key.clone()),
            ("anthropic-version", ANTHROPIC_VERSION.to_string()),
        ]
    }
}

impl ProviderClient for ClaudeClient {
    fn stream_request(&self, request: &ChatRequest) -> WireRequest {
        WireRequest {
            url: chat_completions_url(&self.base_url),
            headers: self.headers(),
            body: build_chat_completions_request_body(&self.model_name, request, self.temperature),
        }
    }

    fn probe_request(&self) -> WireRequest {
        WireRequest {
            url: chat_completions_url(&self.base_url),
            headers: self.headers(),
            body: build_chat_completions_probe_body(&self.model_name),
        }
    }

    fn fragment_extractor(&self) -> FragmentExtractor {
        extract_text_from_anthropic_payload
    }
}

/// Chat-completions deltas first, then native `content_block_delta` events.
pub fn extract_text_from_anthropic_payload(payload: &Value) -> Option<String> {
    if let Some(text) = extract_chat_completions_delta(payload) {
        return Some(text);
    }
    if payload.get("type").and_then(|t| t.as_str()) != Some("content_block_delta") {
        return None;
    }
    payload
        .pointer("/delta/text")
        .and_then(|t| t.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
