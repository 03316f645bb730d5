use serde_json::{json, Value};

use crate::cons::provider_cons::{PROBE_MAX_TOKENS, PROBE_PROMPT};
use crate::llm::models::provider_base::{ChatRequest, FragmentExtractor, ProviderClient, WireRequest};

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
}

impl OpenAiClient {
    pub fn new(api_base: String, api_key: String, model: String) -> Self {
        Self {
            api_base,
            api_key,
            model,
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
            ("Authorization", format!("Bearer {}", self.api_key)),
        ]
    }
}

impl ProviderClient for OpenAiClient {
    fn stream_request(&self, request: &ChatRequest) -> WireRequest {
        WireRequest {
            url: chat_completions_url(&self.api_base),
            headers: self.headers(),
            body: build_chat_completions_request_body(&self.model, request, self.temperature),
        }
    }

    fn probe_request(&self) -> WireRequest {
        WireRequest {
            url: chat_completions_url(&self.api_base),
            headers: self.headers(),
            body: build_chat_completions_probe_body(&self.model),
        }
    }

    fn fragment_extractor(&self) -> FragmentExtractor {
        extract_chat_completions_delta
    }
}

pub(crate) fn chat_completions_url(api_base: &str) -> String {
    format!("{}/chat/completions", api_base.trim().trim_end_matches('/'))
}

pub(crate) fn build_chat_completions_request_body(
    model: &str,
    request: &ChatRequest,
    temperature: f32,
) -> Value {
    json!({
        "model": model,
        "messages": [
            { "role": "system", "content": request.system_prompt },
            { "role": "user", "content": request.user_content },
        ],
        "stream": true,
        "temperature": temperature,
    })
}

pub(crate) fn build_chat_completions_probe_body(model: &str) -> Value {
    json!({
        "model": model,
        "messages": [{ "role": "user", "content": PROBE_PROMPT }],
        "max_tokens": PROBE_MAX_TOKENS,
    })
}

/// `choices[0].delta.content`; empty deltas (role-only, finish) carry nothing.
pub fn extract_chat_completions_delta(payload: &Value) -> Option<String> {
    payload
        .pointer("/choices/0/delta/content")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
