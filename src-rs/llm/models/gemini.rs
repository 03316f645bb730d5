use serde_json::{json, Value};

use crate::cons::provider_cons::{PROBE_MAX_TOKENS, PROBE_PROMPT};
use crate::llm::models::provider_base::{ChatRequest, FragmentExtractor, ProviderClient, WireRequest};

#[derive(Debug, Clone)]
pub struct GeminiClient {
    pub base_url: String,
    pub api_key: String,
    pub model_name: String,
    pub temperature: f32,
}

impl GeminiClient {
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

    fn model_url(&self, method: &str) -> String {
        let key: String = url::form_urlencoded::byte_serialize(self.api_key.as_bytes()).collect();
        format!(
            "{}/models/{}:{}?key={}",
            self.base_url.trim().trim_end_matches('/'),
            self.model_name,
            method,
            key
        )
    }
}

impl ProviderClient for GeminiClient {
    fn stream_request(&self, request: &ChatRequest) -> WireRequest {
        // No system role here: the system prompt is folded into the one user part.
        let text = format!("{}\n\n{}", request.system_prompt, request.user_content);
        WireRequest {
            // alt=sse switches the reply from a JSON array to SSE lines
            url: format!("{}&alt=sse", self.model_url("streamGenerateContent")),
            headers: vec![
                ("Content-Type", "application/json".to_string()),
                ("accept", "text/event-stream".to_string()),
            ],
            body: json!({
                "contents": [{ "parts": [{ "text": text }] }],
                "generationConfig": { "temperature": self.temperature },
            }),
        }
    }

    fn probe_request(&self) -> WireRequest {
        WireRequest {
            url: self.model_url("generateContent"),
            headers: vec![("Content-Type", "application/json".to_string())],
            body: json!({
                "contents": [{ "parts": [{ "text": PROBE_PROMPT }] }],
                "generationConfig": { "maxOutputTokens": PROBE_MAX_TOKENS },
            }),
        }
    }

    fn fragment_extractor(&self) -> FragmentExtractor {
        extract_gemini_text
    }
}

pub fn extract_gemini_text(event: &Value) -> Option<String> {
    event
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
