use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ProviderConfig;
use crate::cons::provider_cons::WireShape;
use crate::llm::error::{ClipError, ClipResult};
use crate::llm::utils::sse::{fragment_stream, StreamStats};
use crate::llm::utils::string_util::take_chars;

use super::claude::ClaudeClient;
use super::gemini::GeminiClient;
use super::openai::OpenAiClient;
pub use super::provider_base::{ChatRequest, ChatStream, FragmentExtractor, ProviderClient, WireRequest};

const PROBE_TIMEOUT: Duration = Duration::from_secs(30);
const PROBE_ERROR_PREVIEW_CHARS: usize = 100;

pub enum AnyProviderClient {
    OpenAI(OpenAiClient),
    Claude(ClaudeClient),
    Gemini(GeminiClient),
    Custom(OpenAiClient),
}

impl ProviderClient for AnyProviderClient {
    fn stream_request(&self, request: &ChatRequest) -> WireRequest {
        match self {
            AnyProviderClient::OpenAI(c) => c.stream_request(request),
            AnyProviderClient::Claude(c) => c.stream_request(request),
            AnyProviderClient::Gemini(c) => c.stream_request(request),
            AnyProviderClient::Custom(c) => c.stream_request(request),
        }
    }

    fn probe_request(&self) -> WireRequest {
        match self {
            AnyProviderClient::OpenAI(c) => c.probe_request(),
            AnyProviderClient::Claude(c) => c.probe_request(),
            AnyProviderClient::Gemini(c) => c.probe_request(),
            AnyProviderClient::Custom(c) => c.probe_request(),
        }
    }

    fn fragment_extractor(&self) -> FragmentExtractor {
        match self {
            AnyProviderClient::OpenAI(c) => c.fragment_extractor(),
            AnyProviderClient::Claude(c) => c.fragment_extractor(),
            AnyProviderClient::Gemini(c) => c.fragment_extractor(),
            AnyProviderClient::Custom(c) => c.fragment_extractor(),
        }
    }
}

impl AnyProviderClient {
    pub fn label(&self) -> &'static str {
        match self {
            AnyProviderClient::OpenAI(_) => "openai-compatible",
            AnyProviderClient::Claude(_) => "anthropic-style",
            AnyProviderClient::Gemini(_) => "gemini-style",
            AnyProviderClient::Custom(_) => "custom",
        }
    }

    /// Sends the streaming request and hands back the lazy fragment sequence.
    /// Non-2xx answers are read to the end and returned as `Transport`.
    pub async fn stream_chat(
        &self,
        http_client: &reqwest::Client,
        request: &ChatRequest,
    ) -> ClipResult<ChatStream> {
        let wire = self.stream_request(request);
        log::debug!("StreamChat, {} request to {}", self.label(), wire.endpoint());

        let response = send_wire_request(http_client, &wire).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| ClipError::StreamRead(e.without_url().to_string()))?;
            log::error!("StreamChat, {} API error ({}): {}", self.label(), status, body);
            return Err(ClipError::Transport {
                status: status.as_u16(),
                body,
            });
        }

        let stats = Arc::new(StreamStats::default());
        let fragments = fragment_stream(
            response.bytes_stream(),
            self.fragment_extractor(),
            Arc::clone(&stats),
        );
        Ok(ChatStream::new(fragments, stats))
    }

    pub async fn probe(&self, http_client: &reqwest::Client) -> ProbeResult {
        let wire = self.probe_request();
        log::debug!("Probe, {} request to {}", self.label(), wire.endpoint());

        let response = match send_wire_request(http_client, &wire).await {
            Ok(r) => r,
            Err(ClipError::Connect { message, .. }) => return ProbeResult::failed(message),
            Err(e) => return ProbeResult::failed(e.to_string()),
        };

        let status = response.status();
        if status.is_success() {
            return ProbeResult::ok();
        }
        let body = response.text().await.unwrap_or_default();
        log::warn!("Probe, {} API error ({}): {}", self.label(), status, body);
        ProbeResult::failed(probe_error_message(status.as_u16(), &body))
    }
}

pub fn create_client(config: &ProviderConfig, temperature: f32) -> AnyProviderClient {
    let base_url = config.endpoint_base().to_string();
    let api_key = config.api_key.trim().to_string();
    let model = config.model.trim().to_string();

    match config.provider.wire_shape() {
        WireShape::OpenAICompatible => AnyProviderClient::OpenAI(
            OpenAiClient::new(base_url, api_key, model).with_temperature(temperature),
        ),
        WireShape::AnthropicStyle => AnyProviderClient::Claude(
            ClaudeClient::new(base_url, api_key, model).with_temperature(temperature),
        ),
        WireShape::GeminiStyle => AnyProviderClient::Gemini(
            GeminiClient::new(base_url, api_key, model).with_temperature(temperature),
        ),
        WireShape::Custom => AnyProviderClient::Custom(
            OpenAiClient::new(base_url, api_key, model).with_temperature(temperature),
        ),
    }
}

async fn send_wire_request(
    http_client: &reqwest::Client,
    wire: &WireRequest,
) -> ClipResult<reqwest::Response> {
    let mut builder = http_client.post(&wire.url);
    for (name, value) in &wire.headers {
        builder = builder.header(*name, value);
    }
    builder
        .json(&wire.body)
        .send()
        .await
        .map_err(|e| ClipError::Connect {
            endpoint: wire.endpoint().to_string(),
            message: e.without_url().to_string(),
        })
}

/// Validates `config`, then opens the fragment stream for `request`.
pub async fn stream_chat(
    config: &ProviderConfig,
    temperature: f32,
    request: &ChatRequest,
) -> ClipResult<ChatStream> {
    config.validate()?;
    let client = create_client(config, temperature);
    let http_client = reqwest::Client::new();
    client.stream_chat(&http_client, request).await
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProbeResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Checks that the configured endpoint accepts the credentials with one
/// minimal request. An empty key fails locally without touching the network.
pub async fn test_connection(config: &ProviderConfig) -> ProbeResult {
    if let Err(e) = config.validate() {
        return match e {
            ClipError::Config(message) => ProbeResult::failed(message),
            other => ProbeResult::failed(other.to_string()),
        };
    }

    let http_client = match reqwest::Client::builder().timeout(PROBE_TIMEOUT).build() {
        Ok(c) => c,
        Err(e) => return ProbeResult::failed(format!("Failed to build HTTP client: {}", e)),
    };
    create_client(config, 0.0).probe(&http_client).await
}

/// `error.message`, then `message`, then `HTTP {status}` for JSON bodies;
/// the start of the raw body otherwise.
pub(crate) fn probe_error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(json) => json
            .pointer("/error/message")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .or_else(|| {
                json.get("message")
                    .and_then(|v| v.as_str())
                    .filter(|s| !s.is_empty())
            })
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status)),
        Err(_) => take_chars(body, PROBE_ERROR_PREVIEW_CHARS),
    }
}
