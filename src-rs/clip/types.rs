use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;

use super::frontmatter::ParsedResult;

/// Inbound trigger. Empty `prompt` / `config.api_key` mean "use the saved one".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipRequest {
    pub content: String,
    #[serde(default)]
    pub prompt: String,
    pub config: ProviderConfig,
}

/// Outbound progress, forwarded to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClipEvent {
    #[serde(rename = "AI_STREAM_CHUNK")]
    Chunk { chunk: String },
    #[serde(rename = "AI_STREAM_END")]
    End,
    #[serde(rename = "AI_ERROR")]
    Error { error: String },
}

impl ClipEvent {
    pub fn chunk(text: impl Into<String>) -> Self {
        ClipEvent::Chunk { chunk: text.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ClipEvent::Error {
            error: message.into(),
        }
    }

    pub fn type_tag(&self) -> &'static str {
        match self {
            ClipEvent::Chunk { .. } => "AI_STREAM_CHUNK",
            ClipEvent::End => "AI_STREAM_END",
            ClipEvent::Error { .. } => "AI_ERROR",
        }
    }
}

/// Receiver of progress events. Delivery is fire-and-forget: an `Err` means
/// the consumer went away and is ignored by the caller.
pub trait ClipEventSink: Send + Sync {
    fn emit(&self, seq: i64, event: ClipEvent) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Serialize)]
pub struct ClipOutcome {
    /// Everything the model returned, concatenated.
    pub raw: String,
    pub parsed: ParsedResult,
    /// Stream lines that were not valid JSON and got skipped.
    pub dropped_lines: u64,
}
