use napi::bindgen_prelude::*;
use napi_derive::napi;

use crate::clip::frontmatter::{Category, ParsedResult};
use crate::clip::types::{ClipEvent, ClipOutcome, ClipRequest};
use crate::config::{ObsidianConfig, ProviderConfig};
use crate::cons::provider_cons::LLMProvider;
use crate::llm::models::provider_handle::ProbeResult;

#[napi(object)]
#[derive(Clone)]
pub struct JsProviderConfig {
    pub provider: String,
    #[napi(js_name = "apiKey")]
    pub api_key: String,
    #[napi(js_name = "baseUrl")]
    pub base_url: String,
    pub model: String,
}

impl JsProviderConfig {
    pub fn into_config(self) -> Result<ProviderConfig> {
        let provider = LLMProvider::from_name(&self.provider).ok_or_else(|| {
            Error::from_reason(format!("Unknown provider: {}", self.provider))
        })?;
        Ok(ProviderConfig {
            provider,
            api_key: self.api_key,
            base_url: self.base_url,
            model: self.model,
        })
    }
}

#[napi(object)]
pub struct JsClipRequest {
    pub content: String,
    pub prompt: Option<String>,
    pub config: JsProviderConfig,
}

impl JsClipRequest {
    pub fn into_request(self) -> Result<ClipRequest> {
        Ok(ClipRequest {
            content: self.content,
            prompt: self.prompt.unwrap_or_default(),
            config: self.config.into_config()?,
        })
    }
}

#[napi(object)]
#[derive(Clone)]
pub struct JsParsedResult {
    pub title: Option<String>,
    pub category: Option<String>,
    pub summary: Option<String>,
    pub author: Option<String>,
    pub body: String,
    #[napi(js_name = "metadataComplete")]
    pub metadata_complete: bool,
}

impl From<ParsedResult> for JsParsedResult {
    fn from(p: ParsedResult) -> Self {
        Self {
            title: p.title,
            category: p.category.map(|c| c.as_str().to_string()),
            summary: p.summary,
            author: p.author,
            body: p.body,
            metadata_complete: p.metadata_complete,
        }
    }
}

impl From<JsParsedResult> for ParsedResult {
    fn from(p: JsParsedResult) -> Self {
        Self {
            title: p.title,
            category: p.category.as_deref().map(Category::parse),
            summary: p.summary,
            author: p.author,
            body: p.body,
            metadata_complete: p.metadata_complete,
        }
    }
}

#[napi(object)]
pub struct JsProbeResult {
    pub success: bool,
    pub error: Option<String>,
}

impl From<ProbeResult> for JsProbeResult {
    fn from(r: ProbeResult) -> Self {
        Self {
            success: r.success,
            error: r.error,
        }
    }
}

#[napi(object)]
#[derive(Clone)]
pub struct JsClipEvent {
    #[napi(js_name = "clipId")]
    pub clip_id: String,
    pub seq: i64,
    #[napi(js_name = "type")]
    pub event_type: String,
    pub chunk: Option<String>,
    pub error: Option<String>,
}

impl JsClipEvent {
    pub fn new(clip_id: &str, seq: i64, event: ClipEvent) -> Self {
        let event_type = event.type_tag().to_string();
        let (chunk, error) = match event {
            ClipEvent::Chunk { chunk } => (Some(chunk), None),
            ClipEvent::End => (None, None),
            ClipEvent::Error { error } => (None, Some(error)),
        };
        Self {
            clip_id: clip_id.to_string(),
            seq,
            event_type,
            chunk,
            error,
        }
    }
}

#[napi(object)]
pub struct JsClipOutcome {
    pub raw: String,
    pub parsed: JsParsedResult,
    #[napi(js_name = "droppedLines")]
    pub dropped_lines: i64,
}

impl From<ClipOutcome> for JsClipOutcome {
    fn from(o: ClipOutcome) -> Self {
        Self {
            raw: o.raw,
            parsed: o.parsed.into(),
            dropped_lines: i64::try_from(o.dropped_lines).unwrap_or(i64::MAX),
        }
    }
}

#[napi(object)]
#[derive(Clone)]
pub struct JsObsidianConfig {
    pub vault: String,
    pub folder: String,
    pub tags: Vec<String>,
}

impl From<JsObsidianConfig> for ObsidianConfig {
    fn from(c: JsObsidianConfig) -> Self {
        Self {
            vault: c.vault,
            folder: c.folder,
            tags: c.tags,
        }
    }
}
