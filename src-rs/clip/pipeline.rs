use tokio_stream::Stream;

use crate::config::{AppConfig, ProviderConfig};
use crate::llm::error::ClipResult;
use crate::llm::models::provider_handle::{stream_chat, ChatRequest};

use super::frontmatter::IncrementalParser;
use super::manager::emit_event;
use super::types::{ClipEvent, ClipOutcome, ClipRequest};

/// A clip request with every default filled in.
#[derive(Debug, Clone)]
pub struct ResolvedClip {
    pub config: ProviderConfig,
    pub chat: ChatRequest,
    pub temperature: f32,
}

/// Substitutes saved settings for what the caller left empty: the LLM config
/// when `config.api_key` is blank, the composed default prompt when `prompt`
/// is blank. A non-empty `prompt` is already the full system prompt.
pub fn resolve_request(request: ClipRequest, settings: &AppConfig) -> ResolvedClip {
    let ClipRequest {
        content,
        prompt,
        config,
    } = request;

    let config = if config.api_key.trim().is_empty() {
        log::debug!("No API key in request, using saved {} config", settings.llm.provider);
        settings.llm.clone()
    } else {
        config
    };

    let system_prompt = if prompt.trim().is_empty() {
        settings.build_final_prompt(&settings.user_prompt)
    } else {
        prompt
    };

    ResolvedClip {
        config,
        chat: ChatRequest::new(system_prompt, content),
        temperature: settings.temperature,
    }
}

/// Pulls fragments one at a time, forwarding each to the clip's sink and
/// the parser before asking for the next.
pub async fn consume_fragments<S>(clip_id: &str, stream: &mut S) -> ClipResult<IncrementalParser>
where
    S: Stream<Item = ClipResult<String>> + Unpin,
{
    let mut parser = IncrementalParser::new();
    while let Some(fragment) = tokio_stream::StreamExt::next(stream).await {
        let fragment = fragment?;
        emit_event(clip_id, ClipEvent::chunk(fragment.as_str()));
        parser.push(&fragment);
    }
    Ok(parser)
}

async fn stream_resolved(clip_id: &str, resolved: &ResolvedClip) -> ClipResult<ClipOutcome> {
    let mut stream = stream_chat(&resolved.config, resolved.temperature, &resolved.chat).await?;
    let stats = stream.stats();
    let parser = consume_fragments(clip_id, &mut stream).await?;

    Ok(ClipOutcome {
        raw: parser.buffer().to_string(),
        parsed: parser.finish(),
        dropped_lines: stats.dropped(),
    })
}

/// Runs one clip end to end. The sink sees every chunk, then exactly one
/// `End` or `Error`.
pub async fn run_clip(
    clip_id: &str,
    request: ClipRequest,
    settings: &AppConfig,
) -> ClipResult<ClipOutcome> {
    let resolved = resolve_request(request, settings);
    log::info!(
        "Clip {} started: provider={}, model={}, {} chars of content",
        clip_id,
        resolved.config.provider,
        resolved.config.model,
        resolved.chat.user_content.chars().count()
    );

    let result = stream_resolved(clip_id, &resolved).await;
    match &result {
        Ok(outcome) => {
            log::info!(
                "Clip {} finished: {} chars, metadata_complete={}, dropped_lines={}",
                clip_id,
                outcome.raw.chars().count(),
                outcome.parsed.metadata_complete,
                outcome.dropped_lines
            );
            emit_event(clip_id, ClipEvent::End);
        }
        Err(e) => {
            log::error!("Clip {} failed: {}", clip_id, e);
            emit_event(clip_id, ClipEvent::error(e.to_string()));
        }
    }
    result
}
