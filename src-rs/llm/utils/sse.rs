use serde_json::Value;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio_stream::Stream;

use crate::llm::error::{ClipError, ClipResult};
use crate::llm::utils::string_util::truncate_utf8_with_ellipsis;

pub type LineStream = Pin<Box<dyn Stream<Item = ClipResult<String>> + Send>>;
pub type FragmentStream = Pin<Box<dyn Stream<Item = ClipResult<String>> + Send>>;

/// Counters for one stream; shared with the consumer so it can read them
/// after the stream ends.
#[derive(Debug, Default)]
pub struct StreamStats {
    lines: AtomicU64,
    dropped: AtomicU64,
    fragments: AtomicU64,
}

impl StreamStats {
    pub fn lines(&self) -> u64 {
        self.lines.load(Ordering::Relaxed)
    }

    /// Lines whose payload was not valid JSON.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn fragments(&self) -> u64 {
        self.fragments.load(Ordering::Relaxed)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum SseLine<'a> {
    Data(&'a str),
    Done,
    Skip,
}

pub fn classify_line(line: &str) -> SseLine<'_> {
    let line = line.trim();
    if line.is_empty() {
        return SseLine::Skip;
    }
    let Some(rest) = line.strip_prefix("data:") else {
        // event:, id:, retry: and ":" comments carry no content
        return SseLine::Skip;
    };
    let payload = rest.strip_prefix(' ').unwrap_or(rest).trim();
    if payload == "[DONE]" {
        return SseLine::Done;
    }
    if payload.is_empty() {
        return SseLine::Skip;
    }
    SseLine::Data(payload)
}

/// Removes the first `\n`-terminated line from `buffer`. A partial line stays put.
pub(crate) fn extract_line_from_buffer(buffer: &mut Vec<u8>) -> Option<String> {
    let pos = buffer.iter().position(|&b| b == b'\n')?;
    let line_bytes: Vec<u8> = buffer.drain(..=pos).collect();
    Some(String::from_utf8_lossy(&line_bytes[..pos]).into_owned())
}

/// Splits a raw body into complete lines. Bytes are only decoded once their
/// line is terminated, so multi-byte characters split across reads survive.
pub fn sse_line_stream<S, T, E>(body: S) -> LineStream
where
    S: Stream<Item = Result<T, E>> + Send + 'static,
    T: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut buffer: Vec<u8> = Vec::new();
        let mut body = Box::pin(body);
        let mut chunk_count = 0u64;

        while let Some(chunk_result) = tokio_stream::StreamExt::next(&mut body).await {
            let bytes = match chunk_result {
                Ok(b) => b,
                Err(e) => {
                    log::error!("Stream read error after {} chunks: {}", chunk_count, e);
                    yield Err(ClipError::StreamRead(e.to_string()));
                    return;
                }
            };
            chunk_count += 1;
            log::trace!("SSE chunk #{}: {} bytes", chunk_count, bytes.as_ref().len());
            buffer.extend_from_slice(bytes.as_ref());

            while let Some(line) = extract_line_from_buffer(&mut buffer) {
                yield Ok(line);
            }
        }

        if !buffer.is_empty() {
            log::debug!(
                "SSE body ended with {} bytes of unterminated line, discarding",
                buffer.len()
            );
        }
    })
}

fn texts_from_payload(value: &Value, extract: fn(&Value) -> Option<String>) -> Vec<String> {
    match value {
        Value::Array(events) => events.iter().filter_map(extract).collect(),
        other => extract(other).into_iter().collect(),
    }
}

/// Turns a raw SSE body into content fragments.
///
/// Lines that do not decode as JSON are dropped and counted in `stats`;
/// `data: [DONE]` ends the sequence.
pub fn fragment_stream<S, T, E>(
    body: S,
    extract: fn(&Value) -> Option<String>,
    stats: Arc<StreamStats>,
) -> FragmentStream
where
    S: Stream<Item = Result<T, E>> + Send + 'static,
    T: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut lines = sse_line_stream(body);

        while let Some(line_result) = tokio_stream::StreamExt::next(&mut lines).await {
            let line = match line_result {
                Ok(l) => l,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };
            stats.lines.fetch_add(1, Ordering::Relaxed);

            let texts = match classify_line(&line) {
                SseLine::Skip => continue,
                SseLine::Done => {
                    log::debug!("SSE stream reached [DONE]");
                    break;
                }
                SseLine::Data(payload) => match serde_json::from_str::<Value>(payload) {
                    Ok(value) => texts_from_payload(&value, extract),
                    Err(e) => {
                        stats.dropped.fetch_add(1, Ordering::Relaxed);
                        log::debug!(
                            "Dropping undecodable SSE line ({}): {}",
                            e,
                            truncate_utf8_with_ellipsis(payload, 200)
                        );
                        continue;
                    }
                },
            };

            for text in texts {
                stats.fragments.fetch_add(1, Ordering::Relaxed);
                yield Ok(text);
            }
        }

        let dropped = stats.dropped.load(Ordering::Relaxed);
        if dropped > 0 {
            log::warn!("SSE stream finished with {} undecodable line(s) dropped", dropped);
        }
        log::debug!(
            "SSE stream finished: {} lines, {} fragments",
            stats.lines.load(Ordering::Relaxed),
            stats.fragments.load(Ordering::Relaxed)
        );
    })
}
