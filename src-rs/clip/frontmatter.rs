//! Incremental split of a model answer into frontmatter metadata and body.
//!
//! Every call works on the whole buffer received so far, so calling it once
//! per fragment, in batches, or twice in a row gives the same answer.

use serde::{Deserialize, Serialize};

pub const FENCE: &str = "---";
const CLOSING_FENCE: &str = "\n---";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Model,
    Tool,
    Product,
    Concept,
    Other,
}

impl Category {
    /// Unknown values fall into `Other`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "model" => Category::Model,
            "tool" => Category::Tool,
            "product" => Category::Product,
            "concept" => Category::Concept,
            _ => Category::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Model => "model",
            Category::Tool => "tool",
            Category::Product => "product",
            Category::Concept => "concept",
            Category::Other => "other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub category: Option<Category>,
    pub summary: Option<String>,
    pub author: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedResult {
    pub title: Option<String>,
    pub category: Option<Category>,
    pub summary: Option<String>,
    pub author: Option<String>,
    pub body: String,
    pub metadata_complete: bool,
}

impl ParsedResult {
    fn with_metadata(meta: Metadata, body: String) -> Self {
        Self {
            title: meta.title,
            category: meta.category,
            summary: meta.summary,
            author: meta.author,
            body,
            metadata_complete: true,
        }
    }

    fn body_only(body: String) -> Self {
        Self {
            body,
            ..Self::default()
        }
    }

    pub fn metadata(&self) -> Metadata {
        Metadata {
            title: self.title.clone(),
            category: self.category,
            summary: self.summary.clone(),
            author: self.author.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// The buffer does not open with a fence; all of it is body.
    NoMetadata,
    /// Opening fence seen (or still possible), closing fence not yet.
    MetadataOpen,
    /// Closing fence at this byte offset.
    MetadataComplete(usize),
}

pub fn parse_state(buffer: &str) -> ParseState {
    if !buffer.starts_with(FENCE) {
        // "", "-" and "--" may still grow into a fence
        if FENCE.starts_with(buffer) {
            return ParseState::MetadataOpen;
        }
        return ParseState::NoMetadata;
    }
    match buffer[FENCE.len()..].find(CLOSING_FENCE) {
        Some(idx) => ParseState::MetadataComplete(FENCE.len() + idx),
        None => ParseState::MetadataOpen,
    }
}

/// `key: value` lines, split on the first colon. Unknown keys are ignored
/// and a repeated key keeps its last value.
pub fn parse_metadata_block(block: &str) -> Metadata {
    let mut meta = Metadata::default();
    for line in block.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        let value = (!value.is_empty()).then(|| value.to_string());
        match key.trim() {
            "title" => meta.title = value,
            "category" => meta.category = value.as_deref().map(Category::parse),
            "summary" => meta.summary = value,
            "author" => meta.author = value,
            _ => {}
        }
    }
    meta
}

fn split_complete(buffer: &str, closing: usize) -> (Metadata, String) {
    // Skip the character that ends the opening fence line (normally '\n').
    let start = buffer[FENCE.len()..]
        .chars()
        .next()
        .map(|c| FENCE.len() + c.len_utf8())
        .unwrap_or(FENCE.len())
        .min(closing);
    let block = buffer[start..closing].trim();
    let body = buffer[closing + CLOSING_FENCE.len()..].trim().to_string();
    (parse_metadata_block(block), body)
}

/// Best interpretation of `buffer` while the stream is still running.
pub fn parse_structured(buffer: &str) -> ParsedResult {
    match parse_state(buffer) {
        ParseState::NoMetadata => ParsedResult::body_only(buffer.to_string()),
        ParseState::MetadataOpen => ParsedResult::default(),
        ParseState::MetadataComplete(closing) => {
            let (meta, body) = split_complete(buffer, closing);
            ParsedResult::with_metadata(meta, body)
        }
    }
}

/// Final interpretation once the stream has ended. A fence that was opened
/// but never closed means there is no metadata: everything after the fence
/// line is body.
pub fn finish_structured(buffer: &str) -> ParsedResult {
    match parse_state(buffer) {
        ParseState::MetadataOpen if buffer.starts_with(FENCE) => {
            let body = buffer
                .split_once('\n')
                .map(|(_, rest)| rest.to_string())
                .unwrap_or_default();
            ParsedResult::body_only(body)
        }
        ParseState::MetadataOpen => ParsedResult::body_only(buffer.to_string()),
        _ => parse_structured(buffer),
    }
}

/// Owns the cumulative buffer of one stream. Metadata is latched the first
/// time the closing fence is seen; afterwards only the body moves.
#[derive(Debug, Default)]
pub struct IncrementalParser {
    buffer: String,
    latched: Option<Metadata>,
    current: ParsedResult,
}

impl IncrementalParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fragment: &str) -> &ParsedResult {
        self.buffer.push_str(fragment);
        self.refresh();
        &self.current
    }

    pub fn current(&self) -> &ParsedResult {
        &self.current
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn is_metadata_complete(&self) -> bool {
        self.latched.is_some()
    }

    pub fn finish(&self) -> ParsedResult {
        match &self.latched {
            Some(meta) => ParsedResult::with_metadata(meta.clone(), self.current.body.clone()),
            None => finish_structured(&self.buffer),
        }
    }

    fn refresh(&mut self) {
        let parsed = parse_structured(&self.buffer);
        if let Some(meta) = &self.latched {
            self.current = ParsedResult::with_metadata(meta.clone(), parsed.body);
            return;
        }
        if parsed.metadata_complete {
            log::debug!("Frontmatter complete after {} bytes", self.buffer.len());
            self.latched = Some(parsed.metadata());
        }
        self.current = parsed;
    }
}
