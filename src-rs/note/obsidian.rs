use chrono::{DateTime, SecondsFormat, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use crate::clip::frontmatter::{Category, ParsedResult};
use crate::config::ObsidianConfig;
use crate::llm::utils::string_util::take_chars;

const MAX_FILE_NAME_CHARS: usize = 100;

lazy_static! {
    static ref ILLEGAL_FILE_CHARS: Regex =
        Regex::new(r#"[\\/:*?"<>|]"#).expect("valid file name regex");
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").expect("valid whitespace regex");
}

/// Makes `name` usable as a vault file name.
pub fn sanitize_file_name(name: &str) -> String {
    let replaced = ILLEGAL_FILE_CHARS.replace_all(name, "-");
    let collapsed = WHITESPACE_RUN.replace_all(&replaced, " ");
    take_chars(collapsed.trim(), MAX_FILE_NAME_CHARS)
}

pub fn note_path(config: &ObsidianConfig, title: &str) -> String {
    let file_name = sanitize_file_name(title);
    let folder = config.folder.trim().trim_matches('/');
    if folder.is_empty() {
        file_name
    } else {
        format!("{}/{}", folder, file_name)
    }
}

/// `obsidian://new` URI that creates the note in the configured vault.
pub fn build_obsidian_uri(config: &ObsidianConfig, title: &str, content: &str) -> String {
    let mut uri = format!(
        "obsidian://new?file={}",
        urlencoding::encode(&note_path(config, title))
    );
    let vault = config.vault.trim();
    if !vault.is_empty() {
        uri.push_str("&vault=");
        uri.push_str(&urlencoding::encode(vault));
    }
    uri.push_str("&content=");
    uri.push_str(&urlencoding::encode(content));
    uri
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

#[derive(Debug, Clone)]
pub struct NoteFrontmatter<'a> {
    pub source: &'a str,
    pub clipped_at: DateTime<Utc>,
    pub author: Option<&'a str>,
    pub title: Option<&'a str>,
    pub category: Option<Category>,
    pub summary: Option<&'a str>,
    pub tags: &'a [String],
}

impl<'a> NoteFrontmatter<'a> {
    pub fn new(source: &'a str, clipped_at: DateTime<Utc>) -> Self {
        Self {
            source,
            clipped_at,
            author: None,
            title: None,
            category: None,
            summary: None,
            tags: &[],
        }
    }

    pub fn render(&self) -> String {
        let mut lines = vec!["---".to_string()];
        lines.push(format!("source: {}", quoted(self.source)));
        lines.push(format!(
            "clipped_at: {}",
            quoted(&self.clipped_at.to_rfc3339_opts(SecondsFormat::Millis, true))
        ));

        let optional = [
            ("author", self.author),
            ("title", self.title),
            ("category", self.category.map(|c| c.as_str())),
            ("summary", self.summary),
        ];
        for (key, value) in optional {
            if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
                lines.push(format!("{}: {}", key, quoted(v)));
            }
        }

        let tags: Vec<String> = self
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(quoted)
            .collect();
        if !tags.is_empty() {
            lines.push(format!("tags: [{}]", tags.join(", ")));
        }

        lines.push("---".to_string());
        lines.push(String::new());
        lines.join("\n")
    }
}

pub fn generate_frontmatter(
    url: &str,
    author: Option<&str>,
    tags: &[String],
    clipped_at: DateTime<Utc>,
) -> String {
    NoteFrontmatter {
        author,
        tags,
        ..NoteFrontmatter::new(url, clipped_at)
    }
    .render()
}

/// Full note text for an AI-processed clip: generated frontmatter carrying
/// the model's metadata, a blank line, then the body.
pub fn compose_note(
    parsed: &ParsedResult,
    source_url: &str,
    obsidian: &ObsidianConfig,
    clipped_at: DateTime<Utc>,
) -> String {
    let frontmatter = NoteFrontmatter {
        author: parsed.author.as_deref(),
        title: parsed.title.as_deref(),
        category: parsed.category,
        summary: parsed.summary.as_deref(),
        tags: &obsidian.tags,
        ..NoteFrontmatter::new(source_url, clipped_at)
    }
    .render();
    format!("{}\n{}", frontmatter, parsed.body.trim())
}
