use napi::bindgen_prelude::*;
use napi_derive::napi;

use crate::clip::frontmatter::{finish_structured, parse_structured, ParsedResult};
use crate::config::AppConfig;
use crate::init_logger;
use crate::llm::models::provider_handle;

use super::types::{JsObsidianConfig, JsParsedResult, JsProbeResult, JsProviderConfig};

fn load_config() -> Result<AppConfig> {
    AppConfig::load().map_err(|e| Error::from_reason(format!("Failed to load config: {}", e)))
}

fn save_config(config: &AppConfig) -> Result<()> {
    config
        .save_settings()
        .map_err(|e| Error::from_reason(format!("Failed to save settings: {}", e)))
}

#[napi(js_name = "initLogger")]
pub fn setup_logging() {
    init_logger();
}

/// Settings with the API key masked, as JSON.
#[napi]
pub fn get_app_config() -> Result<String> {
    let config = load_config()?;
    serde_json::to_string(&config.to_public()).map_err(|e| Error::from_reason(e.to_string()))
}

#[napi]
pub fn save_llm_config(config: JsProviderConfig) -> Result<()> {
    let mut settings = load_config()?;
    settings.set_llm_config(config.into_config()?);
    save_config(&settings)
}

#[napi]
pub fn save_user_prompt(prompt: String) -> Result<()> {
    let mut settings = load_config()?;
    settings.set_user_prompt(prompt);
    save_config(&settings)
}

#[napi]
pub fn reset_user_prompt() -> Result<String> {
    let mut settings = load_config()?;
    settings
        .reset_user_prompt()
        .map_err(|e| Error::from_reason(e.to_string()))?;
    save_config(&settings)?;
    Ok(settings.user_prompt)
}

#[napi]
pub fn save_obsidian_config(config: JsObsidianConfig) -> Result<()> {
    let mut settings = load_config()?;
    settings.set_obsidian_config(config.into());
    save_config(&settings)
}

#[napi]
pub fn add_recent_path(path: String) -> Result<Vec<String>> {
    let mut settings = load_config()?;
    settings.add_recent_path(&path);
    save_config(&settings)?;
    Ok(settings.recent_paths)
}

#[napi]
pub fn build_final_prompt(user_prompt: Option<String>) -> Result<String> {
    let settings = load_config()?;
    let user_prompt = user_prompt
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| settings.user_prompt.clone());
    Ok(settings.build_final_prompt(&user_prompt))
}

#[napi]
pub async fn test_connection(config: JsProviderConfig) -> Result<JsProbeResult> {
    let config = config.into_config()?;
    Ok(provider_handle::test_connection(&config).await.into())
}

/// `finished` applies the end-of-stream fallback for an unclosed fence.
#[napi]
pub fn parse_structured_result(buffer: String, finished: bool) -> JsParsedResult {
    let parsed = if finished {
        finish_structured(&buffer)
    } else {
        parse_structured(&buffer)
    };
    parsed.into()
}

#[napi]
pub fn html_to_markdown(html: String) -> String {
    crate::note::markdown::html_to_markdown(&html)
}

#[napi]
pub fn build_obsidian_uri(config: JsObsidianConfig, title: String, content: String) -> String {
    crate::note::obsidian::build_obsidian_uri(&config.into(), &title, &content)
}

#[napi]
pub fn generate_frontmatter(url: String, author: Option<String>, tags: Vec<String>) -> String {
    crate::note::obsidian::generate_frontmatter(&url, author.as_deref(), &tags, chrono::Utc::now())
}

#[napi]
pub fn compose_note(parsed: JsParsedResult, source_url: String, obsidian: JsObsidianConfig) -> String {
    let parsed: ParsedResult = parsed.into();
    crate::note::obsidian::compose_note(&parsed, &source_url, &obsidian.into(), chrono::Utc::now())
}
