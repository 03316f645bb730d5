use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cons::provider_cons::LLMProvider;
use crate::llm::error::ClipError;
use crate::llm::utils::string_util::mask_secret;

const SETTINGS_DIR: &str = ".obsiclip";
const SETTINGS_FILE: &str = "settings.json";

/// Provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider id (e.g., "openai", "claude", "gemini")
    #[serde(default)]
    pub provider: LLMProvider,

    /// API key for authentication
    #[serde(default, alias = "apiKey")]
    pub api_key: String,

    /// Base URL for the LLM API
    #[serde(default, alias = "baseUrl")]
    pub base_url: String,

    /// Model name to use
    #[serde(default)]
    pub model: String,
}

impl ProviderConfig {
    /// Checks the invariants that must hold before any request is sent.
    pub fn validate(&self) -> std::result::Result<(), ClipError> {
        if self.api_key.trim().is_empty() {
            return Err(ClipError::config("API key must not be empty"));
        }

        let base = self.base_url.trim();
        let parsed = url::Url::parse(base)
            .map_err(|e| ClipError::config(format!("Invalid base URL '{}': {}", base, e)))?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ClipError::config(format!(
                    "Base URL must use http or https, got '{}'",
                    other
                )))
            }
        }
        if parsed.host_str().is_none() {
            return Err(ClipError::config(format!("Base URL '{}' has no host", base)));
        }
        if self.model.trim().is_empty() {
            return Err(ClipError::config("Model must not be empty"));
        }
        Ok(())
    }

    /// Base URL without trailing slashes, ready for path joining.
    pub fn endpoint_base(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }
}

/// Obsidian destination configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObsidianConfig {
    #[serde(default)]
    pub vault: String,
    #[serde(default)]
    pub folder: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderPreset {
    pub provider: LLMProvider,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub models: Vec<String>,
}

/// User settings file (restricted fields)
#[derive(Debug, Default, Deserialize)]
pub struct SettingsPatch {
    pub llm: Option<ProviderConfig>,
    #[serde(alias = "userPrompt")]
    pub user_prompt: Option<String>,
    pub obsidian: Option<ObsidianConfig>,
    #[serde(alias = "recentPaths")]
    pub recent_paths: Option<Vec<String>>,
}

#[derive(Serialize)]
struct UserSettings<'a> {
    llm: &'a ProviderConfig,
    user_prompt: &'a str,
    obsidian: &'a ObsidianConfig,
    recent_paths: &'a [String],
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_recent_paths() -> usize {
    5
}

/// Global application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_recent_paths")]
    pub max_recent_paths: usize,

    /// Fixed output-format prompt, not user editable
    pub system_prompt: String,

    /// User editable prompt appended to the system prompt
    pub user_prompt: String,

    pub llm: ProviderConfig,

    #[serde(default)]
    pub obsidian: ObsidianConfig,

    #[serde(default)]
    pub provider_presets: Vec<ProviderPreset>,

    #[serde(default)]
    pub recent_paths: Vec<String>,

    #[serde(skip)]
    settings_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration with layered strategy:
    /// 1. Defaults (Embedded Config.toml)
    /// 2. User settings (~/.obsiclip/settings.json)
    pub fn load() -> Result<Self> {
        Self::load_from_home(dirs::home_dir().as_deref())
    }

    pub fn load_from_home(home: Option<&Path>) -> Result<Self> {
        let mut config = Self::embedded()?;

        if let Some(home) = home {
            let settings_path = home.join(SETTINGS_DIR).join(SETTINGS_FILE);
            Self::apply_patch(&mut config, &settings_path);
            config.settings_path = Some(settings_path);
        }

        Ok(config)
    }

    pub fn embedded() -> Result<Self> {
        let default_str = include_str!("../Config.toml");
        toml::from_str(default_str).context("Failed to parse embedded Config.toml")
    }

    pub(crate) fn apply_patch<P: AsRef<Path>>(config: &mut AppConfig, path: P) {
        let path = path.as_ref();
        if !path.exists() {
            return;
        }
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Failed to read settings at {}: {}", path.display(), e);
                return;
            }
        };

        match serde_json::from_str::<SettingsPatch>(&content) {
            Ok(patch) => {
                if let Some(llm) = patch.llm {
                    config.llm = llm;
                }
                if let Some(prompt) = patch.user_prompt {
                    if !prompt.trim().is_empty() {
                        config.user_prompt = prompt;
                    }
                }
                if let Some(obsidian) = patch.obsidian {
                    config.obsidian = obsidian;
                }
                if let Some(mut paths) = patch.recent_paths {
                    paths.truncate(config.max_recent_paths);
                    config.recent_paths = paths;
                }
            }
            Err(e) => {
                log::warn!("Failed to parse settings at {}: {}", path.display(), e);
            }
        }
    }

    pub fn settings_path(&self) -> Option<&Path> {
        self.settings_path.as_deref()
    }

    pub fn save_settings(&self) -> Result<()> {
        let Some(path) = &self.settings_path else {
            anyhow::bail!("No settings location available (home directory not found)");
        };
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
            }
        }
        let settings = UserSettings {
            llm: &self.llm,
            user_prompt: &self.user_prompt,
            obsidian: &self.obsidian,
            recent_paths: &self.recent_paths,
        };
        let content = serde_json::to_string_pretty(&settings)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write settings to {}", path.display()))?;
        log::debug!("Settings saved to {}", path.display());
        Ok(())
    }

    pub fn set_llm_config(&mut self, llm: ProviderConfig) {
        self.llm = llm;
    }

    pub fn set_user_prompt(&mut self, prompt: String) {
        self.user_prompt = prompt;
    }

    pub fn reset_user_prompt(&mut self) -> Result<()> {
        self.user_prompt = Self::embedded()?.user_prompt;
        Ok(())
    }

    pub fn set_obsidian_config(&mut self, obsidian: ObsidianConfig) {
        self.obsidian = obsidian;
    }

    /// Most recent first, no duplicates, capped at `max_recent_paths`.
    pub fn add_recent_path(&mut self, path: &str) {
        let path = path.trim();
        if path.is_empty() {
            return;
        }
        self.recent_paths.retain(|p| p != path);
        self.recent_paths.insert(0, path.to_string());
        self.recent_paths.truncate(self.max_recent_paths);
    }

    pub fn preset_for(&self, provider: LLMProvider) -> Option<&ProviderPreset> {
        self.provider_presets.iter().find(|p| p.provider == provider)
    }

    pub fn build_final_prompt(&self, user_prompt: &str) -> String {
        format!("{}\n\n{}", self.system_prompt.trim_end(), user_prompt.trim())
    }

    pub fn to_public(&self) -> PublicAppConfig {
        PublicAppConfig {
            temperature: self.temperature,
            llm: PublicProviderConfig {
                provider: self.llm.provider,
                base_url: self.llm.base_url.clone(),
                model: self.llm.model.clone(),
                has_api_key: !self.llm.api_key.trim().is_empty(),
                api_key_hint: mask_secret(&self.llm.api_key),
            },
            user_prompt: self.user_prompt.clone(),
            obsidian: self.obsidian.clone(),
            provider_presets: self.provider_presets.clone(),
            recent_paths: self.recent_paths.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicAppConfig {
    pub temperature: f32,
    pub llm: PublicProviderConfig,
    pub user_prompt: String,
    pub obsidian: ObsidianConfig,
    pub provider_presets: Vec<ProviderPreset>,
    pub recent_paths: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicProviderConfig {
    pub provider: LLMProvider,
    pub base_url: String,
    pub model: String,
    pub has_api_key: bool,
    pub api_key_hint: String,
}
