use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LLMProvider {
    #[default]
    OpenAI,
    #[serde(alias = "anthropic")]
    Claude,
    #[serde(alias = "google")]
    Gemini,
    DeepSeek,
    Custom,
}

/// Request/response convention a provider speaks on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireShape {
    OpenAICompatible,
    AnthropicStyle,
    GeminiStyle,
    Custom,
}

impl LLMProvider {
    /// Returns the identifier used in configuration (e.g., "openai", "claude")
    pub fn provider_name(&self) -> &'static str {
        match self {
            LLMProvider::OpenAI => "openai",
            LLMProvider::Claude => "claude",
            LLMProvider::Gemini => "gemini",
            LLMProvider::DeepSeek => "deepseek",
            LLMProvider::Custom => "custom",
        }
    }

    /// Helper to parse from a string (handles aliases)
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Some(LLMProvider::OpenAI),
            "claude" | "anthropic" => Some(LLMProvider::Claude),
            "gemini" | "google" => Some(LLMProvider::Gemini),
            "deepseek" => Some(LLMProvider::DeepSeek),
            "custom" => Some(LLMProvider::Custom),
            _ => None,
        }
    }

    pub fn wire_shape(&self) -> WireShape {
        match self {
            LLMProvider::OpenAI | LLMProvider::DeepSeek => WireShape::OpenAICompatible,
            LLMProvider::Claude => WireShape::AnthropicStyle,
            LLMProvider::Gemini => WireShape::GeminiStyle,
            LLMProvider::Custom => WireShape::Custom,
        }
    }
}

// Ensure Display trait matches provider_name for convenience
impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.provider_name())
    }
}

/// Version header value sent to Anthropic-style endpoints.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Output token cap for the connectivity probe.
pub const PROBE_MAX_TOKENS: u32 = 10;

pub const PROBE_PROMPT: &str = "Hi";
