//! Configuration schema for the semgrid CLI.

use serde::{Deserialize, Serialize};

use semgrid::render::HighlightPolicy;

use super::ConfigError;

/// Which embedding backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Local Ollama server.
    #[default]
    Ollama,
    /// OpenAI Embeddings API.
    OpenAI,
}

impl Backend {
    /// Backend name as written in config files.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::OpenAI => "openai",
        }
    }
}

/// Embedding provider settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSection {
    /// Backend selection.
    pub backend: Backend,
    /// Base URL override.
    pub base_url: Option<String>,
    /// Embedding model override.
    pub model: Option<String>,
    /// API key (OpenAI backend; falls back to `OPENAI_API_KEY`).
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

/// Matrix rendering settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    /// Scores above this get accent styling.
    pub accent_threshold: f32,
    /// Scores above this get emphasis styling.
    pub emphasis_threshold: f32,
    /// Decimal places for rendered scores.
    pub precision: usize,
}

impl DisplaySection {
    /// The highlight policy these settings describe.
    #[must_use]
    pub const fn policy(&self) -> HighlightPolicy {
        HighlightPolicy::new(self.accent_threshold, self.emphasis_threshold)
    }
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            accent_threshold: HighlightPolicy::DEFAULT_ACCENT,
            emphasis_threshold: HighlightPolicy::DEFAULT_EMPHASIS,
            precision: 4,
        }
    }
}

/// Top-level CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Embedding provider settings.
    pub provider: ProviderSection,
    /// Matrix rendering settings.
    pub display: DisplaySection,
}

impl AppConfig {
    /// Validate threshold and precision ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.display;
        for (name, value) in [
            ("display.accent_threshold", d.accent_threshold),
            ("display.emphasis_threshold", d.emphasis_threshold),
        ] {
            if !(-1.0..=1.0).contains(&value) || value.is_nan() {
                return Err(ConfigError::InvalidValue(format!(
                    "{name} must be within [-1, 1], got {value}"
                )));
            }
        }
        if d.accent_threshold > d.emphasis_threshold {
            return Err(ConfigError::InvalidValue(format!(
                "display.accent_threshold ({}) must not exceed display.emphasis_threshold ({})",
                d.accent_threshold, d.emphasis_threshold
            )));
        }
        if d.precision > 10 {
            return Err(ConfigError::InvalidValue(format!(
                "display.precision must be at most 10, got {}",
                d.precision
            )));
        }
        Ok(())
    }
}
