//! Layered TOML configuration for Nexus.
//!
//! Reads configuration from multiple sources with precedence:
//! CLI flags > env vars > config file > defaults

use nexus_session::Pacing;
use nexus_types::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use nexus_api::{DEFAULT_BASE_URL as DEFAULT_API_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
pub use nexus_terminal::DEFAULT_CURSOR;

/// The default upstream request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Resolved configuration for a Nexus run.
#[derive(Debug, Clone)]
pub struct NexusConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    pub api_base_url: String,
    pub system_prompt: Option<String>,
    pub request_timeout: Duration,
    pub render: RenderConfig,
}

/// Resolved typing-animation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    pub pacing: Pacing,
    pub cursor: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pacing: Pacing::default(),
            cursor: DEFAULT_CURSOR.to_string(),
        }
    }
}

/// Settings that can be read from a TOML config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub render: RenderSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiSettings {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub base_url: Option<String>,
    pub system_prompt: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Typing-animation section of the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderSettings {
    pub word_delay_ms: Option<u64>,
    pub char_delay_ms: Option<u64>,
    pub cursor: Option<String>,
}

/// CLI overrides that take highest precedence.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    /// Zero every typing delay.
    pub no_animation: bool,
}

/// Environment variables consulted during resolution.
#[derive(Debug, Clone, Default)]
pub struct EnvVars {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

impl EnvVars {
    /// Read `GEMINI_API_KEY`, `NEXUS_MODEL`, and `GEMINI_API_BASE_URL`.
    pub fn from_process() -> Self {
        Self {
            api_key: std::env::var("GEMINI_API_KEY").ok(),
            model: std::env::var("NEXUS_MODEL").ok(),
            base_url: std::env::var("GEMINI_API_BASE_URL").ok(),
        }
    }
}

impl NexusConfig {
    /// Load configuration from all sources, applying precedence rules.
    ///
    /// Precedence (highest to lowest):
    /// 1. CLI flags
    /// 2. Environment variables
    /// 3. Config file (~/.nexus/config.toml)
    /// 4. Defaults
    pub fn load(overrides: CliOverrides) -> Result<Self, ConfigError> {
        let settings = load_settings_file(&config_dir().join("config.toml"));
        Self::resolve(overrides, EnvVars::from_process(), settings)
    }

    /// Apply precedence to already-gathered sources.
    pub fn resolve(
        overrides: CliOverrides,
        env: EnvVars,
        settings: SettingsFile,
    ) -> Result<Self, ConfigError> {
        let api = settings.api;

        // Resolve API key: CLI > env > config file
        let api_key = overrides
            .api_key
            .or(env.api_key)
            .or(api.api_key)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingKey {
                key: "api_key (set GEMINI_API_KEY or add to ~/.nexus/config.toml)".into(),
            })?;

        let model = overrides
            .model
            .or(env.model)
            .or(api.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let max_tokens = overrides
            .max_tokens
            .or(api.max_tokens)
            .unwrap_or(DEFAULT_MAX_TOKENS);
        if max_tokens == 0 {
            return Err(invalid("max_tokens", "must be greater than zero"));
        }

        if let Some(t) = api.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(invalid("temperature", "must be between 0.0 and 2.0"));
            }
        }

        let api_base_url = env
            .base_url
            .or(api.base_url)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let timeout_secs = api.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(invalid("timeout_secs", "must be greater than zero"));
        }

        let render = resolve_render(settings.render, overrides.no_animation)?;

        Ok(NexusConfig {
            api_key,
            model,
            max_tokens,
            temperature: api.temperature,
            api_base_url,
            system_prompt: api.system_prompt,
            request_timeout: Duration::from_secs(timeout_secs),
            render,
        })
    }
}

fn resolve_render(settings: RenderSettings, no_animation: bool) -> Result<RenderConfig, ConfigError> {
    let cursor = settings
        .cursor
        .unwrap_or_else(|| DEFAULT_CURSOR.to_string());
    if cursor.is_empty() {
        return Err(invalid("render.cursor", "must not be empty"));
    }

    if no_animation {
        return Ok(RenderConfig {
            pacing: Pacing::instant(),
            cursor,
        });
    }

    let defaults = Pacing::default();
    let pacing = Pacing {
        word: settings
            .word_delay_ms
            .map_or(defaults.word, Duration::from_millis),
        char: settings
            .char_delay_ms
            .map_or(defaults.char, Duration::from_millis),
    };
    Ok(RenderConfig { pacing, cursor })
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}

/// Get the Nexus config directory path (~/.nexus/).
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("NEXUS_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".nexus")
}

/// Load and parse a TOML settings file, returning defaults on any error.
pub fn load_settings_file(path: &Path) -> SettingsFile {
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Failed to parse {}: {}", path.display(), e);
            SettingsFile::default()
        }),
        Err(_) => {
            tracing::debug!("No config file at {}", path.display());
            SettingsFile::default()
        }
    }
}
