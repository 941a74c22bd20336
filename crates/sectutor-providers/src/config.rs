//! Configuration loading and provider factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sectutor_core::progress::DEFAULT_PROGRESS_FILE;
use sectutor_core::prompts::DEFAULT_QUESTIONS_PER_QUIZ;
use sectutor_core::traits::{GenerationSettings, LlmProvider};

use crate::gemini::{GeminiProvider, DEFAULT_TIMEOUT_SECS};

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Name of the config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "sectutor.toml";

/// Startup configuration problems. All of them are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GOOGLE_API_KEY is not set. Set it in your environment or a .env file, or add `api_key` to sectutor.toml")]
    MissingApiKey,

    #[error("questions_per_quiz must be between 1 and 20, got {0}")]
    InvalidQuestionCount(u32),

    #[error("temperature must be between 0.0 and 2.0, got {0}")]
    InvalidTemperature(f64),
}

/// Top-level sectutor configuration.
///
/// Note: Custom Debug impl masks the API key to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct SectutorConfig {
    /// Gemini model to use.
    #[serde(default = "default_model")]
    pub model: String,
    /// API base URL override.
    #[serde(default)]
    pub base_url: Option<String>,
    /// API key; `${VAR}` references are resolved. `GOOGLE_API_KEY` wins.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Where study progress is kept.
    #[serde(default = "default_progress_file")]
    pub progress_file: PathBuf,
    /// Questions requested per quiz.
    #[serde(default = "default_questions")]
    pub questions_per_quiz: u32,
    /// Maximum tokens per response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for SectutorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectutorConfig")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("progress_file", &self.progress_file)
            .field("questions_per_quiz", &self.questions_per_quiz)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}
fn default_progress_file() -> PathBuf {
    PathBuf::from(DEFAULT_PROGRESS_FILE)
}
fn default_questions() -> u32 {
    DEFAULT_QUESTIONS_PER_QUIZ
}
fn default_max_tokens() -> u32 {
    2048
}
fn default_temperature() -> f64 {
    0.7
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for SectutorConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: None,
            api_key: None,
            progress_file: default_progress_file(),
            questions_per_quiz: default_questions(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout(),
        }
    }
}

impl SectutorConfig {
    /// The API key, or a configuration error if none is available.
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=20).contains(&self.questions_per_quiz) {
            return Err(ConfigError::InvalidQuestionCount(self.questions_per_quiz));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::InvalidTemperature(self.temperature));
        }
        Ok(())
    }

    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `sectutor.toml` in the current directory
/// 2. `~/.config/sectutor/config.toml`
///
/// A `.env` file (current directory or a parent) is loaded into the
/// environment first; variables already set are left alone.
/// `GOOGLE_API_KEY` overrides any key found in a file.
pub fn load_config() -> Result<SectutorConfig> {
    load_dotenv();
    load_config_from(None)
}

fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("ignoring unreadable .env file: {e}"),
    }
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<SectutorConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<SectutorConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => SectutorConfig::default(),
    };

    config.api_key = config.api_key.as_deref().map(resolve_env_vars);
    config.base_url = config.base_url.as_deref().map(resolve_env_vars);

    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            config.api_key = Some(key);
        }
    }

    config.validate()?;
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("sectutor"))
}

/// Create the Gemini provider described by `config`.
pub fn create_provider(config: &SectutorConfig) -> Result<Box<dyn LlmProvider>> {
    let api_key = config.api_key()?;
    let provider = GeminiProvider::new(api_key, config.base_url.clone(), config.timeout_secs)?;
    Ok(Box::new(provider))
}
