use anyhow::{Context, Result, anyhow};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::providers::gemini::DEFAULT_GEMINI_ENDPOINT;
use crate::providers::google_translate::DEFAULT_GOOGLE_TRANSLATE_ENDPOINT;
use crate::translation::batch::{BatchOptions, DEFAULT_MODEL};
use crate::translation::chunking::DEFAULT_MAX_CHUNK_CHARS;
use crate::translation::concurrency::{DEFAULT_DELAY_MS, DEFAULT_TITLE_CONCURRENCY};
use crate::translation::fallback::{DEFAULT_SOURCE_LANGUAGE, DEFAULT_TARGET_LANGUAGE};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    /// Generative backend settings
    #[serde(default)]
    pub primary: PrimaryConfig,

    /// Fallback backend settings
    #[serde(default)]
    pub fallback: FallbackConfig,

    /// Batch run settings
    #[serde(default)]
    pub batch: BatchConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Gemini backend configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PrimaryConfig {
    /// API key; usually supplied through `GEMINI_API_KEY` rather than the file
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Model for chapter bodies
    #[serde(default = "default_model")]
    pub model: String,

    /// Model for the title batch
    #[serde(default = "default_model")]
    pub title_model: String,

    /// Service URL
    #[serde(default = "default_gemini_endpoint")]
    pub endpoint: String,

    /// Timeout seconds
    #[serde(default = "default_primary_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PrimaryConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            title_model: default_model(),
            endpoint: default_gemini_endpoint(),
            timeout_secs: default_primary_timeout_secs(),
        }
    }
}

/// Google Translate fallback configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FallbackConfig {
    /// Service URL
    #[serde(default = "default_translate_endpoint")]
    pub endpoint: String,

    /// Source language code
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Max chars per request
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,

    /// Max concurrent title requests
    #[serde(default = "default_title_concurrency")]
    pub title_concurrency: usize,

    /// Timeout seconds
    #[serde(default = "default_fallback_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            endpoint: default_translate_endpoint(),
            source_language: default_source_language(),
            target_language: default_target_language(),
            max_chunk_chars: default_max_chunk_chars(),
            title_concurrency: default_title_concurrency(),
            timeout_secs: default_fallback_timeout_secs(),
        }
    }
}

/// Batch run configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BatchConfig {
    /// Pause after each chapter in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Keep translating when a chapter fails on both backends
    #[serde(default)]
    pub continue_on_error: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            continue_on_error: false,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` filter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_gemini_endpoint() -> String {
    DEFAULT_GEMINI_ENDPOINT.to_string()
}

fn default_translate_endpoint() -> String {
    DEFAULT_GOOGLE_TRANSLATE_ENDPOINT.to_string()
}

fn default_source_language() -> String {
    DEFAULT_SOURCE_LANGUAGE.to_string()
}

fn default_target_language() -> String {
    DEFAULT_TARGET_LANGUAGE.to_string()
}

fn default_primary_timeout_secs() -> u64 {
    120
}

fn default_fallback_timeout_secs() -> u64 {
    30
}

fn default_max_chunk_chars() -> usize {
    DEFAULT_MAX_CHUNK_CHARS
}

fn default_title_concurrency() -> usize {
    DEFAULT_TITLE_CONCURRENCY
}

fn default_delay_ms() -> u64 {
    DEFAULT_DELAY_MS
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Write configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Load the file at `path`, or write and return defaults when it does not exist
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::from_file(path);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Self::default();
        config.save(path)?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.primary.api_key.trim().is_empty() {
            return Err(anyhow!("Gemini API key is required (use --api-key or GEMINI_API_KEY)"));
        }
        if self.primary.model.trim().is_empty() {
            return Err(anyhow!("Model name must not be empty"));
        }
        if self.primary.title_model.trim().is_empty() {
            return Err(anyhow!("Title model name must not be empty"));
        }

        Url::parse(&self.primary.endpoint)
            .with_context(|| format!("Invalid Gemini endpoint: {}", self.primary.endpoint))?;
        Url::parse(&self.fallback.endpoint)
            .with_context(|| format!("Invalid translate endpoint: {}", self.fallback.endpoint))?;

        if self.fallback.max_chunk_chars == 0 {
            return Err(anyhow!("fallback.max_chunk_chars must be greater than zero"));
        }
        if self.fallback.title_concurrency == 0 {
            return Err(anyhow!("fallback.title_concurrency must be greater than zero"));
        }

        Ok(())
    }

    /// Batch options derived from this configuration
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            body_model: self.primary.model.clone(),
            title_model: self.primary.title_model.clone(),
            delay: Duration::from_millis(if self.batch.delay_ms == 0 { DEFAULT_DELAY_MS } else { self.batch.delay_ms }),
            title_concurrency: self.fallback.title_concurrency,
            continue_on_error: self.batch.continue_on_error,
        }
    }
}
