//! Configuration management for `PromptCraft`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::PromptCraftError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `PromptCraft` application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptCraftConfig {
    /// Chat-completion endpoint used by the prompting demos
    #[serde(default)]
    pub llm: LlmConfig,
    /// Model settings for the ReAct agent demos
    #[serde(default)]
    pub agent: AgentConfig,
    /// Response cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// PDF question-answering settings
    #[serde(default)]
    pub document: DocumentConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Chat-completion endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    /// Bearer token for the endpoint
    pub api_key: Option<String>,
    /// Model identifier, e.g. `openai/gpt-4.1-nano`
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Sampling temperature
    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,
    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u32,
    /// Retries for transient failures
    #[serde(default)]
    pub max_retries: u32,
}

/// ReAct agent settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Model identifier used by agents
    #[serde(default = "default_agent_model")]
    pub model: String,
    /// Sampling temperature used by agents
    #[serde(default)]
    pub temperature: f32,
    /// Maximum Thought/Action/Observation steps per run
    #[serde(default = "default_agent_max_iterations")]
    pub max_iterations: u32,
    /// Feed unparseable model output back as an observation instead of failing
    #[serde(default = "default_true")]
    pub handle_parsing_errors: bool,
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether model responses are cached on disk
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
    /// Cache TTL in hours
    #[serde(default = "default_cache_ttl")]
    pub ttl_hours: u32,
}

/// PDF question-answering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// PDF loaded by `talk-pdf` when no path is given
    #[serde(default = "default_pdf_path")]
    pub pdf_path: String,
    /// Maximum chunk length in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Characters shared between neighbouring chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty, compact or json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// OTLP/HTTP endpoint for trace export
    pub otlp_endpoint: Option<String>,
}

// Default value functions
fn default_llm_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_llm_model() -> String {
    "openai/gpt-4.1-nano".to_string()
}

fn default_llm_temperature() -> f32 {
    0.7
}

fn default_llm_timeout() -> u32 {
    60
}

fn default_agent_model() -> String {
    "openai/gpt-4o".to_string()
}

fn default_agent_max_iterations() -> u32 {
    12
}

fn default_true() -> bool {
    true
}

fn default_cache_location() -> String {
    "cache/promptcraft".to_string()
}

fn default_cache_ttl() -> u32 {
    168
}

fn default_pdf_path() -> String {
    "pdfs/nelson.pdf".to_string()
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            api_key: None,
            model: default_llm_model(),
            temperature: default_llm_temperature(),
            timeout_seconds: default_llm_timeout(),
            max_retries: 0,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: default_agent_model(),
            temperature: 0.0,
            max_iterations: default_agent_max_iterations(),
            handle_parsing_errors: true,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            location: default_cache_location(),
            ttl_hours: default_cache_ttl(),
        }
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            pdf_path: default_pdf_path(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            otlp_endpoint: None,
        }
    }
}

impl PromptCraftConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // The variables the original scripts read from `.env` rank below everything else
        if let Ok(base) = std::env::var("OPENROUTER_BASE") {
            builder = builder
                .set_default("llm.base_url", base)
                .with_context(|| "Invalid OPENROUTER_BASE")?;
        }
        if let Ok(key) = std::env::var("OPENROUTER_API_KEY") {
            builder = builder
                .set_default("llm.api_key", key)
                .with_context(|| "Invalid OPENROUTER_API_KEY")?;
        }

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("promptcraft.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. PROMPTCRAFT_LLM__MODEL
        builder = builder.add_source(
            Environment::with_prefix("PROMPTCRAFT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: PromptCraftConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("promptcraft").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.llm.base_url.is_empty() {
            self.llm.base_url = default_llm_base_url();
        }
        if self.llm.model.is_empty() {
            self.llm.model = default_llm_model();
        }
        if self.llm.timeout_seconds == 0 {
            self.llm.timeout_seconds = default_llm_timeout();
        }
        if self.agent.model.is_empty() {
            self.agent.model = default_agent_model();
        }
        if self.cache.location.is_empty() {
            self.cache.location = default_cache_location();
        }
        if self.cache.ttl_hours == 0 {
            self.cache.ttl_hours = default_cache_ttl();
        }
        if self.document.pdf_path.is_empty() {
            self.document.pdf_path = default_pdf_path();
        }
        if self.document.chunk_size == 0 {
            self.document.chunk_size = default_chunk_size();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self
            .llm
            .api_key
            .as_ref()
            .is_some_and(|key| key.trim().is_empty())
        {
            self.llm.api_key = None;
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        for (name, temperature) in [
            ("LLM", self.llm.temperature),
            ("Agent", self.agent.temperature),
        ] {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(PromptCraftError::config(format!(
                    "{name} temperature must be between 0.0 and 2.0"
                ))
                .into());
            }
        }

        if self.llm.timeout_seconds > 300 {
            return Err(PromptCraftError::config("LLM timeout cannot exceed 300 seconds").into());
        }

        if self.llm.max_retries > 10 {
            return Err(PromptCraftError::config("LLM max retries cannot exceed 10").into());
        }

        if self.agent.max_iterations == 0 || self.agent.max_iterations > 50 {
            return Err(
                PromptCraftError::config("Agent max iterations must be between 1 and 50").into(),
            );
        }

        if self.cache.ttl_hours > 8760 {
            return Err(PromptCraftError::config("Cache TTL cannot exceed 8760 hours (1 year)").into());
        }

        if self.document.chunk_overlap >= self.document.chunk_size {
            return Err(PromptCraftError::config(format!(
                "Chunk overlap ({}) must be smaller than chunk size ({})",
                self.document.chunk_overlap, self.document.chunk_size
            ))
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(PromptCraftError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "compact", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(PromptCraftError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.llm.base_url.starts_with("http://") && !self.llm.base_url.starts_with("https://")
        {
            return Err(
                PromptCraftError::config("LLM base URL must be a valid HTTP or HTTPS URL").into(),
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = PromptCraftConfig::default();
        assert_eq!(config.llm.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.llm.model, "openai/gpt-4.1-nano");
        assert_eq!(config.llm.max_retries, 0);
        assert_eq!(config.agent.model, "openai/gpt-4o");
        assert_eq!(config.agent.max_iterations, 12);
        assert!(config.agent.handle_parsing_errors);
        assert_eq!(config.document.chunk_size, 1000);
        assert_eq!(config.document.chunk_overlap, 200);
        assert!(config.llm.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = PromptCraftConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[rstest]
    #[case::timeout(|c: &mut PromptCraftConfig| c.llm.timeout_seconds = 500, "timeout cannot exceed")]
    #[case::temperature(|c: &mut PromptCraftConfig| c.llm.temperature = 3.5, "temperature must be between")]
    #[case::iterations(|c: &mut PromptCraftConfig| c.agent.max_iterations = 0, "max iterations")]
    #[case::overlap(|c: &mut PromptCraftConfig| c.document.chunk_overlap = 1000, "Chunk overlap")]
    #[case::base_url(|c: &mut PromptCraftConfig| c.llm.base_url = "ftp://x".into(), "HTTP or HTTPS")]
    fn test_config_validation_rejects(
        #[case] mutate: fn(&mut PromptCraftConfig),
        #[case] expected: &str,
    ) {
        let mut config = PromptCraftConfig::default();
        mutate(&mut config);
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains(expected), "unexpected error: {err}");
    }

    #[test]
    fn test_apply_defaults_fills_blanks() {
        let mut config = PromptCraftConfig::default();
        config.llm.model.clear();
        config.document.chunk_size = 0;
        config.llm.api_key = Some("   ".to_string());
        config.apply_defaults();
        assert_eq!(config.llm.model, "openai/gpt-4.1-nano");
        assert_eq!(config.document.chunk_size, 1000);
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[llm]\nmodel = \"openai/gpt-5-nano\"\ntemperature = 0.2\n\n[agent]\nmax_iterations = 5\n"
        )
        .unwrap();

        let config = PromptCraftConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.llm.model, "openai/gpt-5-nano");
        assert!((config.llm.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.agent.max_iterations, 5);
        // untouched sections keep their defaults
        assert_eq!(config.cache.location, "cache/promptcraft");
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = PromptCraftConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("promptcraft"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
