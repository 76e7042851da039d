//! Library error type.
//!
//! Tools never return these: their failures are `Error: ...` observations the
//! agent reads. Everything around the model call (config, HTTP, cache, files)
//! reports through [`PromptCraftError`].

use thiserror::Error;

/// Anything that can stop a lesson before or around a model call.
#[derive(Error, Debug)]
pub enum PromptCraftError {
    /// Bad settings file, environment variable or command-line override
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Transport failure, non-2xx status or an empty completion
    #[error("API error: {message}")]
    Api { message: String },

    /// Input rejected before anything was sent
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// The fjall store under `cache.location` failed
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// Reply with neither `Final Answer:` nor an action
    #[error("Could not parse LLM output: {message}")]
    Parse { message: String },

    /// PDF or config file access
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Application error: {message}")]
    General { message: String },
}

impl PromptCraftError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// One-line explanation for the terminal.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            PromptCraftError::Config { .. } => {
                "Configuration error: check promptcraft.toml and OPENROUTER_API_KEY.".to_string()
            }
            PromptCraftError::Api { message } => {
                format!("The model call failed ({message}). Is the endpoint reachable and the key valid?")
            }
            PromptCraftError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            PromptCraftError::Cache { message } => {
                format!("Response cache unavailable ({message}). Rerun with --no-cache or delete the cache directory.")
            }
            PromptCraftError::Parse { message } => {
                format!("The model answered in an unexpected format: {message}")
            }
            PromptCraftError::Io { .. } => {
                "Could not read the file. Check the path and its permissions.".to_string()
            }
            PromptCraftError::General { message } => message.clone(),
        }
    }
}

impl From<reqwest::Error> for PromptCraftError {
    fn from(err: reqwest::Error) -> Self {
        PromptCraftError::api(err.to_string())
    }
}

impl From<reqwest_middleware::Error> for PromptCraftError {
    fn from(err: reqwest_middleware::Error) -> Self {
        PromptCraftError::api(err.to_string())
    }
}

impl From<serde_json::Error> for PromptCraftError {
    fn from(err: serde_json::Error) -> Self {
        PromptCraftError::general(format!("JSON error: {err}"))
    }
}
