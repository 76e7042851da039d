//! The runnable lessons behind each CLI subcommand.

pub mod memory;
pub mod pdf;
pub mod prompting;
pub mod react;
pub mod strategies;
pub mod travel;

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::cache::ResponseCache;
use crate::config::PromptCraftConfig;
use crate::llm::{ChatModel, OpenRouterClient};
use crate::Result;

/// Shared state for a demo run: configuration and the optional response cache.
pub struct DemoContext {
    pub config: PromptCraftConfig,
    cache: Option<ResponseCache>,
}

impl DemoContext {
    /// Opens the response cache when enabled. A cache that cannot be opened
    /// is reported and skipped.
    pub fn new(config: PromptCraftConfig) -> Self {
        let cache = if config.cache.enabled {
            let ttl = Duration::from_secs(u64::from(config.cache.ttl_hours) * 3600);
            match ResponseCache::open(&config.cache.location, ttl) {
                Ok(cache) => {
                    info!("Response cache at {}", config.cache.location);
                    Some(cache)
                }
                Err(e) => {
                    warn!("Response cache disabled, could not open {}: {e}", config.cache.location);
                    None
                }
            }
        } else {
            None
        };
        Self { config, cache }
    }

    /// Prompting model (`llm` section).
    pub fn llm(&self) -> Result<Arc<dyn ChatModel>> {
        self.model(&self.config.llm.model, self.config.llm.temperature)
    }

    /// Deterministic model used by the agents (`agent` section).
    pub fn agent_llm(&self) -> Result<Arc<dyn ChatModel>> {
        self.model(&self.config.agent.model, self.config.agent.temperature)
    }

    fn model(&self, model: &str, temperature: f32) -> Result<Arc<dyn ChatModel>> {
        let mut client = OpenRouterClient::new(&self.config.llm)?.with_model(model, temperature);
        if let Some(cache) = &self.cache {
            client = client.with_cache(cache.clone());
        }
        Ok(Arc::new(client))
    }
}

pub(crate) fn banner(title: &str) {
    println!("{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

pub(crate) fn divider() {
    println!("\n{}", "-".repeat(60));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_without_cache_builds_models() {
        let mut config = PromptCraftConfig::default();
        config.cache.enabled = false;
        config.agent.model = "openai/gpt-4o".into();

        let ctx = DemoContext::new(config);
        assert!(ctx.cache.is_none());
        assert_eq!(ctx.llm().unwrap().model_name(), "openai/gpt-4.1-nano");
        assert_eq!(ctx.agent_llm().unwrap().model_name(), "openai/gpt-4o");
    }

    #[test]
    fn test_context_opens_cache() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = PromptCraftConfig::default();
        config.cache.location = dir.path().join("cache").display().to_string();

        let ctx = DemoContext::new(config);
        assert!(ctx.cache.is_some());
    }
}
