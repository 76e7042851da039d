use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::DocumentConfig;
use crate::document::DocumentChat;
use crate::llm::ChatModel;

/// Loads the PDF and answers questions from stdin until `quit`.
pub async fn talk_to_pdf(model: Arc<dyn ChatModel>, path: &Path, config: &DocumentConfig) -> Result<()> {
    let chat = DocumentChat::from_pdf(model, path, config)
        .with_context(|| format!("Failed to prepare {}", path.display()))?;
    chat.interactive().await?;
    Ok(())
}
