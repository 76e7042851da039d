//! `PromptCraft` - prompt-engineering lessons and ReAct agents
//!
//! The library holds the pieces the lessons are built from: a chat-completion
//! client with an on-disk response cache, prompt templates, a ReAct agent
//! executor with memory, travel and math tools, and PDF question answering.

pub mod agent;
pub mod cache;
pub mod cli;
pub mod config;
pub mod demos;
pub mod document;
pub mod error;
pub mod llm;
pub mod prompt;
pub mod telemetry;
pub mod tools;

// Re-export core types for public API
pub use agent::{AgentExecutor, AgentOutput, ConversationBufferMemory, Tool};
pub use cache::ResponseCache;
pub use config::PromptCraftConfig;
pub use document::{DocumentChat, RecursiveCharacterTextSplitter};
pub use error::PromptCraftError;
pub use llm::{ChatMessage, ChatModel, OpenRouterClient, Role};
pub use prompt::PromptTemplate;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, PromptCraftError>;
