use crate::llm::{ChatMessage, Role};

/// Conversation history injected into the `{chat_history}` prompt slot.
///
/// Keeps every exchange by default; with a window only the `k` most recent
/// question/answer pairs are rendered.
#[derive(Debug, Clone, Default)]
pub struct ConversationBufferMemory {
    messages: Vec<ChatMessage>,
    window: Option<usize>,
}

impl ConversationBufferMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember only the last `k` exchanges.
    pub fn with_window(k: usize) -> Self {
        Self {
            messages: Vec::new(),
            window: Some(k),
        }
    }

    pub fn save_context(&mut self, input: &str, output: &str) {
        self.messages.push(ChatMessage::user(input));
        self.messages.push(ChatMessage::assistant(output));
    }

    /// Messages visible to the next prompt.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        match self.window {
            Some(k) => {
                let start = self.messages.len().saturating_sub(k * 2);
                &self.messages[start..]
            }
            None => &self.messages,
        }
    }

    /// `Human: ...` / `AI: ...` lines for the prompt.
    #[must_use]
    pub fn load_history(&self) -> String {
        self.messages()
            .iter()
            .map(|m| match m.role {
                Role::User => format!("Human: {}", m.content),
                Role::Assistant => format!("AI: {}", m.content),
                Role::System => format!("System: {}", m.content),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
