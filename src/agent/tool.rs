/// Plain function behind a tool: free-form input in, observation text out.
pub type ToolFn = fn(&str) -> String;

/// A callable exposed to the model by name, with a natural-language description.
#[derive(Clone)]
pub struct Tool {
    pub name: String,
    pub description: String,
    func: ToolFn,
}

impl Tool {
    pub fn new(name: impl Into<String>, description: impl Into<String>, func: ToolFn) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            func,
        }
    }

    pub fn run(&self, input: &str) -> String {
        (self.func)(input)
    }
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

/// `name: description`, one tool per line, as injected into `{tools}`.
#[must_use]
pub fn render_tools(tools: &[Tool]) -> String {
    tools
        .iter()
        .map(|t| format!("{}: {}", t.name, t.description))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Comma-separated tool names, as injected into `{tool_names}`.
#[must_use]
pub fn render_tool_names(tools: &[Tool]) -> String {
    tools
        .iter()
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
