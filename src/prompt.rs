//! Prompt templates with `{variable}` placeholders, plus the ReAct prompts
//! shared by the agent demos.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::{PromptCraftError, Result};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid placeholder regex"));

/// Standard ReAct prompt: tool list, Thought/Action/Observation format, scratchpad.
pub const REACT_TEMPLATE: &str = r#"
Answer the following questions as best you can. You have access to the following tools:

{tools}

Use the following format:

Question: the input question you must answer
Thought: you should always think about what to do
Action: the action to take, should be one of [{tool_names}]
Action Input: the input to the action
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know the final answer
Final Answer: the final answer to the original input question

Begin!

Question: {input}
Thought: {agent_scratchpad}
"#;

/// Shorter variant that asks for JSON action inputs.
pub const REACT_CONCISE_TEMPLATE: &str = r#"
You are a helpful assistant. Use tools only when needed.

Tools:
{tools}

Format:
Question: <user question>
Thought: think about what to do
Action: one of [{tool_names}]
Action Input: {"key": "value"} (valid JSON, no quotes around the whole thing)
Observation: result of the action
... (repeat as needed)
Thought: I now know the final answer
Final Answer: concise final answer

Begin!

Question: {input}
Thought: {agent_scratchpad}
"#;

/// ReAct prompt with a `{chat_history}` slot for conversation memory.
pub const REACT_MEMORY_TEMPLATE: &str = r#"
You are a helpful assistant. You have access to the following tools:

{tools}

Use the following format:

Question: the input question you must answer
Thought: you should always think about what to do
Action: the action to take, should be one of [{tool_names}]
Action Input: the input to the action
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know the final answer
Final Answer: the final answer to the original input question

Previous conversation:
{chat_history}

Begin!

Question: {input}
Thought: {agent_scratchpad}
"#;

/// Minimal prompt for a calculator-only math assistant.
pub const MATH_ASSISTANT_TEMPLATE: &str = r#"
You are a math assistant. Use the calculator tool when needed.

Tools: {tools}

Question: {input}
Thought: {agent_scratchpad}
"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn from_template(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Placeholder names in first-seen order, without duplicates.
    #[must_use]
    pub fn input_variables(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        PLACEHOLDER
            .captures_iter(&self.template)
            .filter_map(|c| {
                let name = c[1].to_string();
                seen.insert(name.clone()).then_some(name)
            })
            .collect()
    }

    #[must_use]
    pub fn has_variable(&self, name: &str) -> bool {
        self.input_variables().iter().any(|v| v == name)
    }

    /// Substitutes every placeholder in a single pass.
    ///
    /// Brace text that is not an identifier (JSON examples) is left as is.
    pub fn format(&self, vars: &[(&str, &str)]) -> Result<String> {
        if let Some(missing) = self
            .input_variables()
            .into_iter()
            .find(|name| !vars.iter().any(|(k, _)| *k == name.as_str()))
        {
            return Err(PromptCraftError::validation(format!(
                "Missing value for prompt variable '{missing}'"
            )));
        }

        let rendered = PLACEHOLDER.replace_all(&self.template, |c: &Captures| {
            vars.iter()
                .find(|(k, _)| *k == &c[1])
                .map(|(_, v)| (*v).to_string())
                .unwrap_or_default()
        });
        Ok(rendered.into_owned())
    }
}

/// The standard or concise ReAct prompt.
#[must_use]
pub fn react_prompt(concise: bool) -> PromptTemplate {
    if concise {
        PromptTemplate::from_template(REACT_CONCISE_TEMPLATE)
    } else {
        PromptTemplate::from_template(REACT_TEMPLATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_react_prompt_variables() {
        let vars = react_prompt(false).input_variables();
        assert_eq!(vars, vec!["tools", "tool_names", "input", "agent_scratchpad"]);
    }

    #[test]
    fn test_concise_prompt_keeps_json_example() {
        let prompt = react_prompt(true);
        assert!(!prompt.has_variable("key"));
        let rendered = prompt
            .format(&[
                ("tools", "calculator: math"),
                ("tool_names", "calculator"),
                ("input", "What is 2 + 2?"),
                ("agent_scratchpad", ""),
            ])
            .unwrap();
        assert!(rendered.contains(r#"Action Input: {"key": "value"}"#));
        assert!(rendered.contains("Question: What is 2 + 2?"));
    }

    #[test]
    fn test_memory_prompt_has_history_slot() {
        let prompt = PromptTemplate::from_template(REACT_MEMORY_TEMPLATE);
        assert!(prompt.has_variable("chat_history"));
    }

    #[test]
    fn test_missing_variable_is_an_error() {
        let prompt = PromptTemplate::from_template("Question: {input}");
        let err = prompt.format(&[]).unwrap_err();
        assert!(err.to_string().contains("input"));
    }

    #[test]
    fn test_values_are_not_reformatted() {
        let prompt = PromptTemplate::from_template("{a} and {b}");
        let rendered = prompt.format(&[("a", "{b}"), ("b", "x")]).unwrap();
        assert_eq!(rendered, "{b} and x");
    }
}
