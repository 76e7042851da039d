//! The Thought/Action/Observation loop.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::memory::ConversationBufferMemory;
use super::parser::{AgentAction, AgentStep, parse_react_output};
use super::tool::{Tool, render_tool_names, render_tools};
use crate::config::AgentConfig;
use crate::llm::{ChatMessage, ChatModel};
use crate::prompt::PromptTemplate;
use crate::Result;

/// Output when the loop runs out of steps before a final answer.
pub const ITERATION_LIMIT_OUTPUT: &str = "Agent stopped due to iteration limit or time limit.";

/// Observation fed back when the model's output could not be parsed.
pub const PARSING_ERROR_OBSERVATION: &str = "Invalid or incomplete response";

const OBSERVATION_STOP: &str = "\nObservation";

/// Result of one agent run.
#[derive(Debug, Clone)]
pub struct AgentOutput {
    pub input: String,
    pub output: String,
    /// Every action taken, paired with its observation
    pub intermediate_steps: Vec<(AgentAction, String)>,
}

pub struct AgentExecutor {
    model: Arc<dyn ChatModel>,
    tools: Vec<Tool>,
    prompt: PromptTemplate,
    max_iterations: usize,
    handle_parsing_errors: bool,
    verbose: bool,
    memory: Option<ConversationBufferMemory>,
}

impl AgentExecutor {
    pub fn new(model: Arc<dyn ChatModel>, tools: Vec<Tool>, prompt: PromptTemplate) -> Self {
        Self {
            model,
            tools,
            prompt,
            max_iterations: 15,
            handle_parsing_errors: false,
            verbose: false,
            memory: None,
        }
    }

    /// Take iteration limit and parsing-error handling from configuration.
    #[must_use]
    pub fn with_config(self, config: &AgentConfig) -> Self {
        self.max_iterations(config.max_iterations as usize)
            .handle_parsing_errors(config.handle_parsing_errors)
    }

    #[must_use]
    pub fn max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    #[must_use]
    pub fn handle_parsing_errors(mut self, handle: bool) -> Self {
        self.handle_parsing_errors = handle;
        self
    }

    /// Print the chain transcript to stdout.
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    #[must_use]
    pub fn with_memory(mut self, memory: ConversationBufferMemory) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn memory(&self) -> Option<&ConversationBufferMemory> {
        self.memory.as_ref()
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    /// Run the loop for one question.
    #[instrument(skip(self), fields(model = self.model.model_name()))]
    pub async fn invoke(&mut self, input: &str) -> Result<AgentOutput> {
        let tools = render_tools(&self.tools);
        let tool_names = render_tool_names(&self.tools);
        let history = self
            .memory
            .as_ref()
            .map(ConversationBufferMemory::load_history)
            .unwrap_or_default();
        let stop = [OBSERVATION_STOP.to_string()];

        if self.verbose {
            println!("\n> Entering new AgentExecutor chain...");
        }

        let mut steps: Vec<(AgentAction, String)> = Vec::new();
        let mut output = None;

        for iteration in 0..self.max_iterations {
            debug!("Agent iteration {}", iteration + 1);

            let scratchpad = format_scratchpad(&steps);
            let prompt = self.prompt.format(&[
                ("input", input),
                ("tools", &tools),
                ("tool_names", &tool_names),
                ("agent_scratchpad", &scratchpad),
                ("chat_history", &history),
            ])?;

            let text = self.model.chat(&[ChatMessage::user(prompt)], &stop).await?;
            if self.verbose {
                println!("{text}");
            }

            match parse_react_output(&text) {
                Ok(AgentStep::Finish(finish)) => {
                    output = Some(finish.output);
                    break;
                }
                Ok(AgentStep::Action(action)) => {
                    let observation = self.dispatch(&action);
                    info!(tool = %action.tool, "Observation: {}", observation);
                    if self.verbose {
                        println!("Observation: {observation}");
                    }
                    steps.push((action, observation));
                }
                Err(e) if self.handle_parsing_errors => {
                    warn!("Unparseable agent output: {e}");
                    if self.verbose {
                        println!("{PARSING_ERROR_OBSERVATION}");
                    }
                    steps.push((
                        AgentAction {
                            tool: "_Exception".to_string(),
                            tool_input: PARSING_ERROR_OBSERVATION.to_string(),
                            log: text,
                        },
                        PARSING_ERROR_OBSERVATION.to_string(),
                    ));
                }
                Err(e) => return Err(e),
            }
        }

        let output = output.unwrap_or_else(|| {
            warn!("Reached max iterations ({})", self.max_iterations);
            ITERATION_LIMIT_OUTPUT.to_string()
        });

        if self.verbose {
            println!("\n> Finished chain.");
        }

        if let Some(memory) = self.memory.as_mut() {
            memory.save_context(input, &output);
        }

        Ok(AgentOutput {
            input: input.to_string(),
            output,
            intermediate_steps: steps,
        })
    }

    fn dispatch(&self, action: &AgentAction) -> String {
        match self.tools.iter().find(|t| t.name == action.tool) {
            Some(tool) => tool.run(&action.tool_input),
            None => format!(
                "{} is not a valid tool, try one of [{}].",
                action.tool,
                render_tool_names(&self.tools)
            ),
        }
    }
}

/// Previous steps rendered so the model continues after the last observation.
fn format_scratchpad(steps: &[(AgentAction, String)]) -> String {
    steps
        .iter()
        .map(|(action, observation)| {
            format!("{}\nObservation: {}\nThought: ", action.log, observation)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::react_prompt;
    use crate::PromptCraftError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replays canned completions and records the prompts it was sent.
    struct ScriptedModel {
        replies: Mutex<Vec<String>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn new(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().rev().map(|s| s.to_string()).collect()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        fn model_name(&self) -> &str {
            "scripted"
        }

        async fn chat(&self, messages: &[ChatMessage], stop: &[String]) -> Result<String> {
            assert_eq!(stop, ["\nObservation".to_string()]);
            self.prompts.lock().unwrap().push(messages[0].content.clone());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| PromptCraftError::api("script exhausted"))
        }
    }

    fn double(input: &str) -> String {
        input
            .trim()
            .parse::<i64>()
            .map(|n| (n * 2).to_string())
            .unwrap_or_else(|_| "Error: not a number".to_string())
    }

    fn tools() -> Vec<Tool> {
        vec![Tool::new("double", "Doubles an integer", double)]
    }

    #[tokio::test]
    async fn test_tool_call_then_answer() {
        let model = ScriptedModel::new(&[
            "I should double it.\nAction: double\nAction Input: 21",
            "I now know the final answer\nFinal Answer: 42",
        ]);
        let mut agent = AgentExecutor::new(model.clone(), tools(), react_prompt(false));

        let result = agent.invoke("Double 21").await.unwrap();
        assert_eq!(result.output, "42");
        assert_eq!(result.intermediate_steps.len(), 1);
        assert_eq!(result.intermediate_steps[0].1, "42");

        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].contains("double: Doubles an integer"));
        assert!(prompts[0].ends_with("Thought: \n"));
        assert!(prompts[1].contains("Action Input: 21\nObservation: 42\nThought: "));
    }

    #[tokio::test]
    async fn test_unknown_tool_observation() {
        let model = ScriptedModel::new(&[
            "Action: triple\nAction Input: 3",
            "Final Answer: cannot triple",
        ]);
        let mut agent = AgentExecutor::new(model, tools(), react_prompt(false));

        let result = agent.invoke("Triple 3").await.unwrap();
        assert_eq!(
            result.intermediate_steps[0].1,
            "triple is not a valid tool, try one of [double]."
        );
    }

    #[tokio::test]
    async fn test_parse_error_handling() {
        let model = ScriptedModel::new(&["no idea", "Final Answer: fine"]);
        let mut agent =
            AgentExecutor::new(model, tools(), react_prompt(false)).handle_parsing_errors(true);
        let result = agent.invoke("?").await.unwrap();
        assert_eq!(result.output, "fine");
        assert_eq!(result.intermediate_steps[0].1, PARSING_ERROR_OBSERVATION);

        let model = ScriptedModel::new(&["no idea"]);
        let mut strict = AgentExecutor::new(model, tools(), react_prompt(false));
        let err = strict.invoke("?").await.unwrap_err();
        assert!(matches!(err, PromptCraftError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_iteration_limit() {
        let model = ScriptedModel::new(&[
            "Action: double\nAction Input: 1",
            "Action: double\nAction Input: 2",
        ]);
        let mut agent = AgentExecutor::new(model, tools(), react_prompt(false)).max_iterations(2);
        let result = agent.invoke("Keep doubling").await.unwrap();
        assert_eq!(result.output, ITERATION_LIMIT_OUTPUT);
        assert_eq!(result.intermediate_steps.len(), 2);
    }

    #[tokio::test]
    async fn test_memory_is_saved_and_rendered() {
        let model = ScriptedModel::new(&["Final Answer: 15", "Final Answer: 45"]);
        let prompt = PromptTemplate::from_template(crate::prompt::REACT_MEMORY_TEMPLATE);
        let mut agent = AgentExecutor::new(model.clone(), tools(), prompt)
            .with_memory(ConversationBufferMemory::new());

        agent.invoke("What is 10 + 5?").await.unwrap();
        agent.invoke("Now multiply that by 3").await.unwrap();

        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[1].contains("Human: What is 10 + 5?\nAI: 15"));
        assert_eq!(agent.memory().unwrap().messages().len(), 4);
    }
}
