//! ReAct agent runtime
//!
//! The executor follows the "Thought / Action / Observation" loop:
//! 1. Render the prompt with tool descriptions, the question and the scratchpad
//! 2. Ask the model to continue, stopping before it invents an observation
//! 3. Parse either a tool call or a final answer
//! 4. Run the tool, append its observation to the scratchpad, and repeat
//!    until a final answer or the iteration limit

mod executor;
mod memory;
mod parser;
mod tool;

pub use executor::{AgentExecutor, AgentOutput, ITERATION_LIMIT_OUTPUT, PARSING_ERROR_OBSERVATION};
pub use memory::ConversationBufferMemory;
pub use parser::{AgentAction, AgentFinish, AgentStep, parse_react_output};
pub use tool::{Tool, ToolFn, render_tool_names, render_tools};
