//! Follow-up questions with and without conversation memory.

use std::sync::Arc;

use anyhow::Result;

use crate::agent::{AgentExecutor, ConversationBufferMemory, Tool};
use crate::llm::ChatModel;
use crate::prompt::{PromptTemplate, REACT_MEMORY_TEMPLATE, react_prompt};
use crate::tools::calculator;

const FIRST_QUERY: &str = "What is 10 + 5?";
const FOLLOW_UP: &str = "Now multiply that by 3";

const MEMORY_TYPES: &str = r#"
1. ConversationBufferMemory
   - Stores entire conversation history
   - Simple and effective
   - Can grow large over time
   - Best for short conversations

2. ConversationSummaryMemory
   - Summarizes conversation history
   - Keeps memory size manageable
   - Loses some details
   - Best for long conversations

3. ConversationBufferWindowMemory
   - Keeps only recent messages
   - Fixed size memory
   - Forgets old messages
   - Best for focused conversations

4. ConversationSummaryBufferMemory
   - Combines summary and buffer
   - Keeps recent messages + summary
   - Balances detail and size
   - Best for most use cases


Choosing the Right Memory:
--------------------------
- Short conversations: ConversationBufferMemory
- Long conversations: ConversationSummaryMemory
- Focused conversations: ConversationBufferWindowMemory
- General purpose: ConversationSummaryBufferMemory
    "#;

const TAKEAWAYS: &str = r#"
1. Memory enables multi-turn conversations
2. ConversationBufferMemory is simple and effective
3. Different memory types suit different needs
4. Memory is essential for conversational agents
5. Choose memory type based on use case
    "#;

fn rule() {
    println!("{}", "=".repeat(70));
}

fn heading(title: &str) {
    rule();
    println!("{title}");
    rule();
}

fn tools() -> Vec<Tool> {
    vec![Tool::new(
        "calculator",
        "Evaluates a mathematical expression",
        calculator,
    )]
}

/// Agent that sees `{chat_history}` from a fresh buffer memory.
pub fn create_memory_agent(model: Arc<dyn ChatModel>) -> AgentExecutor {
    AgentExecutor::new(
        model,
        tools(),
        PromptTemplate::from_template(REACT_MEMORY_TEMPLATE),
    )
    .with_memory(ConversationBufferMemory::new())
    .max_iterations(5)
    .verbose(true)
}

/// Runs the two-question conversation, returning both answers.
pub async fn converse(agent: &mut AgentExecutor) -> Result<(String, String)> {
    println!("\nQuery 1: {FIRST_QUERY}");
    let first = agent.invoke(FIRST_QUERY).await?;
    println!("Answer: {}\n", first.output);

    println!("Query 2: {FOLLOW_UP}");
    if agent.memory().is_none() {
        println!("(Agent doesn't remember previous answer!)\n");
    }
    let second = agent.invoke(FOLLOW_UP).await?;
    println!("Answer: {}", second.output);

    Ok((first.output, second.output))
}

pub async fn run(model: Arc<dyn ChatModel>) -> Result<()> {
    println!();
    heading("UNDERSTANDING AGENT MEMORY");
    println!("\nAgent memory enables multi-turn conversations.\nIt's essential for building conversational agents.\n");

    heading("EXAMPLE: AGENT WITHOUT MEMORY");
    let mut forgetful = AgentExecutor::new(model.clone(), tools(), react_prompt(false))
        .max_iterations(5)
        .verbose(true);
    converse(&mut forgetful).await?;
    println!();
    heading("Problem: Agent doesn't remember 'that' refers to 15!");
    println!("\n\n");

    println!();
    heading("EXAMPLE: AGENT WITH MEMORY");
    let mut agent = create_memory_agent(model);
    converse(&mut agent).await?;
    println!();
    heading("Success: Agent remembers 'that' refers to 15!");
    println!("\n\n");

    println!();
    heading("TYPES OF MEMORY");
    println!("{MEMORY_TYPES}");

    println!();
    heading("Key Takeaways:");
    println!("{TAKEAWAYS}");
    Ok(())
}
