//! ReAct walkthroughs: the deep dive, executor options, the scratchpad, and
//! the anatomy of the prompt itself.

use std::sync::Arc;

use anyhow::Result;

use crate::agent::{AgentExecutor, Tool, render_tool_names};
use crate::llm::ChatModel;
use crate::prompt::{MATH_ASSISTANT_TEMPLATE, PromptTemplate, react_prompt};
use crate::tools::{calculator_tool, knowledge_base_tool, labelled_calculator, labelled_calculator_tool};

const CUSTOM_TEMPLATE: &str = r#"
You are a helpful assistant. Use these tools:

{tools}

Format:
Question: {input}
Thought: {agent_scratchpad}
"#;

const SCRATCHPAD_STRUCTURE: &str = r#"
The scratchpad follows this pattern:

Thought: [Agent's reasoning about what to do next]
Action: [Tool name to use]
Action Input: [Parameters for the tool]
Observation: [Result from the tool]

Thought: [Agent's reasoning based on the observation]
Action: [Next tool to use, or Final Answer]
Action Input: [Parameters, or empty for Final Answer]
Observation: [Result, or empty for Final Answer]

... continues until Final Answer

Key Points:
- Each Thought builds on previous Observations
- The agent can see its entire reasoning history
- This enables complex multi-step problem solving
- The scratchpad is the agent's working memory
    "#;

fn rule() {
    println!("{}", "=".repeat(50));
}

fn math_and_search_tools() -> Vec<Tool> {
    vec![calculator_tool(), knowledge_base_tool()]
}

/// Calculator and knowledge-base agent, five steps, parse errors are fatal.
pub fn create_deep_dive_agent(model: Arc<dyn ChatModel>) -> AgentExecutor {
    AgentExecutor::new(model, math_and_search_tools(), react_prompt(false))
        .max_iterations(5)
        .verbose(true)
}

pub async fn deep_dive(model: Arc<dyn ChatModel>) -> Result<()> {
    for question in [
        "What is 15 * 8?",
        "What is 20 + 10, then subtract 5, then multiply by 2?",
        "What is Python?",
        "What is LangChain, and what is 10 * 5?",
    ] {
        let mut agent = create_deep_dive_agent(model.clone());
        let result = agent.invoke(question).await?;
        println!("Final Answer: {}", result.output);
    }
    Ok(())
}

fn create_simple_agent(model: Arc<dyn ChatModel>) -> AgentExecutor {
    AgentExecutor::new(model, vec![labelled_calculator_tool()], react_prompt(false))
        .max_iterations(5)
        .handle_parsing_errors(true)
        .verbose(true)
}

/// Basic use, verbose transcripts, a tight iteration limit, and a question the
/// tools cannot answer.
pub async fn executor(model: Arc<dyn ChatModel>) -> Result<()> {
    println!("UNDERSTANDING AGENT EXECUTOR");
    rule();

    println!("Example 1: Basic AgentExecutor Usage");
    rule();
    let result = create_simple_agent(model.clone())
        .invoke("What is 15 multiplied by 8?")
        .await?;
    println!("\nFinal Result: {}", result.output);

    println!("\nExample 2: Verbose Mode - See Agent's Thinking");
    rule();
    println!("Running agent with verbose=True...");
    println!("You'll see the agent's reasoning process:\n");
    create_simple_agent(model.clone())
        .invoke("What is 25 + 17, then multiply that by 3?")
        .await?;

    println!("\nExample 3: Max Iterations");
    rule();
    let mut limited =
        AgentExecutor::new(model.clone(), vec![labelled_calculator_tool()], react_prompt(false))
            .max_iterations(2)
            .verbose(true);
    println!("Running with max_iterations=2...");
    println!("This will stop after 2 tool calls even if not done.\n");
    limited
        .invoke("What is 10 + 5, then multiply by 2, then add 3?")
        .await?;

    println!("\nExample 4: Error Handling");
    rule();
    println!("Running agent with an invalid query...");
    println!("(This should be handled gracefully)\n");
    match create_simple_agent(model)
        .invoke("This is not a math question at all!")
        .await
    {
        Ok(result) => println!("Result: {}", result.output),
        Err(e) => println!("Error handled: {e}"),
    }
    Ok(())
}

fn create_scratchpad_agent(model: Arc<dyn ChatModel>) -> AgentExecutor {
    AgentExecutor::new(model, math_and_search_tools(), react_prompt(false))
        .max_iterations(10)
        .handle_parsing_errors(true)
        .verbose(true)
}

/// Runs three questions so the scratchpad can be watched growing.
pub async fn scratchpad(model: Arc<dyn ChatModel>) -> Result<()> {
    println!("UNDERSTANDING AGENT SCRATCHPAD");
    rule();

    let examples = [
        ("Example 1: Simple Math Problem", "What is 15 * 8?", "Watch the scratchpad build up step by step:\n"),
        (
            "\nExample 2: Multi-Step Problem",
            "What is 20 + 10, then subtract 5, then multiply by 2?",
            "Watch the scratchpad build up over multiple steps:\n",
        ),
        (
            "\nExample 3: Mixed Tool Usage",
            "What is Python, and what is 10 * 5?",
            "Watch the scratchpad show reasoning for different tools:\n",
        ),
    ];

    for (title, query, hint) in examples {
        println!("{title}");
        println!("Query: '{query}'");
        println!("{hint}");
        let result = create_scratchpad_agent(model.clone()).invoke(query).await?;
        println!("\nFinal Answer: {}", result.output);
    }

    println!("\nScratchpad Structure:");
    rule();
    println!("{SCRATCHPAD_STRUCTURE}");
    Ok(())
}

fn show_prompt_anatomy() {
    println!("ANATOMY OF THE REACT PROMPT");
    println!("ReAct prompt has 5 key sections:");
    println!("1. System Instructions - tells agent what to do");
    println!("2. Tools Section - {{tools}} gets replaced with tool descriptions");
    println!("3. Format Section - defines Thought/Action/Observation structure");
    println!("4. Question Section - {{input}} contains user's query");
    println!("5. Scratchpad Section - {{agent_scratchpad}} contains reasoning history");

    println!("\nOur base prompt template:");
    println!("{}", "-".repeat(40));
    println!("{}", react_prompt(false).template());
    println!("{}", "-".repeat(40));
}

fn search_results(query: &str) -> String {
    format!("Search results for: {query}")
}

fn show_tool_injection() {
    println!("\nHOW TOOL DESCRIPTIONS ARE INJECTED");
    println!("The executor:");
    println!("1. Takes all tools in the tools list");
    println!("2. Extracts name and description from each tool");
    println!("3. Formats them in a consistent way");
    println!("4. Replaces {{tools}} in the prompt template");

    let tools = [
        Tool::new("calculator", "Evaluates mathematical expressions", labelled_calculator),
        Tool::new("search", "Searches for information", search_results),
    ];
    println!("\nExample tools: [{}]", render_tool_names(&tools));
    println!("These get formatted and injected into the prompt");
}

/// Template lengths in characters, for the standard, concise and custom prompts.
#[must_use]
pub fn prompt_lengths() -> [usize; 3] {
    [
        react_prompt(false).template().chars().count(),
        react_prompt(true).template().chars().count(),
        CUSTOM_TEMPLATE.chars().count(),
    ]
}

fn show_prompt_variations() {
    println!("\nPROMPT VARIATIONS");
    let [base, concise, custom] = prompt_lengths();
    println!("1. Base Prompt (verbose):");
    println!("   Length: {base} characters");
    println!("2. Concise Prompt:");
    println!("   Length: {concise} characters");
    println!("3. Custom Prompt:");
    println!("   Length: {custom} characters");
}

/// Prompt anatomy, tool injection, prompt variations, then an agent on a
/// minimal custom prompt.
pub async fn react_prompt_anatomy(model: Arc<dyn ChatModel>) -> Result<()> {
    println!("UNDERSTANDING REACT PROMPTS");
    rule();

    show_prompt_anatomy();
    show_tool_injection();
    show_prompt_variations();

    println!("\nCUSTOM PROMPT EXAMPLE");
    let tools = vec![Tool::new(
        "calculator",
        "Evaluates mathematical expressions",
        labelled_calculator,
    )];
    let mut agent = AgentExecutor::new(
        model,
        tools,
        PromptTemplate::from_template(MATH_ASSISTANT_TEMPLATE),
    )
    .max_iterations(5)
    .verbose(true);

    println!("Testing custom prompt...");
    let result = agent.invoke("What is 15 * 8?").await?;
    println!("Result: {}", result.output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concise_prompt_is_shorter() {
        let [base, concise, custom] = prompt_lengths();
        assert!(concise < base);
        assert!(custom < concise);
    }

    #[test]
    fn test_custom_template_variables() {
        let vars = PromptTemplate::from_template(CUSTOM_TEMPLATE).input_variables();
        assert_eq!(vars, vec!["tools", "input", "agent_scratchpad"]);
    }

    #[test]
    fn test_deep_dive_tools() {
        let tools = math_and_search_tools();
        assert_eq!(render_tool_names(&tools), "calculator, search");
        assert_eq!(tools[0].run("10 * 5"), "50");
        assert_eq!(tools[1].run("what is python"), "Python is a high-level programming language.");
    }
}
