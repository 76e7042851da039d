//! ReAct travel planner over the fixed destination registry.

use std::sync::Arc;

use anyhow::{Result, bail};
use tracing::info;

use crate::agent::{AgentExecutor, AgentOutput};
use crate::config::AgentConfig;
use crate::llm::ChatModel;
use crate::prompt::react_prompt;
use crate::tools::travel_tools;

/// The four canned planning requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelExample {
    SimpleQuery,
    ComplexQuery,
    BudgetQuery,
    MultiStep,
}

impl TravelExample {
    pub const ALL: [TravelExample; 4] = [
        TravelExample::SimpleQuery,
        TravelExample::ComplexQuery,
        TravelExample::BudgetQuery,
        TravelExample::MultiStep,
    ];

    /// Examples are numbered from 1.
    pub fn from_number(n: u8) -> Result<Self> {
        match n {
            1..=4 => Ok(Self::ALL[usize::from(n - 1)]),
            _ => bail!("Unknown travel example {n}, expected 1 to 4"),
        }
    }

    #[must_use]
    pub fn question(self) -> &'static str {
        match self {
            TravelExample::SimpleQuery => "What's the weather in Naran?",
            TravelExample::ComplexQuery => {
                "Plan a weekend trip for me. I have 3 days and want to travel up to 500km by road. I prefer cloudy weather."
            }
            TravelExample::BudgetQuery => {
                "Plan a short iterinary for 3-day trip to Naran with a 400 rupees budget including visiting spots in bullet points"
            }
            TravelExample::MultiStep => {
                "What's the distance from Lahore to Murree, and how long would it take to drive there?"
            }
        }
    }

    fn done_message(self) -> Option<&'static str> {
        match self {
            TravelExample::SimpleQuery => Some("Done: used only the needed tool."),
            TravelExample::ComplexQuery => None,
            TravelExample::BudgetQuery => Some("Done: focused on budget only."),
            TravelExample::MultiStep => Some("Done: multi-step handled."),
        }
    }
}

/// Standard ReAct prompt, the six travel tools, limits from `config`.
pub fn create_travel_agent(model: Arc<dyn ChatModel>, config: &AgentConfig) -> AgentExecutor {
    AgentExecutor::new(model, travel_tools(), react_prompt(false))
        .with_config(config)
        .verbose(true)
}

pub async fn run(
    model: Arc<dyn ChatModel>,
    config: &AgentConfig,
    example: TravelExample,
) -> Result<AgentOutput> {
    println!("TRAVEL AGENT PLANNER");
    info!(?example, "Running travel example");

    let mut agent = create_travel_agent(model, config);
    let result = agent.invoke(example.question()).await?;

    if let Some(done) = example.done_message() {
        println!("{done}");
    }
    Ok(result)
}
