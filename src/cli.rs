//! Command-line surface: one subcommand per lesson.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use crate::config::PromptCraftConfig;
use crate::demos::travel::TravelExample;
use crate::demos::{self, DemoContext};
use crate::telemetry;

/// Prompt-engineering lessons and ReAct agents on an OpenAI-compatible API.
#[derive(Parser, Debug)]
#[command(name = "promptcraft", version, about)]
pub struct Cli {
    /// Lesson to run. Prints an overview when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Configuration file (TOML).
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Model override for prompts and agents.
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Sampling temperature override.
    #[arg(long, global = true)]
    pub temperature: Option<f32>,

    /// Skip the on-disk response cache.
    #[arg(long, global = true)]
    pub no_cache: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Bad prompt versus good prompt.
    Prompt,
    /// Garbage in, garbage out.
    Gigo,
    /// How phrasing changes the answer.
    Sensitivity,
    /// Zero/one/few-shot, chain-of-thought and role prompting.
    Strategies,
    /// Ask the model to identify itself.
    WhichModel,
    /// Chat with a PDF.
    TalkPdf {
        /// PDF to load, defaults to `document.pdf_path`.
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// ReAct travel planner.
    Travel {
        /// Which canned request to run (1-4).
        #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(1..=4))]
        example: u8,
    },
    /// ReAct with a calculator and a knowledge base.
    React,
    /// Executor options: verbose, iteration limit, error handling.
    Executor,
    /// Watch the scratchpad grow.
    Scratchpad,
    /// Anatomy of the ReAct prompt.
    ReactPrompt,
    /// Agents with and without conversation memory.
    Memory,
}

const LESSONS: [(&str, &str); 12] = [
    ("prompt", "Bad prompt versus good prompt"),
    ("gigo", "Garbage in, garbage out"),
    ("sensitivity", "How phrasing changes the answer"),
    ("strategies", "Shots, chain-of-thought, roles"),
    ("which-model", "Ask the model to identify itself"),
    ("talk-pdf", "Chat with a PDF"),
    ("travel", "ReAct travel planner"),
    ("react", "ReAct with calculator and search"),
    ("executor", "Executor options"),
    ("scratchpad", "Watch the scratchpad grow"),
    ("react-prompt", "Anatomy of the ReAct prompt"),
    ("memory", "Agents with and without memory"),
];

impl Cli {
    /// Config file and environment, then command-line overrides.
    pub fn load_config(&self) -> Result<PromptCraftConfig> {
        let mut config = PromptCraftConfig::load_from_path(self.config.clone())?;

        if let Some(model) = &self.model {
            config.llm.model.clone_from(model);
            config.agent.model.clone_from(model);
        }
        if let Some(temperature) = self.temperature {
            config.llm.temperature = temperature;
            config.agent.temperature = temperature;
        }
        if self.no_cache {
            config.cache.enabled = false;
        }

        config.validate().context("Invalid command-line overrides")?;
        Ok(config)
    }

    pub async fn run(self) -> Result<()> {
        let config = self.load_config()?;
        let _telemetry = telemetry::init(&config.logging, self.verbose)?;
        debug!(
            llm = %config.llm.model,
            agent = %config.agent.model,
            cache = config.cache.enabled,
            "Configuration loaded"
        );

        let Some(command) = self.command else {
            print_overview(self.config.as_ref());
            return Ok(());
        };
        info!(?command, "Starting lesson");

        let ctx = DemoContext::new(config);
        match command {
            Command::Prompt => demos::prompting::good_bad_prompt(ctx.llm()?.as_ref()).await,
            Command::Gigo => demos::prompting::garbage_in_garbage_out(ctx.llm()?.as_ref()).await,
            Command::Sensitivity => {
                demos::prompting::sensitivity_to_phrasing(ctx.llm()?.as_ref()).await;
            }
            Command::Strategies => demos::strategies::run(ctx.llm()?.as_ref()).await,
            Command::WhichModel => demos::prompting::which_model(ctx.llm()?.as_ref()).await,
            Command::TalkPdf { path } => {
                let path = path.unwrap_or_else(|| PathBuf::from(&ctx.config.document.pdf_path));
                demos::pdf::talk_to_pdf(ctx.llm()?, &path, &ctx.config.document).await?;
            }
            Command::Travel { example } => {
                let example = TravelExample::from_number(example)?;
                demos::travel::run(ctx.agent_llm()?, &ctx.config.agent, example).await?;
            }
            Command::React => demos::react::deep_dive(ctx.agent_llm()?).await?,
            Command::Executor => demos::react::executor(ctx.agent_llm()?).await?,
            Command::Scratchpad => demos::react::scratchpad(ctx.agent_llm()?).await?,
            Command::ReactPrompt => demos::react::react_prompt_anatomy(ctx.agent_llm()?).await?,
            Command::Memory => demos::memory::run(ctx.agent_llm()?).await?,
        }
        Ok(())
    }
}

fn print_overview(explicit_config: Option<&PathBuf>) {
    println!("PromptCraft v{}", crate::VERSION);
    let config_path = explicit_config
        .cloned()
        .or_else(PromptCraftConfig::get_config_path);
    if let Some(path) = config_path {
        println!("Config: {}", path.display());
    }
    println!("\nLessons:");
    for (name, summary) in LESSONS {
        println!("  {name:<14}{summary}");
    }
    println!("\nRun `promptcraft <lesson>` to start one.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_every_subcommand_is_listed() {
        let cmd = Cli::command();
        for (name, _) in LESSONS {
            assert!(cmd.find_subcommand(name).is_some(), "missing {name}");
        }
        let defined = cmd.get_subcommands().filter(|c| c.get_name() != "help").count();
        assert_eq!(defined, LESSONS.len());
    }

    #[rstest]
    #[case(&["promptcraft", "travel"], Command::Travel { example: 4 })]
    #[case(&["promptcraft", "travel", "--example", "2"], Command::Travel { example: 2 })]
    #[case(&["promptcraft", "react-prompt"], Command::ReactPrompt)]
    #[case(&["promptcraft", "talk-pdf", "--path", "a.pdf"], Command::TalkPdf { path: Some(PathBuf::from("a.pdf")) })]
    fn test_parse_subcommands(#[case] args: &[&str], #[case] expected: Command) {
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.command, Some(expected));
    }

    #[test]
    fn test_example_out_of_range_rejected() {
        assert!(Cli::try_parse_from(["promptcraft", "travel", "--example", "5"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["promptcraft", "gigo", "--model", "x/y", "--no-cache", "-v"])
            .unwrap();
        assert_eq!(cli.model.as_deref(), Some("x/y"));
        assert!(cli.no_cache && cli.verbose);
    }
}
