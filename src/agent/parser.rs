use std::sync::LazyLock;

use regex::Regex;

use crate::{PromptCraftError, Result};

const FINAL_ANSWER: &str = "Final Answer:";

static ACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)")
        .expect("valid action regex")
});
static ACTION_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Action\s*\d*\s*:").expect("valid action regex"));
static ACTION_INPUT_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Action\s*\d*\s*Input\s*\d*\s*:").expect("valid input regex"));

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentAction {
    pub tool: String,
    pub tool_input: String,
    /// The raw model output that produced this action
    pub log: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentFinish {
    pub output: String,
    pub log: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentStep {
    Action(AgentAction),
    Finish(AgentFinish),
}

/// Parses one ReAct completion into a tool call or a final answer.
pub fn parse_react_output(text: &str) -> Result<AgentStep> {
    let includes_answer = text.contains(FINAL_ANSWER);

    if let Some(caps) = ACTION.captures(text) {
        if includes_answer {
            return Err(PromptCraftError::parse(format!(
                "Parsing LLM output produced both a final answer and a parse-able action: {text}"
            )));
        }
        let tool = caps[1].trim().to_string();
        let tool_input = caps[2].trim().trim_matches('"').to_string();
        return Ok(AgentStep::Action(AgentAction {
            tool,
            tool_input,
            log: text.to_string(),
        }));
    }

    if includes_answer {
        let output = text
            .rsplit(FINAL_ANSWER)
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        return Ok(AgentStep::Finish(AgentFinish {
            output,
            log: text.to_string(),
        }));
    }

    if !ACTION_ONLY.is_match(text) {
        Err(PromptCraftError::parse(
            "Invalid Format: Missing 'Action:' after 'Thought:'",
        ))
    } else if !ACTION_INPUT_ONLY.is_match(text) {
        Err(PromptCraftError::parse(
            "Invalid Format: Missing 'Action Input:' after 'Action:'",
        ))
    } else {
        Err(PromptCraftError::parse(format!("`{text}`")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parses_action() {
        let text = "I should look up the weather.\nAction: get_weather\nAction Input: Naran\n";
        let step = parse_react_output(text).unwrap();
        assert_eq!(
            step,
            AgentStep::Action(AgentAction {
                tool: "get_weather".into(),
                tool_input: "Naran".into(),
                log: text.into(),
            })
        );
    }

    #[rstest]
    #[case::quoted("Action: calculator\nAction Input: \"15 * 8\"", "15 * 8")]
    #[case::json(
        "Action: calculate_distance\nAction Input: {\"origin\":\"Lahore\",\"destination\":\"Murree\"}",
        "{\"origin\":\"Lahore\",\"destination\":\"Murree\"}"
    )]
    #[case::numbered("Action 1: search\nAction 1 Input: python", "python")]
    fn test_action_inputs(#[case] text: &str, #[case] expected: &str) {
        match parse_react_output(text).unwrap() {
            AgentStep::Action(action) => assert_eq!(action.tool_input, expected),
            AgentStep::Finish(_) => panic!("expected an action"),
        }
    }

    #[test]
    fn test_parses_final_answer() {
        let text = "I now know the final answer\nFinal Answer: 120\n";
        match parse_react_output(text).unwrap() {
            AgentStep::Finish(finish) => assert_eq!(finish.output, "120"),
            AgentStep::Action(_) => panic!("expected a final answer"),
        }
    }

    #[test]
    fn test_final_answer_uses_last_marker() {
        let text = "Final Answer: draft\nFinal Answer: Murree is 300 km away";
        match parse_react_output(text).unwrap() {
            AgentStep::Finish(finish) => assert_eq!(finish.output, "Murree is 300 km away"),
            AgentStep::Action(_) => panic!("expected a final answer"),
        }
    }

    #[rstest]
    #[case::both(
        "Action: calculator\nAction Input: 1+1\nFinal Answer: 2",
        "both a final answer and a parse-able action"
    )]
    #[case::no_action("I am not sure what to do.", "Missing 'Action:'")]
    #[case::no_input("Action: calculator", "Missing 'Action Input:'")]
    fn test_parse_errors(#[case] text: &str, #[case] expected: &str) {
        let err = parse_react_output(text).unwrap_err();
        assert!(matches!(err, PromptCraftError::Parse { .. }));
        assert!(err.to_string().contains(expected), "got: {err}");
    }
}
