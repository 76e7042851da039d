//! Prompting strategies: zero/one/few-shot, chain-of-thought, role prompting.

use crate::llm::{ChatModel, get_response, get_response_with_system};

use super::divider;

const SENTIMENT_TASK: &str =
    "Classify the sentiment of this text: 'I absolutely love this new restaurant!'";

const ONE_SHOT_PROMPT: &str = r#"
    Task: Classify text sentiment as Positive, Negative, or Neutral.

    Example:
    Text: "This movie was terrible and boring."
    Sentiment: Negative

    Now classify:
    Text: "I absolutely love this new restaurant!"
    Sentiment:
    "#;

const FEW_SHOT_PROMPT: &str = r#"
    Task: Classify text sentiment as Positive, Negative, or Neutral.

    Examples:
    Text: "This movie was terrible and boring."
    Sentiment: Negative

    Text: "The weather is okay today."
    Sentiment: Neutral

    Text: "I'm thrilled with my new car!"
    Sentiment: Positive

    Text: "The service was disappointing."
    Sentiment: Negative

    Now classify:
    Text: "I absolutely love this new restaurant!"
    Sentiment:
    "#;

const COUNTING_PROBLEM: &str =
    "Count how many times the letter 'r' appears in the word 'strawberries'.";

const ROLE_TOPIC: &str = "the impact of remote work on team productivity";

const HR_SYSTEM: &str = "You are an experienced HR Director with 12 years of experience in employee engagement, organizational culture, and talent retention. You focus on people-first approaches and employee wellbeing.";

const TPM_SYSTEM: &str = "You are an experienced Technical Program Manager with 8 years of experience in cross-functional coordination, project delivery, and process optimization. You focus on timeline management, stakeholder alignment, and delivery excellence.";

pub async fn shot_prompting(model: &dyn ChatModel) {
    get_response(model, &format!("Task: {SENTIMENT_TASK}")).await;
    get_response(model, ONE_SHOT_PROMPT).await;
    get_response(model, FEW_SHOT_PROMPT).await;
}

fn chain_of_thought_prompt(problem: &str) -> String {
    format!(
        r#"
Solve this problem step by step, showing your reasoning:

Problem: {problem}

Let's work through this systematically:
1. Write out the word: "strawberries"
2. Go through each letter one by one
3. Count how many times you see the letter 'r'
4. Show your work as you go
5. Give the final count

Step-by-step solution:
"#
    )
}

pub async fn chain_of_thought(model: &dyn ChatModel) {
    println!("🔸 WITHOUT Chain-of-Thought (Direct Answer)");
    get_response(model, COUNTING_PROBLEM).await;

    println!("\n🔸 WITH Chain-of-Thought (Step-by-Step)");
    get_response(model, &chain_of_thought_prompt(COUNTING_PROBLEM)).await;
}

/// The same topic with no role, as an HR director, and as a program manager.
pub async fn role_based_prompting(model: &dyn ChatModel) {
    get_response(model, &format!("Write about {ROLE_TOPIC}.")).await;

    let hr_user = format!(
        "Analyze {ROLE_TOPIC}, focusing on employee engagement, team culture, work-life balance, and retention strategies."
    );
    println!("System: '{HR_SYSTEM}'");
    println!("User: '{hr_user}'");
    get_response_with_system(model, HR_SYSTEM, &hr_user).await;

    divider();

    let tpm_user = format!(
        "Analyze {ROLE_TOPIC}, focusing on project delivery, cross-team collaboration, process efficiency, and timeline management."
    );
    println!("System: '{TPM_SYSTEM}'");
    println!("User: '{tpm_user}'");
    get_response_with_system(model, TPM_SYSTEM, &tpm_user).await;
}

pub async fn run(model: &dyn ChatModel) {
    shot_prompting(model).await;
    divider();
    chain_of_thought(model).await;
    divider();
    role_based_prompting(model).await;
}
