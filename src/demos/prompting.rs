//! Prompt quality lessons: vague versus specific prompts.

use crate::llm::{ChatModel, get_response};

use super::banner;

const BLOCKCHAIN_GOOD: &str = "Explain blockchain in 3 bullet points, using simple language, as if teaching a junior developer who has never heard of it before.";

const GIGO_GOOD: &str =
    "Explain blockchain in 3 bullet points, simple language, as if teaching a junior developer.";

const DEBUGGING_PROMPT: &str = r#"I'm debugging a Python function that processes user data from a JSON API. Here's the exact error and context:

ERROR: KeyError: 'email'
File: /app/user_processor.py, line 23, in process_user
    user_email = user_data['email']

CONTEXT:
- Function: process_user(user_data: dict) -> dict
- Input user_data: {"name": "John", "age": 30}
- Expected: Extract email, name, age from user_data
- Current behavior: Crashes when 'email' key is missing

REQUIREMENTS:
1. Why is it crashing?
2. Handle missing keys gracefully
3. Provide fallback values
4. Log warnings for missing data
5. Return processed user dict

Please provide a complete solution with error handling."#;

const WHICH_MODEL_PROMPT: &str =
    "Which model are you? Please tell me your model name and any relevant details about yourself.";

/// A one-word prompt next to one that names format, tone and audience.
pub async fn good_bad_prompt(model: &dyn ChatModel) {
    let bad_prompt = "blockchain?";

    banner(&format!("BAD PROMPT: '{bad_prompt}'"));
    println!("BAD PROMPT RESULT:");
    get_response(model, bad_prompt).await;

    banner(&format!("GOOD PROMPT: '{BLOCKCHAIN_GOOD}'"));
    println!("GOOD PROMPT RESULT:");
    get_response(model, BLOCKCHAIN_GOOD).await;
}

pub async fn garbage_in_garbage_out(model: &dyn ChatModel) {
    let bad_prompt = "Explain blockchain";
    println!("Bad Prompt: '{bad_prompt}'");
    get_response(model, bad_prompt).await;

    println!("\nGood Prompt: '{GIGO_GOOD}'");
    get_response(model, GIGO_GOOD).await;
}

/// Three phrasings of the same debugging question, from vague to fully specified.
pub async fn sensitivity_to_phrasing(model: &dyn ChatModel) {
    let prompt1 = "python help";
    println!("Prompt 1: '{prompt1}'");
    get_response(model, prompt1).await;

    let prompt2 = "KeyError: 'email' in python";
    println!("\nPrompt 2: '{prompt2}'");
    get_response(model, prompt2).await;

    println!("\nPrompt 3: '{DEBUGGING_PROMPT}'");
    get_response(model, DEBUGGING_PROMPT).await;
}

pub async fn which_model(model: &dyn ChatModel) {
    get_response(model, WHICH_MODEL_PROMPT).await;
}
