//! Arithmetic and lookup tools used by the ReAct demos.

use crate::agent::Tool;

const ALLOWED: &str = "0123456789+-*/(). ";

/// Keyword -> answer, checked in order.
const KNOWLEDGE_BASE: [(&str, &str); 3] = [
    ("python", "Python is a high-level programming language."),
    ("langchain", "LangChain is a framework for building LLM applications."),
    ("agents", "Agents are systems that can use tools to accomplish tasks."),
];

/// Evaluates an arithmetic expression. Errors come back as `Error: ...` text.
pub fn calculator(expression: &str) -> String {
    if !expression.chars().all(|c| ALLOWED.contains(c)) {
        return "Error: Invalid expression".to_string();
    }
    match evaluate(expression) {
        Ok(value) => value,
        Err(reason) => format!("Error: {reason}"),
    }
}

/// [`calculator`] with a `Result: ` prefix on success.
pub fn labelled_calculator(expression: &str) -> String {
    let result = calculator(expression);
    if result.starts_with("Error") {
        result
    } else {
        format!("Result: {result}")
    }
}

pub fn search_knowledge_base(query: &str) -> String {
    let query = query.to_lowercase();
    KNOWLEDGE_BASE
        .iter()
        .find(|(keyword, _)| query.contains(*keyword))
        .map_or("No information found.", |(_, answer)| *answer)
        .to_string()
}

#[must_use]
pub fn calculator_tool() -> Tool {
    Tool::new(
        "calculator",
        "Evaluates a mathematical expression. Input should be like '2 + 2' or '10 * 5'",
        calculator,
    )
}

/// Calculator whose observations read `Result: ...`.
#[must_use]
pub fn labelled_calculator_tool() -> Tool {
    Tool::new(
        "calculator",
        "Evaluates a mathematical expression. Input should be a valid expression like '2 + 2' or '10 * 5'",
        labelled_calculator,
    )
}

#[must_use]
pub fn knowledge_base_tool() -> Tool {
    Tool::new(
        "search",
        "Searches a knowledge base for information about topics like Python, LangChain, or agents",
        search_knowledge_base,
    )
}

/// Deeper parenthesis nesting is refused before evaluation.
const MAX_NESTING: usize = 200;

/// Checks nesting, hands the expression to `meval` and formats the result the
/// way Python prints it: `120` for integer arithmetic, `5.0` once a division
/// or a decimal literal is involved.
fn evaluate(expression: &str) -> Result<String, String> {
    if expression.trim().is_empty() {
        return Err("invalid syntax".to_string());
    }

    let mut depth = 0usize;
    for c in expression.chars() {
        match c {
            '(' => {
                depth += 1;
                if depth > MAX_NESTING {
                    return Err("too many nested parentheses".to_string());
                }
            }
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    // meval spells power `^` and has no floor division
    if expression.contains("//") {
        return Err("floor division is not supported".to_string());
    }
    let value = meval::eval_str(expression.replace("**", "^")).map_err(|e| e.to_string())?;

    let float_result = expression.contains('/') || expression.contains('.');
    if !value.is_finite() {
        return Err(if expression.contains('/') {
            "division by zero".to_string()
        } else {
            "numeric result out of range".to_string()
        });
    }
    // -0.0 prints as 0
    Ok(format_number(value + 0.0, float_result))
}

fn format_number(value: f64, float_result: bool) -> String {
    let integral = value.fract() == 0.0;
    if integral && !float_result {
        format!("{value:.0}")
    } else if integral && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
