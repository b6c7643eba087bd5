use anyhow::Result;
use inquire::{Select, Text};

use reqtrace_core::{parse_target_ids, RequirementPriority, RequirementStatus};

/// Prompts for requirement text
///
/// The answer is passed through unchanged; the store rejects empty text.
pub fn prompt_requirement_text() -> Result<String> {
    let text = Text::new("Requirement text:").prompt()?;
    Ok(text)
}

/// Prompts for a priority selection
pub fn prompt_priority() -> Result<RequirementPriority> {
    let priority = Select::new("Priority:", RequirementPriority::ALL.to_vec()).prompt()?;
    Ok(priority)
}

/// Prompts for a status selection
pub fn prompt_status() -> Result<RequirementStatus> {
    let status = Select::new("New status:", RequirementStatus::ALL.to_vec()).prompt()?;
    Ok(status)
}

/// Lets the user pick one of the existing requirement ids
pub fn prompt_requirement_id(message: &str, ids: Vec<i64>) -> Result<i64> {
    if ids.is_empty() {
        anyhow::bail!("No requirements recorded yet. Use `reqtrace add` first.");
    }
    let id = Select::new(message, ids).prompt()?;
    Ok(id)
}

/// Prompts for a comma-separated list of traced requirement ids
pub fn prompt_target_ids() -> Result<Vec<i64>> {
    let input = Text::new("Traced requirement ids (comma-separated):").prompt()?;
    Ok(parse_target_ids(&input)?)
}
