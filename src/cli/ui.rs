//! Terminal output and prompts shared by the command handlers

use anyhow::Result;
use colored::*;
use dialoguer::{Input, Select};

use crate::api::GraphError;

pub fn success(message: &str) {
    println!("{} {}", "✓".bright_green().bold(), message);
}

pub fn failure(message: &str) {
    println!("{} {}", "✗".bright_red().bold(), message.red());
}

pub fn warning(message: &str) {
    println!("{} {}", "⚠".bright_yellow().bold(), message.yellow());
}

pub fn heading(title: &str) {
    println!();
    println!("  {}", title.bright_white().bold());
}

/// Arrow-key Yes/No selection
pub fn prompt_confirmation(prompt: &str, default_yes: bool) -> Result<bool> {
    let items = vec!["Yes", "No"];
    let default_index = if default_yes { 0 } else { 1 };

    let selection = Select::new()
        .with_prompt(prompt)
        .items(&items)
        .default(default_index)
        .interact()?;

    Ok(selection == 0)
}

/// Confirmation for destructive commands, skipped with `--force`
pub fn confirm_destructive(prompt: &str, force: bool) -> Result<bool> {
    if force {
        return Ok(true);
    }
    prompt_confirmation(prompt, false)
}

pub fn prompt_text(prompt: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(value) => Ok(value),
        None => Ok(Input::<String>::new().with_prompt(prompt).interact_text()?),
    }
}

/// Read a secret without echoing it
pub fn prompt_secret(prompt: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(value) => Ok(value),
        None => Ok(rpassword::prompt_password(format!("{}: ", prompt))?),
    }
}

/// Print an error and, for Graph failures, what the operator can do about it
pub fn report_error(error: &anyhow::Error) {
    failure(&format!("{:#}", error));

    if let Some(graph_error) = error.chain().find_map(|e| e.downcast_ref::<GraphError>()) {
        let category = graph_error.category();
        println!("  {}", category.guidance().dimmed());
    }
}

pub fn yes_no(value: bool) -> ColoredString {
    if value {
        "yes".bright_green()
    } else {
        "no".bright_red()
    }
}
