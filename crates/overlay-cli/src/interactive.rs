//! Interactive prompts for CLI commands
//!
//! Uses dialoguer for terminal-based input. Every prompt here only runs when
//! the matching command-line flag was left out.

use dialoguer::{Confirm, Input, Select};

use crate::error::{CliError, Result};

/// Ask for a required text value.
pub fn prompt_text(prompt: &str) -> Result<String> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .validate_with(|input: &String| {
            if input.trim().is_empty() {
                Err("a value is required")
            } else {
                Ok(())
            }
        })
        .interact_text()?;
    Ok(value.trim().to_string())
}

/// Use `given` when present, otherwise prompt for it.
pub fn text_or_prompt(given: Option<String>, prompt: &str) -> Result<String> {
    match given {
        Some(value) => Ok(value),
        None => prompt_text(prompt),
    }
}

pub fn confirm_or_prompt(given: Option<bool>, prompt: &str) -> Result<bool> {
    match given {
        Some(value) => Ok(value),
        None => Ok(Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?),
    }
}

/// Let the user pick one of `items`, returning its index.
pub fn select_index(prompt: &str, items: &[String]) -> Result<usize> {
    if items.is_empty() {
        return Err(CliError::user(format!("{}: nothing to choose from", prompt)));
    }
    Ok(Select::new()
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact()?)
}

/// Use `given` when present, otherwise let the user pick from `items`.
pub fn choice_or_select(given: Option<String>, prompt: &str, items: &[String]) -> Result<String> {
    match given {
        Some(value) => Ok(value),
        None => Ok(items[select_index(prompt, items)?].clone()),
    }
}
