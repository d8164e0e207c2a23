//! Exception rule and vault commands

use std::path::Path;

use colored::Colorize;

use super::report::{print_load_outcome, print_vault_report};
use crate::cli::ExceptionsAction;
use crate::context::Session;
use crate::error::Result;
use crate::interactive;

/// Run an `exceptions` subcommand
pub fn run_exceptions(profile: &Path, action: ExceptionsAction) -> Result<()> {
    let mut session = Session::open(profile)?;

    match action {
        ExceptionsAction::Save => {
            let report = session.orchestrator().save_exceptions()?;
            print_vault_report(&report);
        }
        ExceptionsAction::Load => {
            let outcome = session.orchestrator().load_exceptions()?;
            print_load_outcome(&outcome);
        }
        ExceptionsAction::Check => {
            let matches = session.orchestrator().check_exceptions()?;
            if matches.is_empty() {
                println!("{}", "No exception rules configured".dimmed());
            }
            for rule in &matches {
                println!("{} {}", "Rule".bold(), rule.rule.cyan());
                if rule.files.is_empty() {
                    println!("   {}", "(no matches)".dimmed());
                }
                for file in &rule.files {
                    println!("   {} {}", "+".green(), file);
                }
            }
        }
        ExceptionsAction::List => {
            let rules = session.config().exceptions();
            println!("{}", "Exception rules".bold());
            println!();
            if rules.is_empty() {
                println!(
                    "  {} (use {} to add)",
                    "None".dimmed(),
                    "overlay exceptions add".cyan()
                );
            }
            for (index, rule) in rules.iter().enumerate() {
                println!("  {:>2}: {}", index, rule.cyan());
            }
        }
        ExceptionsAction::Add { rule } => {
            let rule = interactive::text_or_prompt(rule, "Glob pattern to protect")?;
            session.orchestrator_mut().add_exception(&rule)?;
            session.save()?;
            println!("{} Added rule {}", "OK".green().bold(), rule.cyan());
        }
        ExceptionsAction::Remove { index } => {
            let index = match index {
                Some(index) => index,
                None => {
                    let rules = session.config().exceptions().to_vec();
                    interactive::select_index("Rule to remove", &rules)?
                }
            };
            let removed = session.orchestrator_mut().remove_exception(index)?;
            session.save()?;
            println!("{} Removed rule {}", "OK".green().bold(), removed.cyan());
        }
    }
    Ok(())
}
