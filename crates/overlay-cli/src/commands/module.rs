//! Module management commands

use std::path::Path;

use colored::Colorize;

use super::report::print_build_report;
use crate::cli::ModuleAction;
use crate::context::Session;
use crate::error::Result;
use crate::interactive;

/// Run a `module` subcommand
pub fn run_module(profile: &Path, action: ModuleAction) -> Result<()> {
    let mut session = Session::open(profile)?;

    match action {
        ModuleAction::List => list_modules(&session),
        ModuleAction::Add {
            name,
            copy_structure,
        } => {
            let name = interactive::text_or_prompt(name, "Name of the module")?;
            let copy_structure =
                interactive::confirm_or_prompt(copy_structure, "Copy the target's folder structure?")?;

            let added = session
                .orchestrator_mut()
                .add_module(&name, copy_structure)?;
            session.save()?;

            if added.created {
                println!(
                    "{} Created module {} ({} folders mirrored)",
                    "OK".green().bold(),
                    added.name.cyan(),
                    added.dirs_mirrored
                );
            } else {
                println!(
                    "{} Existing folder {} added as module {}",
                    "OK".green().bold(),
                    added.path,
                    added.name.cyan()
                );
            }
            Ok(())
        }
        ModuleAction::Remove { name, delete } => {
            let modules = session.config().module_names();
            let name = interactive::choice_or_select(name, "Module to remove", &modules)?;
            let delete = interactive::confirm_or_prompt(delete, "Delete the module folder?")?;

            let removed = session.orchestrator_mut().remove_module(&name, delete)?;
            session.save()?;

            println!(
                "{} Removed module {}{}",
                "OK".green().bold(),
                removed.name.cyan(),
                if removed.deleted {
                    " and deleted its folder"
                } else {
                    ""
                }
            );
            Ok(())
        }
        ModuleAction::AddFromDiff { name } => {
            let name = interactive::text_or_prompt(name, "Name of the module")?;
            let report = session.orchestrator_mut().add_module_from_diff(&name)?;
            session.save()?;

            println!(
                "{} Removed {} link(s), moved remaining files into {}",
                "OK".green().bold(),
                report.pruned.links_removed,
                report.module.to_string().cyan()
            );
            print_build_report("Target recomposed", &report.build);
            Ok(())
        }
        ModuleAction::Prune => {
            let stats = session.orchestrator().prune_target()?;
            println!(
                "{} Removed {} link(s) and {} empty folder(s)",
                "OK".green().bold(),
                stats.links_removed,
                stats.dirs_removed
            );
            Ok(())
        }
    }
}

fn list_modules(session: &Session) -> Result<()> {
    let config = session.config();
    let names = config.module_names();

    println!("{}", "Modules (merge order)".bold());
    println!();
    if names.is_empty() {
        println!(
            "  {} (use {} to add)",
            "None".dimmed(),
            "overlay module add".cyan()
        );
        return Ok(());
    }

    for (index, name) in names.iter().enumerate() {
        let marker = if config.module_path(name).is_dir() {
            "+".green()
        } else {
            "!".red()
        };
        println!("  {:>2}. {} {}", index + 1, marker, name.cyan());
    }
    Ok(())
}
