//! Target lifecycle commands

use std::path::Path;

use colored::Colorize;

use super::report::{print_build_report, print_vault_report};
use crate::cli::TargetAction;
use crate::context::Session;
use crate::error::Result;

/// Run a `target` subcommand
pub fn run_target(profile: &Path, action: TargetAction) -> Result<()> {
    let session = Session::open(profile)?;
    let orchestrator = session.orchestrator();
    let config = session.config();

    match action {
        TargetAction::Build => {
            let report = orchestrator.build()?;
            print_build_report("Target built", &report);
        }
        TargetAction::Rebuild => {
            let report = orchestrator.rebuild()?;
            print_build_report("Target rebuilt", &report);
        }
        TargetAction::Setup => {
            orchestrator.setup()?;
            println!(
                "{} Target captured as core in {}",
                "OK".green().bold(),
                config.core_path().to_string().cyan()
            );
            println!();
            println!("Run {} to compose it again.", "overlay target build".cyan());
        }
        TargetAction::Restore => {
            if let Some(saved) = orchestrator.restore()? {
                print_vault_report(&saved);
            }
            println!(
                "{} Core restored into {}",
                "OK".green().bold(),
                config.target_path().to_string().cyan()
            );
        }
    }
    Ok(())
}
