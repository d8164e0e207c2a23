//! Status command implementation

use std::path::Path;

use colored::Colorize;
use overlay_core::TargetState;

use crate::context::Session;
use crate::error::Result;

/// Run the status command
pub fn run_status(profile: &Path, json: bool) -> Result<()> {
    let session = Session::open(profile)?;
    let status = session.orchestrator().status()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let state = match status.state {
        TargetState::Built => status.state.to_string().green(),
        TargetState::CoreStored => status.state.to_string().cyan(),
        TargetState::Unmanaged => status.state.to_string().yellow(),
        TargetState::Uninitialized => status.state.to_string().dimmed(),
    };

    println!("{}", "Overlay Status".bold());
    println!();
    println!("{}:    {}", "State".dimmed(), state);
    println!("{}:   {}", "Target".dimmed(), status.target);
    println!("{}:     {}", "Core".dimmed(), status.core);
    println!(
        "{}: {} link(s), {} real file(s)",
        "Contents".dimmed(),
        status.links,
        status.real_files
    );
    println!();

    println!("{}:", "Modules".bold());
    if status.modules.is_empty() {
        println!("  {} (use {} to add)", "None".dimmed(), "overlay module add".cyan());
    }
    for module in &status.modules {
        if module.present {
            println!("  {} {}", "+".green(), module.name.cyan());
        } else {
            println!("  {} {} ({})", "!".red(), module.name.cyan(), "folder missing".yellow());
        }
    }
    println!();

    println!("{}:", "Exceptions".bold());
    println!("  {} rule(s)", status.exception_rules);
    match status.vault_saved_at {
        Some(saved_at) if status.vault_present => println!(
            "  vault saved {}",
            saved_at.format("%Y-%m-%d %H:%M:%S").to_string().cyan()
        ),
        _ => println!("  {}", "no vault".dimmed()),
    }

    if status.state == TargetState::Unmanaged {
        println!();
        println!("Run {} to capture the target as core.", "overlay target setup".cyan());
    }
    Ok(())
}
