//! Profile display command

use std::path::Path;

use colored::Colorize;

use crate::context::Session;
use crate::error::Result;

/// Display the current profile
pub fn run_config_show(profile: &Path, json: bool) -> Result<()> {
    let session = Session::open(profile)?;
    let persisted = session.profile();

    if json {
        println!("{}", serde_json::to_string_pretty(&persisted)?);
        return Ok(());
    }

    let config = session.config();
    println!("{}", "Overlay Profile".bold());
    println!();
    println!("  {:<14} {}", "File:".dimmed(), session.profile_path());
    println!("  {:<14} {}", "Target:".dimmed(), config.target_path());
    println!("  {:<14} {}", "Source root:".dimmed(), config.source_root());
    println!("  {:<14} {}", "Core:".dimmed(), config.core_path());
    println!("  {:<14} {}", "Overwrite:".dimmed(), config.overwrite);
    println!(
        "  {:<14} core={} modules={}",
        "Copy:".dimmed(),
        config.copy_core,
        config.copy_modules
    );
    println!();

    if persisted.sources.is_empty() {
        println!("  {:<14} {}", "Modules:".dimmed(), "(none)".dimmed());
    } else {
        println!("  {}:", "Modules".dimmed());
        for name in &persisted.sources {
            println!("    {} {}", "+".green(), name);
        }
    }

    if persisted.exceptions.is_empty() {
        println!("  {:<14} {}", "Exceptions:".dimmed(), "(none)".dimmed());
    } else {
        println!("  {}:", "Exceptions".dimmed());
        for rule in &persisted.exceptions {
            println!("    {} {}", "+".green(), rule);
        }
    }
    Ok(())
}
