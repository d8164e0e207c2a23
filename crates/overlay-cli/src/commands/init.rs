//! Init command implementation

use std::path::Path;

use colored::Colorize;
use overlay_core::{Config, Orchestrator};
use overlay_fs::ops;

use crate::context::resolve_profile_path;
use crate::error::{CliError, Result};
use crate::interactive;

/// Write a new profile and capture the target as the core layer.
///
/// The target and source root are taken relative to the current directory
/// and stored relative to the profile's directory when they lie under it.
pub fn run_init(profile: &Path, target: Option<String>, source_root: Option<String>) -> Result<()> {
    let (profile_path, base_dir) = resolve_profile_path(profile)?;
    if profile_path.exists() {
        return Err(CliError::user(format!(
            "Profile {} already exists",
            profile_path
        )));
    }

    let target = interactive::text_or_prompt(target, "Target path")?;
    let source_root = interactive::text_or_prompt(source_root, "Source root")?;

    let config = Config::new(&target, &source_root)?.with_overwrite(true);
    let orchestrator = Orchestrator::new(config);
    let config = orchestrator.config();

    let target_dir = config.target_path().to_native();
    if target_dir.is_dir() && !ops::is_empty_dir(&target_dir)? {
        orchestrator.setup()?;
        println!(
            "{} Captured {} as core in {}",
            "OK".green().bold(),
            config.target_path(),
            config.core_path().to_string().cyan()
        );
    } else {
        println!(
            "{} Target {} is empty, nothing captured as core",
            "--".dimmed(),
            config.target_path()
        );
    }

    config.ensure_layout()?;
    config.to_profile(&base_dir).save(&profile_path)?;

    println!("{} Wrote profile {}", "OK".green().bold(), profile_path.to_string().cyan());
    println!();
    println!(
        "Add modules with {} then run {}.",
        "overlay module add".cyan(),
        "overlay target build".cyan()
    );
    Ok(())
}
