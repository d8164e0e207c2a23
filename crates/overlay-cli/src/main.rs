//! Overlay CLI
//!
//! The command-line interface for composing a target directory from a core
//! layer and an ordered list of modules.

mod cli;
mod commands;
mod context;
mod error;
mod interactive;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands, ConfigAction};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| CliError::user(format!("Failed to set tracing subscriber: {}", e)))?;
        tracing::debug!("Verbose mode enabled");
    }

    match cli.command {
        Some(cmd) => execute_command(&cli.profile, cmd),
        None => {
            println!("{} layered overlay composer", "overlay".green().bold());
            println!();
            println!("Run {} for available commands.", "overlay --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(profile: &std::path::Path, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Init {
            target,
            source_root,
        } => commands::run_init(profile, target, source_root),
        Commands::Config {
            action: ConfigAction::Show { json },
        } => commands::run_config_show(profile, json),
        Commands::Target { action } => commands::run_target(profile, action),
        Commands::Module { action } => commands::run_module(profile, action),
        Commands::Exceptions { action } => commands::run_exceptions(profile, action),
        Commands::Status { json } => commands::run_status(profile, json),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "overlay", &mut std::io::stdout());
            Ok(())
        }
    }
}
