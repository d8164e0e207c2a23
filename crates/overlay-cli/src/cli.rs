//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Overlay - compose a target directory from a core and ordered modules
#[derive(Parser, Debug)]
#[command(name = "overlay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Profile file (.json, .toml, .yaml)
    #[arg(
        short,
        long,
        global = true,
        env = "OVERLAY_PROFILE",
        default_value = "config.json"
    )]
    pub profile: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create a profile and capture the target as the core layer
    ///
    /// Prompts for any path not given on the command line. If the target
    /// already holds files they are moved into <source-root>/_core.
    ///
    /// Examples:
    ///   overlay init --target ./game --source-root ./mods
    Init {
        /// Directory the composition is written into
        #[arg(long)]
        target: Option<String>,

        /// Directory holding the core, the vault and every module
        #[arg(long)]
        source_root: Option<String>,
    },

    /// Inspect the profile
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Build, rebuild, set up or restore the target
    Target {
        #[command(subcommand)]
        action: TargetAction,
    },

    /// Add and remove modules from the merge order
    Module {
        #[command(subcommand)]
        action: ModuleAction,
    },

    /// Manage files protected across rebuilds
    Exceptions {
        #[command(subcommand)]
        action: ExceptionsAction,
    },

    /// Show where the target sits in its lifecycle
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the profile
    Show {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetAction {
    /// Compose an empty target from the core and modules
    Build,
    /// Save exceptions, clear the target and compose it again
    Rebuild,
    /// Move the target's content into the core slot
    Setup,
    /// Save exceptions and move the core back into the target
    Restore,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ModuleAction {
    /// List modules in merge order
    List,

    /// Append a module to the merge order
    Add {
        /// Module name (prompted when omitted)
        #[arg(short, long)]
        name: Option<String>,

        /// Mirror the target's directories into a new module
        #[arg(long, num_args = 0..=1, default_missing_value = "true")]
        copy_structure: Option<bool>,
    },

    /// Remove a module from the merge order
    Remove {
        /// Module name (picked from a list when omitted)
        #[arg(short, long)]
        name: Option<String>,

        /// Also delete the module directory
        #[arg(long, num_args = 0..=1, default_missing_value = "true")]
        delete: Option<bool>,
    },

    /// Move the user's changes in the target into a new module
    AddFromDiff {
        /// Module name (prompted when omitted)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Remove every link from the target
    Prune,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ExceptionsAction {
    /// Snapshot matching files into the vault
    Save,
    /// Replay the vault onto the target
    Load,
    /// Show which files each rule matches right now
    Check,
    /// List the configured rules
    List,
    /// Add a rule
    Add {
        /// Glob pattern relative to the target (prompted when omitted)
        #[arg(short, long)]
        rule: Option<String>,
    },
    /// Remove a rule
    Remove {
        /// Zero-based rule index (picked from a list when omitted)
        #[arg(short, long)]
        index: Option<usize>,
    },
}
