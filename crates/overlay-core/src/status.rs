//! Lifecycle inspection of a target/core pair.

use chrono::{DateTime, Local};
use overlay_fs::{NormalizedPath, ops};
use serde::Serialize;
use walkdir::WalkDir;

use crate::{Config, ExceptionsVault, Result};

/// Where a target sits in the setup/build lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetState {
    /// The target is missing, or neither target nor core hold anything
    Uninitialized,
    /// The target holds content but setup has not captured a core
    Unmanaged,
    /// The core holds the baseline and the target is empty
    CoreStored,
    /// The core holds the baseline and the target has been composed
    Built,
}

impl std::fmt::Display for TargetState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Uninitialized => "uninitialized",
            Self::Unmanaged => "unmanaged",
            Self::CoreStored => "core-stored",
            Self::Built => "built",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleStatus {
    pub name: String,
    pub present: bool,
}

/// Snapshot of a configuration's on-disk state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetStatus {
    pub state: TargetState,
    pub target: NormalizedPath,
    pub core: NormalizedPath,
    pub modules: Vec<ModuleStatus>,
    pub exception_rules: usize,
    pub vault_present: bool,
    pub vault_saved_at: Option<DateTime<Local>>,
    /// Link projections currently in the target
    pub links: usize,
    /// Real files currently in the target (copies and user files)
    pub real_files: usize,
}

/// Inspect the target, core, modules and vault of `config`.
pub fn status(config: &Config) -> Result<TargetStatus> {
    let target = config.target_path().to_native();
    let core = config.core_path().to_native();

    let target_populated = target.is_dir() && !ops::is_empty_dir(&target)?;
    let core_populated = core.is_dir() && !ops::is_empty_dir(&core)?;

    let state = match (core_populated, target_populated) {
        (false, false) => TargetState::Uninitialized,
        (false, true) => TargetState::Unmanaged,
        (true, false) => TargetState::CoreStored,
        (true, true) => TargetState::Built,
    };

    let (links, real_files) = if target.is_dir() {
        count_entries(&target)
    } else {
        (0, 0)
    };

    let modules = config
        .module_names()
        .into_iter()
        .map(|name| {
            let present = config.module_path(&name).is_dir();
            ModuleStatus { name, present }
        })
        .collect();

    let vault = ExceptionsVault::new(config);

    Ok(TargetStatus {
        state,
        target: config.target_path().clone(),
        core: config.core_path().clone(),
        modules,
        exception_rules: config.exceptions().len(),
        vault_present: vault.exists(),
        vault_saved_at: vault.saved_at(),
        links,
        real_files,
    })
}

fn count_entries(root: &std::path::Path) -> (usize, usize) {
    let mut links = 0;
    let mut real_files = 0;
    for entry in WalkDir::new(root).follow_links(false).into_iter().flatten() {
        let file_type = entry.file_type();
        if file_type.is_symlink() {
            links += 1;
        } else if file_type.is_file() {
            real_files += 1;
        }
    }
    (links, real_files)
}
