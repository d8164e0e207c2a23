//! Orchestrator implementation
//!
//! The Orchestrator sequences the lower-level steps into the user-facing
//! commands. Ordering matters here more than anywhere else: the exceptions
//! vault is saved before the target is cleared and loaded only after the
//! merge pass has completed.

use overlay_fs::{NormalizedPath, ops};
use serde::Serialize;

use crate::merge::{MergeOptions, MergeStats, merge_tree};
use crate::modules::{self, ModuleAdded, ModuleRemoved};
use crate::prune::{PruneStats, prune};
use crate::status::{self, TargetStatus};
use crate::vault::{ExceptionsVault, LoadOutcome, RuleMatches, VaultReport};
use crate::{Config, Error, Result, swap};

/// Report from a build or rebuild
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    /// Exceptions snapshotted before the target was cleared
    pub saved: Option<VaultReport>,
    /// Core merge, absent when there is no core directory
    pub core: Option<MergeStats>,
    /// One entry per module, in merge order
    pub modules: Vec<(String, MergeStats)>,
    /// Exceptions replayed after the merge
    pub exceptions: Option<LoadOutcome>,
}

impl BuildReport {
    /// Sum of the core and module merges.
    pub fn totals(&self) -> MergeStats {
        let mut total = self.core.unwrap_or_default();
        for (_, stats) in &self.modules {
            total += *stats;
        }
        total
    }
}

/// Report from [`Orchestrator::add_module_from_diff`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FromDiffReport {
    /// Links removed from the target before the move
    pub pruned: PruneStats,
    /// The module that received the remaining files
    pub module: NormalizedPath,
    /// The recomposition that followed
    pub build: BuildReport,
}

/// Runs overlay commands against one configuration
///
/// The Orchestrator owns its [`Config`]; commands that change the module
/// list or exception rules mutate it in place and callers persist it
/// afterwards with [`Config::to_profile`].
#[derive(Debug, Clone)]
pub struct Orchestrator {
    config: Config,
}

impl Orchestrator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    fn vault(&self) -> ExceptionsVault {
        ExceptionsVault::new(&self.config)
    }

    /// Compose the target from the core and every module, then replay the
    /// exceptions vault.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Precondition`] if the target holds anything.
    pub fn build(&self) -> Result<BuildReport> {
        let target = self.config.target_path().to_native();
        ops::ensure_dir(&target)?;
        if !ops::is_empty_dir(&target)? {
            return Err(Error::precondition(format!(
                "Target directory {} is not empty, use rebuild instead",
                target.display()
            )));
        }

        let mut report = self.compose()?;
        report.exceptions = Some(self.vault().load()?);
        Ok(report)
    }

    /// Save exceptions, clear the target, compose it again and replay the
    /// exceptions.
    ///
    /// An empty target skips the save so a previous vault survives.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Precondition`] before anything is cleared if a
    /// configured module directory is missing.
    pub fn rebuild(&self) -> Result<BuildReport> {
        self.check_modules_present()?;

        let target = self.config.target_path().to_native();
        ops::ensure_dir(&target)?;

        let saved = if ops::is_empty_dir(&target)? {
            tracing::info!("Target is empty, keeping the existing exceptions vault");
            None
        } else {
            Some(self.vault().save()?)
        };

        ops::clear_and_recreate(&target)?;
        tracing::debug!(target = %target.display(), "Cleared target");

        let mut report = self.compose()?;
        report.saved = saved;
        report.exceptions = Some(self.vault().load()?);
        Ok(report)
    }

    /// Move the target's current content into the core slot.
    pub fn setup(&self) -> Result<()> {
        swap::setup(&self.config)
    }

    /// Save exceptions, then move the core back into the target.
    ///
    /// Returns the vault report when a save happened.
    pub fn restore(&self) -> Result<Option<VaultReport>> {
        let core = self.config.core_path().to_native();
        if !core.is_dir() || ops::is_empty_dir(&core)? {
            return Err(Error::precondition(format!(
                "Core {} is missing or empty, there is nothing to restore",
                core.display()
            )));
        }

        let target = self.config.target_path().to_native();
        let saved = if target.is_dir() && !ops::is_empty_dir(&target)? {
            Some(self.vault().save()?)
        } else {
            None
        };

        swap::restore(&self.config)?;
        Ok(saved)
    }

    /// Merge the core (always overwriting) and then each module in order.
    ///
    /// Does not check that the target is empty and does not touch the
    /// exceptions vault.
    pub fn compose(&self) -> Result<BuildReport> {
        let target = self.config.target_path().to_native();
        let mut report = BuildReport::default();

        let core = self.config.core_path().to_native();
        if core.is_dir() {
            tracing::debug!(core = %core.display(), "Merging core");
            let options = MergeOptions {
                overwrite: true,
                copy: self.config.copy_core,
            };
            report.core = Some(merge_tree(&core, &target, options)?);
        }

        let options = MergeOptions {
            overwrite: self.config.overwrite,
            copy: self.config.copy_modules,
        };
        for (name, path) in self
            .config
            .module_names()
            .into_iter()
            .zip(self.config.source_paths())
        {
            let source = path.to_native();
            if !source.is_dir() {
                tracing::warn!(module = %name, path = %path, "Module directory missing, skipped");
                continue;
            }
            tracing::debug!(module = %name, "Merging module");
            let stats = merge_tree(&source, &target, options)?;
            report.modules.push((name, stats));
        }

        tracing::info!(
            projected = report.totals().projected(),
            skipped = report.totals().skipped,
            "Composed target"
        );
        Ok(report)
    }

    /// Remove every link from the target, leaving real files.
    pub fn prune_target(&self) -> Result<PruneStats> {
        prune(self.config.target_path())
    }

    pub fn add_module(&mut self, name: &str, copy_structure: bool) -> Result<ModuleAdded> {
        modules::add_module(&mut self.config, name, copy_structure)
    }

    pub fn remove_module(&mut self, name: &str, delete_files: bool) -> Result<ModuleRemoved> {
        modules::remove_module(&mut self.config, name, delete_files)
    }

    /// Turn the user's edits in the target into a new module.
    ///
    /// Links are pruned from the target, whatever real files remain are moved
    /// into `source_root/<name>`, the module is appended to the merge order
    /// and the target is composed again.
    ///
    /// # Errors
    ///
    /// The module directory must be absent or empty. On a failed move the
    /// module is unregistered again; the target has already been pruned.
    pub fn add_module_from_diff(&mut self, name: &str) -> Result<FromDiffReport> {
        let module = self.config.register_module(name)?;

        let moved = self.move_diff_into(&module);
        let pruned = match moved {
            Ok(pruned) => pruned,
            Err(e) => {
                self.config.unregister_module(name)?;
                return Err(e);
            }
        };

        let build = self.compose()?;
        Ok(FromDiffReport {
            pruned,
            module,
            build,
        })
    }

    fn move_diff_into(&self, module: &NormalizedPath) -> Result<PruneStats> {
        let native = module.to_native();
        if native.is_dir() && !ops::is_empty_dir(&native)? {
            return Err(Error::precondition(format!(
                "Module directory {} already holds content",
                module
            )));
        }

        let target = self.config.target_path().to_native();
        if !target.is_dir() {
            return Err(Error::precondition(format!(
                "Target path {} does not exist",
                target.display()
            )));
        }

        let pruned = prune(&target)?;
        ops::atomic_swap(&target, &native)?;
        tracing::info!(module = %module, "Moved target changes into module");
        Ok(pruned)
    }

    pub fn add_exception(&mut self, pattern: &str) -> Result<()> {
        self.config.add_exception(pattern)
    }

    pub fn remove_exception(&mut self, index: usize) -> Result<String> {
        self.config.remove_exception(index)
    }

    pub fn save_exceptions(&self) -> Result<VaultReport> {
        self.vault().save()
    }

    pub fn load_exceptions(&self) -> Result<LoadOutcome> {
        self.vault().load()
    }

    pub fn check_exceptions(&self) -> Result<Vec<RuleMatches>> {
        self.vault().check()
    }

    pub fn status(&self) -> Result<TargetStatus> {
        status::status(&self.config)
    }

    fn check_modules_present(&self) -> Result<()> {
        let missing: Vec<String> = self
            .config
            .source_paths()
            .iter()
            .filter(|path| !path.is_dir())
            .map(|path| path.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::precondition(format!(
                "Module directories are missing: {}",
                missing.join(", ")
            )))
        }
    }
}
