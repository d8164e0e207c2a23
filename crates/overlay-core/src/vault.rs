//! Exceptions vault
//!
//! Protects files the user authored inside the target across rebuilds.
//! Before the target is cleared, every real (non-link) file matching one of
//! the configured glob patterns is copied into `source_root/_exceptions`,
//! which mirrors the target's directory layout. After the rebuild the vault
//! is merged back with copy mode and forced overwrite, so protected files
//! always win over freshly projected ones.
//!
//! The vault is rebuilt from scratch on every save.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use glob::{MatchOptions, Pattern};
use overlay_fs::{NormalizedPath, ops};
use serde::Serialize;

use crate::merge::{MergeOptions, MergeStats, merge_structure, merge_tree};
use crate::prune::prune;
use crate::{Config, Error, Result};

/// Files one rule currently matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleMatches {
    pub rule: String,
    /// Paths relative to the target
    pub files: Vec<NormalizedPath>,
}

/// A file that matched a rule but could not be snapshotted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotFailure {
    pub path: NormalizedPath,
    pub reason: String,
}

/// Outcome of [`ExceptionsVault::save`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VaultReport {
    pub saved: Vec<NormalizedPath>,
    pub failed: Vec<SnapshotFailure>,
}

/// Outcome of [`ExceptionsVault::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// No vault on disk, nothing to replay
    Absent,
    /// The vault was merged into the target
    Restored(MergeStats),
}

/// Snapshot store for exception files.
#[derive(Debug, Clone)]
pub struct ExceptionsVault {
    target: NormalizedPath,
    vault: NormalizedPath,
    rules: Vec<String>,
}

impl ExceptionsVault {
    pub fn new(config: &Config) -> Self {
        Self {
            target: config.target_path().clone(),
            vault: config.vault_path(),
            rules: config.exceptions().to_vec(),
        }
    }

    /// Location of the vault directory.
    pub fn path(&self) -> &NormalizedPath {
        &self.vault
    }

    pub fn exists(&self) -> bool {
        self.vault.is_dir()
    }

    /// When the vault was last written, if it exists.
    pub fn saved_at(&self) -> Option<DateTime<Local>> {
        let modified = fs::metadata(self.vault.to_native())
            .and_then(|meta| meta.modified())
            .ok()?;
        Some(DateTime::<Local>::from(modified))
    }

    /// Evaluate every rule against the target without touching the vault.
    pub fn check(&self) -> Result<Vec<RuleMatches>> {
        self.rules
            .iter()
            .map(|rule| {
                Ok(RuleMatches {
                    rule: rule.clone(),
                    files: self
                        .matched_files(rule)?
                        .iter()
                        .map(NormalizedPath::new)
                        .collect(),
                })
            })
            .collect()
    }

    /// Snapshot every real file matching a rule.
    ///
    /// The vault is cleared, its skeleton rebuilt from the target, the
    /// matches copied in, and finally directories that received nothing are
    /// pruned. A file that fails to copy is recorded in the report and the
    /// remaining matches still proceed.
    pub fn save(&self) -> Result<VaultReport> {
        let target = self.target.to_native();
        let vault = self.vault.to_native();

        if !target.is_dir() {
            return Err(Error::precondition(format!(
                "Target path {} does not exist, nothing to protect",
                target.display()
            )));
        }

        ops::ensure_dir(&vault)?;
        ops::clear_and_recreate(&vault)?;
        merge_structure(&target, &vault)?;

        let report = self.copy_matches(&target, &vault)?;

        prune(&vault)?;
        Ok(report)
    }

    /// Copy every match into an already prepared vault skeleton.
    fn copy_matches(&self, target: &Path, vault: &Path) -> Result<VaultReport> {
        let mut report = VaultReport::default();
        let mut seen = BTreeSet::new();

        for rule in &self.rules {
            tracing::debug!(rule = %rule, "Evaluating exception rule");
            for relative in self.matched_files(rule)? {
                if !seen.insert(relative.clone()) {
                    continue;
                }
                let shown = NormalizedPath::new(&relative);

                match fs::copy(target.join(&relative), vault.join(&relative)) {
                    Ok(_) => {
                        tracing::debug!(path = %shown, "Saved exception");
                        report.saved.push(shown);
                    }
                    Err(e) => {
                        tracing::warn!(path = %shown, error = %e, "Failed to save exception");
                        report.failed.push(SnapshotFailure {
                            path: shown,
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }
        Ok(report)
    }

    /// Replay the vault on top of the target, overwriting whatever is there.
    pub fn load(&self) -> Result<LoadOutcome> {
        if !self.exists() {
            tracing::info!(vault = %self.vault, "No exceptions vault found");
            return Ok(LoadOutcome::Absent);
        }

        let stats = merge_tree(
            self.vault.to_native(),
            self.target.to_native(),
            MergeOptions {
                overwrite: true,
                copy: true,
            },
        )?;
        Ok(LoadOutcome::Restored(stats))
    }

    /// Real files under the target matched by `rule`, relative to it.
    ///
    /// Kept native: a `\` inside a Unix file name is not a separator.
    fn matched_files(&self, rule: &str) -> Result<Vec<PathBuf>> {
        let target = self.target.to_native();
        let pattern = format!("{}/{}", Pattern::escape(self.target.as_str()), rule);
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: true,
        };

        let paths = glob::glob_with(&pattern, options).map_err(|e| Error::InvalidPattern {
            pattern: rule.to_string(),
            message: e.to_string(),
        })?;

        let mut files = Vec::new();
        for entry in paths {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    tracing::warn!(error = %e, "Unreadable path while matching exceptions");
                    continue;
                }
            };
            if path.is_symlink() || !path.is_file() {
                continue;
            }
            if let Ok(relative) = path.strip_prefix(&target) {
                files.push(relative.to_path_buf());
            }
        }
        Ok(files)
    }
}

/// Check that an exception rule is a relative glob that stays inside the
/// target.
pub fn validate_pattern(pattern: &str) -> Result<()> {
    let invalid = |message: &str| Error::InvalidPattern {
        pattern: pattern.to_string(),
        message: message.to_string(),
    };

    if pattern.trim().is_empty() {
        return Err(invalid("pattern must not be empty"));
    }
    let normalized = pattern.replace('\\', "/");
    if normalized.starts_with('/') || Path::new(pattern).is_absolute() || has_drive(&normalized) {
        return Err(invalid("pattern must be relative to the target"));
    }
    if normalized.split('/').any(|part| part == "..") {
        return Err(invalid("pattern must not leave the target"));
    }
    Pattern::new(pattern).map_err(|e| invalid(&e.to_string()))?;
    Ok(())
}

fn has_drive(pattern: &str) -> bool {
    let bytes = pattern.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
