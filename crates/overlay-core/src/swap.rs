//! Moving the target into and out of the core slot.
//!
//! `setup` turns whatever lives in the target into the core layer; `restore`
//! hands it back. Both are moves, never copies: at any time exactly one of
//! the two directories holds the real content.

use std::fs;
use std::path::{Path, PathBuf};

use overlay_fs::ops;

use crate::{Config, Error, Result};

/// Capture the target's content as the core layer.
///
/// Requires a populated target and an empty (or missing) core. Leaves the
/// target empty.
pub fn setup(config: &Config) -> Result<()> {
    let target = config.target_path().to_native();
    let core = config.core_path().to_native();

    if !target.is_dir() {
        return Err(Error::precondition(format!(
            "Target path {} does not exist",
            target.display()
        )));
    }
    if ops::is_empty_dir(&target)? {
        return Err(Error::precondition(format!(
            "Target path {} is empty, there is nothing to capture as core",
            target.display()
        )));
    }
    if ops::exists_or_link(&core) && !ops::is_empty_dir(&core)? {
        return Err(Error::precondition(format!(
            "Core {} already holds content, restore it before running setup again",
            core.display()
        )));
    }

    ops::ensure_dir(config.source_root())?;
    ops::ensure_dir(&core)?;
    ops::atomic_swap(&target, &core)?;

    tracing::info!(target = %target.display(), core = %core.display(), "Target captured as core");
    Ok(())
}

/// Put the core layer back into the target.
///
/// Whatever the target holds is discarded. The target is first renamed
/// aside and only deleted once the core has been moved into place; if the
/// move fails the old target is put back.
pub fn restore(config: &Config) -> Result<()> {
    let target = config.target_path().to_native();
    let core = config.core_path().to_native();

    if !core.is_dir() || ops::is_empty_dir(&core)? {
        return Err(Error::precondition(format!(
            "Core {} is missing or empty, there is nothing to restore",
            core.display()
        )));
    }

    let staged = if ops::exists_or_link(&target) {
        let staging = staging_path(&target)?;
        fs::rename(&target, &staging).map_err(|e| overlay_fs::Error::io(&target, e))?;
        Some(staging)
    } else {
        None
    };

    if let Err(e) = ops::atomic_swap(&core, &target) {
        if let Some(staging) = &staged {
            if let Err(rollback) = fs::rename(staging, &target) {
                tracing::error!(
                    staging = %staging.display(),
                    error = %rollback,
                    "Could not put the previous target back"
                );
            }
        }
        return Err(e.into());
    }

    if let Some(staging) = staged {
        fs::remove_dir_all(&staging).map_err(|e| overlay_fs::Error::io(&staging, e))?;
    }

    tracing::info!(target = %target.display(), "Core restored into target");
    Ok(())
}

fn staging_path(target: &Path) -> Result<PathBuf> {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            Error::precondition(format!("Target path {} has no file name", target.display()))
        })?;

    let staging = target.with_file_name(format!(".{}.restore-{}", name, std::process::id()));
    if ops::exists_or_link(&staging) {
        return Err(Error::precondition(format!(
            "Staging path {} is in the way",
            staging.display()
        )));
    }
    Ok(staging)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(temp: &TempDir) -> Config {
        Config::new(temp.path().join("target"), temp.path().join("mods")).unwrap()
    }

    #[test]
    fn setup_rejects_empty_target() {
        let temp = TempDir::new().unwrap();
        let config = config(&temp);
        fs::create_dir_all(config.target_path()).unwrap();

        assert!(matches!(setup(&config), Err(Error::Precondition { .. })));
    }

    #[test]
    fn setup_rejects_populated_core() {
        let temp = TempDir::new().unwrap();
        let config = config(&temp);
        fs::create_dir_all(config.target_path()).unwrap();
        fs::write(config.target_path().to_native().join("a"), "a").unwrap();
        fs::create_dir_all(config.core_path()).unwrap();
        fs::write(config.core_path().to_native().join("b"), "b").unwrap();

        assert!(matches!(setup(&config), Err(Error::Precondition { .. })));
        // Untouched
        assert!(config.target_path().to_native().join("a").exists());
    }

    #[test]
    fn restore_rejects_missing_core() {
        let temp = TempDir::new().unwrap();
        let config = config(&temp);

        assert!(matches!(restore(&config), Err(Error::Precondition { .. })));
    }

    #[test]
    fn restore_leaves_no_staging_directory() {
        let temp = TempDir::new().unwrap();
        let config = config(&temp);
        fs::create_dir_all(config.core_path()).unwrap();
        fs::write(config.core_path().to_native().join("a"), "a").unwrap();
        fs::create_dir_all(config.target_path()).unwrap();
        fs::write(config.target_path().to_native().join("junk"), "j").unwrap();

        restore(&config).unwrap();

        let names: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert!(names.iter().all(|n| !n.contains("restore-")), "{:?}", names);
        assert!(!config.target_path().to_native().join("junk").exists());
    }
}
