//! Profile loading and persistence
//!
//! Every command except `init` and `completions` runs inside a [`Session`]:
//! the profile is read, validated into a [`Config`], the directory layout is
//! ensured, and commands that change the module list or rules write the
//! profile back to the same file.

use std::path::{Path, PathBuf};

use overlay_core::{Config, Orchestrator, Profile};
use overlay_fs::{NormalizedPath, ops};

use crate::error::{CliError, Result};

/// A loaded profile bound to its file.
pub struct Session {
    profile_path: NormalizedPath,
    base_dir: PathBuf,
    orchestrator: Orchestrator,
}

impl Session {
    /// Load the profile at `path` and make sure its directories exist.
    pub fn open(path: &Path) -> Result<Self> {
        let (profile_path, base_dir) = resolve_profile_path(path)?;
        if !profile_path.is_file() {
            return Err(CliError::user(format!(
                "No profile at {}. Run 'overlay init' first or pass --profile.",
                profile_path
            )));
        }

        let profile = Profile::load(&profile_path)?;
        let config = Config::from_profile(&profile, &base_dir)?;
        for created in config.ensure_layout()? {
            tracing::debug!(path = %created, "Created missing directory");
        }

        Ok(Self {
            profile_path,
            base_dir,
            orchestrator: Orchestrator::new(config),
        })
    }

    pub fn profile_path(&self) -> &NormalizedPath {
        &self.profile_path
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn orchestrator_mut(&mut self) -> &mut Orchestrator {
        &mut self.orchestrator
    }

    pub fn config(&self) -> &Config {
        self.orchestrator.config()
    }

    /// The persisted form of the current configuration.
    pub fn profile(&self) -> Profile {
        self.config().to_profile(&self.base_dir)
    }

    /// Write the current configuration back to the profile file.
    pub fn save(&self) -> Result<()> {
        self.profile().save(&self.profile_path)?;
        tracing::debug!(path = %self.profile_path, "Saved profile");
        Ok(())
    }
}

/// Absolute profile path and the directory relative paths resolve against.
pub fn resolve_profile_path(path: &Path) -> Result<(NormalizedPath, PathBuf)> {
    let absolute = ops::absolute(path)?;
    let base_dir = absolute
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| CliError::user(format!("Invalid profile path {}", path.display())))?;
    Ok((NormalizedPath::new(absolute), base_dir))
}
