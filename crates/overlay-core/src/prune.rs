//! Link removal, the inverse of a link-mode merge.

use std::fs;
use std::path::{Path, PathBuf};

use overlay_fs::ops;
use serde::Serialize;

use crate::Result;

/// Counts of what a prune removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PruneStats {
    pub links_removed: usize,
    pub dirs_removed: usize,
}

/// Remove every link under `path`, then every subdirectory left empty.
///
/// Real files are never touched, and neither is any directory that still
/// holds one. Links are removed without being followed. `path` itself is
/// kept even when it ends up empty; a missing `path` is a no-op.
pub fn prune(path: impl AsRef<Path>) -> Result<PruneStats> {
    let path = path.as_ref();
    let mut stats = PruneStats::default();
    if !ops::exists_or_link(path) {
        return Ok(stats);
    }
    prune_dir(path, &mut stats)?;
    Ok(stats)
}

fn prune_dir(dir: &Path, stats: &mut PruneStats) -> Result<()> {
    let mut links: Vec<PathBuf> = Vec::new();
    let mut subdirs: Vec<PathBuf> = Vec::new();

    for entry in fs::read_dir(dir).map_err(|e| overlay_fs::Error::io(dir, e))? {
        let entry = entry.map_err(|e| overlay_fs::Error::io(dir, e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| overlay_fs::Error::io(entry.path(), e))?;
        if file_type.is_symlink() {
            links.push(entry.path());
        } else if file_type.is_dir() {
            subdirs.push(entry.path());
        }
    }
    links.sort();
    subdirs.sort();

    for link in links {
        ops::remove_link(&link)?;
        stats.links_removed += 1;
        tracing::debug!(path = %link.display(), "Removed link");
    }

    for subdir in subdirs {
        prune_dir(&subdir, stats)?;
        if ops::is_empty_dir(&subdir)? {
            fs::remove_dir(&subdir).map_err(|e| overlay_fs::Error::io(&subdir, e))?;
            stats.dirs_removed += 1;
            tracing::debug!(path = %subdir.display(), "Removed empty directory");
        }
    }
    Ok(())
}
