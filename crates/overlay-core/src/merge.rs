//! Recursive tree projection
//!
//! [`merge_tree`] projects every file under a source tree into a target tree
//! as a link to the source file's absolute path, or as a byte copy.
//! [`merge_structure`] mirrors only the directory skeleton.
//!
//! At each directory level all files are resolved before any subdirectory is
//! entered. Descent into a subdirectory happens whether or not the target
//! already had it, which is what lets several sources be layered into one
//! target one after another.

use std::fs;
use std::io::ErrorKind;
use std::ops::AddAssign;
use std::path::{Path, PathBuf};

use overlay_fs::ops;
use serde::Serialize;

use crate::{Error, Result};

/// How files are projected into the target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOptions {
    /// Replace an entry already present in the target instead of skipping it
    pub overwrite: bool,
    /// Copy bytes instead of creating a link
    pub copy: bool,
}

/// Counts of the structural actions a merge performed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub linked: usize,
    pub copied: usize,
    pub overwritten: usize,
    pub skipped: usize,
    pub dirs_created: usize,
}

impl MergeStats {
    /// Files that ended up projected, by link or by copy.
    pub fn projected(&self) -> usize {
        self.linked + self.copied
    }
}

impl AddAssign for MergeStats {
    fn add_assign(&mut self, other: Self) {
        self.linked += other.linked;
        self.copied += other.copied;
        self.overwritten += other.overwritten;
        self.skipped += other.skipped;
        self.dirs_created += other.dirs_created;
    }
}

/// Project `source` into `target` under `options`.
///
/// `target` must exist. A file that already exists in the target is skipped
/// unless `options.overwrite` is set, in which case the existing entry (file
/// or link) is removed first. Failing to create a link or copy aborts the
/// merge with [`Error::Projection`]; entries already projected stay.
pub fn merge_tree(
    source: impl AsRef<Path>,
    target: impl AsRef<Path>,
    options: MergeOptions,
) -> Result<MergeStats> {
    let mut merger = TreeMerger::new(Some(options));
    merger.merge_dir(source.as_ref(), target.as_ref())?;
    Ok(merger.stats)
}

/// Mirror the directory skeleton of `source` into `target` without touching
/// any file.
pub fn merge_structure(source: impl AsRef<Path>, target: impl AsRef<Path>) -> Result<MergeStats> {
    let mut merger = TreeMerger::new(None);
    merger.merge_dir(source.as_ref(), target.as_ref())?;
    Ok(merger.stats)
}

struct TreeMerger {
    /// `None` mirrors directories only
    files: Option<MergeOptions>,
    stats: MergeStats,
    /// Canonical paths of the source directories currently being walked
    ancestors: Vec<PathBuf>,
}

struct Listing {
    files: Vec<PathBuf>,
    dirs: Vec<PathBuf>,
}

impl TreeMerger {
    fn new(files: Option<MergeOptions>) -> Self {
        Self {
            files,
            stats: MergeStats::default(),
            ancestors: Vec::new(),
        }
    }

    fn merge_dir(&mut self, source: &Path, target: &Path) -> Result<()> {
        let canonical = dunce::canonicalize(source).map_err(|e| overlay_fs::Error::io(source, e))?;
        if self.ancestors.contains(&canonical) {
            tracing::warn!(
                source = %source.display(),
                "Directory link loops back onto an ancestor, not descending"
            );
            return Ok(());
        }
        self.ancestors.push(canonical);

        let listing = list_source(source)?;

        if let Some(options) = self.files {
            for file in &listing.files {
                let Some(name) = file.file_name() else { continue };
                self.project_file(file, &target.join(name), options)?;
            }
        }

        for dir in &listing.dirs {
            let Some(name) = dir.file_name() else { continue };
            let target_dir = target.join(name);

            if !ops::exists_or_link(&target_dir) {
                fs::create_dir(&target_dir).map_err(|e| projection_error(dir, &target_dir, e))?;
                self.stats.dirs_created += 1;
                tracing::debug!(path = %target_dir.display(), "Created directory");
            } else if !target_dir.is_dir() {
                let conflict = std::io::Error::new(
                    ErrorKind::NotADirectory,
                    "target entry exists and is not a directory",
                );
                return Err(projection_error(dir, &target_dir, conflict));
            }

            self.merge_dir(dir, &target_dir)?;
        }

        self.ancestors.pop();
        Ok(())
    }

    fn project_file(&mut self, source: &Path, target: &Path, options: MergeOptions) -> Result<()> {
        let occupied = ops::exists_or_link(target);

        if occupied && !options.overwrite {
            self.stats.skipped += 1;
            tracing::info!(
                source = %source.display(),
                target = %target.display(),
                "Skipped, target entry already exists"
            );
            return Ok(());
        }

        if occupied {
            ops::remove_entry(target).map_err(|e| Error::Projection {
                source_path: source.to_path_buf(),
                target_path: target.to_path_buf(),
                source: e,
            })?;
            self.stats.overwritten += 1;
            tracing::debug!(path = %target.display(), "Removed existing entry");
        }

        if options.copy {
            fs::copy(source, target).map_err(|e| projection_error(source, target, e))?;
            self.stats.copied += 1;
            tracing::debug!(
                source = %source.display(),
                target = %target.display(),
                overwrote = occupied,
                "Copied"
            );
        } else {
            let pointee = ops::absolute(source).map_err(|e| Error::Projection {
                source_path: source.to_path_buf(),
                target_path: target.to_path_buf(),
                source: e,
            })?;
            ops::symlink_file(&pointee, target).map_err(|e| Error::Projection {
                source_path: source.to_path_buf(),
                target_path: target.to_path_buf(),
                source: e,
            })?;
            self.stats.linked += 1;
            tracing::debug!(
                source = %pointee.display(),
                target = %target.display(),
                overwrote = occupied,
                "Linked"
            );
        }
        Ok(())
    }
}

fn projection_error(source: &Path, target: &Path, err: std::io::Error) -> Error {
    Error::Projection {
        source_path: source.to_path_buf(),
        target_path: target.to_path_buf(),
        source: overlay_fs::Error::io(target, err),
    }
}

/// Split the entries directly under `dir` into files and directories,
/// following links. Dangling links and special files are left out.
fn list_source(dir: &Path) -> Result<Listing> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| overlay_fs::Error::io(dir, e))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()
        .map_err(|e| overlay_fs::Error::io(dir, e))?;
    entries.sort();

    let mut listing = Listing {
        files: Vec::new(),
        dirs: Vec::new(),
    };
    for path in entries {
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => listing.files.push(path),
            Ok(meta) if meta.is_dir() => listing.dirs.push(path),
            Ok(_) => tracing::debug!(path = %path.display(), "Ignoring special file"),
            Err(_) => tracing::debug!(path = %path.display(), "Ignoring dangling link"),
        }
    }
    Ok(listing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn stats_accumulate() {
        let mut total = MergeStats {
            linked: 1,
            skipped: 2,
            ..MergeStats::default()
        };
        total += MergeStats {
            copied: 3,
            skipped: 1,
            ..MergeStats::default()
        };
        assert_eq!(total.projected(), 4);
        assert_eq!(total.skipped, 3);
    }

    #[test]
    fn links_point_at_absolute_source() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src");
        let target = temp.path().join("dst");
        write(&source, "a.txt", "a");
        fs::create_dir(&target).unwrap();

        let stats = merge_tree(&source, &target, MergeOptions::default()).unwrap();

        assert_eq!(stats.linked, 1);
        let pointee = fs::read_link(target.join("a.txt")).unwrap();
        assert!(pointee.is_absolute());
        assert_eq!(fs::read_to_string(target.join("a.txt")).unwrap(), "a");
    }

    #[test]
    fn structure_merge_ignores_files() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src");
        let target = temp.path().join("dst");
        write(&source, "x/y/file.txt", "f");
        write(&source, "top.txt", "t");
        fs::create_dir(&target).unwrap();

        let stats = merge_structure(&source, &target).unwrap();

        assert_eq!(stats.dirs_created, 2);
        assert!(target.join("x/y").is_dir());
        assert!(!target.join("top.txt").exists());
        assert!(!target.join("x/y/file.txt").exists());
    }

    #[test]
    fn file_in_place_of_directory_is_a_projection_error() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src");
        let target = temp.path().join("dst");
        write(&source, "sub/a.txt", "a");
        write(&target, "sub", "i am a file");

        let result = merge_tree(&source, &target, MergeOptions::default());
        assert!(matches!(result, Err(Error::Projection { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn directory_link_loop_terminates() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src");
        let target = temp.path().join("dst");
        write(&source, "inner/a.txt", "a");
        std::os::unix::fs::symlink(&source, source.join("inner/back")).unwrap();
        fs::create_dir(&target).unwrap();

        let stats = merge_tree(&source, &target, MergeOptions::default()).unwrap();

        assert_eq!(stats.linked, 1);
        assert!(target.join("inner/back").is_dir());
    }
}
