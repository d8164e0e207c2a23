//! Directory primitives the merge engine is built on.
//!
//! Everything here works on native paths and reports failures as
//! [`Error::Io`] tagged with the path that failed.

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::{Error, Result};

/// True if anything occupies `path`, including a dangling link.
pub fn exists_or_link(path: impl AsRef<Path>) -> bool {
    fs::symlink_metadata(path.as_ref()).is_ok()
}

/// True iff `path` is an existing directory with zero entries.
pub fn is_empty_dir(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    if !path.is_dir() {
        return Ok(false);
    }
    let mut entries = fs::read_dir(path).map_err(|e| Error::io(path, e))?;
    Ok(entries.next().is_none())
}

/// Resolve `path` against the current directory without touching links.
///
/// `.` and `..` are folded lexically, so `mods/../game` becomes `game`
/// even when `mods` does not exist yet.
pub fn absolute(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let resolved = std::path::absolute(path).map_err(|e| Error::io(path, e))?;
    Ok(dunce::simplified(&fold_dots(&resolved)).to_path_buf())
}

fn fold_dots(path: &Path) -> PathBuf {
    let mut folded = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            // Popping past the root is a no-op
            Component::ParentDir => {
                folded.pop();
            }
            other => folded.push(other.as_os_str()),
        }
    }
    folded
}

/// Create `path` and any missing parents.
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    if path.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(path).map_err(|e| Error::io(path, e))?;
    Ok(true)
}

/// Delete the directory and everything in it, then recreate it empty.
///
/// Fails if `path` does not exist beforehand.
pub fn clear_and_recreate(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::remove_dir_all(path).map_err(|e| Error::io(path, e))?;
    fs::create_dir(path).map_err(|e| Error::io(path, e))?;
    tracing::debug!(path = %path.display(), "Cleared directory");
    Ok(())
}

/// Move the directory at `source` to `dest`, leaving an empty directory
/// behind at `source`.
///
/// `dest` must be absent or an empty directory; a populated `dest` is
/// refused with [`Error::NotEmpty`] before anything is touched.
pub fn atomic_swap(source: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
    let source = source.as_ref();
    let dest = dest.as_ref();

    if !source.is_dir() {
        return Err(Error::NotFound {
            path: source.to_path_buf(),
        });
    }
    if exists_or_link(dest) {
        if !is_empty_dir(dest)? {
            return Err(Error::NotEmpty {
                path: dest.to_path_buf(),
            });
        }
        fs::remove_dir(dest).map_err(|e| Error::io(dest, e))?;
    }
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }

    move_dir(source, dest)?;
    fs::create_dir(source).map_err(|e| Error::io(source, e))?;

    tracing::debug!(
        source = %source.display(),
        dest = %dest.display(),
        "Swapped directory"
    );
    Ok(())
}

fn move_dir(source: &Path, dest: &Path) -> Result<()> {
    match fs::rename(source, dest) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            tracing::debug!(
                source = %source.display(),
                dest = %dest.display(),
                "Rename crosses devices, copying instead"
            );
            if let Err(copy_err) = copy_tree(source, dest) {
                // Leave the source intact; only the partial copy goes
                let _ = fs::remove_dir_all(dest);
                return Err(copy_err);
            }
            fs::remove_dir_all(source).map_err(|e| Error::io(source, e))
        }
        Err(e) => Err(Error::io(source, e)),
    }
}

/// Recursively copy a tree, recreating links as links.
pub fn copy_tree(source: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
    let source = source.as_ref();
    let dest = dest.as_ref();

    for entry in WalkDir::new(source).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            Error::io(path, e.into())
        })?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| Error::NotFound {
                path: entry.path().to_path_buf(),
            })?;
        let target = dest.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|e| Error::io(&target, e))?;
        } else if file_type.is_symlink() {
            let pointee = fs::read_link(entry.path()).map_err(|e| Error::io(entry.path(), e))?;
            symlink_file(&pointee, &target)?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| Error::io(&target, e))?;
        }
    }
    Ok(())
}

/// Create a link at `link` pointing to `original`.
pub fn symlink_file(original: impl AsRef<Path>, link: impl AsRef<Path>) -> Result<()> {
    let original = original.as_ref();
    let link = link.as_ref();

    #[cfg(unix)]
    let created = std::os::unix::fs::symlink(original, link);
    #[cfg(windows)]
    let created = std::os::windows::fs::symlink_file(original, link);

    created.map_err(|e| Error::io(link, e))
}

/// Remove a file or link occupying `path`.
pub fn remove_entry(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::remove_file(path).map_err(|e| Error::io(path, e))
}

/// Remove a link without following it, whatever it points at.
pub fn remove_link(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let removed = fs::remove_file(path);
    // Windows directory links are removed as directories
    #[cfg(windows)]
    let removed = removed.or_else(|_| fs::remove_dir(path));
    removed.map_err(|e| Error::io(path, e))
}
