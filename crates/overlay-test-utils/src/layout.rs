//! [`TestLayout`] builder for overlay test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use walkdir::WalkDir;

/// One entry of a [`TestLayout::tree`] listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEntry {
    Dir(String),
    File(String),
    Link(String),
}

impl TreeEntry {
    pub fn path(&self) -> &str {
        match self {
            Self::Dir(path) | Self::File(path) | Self::Link(path) => path,
        }
    }
}

/// A temporary directory holding `target/` and `mods/` side by side.
///
/// The core lives at `mods/_core` and modules at `mods/<name>`, the same
/// layout the engine derives from a source root.
///
/// # Example
///
/// ```rust,no_run
/// use overlay_test_utils::TestLayout;
///
/// let layout = TestLayout::new();
/// layout.write_core("a.txt", "1");
/// layout.write_module("hd", "a.txt", "2");
/// layout.assert_missing("a.txt");
/// ```
pub struct TestLayout {
    temp_dir: TempDir,
}

impl Default for TestLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl TestLayout {
    /// Create the temporary directory with empty `target/` and `mods/`.
    pub fn new() -> Self {
        let layout = Self {
            temp_dir: TempDir::new().unwrap(),
        };
        fs::create_dir_all(layout.target()).unwrap();
        fs::create_dir_all(layout.source_root()).unwrap();
        layout
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn target(&self) -> PathBuf {
        self.root().join("target")
    }

    pub fn source_root(&self) -> PathBuf {
        self.root().join("mods")
    }

    pub fn core(&self) -> PathBuf {
        self.source_root().join("_core")
    }

    pub fn vault(&self) -> PathBuf {
        self.source_root().join("_exceptions")
    }

    pub fn module(&self, name: &str) -> PathBuf {
        self.source_root().join(name)
    }

    /// Write `content` to `rel` under the target, creating parents.
    pub fn write_target(&self, rel: &str, content: &str) -> PathBuf {
        write_file(&self.target(), rel, content)
    }

    pub fn write_core(&self, rel: &str, content: &str) -> PathBuf {
        write_file(&self.core(), rel, content)
    }

    pub fn write_module(&self, name: &str, rel: &str, content: &str) -> PathBuf {
        write_file(&self.module(name), rel, content)
    }

    /// Read a target file, following links.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read_target(&self, rel: &str) -> String {
        let path = self.target().join(rel);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Could not read {}: {}", path.display(), e))
    }

    /// Assert that `rel` in the target is a link resolving to `expected`.
    ///
    /// # Panics
    /// Panics if the entry is not a link or points elsewhere.
    pub fn assert_link(&self, rel: &str, expected: &Path) {
        let path = self.target().join(rel);
        assert!(
            path.is_symlink(),
            "Expected a link at {}",
            path.display()
        );
        let pointee = fs::read_link(&path).unwrap();
        assert_eq!(
            fs::canonicalize(&pointee).unwrap(),
            fs::canonicalize(expected).unwrap(),
            "Link {} points at the wrong file",
            path.display()
        );
    }

    /// Assert that `rel` in the target is a real file holding `content`.
    pub fn assert_real_file(&self, rel: &str, content: &str) {
        let path = self.target().join(rel);
        assert!(
            !path.is_symlink() && path.is_file(),
            "Expected a real file at {}",
            path.display()
        );
        assert_eq!(self.read_target(rel), content);
    }

    /// Assert that nothing, not even a dangling link, sits at `rel`.
    pub fn assert_missing(&self, rel: &str) {
        let path = self.target().join(rel);
        assert!(
            fs::symlink_metadata(&path).is_err(),
            "Expected nothing at {}",
            path.display()
        );
    }

    /// Sorted listing of everything under `dir`, relative and `/`-separated.
    /// Links are never followed.
    pub fn tree(&self, dir: &Path) -> Vec<TreeEntry> {
        let mut entries: Vec<TreeEntry> = WalkDir::new(dir)
            .min_depth(1)
            .follow_links(false)
            .into_iter()
            .map(|entry| {
                let entry = entry.unwrap();
                let rel = entry
                    .path()
                    .strip_prefix(dir)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/");
                let file_type = entry.file_type();
                if file_type.is_symlink() {
                    TreeEntry::Link(rel)
                } else if file_type.is_dir() {
                    TreeEntry::Dir(rel)
                } else {
                    TreeEntry::File(rel)
                }
            })
            .collect();
        entries.sort_by(|a, b| a.path().cmp(b.path()));
        entries
    }

    /// Relative path and content of every file reachable under `dir`,
    /// following links. Used to compare trees byte for byte.
    pub fn snapshot(&self, dir: &Path) -> Vec<(String, String)> {
        let mut files: Vec<(String, String)> = WalkDir::new(dir)
            .min_depth(1)
            .follow_links(true)
            .into_iter()
            .map(|entry| entry.unwrap())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| {
                let rel = entry
                    .path()
                    .strip_prefix(dir)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/");
                (rel, fs::read_to_string(entry.path()).unwrap())
            })
            .collect();
        files.sort();
        files
    }
}

fn write_file(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}
