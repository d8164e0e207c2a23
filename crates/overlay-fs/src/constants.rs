//! Reserved names inside a source root.

use std::path::Path;

/// Directories and files with fixed names under the source root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerPath {
    /// The `_core` tree, merged before every module
    Core,
    /// The `_exceptions` vault holding snapshotted user edits
    Exceptions,
    /// The default profile file name
    Profile,
}

impl LayerPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Core => "_core",
            Self::Exceptions => "_exceptions",
            Self::Profile => "config.json",
        }
    }

    /// Whether `name` collides with a reserved directory name.
    pub fn is_reserved(name: &str) -> bool {
        name == Self::Core.as_str() || name == Self::Exceptions.as_str()
    }
}

impl AsRef<Path> for LayerPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for LayerPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for LayerPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
