//! Normalized path handling for cross-platform compatibility

use std::path::{Path, PathBuf};

/// A path normalized to use forward slashes internally.
///
/// Backslashes become forward slashes, repeated separators collapse and `.`
/// components are dropped. `..` is kept as-is: profiles legitimately point
/// at siblings of their own directory. Conversion to the platform-native
/// form happens only at I/O boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let raw = path.as_ref().to_string_lossy().replace('\\', "/");
        Self {
            inner: clean(&raw),
        }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a segment.
    pub fn join(&self, segment: &str) -> Self {
        let segment = segment.replace('\\', "/");
        if self.inner.is_empty() || self.inner == "." {
            return Self {
                inner: clean(&segment),
            };
        }
        Self {
            inner: clean(&format!("{}/{}", self.inner, segment)),
        }
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        match self.inner.rfind('/') {
            Some(0) if self.inner.len() > 1 => Some(Self {
                inner: "/".to_string(),
            }),
            Some(idx) if idx > 0 => Some(Self {
                inner: self.inner[..idx].to_string(),
            }),
            _ => None,
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        self.inner.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 { None } else { Some(&name[idx + 1..]) }
        })
    }

    /// Whether the path is absolute (POSIX root or a Windows drive prefix).
    pub fn is_absolute(&self) -> bool {
        self.to_native().is_absolute() || self.inner.starts_with('/')
    }

    /// Express this path relative to `base`, if it lies underneath it.
    pub fn relative_to(&self, base: &NormalizedPath) -> Option<Self> {
        if self.inner == base.inner {
            return Some(Self {
                inner: ".".to_string(),
            });
        }
        let prefix = if base.inner.ends_with('/') {
            base.inner.clone()
        } else {
            format!("{}/", base.inner)
        };
        self.inner.strip_prefix(&prefix).map(|rest| Self {
            inner: rest.to_string(),
        })
    }

    /// Check if this path exists on the filesystem.
    ///
    /// Dangling links count as existing.
    pub fn exists(&self) -> bool {
        crate::ops::exists_or_link(self.to_native())
    }

    /// Check if this is a directory (following links).
    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    /// Check if this is a file (following links).
    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }
}

fn clean(raw: &str) -> String {
    let absolute = raw.starts_with('/');
    let parts: Vec<&str> = raw
        .split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect();

    match (absolute, parts.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{}", parts.join("/")),
        (false, true) if raw.is_empty() => String::new(),
        (false, true) => ".".to_string(),
        (false, false) => parts.join("/"),
    }
}

/// Validate that a name is usable as a single directory component.
///
/// Returns a human-readable message naming `label` on failure.
pub fn validate_path_identifier(value: &str, label: &str) -> std::result::Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} must not be empty", label));
    }
    if value == "." || value == ".." {
        return Err(format!("{} '{}' is not a valid name", label, value));
    }
    if value.contains('/') || value.contains('\\') {
        return Err(format!(
            "{} '{}' must not contain path separators",
            label, value
        ));
    }
    if value.chars().any(|c| c.is_control() || c == ':') {
        return Err(format!(
            "{} '{}' contains characters that are not allowed in a directory name",
            label, value
        ));
    }
    Ok(())
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl serde::Serialize for NormalizedPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.inner)
    }
}

impl<'de> serde::Deserialize<'de> for NormalizedPath {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::new(raw))
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}
