//! Persisted profile parsing

use crate::Result;
use overlay_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};

/// Overlay profile as stored on disk
///
/// `target` and `source_root` may be relative; they resolve against the
/// directory containing the profile file. `sources` lists module directory
/// names under `source_root` in merge order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Directory the composition is materialized into
    pub target: String,

    /// Directory holding `_core`, `_exceptions` and every module
    pub source_root: String,

    /// Whether later modules replace entries earlier layers created
    #[serde(default)]
    pub overwrite: bool,

    /// Module names in merge order
    #[serde(default)]
    pub sources: Vec<String>,

    /// Copy core files instead of linking them
    #[serde(default)]
    pub copy_core: bool,

    /// Copy module files instead of linking them
    #[serde(default)]
    pub copy_modules: bool,

    /// Glob patterns, relative to the target, naming files to protect
    #[serde(default)]
    pub exceptions: Vec<String>,
}

impl Profile {
    /// Create a profile with default flags and no modules.
    pub fn new(target: impl Into<String>, source_root: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            source_root: source_root.into(),
            ..Self::default()
        }
    }

    /// Load a profile, detecting the format from the extension.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use overlay_core::Profile;
    /// use overlay_fs::NormalizedPath;
    ///
    /// let profile = Profile::load(&NormalizedPath::new("config.json")).unwrap();
    /// println!("{} modules", profile.sources.len());
    /// ```
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        let profile = ConfigStore::new().load(path)?;
        Ok(profile)
    }

    /// Save the profile atomically.
    pub fn save(&self, path: &NormalizedPath) -> Result<()> {
        ConfigStore::new().save(path, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn optional_fields_default() {
        let profile: Profile =
            serde_json::from_str(r#"{"target": "out", "source_root": "mods"}"#).unwrap();

        assert_eq!(profile, Profile::new("out", "mods"));
        assert!(!profile.overwrite);
        assert!(profile.sources.is_empty());
    }

    #[test]
    fn missing_target_is_rejected() {
        let result: std::result::Result<Profile, _> =
            serde_json::from_str(r#"{"source_root": "mods"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn save_and_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = NormalizedPath::new(temp.path().join("config.json"));
        let mut profile = Profile::new("out", "mods");
        profile.sources = vec!["a".into(), "b".into()];
        profile.exceptions = vec!["**/*.ini".into()];

        profile.save(&path).unwrap();
        assert_eq!(Profile::load(&path).unwrap(), profile);
    }
}
