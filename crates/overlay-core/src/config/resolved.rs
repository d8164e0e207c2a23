//! Validated runtime configuration

use std::path::Path;

use overlay_fs::{LayerPath, NormalizedPath, ops, validate_path_identifier};

use super::Profile;
use crate::vault::validate_pattern;
use crate::{Error, Result};

/// Validated configuration passed to every engine operation
///
/// All paths are absolute. Modules live directly under the source root and
/// are kept in merge order; no two modules share a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    target_path: NormalizedPath,
    source_root: NormalizedPath,
    core_path: NormalizedPath,
    source_paths: Vec<NormalizedPath>,
    exceptions: Vec<String>,
    /// Whether modules may replace entries already present in the target
    pub overwrite: bool,
    /// Project core files by copy instead of link
    pub copy_core: bool,
    /// Project module files by copy instead of link
    pub copy_modules: bool,
}

impl Config {
    /// Create a configuration with no modules, no exception rules and all
    /// flags off.
    ///
    /// Relative paths resolve against the current directory. The target and
    /// the source root must not contain one another.
    pub fn new(target: impl AsRef<Path>, source_root: impl AsRef<Path>) -> Result<Self> {
        let target_path = NormalizedPath::new(ops::absolute(target)?);
        let source_root = NormalizedPath::new(ops::absolute(source_root)?);

        if target_path.relative_to(&source_root).is_some()
            || source_root.relative_to(&target_path).is_some()
        {
            return Err(Error::invalid_config(format!(
                "target {} and source root {} must not contain one another",
                target_path, source_root
            )));
        }

        let core_path = source_root.join(LayerPath::Core.as_str());
        Ok(Self {
            target_path,
            source_root,
            core_path,
            source_paths: Vec::new(),
            exceptions: Vec::new(),
            overwrite: false,
            copy_core: false,
            copy_modules: false,
        })
    }

    /// Build a configuration from a persisted profile.
    ///
    /// Relative paths in the profile resolve against `base_dir`, normally the
    /// directory containing the profile file.
    pub fn from_profile(profile: &Profile, base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        if profile.target.trim().is_empty() {
            return Err(Error::invalid_config("target must not be empty"));
        }
        if profile.source_root.trim().is_empty() {
            return Err(Error::invalid_config("source_root must not be empty"));
        }

        let mut config = Self::new(
            base_dir.join(&profile.target),
            base_dir.join(&profile.source_root),
        )?;
        config.overwrite = profile.overwrite;
        config.copy_core = profile.copy_core;
        config.copy_modules = profile.copy_modules;

        for name in &profile.sources {
            config.register_module(name)?;
        }
        for pattern in &profile.exceptions {
            config.add_exception(pattern)?;
        }
        Ok(config)
    }

    /// Convert back to the persisted form.
    ///
    /// Paths underneath `base_dir` are written relative to it.
    pub fn to_profile(&self, base_dir: impl AsRef<Path>) -> Profile {
        let base = NormalizedPath::new(dunce::simplified(base_dir.as_ref()));
        let render = |path: &NormalizedPath| match path.relative_to(&base) {
            Some(relative) => relative.to_string(),
            None => path.to_string(),
        };

        Profile {
            target: render(&self.target_path),
            source_root: render(&self.source_root),
            overwrite: self.overwrite,
            sources: self.module_names(),
            copy_core: self.copy_core,
            copy_modules: self.copy_modules,
            exceptions: self.exceptions.clone(),
        }
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_copy(mut self, copy_core: bool, copy_modules: bool) -> Self {
        self.copy_core = copy_core;
        self.copy_modules = copy_modules;
        self
    }

    pub fn with_module(mut self, name: &str) -> Result<Self> {
        self.register_module(name)?;
        Ok(self)
    }

    pub fn with_exception(mut self, pattern: &str) -> Result<Self> {
        self.add_exception(pattern)?;
        Ok(self)
    }

    /// The composition output directory.
    pub fn target_path(&self) -> &NormalizedPath {
        &self.target_path
    }

    pub fn source_root(&self) -> &NormalizedPath {
        &self.source_root
    }

    /// `source_root/_core`
    pub fn core_path(&self) -> &NormalizedPath {
        &self.core_path
    }

    /// `source_root/_exceptions`
    pub fn vault_path(&self) -> NormalizedPath {
        self.source_root.join(LayerPath::Exceptions.as_str())
    }

    /// Module directories in merge order.
    pub fn source_paths(&self) -> &[NormalizedPath] {
        &self.source_paths
    }

    /// Exception glob patterns in the order they were added.
    pub fn exceptions(&self) -> &[String] {
        &self.exceptions
    }

    /// Module names in merge order.
    pub fn module_names(&self) -> Vec<String> {
        self.source_paths
            .iter()
            .filter_map(|path| path.file_name().map(str::to_string))
            .collect()
    }

    pub fn module_path(&self, name: &str) -> NormalizedPath {
        self.source_root.join(name)
    }

    pub fn has_module(&self, name: &str) -> bool {
        let path = self.module_path(name);
        self.source_paths.contains(&path)
    }

    /// Append a module to the merge order.
    pub fn register_module(&mut self, name: &str) -> Result<NormalizedPath> {
        validate_path_identifier(name, "Module name").map_err(Error::invalid_config)?;
        if LayerPath::is_reserved(name) {
            return Err(Error::invalid_config(format!(
                "Module name '{}' is reserved",
                name
            )));
        }
        if self.has_module(name) {
            return Err(Error::ModuleExists {
                name: name.to_string(),
            });
        }

        let path = self.module_path(name);
        self.source_paths.push(path.clone());
        Ok(path)
    }

    /// Drop a module from the merge order, returning its directory.
    pub fn unregister_module(&mut self, name: &str) -> Result<NormalizedPath> {
        let path = self.module_path(name);
        let index = self
            .source_paths
            .iter()
            .position(|p| *p == path)
            .ok_or_else(|| Error::ModuleNotFound {
                name: name.to_string(),
            })?;
        Ok(self.source_paths.remove(index))
    }

    pub fn add_exception(&mut self, pattern: &str) -> Result<()> {
        validate_pattern(pattern)?;
        self.exceptions.push(pattern.to_string());
        Ok(())
    }

    /// Remove the exception rule at `index`, returning it.
    pub fn remove_exception(&mut self, index: usize) -> Result<String> {
        if index >= self.exceptions.len() {
            return Err(Error::ExceptionNotFound {
                index,
                count: self.exceptions.len(),
            });
        }
        Ok(self.exceptions.remove(index))
    }

    /// Create the target, the source root, the core and every module
    /// directory that does not exist yet.
    ///
    /// Returns the directories that were created.
    pub fn ensure_layout(&self) -> Result<Vec<NormalizedPath>> {
        let mut created = Vec::new();
        let wanted = [&self.target_path, &self.source_root, &self.core_path]
            .into_iter()
            .chain(self.source_paths.iter());

        for path in wanted {
            if ops::ensure_dir(path)? {
                tracing::debug!(path = %path, "Created directory");
                created.push(path.clone());
            }
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(temp: &TempDir) -> Config {
        Config::new(temp.path().join("target"), temp.path().join("mods")).unwrap()
    }

    #[test]
    fn core_and_vault_live_under_source_root() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);

        assert_eq!(config.core_path(), &config.source_root().join("_core"));
        assert_eq!(config.vault_path(), config.source_root().join("_exceptions"));
    }

    #[test]
    fn nested_target_and_source_root_are_rejected() {
        let temp = TempDir::new().unwrap();
        let result = Config::new(temp.path().join("mods/target"), temp.path().join("mods"));
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));

        let result = Config::new(temp.path(), temp.path().join("mods"));
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn sibling_target_given_relative_to_source_root_is_accepted() {
        let temp = TempDir::new().unwrap();
        let mods = temp.path().join("mods");

        let config = Config::from_profile(&Profile::new("../game", "."), &mods).unwrap();

        let base = ops::absolute(temp.path()).unwrap();
        assert_eq!(config.target_path(), &NormalizedPath::new(base.join("game")));
        assert_eq!(config.source_root(), &NormalizedPath::new(base.join("mods")));
    }

    #[test]
    fn parent_components_cannot_hide_nesting() {
        let temp = TempDir::new().unwrap();
        let mods = temp.path().join("mods");

        let result = Config::from_profile(&Profile::new("sub/../inner", "."), &mods);
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn duplicate_module_is_rejected() {
        let temp = TempDir::new().unwrap();
        let result = config_in(&temp)
            .with_module("a")
            .unwrap()
            .with_module("a");
        assert!(matches!(result, Err(Error::ModuleExists { .. })));
    }

    #[test]
    fn reserved_and_unsafe_module_names_are_rejected() {
        let temp = TempDir::new().unwrap();
        for name in ["_core", "_exceptions", "..", "a/b", ""] {
            let result = config_in(&temp).with_module(name);
            assert!(
                matches!(result, Err(Error::InvalidConfig { .. })),
                "name {:?} should be rejected",
                name
            );
        }
    }

    #[test]
    fn module_order_is_preserved() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp)
            .with_module("b")
            .unwrap()
            .with_module("a")
            .unwrap();
        assert_eq!(config.module_names(), vec!["b", "a"]);
    }

    #[test]
    fn remove_exception_out_of_range() {
        let temp = TempDir::new().unwrap();
        let mut config = config_in(&temp).with_exception("*.ini").unwrap();

        assert!(matches!(
            config.remove_exception(3),
            Err(Error::ExceptionNotFound { index: 3, count: 1 })
        ));
        assert_eq!(config.remove_exception(0).unwrap(), "*.ini");
        assert!(config.exceptions().is_empty());
    }

    #[test]
    fn profile_round_trip_keeps_relative_paths() {
        let temp = TempDir::new().unwrap();
        let mut profile = Profile::new("target", "mods");
        profile.sources = vec!["hd".into(), "fixes".into()];
        profile.overwrite = true;
        profile.exceptions = vec!["saves/**/*".into()];

        let config = Config::from_profile(&profile, temp.path()).unwrap();
        assert_eq!(config.to_profile(temp.path()), profile);
    }

    #[test]
    fn ensure_layout_creates_missing_directories() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp).with_module("hd").unwrap();

        let created = config.ensure_layout().unwrap();
        assert_eq!(created.len(), 4);
        assert!(config.core_path().is_dir());
        assert!(config.module_path("hd").is_dir());
        assert!(config.ensure_layout().unwrap().is_empty());
    }
}
