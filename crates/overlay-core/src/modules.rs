//! Adding and removing modules from the merge order.

use std::fs;

use overlay_fs::{NormalizedPath, ops};
use serde::Serialize;

use crate::merge::merge_structure;
use crate::{Config, Result};

/// Outcome of [`add_module`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleAdded {
    pub name: String,
    pub path: NormalizedPath,
    /// False when an existing directory was registered as-is
    pub created: bool,
    /// Directories mirrored from the target into the new module
    pub dirs_mirrored: usize,
}

/// Outcome of [`remove_module`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleRemoved {
    pub name: String,
    pub path: NormalizedPath,
    /// Whether the module directory was deleted from disk
    pub deleted: bool,
}

/// Register a module at the end of the merge order, creating its directory
/// when needed.
///
/// With `copy_structure`, a newly created module receives the target's
/// directory skeleton so files can be dropped into matching places.
pub fn add_module(config: &mut Config, name: &str, copy_structure: bool) -> Result<ModuleAdded> {
    let path = config.register_module(name)?;
    let native = path.to_native();

    let mut created = false;
    let mut dirs_mirrored = 0;

    if !ops::exists_or_link(&native) {
        if let Err(e) = fs::create_dir_all(&native) {
            config.unregister_module(name)?;
            return Err(overlay_fs::Error::io(&native, e).into());
        }
        created = true;

        let target = config.target_path().to_native();
        if copy_structure && target.is_dir() {
            dirs_mirrored = merge_structure(&target, &native)?.dirs_created;
        }
        tracing::info!(module = name, path = %path, "Created module");
    } else {
        tracing::info!(module = name, path = %path, "Registered existing module directory");
    }

    Ok(ModuleAdded {
        name: name.to_string(),
        path,
        created,
        dirs_mirrored,
    })
}

/// Drop a module from the merge order, optionally deleting its files.
pub fn remove_module(config: &mut Config, name: &str, delete_files: bool) -> Result<ModuleRemoved> {
    let path = config.unregister_module(name)?;
    let native = path.to_native();

    let deleted = delete_files && native.is_dir();
    if deleted {
        fs::remove_dir_all(&native).map_err(|e| overlay_fs::Error::io(&native, e))?;
        tracing::info!(module = name, path = %path, "Deleted module directory");
    }

    Ok(ModuleRemoved {
        name: name.to_string(),
        path,
        deleted,
    })
}
