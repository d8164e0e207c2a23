//! Atomic I/O operations with file locking

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Tuning knobs for [`write_atomic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobustnessConfig {
    /// How long to keep retrying the advisory lock before giving up.
    pub lock_timeout: Duration,
    /// Whether to fsync the temp file before renaming it into place.
    pub enable_fsync: bool,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
            enable_fsync: true,
        }
    }
}

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename so readers never observe a partial
/// profile. An exclusive advisory lock on a sibling `<name>.lock` file is
/// held for the duration of the write. The lock file stays on disk so every
/// writer contends on the same inode.
pub fn write_atomic(path: &NormalizedPath, content: &[u8], config: RobustnessConfig) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let lock_path = sibling(&native_path, |name| format!("{}.lock", name));
    let lock_file = acquire_lock(&lock_path, &native_path, config.lock_timeout)?;

    let result = write_via_temp(&native_path, content, config.enable_fsync);

    let _ = FileExt::unlock(&lock_file);

    result
}

fn write_via_temp(native_path: &Path, content: &[u8], fsync: bool) -> Result<()> {
    // Same directory keeps the rename on one filesystem
    let temp_path = sibling(native_path, |name| {
        format!(".{}.{}.tmp", name, std::process::id())
    });

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    let written = temp_file
        .write_all(content)
        .and_then(|_| if fsync { temp_file.sync_all() } else { Ok(()) });
    drop(temp_file);

    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::io(&temp_path, e));
    }

    fs::rename(&temp_path, native_path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        Error::io(native_path, e)
    })
}

fn acquire_lock(lock_path: &Path, target: &Path, timeout: Duration) -> Result<File> {
    let lock_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)
        .map_err(|e| Error::io(lock_path, e))?;

    let policy = ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_millis(10))
        .with_max_interval(Duration::from_millis(200))
        .with_max_elapsed_time(Some(timeout))
        .build();

    backoff::retry(policy, || {
        lock_file
            .try_lock_exclusive()
            .map_err(backoff::Error::transient)
    })
    .map_err(|_| Error::LockFailed {
        path: target.to_path_buf(),
    })?;

    Ok(lock_file)
}

fn sibling(path: &Path, name: impl FnOnce(&str) -> String) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(name(&file_name))
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

