//! Filesystem primitives for the overlay composer
//!
//! Provides normalized paths, the directory primitives the merge engine is
//! built on (emptiness checks, clear-and-recreate, directory swaps), and
//! safe atomic I/O for persisted profiles.

pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod ops;
pub mod path;

pub use config::{ConfigFormat, ConfigStore};
pub use constants::LayerPath;
pub use error::{Error, Result};
pub use io::RobustnessConfig;
pub use path::{NormalizedPath, validate_path_identifier};
