//! Layered overlay merge engine
//!
//! Composes a privileged core tree and an ordered list of module trees into a
//! single target directory using links (or copies), and can reverse that
//! composition without losing files the user authored inside the target.
//!
//! - **Tree merging**: project a source tree into the target under an
//!   overwrite policy ([`merge`])
//! - **Pruning**: remove every link projection and the directories left empty
//!   ([`prune`])
//! - **Core swap**: capture the target as the core layer and give it back
//!   ([`swap`])
//! - **Exceptions vault**: snapshot real files matching configured patterns
//!   before a rebuild and replay them afterwards ([`vault`])
//! - **Orchestrator**: the high-level build, rebuild, setup and restore
//!   commands ([`engine`])
//!
//! # Architecture
//!
//! ```text
//!                 overlay-cli
//!                      |
//!                overlay-core
//!   engine -> swap / merge / prune / vault / modules
//!                      |
//!                 overlay-fs
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod merge;
pub mod modules;
pub mod prune;
pub mod status;
pub mod swap;
pub mod vault;

pub use config::{Config, Profile};
pub use engine::{BuildReport, FromDiffReport, Orchestrator};
pub use error::{Error, Result};
pub use merge::{MergeOptions, MergeStats, merge_structure, merge_tree};
pub use modules::{ModuleAdded, ModuleRemoved};
pub use prune::{PruneStats, prune};
pub use status::{ModuleStatus, TargetState, TargetStatus, status};
pub use vault::{ExceptionsVault, LoadOutcome, RuleMatches, SnapshotFailure, VaultReport};
