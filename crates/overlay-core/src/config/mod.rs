//! Configuration for the overlay engine
//!
//! Two representations live here:
//!
//! - [`Profile`]: the persisted form, exactly what sits in `config.json`
//!   (or `.toml` / `.yaml`). Paths are stored as written by the user and
//!   modules are stored by name.
//! - [`Config`]: the validated runtime value every engine operation takes.
//!   Paths are absolute, modules are resolved under the source root and all
//!   invariants (unique module names, reserved names, relative exception
//!   patterns) have been checked at construction.

mod profile;
mod resolved;

pub use profile::Profile;
pub use resolved::Config;
