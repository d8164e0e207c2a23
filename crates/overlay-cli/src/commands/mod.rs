//! Command implementations for overlay-cli

pub mod config;
pub mod exceptions;
pub mod init;
pub mod module;
pub mod report;
pub mod status;
pub mod target;

pub use config::run_config_show;
pub use exceptions::run_exceptions;
pub use init::run_init;
pub use module::run_module;
pub use status::run_status;
pub use target::run_target;
