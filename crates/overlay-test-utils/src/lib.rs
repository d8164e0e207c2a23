//! Shared test utilities for the overlay workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`layout`]: [`TestLayout`], a temporary target and source root pair
//!   with helpers for writing layers and asserting on the composed target

pub mod layout;

pub use layout::{TestLayout, TreeEntry};
