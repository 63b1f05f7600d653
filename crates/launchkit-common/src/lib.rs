//! # Launchkit Common
//!
//! Shared types and errors for the launchkit launcher.
//!
//! This crate provides:
//! - The launcher error taxonomy and result alias
//! - The stream kind enumeration (stdout/stderr)

pub mod errors;
pub mod types;

pub use errors::{LaunchError, LaunchResult};
pub use types::StreamKind;
