//! # Launchkit Launcher
//!
//! Launches a child process with per-stream output redirection.
//!
//! This crate provides:
//! - [`RedirectTarget`] - where a stream goes (pipe, inherit, file, log)
//! - [`Launcher`] - accumulates redirection intent, validates it, and spawns
//! - [`ProcessHandle`] - liveness polling and exit status for a spawned child
//! - [`LaunchRegistry`] - explicit tracking table for live handles
//!
//! ## Control flow
//!
//! Caller configures redirection, the launcher validates before spawn, the
//! spawned child is wrapped in a [`ProcessHandle`] and registered, the caller
//! polls [`ProcessHandle::is_running`] until exit, then unregisters.
//!
//! ```rust,no_run
//! use launchkit_launcher::{Launcher, LaunchRegistry, RedirectTarget};
//!
//! # async fn run() -> launchkit_common::LaunchResult<()> {
//! let registry = LaunchRegistry::new();
//! let handle = Launcher::new("my-service")
//!     .arg("--port=8080")
//!     .redirect_stderr(RedirectTarget::file("/tmp/my-service.err"))
//!     .spawn(&registry)
//!     .await?;
//!
//! while handle.is_running() {
//!     tokio::time::sleep(std::time::Duration::from_millis(10)).await;
//! }
//! handle.shutdown().await;
//! registry.unregister(handle.id())?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod handle;
pub mod redirect;
pub mod registry;
mod spawn;

pub use config::{default_resolver, ExecutableResolver, Launcher};
pub use handle::ProcessHandle;
pub use redirect::RedirectTarget;
pub use registry::LaunchRegistry;
