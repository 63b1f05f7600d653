//! Spawning: turns accumulated redirection intent into an OS process.

use crate::config::Launcher;
use crate::handle::ProcessHandle;
use crate::redirect::RedirectTarget;
use crate::registry::LaunchRegistry;
use launchkit_common::{LaunchError, LaunchResult, StreamKind};
use launchkit_logfwd::LogForwarder;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{info, warn};

impl Launcher {
    /// Validate the configuration, spawn the child process, and register
    /// the resulting handle.
    ///
    /// Streams are connected according to their effective redirect targets;
    /// unset streams forward to the launch's log sink. For each forwarded
    /// stream a background reader task pumps lines into the sink until EOF.
    ///
    /// # Errors
    ///
    /// - [`LaunchError::Configuration`] for conflicting redirect settings,
    ///   raised before any process is created.
    /// - [`LaunchError::SpawnFailed`] when the OS refuses to create the
    ///   process (missing executable, permission denied).
    pub async fn spawn(self, registry: &LaunchRegistry) -> LaunchResult<Arc<ProcessHandle>> {
        self.validate()?;

        let resolved = (self.resolver)(&self.program)?;
        let stdout_target = self.effective_target(StreamKind::Stdout);
        let stderr_target = self.effective_target(StreamKind::Stderr);

        let mut cmd = Command::new(&resolved);
        cmd.args(&self.args);
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }

        cmd.stdin(Stdio::null());
        cmd.stdout(stdio_for(&stdout_target, &resolved)?);
        cmd.stderr(stdio_for(&stderr_target, &resolved)?);

        let mut child = cmd.spawn().map_err(|e| {
            LaunchError::spawn_failed(resolved.display().to_string(), e.to_string())
        })?;
        let pid = child.id();

        // Wire up captured endpoints and forwarding tasks.
        let mut forwarder = None;
        let mut stdout_endpoint = None;
        let mut stderr_endpoint = None;

        match &stdout_target {
            RedirectTarget::Pipe => stdout_endpoint = child.stdout.take(),
            RedirectTarget::ToLog { logger } => {
                if let Some(stream) = child.stdout.take() {
                    forwarder
                        .get_or_insert_with(|| LogForwarder::new(Arc::clone(&self.sink)))
                        .forward(stream, StreamKind::Stdout, logger);
                } else {
                    warn!(program = %self.program, "Child stdout pipe unavailable");
                }
            }
            _ => {}
        }

        match &stderr_target {
            RedirectTarget::Pipe => stderr_endpoint = child.stderr.take(),
            RedirectTarget::ToLog { logger } => {
                if let Some(stream) = child.stderr.take() {
                    forwarder
                        .get_or_insert_with(|| LogForwarder::new(Arc::clone(&self.sink)))
                        .forward(stream, StreamKind::Stderr, logger);
                } else {
                    warn!(program = %self.program, "Child stderr pipe unavailable");
                }
            }
            _ => {}
        }

        let handle = Arc::new(ProcessHandle::new(
            self.program.clone(),
            child,
            stdout_endpoint,
            stderr_endpoint,
            forwarder,
        ));
        registry.register(Arc::clone(&handle));

        info!(
            id = handle.id(),
            pid = ?pid,
            program = %self.program,
            stdout = ?stdout_target,
            stderr = ?stderr_target,
            "Process spawned"
        );

        Ok(handle)
    }
}

/// Map a redirect target to the stdio configuration handed to the OS.
fn stdio_for(target: &RedirectTarget, program: &Path) -> LaunchResult<Stdio> {
    match target {
        RedirectTarget::Pipe | RedirectTarget::ToLog { .. } => Ok(Stdio::piped()),
        RedirectTarget::Inherit => Ok(Stdio::inherit()),
        RedirectTarget::File { path, append } => {
            let mut options = std::fs::OpenOptions::new();
            options.create(true);
            if *append {
                options.append(true);
            } else {
                options.write(true).truncate(true);
            }
            let file = options.open(path).map_err(|e| {
                LaunchError::spawn_failed(
                    program.display().to_string(),
                    format!("cannot open redirect file {}: {}", path.display(), e),
                )
            })?;
            Ok(Stdio::from(file))
        }
    }
}
