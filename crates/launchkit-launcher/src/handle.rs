//! Handle for a spawned child process.

use chrono::{DateTime, Utc};
use launchkit_logfwd::LogForwarder;
use parking_lot::{Mutex, RwLock};
use std::process::ExitStatus;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::process::{Child, ChildStderr, ChildStdout};
use tracing::{debug, warn};

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

/// Wraps a spawned child process.
///
/// Liveness follows a two-state machine: `Running` until the OS process
/// terminates, then `Exited(code)` forever. The transition is detected via
/// non-blocking polls ([`is_running`]), never a blocking wait, and once
/// observed it is latched so repeated polls stay cheap and consistent.
///
/// Natural exit does not remove the handle from any [`LaunchRegistry`];
/// callers that spin-poll on liveness must unregister explicitly.
///
/// [`is_running`]: ProcessHandle::is_running
/// [`LaunchRegistry`]: crate::LaunchRegistry
pub struct ProcessHandle {
    id: u64,
    pid: Option<u32>,
    program: String,
    started_at: DateTime<Utc>,
    child: Mutex<Child>,
    exit: RwLock<Option<ExitStatus>>,
    stdout: Mutex<Option<ChildStdout>>,
    stderr: Mutex<Option<ChildStderr>>,
    forwarder: Option<LogForwarder>,
}

impl std::fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("id", &self.id)
            .field("pid", &self.pid)
            .field("program", &self.program)
            .field("exit", &*self.exit.read())
            .finish()
    }
}

impl ProcessHandle {
    pub(crate) fn new(
        program: String,
        child: Child,
        stdout: Option<ChildStdout>,
        stderr: Option<ChildStderr>,
        forwarder: Option<LogForwarder>,
    ) -> Self {
        Self {
            id: NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed),
            pid: child.id(),
            program,
            started_at: Utc::now(),
            child: Mutex::new(child),
            exit: RwLock::new(None),
            stdout: Mutex::new(stdout),
            stderr: Mutex::new(stderr),
            forwarder,
        }
    }

    /// Registry key for this handle.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// OS process id, if it was available at spawn time.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Non-blocking liveness poll.
    ///
    /// Cheap and repeatable; safe to call in a sleep-poll loop. Once the
    /// child has been observed exited this always returns false.
    pub fn is_running(&self) -> bool {
        if self.exit.read().is_some() {
            return false;
        }

        let mut child = self.child.lock();
        match child.try_wait() {
            Ok(Some(status)) => {
                debug!(
                    program = %self.program,
                    pid = ?self.pid,
                    code = ?status.code(),
                    "Child process exited"
                );
                *self.exit.write() = Some(status);
                false
            }
            Ok(None) => true,
            Err(e) => {
                // Status unknown; report and keep treating the child as live
                // so the caller's poll loop stays in charge.
                warn!(
                    program = %self.program,
                    pid = ?self.pid,
                    error = %e,
                    "Failed to poll child process status"
                );
                true
            }
        }
    }

    /// Exit code, once exit has been observed via [`is_running`].
    ///
    /// `None` while running, and also for children killed by a signal.
    ///
    /// [`is_running`]: ProcessHandle::is_running
    pub fn exit_code(&self) -> Option<i32> {
        self.exit.read().as_ref().and_then(|status| status.code())
    }

    /// Whether exit has been observed with a successful status.
    pub fn exit_success(&self) -> Option<bool> {
        self.exit.read().as_ref().map(|status| status.success())
    }

    /// Take the captured stdout endpoint, if stdout was set to `Pipe`.
    pub fn take_stdout(&self) -> Option<ChildStdout> {
        self.stdout.lock().take()
    }

    /// Take the captured stderr endpoint, if stderr was set to `Pipe`.
    pub fn take_stderr(&self) -> Option<ChildStderr> {
        self.stderr.lock().take()
    }

    /// Explicit teardown of forwarding resources.
    ///
    /// Drains active log forwarders to stream EOF so every line the child
    /// wrote before exit reaches the sink, then cancels anything still
    /// pending. Does not touch the registry; unregistering stays with the
    /// caller.
    pub async fn shutdown(&self) {
        if let Some(forwarder) = &self.forwarder {
            forwarder.join().await;
            forwarder.shutdown().await;
        }
    }
}
