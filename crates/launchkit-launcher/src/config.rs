//! Launch configuration: redirection intent accumulation and validation.

use crate::redirect::RedirectTarget;
use launchkit_common::{LaunchError, LaunchResult, StreamKind};
use launchkit_logfwd::{LogSink, TracingLogSink};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Strategy for resolving the configured program to an executable path.
///
/// Injected at construction so tests and embedders can point a launch at a
/// different binary without touching the rest of the configuration.
pub type ExecutableResolver = Arc<dyn Fn(&str) -> LaunchResult<PathBuf> + Send + Sync>;

/// Default resolver: the program is used as given (relative names go
/// through the OS `PATH` lookup at spawn time).
pub fn default_resolver() -> ExecutableResolver {
    Arc::new(|program: &str| {
        if program.is_empty() {
            return Err(LaunchError::configuration("program path cannot be empty"));
        }
        Ok(PathBuf::from(program))
    })
}

/// Accumulates redirection intent for a single launch.
///
/// Purely an in-memory accumulation: nothing happens until
/// [`spawn`](Launcher::spawn). Setting a redirect target for a stream
/// overwrites any prior target for that same stream (last wins); conflicting
/// combinations are rejected by validation before the process is created.
pub struct Launcher {
    pub(crate) program: String,
    pub(crate) args: Vec<String>,
    pub(crate) env: Vec<(String, String)>,
    pub(crate) working_dir: Option<PathBuf>,
    stdout: Option<RedirectTarget>,
    stderr: Option<RedirectTarget>,
    /// Whole-launch forward-to-log requests, in call order. More than one
    /// is a configuration error caught by `validate`.
    log_requests: Vec<String>,
    pub(crate) resolver: ExecutableResolver,
    pub(crate) sink: Arc<dyn LogSink>,
}

impl std::fmt::Debug for Launcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Launcher")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("stdout", &self.stdout)
            .field("stderr", &self.stderr)
            .field("log_requests", &self.log_requests)
            .finish()
    }
}

impl Launcher {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            working_dir: None,
            stdout: None,
            stderr: None,
            log_requests: Vec::new(),
            resolver: default_resolver(),
            sink: Arc::new(TracingLogSink),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Set the stdout redirect target. Later calls override earlier ones.
    pub fn redirect_stdout(mut self, target: RedirectTarget) -> Self {
        self.stdout = Some(target);
        self
    }

    /// Set the stderr redirect target. Later calls override earlier ones.
    pub fn redirect_stderr(mut self, target: RedirectTarget) -> Self {
        self.stderr = Some(target);
        self
    }

    /// Request that all otherwise-unredirected output be forwarded to the
    /// named logging sink.
    ///
    /// At most one such request is allowed per launch, and it cannot be
    /// combined with an explicit pipe/file/log target on a stream it would
    /// cover; both conflicts are rejected by validation before spawn.
    pub fn redirect_to_log(mut self, logger: impl Into<String>) -> Self {
        self.log_requests.push(logger.into());
        self
    }

    /// Replace the executable resolution strategy.
    pub fn with_resolver(mut self, resolver: ExecutableResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Replace the sink that forwarded output is appended to.
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Currently stored stdout target, if explicitly set.
    pub fn stdout_target(&self) -> Option<&RedirectTarget> {
        self.stdout.as_ref()
    }

    /// Currently stored stderr target, if explicitly set.
    pub fn stderr_target(&self) -> Option<&RedirectTarget> {
        self.stderr.as_ref()
    }

    /// Reject conflicting redirect configuration before spawn.
    pub fn validate(&self) -> LaunchResult<()> {
        if self.log_requests.len() > 1 {
            return Err(LaunchError::configuration(
                "redirect to log requested more than once",
            ));
        }

        if let Some(logger) = self.log_requests.first() {
            for (kind, target) in [
                (StreamKind::Stdout, &self.stdout),
                (StreamKind::Stderr, &self.stderr),
            ] {
                if let Some(target) = target {
                    if target.conflicts_with_log_redirect() {
                        return Err(LaunchError::configuration(format!(
                            "{} is already redirected ({:?}), cannot also forward to log '{}'",
                            kind, target, logger
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Logger name used when no explicit forward-to-log request was made.
    pub(crate) fn default_logger(&self) -> String {
        Path::new(&self.program)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.program)
            .to_string()
    }

    /// Resolve the effective target for a stream.
    ///
    /// An unset stream falls back to the configurator default: forward to
    /// the explicit log request if one was made, otherwise to the launch's
    /// default logger.
    pub(crate) fn effective_target(&self, kind: StreamKind) -> RedirectTarget {
        let explicit = match kind {
            StreamKind::Stdout => &self.stdout,
            StreamKind::Stderr => &self.stderr,
        };
        match explicit {
            Some(target) => target.clone(),
            None => {
                let logger = self
                    .log_requests
                    .first()
                    .cloned()
                    .unwrap_or_else(|| self.default_logger());
                RedirectTarget::ToLog { logger }
            }
        }
    }
}
