//! Error types for launch operations.

use thiserror::Error;

/// Result type for launch operations.
pub type LaunchResult<T> = std::result::Result<T, LaunchError>;

/// Error taxonomy for the launcher.
///
/// Configuration errors surface synchronously from the call that introduced
/// the conflict, always before a process is spawned. Spawn errors surface
/// from the spawn call. Stream I/O errors are isolated per forwarder and
/// reported through the logging channel only; this variant exists for the
/// forwarder's internal bookkeeping.
#[derive(Error, Debug, Clone)]
pub enum LaunchError {
    /// Conflicting or invalid redirect configuration.
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    /// The OS refused to create the process.
    #[error("Spawn failed: {program} - {reason}")]
    SpawnFailed { program: String, reason: String },

    /// A forwarder hit a read failure other than clean EOF.
    #[error("Stream I/O error on {stream}: {reason}")]
    StreamIo { stream: String, reason: String },

    /// A handle was not found in the tracking registry.
    #[error("Handle not registered: {id}")]
    NotFound { id: String },
}

impl LaunchError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    pub fn spawn_failed(program: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SpawnFailed {
            program: program.into(),
            reason: reason.into(),
        }
    }

    pub fn stream_io(stream: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StreamIo {
            stream: stream.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let err = LaunchError::configuration("stdout redirected twice");
        assert!(matches!(err, LaunchError::Configuration { .. }));
        assert_eq!(
            format!("{}", err),
            "Configuration error: stdout redirected twice"
        );

        let err = LaunchError::spawn_failed("/bin/missing", "No such file or directory");
        assert!(matches!(err, LaunchError::SpawnFailed { .. }));
        assert!(format!("{}", err).contains("/bin/missing"));
    }

    #[test]
    fn test_error_pattern_matching() {
        let err = LaunchError::not_found("42");
        match err {
            LaunchError::NotFound { id } => assert_eq!(id, "42"),
            _ => panic!("Wrong error type"),
        }
    }
}
