//! Redirect targets for child process streams.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Destination for a child's stdout or stderr stream.
///
/// Exactly one effective target exists per stream. An unset stream falls
/// back to the configurator default (forward to the launch's logger), which
/// is distinct from an explicit [`RedirectTarget::Inherit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RedirectTarget {
    /// Capture the stream; the handle exposes a readable endpoint.
    Pipe,
    /// Connect the stream directly to the parent's corresponding stream.
    Inherit,
    /// Redirect the stream to a file, truncating unless `append` is set.
    File { path: PathBuf, append: bool },
    /// Capture the stream and pump each line into the named logging sink.
    ToLog { logger: String },
}

impl RedirectTarget {
    /// File target that truncates on open.
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self::File {
            path: path.as_ref().to_path_buf(),
            append: false,
        }
    }

    /// File target that appends to existing content.
    pub fn file_append(path: impl AsRef<Path>) -> Self {
        Self::File {
            path: path.as_ref().to_path_buf(),
            append: true,
        }
    }

    /// Forward-to-log target addressing the named sink.
    pub fn to_log(logger: impl Into<String>) -> Self {
        Self::ToLog {
            logger: logger.into(),
        }
    }

    /// Whether this target claims the stream for an endpoint or a file,
    /// which conflicts with a whole-launch log redirect.
    pub(crate) fn conflicts_with_log_redirect(&self) -> bool {
        matches!(self, Self::Pipe | Self::File { .. } | Self::ToLog { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_constructors() {
        assert_eq!(
            RedirectTarget::file("/tmp/out"),
            RedirectTarget::File {
                path: PathBuf::from("/tmp/out"),
                append: false,
            }
        );
        assert_eq!(
            RedirectTarget::file_append("/tmp/out"),
            RedirectTarget::File {
                path: PathBuf::from("/tmp/out"),
                append: true,
            }
        );
    }

    #[test]
    fn test_log_redirect_conflicts() {
        assert!(RedirectTarget::Pipe.conflicts_with_log_redirect());
        assert!(RedirectTarget::file("/tmp/out").conflicts_with_log_redirect());
        assert!(RedirectTarget::to_log("foo").conflicts_with_log_redirect());
        assert!(!RedirectTarget::Inherit.conflicts_with_log_redirect());
    }
}
