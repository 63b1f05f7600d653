//! Core types for log forwarding.

use chrono::{DateTime, Utc};
use launchkit_common::StreamKind;
use serde::{Deserialize, Serialize};

/// A single forwarded line from a child process stream.
///
/// Each record is a complete line, attributable to its originating stream.
/// Lines are never truncated or merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    /// Name of the logging sink the line was addressed to.
    pub logger: String,
    pub stream: StreamKind,
    pub line_num: i64,
    pub message: String,
}

impl LogRecord {
    pub fn new(
        logger: impl Into<String>,
        stream: StreamKind,
        line_num: i64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            logger: logger.into(),
            stream,
            line_num,
            message: message.into(),
        }
    }
}
