//! Log sinks for forwarded output.

use crate::types::LogRecord;
use launchkit_common::LaunchResult;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

/// Trait for appending forwarded log records to a target.
///
/// Implementations must be safe for concurrent appends from multiple
/// forwarder tasks (one per forwarded stream).
pub trait LogSink: Send + Sync {
    /// Append a log record.
    fn append(&self, record: &LogRecord) -> LaunchResult<()>;
}

/// Sink that re-emits each line as a `tracing` event.
///
/// The logger name and originating stream are attached as structured fields,
/// so subscribers can route per-launch output.
#[derive(Debug, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn append(&self, record: &LogRecord) -> LaunchResult<()> {
        info!(
            logger = %record.logger,
            stream = %record.stream,
            "{}", record.message
        );
        Ok(())
    }
}

/// In-memory sink that records every appended line.
///
/// Useful for tests and for callers that want to inspect child output
/// after the fact.
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLogSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Snapshot of all records appended so far.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// Messages only, in append order.
    pub fn messages(&self) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .map(|r| r.message.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl LogSink for MemoryLogSink {
    fn append(&self, record: &LogRecord) -> LaunchResult<()> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use launchkit_common::StreamKind;

    #[test]
    fn test_memory_sink_collects_in_order() {
        let sink = MemoryLogSink::new();
        sink.append(&LogRecord::new("app", StreamKind::Stdout, 1, "one"))
            .unwrap();
        sink.append(&LogRecord::new("app", StreamKind::Stderr, 1, "two"))
            .unwrap();

        assert_eq!(sink.messages(), vec!["one", "two"]);
        assert_eq!(sink.records()[1].stream, StreamKind::Stderr);
    }

    #[tokio::test]
    async fn test_memory_sink_concurrent_appends() {
        let sink = MemoryLogSink::new();

        let mut tasks = Vec::new();
        for i in 0..8 {
            let sink = Arc::clone(&sink);
            tasks.push(tokio::spawn(async move {
                for j in 0..50 {
                    sink.append(&LogRecord::new(
                        "app",
                        StreamKind::Stdout,
                        j,
                        format!("{}-{}", i, j),
                    ))
                    .unwrap();
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(sink.records().len(), 8 * 50);
    }
}
