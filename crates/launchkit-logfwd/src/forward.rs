//! Per-stream forwarding of child output into a log sink.

use crate::sink::LogSink;
use crate::types::LogRecord;
use launchkit_common::{LaunchError, StreamKind};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const JOIN_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

/// Pumps captured child streams into a log sink.
///
/// Each forwarded stream runs on its own background task, reading complete
/// lines until end-of-stream. A read failure other than clean EOF ends only
/// that stream's loop; it is reported through the logging channel and never
/// propagates to the caller.
pub struct LogForwarder {
    sink: Arc<dyn LogSink>,
    cancel_token: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    total_lines: Arc<AtomicI64>,
}

impl std::fmt::Debug for LogForwarder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogForwarder")
            .field("tasks", &self.tasks.lock().len())
            .field("total_lines", &self.total_lines.load(Ordering::SeqCst))
            .finish()
    }
}

impl LogForwarder {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            cancel_token: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
            total_lines: Arc::new(AtomicI64::new(0)),
        }
    }

    /// Total lines forwarded across all streams so far.
    pub fn lines_forwarded(&self) -> i64 {
        self.total_lines.load(Ordering::SeqCst)
    }

    /// Start forwarding a captured stream to the named logger on a
    /// background task.
    ///
    /// The task ends at stream EOF (child exit) or on [`shutdown`].
    ///
    /// [`shutdown`]: LogForwarder::shutdown
    pub fn forward(
        &self,
        stream: impl AsyncRead + Unpin + Send + 'static,
        kind: StreamKind,
        logger: impl Into<String>,
    ) {
        let logger = logger.into();
        let sink = Arc::clone(&self.sink);
        let total_lines = Arc::clone(&self.total_lines);
        let cancel_token = self.cancel_token.child_token();

        let task = tokio::spawn(async move {
            Self::stream_reader(stream, kind, logger, sink, total_lines, cancel_token).await;
        });

        self.tasks.lock().push(task);
    }

    async fn stream_reader(
        stream: impl AsyncRead + Unpin,
        kind: StreamKind,
        logger: String,
        sink: Arc<dyn LogSink>,
        total_lines: Arc<AtomicI64>,
        cancel_token: CancellationToken,
    ) {
        debug!(logger = %logger, stream = %kind, "Stream forwarding started");
        let reader = BufReader::new(stream);
        let mut lines = reader.lines();
        let mut line_num = 0i64;

        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    debug!(logger = %logger, stream = %kind, "Stream forwarding cancelled");
                    break;
                }
                result = lines.next_line() => {
                    match result {
                        Ok(Some(line)) => {
                            line_num += 1;
                            total_lines.fetch_add(1, Ordering::SeqCst);

                            let record = LogRecord::new(&logger, kind, line_num, line);
                            if let Err(e) = sink.append(&record) {
                                warn!(
                                    logger = %logger,
                                    stream = %kind,
                                    error = %e,
                                    "Failed to append forwarded line"
                                );
                            }
                        }
                        Ok(None) => {
                            debug!(logger = %logger, stream = %kind, "Stream ended");
                            break;
                        }
                        Err(e) => {
                            // Isolated per stream: report and stop this loop only.
                            let err = LaunchError::stream_io(kind.to_string(), e.to_string());
                            warn!(
                                logger = %logger,
                                error = %err,
                                "Forwarding stopped"
                            );
                            break;
                        }
                    }
                }
            }
        }

        debug!(
            logger = %logger,
            stream = %kind,
            lines = line_num,
            "Stream forwarding finished"
        );
    }

    /// Wait for all forwarding tasks to drain (stream EOF).
    ///
    /// Call after the child has exited to make sure every line written
    /// before exit has reached the sink.
    pub async fn join(&self) {
        let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
        for task in tasks {
            let _ = tokio::time::timeout(JOIN_TIMEOUT, task).await;
        }
    }

    /// Explicit teardown: cancel any still-running forwarding tasks and join.
    pub async fn shutdown(&self) {
        self.cancel_token.cancel();
        self.join().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemoryLogSink;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_forwards_complete_lines_until_eof() {
        let sink = MemoryLogSink::new();
        let forwarder = LogForwarder::new(Arc::clone(&sink) as Arc<dyn LogSink>);

        let (mut writer, reader) = tokio::io::duplex(256);
        forwarder.forward(reader, StreamKind::Stdout, "app");

        writer.write_all(b"first\nsecond\n").await.unwrap();
        drop(writer);

        forwarder.join().await;

        assert_eq!(sink.messages(), vec!["first", "second"]);
        assert_eq!(forwarder.lines_forwarded(), 2);
    }

    #[tokio::test]
    async fn test_streams_do_not_interleave_records() {
        let sink = MemoryLogSink::new();
        let forwarder = LogForwarder::new(Arc::clone(&sink) as Arc<dyn LogSink>);

        let (mut out_writer, out_reader) = tokio::io::duplex(256);
        let (mut err_writer, err_reader) = tokio::io::duplex(256);
        forwarder.forward(out_reader, StreamKind::Stdout, "app");
        forwarder.forward(err_reader, StreamKind::Stderr, "app");

        out_writer.write_all(b"output\n").await.unwrap();
        err_writer.write_all(b"error\n").await.unwrap();
        drop(out_writer);
        drop(err_writer);

        forwarder.join().await;

        let records = sink.records();
        assert_eq!(records.len(), 2);
        for record in &records {
            match record.stream {
                StreamKind::Stdout => assert_eq!(record.message, "output"),
                StreamKind::Stderr => assert_eq!(record.message, "error"),
            }
        }
    }

    #[tokio::test]
    async fn test_per_stream_logger_names() {
        let sink = MemoryLogSink::new();
        let forwarder = LogForwarder::new(Arc::clone(&sink) as Arc<dyn LogSink>);

        let (mut writer, reader) = tokio::io::duplex(256);
        forwarder.forward(reader, StreamKind::Stderr, "worker.errors");

        writer.write_all(b"boom\n").await.unwrap();
        drop(writer);

        forwarder.join().await;

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].logger, "worker.errors");
        assert_eq!(records[0].line_num, 1);
    }

    #[tokio::test]
    async fn test_read_error_stops_only_that_stream() {
        let sink = MemoryLogSink::new();
        let forwarder = LogForwarder::new(Arc::clone(&sink) as Arc<dyn LogSink>);

        let (mut bad_writer, bad_reader) = tokio::io::duplex(256);
        let (mut good_writer, good_reader) = tokio::io::duplex(256);
        forwarder.forward(bad_reader, StreamKind::Stdout, "app");
        forwarder.forward(good_reader, StreamKind::Stderr, "app");

        // Invalid UTF-8 makes next_line() fail; the stdout loop must stop
        // without affecting the stderr forwarder.
        bad_writer.write_all(&[0xff, 0xfe, b'\n']).await.unwrap();
        drop(bad_writer);

        good_writer.write_all(b"still here\n").await.unwrap();
        drop(good_writer);

        forwarder.join().await;

        assert_eq!(sink.messages(), vec!["still here"]);
    }

    #[tokio::test]
    async fn test_shutdown_cancels_pending_tasks() {
        let sink = MemoryLogSink::new();
        let forwarder = LogForwarder::new(Arc::clone(&sink) as Arc<dyn LogSink>);

        // Writer kept open: without cancellation the task would block on EOF.
        let (_writer, reader) = tokio::io::duplex(256);
        forwarder.forward(reader, StreamKind::Stdout, "app");

        forwarder.shutdown().await;
        assert!(sink.is_empty());
    }
}
