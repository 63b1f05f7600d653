//! # Launchkit Log Forwarding
//!
//! Captures child process output and re-emits it as structured log records.
//!
//! This crate provides:
//! - The [`LogSink`] trait for append-only log targets
//! - Sink implementations (tracing, in-memory)
//! - [`LogForwarder`], which pumps each captured stream into a sink
//!   line-by-line on its own background task

pub mod forward;
pub mod sink;
pub mod types;

pub use forward::LogForwarder;
pub use sink::{LogSink, MemoryLogSink, TracingLogSink};
pub use types::LogRecord;
