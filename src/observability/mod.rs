//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Exchange logger
//!     → sink.rs (rendered request/response messages, one write per message)
//!     → sink.rs Diagnostics (the logger's own faults, prefixed lines)
//!
//! Process
//!     → logging.rs (tracing subscriber: startup, config reload, level changes)
//! ```
//!
//! # Design Decisions
//! - Rendered exchange output is plain text written to a byte sink, separate
//!   from the process's tracing events
//! - Diagnostics are mirrored into tracing so they reach the process log too

pub mod logging;
pub mod sink;

pub use sink::{Diagnostics, MemorySink, OutputSink};
