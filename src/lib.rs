//! Request/response exchange logger for HTTP servers and clients.
//!
//! One rendering core, two adapters: a tower layer for server handlers and a
//! wrapper for outbound transports, plus a small HTTP surface for changing
//! the detail level at runtime.

pub mod config;
pub mod control;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod logger;
pub mod observability;

pub use config::ReqlogConfig;
pub use error::{LoggerError, LoggerResult};
pub use http::{HttpServer, RequestId, RequestIdExt};
pub use lifecycle::{Shutdown, ShutdownSignal};
pub use logger::{DetailLevel, ExchangeLogger, LevelHandle};
pub use observability::{Diagnostics, MemorySink, OutputSink};
