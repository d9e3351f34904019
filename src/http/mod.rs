//! HTTP plumbing shared by the logger adapters and the demo server.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → request.rs (request id lookup, body drained into ReplayBody)
//!     → wrapped handler / transport
//!     → response.rs (BufferedResponse records status, headers, body)
//!     → flushed unchanged to the caller
//!
//! server.rs wires the demo app: logger layer, control surface, echo or
//! upstream forwarding through the round-trip logger.
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{ReplayBody, RequestId, RequestIdExt, X_REQUEST_ID};
pub use response::BufferedResponse;
pub use server::HttpServer;
