//! Request/response exchange logger.
//!
//! # Data Flow
//! ```text
//! Server:  request → middleware.rs ─┐             ┌─→ handler
//! Client:  request → transport.rs ──┴→ exchange.rs ───┴─→ transport round trip
//!
//! exchange.rs per exchange:
//!     level.rs (read once; none → pass through)
//!     → context.rs (request snapshot, body re-buffered)
//!     → template.rs + helpers.rs + redact.rs (render) → output sink
//!     → forward, record response, flush to caller
//!     → context.rs (response snapshot) → render → output sink
//! ```

pub mod context;
pub mod exchange;
pub mod helpers;
pub mod level;
pub mod middleware;
pub mod redact;
pub mod template;
pub mod transport;

pub use exchange::{ExchangeLogger, ExchangeLoggerBuilder};
pub use context::{RequestContext, ResponseContext};
pub use level::{DetailLevel, LevelHandle, UnknownLevel};
pub use middleware::{RequestLogger, RequestLoggerLayer};
pub use redact::RedactionPolicy;
pub use template::TemplateSet;
pub use transport::{RoundTripLayer, RoundTripLogger};
