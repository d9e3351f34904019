//! Live level-control surface.
//!
//! # Routes (relative to the mount point)
//! ```text
//! GET /      → 200 {"level": "<name>"}
//! PUT /set   → 202 changed | 208 unchanged | 415 not JSON | 422 bad payload
//! ```
//!
//! # Design Decisions
//! - Mounted by the host application under a base path of its choosing
//! - A change is one atomic swap; exchanges that start afterwards use the
//!   new level

pub mod handlers;

use axum::{
    http::Method,
    routing::{get, put},
    Router,
};

use self::handlers::{get_level, method_not_allowed, set_level};
use crate::logger::{ExchangeLogger, LevelHandle};

/// Router over `level`, to be nested under a base path.
pub fn control_router(level: LevelHandle) -> Router {
    Router::new()
        .route(
            "/",
            get(get_level).fallback(|| async { method_not_allowed(Method::GET) }),
        )
        .route(
            "/set",
            put(set_level).fallback(|| async { method_not_allowed(Method::PUT) }),
        )
        .with_state(level)
}

impl ExchangeLogger {
    /// Level-control router for this logger.
    pub fn control_router(&self) -> Router {
        control_router(self.level_handle())
    }
}
