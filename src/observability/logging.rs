//! Process logging.
//!
//! # Design Decisions
//! - Uses the tracing crate for the process's own events
//! - Filter comes from `RUST_LOG` when set, otherwise from config

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directive when neither `RUST_LOG` nor config provide one.
pub const DEFAULT_FILTER: &str = "reqlog=info,tower_http=info";

/// Install the global tracing subscriber.
///
/// `directive` is used when `RUST_LOG` is unset or invalid; an invalid
/// `directive` falls back to [`DEFAULT_FILTER`].
pub fn init(directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
