//! Header redaction per detail level.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use std::collections::{HashMap, HashSet};

use crate::logger::level::DetailLevel;

/// Value substituted for every masked header.
pub const REDACTED: &str = "[redacted]";

/// Headers masked by default at every level below `debug`.
pub const DEFAULT_REDACTED_HEADERS: [&str; 2] = ["authorization", "cookie"];

/// Immutable table of header names to mask, keyed by level.
///
/// `Debug` always maps to the empty set. `None` has no entry since nothing is
/// rendered at that level.
#[derive(Debug, Clone)]
pub struct RedactionPolicy {
    table: HashMap<DetailLevel, HashSet<HeaderName>>,
}

impl RedactionPolicy {
    /// Mask `names` at `minimal`, `normal` and `verbose`.
    pub fn with_headers<I>(names: I) -> Self
    where
        I: IntoIterator<Item = HeaderName>,
    {
        let masked: HashSet<HeaderName> = names.into_iter().collect();
        let mut table = HashMap::new();
        for level in [DetailLevel::Minimal, DetailLevel::Normal, DetailLevel::Verbose] {
            table.insert(level, masked.clone());
        }
        table.insert(DetailLevel::Debug, HashSet::new());
        Self { table }
    }

    /// Copy of `headers` with masked values replaced by the placeholder.
    /// The original map is left untouched.
    pub fn redacted(&self, level: DetailLevel, headers: &HeaderMap) -> HeaderMap {
        let mut copy = headers.clone();
        if let Some(names) = self.table.get(&level) {
            for name in names {
                if copy.contains_key(name) {
                    copy.insert(name.clone(), HeaderValue::from_static(REDACTED));
                }
            }
        }
        copy
    }
}

impl Default for RedactionPolicy {
    fn default() -> Self {
        Self::with_headers(
            DEFAULT_REDACTED_HEADERS
                .into_iter()
                .map(HeaderName::from_static),
        )
    }
}
