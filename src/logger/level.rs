//! Detail levels and the live level handle.
//!
//! # Design Decisions
//! - Levels are a closed enum; each maps to its own template pair, ordering
//!   is never used for range checks
//! - The live level is one `AtomicU8` per logger instance, so a reader sees
//!   either the old or the new level, never a torn value
//! - A change applies to every exchange that reads the level afterwards;
//!   in-flight exchanges finish at the level they started with

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Verbosity tier of the request/response log output.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DetailLevel {
    #[default]
    None = 0,
    Minimal = 1,
    Normal = 2,
    Verbose = 3,
    Debug = 4,
}

/// Returned by the strict name lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown detail level: {0:?}")]
pub struct UnknownLevel(pub String);

impl DetailLevel {
    /// Every level, least verbose first.
    pub const ALL: [DetailLevel; 5] = [
        DetailLevel::None,
        DetailLevel::Minimal,
        DetailLevel::Normal,
        DetailLevel::Verbose,
        DetailLevel::Debug,
    ];

    /// Canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            DetailLevel::None => "none",
            DetailLevel::Minimal => "minimal",
            DetailLevel::Normal => "normal",
            DetailLevel::Verbose => "verbose",
            DetailLevel::Debug => "debug",
        }
    }

    /// Exact lookup by canonical name; no trimming or case folding.
    pub fn from_canonical(name: &str) -> Option<Self> {
        DetailLevel::ALL.into_iter().find(|level| level.as_str() == name)
    }

    /// Lossy lookup: unrecognized names map to `None`.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or(DetailLevel::None)
    }

    /// Whether anything is rendered at this level.
    pub fn is_enabled(self) -> bool {
        self != DetailLevel::None
    }
}

impl From<u8> for DetailLevel {
    fn from(val: u8) -> Self {
        match val {
            1 => DetailLevel::Minimal,
            2 => DetailLevel::Normal,
            3 => DetailLevel::Verbose,
            4 => DetailLevel::Debug,
            _ => DetailLevel::None,
        }
    }
}

impl FromStr for DetailLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        DetailLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == lowered)
            .ok_or_else(|| UnknownLevel(s.to_string()))
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DetailLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DetailLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Shared, mutable current level of one logger instance.
#[derive(Debug, Clone, Default)]
pub struct LevelHandle {
    inner: Arc<AtomicU8>,
}

impl LevelHandle {
    pub fn new(level: DetailLevel) -> Self {
        Self {
            inner: Arc::new(AtomicU8::new(level as u8)),
        }
    }

    /// Current level.
    pub fn get(&self) -> DetailLevel {
        DetailLevel::from(self.inner.load(Ordering::Acquire))
    }

    pub fn set(&self, level: DetailLevel) {
        self.inner.store(level as u8, Ordering::Release);
    }

    /// Store `level` and return the level it replaced, as one atomic step.
    pub fn replace(&self, level: DetailLevel) -> DetailLevel {
        DetailLevel::from(self.inner.swap(level as u8, Ordering::AcqRel))
    }
}
