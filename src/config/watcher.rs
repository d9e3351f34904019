//! Configuration file watcher for live detail-level changes.
//!
//! The parent directory is watched rather than the file itself so editors
//! that save by rename are still picked up. Only reloads that change the
//! detail level are forwarded; everything else needs a restart.

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::ReqlogConfig;
use crate::logger::DetailLevel;

/// Watches one configuration file and publishes level-changing reloads.
pub struct ConfigWatcher {
    path: PathBuf,
    applied: Mutex<DetailLevel>,
    update_tx: mpsc::UnboundedSender<ReqlogConfig>,
}

impl ConfigWatcher {
    /// Watcher for `path`, whose current level is `level`.
    ///
    /// Returns the watcher and the receiver the server drains.
    pub fn new(path: &Path, level: DetailLevel) -> (Self, mpsc::UnboundedReceiver<ReqlogConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            applied: Mutex::new(level),
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Whether `event` touches the watched file.
    fn concerns(&self, event: &Event) -> bool {
        matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
            && event
                .paths
                .iter()
                .any(|p| p.file_name() == self.path.file_name())
    }

    /// Reload the file. Returns the new config only when its level differs
    /// from the last one published.
    fn reload(&self) -> Result<Option<ReqlogConfig>, ConfigError> {
        let config = load_config(&self.path)?;
        let level = config.logging.detail_level();

        let mut applied = match self.applied.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if *applied == level {
            return Ok(None);
        }
        *applied = level;
        Ok(Some(config))
    }

    /// Start watching. Dropping the returned watcher stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if self.concerns(&event) => match self.reload() {
                    Ok(Some(config)) => {
                        tracing::info!(level = %config.logging.detail_level(), "Config reloaded");
                        let _ = self.update_tx.send(config);
                    }
                    Ok(None) => tracing::debug!("Config reloaded, detail level unchanged"),
                    Err(e) => tracing::error!(
                        error = %e,
                        "Failed to reload config, keeping current detail level"
                    ),
                },
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Config watcher started");
        Ok(watcher)
    }
}
