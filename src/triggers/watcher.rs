//! File watching for automatic distribution passes.

use super::run_pass;
use crate::core::{ClientSettings, OptionsClient};
use crate::error::{MonitorError, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Runs a distribution pass whenever a document file changes.
///
/// Watches the file's parent directory so editors that replace the file by
/// rename are still noticed. Bursts of events are debounced: after the first
/// event the trigger waits for the debounce window, drops whatever else
/// arrived meanwhile, and runs a single pass.
///
/// Dropping the trigger stops watching.
///
/// # Examples
///
/// ```rust,no_run
/// use options_monitor::prelude::*;
/// use options_monitor::sources::FileSource;
/// use options_monitor::triggers::FileTrigger;
/// use std::time::Duration;
///
/// # async fn example() -> Result<()> {
/// let client = OptionsClient::new(FileSource::new("/etc/app/options.json"));
/// let trigger = FileTrigger::start(
///     client.clone(),
///     "/etc/app/options.json",
///     Duration::from_millis(500),
/// )?;
/// # Ok(())
/// # }
/// ```
pub struct FileTrigger {
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
    path: PathBuf,
    debounce_duration: Duration,
}

impl FileTrigger {
    /// Start watching `path` on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be resolved or watched.
    pub fn start(
        client: OptionsClient,
        path: impl AsRef<Path>,
        debounce_duration: Duration,
    ) -> Result<Self> {
        let path = path
            .as_ref()
            .canonicalize()
            .map_err(|e| MonitorError::TriggerError(format!("Failed to resolve path: {}", e)))?;
        let directory = path
            .parent()
            .ok_or_else(|| {
                MonitorError::TriggerError(format!("No parent directory for {}", path.display()))
            })?
            .to_path_buf();

        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<()>();
        let watched = path.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                // Only care about changes to the document itself
                let relevant = matches!(
                    event.kind,
                    notify::EventKind::Modify(_) | notify::EventKind::Create(_)
                ) && event.paths.iter().any(|p| p == &watched);
                if relevant {
                    let _ = event_tx.send(());
                }
            }
        })
        .map_err(|e| MonitorError::TriggerError(format!("Failed to create file watcher: {}", e)))?;

        watcher
            .watch(&directory, RecursiveMode::NonRecursive)
            .map_err(|e| MonitorError::TriggerError(format!("Failed to watch path: {}", e)))?;

        tracing::debug!(path = %path.display(), "watching options document");

        let debounce = debounce_duration;
        let task = tokio::spawn(async move {
            while event_rx.recv().await.is_some() {
                tokio::time::sleep(debounce).await;
                while event_rx.try_recv().is_ok() {}
                run_pass(&client).await;
            }
        });

        Ok(Self {
            _watcher: watcher,
            task,
            path,
            debounce_duration,
        })
    }

    /// Watch the settings' `document_path`, debounced by `watch_debounce_ms`.
    ///
    /// # Errors
    ///
    /// Returns a `SettingsError` when no `document_path` is set, otherwise
    /// the same errors as [`start`](Self::start).
    pub fn from_settings(client: OptionsClient, settings: &ClientSettings) -> Result<Self> {
        let path = settings.document_path.as_ref().ok_or_else(|| {
            MonitorError::SettingsError("No document_path to watch".to_string())
        })?;
        Self::start(client, path, settings.watch_debounce())
    }

    /// The watched document path, canonicalized.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the debounce duration for this trigger.
    pub fn debounce_duration(&self) -> Duration {
        self.debounce_duration
    }
}

impl Drop for FileTrigger {
    fn drop(&mut self) {
        self.task.abort();
    }
}
