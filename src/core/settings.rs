//! Client settings loaded from files and environment variables.

use crate::error::{MonitorError, Result};
use config::{Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Tunables for an [`OptionsClient`](crate::core::OptionsClient) and its
/// pass triggers.
///
/// Missing keys fall back to the defaults below.
///
/// | key | default |
/// |---|---|
/// | `serialize_passes` | `false` |
/// | `poll_interval_ms` | `30000` |
/// | `watch_debounce_ms` | `500` |
/// | `document_path` | none |
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Run distribution passes one at a time, fetch included.
    pub serialize_passes: bool,
    /// Interval between passes started by the poller.
    pub poll_interval_ms: u64,
    /// Minimum quiet time before the file trigger runs a pass.
    pub watch_debounce_ms: u64,
    /// Document file used when no explicit source is given to the builder.
    pub document_path: Option<PathBuf>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            serialize_passes: false,
            poll_interval_ms: 30_000,
            watch_debounce_ms: 500,
            document_path: None,
        }
    }
}

impl ClientSettings {
    /// Load settings from an optional file overlaid with environment variables.
    ///
    /// The file format is detected from its extension (`.yaml`, `.yml`,
    /// `.toml`, `.json`). Environment variables have the highest priority and
    /// are named `<PREFIX>_<KEY>`, e.g. `OPTIONS_POLL_INTERVAL_MS=5000`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a value has the wrong
    /// type.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use options_monitor::core::ClientSettings;
    /// use std::path::Path;
    ///
    /// let settings = ClientSettings::load(Some(Path::new("config/options.yaml")), "OPTIONS")?;
    /// println!("polling every {:?}", settings.poll_interval());
    /// # Ok::<(), options_monitor::error::MonitorError>(())
    /// ```
    pub fn load(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(MonitorError::SettingsError(format!(
                    "Settings file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder.build().map_err(|e| {
            MonitorError::SettingsError(format!("Failed to build settings: {}", e))
        })?;

        settings.try_deserialize::<Self>().map_err(|e| {
            MonitorError::SettingsError(format!("Failed to deserialize settings: {}", e))
        })
    }

    /// Interval between polled passes.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Debounce window of the file trigger.
    pub fn watch_debounce(&self) -> Duration {
        Duration::from_millis(self.watch_debounce_ms)
    }
}
