//! Builder for constructing OptionsClient instances.

use crate::core::{ClientSettings, OptionsClient};
use crate::error::{MonitorError, Result};
use crate::sources::{ConfigSource, FileSource};

#[cfg(feature = "metrics")]
use crate::metrics::DistributionMetrics;

/// Builder for constructing an [`OptionsClient`].
///
/// # Examples
///
/// ```rust
/// use options_monitor::prelude::*;
/// use options_monitor::sources::MemorySource;
///
/// # fn example() -> Result<()> {
/// let client = OptionsClient::builder()
///     .with_source(MemorySource::new("{}"))
///     .serialize_passes(true)
///     .build()?;
/// assert_eq!(client.monitor_count(), 0);
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub struct OptionsClientBuilder {
    source: Option<Box<dyn ConfigSource>>,
    settings: ClientSettings,
    #[cfg(feature = "metrics")]
    metrics: Option<DistributionMetrics>,
}

impl OptionsClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            source: None,
            settings: ClientSettings::default(),
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    /// Use `source` to fetch documents.
    ///
    /// Takes precedence over `document_path` in the settings.
    pub fn with_source<S: ConfigSource + 'static>(mut self, source: S) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Apply loaded settings.
    pub fn with_settings(mut self, settings: ClientSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Run distribution passes one at a time, fetch included.
    ///
    /// Prevents a slow, stale fetch from overwriting content applied by a
    /// later pass.
    pub fn serialize_passes(mut self, serialize: bool) -> Self {
        self.settings.serialize_passes = serialize;
        self
    }

    /// Record distribution metrics with the provided meter.
    #[cfg(feature = "metrics")]
    pub fn with_metrics(mut self, meter: opentelemetry::metrics::Meter) -> Self {
        self.metrics = Some(DistributionMetrics::new(meter));
        self
    }

    /// Build the client.
    ///
    /// No pass runs until the first subscriber registers.
    ///
    /// # Errors
    ///
    /// Returns a `SettingsError` if neither a source nor a `document_path`
    /// was given.
    pub fn build(self) -> Result<OptionsClient> {
        let source = match (self.source, &self.settings.document_path) {
            (Some(source), _) => source,
            (None, Some(path)) => Box::new(FileSource::new(path)) as Box<dyn ConfigSource>,
            (None, None) => {
                return Err(MonitorError::SettingsError(
                    "No configuration source specified".to_string(),
                ));
            }
        };

        #[cfg(feature = "metrics")]
        let client =
            OptionsClient::from_parts(source, self.settings.serialize_passes, self.metrics);
        #[cfg(not(feature = "metrics"))]
        let client = OptionsClient::from_parts(source, self.settings.serialize_passes);

        Ok(client)
    }
}

impl Default for OptionsClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
