//! Interval-driven distribution passes.

use super::run_pass;
use crate::core::{ClientSettings, OptionsClient};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Runs a distribution pass on a fixed interval.
///
/// The first pass runs one full interval after `start`; the registration of
/// each subscriber already performed an initial pass. Passes never overlap
/// within one poller: a slow pass delays the next tick instead of stacking
/// up.
///
/// Dropping the poller stops it.
///
/// # Examples
///
/// ```rust,no_run
/// use options_monitor::prelude::*;
/// use options_monitor::sources::FileSource;
/// use options_monitor::triggers::Poller;
/// use std::time::Duration;
///
/// # async fn example() -> Result<()> {
/// let client = OptionsClient::new(FileSource::new("options.json"));
/// let poller = Poller::start(client.clone(), Duration::from_secs(30));
///
/// // ... register subscribers, run the application ...
///
/// poller.stop();
/// # Ok(())
/// # }
/// ```
pub struct Poller {
    handle: JoinHandle<()>,
    interval: Duration,
}

impl Poller {
    /// Start polling on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime or with a zero interval.
    pub fn start(client: OptionsClient, interval: Duration) -> Self {
        tracing::debug!(interval_ms = interval.as_millis() as u64, "starting options poller");

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                run_pass(&client).await;
            }
        });

        Self { handle, interval }
    }

    /// Start polling at the settings' `poll_interval_ms`.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime or if the interval is zero.
    pub fn from_settings(client: OptionsClient, settings: &ClientSettings) -> Self {
        Self::start(client, settings.poll_interval())
    }

    /// Interval between passes.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Stop polling. A pass already running finishes on its own thread.
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
