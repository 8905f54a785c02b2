//! Drivers that run distribution passes.
//!
//! The client itself has no scheduler. These helpers start non-initial
//! passes from a tokio runtime, either on a fixed interval or whenever a
//! document file changes.

mod poller;

#[cfg(feature = "file-watch")]
mod watcher;

pub use poller::Poller;

#[cfg(feature = "file-watch")]
pub use watcher::FileTrigger;

use crate::core::OptionsClient;

/// Run a non-initial pass on a blocking-task thread.
///
/// Fetches may block, so passes never run on the async worker itself.
async fn run_pass(client: &OptionsClient) {
    let client = client.clone();
    if let Err(e) = tokio::task::spawn_blocking(move || client.distribute(false)).await {
        tracing::error!(error = %e, "distribution pass panicked");
    }
}
