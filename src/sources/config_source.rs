//! Configuration source trait.

use crate::error::Result;
use std::sync::Arc;

/// Trait for configuration sources.
///
/// A source produces the current raw document on demand. The client treats
/// the text as opaque and parses it itself. Implement this trait to plug in
/// whatever actually retrieves the document (a native client library, a
/// remote API, a key-value store).
///
/// `fetch` is always called outside the client's registry lock, so a slow or
/// blocking fetch stalls only the pass that issued it.
pub trait ConfigSource: Send + Sync {
    /// Fetch the current raw document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be retrieved. The client
    /// broadcasts it to every registered monitor as a fetch failure.
    fn fetch(&self) -> Result<String>;

    /// Get a human-readable name for this source (for logging/debugging).
    fn name(&self) -> String;
}

impl<S: ConfigSource + ?Sized> ConfigSource for Arc<S> {
    fn fetch(&self) -> Result<String> {
        (**self).fetch()
    }

    fn name(&self) -> String {
        (**self).name()
    }
}
