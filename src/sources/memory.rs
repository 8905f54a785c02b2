//! In-memory configuration source.

use super::ConfigSource;
use crate::error::{MonitorError, Result};
use arc_swap::ArcSwap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// What the next fetch returns.
enum Snapshot {
    Document(String),
    Failure(String),
}

/// Configuration source holding the document in memory.
///
/// Applications that receive documents by push can hand each new document to
/// `set_document` and then run a pass. Also handy in tests, where
/// `fail_with` simulates an unreachable upstream.
///
/// # Examples
///
/// ```rust
/// use options_monitor::sources::{ConfigSource, MemorySource};
///
/// let source = MemorySource::new(r#"{"Team":{"Config":{"N":1}}}"#);
/// assert!(source.fetch().is_ok());
///
/// source.fail_with("upstream unavailable");
/// assert!(source.fetch().is_err());
/// ```
pub struct MemorySource {
    snapshot: ArcSwap<Snapshot>,
    fetches: AtomicUsize,
}

impl MemorySource {
    /// Create a source serving `document`.
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            snapshot: ArcSwap::new(Arc::new(Snapshot::Document(document.into()))),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Replace the document served by later fetches.
    pub fn set_document(&self, document: impl Into<String>) {
        self.snapshot
            .store(Arc::new(Snapshot::Document(document.into())));
    }

    /// Make later fetches fail with `reason` until a document is set again.
    pub fn fail_with(&self, reason: impl Into<String>) {
        self.snapshot.store(Arc::new(Snapshot::Failure(reason.into())));
    }

    /// Number of fetches served so far, failures included.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl ConfigSource for MemorySource {
    fn fetch(&self) -> Result<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match &**self.snapshot.load() {
            Snapshot::Document(document) => Ok(document.clone()),
            Snapshot::Failure(reason) => Err(MonitorError::fetch_failed(self.name(), reason)),
        }
    }

    fn name(&self) -> String {
        "memory".to_string()
    }
}
