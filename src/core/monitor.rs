//! Per-subscriber bookkeeping: path, fingerprint and listeners.

use crate::core::{Fingerprint, OptionsSubscriber};
use crate::error::{MonitorError, Result};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Callback notified of a monitor's pass outcome.
///
/// `None` means the subscriber was updated (or a manual replay was
/// requested); `Some` carries the reason the update did not happen.
pub type Listener = Arc<dyn Fn(Option<&MonitorError>) + Send + Sync>;

/// A parsed configuration document.
pub(crate) type Document = Map<String, Value>;

/// Parse a raw document into its top-level mapping.
pub(crate) fn parse_document(raw: &str) -> Result<Document> {
    serde_json::from_str::<Document>(raw).map_err(|e| MonitorError::ParseFailed(e.to_string()))
}

/// Tracks one subscriber's slice of the document.
pub(crate) struct OptionsMonitor {
    subscriber: Arc<dyn OptionsSubscriber>,
    section_key: String,
    field_key: String,
    /// Held across compare, apply and store so one monitor never applies
    /// two versions concurrently.
    last_checksum: Mutex<Option<Fingerprint>>,
    listeners: Vec<Listener>,
}

impl OptionsMonitor {
    pub(crate) fn new(
        subscriber: Arc<dyn OptionsSubscriber>,
        section_key: String,
        field_key: String,
        sentinel: Listener,
    ) -> Self {
        Self {
            subscriber,
            section_key,
            field_key,
            last_checksum: Mutex::new(None),
            listeners: vec![sentinel],
        }
    }

    pub(crate) fn section_key(&self) -> &str {
        &self.section_key
    }

    pub(crate) fn field_key(&self) -> &str {
        &self.field_key
    }

    pub(crate) fn last_checksum(&self) -> Option<Fingerprint> {
        self.last_checksum.lock().clone()
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn add_listener(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    /// Invoke every listener, in registration order.
    pub(crate) fn notify(&self, outcome: Option<&MonitorError>) {
        for listener in &self.listeners {
            listener(outcome);
        }
    }

    /// Canonical bytes of this monitor's sub-document.
    ///
    /// `serde_json` keeps object keys sorted, so equal values always
    /// serialize to equal bytes.
    pub(crate) fn extract(&self, document: &Document) -> Result<Vec<u8>> {
        let section = document
            .get(&self.section_key)
            .ok_or_else(|| MonitorError::MissingSection {
                section: self.section_key.clone(),
            })?;

        let section = section
            .as_object()
            .ok_or_else(|| MonitorError::MalformedSection {
                section: self.section_key.clone(),
            })?;

        let value = section
            .get(&self.field_key)
            .ok_or_else(|| MonitorError::MissingField {
                section: self.section_key.clone(),
                field: self.field_key.clone(),
            })?;

        serde_json::to_vec(value).map_err(|e| MonitorError::SerializeFailed {
            field: self.field_key.clone(),
            reason: e.to_string(),
        })
    }

    /// Extract the sub-document and apply it if its content changed.
    ///
    /// Returns `Ok(true)` when the subscriber accepted new content and
    /// `Ok(false)` when the content matched the last applied fingerprint.
    /// A rejected apply leaves the fingerprint where it was.
    pub(crate) fn update(&self, document: &Document) -> Result<bool> {
        let bytes = self.extract(document)?;
        let fingerprint = Fingerprint::of(&bytes);

        let mut last_checksum = self.last_checksum.lock();
        if last_checksum.as_ref() == Some(&fingerprint) {
            tracing::debug!(
                section = %self.section_key,
                field = %self.field_key,
                "options unchanged"
            );
            return Ok(false);
        }

        self.subscriber.apply(&bytes)?;

        tracing::debug!(
            section = %self.section_key,
            field = %self.field_key,
            checksum = %fingerprint,
            bytes = bytes.len(),
            "applied options"
        );
        *last_checksum = Some(fingerprint);
        Ok(true)
    }
}
