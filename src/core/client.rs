//! The options client: monitor registry and distribution passes.

use crate::core::monitor::{Listener, OptionsMonitor, parse_document};
use crate::core::{Fingerprint, OptionsClientBuilder, OptionsSubscriber, SubscriberId};
use crate::error::{MonitorError, Result};
use crate::sources::ConfigSource;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(feature = "metrics")]
use crate::metrics::DistributionMetrics;

/// Shared state behind every clone of an [`OptionsClient`].
struct ClientInner {
    source: Box<dyn ConfigSource>,
    /// Guards the registry and every monitor's listener list. Passes hold
    /// the read side while invoking listeners.
    monitors: RwLock<HashMap<SubscriberId, OptionsMonitor>>,
    /// Present when passes are serialized, fetch included.
    pass_gate: Option<Mutex<()>>,
    #[cfg(feature = "metrics")]
    metrics: Option<DistributionMetrics>,
}

/// Distributes slices of one shared configuration document to subscribers.
///
/// Each registered subscriber gets an options monitor bound to a
/// `(section_key, field_key)` path. A distribution pass fetches the document
/// once, then for every monitor extracts the sub-document, compares its
/// fingerprint with the last applied one, applies it when it changed, and
/// notifies the monitor's listeners.
///
/// Cloning is cheap; clones share the same registry.
///
/// Listeners run while the registry read lock is held, and that lock is not
/// reentrant. A listener must not call back into the same client at all:
/// [`register`](Self::register), [`add_listener`](Self::add_listener) and
/// [`distribute`](Self::distribute) can deadlock immediately, and the
/// introspection methods ([`monitor_count`](Self::monitor_count),
/// [`is_registered`](Self::is_registered),
/// [`listener_count`](Self::listener_count),
/// [`last_checksum`](Self::last_checksum)) deadlock once a writer is queued.
/// Hand the outcome to another thread or task instead.
///
/// # Examples
///
/// ```rust
/// use options_monitor::prelude::*;
/// use options_monitor::sources::MemorySource;
/// use serde::Deserialize;
/// use std::sync::Arc;
///
/// #[derive(Debug, Default, Deserialize)]
/// struct TeamOptions {
///     #[serde(rename = "X")]
///     x: String,
/// }
///
/// # fn example() -> Result<()> {
/// let source = Arc::new(MemorySource::new(r#"{"Team":{"Config":{"X":"a"}}}"#));
/// let client = OptionsClient::new(Arc::clone(&source));
///
/// let options = Arc::new(TypedOptions::<TeamOptions>::default());
/// let id = client.register(&options, "Team", "Config")?;
/// assert_eq!(options.get().x, "a");
///
/// client.add_listener(id, |outcome| {
///     if let Some(err) = outcome {
///         eprintln!("options update failed: {err}");
///     }
/// })?;
///
/// source.set_document(r#"{"Team":{"Config":{"X":"b"}}}"#);
/// client.distribute(false);
/// assert_eq!(options.get().x, "b");
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Clone)]
pub struct OptionsClient {
    inner: Arc<ClientInner>,
}

impl OptionsClient {
    /// Create a client fetching from `source` with default settings.
    pub fn new<S: ConfigSource + 'static>(source: S) -> Self {
        #[cfg(feature = "metrics")]
        let client = Self::from_parts(Box::new(source), false, None);
        #[cfg(not(feature = "metrics"))]
        let client = Self::from_parts(Box::new(source), false);

        client
    }

    /// Create a new builder for constructing a client.
    pub fn builder() -> OptionsClientBuilder {
        OptionsClientBuilder::new()
    }

    pub(crate) fn from_parts(
        source: Box<dyn ConfigSource>,
        serialize_passes: bool,
        #[cfg(feature = "metrics")] metrics: Option<DistributionMetrics>,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                source,
                monitors: RwLock::new(HashMap::new()),
                pass_gate: serialize_passes.then(|| Mutex::new(())),
                #[cfg(feature = "metrics")]
                metrics,
            }),
        }
    }

    /// Register a subscriber for the sub-document at `section_key.field_key`.
    ///
    /// Registration immediately runs an initial distribution pass over every
    /// registered monitor and reports this subscriber's outcome. If that first
    /// apply fails the error is returned, but the monitor stays registered:
    /// later passes keep retrying, and listeners can still be attached with
    /// [`SubscriberId::of`].
    ///
    /// # Errors
    ///
    /// - `DuplicateRegistration` if the subscriber is already registered
    /// - `FetchFailed` if the source could not produce a document
    /// - a document-shape error if the path cannot be resolved
    /// - `ApplyRejected` if the subscriber refused its initial options
    pub fn register<S>(
        &self,
        subscriber: &Arc<S>,
        section_key: impl Into<String>,
        field_key: impl Into<String>,
    ) -> Result<SubscriberId>
    where
        S: OptionsSubscriber + 'static,
    {
        let id = SubscriberId::of(subscriber);
        let section_key = section_key.into();
        let field_key = field_key.into();

        let capture = Arc::new(InitialOutcome::default());
        {
            let mut monitors = self.inner.monitors.write();
            if monitors.contains_key(&id) {
                return Err(MonitorError::DuplicateRegistration);
            }

            tracing::debug!(
                subscriber = ?id,
                section = %section_key,
                field = %field_key,
                "registering options monitor"
            );

            let sentinel_capture = Arc::clone(&capture);
            let sentinel: Listener =
                Arc::new(move |outcome: Option<&MonitorError>| sentinel_capture.record(outcome));
            let subscriber: Arc<dyn OptionsSubscriber> = subscriber.clone();
            monitors.insert(
                id,
                OptionsMonitor::new(subscriber, section_key, field_key, sentinel),
            );

            #[cfg(feature = "metrics")]
            if let Some(metrics) = &self.inner.metrics {
                metrics.record_monitor_count(monitors.len());
            }
        }

        self.distribute(true);

        match capture.take() {
            Some(err) => Err(err),
            None => Ok(id),
        }
    }

    /// Append a listener to a registered subscriber's monitor.
    ///
    /// Listeners are invoked in the order they were added, on every pass
    /// outcome for that monitor: `None` after an applied change, `Some(err)`
    /// when the update failed or the document could not be fetched.
    ///
    /// # Errors
    ///
    /// Returns `NotRegistered` if no monitor exists for `subscriber`.
    pub fn add_listener<F>(&self, subscriber: SubscriberId, listener: F) -> Result<()>
    where
        F: Fn(Option<&MonitorError>) + Send + Sync + 'static,
    {
        let mut monitors = self.inner.monitors.write();
        let monitor = monitors
            .get_mut(&subscriber)
            .ok_or(MonitorError::NotRegistered)?;
        monitor.add_listener(Arc::new(listener));

        tracing::debug!(
            subscriber = ?subscriber,
            listeners = monitor.listener_count(),
            "added options listener"
        );
        Ok(())
    }

    /// Invoke every listener of every monitor with `None`.
    ///
    /// Replays the "no error" signal without fetching or comparing
    /// fingerprints.
    pub fn trigger_all_listeners(&self) {
        let monitors = self.inner.monitors.read();
        for monitor in monitors.values() {
            monitor.notify(None);
        }
    }

    /// Run one distribution pass.
    ///
    /// A fetch failure is broadcast to every monitor's listeners. Otherwise
    /// each monitor is updated independently: its failure is reported to its
    /// own listeners only, an applied change notifies them with `None`, and
    /// unchanged content notifies nobody.
    ///
    /// Outcomes are reported only through listeners.
    pub fn distribute(&self, is_initial: bool) {
        let _pass = self.inner.pass_gate.as_ref().map(|gate| gate.lock());

        #[cfg(feature = "metrics")]
        let timer = self.inner.metrics.as_ref().map(|m| m.start_pass());

        let raw = match self.inner.source.fetch() {
            Ok(raw) => raw,
            Err(err) => {
                let err = match err {
                    MonitorError::FetchFailed { .. } => err,
                    other => MonitorError::fetch_failed(self.inner.source.name(), other),
                };
                tracing::error!(error = %err, "updating config failed");

                let monitors = self.inner.monitors.read();
                for monitor in monitors.values() {
                    monitor.notify(Some(&err));
                }

                #[cfg(feature = "metrics")]
                if let (Some(metrics), Some(timer)) = (&self.inner.metrics, timer) {
                    metrics.record_fetch_failure(timer);
                }
                return;
            }
        };

        let document = parse_document(&raw);
        if let Ok(document) = &document {
            tracing::debug!(
                keys = ?document.keys().collect::<Vec<_>>(),
                "fetched configuration document"
            );
        }

        let mut applied = 0u64;
        let mut failed = 0u64;
        let monitors = self.inner.monitors.read();
        for (id, monitor) in monitors.iter() {
            let outcome = match &document {
                Ok(document) => monitor.update(document),
                Err(err) => Err(err.clone()),
            };

            match outcome {
                Err(err) => {
                    failed += 1;
                    tracing::error!(
                        subscriber = ?id,
                        section = %monitor.section_key(),
                        field = %monitor.field_key(),
                        error = %err,
                        "options update failed"
                    );
                    monitor.notify(Some(&err));
                }
                Ok(true) => {
                    applied += 1;
                    if !is_initial {
                        tracing::info!(
                            section = %monitor.section_key(),
                            field = %monitor.field_key(),
                            "received options update, notifying listeners"
                        );
                    }
                    monitor.notify(None);
                }
                Ok(false) => {}
            }
        }

        #[cfg(feature = "metrics")]
        if let (Some(metrics), Some(timer)) = (&self.inner.metrics, timer) {
            metrics.record_pass(timer, applied, failed);
        }
        #[cfg(not(feature = "metrics"))]
        let _ = (applied, failed);
    }

    /// Number of registered monitors.
    pub fn monitor_count(&self) -> usize {
        self.inner.monitors.read().len()
    }

    /// Whether a monitor exists for `subscriber`.
    pub fn is_registered(&self, subscriber: SubscriberId) -> bool {
        self.inner.monitors.read().contains_key(&subscriber)
    }

    /// Number of listeners on a subscriber's monitor, the internal one included.
    pub fn listener_count(&self, subscriber: SubscriberId) -> Option<usize> {
        self.inner
            .monitors
            .read()
            .get(&subscriber)
            .map(OptionsMonitor::listener_count)
    }

    /// Fingerprint of the last sub-document the subscriber accepted.
    pub fn last_checksum(&self, subscriber: SubscriberId) -> Option<Fingerprint> {
        self.inner
            .monitors
            .read()
            .get(&subscriber)
            .and_then(OptionsMonitor::last_checksum)
    }

    /// Name of the underlying config source.
    pub fn source_name(&self) -> String {
        self.inner.source.name()
    }
}

/// Captures the outcome of a registration's initial pass.
///
/// Stops recording once `register` has read it, so later passes do not keep
/// cloning errors into a slot nobody reads.
#[derive(Default)]
struct InitialOutcome {
    done: AtomicBool,
    outcome: Mutex<Option<MonitorError>>,
}

impl InitialOutcome {
    fn record(&self, outcome: Option<&MonitorError>) {
        if !self.done.load(Ordering::Acquire) {
            *self.outcome.lock() = outcome.cloned();
        }
    }

    fn take(&self) -> Option<MonitorError> {
        self.done.store(true, Ordering::Release);
        self.outcome.lock().take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::sources::MemorySource;
    use std::sync::atomic::AtomicUsize;

    fn accept_all() -> Arc<impl OptionsSubscriber> {
        Arc::new(|_: &[u8]| -> std::result::Result<(), ValidationError> { Ok(()) })
    }

    #[test]
    fn test_register_and_duplicate() {
        let client = OptionsClient::new(MemorySource::new(r#"{"A":{"a":1}}"#));
        let subscriber = accept_all();

        let id = client.register(&subscriber, "A", "a").unwrap();
        assert!(client.is_registered(id));
        assert_eq!(client.monitor_count(), 1);
        assert_eq!(client.listener_count(id), Some(1));
        assert_eq!(client.last_checksum(id), Some(Fingerprint::of(b"1")));

        assert_eq!(
            client.register(&subscriber, "A", "a"),
            Err(MonitorError::DuplicateRegistration)
        );
        assert_eq!(client.monitor_count(), 1);
    }

    #[test]
    fn test_add_listener_unknown_subscriber() {
        let client = OptionsClient::new(MemorySource::new("{}"));
        let stranger = accept_all();
        assert_eq!(
            client.add_listener(SubscriberId::of(&stranger), |_| {}),
            Err(MonitorError::NotRegistered)
        );
    }

    #[test]
    fn test_failed_registration_stays_registered() {
        let client = OptionsClient::new(MemorySource::new(r#"{"A":{}}"#));
        let subscriber = accept_all();

        let result = client.register(&subscriber, "A", "a");
        assert!(matches!(result, Err(MonitorError::MissingField { .. })));

        let id = SubscriberId::of(&subscriber);
        assert!(client.is_registered(id));
        assert_eq!(client.last_checksum(id), None);
        assert!(client.add_listener(id, |_| {}).is_ok());
    }

    #[test]
    fn test_trigger_all_listeners() {
        let client = OptionsClient::new(MemorySource::new(r#"{"A":{"a":1},"B":{"b":2}}"#));
        let first = accept_all();
        let second = accept_all();
        let first_id = client.register(&first, "A", "a").unwrap();
        let second_id = client.register(&second, "B", "b").unwrap();
        let checksum = client.last_checksum(first_id);

        let calls = Arc::new(AtomicUsize::new(0));
        for id in [first_id, second_id] {
            let calls = Arc::clone(&calls);
            client
                .add_listener(id, move |outcome| {
                    assert!(outcome.is_none());
                    calls.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
        }

        client.trigger_all_listeners();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(client.last_checksum(first_id), checksum);
    }

    #[test]
    fn test_non_fetch_source_errors_become_fetch_failures() {
        let source = crate::sources::FnSource::new("broken", || {
            Err(MonitorError::ParseFailed("native client error".to_string()))
        });
        let client = OptionsClient::new(source);
        let subscriber = accept_all();

        match client.register(&subscriber, "A", "a") {
            Err(MonitorError::FetchFailed { source_name, .. }) => assert_eq!(source_name, "broken"),
            other => panic!("expected fetch failure, got {:?}", other),
        }
    }

    #[test]
    fn test_clones_share_registry() {
        let client = OptionsClient::new(MemorySource::new(r#"{"A":{"a":1}}"#));
        let clone = client.clone();
        let subscriber = accept_all();

        let id = client.register(&subscriber, "A", "a").unwrap();
        assert!(clone.is_registered(id));
        assert_eq!(clone.source_name(), "memory");
    }

    #[test]
    fn test_listener_hands_off_outcome() {
        let source = Arc::new(MemorySource::new(r#"{"A":{"a":1}}"#));
        let client = OptionsClient::new(Arc::clone(&source));
        let subscriber = accept_all();
        let id = client.register(&subscriber, "A", "a").unwrap();

        let (tx, rx) = std::sync::mpsc::channel();
        client
            .add_listener(id, move |outcome| {
                let _ = tx.send(outcome.is_none());
            })
            .unwrap();

        source.set_document(r#"{"A":{"a":2}}"#);
        let worker = {
            let client = client.clone();
            std::thread::spawn(move || client.distribute(false))
        };

        // Introspection happens after the pass released the registry
        assert!(rx.recv().unwrap());
        worker.join().unwrap();
        assert_eq!(client.last_checksum(id), Some(Fingerprint::of(b"2")));
        assert_eq!(client.listener_count(id), Some(2));
    }
}
