//! Concurrent registration and distribution.

use options_monitor::prelude::*;
use options_monitor::sources::{FnSource, MemorySource};
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

#[derive(Debug, Default, Deserialize)]
struct CounterOptions {
    value: u64,
}

/// Subscriber that counts how often it is applied and detects overlap.
#[derive(Default)]
struct CountingSubscriber {
    applies: AtomicUsize,
    active: AtomicUsize,
    overlapped: AtomicUsize,
}

impl OptionsSubscriber for CountingSubscriber {
    fn apply(&self, _bytes: &[u8]) -> std::result::Result<(), ValidationError> {
        if self.active.fetch_add(1, Ordering::SeqCst) > 0 {
            self.overlapped.fetch_add(1, Ordering::SeqCst);
        }
        thread::sleep(Duration::from_millis(1));
        self.applies.fetch_add(1, Ordering::SeqCst);
        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn test_concurrent_registration() {
    let document: String = {
        let sections: Vec<String> = (0..16)
            .map(|i| format!(r#""S{}":{{"Config":{{"value":{}}}}}"#, i, i))
            .collect();
        format!("{{{}}}", sections.join(","))
    };
    let client = OptionsClient::new(MemorySource::new(document));
    let barrier = Arc::new(Barrier::new(16));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let client = client.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let options = Arc::new(TypedOptions::<CounterOptions>::default());
                barrier.wait();
                client.register(&options, format!("S{}", i), "Config").unwrap();
                assert_eq!(options.get().value, i);
                options
            })
        })
        .collect();

    let subscribers: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(client.monitor_count(), 16);
    for subscriber in &subscribers {
        assert!(client.is_registered(SubscriberId::of(subscriber)));
    }
}

#[test]
fn test_concurrent_passes_apply_each_version_once() {
    let source = Arc::new(MemorySource::new(r#"{"Team":{"Config":{"value":0}}}"#));
    let client = OptionsClient::new(Arc::clone(&source));
    let subscriber = Arc::new(CountingSubscriber::default());
    client.register(&subscriber, "Team", "Config").unwrap();

    source.set_document(r#"{"Team":{"Config":{"value":1}}}"#);

    let barrier = Arc::new(Barrier::new(8));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let client = client.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                client.distribute(false);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Initial version plus the one change
    assert_eq!(subscriber.applies.load(Ordering::SeqCst), 2);
    assert_eq!(subscriber.overlapped.load(Ordering::SeqCst), 0);
}

#[test]
fn test_listener_added_during_passes() {
    let source = Arc::new(MemorySource::new(r#"{"Team":{"Config":{"value":0}}}"#));
    let client = OptionsClient::new(Arc::clone(&source));
    let options = Arc::new(TypedOptions::<CounterOptions>::default());
    let id = client.register(&options, "Team", "Config").unwrap();

    let passes = {
        let client = client.clone();
        let source = Arc::clone(&source);
        thread::spawn(move || {
            for value in 1..=50 {
                source.set_document(format!(r#"{{"Team":{{"Config":{{"value":{}}}}}}}"#, value));
                client.distribute(false);
            }
        })
    };

    for _ in 0..10 {
        client.add_listener(id, |_| {}).unwrap();
    }
    passes.join().unwrap();

    assert_eq!(client.listener_count(id), Some(11));
    assert_eq!(options.get().value, 50);
}

#[test]
fn test_serialized_passes_keep_latest_document() {
    let fetches = Arc::new(AtomicUsize::new(0));
    let source = {
        let fetches = Arc::clone(&fetches);
        FnSource::new("sequenced", move || {
            let n = fetches.fetch_add(1, Ordering::SeqCst);
            // Earlier fetches are slower, which would let a stale document
            // land last if passes could interleave.
            thread::sleep(Duration::from_millis(20u64.saturating_sub(n as u64 * 2)));
            Ok(format!(r#"{{"Team":{{"Config":{{"value":{}}}}}}}"#, n))
        })
    };

    let client = OptionsClient::builder()
        .with_source(source)
        .serialize_passes(true)
        .build()
        .unwrap();
    let options = Arc::new(TypedOptions::<CounterOptions>::default());
    client.register(&options, "Team", "Config").unwrap();

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let client = client.clone();
            thread::spawn(move || client.distribute(false))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let total = fetches.load(Ordering::SeqCst) as u64;
    assert_eq!(total, 7);
    assert_eq!(options.get().value, total - 1);
}
