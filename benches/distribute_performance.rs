//! Performance benchmarks for options-monitor.
//!
//! Measures:
//! - Pass cost when nothing changed, by monitor count
//! - Pass cost when every monitor receives new content
//! - Typed read latency while passes run on another thread

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use options_monitor::prelude::*;
use options_monitor::sources::MemorySource;
use serde::Deserialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

#[derive(Debug, Default, Deserialize)]
struct BenchOptions {
    value: i64,
    name: String,
    flag: bool,
    items: Vec<String>,
}

fn document(sections: usize, value: i64) -> String {
    let body: Vec<String> = (0..sections)
        .map(|i| {
            format!(
                r#""S{}":{{"Config":{{"value":{},"name":"bench","flag":true,"items":["a","b","c"]}}}}"#,
                i, value
            )
        })
        .collect();
    format!("{{{}}}", body.join(","))
}

fn registered_client(
    sections: usize,
) -> (
    Arc<MemorySource>,
    OptionsClient,
    Vec<Arc<TypedOptions<BenchOptions>>>,
) {
    let source = Arc::new(MemorySource::new(document(sections, 0)));
    let client = OptionsClient::new(Arc::clone(&source));
    let subscribers = (0..sections)
        .map(|i| {
            let options = Arc::new(TypedOptions::<BenchOptions>::default());
            client
                .register(&options, format!("S{}", i), "Config")
                .unwrap();
            options
        })
        .collect();
    (source, client, subscribers)
}

/// Benchmark a pass over an unchanged document
fn benchmark_unchanged_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("unchanged_pass");

    for monitors in [1, 8, 64] {
        group.throughput(Throughput::Elements(monitors as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_monitors", monitors)),
            &monitors,
            |b, &monitors| {
                let (_source, client, _subscribers) = registered_client(monitors);
                b.iter(|| client.distribute(false));
            },
        );
    }

    group.finish();
}

/// Benchmark a pass where every monitor applies new content
fn benchmark_changed_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("changed_pass");

    for monitors in [1, 8, 64] {
        group.throughput(Throughput::Elements(monitors as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_monitors", monitors)),
            &monitors,
            |b, &monitors| {
                let (source, client, _subscribers) = registered_client(monitors);
                let versions = [document(monitors, 1), document(monitors, 2)];
                let mut next = 0;
                b.iter(|| {
                    source.set_document(versions[next].clone());
                    next ^= 1;
                    client.distribute(false);
                });
            },
        );
    }

    group.finish();
}

/// Benchmark typed reads while another thread keeps applying updates
fn benchmark_read_during_passes(c: &mut Criterion) {
    let (source, client, subscribers) = registered_client(1);
    let options = Arc::clone(&subscribers[0]);
    let running = Arc::new(AtomicBool::new(true));

    let writer = {
        let running = Arc::clone(&running);
        thread::spawn(move || {
            let mut value = 0;
            while running.load(Ordering::Relaxed) {
                value += 1;
                source.set_document(document(1, value));
                client.distribute(false);
            }
        })
    };

    let mut group = c.benchmark_group("read_during_passes");
    group.bench_function("typed_get", |b| {
        b.iter(|| {
            let current = options.get();
            black_box(&current.value);
            black_box(&current.name);
            black_box(current.flag);
            black_box(current.items.len());
        });
    });
    group.finish();

    running.store(false, Ordering::Relaxed);
    writer.join().unwrap();
}

criterion_group!(
    benches,
    benchmark_unchanged_pass,
    benchmark_changed_pass,
    benchmark_read_during_passes
);
criterion_main!(benches);
