//! Example demonstrating subscribers, listeners and a polling trigger.
//!
//! This example shows how to:
//! - Register typed subscribers for slices of one document
//! - Receive notifications when a slice changes or fails
//! - Drive passes from a background poller
//!
//! Run with: cargo run --example subscribers --features triggers

use options_monitor::prelude::*;
use options_monitor::sources::MemorySource;
use options_monitor::triggers::Poller;
use serde::Deserialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Default, Deserialize)]
struct ModerationOptions {
    #[serde(rename = "MaxReports")]
    max_reports: u32,
}

#[derive(Debug, Default, Deserialize)]
struct FeatureFlags {
    new_ui: bool,
    beta_features: bool,
}

fn document(max_reports: u32, new_ui: bool) -> String {
    format!(
        r#"{{
            "Moderation": {{ "Limits": {{ "MaxReports": {} }} }},
            "Frontend": {{ "Flags": {{ "new_ui": {}, "beta_features": false }} }}
        }}"#,
        max_reports, new_ui
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== Options Monitor Example ===\n");

    let source = Arc::new(MemorySource::new(document(10, false)));
    let client = OptionsClient::new(Arc::clone(&source));

    let moderation = Arc::new(TypedOptions::<ModerationOptions>::default().with_validation(|o| {
        if o.max_reports > 100 {
            return Err(ValidationError::invalid_field("MaxReports", "must be <= 100"));
        }
        Ok(())
    }));
    let flags = Arc::new(TypedOptions::<FeatureFlags>::default());

    let moderation_id = client.register(&moderation, "Moderation", "Limits")?;
    let flags_id = client.register(&flags, "Frontend", "Flags")?;
    println!("Initial moderation options: {:?}", moderation.get());
    println!("Initial feature flags: {:?}\n", flags.get());

    // Track notification counts
    let notifications = Arc::new(AtomicUsize::new(0));
    for (id, name) in [(moderation_id, "moderation"), (flags_id, "flags")] {
        let notifications = Arc::clone(&notifications);
        client.add_listener(id, move |outcome| {
            notifications.fetch_add(1, Ordering::SeqCst);
            match outcome {
                None => println!("  [{}] options updated", name),
                Some(err) => println!("  [{}] update failed: {}", name, err),
            }
        })?;
    }

    let settings = ClientSettings {
        poll_interval_ms: 100,
        ..ClientSettings::default()
    };
    let poller = Poller::from_settings(client.clone(), &settings);

    println!("Changing only the feature flags...");
    source.set_document(document(10, true));
    tokio::time::sleep(Duration::from_millis(250)).await;
    let current = flags.get();
    println!(
        "Feature flags now: new_ui={}, beta_features={}\n",
        current.new_ui, current.beta_features
    );

    println!("Publishing an invalid moderation limit...");
    source.set_document(document(500, true));
    tokio::time::sleep(Duration::from_millis(150)).await;
    println!(
        "Moderation limit kept at {}\n",
        moderation.get().max_reports
    );

    println!("Simulating an unreachable upstream...");
    source.fail_with("connection refused");
    tokio::time::sleep(Duration::from_millis(150)).await;

    poller.stop();

    println!(
        "\nTotal notifications: {}",
        notifications.load(Ordering::SeqCst)
    );
    Ok(())
}
