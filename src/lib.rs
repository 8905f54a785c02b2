//! # options-monitor
//!
//! Distributes slices of one shared JSON configuration document to typed
//! subscribers, applying each slice only when its content changes.
//!
//! ## Overview
//!
//! An [`OptionsClient`](core::OptionsClient) pulls a document from a
//! [`ConfigSource`](sources::ConfigSource). Each subscriber registers for a
//! `(section_key, field_key)` path and receives the canonical JSON bytes of
//! exactly that sub-document:
//! - Change detection by SHA-256 fingerprint of the canonical bytes
//! - Rejected updates are retried on the next pass
//! - Failures stay isolated to the monitor that produced them
//! - Lock-free reads of typed options using `arc-swap`
//!
//! ## Quick Start
//!
//! ```rust
//! use options_monitor::prelude::*;
//! use options_monitor::sources::MemorySource;
//! use serde::Deserialize;
//! use std::sync::Arc;
//!
//! #[derive(Debug, Default, Deserialize)]
//! struct ModerationOptions {
//!     #[serde(rename = "MaxReports")]
//!     max_reports: u32,
//! }
//!
//! # fn example() -> Result<()> {
//! let source = Arc::new(MemorySource::new(
//!     r#"{"Moderation":{"Limits":{"MaxReports":10}}}"#,
//! ));
//! let client = OptionsClient::new(Arc::clone(&source));
//!
//! let options = Arc::new(TypedOptions::<ModerationOptions>::default());
//! client.register(&options, "Moderation", "Limits")?;
//! assert_eq!(options.get().max_reports, 10);
//!
//! source.set_document(r#"{"Moderation":{"Limits":{"MaxReports":20}}}"#);
//! client.distribute(false);
//! assert_eq!(options.get().max_reports, 20);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Feature Flags
//!
//! - `validation` (default): the [`Validate`](core::Validate) trait
//! - `triggers`: interval polling on a tokio runtime
//! - `file-watch` (default): pass on document file changes
//! - `metrics`: OpenTelemetry distribution metrics

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod sources;

#[cfg(feature = "triggers")]
pub mod triggers;

#[cfg(feature = "metrics")]
pub mod metrics;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{
        ClientSettings, Fingerprint, OptionsClient, OptionsClientBuilder, OptionsSubscriber,
        SubscriberId, TypedOptions,
    };
    pub use crate::error::{MonitorError, Result, ValidationError};

    #[cfg(feature = "validation")]
    pub use crate::core::Validate;
}
