//! Built-in metrics for distribution passes.
//!
//! Provides OpenTelemetry metrics tracking:
//! - Passes run and fetch failures
//! - Options applied and rejected per pass
//! - Pass duration
//! - Time since the last applied change
//! - Registered monitors
//!
//! # Examples
//!
//! ```rust,no_run
//! use options_monitor::prelude::*;
//! use options_monitor::sources::FileSource;
//! use opentelemetry::global;
//!
//! # fn example() -> Result<()> {
//! let meter = global::meter("my-app");
//!
//! let client = OptionsClient::builder()
//!     .with_source(FileSource::new("options.json"))
//!     .with_metrics(meter)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

mod distribution_metrics;

pub use distribution_metrics::DistributionMetrics;
