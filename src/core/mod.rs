//! Core options-monitor types.

mod builder;
mod checksum;
mod client;
mod monitor;
mod settings;
mod subscriber;
mod typed;

#[cfg(feature = "validation")]
mod validation;

pub use builder::OptionsClientBuilder;
pub use checksum::Fingerprint;
pub use client::OptionsClient;
pub use monitor::Listener;
pub use settings::ClientSettings;
pub use subscriber::{OptionsSubscriber, SubscriberId};
pub use typed::TypedOptions;

#[cfg(feature = "validation")]
pub use validation::Validate;
