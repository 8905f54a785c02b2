//! Options validation support.

use crate::error::ValidationError;

/// Trait for options validation.
///
/// Implement this trait on your options types and build the holder with
/// [`TypedOptions::validated`](crate::core::TypedOptions::validated) so every
/// update is checked before it is stored.
///
/// # Examples
///
/// ```rust
/// use options_monitor::core::{OptionsSubscriber, TypedOptions, Validate};
/// use options_monitor::error::ValidationError;
/// use serde::Deserialize;
///
/// #[derive(Debug, Default, Deserialize)]
/// struct ModerationOptions {
///     policy_id: String,
///     max_retries: u32,
/// }
///
/// impl Validate for ModerationOptions {
///     fn validate(&self) -> Result<(), ValidationError> {
///         if self.policy_id.is_empty() {
///             return Err(ValidationError::invalid_field("policy_id", "must not be empty"));
///         }
///
///         if self.max_retries > 10 {
///             return Err(ValidationError::invalid_field("max_retries", "must be <= 10"));
///         }
///
///         Ok(())
///     }
/// }
///
/// let options = TypedOptions::validated(ModerationOptions::default());
/// assert!(options.apply(br#"{"policy_id":"","max_retries":1}"#).is_err());
/// assert!(options.apply(br#"{"policy_id":"p-1","max_retries":1}"#).is_ok());
/// ```
pub trait Validate {
    /// Validate the options.
    ///
    /// # Errors
    ///
    /// Should return a `ValidationError` describing what validation failed.
    fn validate(&self) -> Result<(), ValidationError>;
}
