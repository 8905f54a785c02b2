//! Typed options holder providing lock-free reads.

use crate::core::OptionsSubscriber;
use crate::error::ValidationError;
use arc_swap::ArcSwap;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "validation")]
use crate::core::Validate;

/// Type alias for validator functions.
type Validator<T> = Arc<dyn Fn(&T) -> Result<(), ValidationError> + Send + Sync>;

/// A typed options value kept current by an options client.
///
/// Received bytes are deserialized with `serde_json` and validated. The new
/// value is swapped in atomically only when both steps succeed, so readers
/// never observe a partially applied or rejected update.
///
/// # Examples
///
/// ```rust
/// use options_monitor::prelude::*;
/// use serde::Deserialize;
///
/// #[derive(Debug, Default, Deserialize)]
/// struct TeamOptions {
///     #[serde(rename = "X")]
///     x: String,
///     #[serde(rename = "N")]
///     n: u32,
/// }
///
/// let options = TypedOptions::<TeamOptions>::default().with_validation(|o| {
///     if o.n > 100 {
///         return Err(ValidationError::invalid_field("N", "must be <= 100"));
///     }
///     Ok(())
/// });
///
/// options.apply(br#"{"X":"a","N":1}"#).unwrap();
/// assert_eq!(options.get().x, "a");
///
/// assert!(options.apply(br#"{"X":"c","N":999}"#).is_err());
/// assert_eq!(options.get().n, 1);
/// ```
pub struct TypedOptions<T> {
    /// The current value, wrapped in ArcSwap for atomic updates
    current: ArcSwap<T>,
    /// Validators run on every received value, in the order added
    validators: Vec<Validator<T>>,
}

impl<T> TypedOptions<T> {
    /// Create a holder with an initial value and no validation.
    pub fn new(initial: T) -> Self {
        Self {
            current: ArcSwap::new(Arc::new(initial)),
            validators: Vec::new(),
        }
    }

    /// Add a validation function that must pass before a value is stored.
    ///
    /// Every validator runs on each update. When more than one rejects it,
    /// their errors are reported together as `ValidationError::Multiple`.
    pub fn with_validation<F>(mut self, validator: F) -> Self
    where
        F: Fn(&T) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Get a reference-counted handle to the current value.
    ///
    /// This is lock-free; readers never block the client applying an update.
    pub fn get(&self) -> Arc<T> {
        self.current.load_full()
    }
}

#[cfg(feature = "validation")]
impl<T: Validate + 'static> TypedOptions<T> {
    /// Create a holder whose updates must pass `T::validate`.
    pub fn validated(initial: T) -> Self {
        Self::new(initial).with_validation(|value: &T| value.validate())
    }
}

impl<T: Default> Default for TypedOptions<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for TypedOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedOptions")
            .field("current", &self.get())
            .field("validators", &self.validators.len())
            .finish()
    }
}

impl<T> OptionsSubscriber for TypedOptions<T>
where
    T: DeserializeOwned + Send + Sync,
{
    fn apply(&self, bytes: &[u8]) -> Result<(), ValidationError> {
        let parsed: T = serde_json::from_slice(bytes).map_err(|e| {
            ValidationError::custom(format!("Failed to deserialize options: {}", e))
        })?;

        let errors = self
            .validators
            .iter()
            .filter_map(|validator| validator(&parsed).err())
            .collect();
        ValidationError::combine(errors)?;

        self.current.store(Arc::new(parsed));
        Ok(())
    }
}
