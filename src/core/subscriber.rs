//! Subscriber capability and identity.

use crate::error::ValidationError;
use std::fmt;
use std::sync::Arc;

/// A typed configuration object that receives its slice of the document.
///
/// `apply` is called with the canonical JSON bytes of exactly the
/// sub-document the subscriber was registered for. Implementations usually
/// deserialize the bytes, validate them, and store the result. Returning an
/// error leaves the subscriber's state untouched and makes the engine retry
/// the same content on the next pass.
///
/// Closures of the shape `Fn(&[u8]) -> Result<(), ValidationError>` implement
/// this trait directly.
///
/// # Examples
///
/// ```rust
/// use options_monitor::core::OptionsSubscriber;
/// use options_monitor::error::ValidationError;
/// use std::sync::Mutex;
///
/// struct RawOptions(Mutex<Vec<u8>>);
///
/// impl OptionsSubscriber for RawOptions {
///     fn apply(&self, bytes: &[u8]) -> Result<(), ValidationError> {
///         if bytes.is_empty() {
///             return Err(ValidationError::custom("empty options"));
///         }
///         *self.0.lock().unwrap() = bytes.to_vec();
///         Ok(())
///     }
/// }
/// ```
pub trait OptionsSubscriber: Send + Sync {
    /// Apply a new sub-document.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` when the bytes cannot be parsed or fail
    /// the subscriber's own rules.
    fn apply(&self, bytes: &[u8]) -> Result<(), ValidationError>;
}

impl<F> OptionsSubscriber for F
where
    F: Fn(&[u8]) -> Result<(), ValidationError> + Send + Sync,
{
    fn apply(&self, bytes: &[u8]) -> Result<(), ValidationError> {
        self(bytes)
    }
}

/// Opaque identity of a registered subscriber.
///
/// Derived from the subscriber's `Arc` allocation. The client keeps its own
/// clone of that `Arc` for as long as it lives, so the identity cannot be
/// reused by another value while the subscriber is registered.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(usize);

impl SubscriberId {
    /// Identity of the subscriber behind `subscriber`.
    ///
    /// Clones of the same `Arc` share one identity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use options_monitor::core::{SubscriberId, TypedOptions};
    /// use std::sync::Arc;
    ///
    /// let a = Arc::new(TypedOptions::<u32>::default());
    /// let b = Arc::new(TypedOptions::<u32>::default());
    /// assert_eq!(SubscriberId::of(&a), SubscriberId::of(&a.clone()));
    /// assert_ne!(SubscriberId::of(&a), SubscriberId::of(&b));
    /// ```
    pub fn of<S: ?Sized>(subscriber: &Arc<S>) -> Self {
        Self(Arc::as_ptr(subscriber).cast::<()>() as usize)
    }
}

impl fmt::Debug for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriberId({:#x})", self.0)
    }
}
