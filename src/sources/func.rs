//! Closure-backed configuration source.

use super::ConfigSource;
use crate::error::Result;

/// Adapts a closure into a [`ConfigSource`].
///
/// # Examples
///
/// ```rust
/// use options_monitor::sources::{ConfigSource, FnSource};
///
/// let source = FnSource::new("static", || Ok(r#"{"Team":{}}"#.to_string()));
/// assert_eq!(source.name(), "static");
/// ```
pub struct FnSource<F> {
    name: String,
    fetch: F,
}

impl<F> FnSource<F>
where
    F: Fn() -> Result<String> + Send + Sync,
{
    /// Create a named source that calls `fetch` for every document.
    pub fn new(name: impl Into<String>, fetch: F) -> Self {
        Self {
            name: name.into(),
            fetch,
        }
    }
}

impl<F> ConfigSource for FnSource<F>
where
    F: Fn() -> Result<String> + Send + Sync,
{
    fn fetch(&self) -> Result<String> {
        (self.fetch)()
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}
