//! Builder for cell configuration.

use pipedfuture_concurrency::{PipedFuture, Promise};
use pipedfuture_core::FutureConfig;
use std::time::Duration;

/// Builder for [`Promise`] and [`PipedFuture`] cells.
///
/// # Example
///
/// ```
/// use pipedfuture::FutureBuilder;
/// use std::time::Duration;
///
/// let cell = FutureBuilder::new()
///     .description("thumbnail")
///     .default_timeout(Duration::from_millis(5))
///     .piped::<Vec<u8>>();
///
/// assert_eq!(cell.description(), Some("thumbnail"));
/// assert!(cell.wait().unwrap_err().is_timeout());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FutureBuilder {
    config: FutureConfig,
}

impl FutureBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing config.
    pub fn from_config(config: FutureConfig) -> Self {
        Self { config }
    }

    /// Set the description shown in `Debug` output and log fields.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.config = self.config.with_description(description);
        self
    }

    /// Set the timeout used by `wait()`.
    ///
    /// Without one, `wait()` blocks until the cell is done.
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_default_timeout(timeout);
        self
    }

    /// The config built so far.
    pub fn config(&self) -> &FutureConfig {
        &self.config
    }

    /// Build a plain promise.
    pub fn promise<T: Clone + Send + 'static>(self) -> Promise<T> {
        Promise::with_config(self.config)
    }

    /// Build a pipelined cell.
    pub fn piped<T: Clone + Send + 'static>(self) -> PipedFuture<T> {
        PipedFuture::with_config(self.config)
    }
}
