//! Per-cell configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings a cell is created with.
///
/// # Example
///
/// ```
/// use pipedfuture_core::FutureConfig;
/// use std::time::Duration;
///
/// let config = FutureConfig::new()
///     .with_description("resize")
///     .with_default_timeout(Duration::from_secs(1));
/// assert_eq!(config.description.as_deref(), Some("resize"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FutureConfig {
    /// Human-readable label, shown in `Debug` output and log fields
    pub description: Option<String>,
    /// Timeout used by `wait()`; `None` waits forever
    pub default_timeout: Option<Duration>,
}

impl FutureConfig {
    /// Config with no description and no default timeout
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the timeout used by `wait()`
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    /// Description for log fields, `"-"` when unset
    pub fn label(&self) -> &str {
        self.description.as_deref().unwrap_or("-")
    }
}
