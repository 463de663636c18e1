//! Accessor methods for `HarvestConfig`.

use std::path::Path;
use std::time::Duration;

use super::types::HarvestConfig;
use crate::harvest::types::HarvestTarget;

impl HarvestConfig {
    #[must_use]
    pub fn target(&self) -> &HarvestTarget {
        &self.target
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[must_use]
    pub fn min_width(&self) -> u32 {
        self.min_width
    }

    #[must_use]
    pub fn min_height(&self) -> u32 {
        self.min_height
    }

    #[must_use]
    pub fn scroll_count(&self) -> u32 {
        self.scroll_count
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    /// Timeout for page operations
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Login credentials, present only when both halves were provided
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.email.as_deref(), self.password.as_deref()) {
            (Some(email), Some(password)) => Some((email, password)),
            _ => None,
        }
    }

    #[must_use]
    pub fn debug(&self) -> bool {
        self.debug
    }
}
