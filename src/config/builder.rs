//! Type-safe builder for `HarvestConfig` using the typestate pattern.
//!
//! The target is the one required field; `build()` only exists once it
//! has been set, so an unconfigured harvest cannot compile.

use std::marker::PhantomData;
use std::path::PathBuf;

use anyhow::Result;

use super::types::HarvestConfig;
use crate::harvest::types::HarvestTarget;

/// Type state reached after the target is set
pub struct WithTarget;

pub struct HarvestConfigBuilder<State = ()> {
    target: Option<HarvestTarget>,
    output_dir: Option<PathBuf>,
    limit: Option<usize>,
    min_width: Option<u32>,
    min_height: Option<u32>,
    scroll_count: Option<u32>,
    headless: bool,
    proxy: Option<String>,
    timeout_ms: Option<u64>,
    email: Option<String>,
    password: Option<String>,
    debug: bool,
    _phantom: PhantomData<State>,
}

impl Default for HarvestConfigBuilder<()> {
    fn default() -> Self {
        Self {
            target: None,
            output_dir: None,
            limit: None,
            min_width: None,
            min_height: None,
            scroll_count: None,
            headless: true,
            proxy: None,
            timeout_ms: None,
            email: None,
            password: None,
            debug: false,
            _phantom: PhantomData,
        }
    }
}

impl HarvestConfig {
    /// Create a builder with a fluent interface
    #[must_use]
    pub fn builder() -> HarvestConfigBuilder<()> {
        HarvestConfigBuilder::default()
    }
}

impl HarvestConfigBuilder<()> {
    pub fn target(self, target: HarvestTarget) -> HarvestConfigBuilder<WithTarget> {
        HarvestConfigBuilder {
            target: Some(target),
            output_dir: self.output_dir,
            limit: self.limit,
            min_width: self.min_width,
            min_height: self.min_height,
            scroll_count: self.scroll_count,
            headless: self.headless,
            proxy: self.proxy,
            timeout_ms: self.timeout_ms,
            email: self.email,
            password: self.password,
            debug: self.debug,
            _phantom: PhantomData,
        }
    }
}

impl<State> HarvestConfigBuilder<State> {
    #[must_use]
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn min_dimensions(mut self, width: u32, height: u32) -> Self {
        self.min_width = Some(width);
        self.min_height = Some(height);
        self
    }

    #[must_use]
    pub fn scroll_count(mut self, count: u32) -> Self {
        self.scroll_count = Some(count);
        self
    }

    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    #[must_use]
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    #[must_use]
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    #[must_use]
    pub fn credentials(mut self, email: impl Into<String>, password: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

// Build is only available once the target is set
impl HarvestConfigBuilder<WithTarget> {
    pub fn build(self) -> Result<HarvestConfig> {
        let defaults = HarvestConfig::default();
        let target = self
            .target
            .ok_or_else(|| anyhow::anyhow!("target is required"))?;

        // Debug runs force a visible browser for observability
        let headless = if self.debug { false } else { self.headless };

        let output_dir = self
            .output_dir
            .unwrap_or_else(|| PathBuf::from(target.default_output_dir()));

        Ok(HarvestConfig {
            target,
            output_dir,
            limit: self.limit.unwrap_or(defaults.limit),
            min_width: self.min_width.unwrap_or(defaults.min_width),
            min_height: self.min_height.unwrap_or(defaults.min_height),
            scroll_count: self.scroll_count.unwrap_or(defaults.scroll_count),
            headless,
            proxy: self.proxy,
            timeout_ms: self.timeout_ms.unwrap_or(defaults.timeout_ms),
            email: self.email,
            password: self.password,
            debug: self.debug,
        })
    }
}
