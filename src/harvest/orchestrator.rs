//! Run orchestration across the page-lifecycle phases.
//!
//! Phase order: Init, optional Authenticate, Navigate, SettleChrome,
//! optional CaptureContextIds, ScrollLoop, optional InteractLoop,
//! Finalize. An error inside a phase terminates that phase only; the
//! run always proceeds to best-effort cleanup and reports whatever was
//! downloaded. A harvest never fails all-or-nothing.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams,
};
use chromiumoxide::page::Page;
use tracing::{debug, info, warn};

use super::auth;
use super::collector::CandidateCollector;
use super::context::RunContext;
use super::page_actions;
use super::planner;
use super::types::{HarvestError, HarvestSummary};
use crate::browser_setup::{apply_stealth_measures, cleanup_user_data_dir, launch_browser};
use crate::config::HarvestConfig;
use crate::downloader::{self, FetchVerifier};

/// Drives one harvest pass and owns all of its mutable state.
pub struct HarvestOrchestrator {
    config: HarvestConfig,
}

impl HarvestOrchestrator {
    #[must_use]
    pub fn new(config: HarvestConfig) -> Self {
        Self { config }
    }

    /// Execute the full harvest and report the final counts.
    pub async fn run(&self) -> Result<HarvestSummary, HarvestError> {
        tokio::fs::create_dir_all(self.config.output_dir())
            .await
            .map_err(|e| HarvestError::Config(format!("cannot create output directory: {e}")))?;

        let (mut browser, handler_task, user_data_dir) =
            launch_browser(self.config.headless(), self.config.proxy())
                .await
                .map_err(|e| HarvestError::Browser(format!("{e:#}")))?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| HarvestError::Browser(format!("failed to create page: {e}")))?;

        if let Err(e) = apply_stealth_measures(&page).await {
            warn!("Stealth injection failed: {e:#}");
        }

        let ctx = Arc::new(RunContext::new(
            self.config.target().clone(),
            self.config.limit(),
            self.config.min_width(),
            self.config.min_height(),
        ));

        let collector = CandidateCollector::new(Arc::clone(&ctx));
        let observer = match collector.attach(&page).await {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Could not attach network observer: {e:#}");
                None
            }
        };

        let summary = self.drive_page(&page, &ctx).await;

        // Cleanup is best-effort in every branch
        if let Some(observer) = observer {
            observer.abort();
        }
        if let Err(e) = browser.close().await {
            warn!("Failed to close browser cleanly: {e}");
        }
        if let Err(e) = browser.wait().await {
            warn!("Failed to wait for browser exit: {e}");
        }
        handler_task.abort();
        cleanup_user_data_dir(&user_data_dir);

        Ok(summary)
    }

    /// The sequential driving loop. Every phase failure is absorbed
    /// here so later phases still get their chance.
    async fn drive_page(&self, page: &Page, ctx: &Arc<RunContext>) -> HarvestSummary {
        if let Some((email, password)) = self.config.credentials() {
            if !auth::try_login(page, email, password, self.config.timeout()).await {
                debug!("Proceeding unauthenticated");
            }
        }

        // Anything intercepted during login is login-page imagery
        info!("Clearing any candidates collected during the login phase");
        ctx.clear_candidates();
        ctx.enable_collection();
        info!("Starting candidate collection");

        if let Err(e) = self.navigate_to_feed(page).await {
            warn!("Navigation failed: {e:#}");
            self.capture_failure_snapshot(page, "navigate").await;
        }

        page_actions::dismiss_consent_banner(page).await;
        let content_found = page_actions::settle_feed(page, ctx).await;
        if !content_found {
            self.capture_failure_snapshot(page, "settle").await;
        }
        page_actions::dismiss_signup_modal(page).await;

        if ctx.inside_results() && !ctx.target().is_board() {
            info!("Identifying feed items in the results view...");
            page_actions::capture_feed_item_ids(page, ctx).await;
        }

        info!("Scrolling to load more content...");
        page_actions::run_scroll_loop(page, ctx, self.config.scroll_count()).await;

        // Interaction is only worth the time when scrolling alone did
        // not over-collect enough for ranking to choose from.
        if ctx.candidate_count() < ctx.limit() * 2 {
            page_actions::run_interact_loop(page, ctx).await;
        }

        self.finalize(ctx).await
    }

    async fn navigate_to_feed(&self, page: &Page) -> Result<()> {
        let url = self.config.target().feed_url()?;
        info!("Navigating to feed: {url}");

        with_page_timeout(
            async {
                page.goto(&url).await.context("goto failed")?;
                page.wait_for_navigation()
                    .await
                    .context("page load failed")?;
                Ok(())
            },
            self.config.timeout(),
            "Feed navigation",
        )
        .await
    }

    /// Rank the collected candidates and run the download fan-out.
    async fn finalize(&self, ctx: &Arc<RunContext>) -> HarvestSummary {
        let candidates = ctx.candidates();
        info!(
            "Found {} potential image references. Starting download...",
            candidates.len()
        );

        let planned = planner::plan(
            &candidates,
            ctx.limit(),
            ctx.classifier().permissive(),
        );

        let verifier = match FetchVerifier::new(
            ctx.min_width(),
            ctx.min_height(),
            self.config.timeout(),
            self.config.proxy(),
        ) {
            Ok(v) => Arc::new(v),
            Err(e) => {
                warn!("Could not build download client: {e:#}");
                return HarvestSummary {
                    candidates_seen: candidates.len(),
                    planned: planned.len(),
                    downloaded: 0,
                };
            }
        };

        let planned_count = planned.len();
        let downloaded = downloader::download_all(
            planned,
            verifier,
            self.config.output_dir(),
            &self.config.target().slug(),
        )
        .await;

        HarvestSummary {
            candidates_seen: candidates.len(),
            planned: planned_count,
            downloaded,
        }
    }

    /// Point-in-time visual snapshot for post-hoc diagnosis. Debug runs
    /// only; failures to capture are themselves non-fatal.
    async fn capture_failure_snapshot(&self, page: &Page, label: &str) {
        if !self.config.debug() {
            return;
        }

        let params = CaptureScreenshotParams {
            format: Some(CaptureScreenshotFormat::Png),
            ..Default::default()
        };

        match page.screenshot(params).await {
            Ok(data) => {
                let path = self
                    .config
                    .output_dir()
                    .join(format!("debug_{label}_snapshot.png"));
                match tokio::fs::write(&path, data).await {
                    Ok(()) => info!("Debug snapshot saved to {}", path.display()),
                    Err(e) => debug!("Could not write debug snapshot: {e}"),
                }
            }
            Err(e) => debug!("Could not capture debug snapshot: {e}"),
        }
    }
}

/// Wrap a page operation with an explicit timeout so a wedged renderer
/// cannot hang the phase.
async fn with_page_timeout<F, T>(
    operation: F,
    timeout: Duration,
    operation_name: &str,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(anyhow::anyhow!(
            "{operation_name} timeout after {}s",
            timeout.as_secs()
        )),
    }
}

/// Convenience entry point mirroring the library surface.
pub async fn run_harvest(config: HarvestConfig) -> Result<HarvestSummary, HarvestError> {
    HarvestOrchestrator::new(config).run().await
}
