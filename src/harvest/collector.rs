//! Interception sink for observed network exchanges.
//!
//! A listener task subscribes to CDP `Network.responseReceived` events
//! on the driven page and funnels each exchange through
//! [`CandidateCollector::on_observation`]. Observations arrive
//! asynchronously and may interleave with any driving step; all shared
//! state lives in [`RunContext`] behind concurrent containers, so no
//! coordination with the driving loop is required.

use std::sync::Arc;

use anyhow::{Context, Result};
use chromiumoxide::cdp::browser_protocol::network::{
    EventResponseReceived, GetResponseBodyParams, RequestId, ResourceType,
};
use chromiumoxide::page::Page;
use futures::StreamExt;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use super::context::RunContext;
use super::resolution::{self, Normalized};
use super::types::MediaReference;

/// Structural keywords that mark a textual payload as a results feed
/// response worth mining for entity identifiers.
const RESULTS_PAYLOAD_MARKERS: [&str; 3] = ["pin_join", "grid_item", "closeup"];

/// Extra search terms accepted in permissive mode, where topic text in
/// payloads is sparser than for ordinary queries.
const SPARSE_TOPIC_TERMS: [&str; 5] = ["ad", "ads", "advert", "advertisement", "marketing"];

/// Non-content UI asset path fragments. Addresses matching any of these
/// are chrome, not feed content.
const UI_ASSET_DENYLIST: [&str; 16] = [
    "/icons/",
    "/logo/",
    "/favicon/",
    "/avatar/",
    "/profile/",
    "/spinner/",
    "/loading/",
    "/error/",
    "default_",
    "placeholder",
    "/following/",
    "profile-image",
    "avatar.",
    "user-image",
    "default-user",
    "icon_",
];

/// Narrowed denylist for permissive mode, keeping only the entries that
/// can never be feed content.
const UI_ASSET_DENYLIST_PERMISSIVE: [&str; 5] =
    ["/spinner/", "/loading/", "/error/", "default_user", "icon_"];

/// Numeric id-looking tokens embedded in results payloads
static ENTITY_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""id":\s*"(\d+)""#).expect("entity id pattern is valid"));

/// Embedded metadata describing an original image with explicit pixel
/// dimensions
static ORIGINAL_META_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""original":\s*"([^"]+)".*?"original_width":\s*(\d+).*?"original_height":\s*(\d+)"#)
        .expect("original metadata pattern is valid")
});

/// Classification of an observed network exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeKind {
    /// Top-level document response
    Document,
    /// XHR or fetch API response
    Api,
    /// Image resource response
    Image,
    /// Anything else (scripts, stylesheets, fonts, ...)
    Other,
}

impl From<&ResourceType> for ExchangeKind {
    fn from(resource_type: &ResourceType) -> Self {
        match resource_type {
            ResourceType::Document => Self::Document,
            ResourceType::Xhr | ResourceType::Fetch => Self::Api,
            ResourceType::Image => Self::Image,
            _ => Self::Other,
        }
    }
}

/// One observed request/response pair, reduced to the fields the
/// collector needs
#[derive(Debug, Clone)]
pub struct Exchange {
    pub kind: ExchangeKind,
    pub status: i64,
    pub url: String,
    /// Decoded text body for content-bearing responses, when available
    pub body: Option<String>,
}

/// Consumes observed exchanges and accumulates a bounded, deduplicated
/// candidate set in the shared [`RunContext`].
#[derive(Clone)]
pub struct CandidateCollector {
    ctx: Arc<RunContext>,
}

impl CandidateCollector {
    #[must_use]
    pub fn new(ctx: Arc<RunContext>) -> Self {
        Self { ctx }
    }

    /// Subscribe to network response events on the page and spawn the
    /// consumer task. The returned handle must be aborted once the page
    /// is done so the task does not outlive the browser.
    pub async fn attach(&self, page: &Page) -> Result<JoinHandle<()>> {
        let mut events = page
            .event_listener::<EventResponseReceived>()
            .await
            .context("Failed to subscribe to network response events")?;

        let page = page.clone();
        let collector = self.clone();

        Ok(tokio::spawn(async move {
            while let Some(event) = events.next().await {
                let kind = ExchangeKind::from(&event.r#type);

                // Bodies are only worth a CDP round trip for textual
                // responses while collection is live.
                let body = match kind {
                    ExchangeKind::Document | ExchangeKind::Api
                        if collector.ctx.collection_enabled() && !collector.ctx.at_ceiling() =>
                    {
                        fetch_text_body(&page, event.request_id.clone()).await
                    }
                    _ => None,
                };

                let exchange = Exchange {
                    kind,
                    status: event.response.status,
                    url: event.response.url.clone(),
                    body,
                };
                collector.on_observation(&exchange);
            }
            trace!("Network observation stream ended");
        }))
    }

    /// Process one observed exchange.
    ///
    /// Safe to invoke concurrently with itself and with the driving
    /// loop; every insert path goes through the concurrent candidate
    /// map with idempotent semantics.
    pub fn on_observation(&self, exchange: &Exchange) {
        if !self.ctx.collection_enabled() || self.ctx.at_ceiling() {
            return;
        }

        match exchange.kind {
            ExchangeKind::Document | ExchangeKind::Api => self.scan_feed_payload(exchange),
            ExchangeKind::Image if is_success(exchange.status) => self.admit_image(&exchange.url),
            _ => {}
        }
    }

    /// Mine a content-bearing response for relevance signals and for
    /// embedded original-image metadata.
    fn scan_feed_payload(&self, exchange: &Exchange) {
        let target_is_board = self.ctx.target().is_board();
        let url_lower = exchange.url.to_lowercase();

        if !target_is_board
            && url_lower.contains("search/pins")
            && self
                .search_terms()
                .iter()
                .any(|term| url_lower.contains(term))
        {
            self.ctx.mark_inside_results();

            if let Some(body) = &exchange.body {
                self.harvest_identifiers(body);
            }
        }

        if let Some(body) = &exchange.body {
            self.admit_metadata_originals(body);
        }
    }

    /// Extract id-looking tokens from a results payload and feed them to
    /// the classifier. Parse misses are silently ignored for this single
    /// exchange.
    fn harvest_identifiers(&self, body: &str) {
        let body_lower = body.to_lowercase();
        let term_found = self
            .search_terms()
            .iter()
            .any(|term| body_lower.contains(term));
        if !term_found {
            return;
        }

        let structural = RESULTS_PAYLOAD_MARKERS
            .iter()
            .any(|marker| body.contains(marker));
        if !structural {
            return;
        }

        let before = self.ctx.classifier().identifier_count();
        for caps in ENTITY_ID_RE.captures_iter(body) {
            self.ctx.classifier().observe_identifier(&caps[1]);
        }
        let added = self.ctx.classifier().identifier_count() - before;
        if added > 0 {
            debug!("Harvested {added} entity identifiers from results payload");
        }
    }

    /// Admit URLs described by embedded metadata with explicit pixel
    /// dimensions. This path trusts the stated dimensions and bypasses
    /// the denylist and the classifier.
    fn admit_metadata_originals(&self, body: &str) {
        if !body.contains(r#""original_width":"#) || !body.contains(r#""original_height":"#) {
            return;
        }

        for caps in ORIGINAL_META_RE.captures_iter(body) {
            let (Ok(width), Ok(height)) = (caps[2].parse::<u32>(), caps[3].parse::<u32>()) else {
                continue;
            };

            if width >= self.ctx.min_width() && height >= self.ctx.min_height() {
                let address = caps[1].replace('\\', "");
                self.ctx
                    .insert_candidate(MediaReference::new(address), true);
            }
        }
    }

    /// Run an image response address through the admission gauntlet:
    /// micro-thumbnail rejection, raster-tier requirement, resolution
    /// normalization, the UI-asset denylist, then classification.
    fn admit_image(&self, url: &str) {
        if resolution::is_micro_thumbnail(url)
            && (self.ctx.min_width() > 100 || self.ctx.min_height() > 100)
        {
            return;
        }

        if !resolution::looks_like_tiered_raster(url) {
            return;
        }

        let reference = match resolution::normalize(url, self.ctx.min_width(), self.ctx.min_height())
        {
            Normalized::Full(reference) => reference,
            Normalized::Rejected => return,
        };

        if self.is_ui_asset(url) {
            return;
        }

        let is_relevant = self.ctx.classifier().classify(
            url,
            self.ctx.inside_results(),
            self.ctx.target().is_board(),
        );

        if self.ctx.insert_candidate(reference, is_relevant) {
            trace!(relevant = is_relevant, "Admitted candidate: {url}");
        }
    }

    /// Denylist check, narrowed to the unambiguous entries when the
    /// classifier is permissive.
    fn is_ui_asset(&self, url: &str) -> bool {
        let lower = url.to_lowercase();
        if self.ctx.classifier().permissive() {
            UI_ASSET_DENYLIST_PERMISSIVE
                .iter()
                .any(|fragment| lower.contains(fragment))
        } else {
            UI_ASSET_DENYLIST
                .iter()
                .any(|fragment| lower.contains(fragment))
        }
    }

    /// Terms accepted when matching results payloads against the target
    fn search_terms(&self) -> Vec<String> {
        let mut terms = vec![self.ctx.target().raw().to_lowercase()];
        if self.ctx.classifier().permissive() {
            terms.extend(SPARSE_TOPIC_TERMS.iter().map(|t| (*t).to_string()));
        }
        terms
    }
}

fn is_success(status: i64) -> bool {
    status == 200
}

/// Pull the decoded body for a finished response. Failures are normal
/// here (the resource may be evicted or still streaming) and yield
/// `None` for that single exchange.
async fn fetch_text_body(page: &Page, request_id: RequestId) -> Option<String> {
    let response = page
        .execute(GetResponseBodyParams::new(request_id))
        .await
        .ok()?;

    if response.base64_encoded {
        return None;
    }
    Some(response.body.clone())
}
