//! Driving helpers for the feed page: overlay dismissal, scrolling,
//! identifier capture, and detail-view interaction.
//!
//! The feed's DOM shifts between experiments, so every lookup runs over
//! a priority-ordered selector list where the first hit wins. A selector
//! that never appears is a normal outcome, not an error.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use super::context::RunContext;
use crate::utils::constants::{DETAIL_SETTLE_MS, DETAIL_WAIT_MS, SCROLL_SETTLE_MS};

/// Containers that confirm a search-results view
const SEARCH_FEED_SELECTORS: [&str; 6] = [
    r#"div[data-test-id="search-pins-feed"]"#,
    r#"div[data-test-id="griditems"]"#,
    r#"div[data-test-id="masonry-grid"]"#,
    "div.gridCentered",
    r#"div[data-test-id="results"]"#,
    r#"div[role="list"]"#,
];

/// Fallback containers for any pin feed (boards, home, profiles)
const GENERAL_FEED_SELECTORS: [&str; 7] = [
    r#"div[data-test-id="pinGrid"]"#,
    "div[data-grid-item]",
    "div.Collection-Item",
    r#"div[role="list"]"#,
    r#"div[data-test-id="pin"]"#,
    "div.Pin",
    "img[srcset]",
];

/// Cookie-consent dismissal actions, most specific first
const CONSENT_SELECTORS: [&str; 3] = [
    r#"button[data-test-id="cookie-banner-accept-button"]"#,
    r#"button[aria-label="Accept cookies"]"#,
    "button.acceptCookies",
];

/// Signup-interstitial close actions
const SIGNUP_CLOSE_SELECTORS: [&str; 4] = [
    r#"button[aria-label="Close"]"#,
    r#"button[data-test-id="fullPageSignupClose"]"#,
    r#"button[class*="closeup-close-button"]"#,
    "button.closeBtn",
];

/// Signatures of an open detail view
const DETAIL_VIEW_SELECTORS: [&str; 5] = [
    r#"div[data-test-id="closeupImage"]"#,
    r#"div[data-test-id="pin-closeup"]"#,
    r#"div[data-test-id="PinCloseupContent"]"#,
    "div.closeupContainer",
    r#"div[role="dialog"]"#,
];

/// Clickable feed items, search-grid shapes first
const FEED_ITEM_SELECTORS: [&str; 6] = [
    r#"div[data-test-id="search-pins-feed"] div[data-grid-item]"#,
    r#"div[data-test-id="griditems"] div[data-grid-item]"#,
    r#"div[data-test-id="pinWrapper"]"#,
    "div[data-grid-item]",
    r#"div[data-test-id="pin"]"#,
    "div.Pin",
];

/// Attributes that carry a feed item's entity identifier
const ITEM_ID_ATTRIBUTES: [&str; 3] = ["data-test-pin-id", "data-id", "id"];

/// Dedicated close control for an open detail view
const CLOSE_BUTTON_SELECTOR: &str = r#"button[aria-label="Close"]"#;

/// Entity identifier embedded in a detail-view URL
static PIN_URL_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/pin/(\d+)").expect("pin url pattern is valid"));

/// Poll for a selector until it appears or the timeout elapses.
/// A timeout is reported as `false`, never as an error.
pub async fn wait_for_selector(page: &Page, selector: &str, timeout: Duration) -> bool {
    let start = Instant::now();
    let poll_interval = Duration::from_millis(200);

    loop {
        if page.find_element(selector).await.is_ok() {
            return true;
        }
        if start.elapsed() >= timeout {
            return false;
        }
        tokio::time::sleep(poll_interval).await;
    }
}

/// Try each selector in order; return the first that appears.
pub async fn wait_for_any(
    page: &Page,
    selectors: &[&'static str],
    per_selector_timeout: Duration,
) -> Option<&'static str> {
    for &selector in selectors {
        if wait_for_selector(page, selector, per_selector_timeout).await {
            return Some(selector);
        }
    }
    None
}

/// Press Escape on the page body, closing whatever transient surface
/// currently holds focus.
pub async fn press_escape(page: &Page) {
    if let Ok(body) = page.find_element("body").await
        && let Err(e) = body.press_key("Escape").await
    {
        debug!("Escape keypress failed: {e}");
    }
}

/// Accept a cookie-consent banner if one is present.
pub async fn dismiss_consent_banner(page: &Page) {
    for selector in CONSENT_SELECTORS {
        if wait_for_selector(page, selector, Duration::from_secs(3)).await {
            if let Ok(button) = page.find_element(selector).await
                && button.click().await.is_ok()
            {
                info!("Accepted cookies via {selector}");
                tokio::time::sleep(Duration::from_millis(1_000)).await;
                return;
            }
        }
    }
    debug!("No cookie consent banner found");
}

/// Close a signup interstitial if one is present, falling back to
/// Escape when no known close control matches.
pub async fn dismiss_signup_modal(page: &Page) {
    for selector in SIGNUP_CLOSE_SELECTORS {
        if wait_for_selector(page, selector, Duration::from_secs(3)).await {
            if let Ok(button) = page.find_element(selector).await
                && button.click().await.is_ok()
            {
                info!("Closed signup modal via {selector}");
                tokio::time::sleep(Duration::from_millis(1_000)).await;
                return;
            }
        }
    }
    press_escape(page).await;
}

/// Wait for feed content to render, trying search-specific containers
/// first. Confirms the results view in the run context on a search hit.
/// Returns whether any known container appeared.
pub async fn settle_feed(page: &Page, ctx: &Arc<RunContext>) -> bool {
    if !ctx.target().is_board()
        && let Some(selector) =
            wait_for_any(page, &SEARCH_FEED_SELECTORS, Duration::from_secs(8)).await
    {
        info!("Found search content with selector: {selector}");
        ctx.mark_inside_results();
        return true;
    }

    if let Some(selector) = wait_for_any(page, &GENERAL_FEED_SELECTORS, Duration::from_secs(5)).await
    {
        info!("Found feed content with selector: {selector}");
        return true;
    }

    warn!("Could not find feed content with known selectors. Continuing anyway.");
    false
}

/// Scroll to the bottom of the page.
pub async fn scroll_to_bottom(page: &Page) -> Result<()> {
    page.evaluate("window.scrollTo(0, document.body.scrollHeight)")
        .await?;
    Ok(())
}

/// Nudge the scroll position up and back down to coax lazy loaders
/// that only fire on scroll deltas.
async fn jiggle_scroll(page: &Page) -> Result<()> {
    page.evaluate("window.scrollTo(0, document.body.scrollHeight * 0.9)")
        .await?;
    tokio::time::sleep(Duration::from_millis(500)).await;
    page.evaluate("window.scrollTo(0, document.body.scrollHeight)")
        .await?;
    tokio::time::sleep(Duration::from_millis(500)).await;
    Ok(())
}

/// Fixed number of scroll passes with settle delays, exiting early once
/// the candidate count reaches the target limit.
pub async fn run_scroll_loop(page: &Page, ctx: &Arc<RunContext>, scroll_count: u32) {
    for i in 0..scroll_count {
        if let Err(e) = scroll_to_bottom(page).await {
            warn!("Scroll {i} failed: {e}");
            continue;
        }
        tokio::time::sleep(Duration::from_millis(SCROLL_SETTLE_MS)).await;

        if i % 2 == 1
            && let Err(e) = jiggle_scroll(page).await
        {
            debug!("Jitter scroll failed: {e}");
        }

        let count = ctx.candidate_count();
        info!("Candidate count after scroll {}: {count}", i + 1);
        if count >= ctx.limit() {
            break;
        }
    }
}

/// Harvest entity identifiers from the rendered feed items before any
/// interaction, via data attributes and detail-view links.
pub async fn capture_feed_item_ids(page: &Page, ctx: &Arc<RunContext>) {
    for selector in FEED_ITEM_SELECTORS {
        let Ok(items) = page.find_elements(selector).await else {
            continue;
        };
        if items.is_empty() {
            continue;
        }

        debug!("Inspecting {} feed items via {selector}", items.len());
        for item in &items {
            if let Some(id) = read_item_identifier(item).await {
                ctx.classifier().observe_identifier(id);
            }
        }

        if ctx.classifier().identifier_count() > 0 {
            info!(
                "Identified {} feed items from attributes",
                ctx.classifier().identifier_count()
            );
            return;
        }
    }

    // Attribute-less layouts still link each item to its detail view
    if let Ok(links) = page.find_elements(r#"a[href*="/pin/"]"#).await {
        for link in &links {
            if let Ok(Some(href)) = link.attribute("href").await
                && let Some(caps) = PIN_URL_ID_RE.captures(&href)
            {
                ctx.classifier().observe_identifier(&caps[1]);
            }
        }
    }

    if ctx.classifier().identifier_count() > 0 {
        info!(
            "Identified {} feed items from links",
            ctx.classifier().identifier_count()
        );
    }
}

async fn read_item_identifier(item: &Element) -> Option<String> {
    for attr in ITEM_ID_ATTRIBUTES {
        if let Ok(Some(value)) = item.attribute(attr).await {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

/// Open feed items one by one so their full-resolution renditions load,
/// then close each detail view and move on.
///
/// Boards process up to 2x the limit; searches go wider at 3x because
/// relevance filtering discards more of what they surface.
pub async fn run_interact_loop(page: &Page, ctx: &Arc<RunContext>) {
    let is_board = ctx.target().is_board();
    let item_cap = if is_board {
        ctx.limit() * 2
    } else {
        ctx.limit() * 3
    };
    let stop_count = if is_board {
        ctx.limit()
    } else {
        ctx.limit() * 2
    };

    let items = find_feed_items(page).await;
    if items.is_empty() {
        warn!("No feed items found to open");
        return;
    }

    let total = items.len().min(item_cap);
    info!("Opening {total} feed items for full-resolution capture");

    for (index, item) in items.into_iter().take(item_cap).enumerate() {
        if ctx.candidate_count() >= stop_count {
            break;
        }

        if !is_board
            && !ctx.classifier().permissive()
            && is_product_item(&item).await
        {
            debug!("Skipping product item {index}");
            continue;
        }

        if let Err(e) = open_detail_view(page, ctx, &item, index, is_board).await {
            warn!("Error processing feed item {index}: {e}");
            press_escape(page).await;
            tokio::time::sleep(Duration::from_millis(800)).await;
        }
    }
}

async fn find_feed_items(page: &Page) -> Vec<Element> {
    for selector in FEED_ITEM_SELECTORS {
        if let Ok(items) = page.find_elements(selector).await
            && !items.is_empty()
        {
            info!("Found {} feed items with selector: {selector}", items.len());
            return items;
        }
    }
    Vec::new()
}

/// Shopping results carry a "Product" badge; they rarely yield plain
/// imagery for an ordinary topic search.
async fn is_product_item(item: &Element) -> bool {
    matches!(item.inner_text().await, Ok(Some(text)) if text.contains("Product"))
}

async fn open_detail_view(
    page: &Page,
    ctx: &Arc<RunContext>,
    item: &Element,
    index: usize,
    is_board: bool,
) -> Result<()> {
    item.scroll_into_view().await?;
    tokio::time::sleep(Duration::from_millis(500)).await;
    item.click().await?;

    let found = wait_for_any(
        page,
        &DETAIL_VIEW_SELECTORS,
        Duration::from_millis(DETAIL_WAIT_MS),
    )
    .await;

    if found.is_none() {
        debug!("Detail view did not appear for item {index}");
        press_escape(page).await;
        tokio::time::sleep(Duration::from_millis(800)).await;
        return Ok(());
    }

    // Give the full-resolution rendition time to arrive
    let settle = if is_board {
        DETAIL_SETTLE_MS
    } else {
        DETAIL_SETTLE_MS * 2
    };
    tokio::time::sleep(Duration::from_millis(settle)).await;

    if !is_board
        && let Ok(Some(current_url)) = page.url().await
        && let Some(caps) = PIN_URL_ID_RE.captures(&current_url)
    {
        ctx.classifier().observe_identifier(&caps[1]);
    }

    close_detail_view(page).await;
    tokio::time::sleep(Duration::from_millis(800)).await;
    Ok(())
}

async fn close_detail_view(page: &Page) {
    if let Ok(button) = page.find_element(CLOSE_BUTTON_SELECTOR).await {
        if button.click().await.is_err() {
            press_escape(page).await;
        }
    } else {
        press_escape(page).await;
    }
}
