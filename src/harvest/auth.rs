//! Best-effort credentialed login.
//!
//! Authentication improves relevance-signal quality but is never a hard
//! prerequisite: every failure path logs and returns `false` so the
//! harvest proceeds unauthenticated.

use std::time::Duration;

use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use tracing::{info, warn};

use super::page_actions::wait_for_selector;
use crate::utils::url_utils::LOGIN_URL;

/// Form-field and submit selectors, most specific first
const EMAIL_SELECTORS: [&str; 4] = [
    r#"input[id="email"]"#,
    r#"input[name="id"]"#,
    r#"input[type="email"]"#,
    r#"input[placeholder*="email"]"#,
];

const PASSWORD_SELECTORS: [&str; 4] = [
    r#"input[id="password"]"#,
    r#"input[name="password"]"#,
    r#"input[type="password"]"#,
    r#"input[placeholder*="password"]"#,
];

const SUBMIT_SELECTORS: [&str; 3] = [
    r#"button[type="submit"]"#,
    r#"button[aria-label*="Log in"]"#,
    "button.SignupButton",
];

/// Signals that a session is authenticated
const PROFILE_SELECTORS: [&str; 3] = [
    r#"div[data-test-id="header-profile-button"]"#,
    r#"div[aria-label*="Account"]"#,
    "div.HeaderProfileButton",
];

/// Attempt to log in with the given credentials. Returns whether the
/// login could be verified.
pub async fn try_login(page: &Page, email: &str, password: &str, timeout: Duration) -> bool {
    info!("Logging in as {email}...");

    if let Err(e) = navigate_to_login(page, timeout).await {
        warn!("Could not reach login page: {e}. Continuing without login.");
        return false;
    }

    let Some(email_field) = find_first(page, &EMAIL_SELECTORS).await else {
        warn!("Could not find email input field. Continuing without login.");
        return false;
    };
    let Some(password_field) = find_first(page, &PASSWORD_SELECTORS).await else {
        warn!("Could not find password input field. Continuing without login.");
        return false;
    };

    if let Err(e) = fill_field(&email_field, email).await {
        warn!("Could not fill email field: {e}. Continuing without login.");
        return false;
    }
    if let Err(e) = fill_field(&password_field, password).await {
        warn!("Could not fill password field: {e}. Continuing without login.");
        return false;
    }

    let mut submitted = false;
    for selector in SUBMIT_SELECTORS {
        if let Ok(button) = page.find_element(selector).await
            && button.click().await.is_ok()
        {
            submitted = true;
            break;
        }
    }
    if !submitted {
        warn!("Could not find a login submit button. Continuing without login.");
        return false;
    }

    // Submission kicks off a client-side navigation; give it a moment
    // before probing for the signed-in chrome.
    tokio::time::sleep(Duration::from_secs(3)).await;

    for selector in PROFILE_SELECTORS {
        if wait_for_selector(page, selector, Duration::from_secs(3)).await {
            info!("Login successful");
            return true;
        }
    }

    warn!("Could not verify login. Continuing anyway.");
    false
}

async fn navigate_to_login(page: &Page, timeout: Duration) -> anyhow::Result<()> {
    tokio::time::timeout(timeout, async {
        page.goto(LOGIN_URL).await?;
        page.wait_for_navigation().await?;
        Ok::<_, anyhow::Error>(())
    })
    .await
    .map_err(|_| anyhow::anyhow!("login navigation timed out"))?
}

async fn find_first(page: &Page, selectors: &[&str]) -> Option<Element> {
    for selector in selectors {
        if wait_for_selector(page, selector, Duration::from_secs(2)).await
            && let Ok(element) = page.find_element(*selector).await
        {
            return Some(element);
        }
    }
    None
}

async fn fill_field(field: &Element, value: &str) -> anyhow::Result<()> {
    field.click().await?;
    field.type_str(value).await?;
    Ok(())
}
