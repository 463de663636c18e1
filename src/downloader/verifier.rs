//! Retrieval and empirical quality gating for planned references.
//!
//! The static tier analysis at collection time only predicts size; this
//! is the second, independent gate that measures the actual pixels
//! before an artifact counts as a success.

use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::debug;

use crate::harvest::types::MediaReference;
use crate::utils::constants::CHROME_USER_AGENT;

/// Fetches a planned reference, verifies its decoded dimensions, and
/// persists it only when it passes the floor.
///
/// One verifier (and one pooled HTTP client) is shared across all
/// concurrent downloads of a run.
pub struct FetchVerifier {
    client: Client,
    min_width: u32,
    min_height: u32,
}

impl FetchVerifier {
    pub fn new(
        min_width: u32,
        min_height: u32,
        timeout: Duration,
        proxy: Option<&str>,
    ) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(timeout)
            .user_agent(CHROME_USER_AGENT);

        if let Some(proxy) = proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy).context("Invalid proxy address")?);
        }

        Ok(Self {
            client: builder.build().context("Failed to build HTTP client")?,
            min_width,
            min_height,
        })
    }

    /// Retrieve the reference, gate it by measured dimensions, and write
    /// it to `dest`. Every failure mode reports `false`; nothing here
    /// can halt the overall run.
    pub async fn verify_and_store(&self, reference: &MediaReference, dest: &Path) -> bool {
        match self.try_verify_and_store(reference, dest).await {
            Ok(stored) => stored,
            Err(e) => {
                debug!("Failed to download {reference}: {e:#}");
                false
            }
        }
    }

    async fn try_verify_and_store(&self, reference: &MediaReference, dest: &Path) -> Result<bool> {
        let response = self
            .client
            .get(reference.as_str())
            .send()
            .await
            .context("Request failed")?;

        if !response.status().is_success() {
            debug!("Skipping {reference}: status {}", response.status());
            return Ok(false);
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.starts_with("image/") {
            debug!("Skipping {reference}: content type '{content_type}' is not an image");
            return Ok(false);
        }

        let bytes = response.bytes().await.context("Failed to read body")?;

        // In-memory probe is the cheap failure path. A probe miss is
        // tolerated; the persisted re-check below still runs.
        if let Some((width, height)) = decode_dimensions(&bytes) {
            debug!(
                "Image dimensions: {width}x{height} (min required: {}x{})",
                self.min_width, self.min_height
            );
            if !self.meets_floor(width, height) {
                return Ok(false);
            }
        }

        tokio::fs::write(dest, &bytes)
            .await
            .context("Failed to write image file")?;

        // Re-measure what actually landed on disk. A partial or corrupt
        // write must not count as a success.
        let persisted = tokio::fs::read(dest)
            .await
            .context("Failed to re-open persisted image")?;
        match decode_dimensions(&persisted) {
            Some((width, height)) if !self.meets_floor(width, height) => {
                if let Err(e) = tokio::fs::remove_file(dest).await {
                    debug!("Could not delete undersized image {}: {e}", dest.display());
                }
                Ok(false)
            }
            _ => Ok(true),
        }
    }

    /// Many qualifying images are intentionally non-square, so meeting
    /// either dimension floor is sufficient.
    fn meets_floor(&self, width: u32, height: u32) -> bool {
        width >= self.min_width || height >= self.min_height
    }
}

/// Decode pixel dimensions from raw bytes without decoding the full
/// image. Returns `None` when the format is unrecognized.
fn decode_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}
