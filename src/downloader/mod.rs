//! Concurrent fetch-and-verify fan-out for the planned download list.

mod verifier;

pub use verifier::FetchVerifier;

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::harvest::types::MediaReference;
use crate::utils::constants::DOWNLOAD_CONCURRENCY;

/// Download every planned reference concurrently and return how many
/// passed verification.
///
/// Each download owns a distinct destination path; the success count is
/// aggregated from task results rather than shared between tasks.
pub async fn download_all(
    references: Vec<MediaReference>,
    verifier: Arc<FetchVerifier>,
    output_dir: &Path,
    slug: &str,
) -> usize {
    if references.is_empty() {
        info!("No images found to download");
        return 0;
    }

    if let Err(e) = tokio::fs::create_dir_all(output_dir).await {
        warn!("Failed to create output directory: {e}");
        return 0;
    }

    let total = references.len();
    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {pos}/{len}")
            .expect("progress template is valid"),
    );
    bar.set_message("Downloading images");

    let stamp = Utc::now().format("%Y%m%d%H%M%S").to_string();
    let semaphore = Arc::new(Semaphore::new(DOWNLOAD_CONCURRENCY));
    let mut tasks = FuturesUnordered::new();

    for (index, reference) in references.into_iter().enumerate() {
        let permit = match Arc::clone(&semaphore).acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                warn!("Download semaphore closed unexpectedly: {e}");
                break;
            }
        };

        let verifier = Arc::clone(&verifier);
        let dest = output_dir.join(format!("{slug}_{stamp}_{index:03}.jpg"));

        tasks.push(tokio::spawn(async move {
            let _permit = permit;
            verifier.verify_and_store(&reference, &dest).await
        }));
    }

    let mut downloaded = 0;
    while let Some(result) = tasks.next().await {
        bar.inc(1);
        match result {
            Ok(true) => downloaded += 1,
            Ok(false) => {}
            Err(e) => warn!("Download task panicked: {e}"),
        }
    }

    bar.finish_and_clear();
    info!("Verified {downloaded}/{total} downloads");
    downloaded
}
