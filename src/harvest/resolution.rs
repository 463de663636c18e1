//! Resolution-tier analysis and rewriting for media addresses.
//!
//! The feed serves each image under a size-tier path segment
//! (`/236x/`, `/474x/`, `/736x/`, `/1200x/`, `/originals/`). Everything
//! here is pure string rewriting over that grammar: no network access,
//! no side effects, same output for the same input.

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::MediaReference;

/// Fixed micro-thumbnail tiers used for avatars and icons. No amount of
/// rewriting makes these qualify against a real dimension floor.
const MICRO_TIERS: [&str; 2] = ["/60x60/", "/75x75/"];

/// Intermediate size tiers that can be rewritten to the originals tier
const SIZE_TIERS: [&str; 4] = ["/236x/", "/474x/", "/736x/", "/1200x/"];

/// Path segment denoting the full-resolution rendition
const ORIGINALS_SEGMENT: &str = "/originals/";

/// Micro-thumbnail tiers only pass when the configured minimums sit at
/// or below this absolute floor.
const MICRO_TIER_FLOOR: u32 = 100;

/// Raster extensions the collector is willing to admit
const RASTER_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".webp"];

/// Generic sized-folder shape on the image CDN, e.g.
/// `https://i.pinimg.com/236x/ab/cd/ef/abcdef123456.jpg`
static SIZED_FOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(https://i\.pinimg\.com/)(\d+x/)(.+\.(?:jpg|jpeg|png|webp))")
        .expect("sized-folder pattern is valid")
});

/// Outcome of normalizing a raw media address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    /// Highest-resolution form of the address
    Full(MediaReference),
    /// The address can never satisfy the configured minimums
    Rejected,
}

/// Map a raw media address to its highest-resolution equivalent, or to
/// [`Normalized::Rejected`] for addresses too small to ever qualify.
///
/// Unrecognized addresses pass through unchanged (best effort).
#[must_use]
pub fn normalize(raw_url: &str, min_width: u32, min_height: u32) -> Normalized {
    if raw_url.contains(ORIGINALS_SEGMENT) {
        return Normalized::Full(MediaReference::from(raw_url));
    }

    if is_micro_thumbnail(raw_url) {
        if min_width > MICRO_TIER_FLOOR || min_height > MICRO_TIER_FLOOR {
            return Normalized::Rejected;
        }
        return Normalized::Full(MediaReference::from(raw_url));
    }

    for tier in SIZE_TIERS {
        if raw_url.contains(tier) {
            return Normalized::Full(MediaReference::new(
                raw_url.replace(tier, ORIGINALS_SEGMENT),
            ));
        }
    }

    if let Some(caps) = SIZED_FOLDER_RE.captures(raw_url) {
        return Normalized::Full(MediaReference::new(format!(
            "{}originals/{}",
            &caps[1], &caps[3]
        )));
    }

    Normalized::Full(MediaReference::from(raw_url))
}

/// Whether the address denotes a fixed micro-thumbnail tier
#[must_use]
pub fn is_micro_thumbnail(url: &str) -> bool {
    MICRO_TIERS.iter().any(|tier| url.contains(tier))
}

/// Whether the address looks like a raster image served at one of the
/// known size tiers. Anything else is not a feed image and is ignored
/// by the collector.
#[must_use]
pub fn looks_like_tiered_raster(url: &str) -> bool {
    let lower = url.to_lowercase();
    let has_raster_ext = RASTER_EXTENSIONS.iter().any(|ext| lower.contains(ext));
    if !has_raster_ext {
        return false;
    }

    url.contains(ORIGINALS_SEGMENT)
        || SIZE_TIERS.iter().any(|tier| url.contains(tier))
        || url.contains("i.pinimg.com")
}

/// Resolution-tier priority used to rank candidates before download.
/// Higher scores download first; unknown tiers rank last.
#[must_use]
pub fn tier_score(url: &str) -> u8 {
    if url.contains(ORIGINALS_SEGMENT) {
        5
    } else if url.contains("/1200x/") {
        4
    } else if url.contains("/736x/") {
        3
    } else if url.contains("/474x/") {
        2
    } else if url.contains("/236x/") {
        1
    } else {
        0
    }
}
