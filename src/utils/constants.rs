//! Shared configuration constants for pinharvest
//!
//! Default values and tuning knobs used throughout the codebase to
//! avoid magic numbers at call sites.

/// Default maximum number of images to download per run
pub const DEFAULT_LIMIT: usize = 50;

/// Default minimum width in pixels for stored images
pub const DEFAULT_MIN_WIDTH: u32 = 800;

/// Default minimum height in pixels for stored images
pub const DEFAULT_MIN_HEIGHT: u32 = 800;

/// Default number of scroll-to-bottom passes over the feed
pub const DEFAULT_SCROLL_COUNT: u32 = 5;

/// Default timeout in milliseconds for page operations
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Candidate collection stops once the set holds this multiple of the
/// requested limit, leaving room for ranking to discard poor candidates
/// before the expensive download phase.
pub const OVERCOLLECT_FACTOR: usize = 3;

/// Maximum number of concurrent fetch-and-verify downloads
pub const DOWNLOAD_CONCURRENCY: usize = 8;

/// Settle delay after a scroll-to-bottom, giving lazy loaders time to fire
pub const SCROLL_SETTLE_MS: u64 = 2_000;

/// Settle delay after opening a detail view, so the full-resolution
/// rendition has time to arrive over the network
pub const DETAIL_SETTLE_MS: u64 = 1_500;

/// Per-selector timeout when probing for a detail view
pub const DETAIL_WAIT_MS: u64 = 5_000;

/// Chrome user agent string for stealth mode
///
/// Chrome releases new stable versions roughly every 4 weeks; update
/// quarterly to stay within a plausible version window.
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";
