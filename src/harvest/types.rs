//! Core types for the harvest pipeline.
//!
//! This module contains the fundamental types used throughout the
//! harvester including the error type, the media reference newtype,
//! and the harvest target and summary structs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::{search_feed_url, target_slug};

/// Custom error type for harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
    /// Browser launch or communication error
    #[error("Browser error: {0}")]
    Browser(String),
    /// Navigation error
    #[error("Navigation error: {0}")]
    Navigation(String),
    /// Other errors
    #[error("Harvest error: {0}")]
    Other(String),
}

impl From<anyhow::Error> for HarvestError {
    fn from(err: anyhow::Error) -> Self {
        // {:#} preserves the full error chain with context
        Self::Other(format!("{err:#}"))
    }
}

/// Convenience alias for Result with [`HarvestError`]
pub type HarvestResult<T> = Result<T, HarvestError>;

/// A normalized address identifying a retrievable image resource.
///
/// Equality and hashing are by exact resolved address, which makes the
/// reference itself the deduplication key for the candidate set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaReference(String);

impl MediaReference {
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MediaReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MediaReference {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A deduplicated, relevance-tagged media reference awaiting ranking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub reference: MediaReference,
    pub is_relevant: bool,
}

/// What a harvest run is pointed at: a free-text search query or the
/// URL of a curated board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HarvestTarget {
    /// Free-text topic search over the feed
    Query(String),
    /// A pre-curated board identified by its URL
    Board(String),
}

impl HarvestTarget {
    /// Whether this run harvests a curated board rather than search results
    #[must_use]
    pub fn is_board(&self) -> bool {
        matches!(self, Self::Board(_))
    }

    /// The raw target string as the user supplied it
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Self::Query(q) => q,
            Self::Board(u) => u,
        }
    }

    /// The URL the orchestrator navigates to for this target
    pub fn feed_url(&self) -> anyhow::Result<String> {
        match self {
            Self::Query(q) => search_feed_url(q),
            Self::Board(u) => Ok(u.clone()),
        }
    }

    /// Filesystem-safe slug used for output naming
    #[must_use]
    pub fn slug(&self) -> String {
        target_slug(self.raw())
    }

    /// Default output directory name when none is configured
    #[must_use]
    pub fn default_output_dir(&self) -> String {
        match self {
            Self::Query(_) => format!("pin_search_{}", self.slug()),
            Self::Board(_) => format!("pin_board_{}", self.slug()),
        }
    }
}

/// Final accounting for one harvest run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarvestSummary {
    /// Unique candidates observed during collection
    pub candidates_seen: usize,
    /// References selected for download after ranking
    pub planned: usize,
    /// Images that passed retrieval and the dimension gate
    pub downloaded: usize,
}
