//! Relevance classification for captured media addresses.
//!
//! Identifiers arrive over time from a subset of page responses that may
//! lag behind or never fully arrive, so classification degrades to
//! "admit everything" rather than blocking collection indefinitely.

use dashmap::DashSet;
use tracing::debug;

/// Target keywords that switch the classifier into permissive mode.
/// Advertising content carries sparse structured signal; strict
/// filtering would starve the result set for these topics.
const SPARSE_TOPIC_MARKERS: [&str; 3] = ["ad", "ads", "advert"];

/// Tracks the set of entity identifiers known to belong to the requested
/// context and scores captured addresses against them.
///
/// The identifier set grows monotonically during a run and is safe to
/// feed from the asynchronous observation task while the driving loop
/// reads it.
#[derive(Debug)]
pub struct RelevanceClassifier {
    ids: DashSet<String>,
    permissive: bool,
}

impl RelevanceClassifier {
    /// Build a classifier for the given target string, detecting
    /// permissive mode from the target itself.
    #[must_use]
    pub fn new(target: &str) -> Self {
        let permissive = is_sparse_topic(target);
        if permissive {
            debug!("Permissive mode enabled for target '{target}'");
        }
        Self {
            ids: DashSet::new(),
            permissive,
        }
    }

    /// Whether relevance filtering is disabled for this run
    #[must_use]
    pub fn permissive(&self) -> bool {
        self.permissive
    }

    /// Record an entity identifier observed in page content. Idempotent.
    pub fn observe_identifier(&self, id: impl Into<String>) {
        self.ids.insert(id.into());
    }

    /// Number of identifiers observed so far
    #[must_use]
    pub fn identifier_count(&self) -> usize {
        self.ids.len()
    }

    /// Score an address as relevant to the requested context.
    ///
    /// Permissive mode, board requests, and the window before a results
    /// view is confirmed all admit everything: the classifier cannot
    /// discriminate yet. Otherwise an address is relevant iff a known
    /// identifier appears inside it.
    #[must_use]
    pub fn classify(&self, address: &str, inside_results: bool, is_board: bool) -> bool {
        if self.permissive || is_board || !inside_results {
            return true;
        }
        self.matches_known_identifier(address)
    }

    /// The structural heuristic, kept isolated so a stricter matcher can
    /// replace it without touching collection or planning. Identifiers
    /// are often embedded verbatim in the media path; substring matching
    /// has both false positives and false negatives by construction.
    fn matches_known_identifier(&self, address: &str) -> bool {
        self.ids.iter().any(|id| address.contains(id.as_str()))
    }
}

/// Whether the target string suggests an advertising-related topic
fn is_sparse_topic(target: &str) -> bool {
    let lower = target.to_lowercase();
    SPARSE_TOPIC_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
}
