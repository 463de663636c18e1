//! Mutable state for a single harvest run.
//!
//! All run state lives here and nowhere else: no module-level globals.
//! The orchestrator owns the context and hands an `Arc` to the
//! observation task, so candidate inserts are safe at arbitrary times
//! without coordination from the driving loop.

use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;

use super::relevance::RelevanceClassifier;
use super::types::{Candidate, HarvestTarget, MediaReference};
use crate::utils::OVERCOLLECT_FACTOR;

/// State of one harvest: the target, the relevance-signal set, the
/// candidate set, and the collection mode flags. Created at run start,
/// discarded at run end; nothing persists across runs.
pub struct RunContext {
    target: HarvestTarget,
    limit: usize,
    min_width: u32,
    min_height: u32,
    candidates: DashMap<MediaReference, bool>,
    classifier: RelevanceClassifier,
    collecting: AtomicBool,
    inside_results: AtomicBool,
}

impl RunContext {
    #[must_use]
    pub fn new(target: HarvestTarget, limit: usize, min_width: u32, min_height: u32) -> Self {
        let classifier = RelevanceClassifier::new(target.raw());
        Self {
            target,
            limit,
            min_width,
            min_height,
            candidates: DashMap::new(),
            classifier,
            collecting: AtomicBool::new(false),
            inside_results: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn target(&self) -> &HarvestTarget {
        &self.target
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[must_use]
    pub fn min_width(&self) -> u32 {
        self.min_width
    }

    #[must_use]
    pub fn min_height(&self) -> u32 {
        self.min_height
    }

    #[must_use]
    pub fn classifier(&self) -> &RelevanceClassifier {
        &self.classifier
    }

    /// Enable candidate collection. The orchestrator flips this only
    /// after any login phase completes so login-page imagery never
    /// pollutes the results.
    pub fn enable_collection(&self) {
        self.collecting.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn collection_enabled(&self) -> bool {
        self.collecting.load(Ordering::Acquire)
    }

    /// Record that the engine has confirmed it is inside a results view
    pub fn mark_inside_results(&self) {
        self.inside_results.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn inside_results(&self) -> bool {
        self.inside_results.load(Ordering::Acquire)
    }

    /// Over-collection ceiling for the candidate set
    #[must_use]
    pub fn ceiling(&self) -> usize {
        self.limit * OVERCOLLECT_FACTOR
    }

    #[must_use]
    pub fn at_ceiling(&self) -> bool {
        self.candidates.len() >= self.ceiling()
    }

    /// Insert a candidate with set semantics keyed by reference.
    ///
    /// Repeat insertion of an existing reference is a no-op and does not
    /// re-evaluate the stored relevance flag. Returns whether the
    /// reference was new.
    pub fn insert_candidate(&self, reference: MediaReference, is_relevant: bool) -> bool {
        let mut inserted = false;
        self.candidates.entry(reference).or_insert_with(|| {
            inserted = true;
            is_relevant
        });
        inserted
    }

    #[must_use]
    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// Drop everything collected so far. Used to discard imagery
    /// observed before collection was formally enabled.
    pub fn clear_candidates(&self) {
        self.candidates.clear();
    }

    /// Snapshot the candidate set for planning
    #[must_use]
    pub fn candidates(&self) -> Vec<Candidate> {
        self.candidates
            .iter()
            .map(|entry| Candidate {
                reference: entry.key().clone(),
                is_relevant: *entry.value(),
            })
            .collect()
    }
}
