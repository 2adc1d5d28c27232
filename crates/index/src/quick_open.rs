// Chunk: docs/chunks/quick_open - Live quick-open ranking and selection
//!
//! Ranking of a candidate snapshot against the live quick-open query.
//!
//! Every query change re-scores the whole snapshot from scratch; there is no
//! incremental index. The candidate list arrives by value from a scan, so no
//! locking is needed between the indexer and the ranker.
//!
//! [`QuickOpen`] layers the picker's interactive state on top of [`rank`]:
//! the current query, the capped result list, and a selection cursor that is
//! kept inside the list as it shrinks and grows.

use serde::Serialize;

use crate::directory_scanner::Candidate;
use crate::fuzzy;

/// Maximum number of results handed to the consumer.
pub const MAX_RESULTS: usize = 20;

/// A candidate paired with its score for the current query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedResult {
    pub candidate: Candidate,
    /// Match score (higher is better). 0 for an empty query.
    pub score: u32,
}

/// Ranks `candidates` against `query`, capped at [`MAX_RESULTS`].
pub fn rank(candidates: &[Candidate], query: &str) -> Vec<RankedResult> {
    rank_with_limit(candidates, query, MAX_RESULTS)
}

/// Ranks `candidates` against `query`, keeping at most `limit` results.
///
/// The query is trimmed first. An empty query returns the candidates in
/// their original (indexer) order. Otherwise each candidate's relative path
/// is scored; non-matches are dropped and the rest sorted by descending
/// score, then by relative path so ties are reproducible.
pub fn rank_with_limit(candidates: &[Candidate], query: &str, limit: usize) -> Vec<RankedResult> {
    let query = query.trim();

    if query.is_empty() {
        return candidates
            .iter()
            .take(limit)
            .map(|candidate| RankedResult {
                candidate: candidate.clone(),
                score: 0,
            })
            .collect();
    }

    let mut results: Vec<RankedResult> = candidates
        .iter()
        .filter_map(|candidate| {
            fuzzy::score(query, &candidate.relative_path).map(|score| RankedResult {
                candidate: candidate.clone(),
                score,
            })
        })
        .collect();

    results.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.candidate.relative_path.cmp(&b.candidate.relative_path))
    });
    results.truncate(limit);

    results
}

/// Interactive quick-open state: candidates, query, results, and selection.
#[derive(Debug, Clone)]
pub struct QuickOpen {
    candidates: Vec<Candidate>,
    query: String,
    results: Vec<RankedResult>,
    selected: usize,
    limit: usize,
}

impl QuickOpen {
    /// Creates a picker over `candidates` with an empty query.
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self::with_limit(candidates, MAX_RESULTS)
    }

    /// Creates a picker that keeps at most `limit` results.
    pub fn with_limit(candidates: Vec<Candidate>, limit: usize) -> Self {
        let mut picker = Self {
            candidates,
            query: String::new(),
            results: Vec::new(),
            selected: 0,
            limit: limit.max(1),
        };
        picker.refresh();
        picker
    }

    /// Replaces the query and re-ranks.
    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.refresh();
    }

    /// Replaces the candidate snapshot (after a re-scan) and re-ranks.
    pub fn set_candidates(&mut self, candidates: Vec<Candidate>) {
        self.candidates = candidates;
        self.refresh();
    }

    /// The current (untrimmed) query.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The capped result list for the current query.
    pub fn results(&self) -> &[RankedResult] {
        &self.results
    }

    /// The full candidate snapshot.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Index of the selected row. Always 0 when there are no results.
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// The selected result, if any.
    pub fn selected(&self) -> Option<&RankedResult> {
        self.results.get(self.selected)
    }

    /// Moves the selection down one row, stopping at the last result.
    pub fn select_next(&mut self) {
        let last = self.results.len().saturating_sub(1);
        self.selected = (self.selected + 1).min(last);
    }

    /// Moves the selection up one row, stopping at the first result.
    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn refresh(&mut self) {
        self.results = rank_with_limit(&self.candidates, &self.query, self.limit);
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let last = self.results.len().saturating_sub(1);
        self.selected = self.selected.min(last);
    }
}

// =============================================================================
// Tests
// =============================================================================
