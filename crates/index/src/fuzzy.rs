// Chunk: docs/chunks/fuzzy_matcher - Fuzzy path scoring
//!
//! Greedy subsequence scoring of a quick-open query against a display path.
//!
//! The scorer walks the target once, left to right, consuming the earliest
//! remaining occurrence of each query character. It never searches for a
//! better alignment, so the score is a pure function of `(query, target)` and
//! rankings are stable across runs.
//!
//! Points are awarded per matched character:
//! - 1 for the match itself
//! - `streak * 3` when it directly follows the previous match (superlinear
//!   reward for unbroken runs)
//! - 5 at the start of the target or after a boundary character
//! - 2 when it falls inside the final path segment
//!
//! A final bonus of `max(0, 100 - len) / 5` favors shorter targets.
//!
//! Positions and lengths count grapheme clusters, not `char`s, so a
//! decomposed `e` + U+0301 is one character and never matches a bare `e`.

use unicode_segmentation::UnicodeSegmentation;

/// Characters that start a new word or path segment.
const BOUNDARY_CHARS: &[&str] = &["/", "\\", ".", "-", "_", " "];

/// Bonus per match at a word or segment boundary.
const BOUNDARY_BONUS: i64 = 5;

/// Bonus per match inside the final path segment.
const FILENAME_BONUS: i64 = 2;

/// Multiplier applied to the current streak length.
const STREAK_MULTIPLIER: i64 = 3;

/// Targets shorter than this earn a length bonus.
const LENGTH_BONUS_CEILING: i64 = 100;

/// Divisor applied to the remaining length budget.
const LENGTH_BONUS_DIVISOR: i64 = 5;

/// Scores `query` against `target`.
///
/// Returns `None` when the query is not a case-insensitive subsequence of the
/// target (including when it is longer than the target). An empty query
/// matches everything with a score of 0.
pub fn score(query: &str, target: &str) -> Option<u32> {
    let query = query.to_lowercase();
    let target = target.to_lowercase();
    let query: Vec<&str> = query.graphemes(true).collect();
    let target: Vec<&str> = target.graphemes(true).collect();

    if query.is_empty() {
        return Some(0);
    }
    if query.len() > target.len() {
        return None;
    }

    let filename_start = target
        .iter()
        .rposition(|&g| g == "/")
        .map_or(0, |slash| slash + 1);

    let mut qi = 0;
    let mut total: i64 = 0;
    let mut streak: i64 = 0;
    let mut prev: isize = -2;

    for (i, &tg) in target.iter().enumerate() {
        if qi == query.len() {
            break;
        }
        if tg != query[qi] {
            continue;
        }

        total += 1;

        if i as isize == prev + 1 {
            streak += 1;
            total += streak * STREAK_MULTIPLIER;
        } else {
            streak = 0;
        }

        if i == 0 || BOUNDARY_CHARS.contains(&target[i - 1]) {
            total += BOUNDARY_BONUS;
        }

        if i >= filename_start {
            total += FILENAME_BONUS;
        }

        prev = i as isize;
        qi += 1;
    }

    if qi < query.len() {
        return None;
    }

    total += (LENGTH_BONUS_CEILING - target.len() as i64).max(0) / LENGTH_BONUS_DIVISOR;

    u32::try_from(total).ok()
}

// =============================================================================
// Tests
// =============================================================================
