//! Score-ordered member set with Redis rank semantics
//!
//! Members are unique; each carries a score. Iteration order is ascending by
//! `(score, member)`, so equal scores fall back to byte-wise member order,
//! the same tie-break a Redis sorted set applies.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// Total-ordered `f64` wrapper
#[derive(Debug, Clone, Copy)]
struct Score(f64);

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// A sorted set of string members
#[derive(Debug, Clone, Default)]
pub struct SortedSet {
    scores: HashMap<String, f64>,
    ordered: BTreeSet<(Score, String)>,
}

impl SortedSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or re-score a member
    ///
    /// Returns `true` if the member was not present before.
    pub fn insert(&mut self, member: &str, score: f64) -> bool {
        match self.scores.insert(member.to_string(), score) {
            Some(old) => {
                self.ordered.remove(&(Score(old), member.to_string()));
                self.ordered.insert((Score(score), member.to_string()));
                false
            }
            None => {
                self.ordered.insert((Score(score), member.to_string()));
                true
            }
        }
    }

    /// Remove a member, returning whether it was present
    pub fn remove(&mut self, member: &str) -> bool {
        match self.scores.remove(member) {
            Some(score) => {
                self.ordered.remove(&(Score(score), member.to_string()));
                true
            }
            None => false,
        }
    }

    /// Score of a member
    pub fn score(&self, member: &str) -> Option<f64> {
        self.scores.get(member).copied()
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// True if the set has no members
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Members ranked `start..=stop` in ascending order
    ///
    /// Negative ranks count from the end (`-1` is the last member).
    pub fn range(&self, start: isize, stop: isize) -> Vec<String> {
        match normalize_range(self.len(), start, stop) {
            Some((from, to)) => self
                .ordered
                .iter()
                .skip(from)
                .take(to - from + 1)
                .map(|(_, m)| m.clone())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Members ranked `start..=stop` in descending order
    pub fn rev_range(&self, start: isize, stop: isize) -> Vec<String> {
        match normalize_range(self.len(), start, stop) {
            Some((from, to)) => self
                .ordered
                .iter()
                .rev()
                .skip(from)
                .take(to - from + 1)
                .map(|(_, m)| m.clone())
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Resolve a Redis-style inclusive rank range against a set of `len` members
///
/// Returns `None` when the range selects nothing.
pub fn normalize_range(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    if len == 0 {
        return None;
    }
    let len = len as isize;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if start > stop || start >= len {
        return None;
    }
    Some((start as usize, stop as usize))
}
