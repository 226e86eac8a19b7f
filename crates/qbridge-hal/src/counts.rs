//! Measurement histograms.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Outcome bitstrings mapped to how often they were observed.
///
/// Bitstrings are written with classical bit 0 leftmost.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counts {
    counts: FxHashMap<String, u64>,
}

impl Counts {
    /// An empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` observations of `bitstring`.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        *self.counts.entry(bitstring.into()).or_insert(0) += count;
    }

    /// Observations of `bitstring`, zero if never seen.
    pub fn get(&self, bitstring: &str) -> u64 {
        self.counts.get(bitstring).copied().unwrap_or(0)
    }

    /// Total number of observations.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The most frequent outcome. Ties go to the lexicographically smaller
    /// bitstring so the answer does not depend on hash order.
    pub fn most_frequent(&self) -> Option<(&str, u64)> {
        self.counts
            .iter()
            .max_by(|(a, ca), (b, cb)| ca.cmp(cb).then_with(|| b.cmp(a)))
            .map(|(k, v)| (k.as_str(), *v))
    }

    /// Relative frequencies, sorted by bitstring.
    pub fn probabilities(&self) -> Vec<(String, f64)> {
        let total = self.total();
        if total == 0 {
            return Vec::new();
        }
        let mut probs: Vec<(String, f64)> = self
            .counts
            .iter()
            .map(|(k, v)| (k.clone(), *v as f64 / total as f64))
            .collect();
        probs.sort_by(|a, b| a.0.cmp(&b.0));
        probs
    }

    /// Iterate over `(bitstring, count)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for Counts {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut counts = Counts::new();
        for (bits, n) in iter {
            counts.insert(bits, n);
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulates_and_totals() {
        let mut counts = Counts::new();
        counts.insert("00", 480);
        counts.insert("11", 500);
        counts.insert("00", 20);
        assert_eq!(counts.get("00"), 500);
        assert_eq!(counts.get("01"), 0);
        assert_eq!(counts.total(), 1000);
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_most_frequent_breaks_ties() {
        let counts: Counts = [("11", 5), ("00", 5), ("01", 1)].into_iter().collect();
        assert_eq!(counts.most_frequent(), Some(("00", 5)));
        assert_eq!(Counts::new().most_frequent(), None);
    }

    #[test]
    fn test_probabilities_sorted() {
        let counts: Counts = [("1", 3), ("0", 1)].into_iter().collect();
        let probs = counts.probabilities();
        assert_eq!(probs[0].0, "0");
        assert!((probs[0].1 - 0.25).abs() < 1e-12);
        assert!((probs[1].1 - 0.75).abs() < 1e-12);
        assert!(Counts::new().probabilities().is_empty());
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let counts: Counts = [("01", 7)].into_iter().collect();
        let json = serde_json::to_string(&counts).unwrap();
        assert_eq!(json, r#"{"01":7}"#);
        let back: Counts = serde_json::from_str(&json).unwrap();
        assert_eq!(back, counts);
    }
}
