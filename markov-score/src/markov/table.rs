use std::collections::BTreeMap;
use std::fmt::Debug;

use rand::Rng;

use crate::error::{MarkovScoreError, Result};

/// Allowed deviation of a row sum from 1.
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// Occurrence counts, accumulated during training.
///
/// Conceptually, every key is a node of a Markov chain, and every
/// counted value is an outgoing edge, weighted by its number of
/// observations.
#[derive(Debug, Clone)]
pub struct TransitionCounts<K: Ord, V: Ord> {
    rows: BTreeMap<K, BTreeMap<V, usize>>,
}
impl<K: Ord + Clone + Debug, V: Ord + Clone> TransitionCounts<K, V> {
    pub fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }

    /// Records an occurrence of a transition from `from` toward `to`.
    pub fn add(&mut self, from: K, to: V) {
        *self.rows.entry(from).or_default().entry(to).or_insert(0) += 1;
    }

    /// Turn counts into probabilities.
    ///
    /// # Errors
    /// [MarkovScoreError::DataIntegrity] if a row has no occurrences, or
    /// does not sum up to 1 after normalization.
    pub fn normalize(self) -> Result<TransitionTable<K, V>> {
        let mut rows = BTreeMap::new();
        for (key, row) in self.rows {
            let total: usize = row.values().sum();
            if total == 0 {
                return Err(MarkovScoreError::DataIntegrity {
                    row: format!("{key:?}"),
                    reason: "row has no occurrences".to_string(),
                });
            }
            let row: BTreeMap<V, f64> = row
                .into_iter()
                .map(|(value, count)| (value, count as f64 / total as f64))
                .collect();
            check_row_sum(&key, &row)?;
            rows.insert(key, row);
        }
        Ok(TransitionTable { rows })
    }
}
impl<K: Ord + Clone + Debug, V: Ord + Clone> Default for TransitionCounts<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

fn check_row_sum<K: Debug, V>(key: &K, row: &BTreeMap<V, f64>) -> Result<()> {
    let sum: f64 = row.values().sum();
    if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(MarkovScoreError::DataIntegrity {
            row: format!("{key:?}"),
            reason: format!("probabilities sum up to {sum}"),
        });
    }
    Ok(())
}

/// Mapping from a prior state to the probabilities of the next one.
///
/// Immutable after training. Keys are ordered, so iteration (and
/// therefore seeded sampling) is reproducible.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionTable<K: Ord, V: Ord> {
    rows: BTreeMap<K, BTreeMap<V, f64>>,
}
impl<K: Ord, V: Ord + Clone> TransitionTable<K, V> {
    pub fn empty() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
    /// Number of prior states.
    pub fn len(&self) -> usize {
        self.rows.len()
    }
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.rows.keys()
    }
    pub fn row(&self, key: &K) -> Option<&BTreeMap<V, f64>> {
        self.rows.get(key)
    }
    pub fn rows(&self) -> impl Iterator<Item = (&K, &BTreeMap<V, f64>)> {
        self.rows.iter()
    }
    pub fn probability(&self, from: &K, to: &V) -> f64 {
        self.rows
            .get(from)
            .and_then(|row| row.get(to))
            .copied()
            .unwrap_or(0.0)
    }

    /// Pick a key uniformly. `None` for empty table.
    pub fn random_key<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&K> {
        if self.rows.is_empty() {
            return None;
        }
        let idx = rng.random_range(0..self.rows.len());
        self.rows.keys().nth(idx)
    }

    /// Weighted random choice of the value following `from`.
    ///
    /// Returns `None` if `from` has no outgoing transitions.
    pub fn sample_next<R: Rng + ?Sized>(
        &self,
        from: &K,
        rng: &mut R,
    ) -> Option<V> {
        sample_weighted(self.rows.get(from)?, rng)
    }
}

/// Weighted categorical draw over a probability row.
///
/// Performs a cumulative subtraction over the row, so works with
/// unnormalized weights as well.
pub(crate) fn sample_weighted<V: Clone, R: Rng + ?Sized>(
    row: &BTreeMap<V, f64>,
    rng: &mut R,
) -> Option<V> {
    let total: f64 = row.values().sum();
    if row.is_empty() || total <= 0.0 {
        return None;
    }
    let mut r = rng.random::<f64>() * total;
    let mut fallback = None;
    for (value, weight) in row {
        if r < *weight {
            return Some(value.clone());
        }
        r -= weight;
        fallback = Some(value);
    }
    // Rounding left `r` slightly above the last bucket.
    fallback.cloned()
}

/// Probability of every k-gram to appear in the corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialDistribution<K: Ord> {
    probabilities: BTreeMap<K, f64>,
}
impl<K: Ord + Clone + Debug> InitialDistribution<K> {
    pub(crate) fn from_counts(counts: BTreeMap<K, usize>) -> Result<Self> {
        let total: usize = counts.values().sum();
        if total == 0 {
            return Ok(Self {
                probabilities: BTreeMap::new(),
            });
        }
        let probabilities: BTreeMap<K, f64> = counts
            .into_iter()
            .map(|(key, count)| (key, count as f64 / total as f64))
            .collect();
        check_row_sum(&"initial distribution", &probabilities)?;
        Ok(Self { probabilities })
    }
    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }
    pub fn probability(&self, key: &K) -> f64 {
        self.probabilities.get(key).copied().unwrap_or(0.0)
    }
    pub fn iter(&self) -> impl Iterator<Item = (&K, &f64)> {
        self.probabilities.iter()
    }
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<K> {
        sample_weighted(&self.probabilities, rng)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rand::{rngs::StdRng, SeedableRng};

    use super::{InitialDistribution, TransitionCounts, TransitionTable};

    fn table() -> TransitionTable<char, char> {
        let mut counts = TransitionCounts::new();
        for (a, b) in [('a', 'b'), ('a', 'b'), ('a', 'c'), ('b', 'a')] {
            counts.add(a, b);
        }
        counts.normalize().unwrap()
    }

    #[test]
    fn test_normalize() {
        let table = table();
        assert_eq!(table.len(), 2);
        assert!((table.probability(&'a', &'b') - 2.0 / 3.0).abs() < 1e-12);
        assert!((table.probability(&'a', &'c') - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(table.probability(&'b', &'a'), 1.0);
        assert_eq!(table.probability(&'c', &'a'), 0.0);
        assert!(table.row(&'c').is_none());
    }

    #[test]
    fn test_sample_next() {
        let table = table();
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen_b = 0;
        for _ in 0..3000 {
            match table.sample_next(&'a', &mut rng) {
                Some('b') => seen_b += 1,
                Some('c') => (),
                other => panic!("unexpected sample: {other:?}"),
            }
        }
        // expected 2000
        assert!((1800..2200).contains(&seen_b), "b sampled {seen_b} times");
        assert_eq!(table.sample_next(&'b', &mut rng), Some('a'));
        assert_eq!(table.sample_next(&'c', &mut rng), None);
    }

    #[test]
    fn test_random_key() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(TransitionTable::<char, char>::empty()
            .random_key(&mut rng)
            .is_none());
        let table = table();
        for _ in 0..50 {
            let key = table.random_key(&mut rng).unwrap();
            assert!(['a', 'b'].contains(key));
        }
    }

    #[test]
    fn test_initial_distribution() {
        let dist = InitialDistribution::from_counts(BTreeMap::from([
            ("x", 1),
            ("y", 3),
        ]))
        .unwrap();
        assert_eq!(dist.probability(&"y"), 0.75);
        let sum: f64 = dist.iter().map(|(_, p)| p).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        let empty = InitialDistribution::<&str>::from_counts(BTreeMap::new())
            .unwrap();
        assert!(empty.is_empty());
    }
}
