//! Reference-set pools.
//!
//! A [`ReferenceSetPool`] is the frozen, public encoding basis: `m` pairwise
//! distinct q-gram sets of identical cardinality, addressed by index. A
//! [`WeightedPool`] is the mutable form the optimizer works on; it becomes a
//! frozen pool again only through [`WeightedPool::freeze`], which re-checks
//! every invariant.

use std::collections::{BTreeMap, HashMap};

use qgram::{QGram, QGramSet};
use serde::{Deserialize, Serialize};

use crate::error::RefSetError;

/// One member of the pool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReferenceSet {
    pub index: usize,
    pub members: QGramSet,
}

/// Frozen pool of reference sets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReferenceSetPool {
    sets: Vec<ReferenceSet>,
    r_length: usize,
}

impl ReferenceSetPool {
    /// Build a pool, indexing sets by position.
    ///
    /// Fails when the pool is empty, when set sizes differ from the first
    /// set, or when two sets are equal.
    pub fn from_sets(sets: Vec<QGramSet>) -> Result<Self, RefSetError> {
        let r_length = sets.first().map(|s| s.len()).ok_or(RefSetError::EmptyPool)?;
        let mut seen: HashMap<&QGramSet, usize> = HashMap::with_capacity(sets.len());
        for (index, set) in sets.iter().enumerate() {
            if set.len() != r_length {
                return Err(RefSetError::CardinalityMismatch {
                    index,
                    expected: r_length,
                    actual: set.len(),
                });
            }
            if let Some(&other) = seen.get(set) {
                return Err(RefSetError::DuplicateReferenceSet { index, other });
            }
            seen.insert(set, index);
        }
        let sets = sets
            .into_iter()
            .enumerate()
            .map(|(index, members)| ReferenceSet { index, members })
            .collect();
        Ok(Self { sets, r_length })
    }

    /// Number of reference sets, `m`. Also the signature bit length.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn r_length(&self) -> usize {
        self.r_length
    }

    pub fn get(&self, index: usize) -> Option<&ReferenceSet> {
        self.sets.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceSet> {
        self.sets.iter()
    }

    /// Number of reference sets each q-gram appears in.
    pub fn coverage(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for set in &self.sets {
            for q in &set.members {
                *counts.entry(q.as_str()).or_insert(0) += 1;
            }
        }
        counts
    }
}

/// A q-gram paired with its public-corpus frequency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeightedQGram {
    pub qgram: QGram,
    pub frequency: u64,
}

/// A reference set with per-member frequencies and their mean.
///
/// `set` and `weighted` are two views of the same members; both are
/// replaced together on every swap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeightedReferenceSet {
    pub index: usize,
    pub set: QGramSet,
    pub weighted: Vec<WeightedQGram>,
    pub weighted_score: f64,
}

impl WeightedReferenceSet {
    pub fn new(index: usize, weighted: Vec<WeightedQGram>) -> Self {
        let set = weighted.iter().map(|w| w.qgram.clone()).collect();
        let weighted_score = mean_frequency(&weighted);
        Self {
            index,
            set,
            weighted,
            weighted_score,
        }
    }
}

/// Arithmetic mean of member frequencies; `0.0` for no members.
///
/// The sum is taken in `u128`, so any table of `u64` frequencies is safe.
pub fn mean_frequency(members: &[WeightedQGram]) -> f64 {
    if members.is_empty() {
        return 0.0;
    }
    let sum: u128 = members.iter().map(|w| u128::from(w.frequency)).sum();
    sum as f64 / members.len() as f64
}

/// Lowest and highest weighted score in a pool, ties on lower index.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoreExtremes {
    pub min_index: usize,
    pub min_score: f64,
    pub max_index: usize,
    pub max_score: f64,
}

impl ScoreExtremes {
    pub fn range(&self) -> f64 {
        self.max_score - self.min_score
    }
}

/// Mutable, frequency-annotated pool owned by the optimizer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeightedPool {
    pub(crate) sets: Vec<WeightedReferenceSet>,
    pub(crate) r_length: usize,
}

impl WeightedPool {
    /// Wrap weighted sets. Each set's `index` must equal its position.
    pub fn new(sets: Vec<WeightedReferenceSet>, r_length: usize) -> Result<Self, RefSetError> {
        let pool = Self { sets, r_length };
        pool.check_positions()?;
        Ok(pool)
    }

    /// Sets are addressed by position; a stray `index` would point the
    /// optimizer at the wrong set.
    pub(crate) fn check_positions(&self) -> Result<(), RefSetError> {
        match self.sets.iter().enumerate().find(|(pos, s)| s.index != *pos) {
            Some((position, set)) => Err(RefSetError::IndexMismatch {
                position,
                index: set.index,
            }),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn r_length(&self) -> usize {
        self.r_length
    }

    pub fn sets(&self) -> &[WeightedReferenceSet] {
        &self.sets
    }

    pub fn get(&self, index: usize) -> Option<&WeightedReferenceSet> {
        self.sets.get(index)
    }

    /// Global minimum and maximum weighted score; `None` for an empty pool.
    pub fn extremes(&self) -> Option<ScoreExtremes> {
        let first = self.sets.first()?;
        let mut out = ScoreExtremes {
            min_index: first.index,
            min_score: first.weighted_score,
            max_index: first.index,
            max_score: first.weighted_score,
        };
        // Strict comparisons keep the earliest index on ties.
        for set in &self.sets[1..] {
            if set.weighted_score < out.min_score {
                out.min_index = set.index;
                out.min_score = set.weighted_score;
            }
            if set.weighted_score > out.max_score {
                out.max_index = set.index;
                out.max_score = set.weighted_score;
            }
        }
        Some(out)
    }

    /// Quality-check the pool and hand back its frozen form.
    ///
    /// Every set must sit at the position its index names, hold exactly `r_length` distinct members, its two
    /// views must agree, all sets must be pairwise distinct and, when `q`
    /// is given, every member must be `q` characters long.
    pub fn freeze(self, q: Option<usize>) -> Result<ReferenceSetPool, RefSetError> {
        self.check_positions()?;
        let r_length = self.r_length;
        let mut frozen = Vec::with_capacity(self.sets.len());
        for set in self.sets {
            let index = set.index;
            if set.set.len() != r_length {
                return Err(RefSetError::CardinalityMismatch {
                    index,
                    expected: r_length,
                    actual: set.set.len(),
                });
            }
            if set.weighted.len() != r_length {
                return Err(RefSetError::CardinalityMismatch {
                    index,
                    expected: r_length,
                    actual: set.weighted.len(),
                });
            }
            if set.weighted.iter().any(|w| !set.set.contains(&w.qgram)) {
                return Err(RefSetError::ViewMismatch { index });
            }
            if let Some(q) = q {
                if let Some(bad) = set.set.iter().find(|m| m.chars().count() != q) {
                    return Err(RefSetError::QGramLength {
                        index,
                        qgram: bad.clone(),
                        expected: q,
                    });
                }
            }
            frozen.push(set.set);
        }
        ReferenceSetPool::from_sets(frozen)
    }
}
