//! Public-corpus frequency weighing of reference sets.

use std::collections::HashMap;
use std::time::Instant;

use qgram::QGram;
use tracing::info;

use crate::pool::{ReferenceSetPool, WeightedPool, WeightedQGram, WeightedReferenceSet};

/// Frequency assumed for q-grams absent from the table.
pub const DEFAULT_FREQUENCY: u64 = 1;

/// Q-gram frequencies observed in a public corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    frequencies: HashMap<QGram, u64>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frequency, replacing any earlier entry for the q-gram.
    pub fn insert(&mut self, qgram: impl Into<QGram>, frequency: u64) {
        self.frequencies.insert(qgram.into(), frequency);
    }

    /// Frequency of `qgram`, or [`DEFAULT_FREQUENCY`] when unseen.
    pub fn frequency(&self, qgram: &str) -> u64 {
        self.frequencies
            .get(qgram)
            .copied()
            .unwrap_or(DEFAULT_FREQUENCY)
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

impl<Q: Into<QGram>> FromIterator<(Q, u64)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (Q, u64)>>(iter: I) -> Self {
        let mut table = FrequencyTable::new();
        for (q, f) in iter {
            table.insert(q, f);
        }
        table
    }
}

/// Attach frequencies to every member and compute each set's mean.
///
/// Consumes the pool; the weighted form is what the optimizer mutates.
pub fn weigh_reference_sets(pool: ReferenceSetPool, table: &FrequencyTable) -> WeightedPool {
    let start = Instant::now();
    let _guard = tracing::info_span!("refset.weigh", sets = pool.len()).entered();

    let r_length = pool.r_length();
    let sets: Vec<WeightedReferenceSet> = pool
        .iter()
        .map(|set| {
            let weighted = set
                .members
                .iter()
                .map(|q| WeightedQGram {
                    qgram: q.clone(),
                    frequency: table.frequency(q),
                })
                .collect();
            WeightedReferenceSet::new(set.index, weighted)
        })
        .collect();

    // Frozen pools are indexed by position, so no re-check is needed.
    let weighted = WeightedPool { sets, r_length };
    if let Some(ext) = weighted.extremes() {
        info!(
            min_index = ext.min_index,
            min_score = ext.min_score,
            max_index = ext.max_index,
            max_score = ext.max_score,
            elapsed_micros = start.elapsed().as_micros(),
            "weigh_success"
        );
    }
    weighted
}
