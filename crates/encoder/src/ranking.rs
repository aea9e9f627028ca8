//! Per-record similarity ranking against the reference-set pool.

use qgram::QGramSet;
use rayon::prelude::*;
use refset::ReferenceSetPool;
use serde::{Deserialize, Serialize};

use crate::similarity::jaccard;

/// One entry of a record's intermediate signature.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RankedReference {
    pub index: usize,
    pub similarity: f64,
}

/// Rank every reference set sharing at least one q-gram with `record`.
///
/// Entries are ordered by descending similarity, equal similarities by
/// ascending reference-set index, and cut to at most `limit` entries.
pub fn rank_reference_sets(
    record: &QGramSet,
    pool: &ReferenceSetPool,
    limit: usize,
) -> Vec<RankedReference> {
    let mut ranked: Vec<RankedReference> = pool
        .iter()
        .filter(|set| !set.members.is_disjoint(record))
        .map(|set| RankedReference {
            index: set.index,
            similarity: jaccard(record, &set.members),
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.similarity
            .total_cmp(&a.similarity)
            .then_with(|| a.index.cmp(&b.index))
    });
    ranked.truncate(limit);
    ranked
}

/// Rank a batch of records (parallel if `use_parallel = true`).
///
/// The pool is only read, so records are ranked independently and the result
/// order matches `records`.
pub(crate) fn rank_records<'a, I>(
    records: I,
    pool: &ReferenceSetPool,
    limit: usize,
    use_parallel: bool,
) -> Vec<Vec<RankedReference>>
where
    I: IntoIterator<Item = &'a QGramSet>,
{
    let records: Vec<&QGramSet> = records.into_iter().collect();
    if use_parallel {
        records
            .par_iter()
            .map(|qgrams| rank_reference_sets(qgrams, pool, limit))
            .collect()
    } else {
        records
            .iter()
            .map(|qgrams| rank_reference_sets(qgrams, pool, limit))
            .collect()
    }
}
