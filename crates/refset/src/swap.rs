//! Frequency-based rank swapping.
//!
//! Reference sets whose mean q-gram frequency sits far from the rest are
//! statistically distinguishable. Each round takes the globally lowest and
//! highest weighted sets and trades one low-frequency q-gram of the low set
//! for one higher-frequency q-gram of the high set, provided the pair's
//! weight range shrinks and neither result duplicates a set in the pool.
//! The first round without an admissible trade ends optimization; the next
//! most extreme pair is never tried.

use std::collections::{BTreeSet, HashSet};
use std::time::Instant;

use qgram::QGramSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, Level};

use crate::error::RefSetError;
use crate::pool::{mean_frequency, WeightedPool, WeightedQGram, WeightedReferenceSet};

/// Outcome of [`rank_swap`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SwapReport {
    /// Accepted swaps.
    pub modifications: usize,
    /// Indices of every set touched by at least one swap.
    pub modified_sets: BTreeSet<usize>,
    pub pool_size: usize,
    /// Global weight spread before the first swap.
    pub initial_range: f64,
    /// Global weight spread after the last swap.
    pub final_range: f64,
}

impl SwapReport {
    /// Share of the pool touched by at least one swap, in `[0, 1]`.
    pub fn fraction_modified(&self) -> f64 {
        if self.pool_size == 0 {
            return 0.0;
        }
        self.modified_sets.len() as f64 / self.pool_size as f64
    }
}

/// A trade between the current min and max sets, with post-swap state.
#[derive(Debug)]
struct Swap {
    min_members: Vec<WeightedQGram>,
    max_members: Vec<WeightedQGram>,
    min_set: QGramSet,
    max_set: QGramSet,
    min_score: f64,
    max_score: f64,
}

/// Shrink the spread of weighted scores in place.
///
/// Cardinality of every set and pairwise uniqueness across the pool hold
/// after every accepted swap. Fails when a set's index does not match its
/// position, or if a swap would break cardinality; both indicate a
/// corrupted pool.
pub fn rank_swap(pool: &mut WeightedPool) -> Result<SwapReport, RefSetError> {
    let start = Instant::now();
    let span = tracing::span!(Level::INFO, "refset.swap", sets = pool.len());
    let _guard = span.enter();

    pool.check_positions()?;

    let initial_range = pool.extremes().map(|e| e.range()).unwrap_or(0.0);
    let mut present: HashSet<QGramSet> = pool.sets.iter().map(|s| s.set.clone()).collect();
    let mut modifications = 0;
    let mut modified_sets = BTreeSet::new();

    while let Some(ext) = pool.extremes() {
        if ext.min_index == ext.max_index {
            break;
        }
        let Some(swap) = find_swap(
            &pool.sets[ext.min_index],
            &pool.sets[ext.max_index],
            &present,
        ) else {
            debug!(
                min_index = ext.min_index,
                max_index = ext.max_index,
                "no admissible swap"
            );
            break;
        };

        for (index, members) in [
            (ext.min_index, &swap.min_members),
            (ext.max_index, &swap.max_members),
        ] {
            if members.len() != pool.r_length {
                return Err(RefSetError::CardinalityMismatch {
                    index,
                    expected: pool.r_length,
                    actual: members.len(),
                });
            }
        }

        debug!(
            min_index = ext.min_index,
            max_index = ext.max_index,
            min_score = swap.min_score,
            max_score = swap.max_score,
            "swap_accepted"
        );
        let Swap {
            min_members,
            max_members,
            min_set,
            max_set,
            min_score,
            max_score,
        } = swap;
        replace_set(&mut pool.sets[ext.min_index], &mut present, min_members, min_set, min_score);
        replace_set(&mut pool.sets[ext.max_index], &mut present, max_members, max_set, max_score);
        modifications += 1;
        modified_sets.insert(ext.min_index);
        modified_sets.insert(ext.max_index);
    }

    let report = SwapReport {
        modifications,
        modified_sets,
        pool_size: pool.len(),
        initial_range,
        final_range: pool.extremes().map(|e| e.range()).unwrap_or(0.0),
    };
    info!(
        modifications = report.modifications,
        modified_sets = report.modified_sets.len(),
        percent_modified = report.fraction_modified() * 100.0,
        initial_range = report.initial_range,
        final_range = report.final_range,
        elapsed_micros = start.elapsed().as_micros(),
        "swap_success"
    );
    Ok(report)
}

fn replace_set(
    target: &mut WeightedReferenceSet,
    present: &mut HashSet<QGramSet>,
    members: Vec<WeightedQGram>,
    set: QGramSet,
    score: f64,
) {
    present.remove(&target.set);
    present.insert(set.clone());
    target.weighted = members;
    target.set = set;
    target.weighted_score = score;
}

/// First admissible trade for the pair, scanning low-set members by
/// ascending frequency and high-set members by descending frequency.
fn find_swap(
    min: &WeightedReferenceSet,
    max: &WeightedReferenceSet,
    present: &HashSet<QGramSet>,
) -> Option<Swap> {
    let mut ascending: Vec<&WeightedQGram> = min.weighted.iter().collect();
    ascending.sort_by(|a, b| a.frequency.cmp(&b.frequency).then_with(|| a.qgram.cmp(&b.qgram)));
    let mut descending: Vec<&WeightedQGram> = max.weighted.iter().collect();
    descending.sort_by(|a, b| b.frequency.cmp(&a.frequency).then_with(|| b.qgram.cmp(&a.qgram)));

    let old_range = max.weighted_score - min.weighted_score;

    for low in &ascending {
        if max.set.contains(&low.qgram) {
            continue;
        }
        for high in &descending {
            // Descending order: nothing further can beat `low`.
            if high.frequency <= low.frequency {
                break;
            }
            if min.set.contains(&high.qgram) {
                continue;
            }

            let min_members = exchange(&min.weighted, low, high);
            let max_members = exchange(&max.weighted, high, low);
            let min_score = mean_frequency(&min_members);
            let max_score = mean_frequency(&max_members);
            if (max_score - min_score).abs() >= old_range {
                continue;
            }

            let min_set: QGramSet = min_members.iter().map(|w| w.qgram.clone()).collect();
            let max_set: QGramSet = max_members.iter().map(|w| w.qgram.clone()).collect();
            if present.contains(&min_set) || present.contains(&max_set) {
                continue;
            }
            return Some(Swap {
                min_members,
                max_members,
                min_set,
                max_set,
                min_score,
                max_score,
            });
        }
    }
    None
}

/// Copy of `members` with `out` replaced by `incoming`.
fn exchange(
    members: &[WeightedQGram],
    out: &WeightedQGram,
    incoming: &WeightedQGram,
) -> Vec<WeightedQGram> {
    members
        .iter()
        .map(|w| {
            if w.qgram == out.qgram {
                incoming.clone()
            } else {
                w.clone()
            }
        })
        .collect()
}
