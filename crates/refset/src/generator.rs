//! Coverage-guaranteeing reference-set generation.
//!
//! Every alphabet q-gram sits in a bucket keyed by the number of generated
//! sets it already belongs to. Each round draws a new set from the lowest
//! bucket still below `k`, topping it up from the next bucket when the
//! lowest one runs short, and promotes every drawn q-gram one bucket up.
//! Each accepted set promotes at least one q-gram from a bucket below `k`,
//! so the loop ends once every q-gram has reached coverage `k`.

use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

use fastrand::Rng;
use qgram::{QGram, QGramSet};
use tracing::{debug, info, warn, Level};

use crate::config::GeneratorConfig;
use crate::error::RefSetError;
use crate::pool::ReferenceSetPool;

/// Generate a pool in which every alphabet q-gram occurs in at least
/// `cfg.k` sets of exactly `cfg.r_length` members.
pub fn generate_reference_sets(
    alphabet: &[QGram],
    cfg: &GeneratorConfig,
) -> Result<ReferenceSetPool, RefSetError> {
    let start = Instant::now();
    let span = tracing::span!(
        Level::INFO,
        "refset.generate",
        alphabet = alphabet.len(),
        r_length = cfg.r_length,
        k = cfg.k
    );
    let _guard = span.enter();

    match generate_inner(alphabet, cfg) {
        Ok((pool, overflow)) => {
            info!(
                sets = pool.len(),
                overflow,
                elapsed_micros = start.elapsed().as_micros(),
                "generate_success"
            );
            Ok(pool)
        }
        Err(err) => {
            warn!(
                error = %err,
                elapsed_micros = start.elapsed().as_micros(),
                "generate_failure"
            );
            Err(err)
        }
    }
}

fn generate_inner(
    alphabet: &[QGram],
    cfg: &GeneratorConfig,
) -> Result<(ReferenceSetPool, usize), RefSetError> {
    cfg.validate()?;
    validate_alphabet(alphabet, cfg.r_length)?;

    let r = cfg.r_length;
    let mut rng = Rng::with_seed(cfg.seed);
    let mut buckets = CoverageBuckets::new(alphabet);
    let mut generated: Vec<QGramSet> = Vec::new();
    let mut seen: HashSet<QGramSet> = HashSet::new();

    while let Some(level) = buckets.lowest_open(cfg.k) {
        let lowest = buckets.bucket(level).to_vec();
        let filler = buckets.bucket(level + 1).to_vec();

        let mut attempt = 0;
        let (draw, members) = loop {
            attempt += 1;
            if attempt > cfg.max_attempts {
                return Err(RefSetError::CoverageExhausted {
                    bucket: level,
                    attempts: cfg.max_attempts,
                    generated: generated.len(),
                });
            }
            let Some(draw) = propose(&mut rng, &lowest, &filler, r, attempt) else {
                // Too few q-grams left to fill a set; resampling cannot help.
                return Err(RefSetError::CoverageExhausted {
                    bucket: level,
                    attempts: attempt,
                    generated: generated.len(),
                });
            };
            let members = draw.members();
            if !seen.contains(&members) {
                break (draw, members);
            }
        };

        if members.len() != r {
            return Err(RefSetError::CardinalityMismatch {
                index: generated.len(),
                expected: r,
                actual: members.len(),
            });
        }
        buckets.promote(level, &draw.from_lowest);
        buckets.promote(level + 1, &draw.from_filler);
        debug!(index = generated.len(), level, attempt, "reference_set_accepted");

        seen.insert(members.clone());
        generated.push(members);
    }

    let overflow = buckets.bucket(cfg.k + 1).len();
    if overflow > 0 {
        debug!(overflow, "q-grams promoted past k");
    }
    Ok((ReferenceSetPool::from_sets(generated)?, overflow))
}

fn validate_alphabet(alphabet: &[QGram], r_length: usize) -> Result<(), RefSetError> {
    if alphabet.is_empty() {
        return Err(RefSetError::EmptyAlphabet);
    }
    let mut unique = HashSet::with_capacity(alphabet.len());
    for q in alphabet {
        if !unique.insert(q) {
            return Err(RefSetError::DuplicateQGram { qgram: q.clone() });
        }
    }
    if alphabet.len() < r_length {
        return Err(RefSetError::AlphabetTooSmall {
            alphabet: alphabet.len(),
            r_length,
        });
    }
    Ok(())
}

/// Candidate set split by the bucket each member came from.
struct Draw {
    from_lowest: Vec<QGram>,
    from_filler: Vec<QGram>,
}

impl Draw {
    fn members(&self) -> QGramSet {
        self.from_lowest
            .iter()
            .chain(self.from_filler.iter())
            .cloned()
            .collect()
    }
}

/// Sample one candidate set. `None` when the buckets cannot supply `r`
/// q-grams at all.
fn propose(
    rng: &mut Rng,
    lowest: &[QGram],
    filler: &[QGram],
    r: usize,
    attempt: usize,
) -> Option<Draw> {
    if lowest.len() >= r {
        // A lowest bucket of exactly `r` always yields the same set; on a
        // retry keep one of its q-grams and take the rest from the filler.
        if lowest.len() == r && attempt > 1 && r > 1 && filler.len() >= r - 1 {
            return Some(Draw {
                from_lowest: sample(rng, lowest, 1),
                from_filler: sample(rng, filler, r - 1),
            });
        }
        return Some(Draw {
            from_lowest: sample(rng, lowest, r),
            from_filler: Vec::new(),
        });
    }

    let slack = r - lowest.len();
    if filler.len() < slack {
        return None;
    }
    Some(Draw {
        from_lowest: lowest.to_vec(),
        from_filler: sample(rng, filler, slack),
    })
}

/// Uniform sample of `n` distinct elements, or all of them when `n` is larger.
fn sample(rng: &mut Rng, pool: &[QGram], n: usize) -> Vec<QGram> {
    rng.choose_multiple(pool.iter().cloned(), n)
}

/// Q-grams grouped by how many generated sets contain them.
struct CoverageBuckets {
    buckets: BTreeMap<usize, Vec<QGram>>,
}

impl CoverageBuckets {
    fn new(alphabet: &[QGram]) -> Self {
        let mut buckets = BTreeMap::new();
        buckets.insert(0, alphabet.to_vec());
        Self { buckets }
    }

    fn bucket(&self, level: usize) -> &[QGram] {
        self.buckets.get(&level).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Lowest non-empty bucket still below `k`.
    fn lowest_open(&self, k: usize) -> Option<usize> {
        self.buckets
            .iter()
            .find(|(level, qs)| **level < k && !qs.is_empty())
            .map(|(level, _)| *level)
    }

    /// Move `qgrams` from `level` to `level + 1`, preserving draw order.
    fn promote(&mut self, level: usize, qgrams: &[QGram]) {
        if qgrams.is_empty() {
            return;
        }
        if let Some(bucket) = self.buckets.get_mut(&level) {
            bucket.retain(|q| !qgrams.contains(q));
            if bucket.is_empty() {
                self.buckets.remove(&level);
            }
        }
        self.buckets
            .entry(level + 1)
            .or_default()
            .extend(qgrams.iter().cloned());
    }
}
