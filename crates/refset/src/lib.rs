//! # RSE reference sets
//!
//! Builds and hardens the public encoding basis shared by both linkage
//! parties: a pool of `m` q-gram sets of equal length.
//!
//! ## Pipeline
//!
//! 1.  **Generation**: [`generate_reference_sets`] draws sets from an
//!     alphabet so that every q-gram occurs in at least `k` of them, with no
//!     two sets equal. Retries are bounded by
//!     [`GeneratorConfig::max_attempts`].
//!
//! 2.  **Weighing**: [`weigh_reference_sets`] attaches public-corpus
//!     frequencies (unseen q-grams count as 1) and scores each set by its
//!     mean frequency.
//!
//! 3.  **Rank swapping**: [`rank_swap`] trades q-grams between the lowest
//!     and highest scoring sets until no admissible trade remains, shrinking
//!     the score spread that a frequency attack would exploit.
//!
//! 4.  **Freezing**: [`WeightedPool::freeze`] re-checks cardinality, view
//!     agreement and uniqueness and returns the immutable
//!     [`ReferenceSetPool`] the encoder reads.
//!
//! Ownership moves forward through the stages: the generator returns the
//! pool, weighing consumes it, the optimizer mutates the weighted pool it
//! is lent, and freezing consumes that.
//!
//! ## Example
//!
//! ```
//! use refset::{generate_reference_sets, rank_swap, weigh_reference_sets};
//! use refset::{FrequencyTable, GeneratorConfig};
//!
//! let alphabet = qgram::Alphabet::new(false, true, false).q_grams(2).unwrap();
//! let cfg = GeneratorConfig::new().with_r_length(5).with_k(2).with_seed(7);
//! let pool = generate_reference_sets(&alphabet, &cfg).unwrap();
//!
//! let table: FrequencyTable = [("00", 90), ("11", 40)].into_iter().collect();
//! let mut weighted = weigh_reference_sets(pool, &table);
//! let report = rank_swap(&mut weighted).unwrap();
//! assert!(report.final_range <= report.initial_range);
//!
//! let frozen = weighted.freeze(Some(2)).unwrap();
//! assert_eq!(frozen.r_length(), 5);
//! ```

mod config;
mod error;
mod generator;
pub mod io;
mod pool;
mod swap;
mod weigher;

pub use crate::config::{seed_from_str, GeneratorConfig, SwapConfig};
pub use crate::error::RefSetError;
pub use crate::generator::generate_reference_sets;
pub use crate::pool::{
    mean_frequency, ReferenceSet, ReferenceSetPool, ScoreExtremes, WeightedPool, WeightedQGram,
    WeightedReferenceSet,
};
pub use crate::swap::{rank_swap, SwapReport};
pub use crate::weigher::{weigh_reference_sets, FrequencyTable, DEFAULT_FREQUENCY};
