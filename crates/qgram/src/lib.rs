//! # RSE q-grams
//!
//! Turns sensitive attribute text into sets of fixed-length substrings
//! ("q-grams") and enumerates the q-gram universe that reference sets are
//! drawn from.
//!
//! ## Contract
//!
//! - Pure functions of `(input, config)`: no I/O and no global state.
//! - Normalization is trim, lowercase, drop whitespace. The same value
//!   always yields the same [`QGramSet`].
//! - A [`QGramSet`] iterates in sorted order, so every consumer that walks
//!   one is deterministic.
//!
//! ## Example
//!
//! ```
//! use qgram::{record_qgrams, QGramConfig};
//!
//! let cfg = QGramConfig::default();
//! let alphabet = cfg.alphabet().q_grams(cfg.q).unwrap();
//! assert_eq!(alphabet.len(), 26 * 26);
//!
//! let qs = record_qgrams(&["John", "Smith"], cfg.q).unwrap();
//! assert!(qs.contains("jo") && qs.contains("th"));
//! ```

mod alphabet;
mod config;
mod extract;

use std::collections::BTreeSet;

pub use crate::alphabet::Alphabet;
pub use crate::config::{QGramConfig, QGramError};
pub use crate::extract::{extract_qgrams, normalize_value, record_qgrams};

/// A fixed-length substring of a normalized attribute value.
pub type QGram = String;

/// Unordered, duplicate-free collection of q-grams with sorted iteration.
pub type QGramSet = BTreeSet<QGram>;
