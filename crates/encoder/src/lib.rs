//! # RSE signature encoder
//!
//! Turns record q-gram sets into fixed-length bit-array signatures against a
//! frozen reference-set pool of size `m`.
//!
//! ## Pipeline
//!
//! 1.  **Ranking**: every record is compared with every reference set by
//!     Jaccard similarity. Sets sharing no q-gram are skipped; the rest are
//!     ordered by descending similarity (ties by index) and cut to
//!     `init_sign_length` entries.
//!
//! 2.  **Uniform bit budget**: `num_1_bits` is the shortest ranked list
//!     across *both* datasets. It is the only step coupling the two.
//!
//! 3.  **Encoding**: each record sets the bits of its top `num_1_bits`
//!     reference sets, so every signature has the same Hamming weight.
//!
//! ## Example
//!
//! ```
//! use encoder::{encode_datasets, Dataset, EncoderConfig, Record};
//! use refset::ReferenceSetPool;
//!
//! let set = |items: &[&str]| -> qgram::QGramSet { items.iter().map(|s| s.to_string()).collect() };
//! let pool = ReferenceSetPool::from_sets(vec![
//!     set(&["jo", "xx"]),
//!     set(&["oh", "yy"]),
//!     set(&["sm", "mi"]),
//! ])
//! .unwrap();
//!
//! let left = Dataset::new("a", vec![Record::new("1", set(&["jo", "oh", "hn"]))]);
//! let right = Dataset::new("b", vec![Record::new("1", set(&["sm", "mi", "jo"]))]);
//!
//! let encoded = encode_datasets(&left, &right, &pool, &EncoderConfig::default()).unwrap();
//! assert_eq!(encoded.report.num_1_bits, 2);
//! assert_eq!(encoded.left["1"].to_bit_string(), "110");
//! ```

mod config;
mod error;
mod ranking;
mod signature;
mod similarity;

use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

use qgram::QGramSet;
use refset::ReferenceSetPool;
use serde::{Deserialize, Serialize};
use tracing::{info, warn, Level};

pub use crate::config::{EmptySignaturePolicy, EncoderConfig};
pub use crate::error::EncodeError;
pub use crate::ranking::{rank_reference_sets, RankedReference};
pub use crate::signature::Signature;
pub use crate::similarity::jaccard;

use crate::ranking::rank_records;

/// A record reduced to its identifier and q-gram set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    pub id: String,
    pub qgrams: QGramSet,
}

impl Record {
    pub fn new(id: impl Into<String>, qgrams: QGramSet) -> Self {
        Self {
            id: id.into(),
            qgrams,
        }
    }
}

/// One side of the linkage. Record ids are expected to be unique.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dataset {
    pub name: String,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Length statistics of record q-gram sets across both datasets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct QGramLengthStats {
    pub shortest: usize,
    pub longest: usize,
    pub average: f64,
}

impl QGramLengthStats {
    /// `None` when every set is empty.
    fn collect<'a, I: IntoIterator<Item = &'a QGramSet>>(sets: I) -> Option<Self> {
        let mut shortest = usize::MAX;
        let mut longest = 0;
        let mut total = 0usize;
        let mut count = 0usize;
        for len in sets.into_iter().map(QGramSet::len).filter(|&len| len > 0) {
            shortest = shortest.min(len);
            longest = longest.max(len);
            total += len;
            count += 1;
        }
        (count > 0).then(|| Self {
            shortest,
            longest,
            average: total as f64 / count as f64,
        })
    }
}

/// A record dropped under [`EmptySignaturePolicy::Exclude`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExcludedRecord {
    pub dataset: String,
    pub record_id: String,
}

/// Summary of one encoding run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EncodeReport {
    /// Hamming weight shared by every signature.
    pub num_1_bits: usize,
    pub init_sign_length: usize,
    /// Signature length `m`.
    pub pool_size: usize,
    pub left_encoded: usize,
    pub right_encoded: usize,
    /// Record ids present in both encoded datasets.
    pub shared_ids: usize,
    pub excluded: Vec<ExcludedRecord>,
    pub qgram_lengths: Option<QGramLengthStats>,
}

/// Signatures for both datasets, keyed by record id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EncodedDatasets {
    pub left: BTreeMap<String, Signature>,
    pub right: BTreeMap<String, Signature>,
    pub report: EncodeReport,
}

/// Encode both datasets against `pool` with a shared Hamming weight.
///
/// Encoding is all-or-nothing: any error discards every signature.
pub fn encode_datasets(
    left: &Dataset,
    right: &Dataset,
    pool: &ReferenceSetPool,
    cfg: &EncoderConfig,
) -> Result<EncodedDatasets, EncodeError> {
    let start = Instant::now();
    let span = tracing::span!(
        Level::INFO,
        "encoder.encode",
        left = left.len(),
        right = right.len(),
        m = pool.len()
    );
    let _guard = span.enter();

    match encode_inner(left, right, pool, cfg) {
        Ok(encoded) => {
            let report = &encoded.report;
            if let Some(lengths) = &report.qgram_lengths {
                info!(
                    shortest = lengths.shortest,
                    longest = lengths.longest,
                    average = lengths.average,
                    "record_qgram_lengths"
                );
            }
            if !report.excluded.is_empty() {
                warn!(excluded = report.excluded.len(), "records without signature excluded");
            }
            info!(
                num_1_bits = report.num_1_bits,
                init_sign_length = report.init_sign_length,
                left_encoded = report.left_encoded,
                right_encoded = report.right_encoded,
                shared_ids = report.shared_ids,
                elapsed_micros = start.elapsed().as_micros(),
                "encode_success"
            );
            Ok(encoded)
        }
        Err(err) => {
            warn!(
                error = %err,
                elapsed_micros = start.elapsed().as_micros(),
                "encode_failure"
            );
            Err(err)
        }
    }
}

fn encode_inner(
    left: &Dataset,
    right: &Dataset,
    pool: &ReferenceSetPool,
    cfg: &EncoderConfig,
) -> Result<EncodedDatasets, EncodeError> {
    cfg.validate()?;
    if pool.is_empty() {
        return Err(EncodeError::EmptyPool);
    }
    for dataset in [left, right] {
        if dataset.is_empty() {
            return Err(EncodeError::EmptyDataset {
                dataset: dataset.name.clone(),
            });
        }
    }

    let all_records = left.records.iter().chain(&right.records);
    let qgram_lengths = QGramLengthStats::collect(all_records.map(|r| &r.qgrams));
    let init_sign_length = cfg.init_sign_length_for(qgram_lengths.map_or(0, |s| s.shortest));

    let mut excluded = Vec::new();
    let mut ranked = Vec::with_capacity(2);
    for dataset in [left, right] {
        let lists = rank_records(
            dataset.records.iter().map(|r| &r.qgrams),
            pool,
            init_sign_length,
            cfg.use_parallel,
        );
        let mut kept = Vec::with_capacity(lists.len());
        for (record, list) in dataset.records.iter().zip(lists) {
            if !list.is_empty() {
                kept.push((record, list));
                continue;
            }
            match cfg.empty_signature_policy {
                EmptySignaturePolicy::Fail => {
                    return Err(EncodeError::EmptySignature {
                        dataset: dataset.name.clone(),
                        record_id: record.id.clone(),
                    });
                }
                EmptySignaturePolicy::Exclude => excluded.push(ExcludedRecord {
                    dataset: dataset.name.clone(),
                    record_id: record.id.clone(),
                }),
            }
        }
        ranked.push((dataset, kept));
    }

    let num_1_bits = ranked
        .iter()
        .flat_map(|(_, kept)| kept.iter().map(|(_, list)| list.len()))
        .min()
        .ok_or(EncodeError::NoEncodableRecords)?;

    let m = pool.len();
    let mut signatures = Vec::with_capacity(2);
    for (dataset, kept) in ranked {
        let mut out = BTreeMap::new();
        for (record, list) in kept {
            if list.len() < num_1_bits {
                return Err(EncodeError::SignatureTooShort {
                    dataset: dataset.name.clone(),
                    record_id: record.id.clone(),
                    expected: num_1_bits,
                    actual: list.len(),
                });
            }
            let positions: Vec<usize> = list[..num_1_bits].iter().map(|r| r.index).collect();
            out.insert(record.id.clone(), Signature::from_positions(m, &positions)?);
        }
        signatures.push(out);
    }

    let right_sigs = signatures.pop().unwrap_or_default();
    let left_sigs = signatures.pop().unwrap_or_default();
    let left_ids: HashSet<&String> = left_sigs.keys().collect();
    let shared_ids = right_sigs.keys().filter(|id| left_ids.contains(id)).count();

    Ok(EncodedDatasets {
        report: EncodeReport {
            num_1_bits,
            init_sign_length,
            pool_size: m,
            left_encoded: left_sigs.len(),
            right_encoded: right_sigs.len(),
            shared_ids,
            excluded,
            qgram_lengths,
        },
        left: left_sigs,
        right: right_sigs,
    })
}
