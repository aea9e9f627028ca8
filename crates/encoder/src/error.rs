//! Error types produced by the signature encoder.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EncodeError {
    #[error("invalid config: k must be >= 1 (got {k})")]
    InvalidConfigK { k: usize },

    #[error("invalid config: init_sign_length must be >= 1 (got {init_sign_length})")]
    InvalidConfigSignLength { init_sign_length: usize },

    #[error("reference set pool is empty")]
    EmptyPool,

    #[error("dataset {dataset:?} has no records")]
    EmptyDataset { dataset: String },

    /// The record shares no q-gram with any reference set.
    #[error("record {record_id:?} in dataset {dataset:?} has no reference set with nonzero similarity")]
    EmptySignature { dataset: String, record_id: String },

    #[error("every record was excluded; no signature length can be chosen")]
    NoEncodableRecords,

    #[error(
        "record {record_id:?} in dataset {dataset:?} ranks {actual} reference sets, needs {expected}"
    )]
    SignatureTooShort {
        dataset: String,
        record_id: String,
        expected: usize,
        actual: usize,
    },

    #[error("bit position {position} is outside a signature of length {len}")]
    PositionOutOfRange { position: usize, len: usize },

    #[error("invalid signature character {found:?} at offset {offset}")]
    InvalidBitString { offset: usize, found: char },
}
