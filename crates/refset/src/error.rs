//! Error types produced by the reference-set crate.
//!
//! | Error | Category |
//! |-------|----------|
//! | [`InvalidConfig*`](RefSetError::InvalidConfigRLength) | Configuration |
//! | [`CoverageExhausted`](RefSetError::CoverageExhausted) | Generation gave up |
//! | [`Format`](RefSetError::Format) | Malformed reference-set or frequency row |
//! | [`Io`](RefSetError::Io) | File or stream failure |
//! | [`CardinalityMismatch`](RefSetError::CardinalityMismatch), [`DuplicateReferenceSet`](RefSetError::DuplicateReferenceSet), [`ViewMismatch`](RefSetError::ViewMismatch), [`QGramLength`](RefSetError::QGramLength), [`IndexMismatch`](RefSetError::IndexMismatch) | Pool invariant violated |
//!
//! Invariant violations are never recoverable. They carry the offending
//! reference-set index so the run can be aborted with full context.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RefSetError {
    #[error("invalid config: r_length must be >= 1 (got {r_length})")]
    InvalidConfigRLength { r_length: usize },

    #[error("invalid config: k must be >= 1 (got {k})")]
    InvalidConfigK { k: usize },

    #[error("invalid config: max_attempts must be >= 1 (got {max_attempts})")]
    InvalidConfigAttempts { max_attempts: usize },

    #[error("alphabet is empty")]
    EmptyAlphabet,

    #[error("alphabet contains q-gram {qgram:?} more than once")]
    DuplicateQGram { qgram: String },

    #[error("alphabet of {alphabet} q-grams cannot fill reference sets of length {r_length}")]
    AlphabetTooSmall { alphabet: usize, r_length: usize },

    /// The generator could not find a new, non-duplicate reference set for
    /// the lowest open coverage bucket.
    #[error(
        "coverage exhausted: no new reference set for bucket {bucket} after {attempts} attempts ({generated} sets generated)"
    )]
    CoverageExhausted {
        bucket: usize,
        attempts: usize,
        generated: usize,
    },

    #[error("malformed row at line {line}: {message}")]
    Format { line: u64, message: String },

    /// `path` is `None` when the failure came from a caller-supplied stream.
    #[error("i/o failure{}: {message}", on_path(path))]
    Io {
        path: Option<PathBuf>,
        message: String,
    },

    #[error("reference set pool is empty")]
    EmptyPool,

    #[error("reference set {index} has {actual} members, expected {expected}")]
    CardinalityMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("reference set {index} duplicates reference set {other}")]
    DuplicateReferenceSet { index: usize, other: usize },

    #[error("reference set {index}: weighted members disagree with its q-gram set")]
    ViewMismatch { index: usize },

    #[error("reference set {index}: q-gram {qgram:?} does not have length {expected}")]
    QGramLength {
        index: usize,
        qgram: String,
        expected: usize,
    },

    #[error("reference set at position {position} carries index {index}")]
    IndexMismatch { position: usize, index: usize },
}

fn on_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" on {}", p.display()))
        .unwrap_or_default()
}

impl RefSetError {
    /// Attach `path` to an [`Io`](RefSetError::Io) error that lacks one.
    pub fn at_path(self, path: &Path) -> Self {
        match self {
            RefSetError::Io { path: None, message } => RefSetError::Io {
                path: Some(path.to_path_buf()),
                message,
            },
            other => other,
        }
    }
}

impl From<csv::Error> for RefSetError {
    fn from(err: csv::Error) -> Self {
        match err.position() {
            Some(pos) => RefSetError::Format {
                line: pos.line(),
                message: err.to_string(),
            },
            None => RefSetError::Io {
                path: None,
                message: err.to_string(),
            },
        }
    }
}

impl From<std::io::Error> for RefSetError {
    fn from(err: std::io::Error) -> Self {
        RefSetError::Io {
            path: None,
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_context() {
        let err = RefSetError::CardinalityMismatch {
            index: 7,
            expected: 10,
            actual: 9,
        };
        let msg = err.to_string();
        assert!(msg.contains("reference set 7"));
        assert!(msg.contains("expected 10"));
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.csv");
        let err: RefSetError = io.into();
        assert!(matches!(
            &err,
            RefSetError::Io { path: None, message } if message.contains("missing.csv")
        ));

        let err = err.at_path(Path::new("data/freq.csv"));
        assert!(err.to_string().contains("on data/freq.csv"));
    }

    #[test]
    fn at_path_leaves_other_errors_alone() {
        let err = RefSetError::EmptyPool.at_path(Path::new("refs.csv"));
        assert_eq!(err, RefSetError::EmptyPool);
    }
}
