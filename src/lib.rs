//! Workspace umbrella crate for Reference Set Encoding (RSE).
//!
//! This crate stitches reference-set generation, frequency rebalancing and
//! signature encoding together so callers can run a complete linkage
//! encoding with a single entry point. Each stage also stays reachable on
//! its own through the re-exports below.

pub mod config;
pub mod dataset;
pub mod output;

pub use encoder::{
    Dataset, EmptySignaturePolicy, EncodeError, EncodeReport, EncodedDatasets, EncoderConfig,
    ExcludedRecord, QGramLengthStats, RankedReference, Record, Signature, jaccard,
    rank_reference_sets,
};
pub use qgram::{
    Alphabet, QGram, QGramConfig, QGramError, QGramSet, extract_qgrams, normalize_value,
    record_qgrams,
};
pub use refset::{
    DEFAULT_FREQUENCY, FrequencyTable, GeneratorConfig, RefSetError, ReferenceSet,
    ReferenceSetPool, ScoreExtremes, SwapConfig, SwapReport, WeightedPool, generate_reference_sets,
    rank_swap, seed_from_str, weigh_reference_sets,
};
pub use refset::io::{
    read_frequency_table, read_frequency_table_path, read_reference_sets,
    read_reference_sets_path, write_reference_sets, write_reference_sets_path,
};

pub use crate::config::{ConfigLoadError, RseConfig};
pub use crate::dataset::{DatasetSpec, LoadedDataset, check_attributes, load_dataset};

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

/// Errors that can occur while running an encoding end to end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    QGram(QGramError),
    RefSet(RefSetError),
    Encode(EncodeError),
    /// A file could not be opened, created or written.
    Io { path: PathBuf, message: String },
    /// A dataset table row is malformed.
    Table {
        path: PathBuf,
        line: u64,
        message: String,
    },
    /// The two datasets name different sensitive attributes.
    AttributeMismatch {
        left: Vec<String>,
        right: Vec<String>,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::QGram(err) => write!(f, "q-gram failure: {err}"),
            PipelineError::RefSet(err) => write!(f, "reference set failure: {err}"),
            PipelineError::Encode(err) => write!(f, "encoding failure: {err}"),
            PipelineError::Io { path, message } => {
                write!(f, "i/o failure on {}: {message}", path.display())
            }
            PipelineError::Table {
                path,
                line,
                message,
            } => write!(f, "malformed table {} at line {line}: {message}", path.display()),
            PipelineError::AttributeMismatch { left, right } => write!(
                f,
                "datasets use different attributes: {left:?} vs {right:?}"
            ),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::QGram(err) => Some(err),
            PipelineError::RefSet(err) => Some(err),
            PipelineError::Encode(err) => Some(err),
            PipelineError::Io { .. }
            | PipelineError::Table { .. }
            | PipelineError::AttributeMismatch { .. } => None,
        }
    }
}

impl From<QGramError> for PipelineError {
    fn from(value: QGramError) -> Self {
        PipelineError::QGram(value)
    }
}

impl From<RefSetError> for PipelineError {
    fn from(value: RefSetError) -> Self {
        PipelineError::RefSet(value)
    }
}

impl From<EncodeError> for PipelineError {
    fn from(value: EncodeError) -> Self {
        PipelineError::Encode(value)
    }
}

/// Build the alphabet described by `qgram_cfg` and generate a pool over it.
pub fn generate_reference_pool(
    qgram_cfg: &QGramConfig,
    generator_cfg: &GeneratorConfig,
) -> Result<ReferenceSetPool, PipelineError> {
    qgram_cfg.validate()?;
    let alphabet = qgram_cfg.alphabet();
    let qgrams = alphabet.q_grams(qgram_cfg.q)?;
    info!(symbols = alphabet.len(), qgrams = qgrams.len(), q = qgram_cfg.q, "alphabet_built");
    Ok(generate_reference_sets(&qgrams, generator_cfg)?)
}

/// What weighing and swapping did to a pool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreparationReport {
    pub initial: Option<ScoreExtremes>,
    pub final_extremes: Option<ScoreExtremes>,
    /// `None` when swapping was disabled.
    pub swap: Option<SwapReport>,
}

/// Weigh `raw_pool`, rank-swap it when enabled, and freeze the result.
///
/// Freezing re-checks every member against q-gram length `q`.
pub fn prepare_reference_pool(
    raw_pool: ReferenceSetPool,
    table: &FrequencyTable,
    swap_cfg: &SwapConfig,
    q: usize,
) -> Result<(ReferenceSetPool, PreparationReport), PipelineError> {
    let mut weighted = weigh_reference_sets(raw_pool, table);
    let initial = weighted.extremes();
    let swap = if swap_cfg.enabled {
        Some(rank_swap(&mut weighted)?)
    } else {
        None
    };
    let final_extremes = weighted.extremes();
    let pool = weighted.freeze(Some(q))?;
    Ok((
        pool,
        PreparationReport {
            initial,
            final_extremes,
            swap,
        },
    ))
}

/// Encode both datasets against a frozen pool.
pub fn encode_datasets(
    left: &Dataset,
    right: &Dataset,
    pool: &ReferenceSetPool,
    cfg: &EncoderConfig,
) -> Result<EncodedDatasets, PipelineError> {
    Ok(encoder::encode_datasets(left, right, pool, cfg)?)
}

/// Outcome of [`run`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    pub preparation: PreparationReport,
    pub encode: EncodeReport,
    pub dropped_a: usize,
    pub dropped_b: usize,
}

/// Run the pipeline a config file describes and write its outputs.
///
/// Nothing is written unless every stage succeeds and every output file
/// has been staged; see [`output::StagedOutputs`].
pub fn run(cfg: &RseConfig) -> Result<(EncodedDatasets, RunSummary), PipelineError> {
    let q = cfg.qgram.q;
    let left = load_dataset("dataset_a", &cfg.dataset_a, q)?;
    let right = load_dataset("dataset_b", &cfg.dataset_b, q)?;
    check_attributes(&left, &right)?;

    let raw_pool = match &cfg.reference_sets.path {
        Some(path) => read_reference_sets_path(path)?,
        None => generate_reference_pool(&cfg.qgram_config(), &cfg.generator_config())?,
    };
    let table = match &cfg.reference_sets.frequency_table {
        Some(path) => read_frequency_table_path(path)?,
        None => FrequencyTable::new(),
    };

    let (pool, preparation) = prepare_reference_pool(raw_pool, &table, &cfg.swap_config(), q)?;
    let encoded = encode_datasets(&left.dataset, &right.dataset, &pool, &cfg.encoder_config())?;

    let mut staged = output::StagedOutputs::new();
    if let Some(path) = &cfg.output.reference_sets {
        staged.stage(path, |file| write_reference_sets(&pool, file))?;
    }
    if let Some(path) = &cfg.output.dataset_a {
        staged.stage(path, |file| output::write_signatures(&encoded.left, file))?;
    }
    if let Some(path) = &cfg.output.dataset_b {
        staged.stage(path, |file| output::write_signatures(&encoded.right, file))?;
    }
    staged.commit()?;

    let summary = RunSummary {
        preparation,
        encode: encoded.report.clone(),
        dropped_a: left.dropped,
        dropped_b: right.dropped,
    };
    Ok((encoded, summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> QGramSet {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn generated_pool_covers_alphabet() {
        let qcfg = QGramConfig::new().with_letters(false).with_digits(true);
        let gcfg = GeneratorConfig::new().with_r_length(8).with_k(2).with_seed(3);
        let pool = generate_reference_pool(&qcfg, &gcfg).unwrap();
        let coverage = pool.coverage();
        assert_eq!(coverage.len(), 100);
        assert!(coverage.values().all(|&c| c >= 2));
    }

    #[test]
    fn invalid_q_is_reported_as_qgram_error() {
        let qcfg = QGramConfig::new().with_q(0);
        let err = generate_reference_pool(&qcfg, &GeneratorConfig::default()).unwrap_err();
        assert_eq!(err, PipelineError::QGram(QGramError::InvalidQ { q: 0 }));
        assert!(err.source().is_some());
    }

    #[test]
    fn preparation_without_swap_keeps_sets() {
        let raw = ReferenceSetPool::from_sets(vec![set(&["aa", "ab"]), set(&["ba", "bb"])]).unwrap();
        let table: FrequencyTable = [("aa", 16), ("ab", 4), ("ba", 1), ("bb", 3)]
            .into_iter()
            .collect();

        let (pool, report) =
            prepare_reference_pool(raw.clone(), &table, &SwapConfig { enabled: false }, 2).unwrap();
        assert_eq!(pool, raw);
        assert!(report.swap.is_none());
        assert_eq!(report.initial, report.final_extremes);

        let (swapped, report) =
            prepare_reference_pool(raw.clone(), &table, &SwapConfig::default(), 2).unwrap();
        assert_ne!(swapped, raw);
        let swap = report.swap.unwrap();
        assert!(swap.modifications >= 1);
        assert!(swap.final_range < swap.initial_range);
    }

    #[test]
    fn wrong_qgram_length_fails_freeze() {
        let raw = ReferenceSetPool::from_sets(vec![set(&["abc"]), set(&["xyz"])]).unwrap();
        let err = prepare_reference_pool(raw, &FrequencyTable::new(), &SwapConfig::default(), 2)
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::RefSet(RefSetError::QGramLength { index: 0, .. })
        ));
    }

    #[test]
    fn display_includes_context() {
        let err = PipelineError::AttributeMismatch {
            left: vec!["first".into()],
            right: vec!["surname".into()],
        };
        assert!(err.to_string().contains("surname"));
    }
}
