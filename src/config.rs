//! YAML configuration file support for RSE runs.
//!
//! A single YAML file describes one complete encoding run: alphabet and
//! q-gram length, reference-set generation, frequency swapping, encoding and
//! the two datasets being linked.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! seed: "42"
//!
//! qgram:
//!   q: 2
//!   letters: true
//!   digits: false
//!   punctuation: false
//!
//! generator:
//!   r_length: 10
//!   k: 3
//!   max_attempts: 10000
//!
//! reference_sets:
//!   path: "ref_sets.csv"          # omit to generate
//!   frequency_table: "freq.csv"   # omit for uniform weights
//!   swap: true
//!
//! encoder:
//!   empty_signature_policy: "fail"
//!   use_parallel: false
//!
//! dataset_a:
//!   path: "a.csv.gz"
//!   id_column: 0
//!   attributes: [1, 2]
//!
//! dataset_b:
//!   path: "b.csv.gz"
//!   id_column: 0
//!   attributes: [1, 2]
//!
//! output:
//!   dataset_a: "a_signatures.csv"
//!   dataset_b: "b_signatures.csv"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use encoder::{EmptySignaturePolicy, EncoderConfig};
use qgram::QGramConfig;
use refset::{GeneratorConfig, SwapConfig, seed_from_str};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dataset::DatasetSpec;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration for one RSE run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct RseConfig {
    /// Configuration format version
    pub version: String,

    /// Free-form PRNG seed; see [`seed_from_str`]
    #[serde(default = "default_seed")]
    pub seed: String,

    #[serde(default)]
    pub qgram: QGramYamlConfig,

    #[serde(default)]
    pub generator: GeneratorYamlConfig,

    #[serde(default)]
    pub reference_sets: ReferenceSetsYamlConfig,

    #[serde(default)]
    pub encoder: EncoderYamlConfig,

    pub dataset_a: DatasetSpec,

    pub dataset_b: DatasetSpec,

    #[serde(default)]
    pub output: OutputYamlConfig,
}

impl RseConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: RseConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        if self.seed.trim().is_empty() {
            return Err(ConfigLoadError::Validation(
                "seed must not be empty".to_string(),
            ));
        }
        self.qgram_config()
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("qgram: {e}")))?;
        self.generator_config()
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("generator: {e}")))?;
        self.encoder_config()
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("encoder: {e}")))?;
        validate_dataset("dataset_a", &self.dataset_a)?;
        validate_dataset("dataset_b", &self.dataset_b)?;
        Ok(())
    }

    pub fn qgram_config(&self) -> QGramConfig {
        QGramConfig::new()
            .with_q(self.qgram.q)
            .with_letters(self.qgram.letters)
            .with_digits(self.qgram.digits)
            .with_punctuation(self.qgram.punctuation)
    }

    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig::new()
            .with_r_length(self.generator.r_length)
            .with_k(self.generator.k)
            .with_seed(seed_from_str(&self.seed))
            .with_max_attempts(self.generator.max_attempts)
    }

    pub fn swap_config(&self) -> SwapConfig {
        SwapConfig {
            enabled: self.reference_sets.swap,
        }
    }

    /// Encoder settings; `k` follows the generator's coverage requirement.
    pub fn encoder_config(&self) -> EncoderConfig {
        EncoderConfig {
            k: self.generator.k,
            init_sign_length: self.encoder.init_sign_length,
            empty_signature_policy: self.encoder.empty_signature_policy,
            use_parallel: self.encoder.use_parallel,
        }
    }
}

fn validate_dataset(section: &str, spec: &DatasetSpec) -> Result<(), ConfigLoadError> {
    if spec.attributes.is_empty() {
        return Err(ConfigLoadError::Validation(format!(
            "{section}.attributes must name at least one column"
        )));
    }
    if spec.path.as_os_str().is_empty() {
        return Err(ConfigLoadError::Validation(format!(
            "{section}.path must not be empty"
        )));
    }
    Ok(())
}

/// Alphabet and q-gram length
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QGramYamlConfig {
    #[serde(default = "default_q")]
    pub q: usize,

    #[serde(default = "true_value")]
    pub letters: bool,

    #[serde(default)]
    pub digits: bool,

    #[serde(default)]
    pub punctuation: bool,
}

impl Default for QGramYamlConfig {
    fn default() -> Self {
        Self {
            q: default_q(),
            letters: true,
            digits: false,
            punctuation: false,
        }
    }
}

/// Reference-set generation YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneratorYamlConfig {
    #[serde(default = "default_r_length")]
    pub r_length: usize,

    #[serde(default = "default_k")]
    pub k: usize,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

impl Default for GeneratorYamlConfig {
    fn default() -> Self {
        Self {
            r_length: default_r_length(),
            k: default_k(),
            max_attempts: default_max_attempts(),
        }
    }
}

/// Where reference sets and frequencies come from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReferenceSetsYamlConfig {
    /// Pre-generated reference-set file; generated from the alphabet when absent
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Public `q-gram,frequency` table; every q-gram weighs 1 when absent
    #[serde(default)]
    pub frequency_table: Option<PathBuf>,

    #[serde(default = "true_value")]
    pub swap: bool,
}

impl Default for ReferenceSetsYamlConfig {
    fn default() -> Self {
        Self {
            path: None,
            frequency_table: None,
            swap: true,
        }
    }
}

/// Signature encoding YAML configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncoderYamlConfig {
    #[serde(default)]
    pub init_sign_length: Option<usize>,

    #[serde(default)]
    pub empty_signature_policy: EmptySignaturePolicy,

    #[serde(default)]
    pub use_parallel: bool,
}

/// Output destinations; unset entries are not written
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputYamlConfig {
    #[serde(default)]
    pub dataset_a: Option<PathBuf>,

    #[serde(default)]
    pub dataset_b: Option<PathBuf>,

    /// Frozen reference-set pool after swapping
    #[serde(default)]
    pub reference_sets: Option<PathBuf>,
}

fn default_seed() -> String {
    "42".to_string()
}
fn default_q() -> usize {
    2
}
fn default_r_length() -> usize {
    10
}
fn default_k() -> usize {
    3
}
fn default_max_attempts() -> usize {
    10_000
}
fn true_value() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DATASETS: &str = r#"
dataset_a:
  path: "a.csv"
  id_column: 0
  attributes: [1, 2]
dataset_b:
  path: "b.csv.gz"
  id_column: 0
  attributes: [1, 2]
"#;

    fn with_datasets(head: &str) -> String {
        format!("{head}{DATASETS}")
    }

    #[test]
    fn test_load_minimal_yaml_uses_defaults() {
        let config = RseConfig::from_yaml(&with_datasets("version: \"1.0\"\n")).unwrap();
        assert_eq!(config.seed, "42");
        assert_eq!(config.qgram, QGramYamlConfig::default());
        assert_eq!(config.generator.k, 3);
        assert!(config.reference_sets.swap);
        assert!(config.reference_sets.path.is_none());
        assert_eq!(config.dataset_b.path, PathBuf::from("b.csv.gz"));
        assert_eq!(config.generator_config().seed, 42);
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(with_datasets("version: \"1\"\nseed: \"alpha\"\n").as_bytes())
            .unwrap();

        let config = RseConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.generator_config().seed, seed_from_str("alpha"));
    }

    #[test]
    fn test_stage_configs_follow_yaml() {
        let yaml = with_datasets(
            r#"
version: "1.0"
qgram:
  q: 3
  digits: true
generator:
  r_length: 12
  k: 4
encoder:
  init_sign_length: 20
  empty_signature_policy: "exclude"
  use_parallel: true
reference_sets:
  swap: false
"#,
        );
        let config = RseConfig::from_yaml(&yaml).unwrap();

        let qgram = config.qgram_config();
        assert_eq!(qgram.q, 3);
        assert!(qgram.letters && qgram.digits);

        let encoder = config.encoder_config();
        assert_eq!(encoder.k, 4);
        assert_eq!(encoder.init_sign_length, Some(20));
        assert_eq!(encoder.empty_signature_policy, EmptySignaturePolicy::Exclude);
        assert!(encoder.use_parallel);
        assert!(!config.swap_config().enabled);
        assert_eq!(config.generator_config().r_length, 12);
    }

    #[test]
    fn test_unsupported_version() {
        let err = RseConfig::from_yaml(&with_datasets("version: \"2.0\"\n")).unwrap_err();
        assert!(matches!(err, ConfigLoadError::UnsupportedVersion(v) if v == "2.0"));
    }

    #[test]
    fn test_generator_validation() {
        let yaml = with_datasets("version: \"1.0\"\ngenerator:\n  k: 0\n");
        let err = RseConfig::from_yaml(&yaml).unwrap_err();
        assert!(err.to_string().contains("k must be >= 1"));
    }

    #[test]
    fn test_empty_alphabet_rejected() {
        let yaml = with_datasets("version: \"1.0\"\nqgram:\n  letters: false\n");
        let err = RseConfig::from_yaml(&yaml).unwrap_err();
        assert!(err.to_string().starts_with("validation error: qgram"));
    }

    #[test]
    fn test_missing_dataset_is_parse_error() {
        let err = RseConfig::from_yaml("version: \"1.0\"\n").unwrap_err();
        assert!(matches!(err, ConfigLoadError::YamlParse(_)));
    }

    #[test]
    fn test_dataset_without_attributes() {
        let yaml = r#"
version: "1.0"
dataset_a:
  path: "a.csv"
  id_column: 0
  attributes: []
dataset_b:
  path: "b.csv"
  id_column: 0
  attributes: [1]
"#;
        let err = RseConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("dataset_a.attributes"));
    }
}
