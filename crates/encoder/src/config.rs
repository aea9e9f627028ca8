//! Configuration for signature encoding.

use serde::{Deserialize, Serialize};

use crate::error::EncodeError;

/// What to do with a record that shares no q-gram with any reference set.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmptySignaturePolicy {
    /// Abort the whole encoding with [`EncodeError::EmptySignature`].
    #[default]
    Fail,
    /// Drop the record and list it in the report.
    Exclude,
}

/// Parameters of the signature encoder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Coverage requirement the reference sets were generated with. Only
    /// used to derive the candidate list length.
    pub k: usize,
    /// Candidate list length per record. `None` derives
    /// `(k + 1) * shortest record q-gram set` over both datasets.
    pub init_sign_length: Option<usize>,
    pub empty_signature_policy: EmptySignaturePolicy,
    /// Rank records on the rayon pool. Output is identical either way.
    pub use_parallel: bool,
}

impl EncoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn with_init_sign_length(mut self, init_sign_length: usize) -> Self {
        self.init_sign_length = Some(init_sign_length);
        self
    }

    pub fn with_empty_signature_policy(mut self, policy: EmptySignaturePolicy) -> Self {
        self.empty_signature_policy = policy;
        self
    }

    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    pub fn validate(&self) -> Result<(), EncodeError> {
        if self.k == 0 {
            return Err(EncodeError::InvalidConfigK { k: self.k });
        }
        if self.init_sign_length == Some(0) {
            return Err(EncodeError::InvalidConfigSignLength { init_sign_length: 0 });
        }
        Ok(())
    }

    /// Candidate list length for a shortest record q-gram set of `shortest`.
    pub fn init_sign_length_for(&self, shortest: usize) -> usize {
        self.init_sign_length
            .unwrap_or_else(|| (self.k + 1).saturating_mul(shortest))
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            k: 3,
            init_sign_length: None,
            empty_signature_policy: EmptySignaturePolicy::Fail,
            use_parallel: false,
        }
    }
}
