//! Configuration for reference-set generation and rank swapping.

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::error::RefSetError;

/// Parameters of the coverage-guaranteeing generator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Members per reference set.
    pub r_length: usize,
    /// Minimum number of reference sets every alphabet q-gram must appear in.
    pub k: usize,
    /// PRNG seed. Identical seeds and alphabets produce identical pools.
    pub seed: u64,
    /// Sampling attempts allowed per accepted reference set before the
    /// generator reports [`RefSetError::CoverageExhausted`].
    pub max_attempts: usize,
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_r_length(mut self, r_length: usize) -> Self {
        self.r_length = r_length;
        self
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn validate(&self) -> Result<(), RefSetError> {
        if self.r_length == 0 {
            return Err(RefSetError::InvalidConfigRLength {
                r_length: self.r_length,
            });
        }
        if self.k == 0 {
            return Err(RefSetError::InvalidConfigK { k: self.k });
        }
        if self.max_attempts == 0 {
            return Err(RefSetError::InvalidConfigAttempts {
                max_attempts: self.max_attempts,
            });
        }
        Ok(())
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            r_length: 10,
            k: 3,
            seed: 42,
            max_attempts: 10_000,
        }
    }
}

/// Whether frequency-based rank swapping runs before the pool is frozen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SwapConfig {
    pub enabled: bool,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Fold a free-form seed string into a 64-bit PRNG seed.
///
/// Decimal strings are used verbatim so that `"42"` and `42` agree; any
/// other text is hashed.
pub fn seed_from_str(seed: &str) -> u64 {
    let trimmed = seed.trim();
    trimmed
        .parse::<u64>()
        .unwrap_or_else(|_| xxh3_64(trimmed.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let cfg = GeneratorConfig::default();
        assert_eq!(cfg.r_length, 10);
        assert_eq!(cfg.k, 3);
        assert_eq!(cfg.max_attempts, 10_000);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_validate_invalid_values() {
        assert_eq!(
            GeneratorConfig::new().with_r_length(0).validate(),
            Err(RefSetError::InvalidConfigRLength { r_length: 0 })
        );
        assert_eq!(
            GeneratorConfig::new().with_k(0).validate(),
            Err(RefSetError::InvalidConfigK { k: 0 })
        );
        assert_eq!(
            GeneratorConfig::new().with_max_attempts(0).validate(),
            Err(RefSetError::InvalidConfigAttempts { max_attempts: 0 })
        );
    }

    #[test]
    fn numeric_seed_is_verbatim() {
        assert_eq!(seed_from_str("42"), 42);
        assert_eq!(seed_from_str(" 7 "), 7);
    }

    #[test]
    fn text_seed_is_hashed_stably() {
        let a = seed_from_str("secret-seed");
        assert_eq!(a, seed_from_str("secret-seed"));
        assert_ne!(a, seed_from_str("other-seed"));
    }
}
