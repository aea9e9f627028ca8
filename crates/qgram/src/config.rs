//! Configuration and error types for RSE q-gram extraction.
//!
//! The q-gram layer is a pure function of `(attribute values, config)`: no
//! I/O, no clocks, no locale dependence.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::alphabet::Alphabet;

/// Q-gram length and alphabet composition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QGramConfig {
    /// Characters per q-gram.
    pub q: usize,
    /// Include `a-z` in the alphabet.
    pub letters: bool,
    /// Include `0-9` in the alphabet.
    pub digits: bool,
    /// Include ASCII punctuation in the alphabet.
    pub punctuation: bool,
}

impl QGramConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_q(mut self, q: usize) -> Self {
        self.q = q;
        self
    }

    pub fn with_letters(mut self, letters: bool) -> Self {
        self.letters = letters;
        self
    }

    pub fn with_digits(mut self, digits: bool) -> Self {
        self.digits = digits;
        self
    }

    pub fn with_punctuation(mut self, punctuation: bool) -> Self {
        self.punctuation = punctuation;
        self
    }

    /// Alphabet described by the composition flags.
    pub fn alphabet(&self) -> Alphabet {
        Alphabet::new(self.letters, self.digits, self.punctuation)
    }

    pub fn validate(&self) -> Result<(), QGramError> {
        if self.q == 0 {
            return Err(QGramError::InvalidQ { q: self.q });
        }
        if !(self.letters || self.digits || self.punctuation) {
            return Err(QGramError::EmptyAlphabet);
        }
        Ok(())
    }
}

impl Default for QGramConfig {
    fn default() -> Self {
        Self {
            q: 2,
            letters: true,
            digits: false,
            punctuation: false,
        }
    }
}

/// Errors returned by the q-gram layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QGramError {
    #[error("invalid config: q must be >= 1 (got {q})")]
    InvalidQ { q: usize },

    #[error("invalid config: alphabet has no symbols")]
    EmptyAlphabet,

    #[error("alphabet of {symbols} symbols with q={q} overflows the q-gram count")]
    AlphabetTooLarge { symbols: usize, q: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let cfg = QGramConfig::default();
        assert_eq!(cfg.q, 2);
        assert!(cfg.letters);
        assert!(!cfg.digits);
        assert!(!cfg.punctuation);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_builder_chain() {
        let cfg = QGramConfig::new()
            .with_q(3)
            .with_letters(false)
            .with_digits(true)
            .with_punctuation(true);
        assert_eq!(cfg.q, 3);
        assert!(!cfg.letters);
        assert!(cfg.digits);
        assert!(cfg.punctuation);
    }

    #[test]
    fn config_validate_rejects_zero_q() {
        let cfg = QGramConfig::new().with_q(0);
        assert_eq!(cfg.validate(), Err(QGramError::InvalidQ { q: 0 }));
    }

    #[test]
    fn config_validate_rejects_empty_alphabet() {
        let cfg = QGramConfig::new().with_letters(false);
        assert_eq!(cfg.validate(), Err(QGramError::EmptyAlphabet));
    }

    #[test]
    fn config_serde_roundtrip() {
        let cfg = QGramConfig::new().with_digits(true);
        let json = serde_json::to_string(&cfg).unwrap();
        let back: QGramConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
