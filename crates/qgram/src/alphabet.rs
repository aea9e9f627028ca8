//! Q-gram alphabets.
//!
//! An [`Alphabet`] is an ordered list of symbols. The full q-gram universe
//! over it is the Cartesian product of `q` copies, enumerated in
//! lexicographic product order so that the same flags always produce the
//! same sequence.

use serde::{Deserialize, Serialize};

use crate::config::QGramError;
use crate::QGram;

/// Ordered symbol set a q-gram universe is built from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
}

impl Alphabet {
    /// Letters `a-z`, then digits `0-9`, then ASCII punctuation, each
    /// included when its flag is set.
    pub fn new(letters: bool, digits: bool, punctuation: bool) -> Self {
        let mut symbols = Vec::new();
        if letters {
            symbols.extend('a'..='z');
        }
        if digits {
            symbols.extend('0'..='9');
        }
        if punctuation {
            symbols.extend((0u8..128).map(char::from).filter(char::is_ascii_punctuation));
        }
        Self { symbols }
    }

    /// Alphabet over an explicit symbol list. Repeated symbols are dropped,
    /// keeping the first occurrence.
    pub fn from_symbols<I: IntoIterator<Item = char>>(symbols: I) -> Self {
        let mut seen = Vec::new();
        for c in symbols {
            if !seen.contains(&c) {
                seen.push(c);
            }
        }
        Self { symbols: seen }
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Every q-gram of length `q` over this alphabet, `len()^q` in total.
    pub fn q_grams(&self, q: usize) -> Result<Vec<QGram>, QGramError> {
        if q == 0 {
            return Err(QGramError::InvalidQ { q });
        }
        if self.symbols.is_empty() {
            return Err(QGramError::EmptyAlphabet);
        }
        let total = u32::try_from(q)
            .ok()
            .and_then(|exp| self.symbols.len().checked_pow(exp))
            .ok_or(QGramError::AlphabetTooLarge {
                symbols: self.symbols.len(),
                q,
            })?;

        let mut out = Vec::with_capacity(total);
        // Odometer over symbol indices; the last position varies fastest.
        let mut digits = vec![0usize; q];
        for _ in 0..total {
            out.push(digits.iter().map(|&d| self.symbols[d]).collect());
            for pos in (0..q).rev() {
                digits[pos] += 1;
                if digits[pos] < self.symbols.len() {
                    break;
                }
                digits[pos] = 0;
            }
        }
        Ok(out)
    }
}
