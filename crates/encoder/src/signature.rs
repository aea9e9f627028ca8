//! Fixed-length bit-array signatures.

use std::fmt;
use std::str::FromStr;

use bitvec::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::EncodeError;

/// A record's final encoding: one bit per reference set, set for the
/// reference sets the record ranked highest against.
///
/// Serializes as a string of `0`/`1` characters, position 0 first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    bits: BitVec<u64, Lsb0>,
}

impl Signature {
    /// All-zero signature of length `len`.
    pub fn zeros(len: usize) -> Self {
        Self {
            bits: bitvec![u64, Lsb0; 0; len],
        }
    }

    /// Signature of length `len` with exactly `positions` set.
    pub fn from_positions(len: usize, positions: &[usize]) -> Result<Self, EncodeError> {
        let mut sig = Self::zeros(len);
        for &position in positions {
            if position >= len {
                return Err(EncodeError::PositionOutOfRange { position, len });
            }
            sig.bits.set(position, true);
        }
        Ok(sig)
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Hamming weight.
    pub fn count_ones(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn get(&self, position: usize) -> Option<bool> {
        self.bits.get(position).map(|bit| *bit)
    }

    /// Set positions in ascending order.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }

    pub fn as_bitslice(&self) -> &BitSlice<u64, Lsb0> {
        &self.bits
    }

    pub fn to_bit_string(&self) -> String {
        self.bits
            .iter()
            .by_vals()
            .map(|bit| if bit { '1' } else { '0' })
            .collect()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bit_string())
    }
}

impl FromStr for Signature {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bits = BitVec::with_capacity(s.len());
        for (offset, found) in s.chars().enumerate() {
            match found {
                '0' => bits.push(false),
                '1' => bits.push(true),
                _ => return Err(EncodeError::InvalidBitString { offset, found }),
            }
        }
        Ok(Self { bits })
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_bit_string())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
