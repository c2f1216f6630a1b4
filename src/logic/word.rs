//! The 16-bit word that every bus in the machine carries.
//!
//! Bit order is fixed across the whole crate: index 0 is the most
//! significant bit, index 15 the least significant. Arithmetic treats the
//! word as two's complement.

use std::fmt;
use serde::{Serialize, Deserialize};
use thiserror::Error;
use crate::logic::Bit;

/// A 16-bit word.
///
/// Used for:
/// - Register and memory cell contents
/// - Instructions fetched from ROM
/// - ALU operands and results
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Word16 {
    /// Bits stored from most significant (index 0) to least significant (index 15)
    bits: [Bit; 16],
}

impl Word16 {
    /// Number of bits in a word.
    pub const WIDTH: usize = 16;

    /// All bits low.
    pub const ZERO: Word16 = Word16 { bits: [Bit::O; 16] };

    /// All bits high (-1 in two's complement).
    pub const ONES: Word16 = Word16 { bits: [Bit::I; 16] };

    /// The value 1.
    pub const ONE: Word16 = {
        let mut bits = [Bit::O; 16];
        bits[15] = Bit::I;
        Word16 { bits }
    };

    #[inline]
    pub const fn zero() -> Self {
        Self::ZERO
    }

    /// Create a word from an array of bits (MSB first).
    #[inline]
    pub const fn from_array(bits: [Bit; 16]) -> Self {
        Self { bits }
    }

    /// Create a word from a bit slice of exactly 16 bits.
    pub fn from_bits(bits: &[Bit]) -> Result<Self, BusError> {
        let bits: [Bit; 16] = bits.try_into().map_err(|_| BusError::InvalidWidth {
            expected: Self::WIDTH,
            got: bits.len(),
        })?;
        Ok(Self { bits })
    }

    /// Create a word whose every bit equals `bit`.
    #[inline]
    pub const fn splat(bit: Bit) -> Self {
        Self { bits: [bit; 16] }
    }

    #[inline]
    pub const fn bits(&self) -> &[Bit; 16] {
        &self.bits
    }

    /// Get a single bit by index (0 = MSB).
    #[inline]
    pub const fn get(&self, index: usize) -> Bit {
        self.bits[index]
    }

    /// Set a single bit by index (0 = MSB).
    #[inline]
    pub fn set(&mut self, index: usize, bit: Bit) {
        self.bits[index] = bit;
    }

    /// The low 15 bits, as used to address either memory.
    #[inline]
    pub fn address_bits(&self) -> &[Bit] {
        &self.bits[1..]
    }

    /// Create from an unsigned integer.
    pub fn from_u16(value: u16) -> Self {
        let mut bits = [Bit::O; 16];
        for (i, bit) in bits.iter_mut().enumerate() {
            *bit = Bit::from((value >> (15 - i)) & 1 == 1);
        }
        Self { bits }
    }

    /// Convert to an unsigned integer.
    pub fn to_u16(&self) -> u16 {
        self.bits
            .iter()
            .fold(0u16, |acc, bit| (acc << 1) | bit.to_u8() as u16)
    }

    /// Create from a two's complement integer.
    #[inline]
    pub fn from_i16(value: i16) -> Self {
        Self::from_u16(value as u16)
    }

    /// Convert to a two's complement integer.
    #[inline]
    pub fn to_i16(&self) -> i16 {
        self.to_u16() as i16
    }

    /// Check if every bit is low.
    pub fn is_zero(&self) -> bool {
        self.bits.iter().all(|b| *b == Bit::O)
    }

    /// Parse from a 16-character `0`/`1` string, MSB first.
    pub fn parse(s: &str) -> Result<Self, BusError> {
        let s = s.trim();
        let count = s.chars().count();
        if count != Self::WIDTH {
            return Err(BusError::InvalidWidth { expected: Self::WIDTH, got: count });
        }

        let mut bits = [Bit::O; 16];
        for (i, c) in s.chars().enumerate() {
            bits[i] = Bit::from_char(c)?;
        }

        Ok(Self { bits })
    }
}

impl fmt::Debug for Word16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word16({} = {})", self, self.to_i16())
    }
}

impl fmt::Display for Word16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in &self.bits {
            write!(f, "{}", bit)?;
        }
        Ok(())
    }
}

impl From<u16> for Word16 {
    fn from(value: u16) -> Self {
        Word16::from_u16(value)
    }
}

impl From<Word16> for u16 {
    fn from(word: Word16) -> Self {
        word.to_u16()
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised when a bus does not carry the width a component expects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    /// A bit vector or address had the wrong number of bits.
    #[error("invalid width: expected {expected} bits, got {got}")]
    InvalidWidth { expected: usize, got: usize },

    /// A character other than `0`/`1` appeared where a bit was expected.
    #[error("invalid bit character: '{0}' (expected 0 or 1)")]
    InvalidBit(char),

    /// A word index past the end of a memory.
    #[error("address {index} out of range for {capacity} words")]
    AddressOutOfRange { index: usize, capacity: usize },
}

// ============================================================================
// Tests
// ============================================================================
