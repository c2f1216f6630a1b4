//! Bitwise operations on 16-bit buses.
//!
//! Each operation applies a primitive gate position by position, keeping
//! index order (index 0 = MSB). The multi-way helpers at the bottom are the
//! building blocks the memory tiers use for address decode and output
//! selection.

use crate::logic::bit::{and_, mux, not_, or_};
use crate::logic::{Bit, Word16};

// Elementwise two-input gates share one shape, so generate them
macro_rules! elementwise16 {
    ($(#[$meta:meta])* $name:ident, $gate:ident) => {
        $(#[$meta])*
        pub fn $name(a: &Word16, b: &Word16) -> Word16 {
            let mut result = Word16::zero();
            for i in 0..Word16::WIDTH {
                result.set(i, $gate(a.get(i), b.get(i)));
            }
            result
        }
    };
}

elementwise16!(
    /// Bitwise AND of two words.
    and16, and_
);

elementwise16!(
    /// Bitwise OR of two words.
    or16, or_
);

/// Bitwise NOT of a word.
pub fn not16(a: &Word16) -> Word16 {
    let mut result = Word16::zero();
    for i in 0..Word16::WIDTH {
        result.set(i, not_(a.get(i)));
    }
    result
}

/// Select the whole of `a` when `sel` is low, the whole of `b` when high.
///
/// `sel` is broadcast to every position rather than applied elementwise.
pub fn mux16(a: &Word16, b: &Word16, sel: Bit) -> Word16 {
    let mut result = Word16::zero();
    for i in 0..Word16::WIDTH {
        result.set(i, mux(a.get(i), b.get(i), sel));
    }
    result
}

/// High iff all 16 bits are low.
///
/// Cascades OR from the least significant bit upward, then inverts.
pub fn iszero16(a: &Word16) -> Bit {
    let any = (0..Word16::WIDTH - 1)
        .rev()
        .fold(a.get(Word16::WIDTH - 1), |acc, i| or_(acc, a.get(i)));
    not_(any)
}

/// Decode a select slice into `2^k` one-hot signals.
///
/// Signal `n` is the AND of one term per select bit: the bit itself where
/// the binary digit of `n` is 1, its negation where it is 0 (MSB first).
/// Exactly one signal is high for any select value.
pub fn decode_one_hot(select: &[Bit]) -> Vec<Bit> {
    let width = select.len();
    (0..1usize << width)
        .map(|n| {
            select.iter().enumerate().fold(Bit::I, |acc, (j, &bit)| {
                let term = if (n >> (width - 1 - j)) & 1 == 1 { bit } else { not_(bit) };
                and_(acc, term)
            })
        })
        .collect()
}

/// Reduce `2^k` words to the one addressed by `select`.
///
/// A binary tree of `mux16` stages: the last (least significant) select bit
/// picks within adjacent pairs, each earlier bit picks one level up.
///
/// # Panics
/// Panics if `inputs.len() != 2^select.len()`.
pub fn mux_tree(inputs: &[Word16], select: &[Bit]) -> Word16 {
    assert_eq!(
        inputs.len(),
        1usize << select.len(),
        "mux tree needs one input per select value"
    );

    let mut stage = inputs.to_vec();
    for &sel in select.iter().rev() {
        stage = stage
            .chunks_exact(2)
            .map(|pair| mux16(&pair[0], &pair[1], sel))
            .collect();
    }
    stage[0]
}
