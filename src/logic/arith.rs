//! Adders.
//!
//! A 16-bit ripple-carry adder built from full adders, which are in turn
//! two half adders. Addition is modulo 2^16: the carry out of the most
//! significant position is dropped.

use crate::logic::bit::{and_, or_, xor};
use crate::logic::{Bit, Word16};

/// Add two bits, returning (sum, carry).
#[inline]
pub const fn half_adder(a: Bit, b: Bit) -> (Bit, Bit) {
    (xor(a, b), and_(a, b))
}

/// Add three bits, returning (sum, carry).
#[inline]
pub const fn full_adder(a: Bit, b: Bit, carry_in: Bit) -> (Bit, Bit) {
    let (s1, c1) = half_adder(a, b);
    let (sum, c2) = half_adder(s1, carry_in);
    (sum, or_(c1, c2))
}

/// Add two words, discarding the final carry.
pub fn add16(a: &Word16, b: &Word16) -> Word16 {
    let mut result = Word16::zero();
    let mut carry = Bit::O;

    // Index 15 is the least significant position
    for i in (0..Word16::WIDTH).rev() {
        let (sum, next) = full_adder(a.get(i), b.get(i), carry);
        result.set(i, sum);
        carry = next;
    }

    result
}

/// Add one to a word, wrapping 0xFFFF to 0.
#[inline]
pub fn inc16(a: &Word16) -> Word16 {
    add16(a, &Word16::ONE)
}
