//! Single binary digit and the primitive gates built on it.
//!
//! `nand` is the only gate evaluated directly. Everything else in this
//! module (and in the rest of the crate) is a composition of it:
//! - `not_(a)    = nand(a, a)`
//! - `and_(a, b) = not_(nand(a, b))`
//! - `or_(a, b)  = nand(not_(a), not_(b))`

use std::fmt;
use serde::{Serialize, Deserialize};

use crate::logic::BusError;

/// A single binary digit.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Bit {
    /// Low (0)
    #[default]
    O = 0,
    /// High (1)
    I = 1,
}

impl Bit {
    /// Both bit values in order: O, I
    pub const ALL: [Bit; 2] = [Bit::O, Bit::I];

    /// Parse a bit from its `'0'`/`'1'` character.
    #[inline]
    pub fn from_char(c: char) -> Result<Self, BusError> {
        match c {
            '0' => Ok(Bit::O),
            '1' => Ok(Bit::I),
            _ => Err(BusError::InvalidBit(c)),
        }
    }

    /// The `'0'`/`'1'` character for this bit.
    #[inline]
    pub const fn to_char(self) -> char {
        match self {
            Bit::O => '0',
            Bit::I => '1',
        }
    }

    #[inline]
    pub const fn is_high(self) -> bool {
        matches!(self, Bit::I)
    }

    #[inline]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }
}

impl From<bool> for Bit {
    fn from(value: bool) -> Self {
        if value { Bit::I } else { Bit::O }
    }
}

impl From<Bit> for bool {
    fn from(bit: Bit) -> Self {
        bit.is_high()
    }
}

impl fmt::Debug for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

// ============================================================================
// Primitive gates
// ============================================================================

/// The universal primitive: low only when both inputs are high.
#[inline]
pub const fn nand(a: Bit, b: Bit) -> Bit {
    match (a, b) {
        (Bit::I, Bit::I) => Bit::O,
        _ => Bit::I,
    }
}

#[inline]
pub const fn not_(a: Bit) -> Bit {
    nand(a, a)
}

#[inline]
pub const fn and_(a: Bit, b: Bit) -> Bit {
    not_(nand(a, b))
}

#[inline]
pub const fn or_(a: Bit, b: Bit) -> Bit {
    nand(not_(a), not_(b))
}

#[inline]
pub const fn xor(a: Bit, b: Bit) -> Bit {
    and_(nand(a, b), or_(a, b))
}

/// Select `a` when `sel` is low, `b` when `sel` is high.
#[inline]
pub const fn mux(a: Bit, b: Bit, sel: Bit) -> Bit {
    or_(and_(a, not_(sel)), and_(b, sel))
}

/// Route `input` to the first output when `sel` is low, to the second when high.
#[inline]
pub const fn demux(input: Bit, sel: Bit) -> (Bit, Bit) {
    (and_(not_(sel), input), and_(sel, input))
}

/// Three-input AND, used by the tier decoders.
#[inline]
pub const fn and3(a: Bit, b: Bit, c: Bit) -> Bit {
    and_(a, and_(b, c))
}

/// Three-input OR, used by the jump logic.
#[inline]
pub const fn or3(a: Bit, b: Bit, c: Bit) -> Bit {
    or_(a, or_(b, c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use Bit::{I, O};

    #[test]
    fn test_nand_truth_table() {
        assert_eq!(nand(O, O), I);
        assert_eq!(nand(O, I), I);
        assert_eq!(nand(I, O), I);
        assert_eq!(nand(I, I), O);
    }

    #[test]
    fn test_not() {
        assert_eq!(not_(O), I);
        assert_eq!(not_(I), O);
    }

    #[test]
    fn test_and_or_xor_truth_tables() {
        // (a, b, and, or, xor)
        let table = [
            (O, O, O, O, O),
            (O, I, O, I, I),
            (I, O, O, I, I),
            (I, I, I, I, O),
        ];
        for (a, b, and, or, x) in table {
            assert_eq!(and_(a, b), and, "and({:?}, {:?})", a, b);
            assert_eq!(or_(a, b), or, "or({:?}, {:?})", a, b);
            assert_eq!(xor(a, b), x, "xor({:?}, {:?})", a, b);
        }
    }

    #[test]
    fn test_mux_selects_by_sel() {
        for a in Bit::ALL {
            for b in Bit::ALL {
                assert_eq!(mux(a, b, O), a);
                assert_eq!(mux(a, b, I), b);
            }
        }
    }

    #[test]
    fn test_demux() {
        assert_eq!(demux(O, O), (O, O));
        assert_eq!(demux(I, O), (I, O));
        assert_eq!(demux(O, I), (O, O));
        assert_eq!(demux(I, I), (O, I));
    }

    #[test]
    fn test_three_input_gates() {
        assert_eq!(and3(I, I, I), I);
        assert_eq!(and3(I, O, I), O);
        assert_eq!(or3(O, O, O), O);
        assert_eq!(or3(O, O, I), I);
    }

    #[test]
    fn test_char_roundtrip() {
        for b in Bit::ALL {
            assert_eq!(Bit::from_char(b.to_char()).unwrap(), b);
        }
        assert_eq!(Bit::from_char('2'), Err(BusError::InvalidBit('2')));
    }
}
