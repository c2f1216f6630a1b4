//! The arithmetic-logic unit.
//!
//! Six control bits pre-process both operands, pick AND or ADD, and
//! optionally invert the result:
//!
//! ```text
//! zx: x = 0        zy: y = 0        f:  out = x + y  (else x & y)
//! nx: x = !x       ny: y = !y       no: out = !out
//! ```
//!
//! Every one of the 64 control patterns is legal. Overflow is neither
//! detected nor reported.

use serde::{Serialize, Deserialize};
use crate::logic::arith::add16;
use crate::logic::ops::{and16, iszero16, mux16, not16};
use crate::logic::{Bit, Word16};

/// The six ALU control inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AluControl {
    pub zx: Bit,
    pub nx: Bit,
    pub zy: Bit,
    pub ny: Bit,
    pub f: Bit,
    pub no: Bit,
}

impl AluControl {
    pub const fn new(zx: Bit, nx: Bit, zy: Bit, ny: Bit, f: Bit, no: Bit) -> Self {
        Self { zx, nx, zy, ny, f, no }
    }

    /// Take the control bits from positions 4..=9 of an instruction.
    pub const fn from_instruction(instruction: &Word16) -> Self {
        Self::new(
            instruction.get(4),
            instruction.get(5),
            instruction.get(6),
            instruction.get(7),
            instruction.get(8),
            instruction.get(9),
        )
    }

    /// Pack as a 6-bit number, `zx` most significant.
    pub fn to_u8(self) -> u8 {
        [self.zx, self.nx, self.zy, self.ny, self.f, self.no]
            .iter()
            .fold(0u8, |acc, bit| (acc << 1) | bit.to_u8())
    }

    /// Unpack from a 6-bit number, `zx` most significant. Higher bits are ignored.
    pub fn from_u8(value: u8) -> Self {
        let bit = |shift: u8| Bit::from((value >> shift) & 1 == 1);
        Self::new(bit(5), bit(4), bit(3), bit(2), bit(1), bit(0))
    }
}

/// ALU outputs: the result word plus its zero and negative flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluOutput {
    pub out: Word16,
    /// High iff `out` is all zeros.
    pub zr: Bit,
    /// High iff `out` is negative (its MSB).
    pub ng: Bit,
}

/// Evaluate the ALU combinationally.
pub fn alu(x: &Word16, y: &Word16, control: AluControl) -> AluOutput {
    let x = mux16(x, &Word16::ZERO, control.zx);
    let x = mux16(&x, &not16(&x), control.nx);

    let y = mux16(y, &Word16::ZERO, control.zy);
    let y = mux16(&y, &not16(&y), control.ny);

    let out = mux16(&and16(&x, &y), &add16(&x, &y), control.f);
    let out = mux16(&out, &not16(&out), control.no);

    AluOutput {
        out,
        zr: iszero16(&out),
        ng: out.get(0),
    }
}
