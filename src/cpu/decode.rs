//! Instruction format.
//!
//! ```text
//! bit:    0   1 2   3   4  5  6  7  8  9   10 11 12   13 14 15
//! A:      0   v v   v   v  v  v  v  v  v   v  v  v    v  v  v     value = bits 1..=15
//! C:      1   - -   a   zx nx zy ny f  no  A  D  M    <  =  >
//! ```
//!
//! `a` picks the ALU's second operand (A register or memory input). The
//! destination bits say which of A, D and memory receive the ALU result; the
//! jump bits test the result for negative, zero and positive.
//!
//! Decoding never fails: every 16-bit word is a legal instruction. The CPU
//! datapath gates on the raw bits directly; [`Instruction`] is a typed view
//! of the same word for display, debugging and tests.

use serde::{Serialize, Deserialize};
use crate::logic::{AluControl, Bit, Word16};

/// Destination flags of a compute instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dest {
    pub a: Bit,
    pub d: Bit,
    pub m: Bit,
}

/// Jump condition flags of a compute instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Jump {
    /// Jump when the ALU result is negative.
    pub lt: Bit,
    /// Jump when the ALU result is zero.
    pub eq: Bit,
    /// Jump when the ALU result is positive.
    pub gt: Bit,
}

/// A decoded 16-bit instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// Load a 15-bit constant into A (`@value`).
    Address(u16),
    /// Compute with the ALU and route the result.
    Compute {
        /// Second operand: A register when low, memory input when high.
        a: Bit,
        control: AluControl,
        dest: Dest,
        jump: Jump,
    },
}

/// Bit positions within an instruction word.
pub mod field {
    pub const CLASS: usize = 0;
    pub const OPERAND: usize = 3;
    pub const DEST_A: usize = 10;
    pub const DEST_D: usize = 11;
    pub const DEST_M: usize = 12;
    pub const JUMP_LT: usize = 13;
    pub const JUMP_EQ: usize = 14;
    pub const JUMP_GT: usize = 15;
}

/// Decode a 16-bit instruction word.
pub fn decode(word: &Word16) -> Instruction {
    if word.get(field::CLASS) == Bit::O {
        return Instruction::Address(word.to_u16());
    }

    Instruction::Compute {
        a: word.get(field::OPERAND),
        control: AluControl::from_instruction(word),
        dest: Dest {
            a: word.get(field::DEST_A),
            d: word.get(field::DEST_D),
            m: word.get(field::DEST_M),
        },
        jump: Jump {
            lt: word.get(field::JUMP_LT),
            eq: word.get(field::JUMP_EQ),
            gt: word.get(field::JUMP_GT),
        },
    }
}

/// Encode an instruction back to a 16-bit word.
///
/// Address values above 15 bits are truncated. Compute instructions set
/// the two reserved bits high.
pub fn encode(instr: &Instruction) -> Word16 {
    match instr {
        Instruction::Address(value) => Word16::from_u16(value & 0x7fff),
        Instruction::Compute { a, control, dest, jump } => {
            let mut word = Word16::splat(Bit::I);
            word.set(field::OPERAND, *a);
            let bits = [control.zx, control.nx, control.zy, control.ny, control.f, control.no];
            for (offset, bit) in bits.iter().enumerate() {
                word.set(4 + offset, *bit);
            }
            word.set(field::DEST_A, dest.a);
            word.set(field::DEST_D, dest.d);
            word.set(field::DEST_M, dest.m);
            word.set(field::JUMP_LT, jump.lt);
            word.set(field::JUMP_EQ, jump.eq);
            word.set(field::JUMP_GT, jump.gt);
            word
        }
    }
}
