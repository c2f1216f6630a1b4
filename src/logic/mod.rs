//! Combinational logic, from the NAND primitive up to the ALU.
//!
//! This module provides the core types and gates:
//! - [`Bit`] - A single binary digit and the primitive gates
//! - [`Word16`] - The 16-bit bus (index 0 = MSB)
//! - [`ops`] - 16-wide bitwise gates, one-hot decode, mux trees
//! - [`arith`] - Half/full adders and the ripple-carry adder
//! - [`alu`] - The arithmetic-logic unit

pub mod bit;
mod word;
pub mod ops;
pub mod arith;
pub mod alu;

pub use bit::{Bit, nand, not_, and_, or_, xor, mux, demux};
pub use word::{Word16, BusError};
pub use ops::{and16, or16, not16, mux16, iszero16};
pub use arith::{half_adder, full_adder, add16, inc16};
pub use alu::{alu, AluControl, AluOutput};
