//! Clocked components of the machine.
//!
//! This module implements everything that holds state:
//! - single-bit cells, 16-bit registers and the program counter
//! - the recursive RAM tiers up to 32768 words
//! - the instruction decoder and the CPU datapath
//! - the write-once instruction ROM

pub mod registers;
pub mod memory;
pub mod decode;
pub mod execute;
pub mod rom;

pub use registers::{Dff, Register, ProgramCounter};
pub use memory::{MemoryTier, RamNode, Ram8, Ram64, Ram512, Ram4K, Ram16K, Ram32K};
pub use decode::{Instruction, Dest, Jump};
pub use execute::{Cpu, CpuOutput, CpuState};
pub use rom::{Rom32K, RomError};
