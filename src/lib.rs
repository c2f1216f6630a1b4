//! # nand16
//!
//! A 16-bit computer built bottom-up from a single NAND gate.
//!
//! Every gate, adder, register and memory tier in this crate is a
//! composition of [`logic::nand`]. The layers are:
//! - [`logic`] - gates, the 16-bit bus, adders and the ALU
//! - [`cpu`] - registers, recursive RAM, the program counter, the CPU and ROM
//! - [`computer`] - the assembled machine and its tick loop
//! - [`program`] - `.hack` files and disassembly

pub mod logic;
pub mod cpu;
pub mod computer;
pub mod program;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use logic::{Bit, Word16, BusError, AluControl};
pub use cpu::{Cpu, CpuOutput, CpuState, Instruction, MemoryTier, Ram32K, Rom32K, RomError};
pub use computer::{Computer, ComputerError, MachineState, RunSummary, TickReport};
pub use program::{disassemble, load_hack, parse_hack, save_hack, HackError};

#[cfg(feature = "tui")]
pub use tui::run_debugger;
