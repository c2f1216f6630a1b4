//! Instruction memory.
//!
//! The ROM is the same 32K decode tree as data memory, driven with `load`
//! held low while the machine runs. Its contents are written once, by a
//! preload that runs outside the clocked loop.

use thiserror::Error;
use crate::cpu::memory::{address_bits, MemoryTier, Ram32K};
use crate::logic::{Bit, BusError, Word16};

/// Number of instruction words the ROM holds.
pub const ROM_SIZE: usize = 32768;

/// 32K words of write-once instruction memory.
#[derive(Debug, Default)]
pub struct Rom32K {
    chip: Ram32K,
    loaded: Option<usize>,
}

impl Rom32K {
    /// Create an empty ROM. An empty ROM reads all zeros (`@0`).
    pub fn new() -> Self {
        Self {
            chip: Ram32K::new(),
            loaded: None,
        }
    }

    /// Write `program` at addresses 0, 1, 2, ...
    ///
    /// Fails if the ROM was loaded before or the program does not fit.
    pub fn load(&mut self, program: &[Word16]) -> Result<(), RomError> {
        if self.loaded.is_some() {
            return Err(RomError::AlreadyLoaded);
        }
        if program.len() > ROM_SIZE {
            return Err(RomError::ProgramTooLarge {
                size: program.len(),
                capacity: ROM_SIZE,
            });
        }

        for (index, word) in program.iter().enumerate() {
            let address = address_bits(index, Ram32K::ADDRESS_WIDTH);
            self.chip.clock(word, &address, Bit::I);
        }
        self.loaded = Some(program.len());

        Ok(())
    }

    /// Fetch the instruction at a 15-bit address.
    pub fn read(&mut self, address: &[Bit]) -> Result<Word16, BusError> {
        self.chip.update(&Word16::ZERO, address, Bit::O)
    }

    /// Fetch the instruction at a 15-bit address without ticking.
    pub fn peek(&self, address: &[Bit]) -> Result<Word16, BusError> {
        self.chip.probe(address)
    }

    /// Number of words written by the preload, if any.
    pub fn program_len(&self) -> Option<usize> {
        self.loaded
    }
}

/// Errors that can occur while preloading the ROM.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RomError {
    #[error("instruction memory has already been loaded")]
    AlreadyLoaded,

    #[error("program size {size} exceeds ROM capacity {capacity}")]
    ProgramTooLarge { size: usize, capacity: usize },
}
