//! WebAssembly bindings for the 16-bit machine.
//!
//! This module provides JavaScript-friendly wrappers around [`Computer`].

use wasm_bindgen::prelude::*;
use crate::computer::{Computer, RAM_SIZE};
use crate::logic::Word16;
use crate::program::{disassemble_word, parse_hack};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WebAssembly-friendly machine wrapper.
#[wasm_bindgen]
pub struct WasmComputer {
    computer: Computer,
}

#[wasm_bindgen]
impl WasmComputer {
    /// Create a machine with empty memories.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            computer: Computer::new(),
        }
    }

    /// Replace the machine with a fresh one running `.hack` program text.
    /// Returns the number of instructions loaded.
    #[wasm_bindgen]
    pub fn load_hack(&mut self, source: &str) -> Result<usize, JsError> {
        let program = parse_hack(source)
            .map_err(|e| JsError::new(&format!("{}", e)))?;

        self.computer = Computer::with_program(&program)
            .map_err(|e| JsError::new(&format!("{}", e)))?;

        Ok(program.len())
    }

    /// Step one tick. Returns the disassembled instruction executed.
    #[wasm_bindgen]
    pub fn step(&mut self) -> Result<String, JsError> {
        let report = self.computer.step()
            .map_err(|e| JsError::new(&format!("{}", e)))?;

        Ok(disassemble_word(&report.instruction))
    }

    /// Run until idle or `max_ticks`. Returns true if the machine went idle.
    #[wasm_bindgen]
    pub fn run(&mut self, max_ticks: u32) -> Result<bool, JsError> {
        let summary = self.computer.run(max_ticks as u64)
            .map_err(|e| JsError::new(&format!("{}", e)))?;
        Ok(summary.idle)
    }

    /// Pulse the reset line for one tick.
    #[wasm_bindgen]
    pub fn reset(&mut self) -> Result<(), JsError> {
        self.computer.reset()
            .map_err(|e| JsError::new(&format!("{}", e)))?;
        Ok(())
    }

    #[wasm_bindgen]
    pub fn ticks(&self) -> u64 {
        self.computer.ticks()
    }

    #[wasm_bindgen]
    pub fn pc(&self) -> u16 {
        self.computer.cpu().program_counter().to_u16()
    }

    /// A register as a signed value.
    #[wasm_bindgen]
    pub fn a(&self) -> i16 {
        self.computer.cpu().a().to_i16()
    }

    /// D register as a signed value.
    #[wasm_bindgen]
    pub fn d(&self) -> i16 {
        self.computer.cpu().d().to_i16()
    }

    #[wasm_bindgen]
    pub fn last_alu(&self) -> i16 {
        self.computer.cpu().last_alu().to_i16()
    }

    /// Get the RAM word at `index`. Out-of-range reads return 0.
    #[wasm_bindgen]
    pub fn memory_at(&self, index: usize) -> i16 {
        if index < RAM_SIZE {
            self.computer.ram_word(index).unwrap_or_default().to_i16()
        } else {
            0
        }
    }

    /// Get `len` RAM words starting at `start`, clipped to the address space.
    #[wasm_bindgen]
    pub fn memory_range(&self, start: usize, len: usize) -> js_sys::Uint16Array {
        let start = start.min(RAM_SIZE);
        let end = start.saturating_add(len).min(RAM_SIZE);
        let words: Vec<u16> = (start..end)
            .map(|i| self.computer.ram_word(i).unwrap_or_default().to_u16())
            .collect();
        js_sys::Uint16Array::from(words.as_slice())
    }

    /// Get registers and tick count as a JSON string.
    #[wasm_bindgen]
    pub fn state_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.computer.snapshot())
            .map_err(|e| JsError::new(&format!("{}", e)))
    }
}

impl Default for WasmComputer {
    fn default() -> Self {
        Self::new()
    }
}

/// Disassemble a single 16-bit instruction word.
#[wasm_bindgen]
pub fn wasm_disassemble(value: u16) -> String {
    disassemble_word(&Word16::from_u16(value))
}
