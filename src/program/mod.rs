//! Program files and disassembly.
//!
//! - [`hack`] - Reading and writing `.hack` text files
//! - [`disasm`] - Rendering instruction words as assembly text

pub mod hack;
pub mod disasm;

pub use hack::{parse_hack, load_hack, save_hack, HackError};
pub use disasm::{disassemble, disassemble_word};
