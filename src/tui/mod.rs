//! TUI debugger for the 16-bit machine.
//!
//! Provides an interactive terminal-based debugger with:
//! - The program listing around the program counter
//! - A, D, PC and the last ALU result
//! - A scrollable data memory window
//! - Step/run/breakpoint controls

mod app;
mod ui;

pub use app::{Command, DebuggerApp, run_debugger};
