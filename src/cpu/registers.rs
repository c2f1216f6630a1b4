//! Clocked storage: the single-bit cell, the 16-bit register, and the
//! program counter.
//!
//! Every element follows the same tick contract: compute the next state
//! with a pure function of (current state, inputs), commit it, then report
//! the now-current value. With `load` low a tick is a plain read.

use serde::{Serialize, Deserialize};
use crate::logic::{inc16, mux, mux16, Bit, Word16};

/// A single edge-triggered storage bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dff {
    state: Bit,
}

impl Dff {
    pub const fn new() -> Self {
        Self { state: Bit::O }
    }

    /// Next state: `input` when `load` is high, otherwise the current state.
    #[inline]
    pub const fn next(state: Bit, input: Bit, load: Bit) -> Bit {
        mux(state, input, load)
    }

    /// Tick the cell and return its value after the tick.
    #[inline]
    pub fn update(&mut self, input: Bit, load: Bit) -> Bit {
        self.state = Self::next(self.state, input, load);
        self.state
    }

    /// Current value, without ticking.
    #[inline]
    pub const fn probe(&self) -> Bit {
        self.state
    }
}

/// Sixteen storage bits sharing one load line.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Register {
    cells: [Dff; 16],
}

impl Register {
    pub const fn new() -> Self {
        Self { cells: [Dff::new(); 16] }
    }

    /// Tick all 16 cells and return the register's value after the tick.
    pub fn update(&mut self, input: &Word16, load: Bit) -> Word16 {
        let mut out = Word16::zero();
        for (i, cell) in self.cells.iter_mut().enumerate() {
            out.set(i, cell.update(input.get(i), load));
        }
        out
    }

    /// Current value, without ticking.
    pub fn probe(&self) -> Word16 {
        let mut out = Word16::zero();
        for (i, cell) in self.cells.iter().enumerate() {
            out.set(i, cell.probe());
        }
        out
    }
}

/// The program counter.
///
/// Per tick, exactly one rule fires, in priority order:
/// reset (count = 0), load (count = in), inc (count + 1), hold.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgramCounter {
    count: Register,
}

impl ProgramCounter {
    pub const fn new() -> Self {
        Self { count: Register::new() }
    }

    /// The value the counter moves to from `current`.
    ///
    /// The mux stages run lowest priority first so the last stage (reset)
    /// overrides everything before it.
    pub fn next(current: &Word16, input: &Word16, inc: Bit, load: Bit, reset: Bit) -> Word16 {
        let value = mux16(current, &inc16(current), inc);
        let value = mux16(&value, input, load);
        mux16(&value, &Word16::ZERO, reset)
    }

    /// Commit the next count and return the count as it was before this tick.
    pub fn update(&mut self, input: &Word16, inc: Bit, load: Bit, reset: Bit) -> Word16 {
        let before = self.count.probe();
        let after = Self::next(&before, input, inc, load, reset);
        self.count.update(&after, Bit::I);
        before
    }

    /// Current count, without ticking.
    pub fn probe(&self) -> Word16 {
        self.count.probe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Bit::{I, O};

    #[test]
    fn test_dff_initialization() {
        let dff = Dff::new();
        assert_eq!(dff.probe(), O);
    }

    #[test]
    fn test_dff_holds_without_load() {
        let mut dff = Dff::new();
        assert_eq!(dff.update(I, O), O);
        assert_eq!(dff.probe(), O);
    }

    #[test]
    fn test_dff_load_is_visible_same_tick() {
        let mut dff = Dff::new();
        assert_eq!(dff.update(I, I), I);
        assert_eq!(dff.update(O, O), I);
        assert_eq!(dff.update(O, I), O);
    }

    #[test]
    fn test_dff_next_is_pure() {
        for state in Bit::ALL {
            for input in Bit::ALL {
                assert_eq!(Dff::next(state, input, O), state);
                assert_eq!(Dff::next(state, input, I), input);
            }
        }
    }

    #[test]
    fn test_register_initialization() {
        let reg = Register::new();
        assert!(reg.probe().is_zero());
    }

    #[test]
    fn test_register_update_no_load() {
        let mut reg = Register::new();
        let out = reg.update(&Word16::ONES, O);
        assert!(out.is_zero());
        assert!(reg.probe().is_zero());
    }

    #[test]
    fn test_register_persistence() {
        let value = Word16::from_u16(0xbeef);
        let mut reg = Register::new();

        assert_eq!(reg.update(&value, I), value);
        for _ in 0..5 {
            assert_eq!(reg.update(&Word16::from_u16(1), O), value);
        }
    }

    #[test]
    fn test_pc_returns_value_before_update() {
        let mut pc = ProgramCounter::new();
        assert_eq!(pc.update(&Word16::ZERO, I, O, O).to_u16(), 0);
        assert_eq!(pc.update(&Word16::ZERO, I, O, O).to_u16(), 1);
        assert_eq!(pc.probe().to_u16(), 2);
    }

    #[test]
    fn test_pc_load() {
        let mut pc = ProgramCounter::new();
        pc.update(&Word16::from_u16(1000), I, I, O);
        assert_eq!(pc.probe().to_u16(), 1000);
    }

    #[test]
    fn test_pc_hold() {
        let mut pc = ProgramCounter::new();
        pc.update(&Word16::from_u16(7), O, I, O);
        pc.update(&Word16::from_u16(9), O, O, O);
        assert_eq!(pc.probe().to_u16(), 7);
    }

    #[test]
    fn test_pc_reset_takes_priority() {
        let mut pc = ProgramCounter::new();
        pc.update(&Word16::from_u16(500), O, I, O);

        let before = pc.update(&Word16::from_u16(42), I, I, I);
        assert_eq!(before.to_u16(), 500);
        assert!(pc.probe().is_zero());
    }

    #[test]
    fn test_pc_load_beats_increment() {
        let mut pc = ProgramCounter::new();
        pc.update(&Word16::from_u16(42), I, I, O);
        assert_eq!(pc.probe().to_u16(), 42);
    }

    #[test]
    fn test_pc_increment_wraps() {
        let mut pc = ProgramCounter::new();
        pc.update(&Word16::ONES, O, I, O);
        let before = pc.update(&Word16::ZERO, I, O, O);
        assert_eq!(before, Word16::ONES);
        assert!(pc.probe().is_zero());
    }
}
