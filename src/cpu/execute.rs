//! The CPU datapath.
//!
//! One call to [`Cpu::update`] is one clock tick. The tick is evaluated in
//! two phases: the ALU and jump logic read A and D as they stood at the
//! start of the tick, then A, D and the program counter commit together.

use serde::{Serialize, Deserialize};
use crate::cpu::decode::field;
use crate::cpu::{ProgramCounter, Register};
use crate::logic::bit::{and_, not_, or_, or3};
use crate::logic::{alu, mux16, AluControl, Bit, Word16};

/// CPU outputs for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuOutput {
    /// Value to write to memory (the ALU result).
    pub out_m: Word16,
    /// High when `out_m` should be stored at `address_m`.
    pub write_m: Bit,
    /// The A register after this tick; the memory address for writes and
    /// for the next tick's memory input.
    pub address_m: Word16,
    /// The program counter as it stood before this tick.
    pub pc: Word16,
}

/// A serializable view of the CPU's registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuState {
    pub a: u16,
    pub d: u16,
    pub pc: u16,
    pub last_alu: u16,
}

/// The CPU: A and D registers, the program counter, and the most recent
/// ALU result.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Cpu {
    a: Register,
    d: Register,
    pc: ProgramCounter,
    last_alu: Word16,
}

impl Cpu {
    /// Create a CPU with every register zeroed.
    pub fn new() -> Self {
        Self {
            a: Register::new(),
            d: Register::new(),
            pc: ProgramCounter::new(),
            last_alu: Word16::zero(),
        }
    }

    /// Execute one tick.
    ///
    /// - `in_m`: the memory word at the current A address
    /// - `instruction`: the instruction fetched at the current PC
    /// - `reset`: force the program counter to 0, overriding any jump
    pub fn update(&mut self, in_m: &Word16, instruction: &Word16, reset: Bit) -> CpuOutput {
        let compute = instruction.get(field::CLASS);

        // Phase 1: combinational logic over the tick-start snapshot
        let a_now = self.a.probe();
        let d_now = self.d.probe();

        let y = mux16(&a_now, in_m, instruction.get(field::OPERAND));
        let result = alu(&d_now, &y, AluControl::from_instruction(instruction));

        let a_source = mux16(instruction, &result.out, compute);
        let load_a = or_(not_(compute), and_(compute, instruction.get(field::DEST_A)));
        let load_d = and_(compute, instruction.get(field::DEST_D));
        let write_m = and_(compute, instruction.get(field::DEST_M));

        let positive = and_(not_(result.ng), not_(result.zr));
        let condition = or3(
            and_(instruction.get(field::JUMP_LT), result.ng),
            and_(instruction.get(field::JUMP_EQ), result.zr),
            and_(instruction.get(field::JUMP_GT), positive),
        );
        // address instructions reuse the jump positions as value bits
        let jump = and_(compute, condition);

        // Phase 2: commit
        let address_m = self.a.update(&a_source, load_a);
        self.d.update(&result.out, load_d);
        let pc = self.pc.update(&address_m, Bit::I, jump, reset);
        self.last_alu = result.out;

        CpuOutput {
            out_m: result.out,
            write_m,
            address_m,
            pc,
        }
    }

    /// The address of the next instruction to fetch.
    #[inline]
    pub fn program_counter(&self) -> Word16 {
        self.pc.probe()
    }

    #[inline]
    pub fn a(&self) -> Word16 {
        self.a.probe()
    }

    #[inline]
    pub fn d(&self) -> Word16 {
        self.d.probe()
    }

    /// The ALU result produced by the most recent tick.
    #[inline]
    pub fn last_alu(&self) -> Word16 {
        self.last_alu
    }

    pub fn state(&self) -> CpuState {
        CpuState {
            a: self.a().to_u16(),
            d: self.d().to_u16(),
            pc: self.program_counter().to_u16(),
            last_alu: self.last_alu.to_u16(),
        }
    }
}

impl std::fmt::Debug for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu")
            .field("a", &self.a())
            .field("d", &self.d())
            .field("pc", &self.program_counter())
            .field("last_alu", &self.last_alu)
            .finish()
    }
}
