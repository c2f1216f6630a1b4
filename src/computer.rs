//! The complete machine: CPU, data memory and instruction memory.
//!
//! Each tick fetches the instruction addressed by the program counter,
//! runs it through the CPU together with the memory word produced on the
//! previous tick, and hands the CPU's outputs to data memory. Data memory's
//! output becomes the CPU's memory input on the following tick.
//!
//! The machine has no halt state: a program ends by looping on itself.
//! [`Computer::step`] advances exactly one tick so a driver can observe
//! every intermediate state; [`Computer::run`] is a bounded driver that
//! also recognizes such terminal loops.

use serde::{Serialize, Deserialize};
use thiserror::Error;
use crate::cpu::memory::{checked_address_bits, MemoryTier};
use crate::cpu::{Cpu, CpuOutput, CpuState, Ram32K, Rom32K, RomError};
use crate::logic::{Bit, BusError, Word16};

/// Number of words of data memory.
pub const RAM_SIZE: usize = 32768;

/// What happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// The instruction executed this tick.
    pub instruction: Word16,
    pub output: CpuOutput,
}

/// Result of a bounded run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Ticks executed by this call.
    pub ticks: u64,
    /// True if the run stopped because the machine entered a loop that
    /// can never change its state again.
    pub idle: bool,
}

/// A serializable snapshot of the machine's registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineState {
    #[serde(flatten)]
    pub cpu: CpuState,
    pub ticks: u64,
}

/// The computer.
#[derive(Debug)]
pub struct Computer {
    cpu: Cpu,
    ram: Ram32K,
    rom: Rom32K,
    /// Data memory output from the previous tick.
    in_m: Word16,
    ticks: u64,
}

impl Computer {
    /// Create a machine with zeroed registers, RAM and ROM.
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            ram: Ram32K::new(),
            rom: Rom32K::new(),
            in_m: Word16::zero(),
            ticks: 0,
        }
    }

    /// Create a machine with `program` preloaded into ROM.
    pub fn with_program(program: &[Word16]) -> Result<Self, ComputerError> {
        let mut computer = Self::new();
        computer.load_program(program)?;
        Ok(computer)
    }

    /// Preload instruction memory. Only allowed once.
    pub fn load_program(&mut self, program: &[Word16]) -> Result<(), ComputerError> {
        self.rom.load(program)?;
        Ok(())
    }

    /// Advance one tick with the given reset line.
    pub fn tick(&mut self, reset: Bit) -> Result<TickReport, ComputerError> {
        let pc = self.cpu.program_counter();
        let instruction = self.rom.read(pc.address_bits())?;

        let output = self.cpu.update(&self.in_m, &instruction, reset);
        self.in_m = self.ram.update(
            &output.out_m,
            output.address_m.address_bits(),
            output.write_m,
        )?;
        self.ticks += 1;

        Ok(TickReport { instruction, output })
    }

    /// Advance one tick.
    #[inline]
    pub fn step(&mut self) -> Result<TickReport, ComputerError> {
        self.tick(Bit::O)
    }

    /// Advance one tick with reset held high, so the next fetch is from 0.
    ///
    /// The instruction fetched during the reset tick still executes.
    #[inline]
    pub fn reset(&mut self) -> Result<TickReport, ComputerError> {
        self.tick(Bit::I)
    }

    /// Step up to `max_ticks` times, stopping early once the machine is idle.
    ///
    /// Idle means the (PC, A, D) triple repeated with period one or two
    /// ticks and no memory write happened in between, which is the state of
    /// a program parked in its `@END / 0;JMP` loop.
    pub fn run(&mut self, max_ticks: u64) -> Result<RunSummary, ComputerError> {
        self.run_with(max_ticks, |_, _| {})
    }

    /// [`Computer::run`], calling `on_tick` after every tick with that
    /// tick's report and the CPU as it stands afterwards.
    pub fn run_with<F>(&mut self, max_ticks: u64, mut on_tick: F) -> Result<RunSummary, ComputerError>
    where
        F: FnMut(&TickReport, &Cpu),
    {
        let mut detector = IdleDetector::new();

        for tick in 0..max_ticks {
            let report = self.step()?;
            on_tick(&report, &self.cpu);
            if detector.observe(self.cpu.state(), report.output.write_m) {
                return Ok(RunSummary { ticks: tick + 1, idle: true });
            }
        }

        Ok(RunSummary { ticks: max_ticks, idle: false })
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Ticks executed since the machine was created.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The memory word the CPU will see as its memory input next tick.
    pub fn memory_input(&self) -> Word16 {
        self.in_m
    }

    /// Read a data memory word without ticking.
    ///
    /// Fails with [`BusError::AddressOutOfRange`] for `index >= RAM_SIZE`.
    pub fn ram_word(&self, index: usize) -> Result<Word16, BusError> {
        self.ram.probe(&checked_address_bits(index, Ram32K::ADDRESS_WIDTH)?)
    }

    /// Write a data memory word outside the clocked loop, e.g. to seed
    /// program inputs.
    pub fn poke(&mut self, index: usize, value: Word16) -> Result<(), BusError> {
        let address = checked_address_bits(index, Ram32K::ADDRESS_WIDTH)?;
        self.ram.update(&value, &address, Bit::I)?;
        Ok(())
    }

    /// Read an instruction word without ticking.
    pub fn rom_word(&self, index: usize) -> Result<Word16, BusError> {
        self.rom.peek(&checked_address_bits(index, Ram32K::ADDRESS_WIDTH)?)
    }

    /// Number of instructions in the loaded program, if one is loaded.
    pub fn program_len(&self) -> Option<usize> {
        self.rom.program_len()
    }

    pub fn snapshot(&self) -> MachineState {
        MachineState {
            cpu: self.cpu.state(),
            ticks: self.ticks,
        }
    }
}

impl Default for Computer {
    fn default() -> Self {
        Self::new()
    }
}

/// Recognizes a machine that can no longer change state.
///
/// Feed it the CPU state after every tick together with that tick's write
/// line. It reports idle once (PC, A, D) repeats with period one or two and
/// memory was not written over the repeating ticks. Since ROM is fixed and
/// RAM is untouched, the machine is then provably stuck in that cycle.
#[derive(Debug, Clone, Default)]
pub struct IdleDetector {
    // most recent first: (state after tick, write line during tick)
    recent: [Option<(CpuState, Bit)>; 2],
}

impl IdleDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one tick. Returns true if the machine is idle.
    pub fn observe(&mut self, now: CpuState, write: Bit) -> bool {
        let period_one = matches!(self.recent[0], Some((prev, _)) if same_registers(&prev, &now));
        let period_two = matches!(
            (self.recent[0], self.recent[1]),
            (Some((_, Bit::O)), Some((prev, _))) if same_registers(&prev, &now)
        );

        self.recent[1] = self.recent[0];
        self.recent[0] = Some((now, write));

        write == Bit::O && (period_one || period_two)
    }

    /// Forget all recorded ticks.
    pub fn clear(&mut self) {
        self.recent = [None, None];
    }
}

fn same_registers(a: &CpuState, b: &CpuState) -> bool {
    a.pc == b.pc && a.a == b.a && a.d == b.d
}

/// Errors that can occur while loading or running the computer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComputerError {
    #[error("bus error: {0}")]
    Bus(#[from] BusError),

    #[error("ROM error: {0}")]
    Rom(#[from] RomError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(lines: &[&str]) -> Vec<Word16> {
        lines.iter().map(|l| Word16::parse(l).unwrap()).collect()
    }

    // RAM[0] = 2 + 3, then park in a loop
    const ADD: [&str; 8] = [
        "0000000000000010", // @2
        "1110110000010000", // D=A
        "0000000000000011", // @3
        "1110000010010000", // D=D+A
        "0000000000000000", // @0
        "1110001100001000", // M=D
        "0000000000000110", // @6
        "1110101010000111", // 0;JMP
    ];

    #[test]
    fn test_fetches_sequentially() {
        let mut computer = Computer::with_program(&program(&ADD)).unwrap();
        let first = computer.step().unwrap();
        assert_eq!(first.instruction.to_u16(), 2);
        assert_eq!(first.output.pc.to_u16(), 0);

        let second = computer.step().unwrap();
        assert_eq!(second.output.pc.to_u16(), 1);
        assert_eq!(computer.cpu().d().to_u16(), 2);
    }

    #[test]
    fn test_add_program_writes_ram_and_goes_idle() {
        let mut computer = Computer::with_program(&program(&ADD)).unwrap();
        let summary = computer.run(100).unwrap();

        assert!(summary.idle);
        assert_eq!(summary.ticks, 9);
        assert_eq!(computer.ram_word(0).unwrap().to_u16(), 5);
        assert_eq!(computer.cpu().d().to_u16(), 5);
    }

    #[test]
    fn test_memory_input_follows_address() {
        // @5, D=M
        let mut computer = Computer::with_program(&program(&[
            "0000000000000101",
            "1111110000010000",
        ]))
        .unwrap();
        computer.poke(5, Word16::from_u16(77)).unwrap();

        computer.step().unwrap();
        assert_eq!(computer.memory_input().to_u16(), 77);
        computer.step().unwrap();
        assert_eq!(computer.cpu().d().to_u16(), 77);
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let mut computer = Computer::new();
        let overflow = BusError::AddressOutOfRange { index: RAM_SIZE, capacity: RAM_SIZE };

        assert_eq!(computer.poke(RAM_SIZE, Word16::from_u16(9)), Err(overflow.clone()));
        assert_eq!(computer.ram_word(RAM_SIZE), Err(overflow.clone()));
        assert_eq!(computer.rom_word(RAM_SIZE), Err(overflow));
        assert!(computer.ram_word(0).unwrap().is_zero());
    }

    #[test]
    fn test_last_word_is_addressable() {
        let mut computer = Computer::new();
        computer.poke(RAM_SIZE - 1, Word16::from_u16(9)).unwrap();
        assert_eq!(computer.ram_word(RAM_SIZE - 1).unwrap().to_u16(), 9);
        assert!(computer.ram_word(0).unwrap().is_zero());
    }

    #[test]
    fn test_countdown_loop_takes_back_edge() {
        // D = 3; LOOP: RAM[1] += 1; D -= 1; if D > 0 goto LOOP; park
        let mut computer = Computer::with_program(&program(&[
            "0000000000000011", // @3
            "1110110000010000", // D=A
            "0000000000000001", // @1      (LOOP)
            "1111110111001000", // M=M+1
            "1110001110010000", // D=D-1
            "0000000000000010", // @2
            "1110001100000001", // D;JGT
            "0000000000000111", // @7
            "1110101010000111", // 0;JMP
        ]))
        .unwrap();
        let summary = computer.run(100).unwrap();

        assert!(summary.idle);
        assert_eq!(summary.ticks, 20);
        assert_eq!(computer.ram_word(1).unwrap().to_u16(), 3);
        assert!(computer.cpu().d().is_zero());
    }

    #[test]
    fn test_run_with_sees_every_tick() {
        let mut computer = Computer::with_program(&program(&ADD)).unwrap();
        let mut pcs = Vec::new();
        let mut writes = 0;
        let summary = computer
            .run_with(100, |report, _| {
                pcs.push(report.output.pc.to_u16());
                if report.output.write_m.is_high() {
                    writes += 1;
                }
            })
            .unwrap();

        assert_eq!(pcs.len() as u64, summary.ticks);
        assert_eq!(&pcs[..7], &[0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(writes, 1);
    }

    #[test]
    fn test_run_respects_tick_limit() {
        // counts forever in D: D=D+1, @0, 0;JMP
        let mut computer = Computer::with_program(&program(&[
            "1110011111010000",
            "0000000000000000",
            "1110101010000111",
        ]))
        .unwrap();
        let summary = computer.run(6).unwrap();

        assert!(!summary.idle);
        assert_eq!(summary.ticks, 6);
        assert_eq!(computer.cpu().d().to_u16(), 2);
    }

    #[test]
    fn test_reset_restarts_from_zero() {
        let mut computer = Computer::with_program(&program(&ADD)).unwrap();
        computer.run(4).unwrap();
        computer.reset().unwrap();
        assert!(computer.cpu().program_counter().is_zero());
        assert_eq!(computer.ticks(), 5);
    }

    #[test]
    fn test_program_loads_once() {
        let mut computer = Computer::with_program(&program(&ADD)).unwrap();
        assert_eq!(
            computer.load_program(&program(&ADD)),
            Err(ComputerError::Rom(RomError::AlreadyLoaded))
        );
        assert_eq!(computer.program_len(), Some(8));
        assert_eq!(computer.rom_word(7).unwrap().to_u16(), 0xea87);
    }

    #[test]
    fn test_idle_detector_needs_quiet_repeat() {
        let state = |pc, a, d| CpuState { a, d, pc, last_alu: 0 };
        let mut detector = IdleDetector::new();

        assert!(!detector.observe(state(7, 6, 5), Bit::O));
        assert!(!detector.observe(state(6, 6, 5), Bit::I));
        // period two, but the middle tick wrote memory
        assert!(!detector.observe(state(7, 6, 5), Bit::O));
        assert!(detector.observe(state(6, 6, 5), Bit::O));

        detector.clear();
        assert!(!detector.observe(state(3, 3, 3), Bit::O));
        assert!(detector.observe(state(3, 3, 3), Bit::O));
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut computer = Computer::with_program(&program(&ADD)).unwrap();
        computer.step().unwrap();
        let json = serde_json::to_string(&computer.snapshot()).unwrap();
        assert!(json.contains("\"a\":2"));
        assert!(json.contains("\"ticks\":1"));
    }
}
