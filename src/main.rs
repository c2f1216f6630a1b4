//! nand16 - CLI Entry Point
//!
//! Commands:
//! - `nand16 run <program>` - Run a .hack file
//! - `nand16 debug <program>` - Interactive debugger
//! - `nand16 disasm <program>` - Disassemble a .hack file
//! - `nand16 test` - Built-in self-test

use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "nand16")]
#[command(author = "Yigit")]
#[command(version = "0.1.0")]
#[command(about = "A 16-bit computer simulated gate by gate from a single NAND")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program until it parks in an idle loop
    Run {
        /// Path to the .hack file to execute
        program: String,
        /// Maximum number of ticks to run (default: 10000)
        #[arg(short, long, default_value = "10000")]
        max_cycles: u64,
        /// Show trace output
        #[arg(short, long)]
        trace: bool,
        /// Print a RAM range after the run, as START:LEN
        #[arg(short, long, value_parser = parse_range)]
        dump: Option<MemoryRange>,
        /// Print the final state as JSON
        #[arg(long)]
        json: bool,
    },
    /// Interactive debugger
    Debug {
        /// Path to the .hack file to debug
        program: String,
    },
    /// Disassemble a .hack file to readable text
    Disasm {
        /// Path to the .hack file
        program: String,
    },
    /// Run the built-in self-test
    Test,
}

#[derive(Debug, Clone, Copy)]
struct MemoryRange {
    start: usize,
    len: usize,
}

fn parse_range(s: &str) -> Result<MemoryRange, String> {
    let (start, len) = s
        .split_once(':')
        .ok_or_else(|| format!("expected START:LEN, got '{}'", s))?;
    let start: usize = start.trim().parse().map_err(|e| format!("bad start: {}", e))?;
    let len: usize = len.trim().parse().map_err(|e| format!("bad length: {}", e))?;

    if start >= nand16::computer::RAM_SIZE {
        return Err(format!("start {} is outside RAM", start));
    }
    Ok(MemoryRange { start, len })
}

#[derive(Serialize)]
struct RunReport {
    summary: nand16::RunSummary,
    state: nand16::MachineState,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    memory: Vec<MemoryCell>,
}

#[derive(Serialize)]
struct MemoryCell {
    address: usize,
    value: i16,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run { program, max_cycles, trace, dump, json }) => {
            run_program(&program, max_cycles, trace, dump, json);
        }
        Some(Commands::Debug { program }) => {
            debug_program(&program);
        }
        Some(Commands::Disasm { program }) => {
            disassemble_file(&program);
        }
        Some(Commands::Test) => {
            run_self_test();
        }
        None => {
            println!("nand16 v0.1.0");
            println!("A 16-bit computer built from a single NAND gate");
            println!();
            println!("Use --help for available commands");
            println!();
            demo_gates();
        }
    }
}

fn load_program(path: &str) -> Vec<nand16::Word16> {
    match nand16::load_hack(path) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("❌ Failed to load program: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_program(path: &str, max_cycles: u64, trace: bool, dump: Option<MemoryRange>, json: bool) {
    use nand16::Computer;
    use nand16::computer::RAM_SIZE;
    use nand16::program::disassemble_word;

    let program = load_program(path);
    if program.is_empty() {
        eprintln!("❌ No instructions to execute");
        std::process::exit(1);
    }

    let mut computer = match Computer::with_program(&program) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("❌ Failed to load program: {}", e);
            std::process::exit(1);
        }
    };

    if !json {
        println!("🔧 Running: {}", path);
        println!("📂 Loaded {} instructions", program.len());
        println!();
        println!("━━━ Execution ━━━");
    }

    let result = computer.run_with(max_cycles, |report, cpu| {
        if !trace {
            return;
        }
        let out = &report.output;
        let write = if out.write_m.is_high() {
            format!("  RAM[{}] <- {}", out.address_m.to_u16() & 0x7fff, out.out_m.to_i16())
        } else {
            String::new()
        };
        println!("{:05}: {:<16} A={} D={}{}",
            out.pc.to_u16(), disassemble_word(&report.instruction),
            cpu.a().to_i16(), cpu.d().to_i16(), write);
    });

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("❌ Machine error at PC={}: {}", computer.cpu().program_counter().to_u16(), e);
            std::process::exit(1);
        }
    };

    let memory: Vec<MemoryCell> = match dump {
        Some(range) => {
            let end = range.start.saturating_add(range.len).min(RAM_SIZE);
            (range.start..end)
                .map(|address| MemoryCell {
                    address,
                    value: computer.ram_word(address).unwrap_or_default().to_i16(),
                })
                .collect()
        }
        None => Vec::new(),
    };

    if json {
        let report = RunReport { summary, state: computer.snapshot(), memory };
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("❌ Failed to serialize state: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let cpu = computer.cpu();
    println!();
    println!("━━━ Result ━━━");
    println!("Ticks: {}", summary.ticks);
    println!("State: {}", if summary.idle { "idle loop" } else { "running" });
    println!("A:   {} ({})", cpu.a(), cpu.a().to_i16());
    println!("D:   {} ({})", cpu.d(), cpu.d().to_i16());
    println!("PC:  {}", cpu.program_counter().to_u16());
    println!("ALU: {} ({})", cpu.last_alu(), cpu.last_alu().to_i16());

    if !memory.is_empty() {
        println!();
        println!("━━━ RAM ━━━");
        for cell in &memory {
            println!("{:05}: {}", cell.address, cell.value);
        }
    }

    if !summary.idle {
        println!();
        println!("⚠️  Reached max cycles limit ({}). Use --max-cycles to increase.", max_cycles);
    }
}

#[cfg(feature = "tui")]
fn debug_program(path: &str) {
    use nand16::tui::run_debugger;

    println!("🔍 Loading: {}", path);
    let program = load_program(path);

    if program.is_empty() {
        eprintln!("❌ No instructions to execute");
        std::process::exit(1);
    }

    println!("📂 Loaded {} instructions", program.len());
    println!("🚀 Launching debugger...");
    println!();

    if let Err(e) = run_debugger(program) {
        eprintln!("❌ Debugger error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "tui"))]
fn debug_program(_path: &str) {
    eprintln!("❌ The debugger requires the `tui` feature");
    std::process::exit(1);
}

fn disassemble_file(path: &str) {
    use nand16::disassemble;

    println!("📖 Disassembling: {}", path);
    println!();

    let program = load_program(path);
    println!("{}", disassemble(&program));
}

fn demo_gates() {
    use nand16::logic::{alu, and_, nand, not_, or_, xor, AluControl, Bit};
    use nand16::logic::arith::add16;
    use nand16::Word16;

    println!("━━━ NAND Gate Demo ━━━");
    println!();

    println!("Every gate is built from NAND:");
    println!("  a b | nand and or xor");
    for a in Bit::ALL {
        for b in Bit::ALL {
            println!("  {} {} |   {}   {}   {}   {}",
                a.to_char(), b.to_char(),
                nand(a, b).to_char(), and_(a, b).to_char(),
                or_(a, b).to_char(), xor(a, b).to_char());
        }
    }
    println!("  not 0 = {}, not 1 = {}", not_(Bit::O).to_char(), not_(Bit::I).to_char());
    println!();

    println!("16-bit ripple-carry adder:");
    let x = Word16::from_i16(1234);
    let y = Word16::from_i16(-567);
    println!("  {} = {}", x, x.to_i16());
    println!("  {} = {}", y, y.to_i16());
    println!("  sum = {}", add16(&x, &y).to_i16());
    println!();

    println!("ALU:");
    for (name, pattern) in [("x+y", 0b000010u8), ("x-y", 0b010011), ("x&y", 0b000000), ("x|y", 0b010101)] {
        let out = alu(&x, &y, AluControl::from_u8(pattern));
        println!("  {:<4} = {:>6}  zr={} ng={}", name, out.out.to_i16(), out.zr.to_char(), out.ng.to_char());
    }
    println!();

    println!("✓ Gate-level primitives working!");
}

fn run_self_test() {
    use nand16::logic::{alu, and_, mux, nand, or_, xor, AluControl, Bit};
    use nand16::logic::arith::add16;
    use nand16::cpu::{MemoryTier, Ram8};
    use nand16::cpu::memory::address_bits;
    use nand16::{Computer, Word16};

    println!("━━━ nand16 Self-Test ━━━");
    println!();

    let mut passed = 0;
    let mut failed = 0;

    // Test 1: NAND truth table
    print!("NAND truth table... ");
    let ok = Bit::ALL.iter().all(|&a| {
        Bit::ALL.iter().all(|&b| nand(a, b).is_high() == !(a.is_high() && b.is_high()))
    });
    if ok { println!("✓"); passed += 1; }
    else { println!("✗"); failed += 1; }

    // Test 2: Derived gates
    print!("AND/OR/XOR truth tables... ");
    let ok = Bit::ALL.iter().all(|&a| {
        Bit::ALL.iter().all(|&b| {
            and_(a, b).is_high() == (a.is_high() && b.is_high())
                && or_(a, b).is_high() == (a.is_high() || b.is_high())
                && xor(a, b).is_high() == (a.is_high() != b.is_high())
        })
    });
    if ok { println!("✓"); passed += 1; }
    else { println!("✗"); failed += 1; }

    // Test 3: Multiplexer
    print!("Multiplexer selection... ");
    if mux(Bit::O, Bit::I, Bit::I) == Bit::I && mux(Bit::O, Bit::I, Bit::O) == Bit::O {
        println!("✓");
        passed += 1;
    } else {
        println!("✗");
        failed += 1;
    }

    // Test 4: Adder wraps modulo 2^16
    print!("16-bit addition wraps... ");
    let sum = add16(&Word16::from_u16(0xffff), &Word16::from_u16(2));
    if sum.to_u16() == 1 {
        println!("✓");
        passed += 1;
    } else {
        println!("✗ (got {}, expected 1)", sum.to_u16());
        failed += 1;
    }

    // Test 5: ALU subtraction
    print!("ALU x-y and flags... ");
    let out = alu(&Word16::from_i16(5), &Word16::from_i16(9), AluControl::from_u8(0b010011));
    if out.out.to_i16() == -4 && out.ng == Bit::I && out.zr == Bit::O {
        println!("✓");
        passed += 1;
    } else {
        println!("✗ (got {}, expected -4)", out.out.to_i16());
        failed += 1;
    }

    // Test 6: RAM write isolation
    print!("RAM8 write isolation... ");
    let mut ram = Ram8::new();
    ram.clock(&Word16::from_u16(42), &address_bits(5, 3), Bit::I);
    let hit = ram.probe_unchecked(&address_bits(5, 3)).to_u16();
    let miss = ram.probe_unchecked(&address_bits(4, 3)).to_u16();
    if hit == 42 && miss == 0 {
        println!("✓");
        passed += 1;
    } else {
        println!("✗ (got {} and {})", hit, miss);
        failed += 1;
    }

    // Test 7: Full machine stores D into RAM
    print!("Computer @10 / D=A / @20 / M=D... ");
    let program: Vec<Word16> = [10u16, 0xec10, 20, 0xe308]
        .iter()
        .map(|&w| Word16::from_u16(w))
        .collect();
    let stored = Computer::with_program(&program)
        .and_then(|mut computer| {
            for _ in 0..program.len() {
                computer.step()?;
            }
            Ok(computer.ram_word(20)?.to_u16())
        });
    match stored {
        Ok(10) => {
            println!("✓");
            passed += 1;
        }
        Ok(value) => {
            println!("✗ (got {}, expected 10)", value);
            failed += 1;
        }
        Err(e) => {
            println!("✗ ({})", e);
            failed += 1;
        }
    }

    println!();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Results: {} passed, {} failed", passed, failed);

    if failed == 0 {
        println!("✓ All tests passed!");
    } else {
        std::process::exit(1);
    }
}
