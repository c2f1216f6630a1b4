//! Debugger application state and logic.

use std::collections::HashSet;
use crate::computer::{Computer, IdleDetector, RAM_SIZE};
use crate::cpu::rom::ROM_SIZE;
use crate::logic::Word16;
use crate::program::disassemble_word;

/// Debugger application state.
pub struct DebuggerApp {
    /// The machine being debugged.
    pub computer: Computer,
    /// The loaded program, kept for the listing.
    pub program: Vec<Word16>,
    /// Breakpoints (by ROM address).
    pub breakpoints: HashSet<u16>,
    /// Is the debugger running continuously?
    pub running: bool,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
    /// First RAM address shown in the memory window.
    pub mem_scroll: usize,
    /// Cached contents of the memory window.
    pub mem_view: Vec<Word16>,
    mem_rows: usize,
    idle: IdleDetector,
    /// Set by `run` so the first tick steps off a breakpoint under the PC.
    resuming: bool,
}

impl DebuggerApp {
    /// Create a new debugger with a loaded program.
    pub fn new(program: Vec<Word16>) -> Self {
        let mut app = Self {
            computer: Computer::new(),
            program,
            breakpoints: HashSet::new(),
            running: false,
            should_quit: false,
            status: "Ready. Press 's' to step, 'r' to run, 'q' to quit.".into(),
            mem_scroll: 0,
            mem_view: Vec::new(),
            mem_rows: 16,
            idle: IdleDetector::new(),
            resuming: false,
        };
        if let Err(e) = app.computer.load_program(&app.program) {
            app.status = format!("Error: {}", e);
        }
        app.refresh_memory();
        app
    }

    /// The next instruction address.
    pub fn pc(&self) -> u16 {
        self.computer.cpu().program_counter().to_u16()
    }

    /// Step one tick.
    pub fn step(&mut self) {
        let pc = self.pc();
        let instruction = disassemble_word(&self.word_at(pc as usize));

        match self.computer.step() {
            Ok(report) => {
                self.status = if report.output.write_m.is_high() {
                    format!(
                        "PC={:05}: {}  RAM[{}] <- {}",
                        pc,
                        instruction,
                        report.output.address_m.to_u16() & 0x7fff,
                        report.output.out_m.to_i16()
                    )
                } else {
                    format!("PC={:05}: {}", pc, instruction)
                };
                if self.idle.observe(self.computer.cpu().state(), report.output.write_m) {
                    self.running = false;
                    self.status = format!("Idle loop at PC={} after {} ticks", self.pc(), self.computer.ticks());
                }
            }
            Err(e) => {
                self.status = format!("Error: {}", e);
                self.running = false;
            }
        }
        self.refresh_memory();
    }

    /// Run until an idle loop or breakpoint.
    pub fn run(&mut self) {
        self.running = true;
        self.resuming = true;
        self.idle.clear();
        self.status = "Running...".into();
    }

    /// Run one iteration of continuous execution.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }

        let pc = self.pc();
        let resuming = std::mem::take(&mut self.resuming);
        if !resuming && self.breakpoints.contains(&pc) {
            self.running = false;
            self.status = format!("Breakpoint at PC={}", pc);
            return;
        }

        self.step();
    }

    /// Toggle breakpoint at current PC.
    pub fn toggle_breakpoint(&mut self) {
        let pc = self.pc();
        if self.breakpoints.remove(&pc) {
            self.status = format!("Removed breakpoint at PC={}", pc);
        } else {
            self.breakpoints.insert(pc);
            self.status = format!("Set breakpoint at PC={}", pc);
        }
    }

    /// Pulse the reset line for one tick.
    pub fn reset(&mut self) {
        self.running = false;
        self.idle.clear();
        match self.computer.reset() {
            Ok(_) => self.status = "Reset. Ready.".into(),
            Err(e) => self.status = format!("Error: {}", e),
        }
        self.refresh_memory();
    }

    /// Scroll the memory window by `delta` rows.
    pub fn scroll_memory(&mut self, delta: isize) {
        let last = RAM_SIZE.saturating_sub(self.mem_rows);
        self.mem_scroll = self.mem_scroll.saturating_add_signed(delta).min(last);
        self.refresh_memory();
    }

    /// Resize the memory window to `rows` words.
    pub fn set_memory_rows(&mut self, rows: usize) {
        if rows != self.mem_rows {
            self.mem_rows = rows;
            self.refresh_memory();
        }
    }

    /// Re-read the memory window.
    fn refresh_memory(&mut self) {
        let end = (self.mem_scroll + self.mem_rows).min(RAM_SIZE);
        self.mem_view = (self.mem_scroll..end)
            .map(|addr| self.computer.ram_word(addr).unwrap_or_default())
            .collect();
    }

    /// The ROM word at `addr`. Words past the program are zero.
    fn word_at(&self, addr: usize) -> Word16 {
        self.program.get(addr).copied().unwrap_or_default()
    }

    /// Get disassembly around current PC.
    pub fn get_disassembly(&self, lines: usize) -> Vec<(u16, String, bool)> {
        let pc = self.pc() as usize;
        let start = pc.saturating_sub(lines / 2);
        let end = (start + lines).min(ROM_SIZE);

        (start..end)
            .map(|addr| {
                let text = disassemble_word(&self.word_at(addr));
                (addr as u16, text, addr == pc)
            })
            .collect()
    }
}

/// The debugger's key bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Step,
    Run,
    Pause,
    ToggleBreakpoint,
    Reset,
    Scroll(isize),
    Quit,
}

impl Command {
    pub fn from_key(code: crossterm::event::KeyCode) -> Option<Self> {
        use crossterm::event::KeyCode;

        match code {
            KeyCode::Char('s') => Some(Command::Step),
            KeyCode::Char('r') => Some(Command::Run),
            KeyCode::Char('p') => Some(Command::Pause),
            KeyCode::Char('b') => Some(Command::ToggleBreakpoint),
            KeyCode::Char('x') => Some(Command::Reset),
            KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
            KeyCode::Up => Some(Command::Scroll(-1)),
            KeyCode::Down => Some(Command::Scroll(1)),
            KeyCode::PageUp => Some(Command::Scroll(-16)),
            KeyCode::PageDown => Some(Command::Scroll(16)),
            _ => None,
        }
    }
}

impl DebuggerApp {
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Step => {
                self.running = false;
                self.step();
            }
            Command::Run => self.run(),
            Command::Pause => {
                self.running = false;
                self.status = "Paused.".into();
            }
            Command::ToggleBreakpoint => self.toggle_breakpoint(),
            Command::Reset => self.reset(),
            Command::Scroll(delta) => self.scroll_memory(delta),
            Command::Quit => self.should_quit = true,
        }
    }
}

/// Leaves raw mode and the alternate screen when dropped, including on error.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> std::io::Result<Self> {
        use crossterm::{terminal::{enable_raw_mode, EnterAlternateScreen}, ExecutableCommand};

        enable_raw_mode()?;
        std::io::stdout().execute(EnterAlternateScreen)?;
        Ok(TerminalGuard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        use crossterm::{terminal::{disable_raw_mode, LeaveAlternateScreen}, ExecutableCommand};

        let _ = disable_raw_mode();
        let _ = std::io::stdout().execute(LeaveAlternateScreen);
    }
}

/// Run the debugger with a program.
pub fn run_debugger(program: Vec<Word16>) -> std::io::Result<()> {
    use crossterm::event::{self, Event, KeyEventKind};
    use ratatui::prelude::*;
    use std::time::Duration;

    let _guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(std::io::stdout()))?;
    let mut app = DebuggerApp::new(program);

    while !app.should_quit {
        terminal.draw(|frame| super::ui::draw(frame, &mut app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(command) = Command::from_key(key.code) {
                        app.apply(command);
                    }
                }
            }
        }

        app.tick();
    }

    Ok(())
}
