//! UI rendering for the debugger.
//!
//! ```text
//! +-------------------- Registers --------------------+
//! +------- Program -------+---------- RAM ------------+
//! |                       |                           |
//! +------- Status --------+---------- Keys -----------+
//! ```

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph, Row, Table},
};
use crate::logic::Word16;
use super::app::DebuggerApp;

const CURRENT: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);
const MUTED: Style = Style::new().fg(Color::DarkGray);

fn panel(title: &str, color: Color) -> Block<'_> {
    Block::new()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::new().fg(color))
}

pub fn draw(frame: &mut Frame, app: &mut DebuggerApp) {
    let [header, body, footer] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Min(8),
        Constraint::Length(4),
    ])
    .areas(frame.area());

    let [program, ram] = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .areas(body);
    let [status, keys] = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .areas(footer);

    // two border rows plus the column header
    app.set_memory_rows((ram.height as usize).saturating_sub(3));

    frame.render_widget(registers(app), header);
    frame.render_widget(listing(app, program.height.saturating_sub(2) as usize), program);
    frame.render_widget(memory(app), ram);
    frame.render_widget(
        Paragraph::new(app.status.as_str()).block(panel("Status", Color::White)),
        status,
    );
    frame.render_widget(
        Paragraph::new(vec![
            Line::from("s step  r run  p pause  b breakpoint"),
            Line::from("x reset  ↑↓ PgUp PgDn scroll RAM  q quit"),
        ])
        .style(MUTED)
        .block(panel("Keys", Color::DarkGray)),
        keys,
    );
}

fn register_spans(name: &'static str, value: Word16) -> [Span<'static>; 3] {
    [
        Span::raw(name),
        Span::styled(value.to_string(), Style::new().fg(Color::White)),
        Span::styled(format!(" {:>6}   ", value.to_i16()), MUTED),
    ]
}

fn registers(app: &DebuggerApp) -> Paragraph<'static> {
    let cpu = app.computer.cpu();

    let mut top: Vec<Span> = Vec::new();
    top.extend(register_spans("A ", cpu.a()));
    top.extend(register_spans("D ", cpu.d()));
    top.extend(register_spans("ALU ", cpu.last_alu()));

    let run_state = if app.running {
        Span::styled("RUNNING", Style::new().fg(Color::Green))
    } else {
        Span::styled("STOPPED", Style::new().fg(Color::Red))
    };
    let bottom = Line::from(vec![
        Span::raw("PC "),
        Span::styled(format!("{:05}", app.pc()), CURRENT),
        Span::raw("   M "),
        Span::raw(app.computer.memory_input().to_i16().to_string()),
        Span::raw("   ticks "),
        Span::styled(app.computer.ticks().to_string(), Style::new().fg(Color::Cyan)),
        Span::raw("   "),
        run_state,
    ]);

    Paragraph::new(vec![Line::from(top), bottom]).block(panel("Registers", Color::Green))
}

fn listing(app: &DebuggerApp, rows: usize) -> List<'static> {
    let items: Vec<ListItem> = app
        .get_disassembly(rows)
        .into_iter()
        .map(|(addr, text, is_current)| {
            let has_bp = app.breakpoints.contains(&addr);
            let marker = match (has_bp, is_current) {
                (true, true) => "●▶",
                (true, false) => "● ",
                (false, true) => " ▶",
                (false, false) => "  ",
            };
            let style = if is_current {
                CURRENT
            } else if has_bp {
                Style::new().fg(Color::Red)
            } else {
                Style::new()
            };
            ListItem::new(format!("{} {:05}  {}", marker, addr, text)).style(style)
        })
        .collect();

    List::new(items).block(panel("Program", Color::Cyan))
}

fn memory(app: &DebuggerApp) -> Table<'static> {
    let a = app.computer.cpu().a().to_u16() as usize & 0x7fff;

    let rows = app.mem_view.iter().enumerate().map(|(offset, value)| {
        let addr = app.mem_scroll + offset;
        let style = if addr == a {
            CURRENT
        } else if value.is_zero() {
            MUTED
        } else {
            Style::new()
        };
        Row::new([
            format!("{:05}", addr),
            format!("{:04x}", value.to_u16()),
            value.to_i16().to_string(),
        ])
        .style(style)
    });

    Table::new(rows, [Constraint::Length(6), Constraint::Length(5), Constraint::Min(6)])
        .header(Row::new(["addr", "hex", "value"]).style(MUTED))
        .block(panel("RAM", Color::Magenta))
}
