//! Terminal view of the kart grid.
//!
//! Draws the spot grid with each spot's direction marker and current name,
//! a status bar showing the connection (and `STALE` once it is lost), and
//! the event log. `s` asks the name server to scramble; `q`, `Esc` or
//! `Ctrl+C` quit.

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame, Terminal,
};

use kart_protocol::{ConnectionState, Orientation};
use kart_state::{AppState, GridCell, LogCategory};

use crate::controller::Controller;

/// What a key press asks the console to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleAction {
    None,
    Scramble,
    Quit,
}

/// Map a key press to an action.
pub fn action_for_key(code: KeyCode, modifiers: KeyModifiers) -> ConsoleAction {
    match (code, modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => ConsoleAction::Quit,
        (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => ConsoleAction::Quit,
        (KeyCode::Char('s'), _) | (KeyCode::Char('S'), _) => ConsoleAction::Scramble,
        _ => ConsoleAction::None,
    }
}

/// Render the full console layout.
pub fn render(frame: &mut Frame, state: &AppState) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Status bar
            Constraint::Min(6),    // Grid
            Constraint::Length(8), // Event log
            Constraint::Length(3), // Hints
        ])
        .split(frame.area());

    render_status_bar(frame, outer[0], state);
    render_grid(frame, outer[1], state);
    render_event_log(frame, outer[2], state);
    render_hints(frame, outer[3]);
}

fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title(" Kart Grid ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let mut spans = vec![
        Span::styled("  Server: ", Style::default().fg(Color::Gray)),
        Span::styled(state.endpoint.as_str(), Style::default().fg(Color::White)),
        Span::styled("  |  Connection: ", Style::default().fg(Color::Gray)),
        Span::styled(
            state.connection.as_str(),
            Style::default().fg(connection_color(state.connection)),
        ),
    ];
    if state.stale {
        spans.push(Span::styled(
            " STALE ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        ));
    }
    spans.extend([
        Span::styled("  |  Spots: ", Style::default().fg(Color::Gray)),
        Span::styled(
            state.grid.spot_count().to_string(),
            Style::default().fg(Color::Green),
        ),
        Span::styled("  |  Names: ", Style::default().fg(Color::Gray)),
        Span::styled(
            state.names.names().len().to_string(),
            Style::default().fg(if state.names.names().len() > state.grid.spot_count() {
                Color::Yellow
            } else {
                Color::Green
            }),
        ),
        Span::styled("  |  Frames: ", Style::default().fg(Color::Gray)),
        Span::styled(
            state.frames_received.to_string(),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_grid(frame: &mut Frame, area: Rect, state: &AppState) {
    let border = if state.stale { Color::Red } else { Color::Yellow };
    let block = Block::default()
        .title(format!(" Layout ({} columns) ", state.grid.columns()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let columns = state.grid.columns().max(1);
    let label_style = if state.stale {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    };

    let rows: Vec<Row> = state
        .grid
        .rows()
        .map(|cells| {
            Row::new(cells.iter().map(|cell| match cell {
                GridCell::Blank => Cell::from(""),
                GridCell::Spot(index) => match state.grid.spot(*index) {
                    Some(spot) => Cell::from(Line::from(vec![
                        Span::styled(
                            format!("{} ", spot.orientation().arrow()),
                            Style::default().fg(orientation_color(spot.orientation())),
                        ),
                        Span::styled(spot.label().to_string(), label_style),
                    ])),
                    None => Cell::from(""),
                },
            }))
            .height(1)
        })
        .collect();

    let widths = vec![Constraint::Ratio(1, columns as u32); columns];
    let table = Table::new(rows, widths).block(block).column_spacing(1);
    frame.render_widget(table, area);
}

fn render_event_log(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title(" Events ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let inner_height = area.height.saturating_sub(2) as usize;
    let start = state.event_log.len().saturating_sub(inner_height);
    let lines: Vec<Line> = state.event_log[start..]
        .iter()
        .map(|entry| {
            Line::from(vec![
                Span::styled(
                    format!("  [{}] ", entry.timestamp.format("%H:%M:%S")),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!("{:<6}", entry.category.as_str()),
                    Style::default().fg(category_color(entry.category)),
                ),
                Span::styled(entry.message.as_str(), Style::default().fg(Color::Gray)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_hints(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    let hint = Line::from(vec![
        Span::styled("  s", Style::default().fg(Color::Green)),
        Span::styled(" scramble  |  ", Style::default().fg(Color::DarkGray)),
        Span::styled("q", Style::default().fg(Color::Green)),
        Span::styled(" / Esc / Ctrl+C quit", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(hint).block(block), area);
}

fn connection_color(state: ConnectionState) -> Color {
    match state {
        ConnectionState::Disconnected | ConnectionState::Connecting => Color::Yellow,
        ConnectionState::Open => Color::Green,
        ConnectionState::Closed | ConnectionState::Errored => Color::Red,
    }
}

fn orientation_color(orientation: Orientation) -> Color {
    match orientation {
        Orientation::Up => Color::Cyan,
        Orientation::Right => Color::Magenta,
        Orientation::Down => Color::LightBlue,
        Orientation::Left => Color::LightYellow,
    }
}

fn category_color(category: LogCategory) -> Color {
    match category {
        LogCategory::Layout => Color::Cyan,
        LogCategory::Names => Color::Green,
        LogCategory::Connection => Color::Yellow,
        LogCategory::Command => Color::Magenta,
        LogCategory::Error => Color::Red,
    }
}

/// Set up the terminal for TUI rendering.
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

/// Restore the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the console until the operator quits.
///
/// Pending sync events are applied between frames; the console keeps
/// showing the last labels after the connection is lost.
pub async fn run_console(mut controller: Controller) -> anyhow::Result<()> {
    use std::io::IsTerminal;
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        return Err(anyhow::anyhow!("Console requires a terminal (TTY)."));
    }

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let tick_rate = Duration::from_millis(100);

    let result: anyhow::Result<()> = async {
        loop {
            controller.drain_pending();
            terminal.draw(|frame| render(frame, controller.state()))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match action_for_key(key.code, key.modifiers) {
                        ConsoleAction::Quit => break,
                        ConsoleAction::Scramble => {
                            controller.scramble();
                        }
                        ConsoleAction::None => {}
                    }
                }
            }
            // Let the connection task make progress between frames.
            tokio::task::yield_now().await;
        }
        Ok(())
    }
    .await;

    restore_terminal(&mut terminal)?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use kart_protocol::{parse_layout, NameList};
    use kart_state::{NameState, RenderedGrid};
    use ratatui::backend::TestBackend;
    use std::collections::HashMap;

    fn sample_state() -> AppState {
        let grid = RenderedGrid::render(&parse_layout("0 1\n2 3").unwrap());
        let cache: HashMap<String, String> = HashMap::new();
        let mut state = AppState::new(
            grid,
            NameState::initial(&cache, "kart", 4),
            "ws://localhost:9003/".into(),
        );
        state.paint_current().unwrap();
        state
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(
            action_for_key(KeyCode::Char('s'), KeyModifiers::NONE),
            ConsoleAction::Scramble
        );
        assert_eq!(
            action_for_key(KeyCode::Char('c'), KeyModifiers::CONTROL),
            ConsoleAction::Quit
        );
        assert_eq!(action_for_key(KeyCode::Esc, KeyModifiers::NONE), ConsoleAction::Quit);
        assert_eq!(
            action_for_key(KeyCode::Char('x'), KeyModifiers::NONE),
            ConsoleAction::None
        );
    }

    #[test]
    fn test_render_shows_labels() {
        let mut state = sample_state();
        state
            .apply_names(NameList::from_iter(["Ana", "Bo", "Cy", "Di"]))
            .unwrap();

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| render(frame, &state)).unwrap();
        let text = screen_text(&terminal);
        for name in ["Ana", "Bo", "Cy", "Di"] {
            assert!(text.contains(name), "missing {name} in\n{text}");
        }
        assert!(!text.contains("STALE"));
    }

    #[test]
    fn test_render_marks_stale_connection() {
        let mut state = sample_state();
        state.set_connection(ConnectionState::Connecting);
        state.mark_lost(ConnectionState::Errored, "refused".into());

        let mut terminal = Terminal::new(TestBackend::new(120, 24)).unwrap();
        terminal.draw(|frame| render(frame, &state)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("STALE"));
        assert!(text.contains("Errored"));
    }
}
