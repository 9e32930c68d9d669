//! Minimal operator surface: a status readout of held positions and pending
//! orders, plus an F12 kill switch. Holds no trading state of its own — it
//! only reads through `PositionSource`/`PendingOrderSource` and posts
//! `KillCommand::Kill` onto the channel the engine loop polls each tick.

use algo_trade_core::traits::{PendingOrderSource, PositionSource};
use algo_trade_engine::KillCommand;
use anyhow::Result;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use ratatui::{Frame, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

struct App {
    positions: Arc<dyn PositionSource>,
    pending: Arc<dyn PendingOrderSource>,
    killed: bool,
    messages: Vec<String>,
}

impl App {
    fn new(positions: Arc<dyn PositionSource>, pending: Arc<dyn PendingOrderSource>) -> Self {
        Self { positions, pending, killed: false, messages: Vec::new() }
    }

    fn add_message(&mut self, msg: impl Into<String>) {
        self.messages.push(msg.into());
        if self.messages.len() > 50 {
            self.messages.remove(0);
        }
    }
}

/// Runs the TUI to completion (until `q` or Ctrl-C is raised in-terminal).
/// `kill_tx` is the sender half the engine loop's `KillSwitch` receives from.
pub async fn run(
    positions: Arc<dyn PositionSource>,
    pending: Arc<dyn PendingOrderSource>,
    kill_tx: mpsc::Sender<KillCommand>,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(positions, pending);
    let res = run_app(&mut terminal, &mut app, &kill_tx).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    kill_tx: &mpsc::Sender<KillCommand>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(Duration::from_millis(200))? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::F(12) => {
                        if !app.killed {
                            kill_tx.send(KillCommand::Kill).await.ok();
                            app.killed = true;
                            app.add_message("F12 pressed: kill switch sent, engine is unwinding");
                        }
                    }
                    KeyCode::Char('q') => break,
                    _ => {}
                }
            }
        }
    }
    Ok(())
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(8),
            Constraint::Length(3),
        ])
        .split(f.area());

    let title_style = if app.killed {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    };
    let title_text = if app.killed { "ENGINE KILLED — unwinding" } else { "ENGINE RUNNING" };
    f.render_widget(
        Paragraph::new(title_text).style(title_style).block(Block::default().borders(Borders::ALL).title("status")),
        chunks[0],
    );

    let held = app.positions.held_positions();
    let pending = app.pending.all_pending();
    let mut lines: Vec<ListItem> = held
        .iter()
        .map(|p| {
            ListItem::new(Line::from(vec![Span::raw(format!(
                "{}  {:?} x{} @ {}c  cost_basis={}c",
                p.ticker, p.side, p.quantity, p.avg_price, p.cost_basis
            ))]))
        })
        .collect();
    if lines.is_empty() {
        lines.push(ListItem::new("no open positions"));
    }
    f.render_widget(
        List::new(lines).block(Block::default().borders(Borders::ALL).title(format!("positions ({})", held.len()))),
        chunks[1],
    );

    let pending_lines: Vec<ListItem> = pending
        .iter()
        .map(|p| ListItem::new(format!("{}  qty={} price={}c taker={}", p.ticker, p.quantity, p.price, p.is_taker)))
        .collect();
    f.render_widget(
        List::new(pending_lines)
            .block(Block::default().borders(Borders::ALL).title(format!("pending orders ({})", pending.len()))),
        chunks[2],
    );

    f.render_widget(
        Paragraph::new("F12: kill switch   q: quit TUI (engine keeps running headless)")
            .block(Block::default().borders(Borders::ALL)),
        chunks[3],
    );
}
