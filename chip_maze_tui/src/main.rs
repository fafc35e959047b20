use anyhow::{Context, Result, anyhow};
use chip_maze_core::{
    AvatarStage, Command, Direction as Move, Driver, Game, GameConfig, GameView, LevelCatalog,
    Phase, Position, Session, TileKind, chips_to_next_evolution,
};
use clap::Parser;
use ratatui::{
    crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
    widgets::*,
};
use std::{
    io::{self, Stdout},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Level file to play; repeat for several levels. Defaults to the built-in levels.
    #[arg(short, long = "level", value_name = "LEVEL_FILE")]
    levels: Vec<PathBuf>,

    /// Milliseconds between two agent steps
    #[arg(long, default_value_t = GameConfig::DEFAULT_AGENT_INTERVAL.as_millis() as u64)]
    agent_interval_ms: u64,

    /// Milliseconds between two animation frames
    #[arg(long, default_value_t = GameConfig::DEFAULT_ANIMATION_INTERVAL.as_millis() as u64)]
    animation_interval_ms: u64,

    /// Where to write logs (the terminal belongs to the UI)
    #[arg(long, value_name = "FILE", default_value = "chip_maze.log")]
    log_file: PathBuf,
}

struct App {
    /// The game engine and its clocks.
    driver: Driver,
    /// Flag to control the main loop.
    should_quit: bool,
}

impl App {
    fn new(game: Game, config: &GameConfig) -> Self {
        App {
            driver: Driver::new(game, config),
            should_quit: false,
        }
    }

    /// Maps a key press to a game command, or quits.
    fn on_key(&mut self, code: KeyCode) -> Result<()> {
        if matches!(code, KeyCode::Char('q') | KeyCode::Esc) {
            self.quit();
            return Ok(());
        }
        if let Some(command) = command_for(code) {
            let outcome = self.driver.handle(command)?;
            tracing::debug!(?command, ?outcome, "command handled");
        }
        Ok(())
    }

    /// Sets the quit flag.
    fn quit(&mut self) {
        self.should_quit = true;
    }
}

/// Key bindings: arrows or WASD move, Space confirms, `r` restarts.
fn command_for(code: KeyCode) -> Option<Command> {
    match code {
        KeyCode::Up | KeyCode::Char('w') => Some(Command::Move(Move::Up)),
        KeyCode::Down | KeyCode::Char('s') => Some(Command::Move(Move::Down)),
        KeyCode::Left | KeyCode::Char('a') => Some(Command::Move(Move::Left)),
        KeyCode::Right | KeyCode::Char('d') => Some(Command::Move(Move::Right)),
        KeyCode::Char(' ') | KeyCode::Enter => Some(Command::Confirm),
        KeyCode::Char('r') => Some(Command::Restart),
        _ => None,
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();
    let _log_guard = init_logging(&args.log_file)?;

    let catalog = if args.levels.is_empty() {
        LevelCatalog::builtin().context("Failed to load built-in levels")?
    } else {
        LevelCatalog::from_files(&args.levels).context("Failed to load level files")?
    };
    let config = GameConfig::new()
        .with_agent_interval(Duration::from_millis(args.agent_interval_ms))
        .with_animation_interval(Duration::from_millis(args.animation_interval_ms));
    info!(levels = catalog.level_count(), ?config, "starting session");

    let game = Game::new(catalog, Session::new())?;
    let mut app = App::new(game, &config);

    // Set up the terminal
    let mut terminal = setup_terminal()?;

    // Run the main application loop, restoring the terminal even if it fails
    let result = run_app(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;

    let session = app.driver.into_game().into_session();
    info!(
        collected_lifetime = session.collected_lifetime(),
        "session ended"
    );
    result
}

/// Sends `tracing` output to `path`, filtered by `RUST_LOG` (default `info`).
fn init_logging(path: &Path) -> Result<WorkerGuard> {
    let directory = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("Log path has no file name: {}", path.display()))?;

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(guard)
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Runs the main loop of the TUI application.
///
/// Sleeps in `event::poll` until either a key arrives or the next clock fire
/// is due, then lets the measured time pass on the driver.
fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        // Draw the UI
        terminal.draw(|f| ui(f, app))?;

        let timeout = app.driver.until_next_fire();
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key.code)?;
                }
            }
        }

        let now = Instant::now();
        app.driver.advance(now.duration_since(last_tick));
        last_tick = now;

        // Exit loop if requested
        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Renders the user interface.
fn ui(frame: &mut Frame, app: &App) {
    let view = app.driver.view();
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(14),    // Area for the map
            Constraint::Length(5),  // Area for counters
            Constraint::Length(2),  // Area for status/help
        ])
        .split(frame.area());

    render_map(frame, main_layout[0], &view, app.driver.frame());
    render_hud(frame, main_layout[1], &view);

    let help_text = Paragraph::new(status_line(&view))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help_text, main_layout[2]);
}

fn status_line(view: &GameView) -> Line<'static> {
    match view.phase {
        Phase::Playing => Line::from("Arrows/WASD move · q quits"),
        Phase::Won if view.is_final_level() => {
            Line::styled("GAME COMPLETE!", Style::default().fg(Color::Green).bold())
        }
        Phase::Won => Line::styled(
            "LEVEL COMPLETE! Press SPACE for next level",
            Style::default().fg(Color::Green).bold(),
        ),
        Phase::Dead => Line::styled(
            "SECURITY BOT DETECTED! Press SPACE to restart",
            Style::default().fg(Color::Red).bold(),
        ),
    }
}

/// Renders the level title and counters.
fn render_hud(frame: &mut Frame, area: Rect, view: &GameView) {
    let stage = AvatarStage::from_lifetime(view.collected_lifetime);
    let next = match chips_to_next_evolution(view.collected_lifetime) {
        Some(needed) => format!("{needed} chips needed"),
        None => "MAX LEVEL!".to_string(),
    };
    let lines = vec![
        Line::from(format!(
            "LEVEL {}: {}",
            view.level_index + 1,
            view.level_name
        ))
        .bold(),
        Line::from(format!(
            "Chips: {}/{}   Total collected: {}",
            view.collected_this_level, view.total_this_level, view.collected_lifetime
        )),
        Line::from(format!("Avatar: {}   Next evolution: {}", stage.label(), next)),
    ];

    let hud = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Status"));
    frame.render_widget(hud, area);
}

/// Renders the board, agents and player onto the frame.
fn render_map(frame: &mut Frame, area: Rect, view: &GameView, animation_frame: u64) {
    let grid = view.grid;
    let blink = animation_frame % 6 < 3;
    let exit_open = view.remaining == 0;

    let mut lines: Vec<Line> = Vec::with_capacity(grid.height());
    for y in 0..grid.height() {
        let mut spans: Vec<Span> = Vec::with_capacity(grid.width());
        for x in 0..grid.width() {
            let pos = Position::new(x, y);
            if pos == view.player {
                spans.push(Span::styled("@ ", Style::default().fg(Color::Cyan).bold()));
                continue;
            }
            if view.agent_at(pos) {
                spans.push(Span::styled("B ", Style::default().fg(Color::Red).bold()));
                continue;
            }

            let span = match grid[pos] {
                TileKind::Wall => Span::styled("# ", Style::default().fg(Color::DarkGray)),
                TileKind::Collectible => Span::styled("c ", Style::default().fg(Color::Magenta)),
                TileKind::Exit if exit_open && blink => {
                    Span::styled("E ", Style::default().fg(Color::LightGreen).bold())
                }
                TileKind::Exit if exit_open => Span::styled("E ", Style::default().fg(Color::Green)),
                TileKind::Exit => Span::styled("E ", Style::default().fg(Color::DarkGray)),
                TileKind::Teleporter => {
                    let glyph = if blink { "O " } else { "o " };
                    Span::styled(glyph, Style::default().fg(Color::Blue))
                }
                TileKind::Hazard => Span::styled("~ ", Style::default().fg(Color::Red)),
                TileKind::Empty | TileKind::PlayerStart | TileKind::AgentStart => Span::raw("  "),
            };
            spans.push(span);
        }
        lines.push(Line::from(spans));
    }

    let map_paragraph = Paragraph::new(lines)
        .block(Block::default().title("Chip Maze").borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(map_paragraph, area);
}
