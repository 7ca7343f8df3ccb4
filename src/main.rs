mod display;

use std::cell::Cell;
use std::fs::File;
use std::io::{stdout, BufWriter, Stdout, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal, ExecutableCommand,
};
use tracing_subscriber::EnvFilter;

use typing_shooter::config::{CharSelection, GameConfig, Preset, Tuning};
use typing_shooter::entities::KeyPress;
use typing_shooter::session::Session;

/// Redraw interval; the simulation itself runs on the session clocks.
const FRAME: Duration = Duration::from_millis(16);

/// Type the falling characters to shoot them down.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Characters to practise (A-Z, 0-9). Empty means all of them.
    #[arg(long, default_value = "")]
    chars: String,

    /// Fixed RNG seed for a reproducible session.
    #[arg(long)]
    seed: Option<u64>,

    /// Chance that an enemy repeats the previous letter.
    #[arg(long, default_value_t = typing_shooter::config::STREAK_CHANCE)]
    streak_chance: f64,

    /// Longest run of one repeated letter.
    #[arg(long, default_value_t = typing_shooter::config::MAX_STREAK)]
    max_streak: u32,

    /// Log destination. The terminal itself is busy drawing the game.
    #[arg(long, default_value = "typing_shooter.log")]
    log_file: PathBuf,
}

impl Args {
    fn game_config(&self) -> Result<GameConfig> {
        Ok(GameConfig {
            tuning: Tuning {
                streak_chance: self.streak_chance,
                max_streak: self.max_streak,
                ..Tuning::default()
            },
            selection: CharSelection::from_chars(&self.chars)?,
            seed: self.seed,
        })
    }
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

// ── Terminal lifetime ────────────────────────────────────────────────────────

/// Raw mode + alternate screen for as long as it lives. Dropping it restores
/// the terminal on every exit path, including errors.
struct TerminalGuard {
    out: BufWriter<Stdout>,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        let mut out = BufWriter::new(stdout());
        terminal::enable_raw_mode()?;
        out.execute(terminal::EnterAlternateScreen)?;
        out.execute(cursor::Hide)?;
        Ok(Self { out })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = self.out.execute(cursor::Show);
        let _ = self.out.execute(terminal::LeaveAlternateScreen);
        let _ = self.out.flush();
        let _ = terminal::disable_raw_mode();
    }
}

// ── Input ────────────────────────────────────────────────────────────────────

enum Control {
    Continue,
    Quit,
}

/// Apply one key event. Before the start, letters edit the selection;
/// afterwards they go to the session as shots.
fn handle_key(session: &mut Session, key: KeyEvent) -> Control {
    if key.kind == KeyEventKind::Release {
        return Control::Continue;
    }
    match key.code {
        KeyCode::Esc => return Control::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return Control::Quit;
        }
        _ => {}
    }

    // Held space would otherwise flicker between paused and running
    if key.code == KeyCode::Char(' ') {
        if key.kind == KeyEventKind::Press {
            session.press(KeyPress::Space);
        }
        return Control::Continue;
    }

    if let Some(selection) = session.selection_mut() {
        match key.code {
            KeyCode::Char(c) => {
                selection.toggle(c);
            }
            KeyCode::Backspace => selection.clear(),
            KeyCode::F(1) => selection.apply(Preset::HomeRow),
            KeyCode::F(2) => selection.apply(Preset::LeftHand),
            _ => {}
        }
        return Control::Continue;
    }

    if let KeyCode::Char(c) = key.code {
        session.press(KeyPress::Char(c));
    }
    Control::Continue
}

// ── Game loop ────────────────────────────────────────────────────────────────

fn run<W: Write>(out: &mut W, session: &mut Session, rx: &mpsc::Receiver<Event>) -> Result<()> {
    // (best of finished sessions, score of the last one)
    let scores = Rc::new(Cell::new((0u32, 0u32)));

    let on_over = Rc::clone(&scores);
    session.on_game_over(move |score| {
        let (best, _) = on_over.get();
        on_over.set((best, score));
        tracing::info!(score, "final score");
    });
    let on_restart = Rc::clone(&scores);
    session.on_restart(move || {
        let (best, last) = on_restart.get();
        on_restart.set((best.max(last), last));
    });

    let mut last = Instant::now();
    loop {
        let frame_start = Instant::now();

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(key) => {
                    if let Control::Quit = handle_key(session, key) {
                        tracing::info!(status = ?session.status(), "quit");
                        return Ok(());
                    }
                }
                Event::Resize(cols, rows) => {
                    session.set_viewport(display::viewport_for(cols, rows));
                }
                _ => {}
            }
        }

        let now = Instant::now();
        session.advance(now - last);
        last = now;

        for event in session.drain_events() {
            tracing::trace!(?event, "session event");
        }

        let (best, _) = scores.get();
        display::render(out, session, best)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ──────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.game_config()?;
    init_logging(&args.log_file)?;
    tracing::info!(?args, "starting");

    let (cols, rows) = terminal::size()?;
    let mut session = Session::new(config, display::viewport_for(cols, rows))?;
    let mut guard = TerminalGuard::enter()?;

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = run(&mut guard.out, &mut session, &rx);
    drop(guard);
    if let Err(err) = &result {
        tracing::error!(%err, "terminated");
    }
    result
}
