mod display;

use std::collections::HashMap;
use std::f32::consts::PI;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseButton, MouseEvent, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal,
    ExecutableCommand, QueueableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use milk_blaster::audio::{self, AudioSink, LoggingAudio};
use milk_blaster::config::GameConfig;
use milk_blaster::effects::Effect;
use milk_blaster::entities::Difficulty;
use milk_blaster::input::{Aim, InputFrame, Movement};
use milk_blaster::presentation::{present, release};
use milk_blaster::session::GameSession;

use display::{TerminalSurface, MIN_COLS, MIN_ROWS};

#[derive(Parser)]
#[command(name = "milk_blaster")]
#[command(about = "Top-down arcade shooter for the terminal")]
struct Args {
    /// TOML file with game settings
    #[arg(long)]
    config: Option<PathBuf>,
    /// Preselected difficulty for the menu (easy, normal, hard)
    #[arg(long)]
    difficulty: Option<Difficulty>,
    /// Start with music muted
    #[arg(long)]
    no_music: bool,
    /// Start with sound effects muted
    #[arg(long)]
    no_sfx: bool,
    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
    /// Where to write logs (the terminal is busy drawing the game)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

// ── Simultaneous-input constants ──────────────────────────────────────────────

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames. Covers terminals that don't emit key-release events:
/// at 60 FPS, 8 frames (≈133 ms) is refreshed by the OS key repeat before
/// it expires.
const HOLD_WINDOW: u64 = 8;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|key| {
        key_frame
            .get(key)
            .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
            .unwrap_or(false)
    })
}

const UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const FIRE: &[KeyCode] = &[KeyCode::Char('f'), KeyCode::Char('F')];

fn aim_key(code: KeyCode) -> Option<Aim> {
    match code {
        KeyCode::Char('i') | KeyCode::Char('I') => Some(Aim::Angle(-PI / 2.0)),
        KeyCode::Char('j') | KeyCode::Char('J') => Some(Aim::Angle(PI)),
        KeyCode::Char('k') | KeyCode::Char('K') => Some(Aim::Angle(PI / 2.0)),
        KeyCode::Char('l') | KeyCode::Char('L') => Some(Aim::Angle(0.0)),
        _ => None,
    }
}

/// Hand lifecycle or frame effects to the surface and the audio sink.
fn apply_effects(
    surface: &mut TerminalSurface,
    sink: &mut dyn AudioSink,
    session: &GameSession,
    effects: &[Effect],
) {
    present(surface, session.state(), effects);
    audio::dispatch(sink, effects);
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start(Difficulty),
    Quit,
}

fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    best_score: u32,
    preselected: Difficulty,
) -> std::io::Result<MenuResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "★  MILK  BLASTER  ★";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(6),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    if best_score > 0 {
        let hs_str = format!("Best Score: {}", best_score);
        out.queue(cursor::MoveTo(
            cx.saturating_sub(hs_str.chars().count() as u16 / 2),
            cy.saturating_sub(5),
        ))?;
        out.queue(style::SetForegroundColor(Color::Yellow))?;
        out.queue(Print(&hs_str))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(10), cy.saturating_sub(3)))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("Select difficulty (ENTER = "))?;
    out.queue(Print(preselected.label()))?;
    out.queue(Print("):"))?;

    let options: &[(&str, &str, Color, &str)] = &[
        ("1", "Easy  ", Color::Green,  "Fewer enemies, relaxed pace"),
        ("2", "Normal", Color::Yellow, "Balanced challenge"),
        ("3", "Hard  ", Color::Red,    "Relentless waves!"),
    ];

    for (i, (key, label, color, desc)) in options.iter().enumerate() {
        let row = cy.saturating_sub(1) + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(10), row))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("[{}] ", key)))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(format!("{:<8}", label)))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!(" — {}", desc)))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(10), cy + 3))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("Power-ups (dropped by enemies):"))?;

    let bonus_info: &[(&str, Color, &str)] = &[
        ("♥", Color::Magenta, " Health — +30 health"),
        ("»", Color::Cyan,    " Speed  — faster for 10 seconds"),
        ("★", Color::Yellow,  " Weapon — Power Milk, then Mega Milk"),
    ];
    for (i, (sym, color, desc)) in bonus_info.iter().enumerate() {
        let row = cy + 4 + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(10), row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(sym))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(*desc))?;
    }

    out.queue(style::ResetColor)?;
    out.flush()?;

    // Block until the user makes a choice
    loop {
        let Ok(event) = rx.recv() else {
            return Ok(MenuResult::Quit); // input thread is gone
        };
        if let Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. }) = event {
            match code {
                KeyCode::Char('1') => return Ok(MenuResult::Start(Difficulty::Easy)),
                KeyCode::Char('2') => return Ok(MenuResult::Start(Difficulty::Normal)),
                KeyCode::Char('3') => return Ok(MenuResult::Start(Difficulty::Hard)),
                KeyCode::Enter => return Ok(MenuResult::Start(preselected)),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(MenuResult::Quit);
                }
                _ => {}
            }
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

enum LoopExit {
    Quit,
    Menu,
}

/// Drives the session's frame scheduler until the player quits or goes
/// back to the menu.
///
/// Held keys are tracked in a `key_frame` map recording the frame of the
/// last press/repeat event for every key; each frame, keys still "fresh"
/// (within `HOLD_WINDOW`) make up the movement vector. Terminals with the
/// keyboard-enhancement protocol also send releases, which drop the key
/// immediately. Space is edge-triggered: only a fresh press fires the
/// special attack.
fn game_loop<W: Write>(
    out: &mut W,
    session: &mut GameSession,
    surface: &mut TerminalSurface,
    sink: &mut dyn AudioSink,
    rng: &mut StdRng,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<LoopExit> {
    let frame_interval = Duration::from_millis(session.config().frame_ms);
    let started = Instant::now();

    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut mouse_fire = false;
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        let mut special = false;
        let mut aim: Option<Aim> = None;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent { code, kind, modifiers, .. }) => match kind {
                    KeyEventKind::Press => {
                        key_frame.insert(code, frame);
                        let over = !session.is_running();
                        match code {
                            KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(LoopExit::Quit),
                            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                                return Ok(LoopExit::Quit);
                            }
                            KeyCode::Esc if !over => {
                                let effects = session.toggle_pause();
                                apply_effects(surface, sink, session, &effects);
                            }
                            KeyCode::Char(' ') => special = true,
                            KeyCode::Char('m') | KeyCode::Char('M') => {
                                let effects = session.toggle_music();
                                apply_effects(surface, sink, session, &effects);
                            }
                            KeyCode::Char('n') | KeyCode::Char('N') => session.toggle_sfx(),
                            KeyCode::Char('r') | KeyCode::Char('R') if over => {
                                let effects = session.restart();
                                apply_effects(surface, sink, session, &effects);
                            }
                            KeyCode::Enter if over => return Ok(LoopExit::Menu),
                            other => {
                                if let Some(a) = aim_key(other) {
                                    aim = Some(a);
                                }
                            }
                        }
                    }
                    KeyEventKind::Repeat => {
                        key_frame.insert(code, frame);
                    }
                    KeyEventKind::Release => {
                        key_frame.remove(&code);
                    }
                },
                Event::Mouse(MouseEvent { kind, column, row, .. }) => {
                    let (x, y) = surface.to_arena(column, row);
                    match kind {
                        MouseEventKind::Moved | MouseEventKind::Drag(MouseButton::Left) => {
                            aim = Some(Aim::Point { x, y });
                        }
                        MouseEventKind::Down(MouseButton::Left) => {
                            aim = Some(Aim::Point { x, y });
                            mouse_fire = true;
                        }
                        MouseEventKind::Up(MouseButton::Left) => mouse_fire = false,
                        _ => {}
                    }
                }
                Event::Resize(width, height) => surface.resize(width, height),
                _ => {}
            }
        }

        // ── Scheduled frame ───────────────────────────────────────────────────
        let input = InputFrame {
            movement: Movement::from_keys(
                is_held(&key_frame, UP, frame),
                is_held(&key_frame, DOWN, frame),
                is_held(&key_frame, LEFT, frame),
                is_held(&key_frame, RIGHT, frame),
            ),
            fire: mouse_fire || is_held(&key_frame, FIRE, frame),
            special,
            aim,
        };
        let now_ms = started.elapsed().as_millis() as u64;
        if let Some(report) = session.frame(&input, now_ms, rng) {
            apply_effects(surface, sink, session, &report.effects);
        }

        let game_over = (!session.is_running()).then(|| session.summary());
        surface.render(out, session.state(), &session.hud(), game_over)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_interval {
            std::thread::sleep(frame_interval - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("milk_blaster=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn load_config(args: &Args) -> anyhow::Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(difficulty) = args.difficulty {
        config.difficulty = difficulty;
    }
    if args.no_music {
        config.music_enabled = false;
    }
    if args.no_sfx {
        config.sfx_enabled = false;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_path = args
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("milk_blaster.log"));
    init_logging(&log_path)?;

    let config = load_config(&args)?;
    tracing::info!(?config, "configuration loaded");

    let (width, height) = terminal::size().context("failed to query terminal size")?;
    anyhow::ensure!(
        width >= MIN_COLS && height >= MIN_ROWS,
        "terminal is {width}x{height}, need at least {MIN_COLS}x{MIN_ROWS}"
    );

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode().context("failed to enable raw mode")?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(EnableMouseCapture)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "input thread stopped");
                break;
            }
        }
    });

    let result = run(&mut out, &rx, config, rng);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    config: GameConfig,
    mut rng: StdRng,
) -> anyhow::Result<()> {
    let (width, height) = terminal::size()?;
    let preselected = config.difficulty;
    let mut surface = TerminalSurface::new(config.arena(), width, height);
    let mut sink = LoggingAudio;
    let mut session = GameSession::create(config);
    let mut best_score = 0;

    loop {
        match show_menu(out, rx, best_score, preselected)? {
            MenuResult::Quit => break,
            MenuResult::Start(difficulty) => {
                surface.clear();
                let effects = session.start(difficulty);
                apply_effects(&mut surface, &mut sink, &session, &effects);

                let exit = game_loop(out, &mut session, &mut surface, &mut sink, &mut rng, rx)?;
                best_score = best_score.max(session.summary().score);

                if let LoopExit::Quit = exit {
                    break;
                }
                let effects = session.show_menu();
                apply_effects(&mut surface, &mut sink, &session, &effects);
            }
        }
    }

    let effects = session.destroy();
    release(&mut surface, &effects);
    audio::dispatch(&mut sink, &effects);
    Ok(())
}
