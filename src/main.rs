mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use rice_catapult::clock::FrameClock;
use rice_catapult::compute::{tick, GameEvent, GameSession};
use rice_catapult::config::SimConfig;
use rice_catapult::error::Result;
use rice_catapult::input::{Action, InputState};

/// Terminal catapult shooter.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// TOML file overriding the built-in tuning.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for enemy spawns and AI; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs here (the terminal itself is taken by the game).
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Frames a press or repeat event keeps its key held when the terminal
/// never reports the release.
const HOLD_WINDOW: u64 = 8;

fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn bindings(action: Action) -> &'static [KeyCode] {
    match action {
        Action::Left => &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')],
        Action::Right => &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')],
        Action::Up => &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')],
        Action::Down => &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')],
        Action::Fire => &[KeyCode::Char(' ')],
        Action::Restart => &[KeyCode::Char('r'), KeyCode::Char('R'), KeyCode::Enter],
    }
}

const ACTIONS: [Action; 6] = [
    Action::Left,
    Action::Right,
    Action::Up,
    Action::Down,
    Action::Fire,
    Action::Restart,
];

fn snapshot(key_frame: &HashMap<KeyCode, u64>, frame: u64) -> InputState {
    let mut input = InputState::default();
    for action in ACTIONS {
        let held = bindings(action)
            .iter()
            .any(|key| is_held(key_frame, key, frame));
        input.set(action, held);
    }
    input
}

fn init_logging(path: &PathBuf) -> Result<()> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rice_catapult=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Input model: a `key_frame` map records the frame of the last press/repeat
/// event per key; every simulation step reads which keys are still fresh.
/// This lets movement and fire be held together.
fn game_loop<W: Write>(
    out: &mut W,
    session: &mut GameSession,
    rng: &mut StdRng,
    rx: &mpsc::Receiver<Event>,
) -> Result<()> {
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut clock = FrameClock::new(
        Duration::from_millis(session.config.session.frame_millis),
        session.config.session.max_catch_up,
    );
    let mut last = Instant::now();

    loop {
        // ── Input ─────────────────────────────────────────────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent {
                code,
                kind,
                modifiers,
                ..
            }) = ev
            else {
                continue;
            };
            match kind {
                KeyEventKind::Press => {
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(());
                        }
                        _ => {}
                    }
                    key_frame.insert(code, session.frame);
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code, session.frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        let now = Instant::now();
        let due = clock.accumulate(now - last);
        last = now;

        for _ in 0..due {
            let input = snapshot(&key_frame, session.frame);
            for event in tick(session, &input, rng)? {
                if let GameEvent::EnteredState(state) = event {
                    tracing::info!(%state, "entered state");
                }
            }
        }

        if due > 0 {
            display::render(out, session)?;
        }
        thread::sleep(clock.until_next());
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut session = GameSession::new(config, &mut rng)?;

    let mut out = BufWriter::new(stdout());
    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release events; terminals without support fall back to HOLD_WINDOW.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread to blocking event reads so the loop never blocks on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });

    let result = game_loop(&mut out, &mut session, &mut rng, &rx);

    // Terminal is restored on every exit path
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    if let Err(err) = &result {
        tracing::error!(%err, "game loop aborted");
    }
    tracing::info!(final_score = session.scoreboard.score, "session ended");
    result
}
