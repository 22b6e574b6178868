/// Terminal renderer for a `GameSession`.
///
/// Sprites arrive through the library's `Surface` trait and are scaled from
/// arena pixels down to terminal cells. Reads the session, never mutates it.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use rice_catapult::compute::{GameSession, GameState};
use rice_catapult::entities::{EnemyKind, ProjectileKind};
use rice_catapult::geometry::Rect;
use rice_catapult::render::{draw_session, Hud, Sprite, Surface};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_LIFE: Color = Color::Red;
const C_HUD_RICE: Color = Color::White;
const C_CATAPULT: Color = Color::White;
const C_RICE: Color = Color::Cyan;
const C_NOTE: Color = Color::Magenta;
const C_LASER: Color = Color::Red;
const C_ORIEL: Color = Color::Green;
const C_LAURA: Color = Color::Yellow;
const C_LETTER: Color = Color::Cyan;
const C_HINT: Color = Color::DarkGrey;

// ── Cell surface ──────────────────────────────────────────────────────────────

struct Cell {
    col: u16,
    row: u16,
    text: String,
    color: Color,
}

/// Collects sprites as terminal cells; written out in one pass afterwards.
struct CellSurface {
    arena: Rect,
    cols: u16,
    rows: u16,
    cells: Vec<Cell>,
}

impl CellSurface {
    fn new(arena: Rect, cols: u16, rows: u16) -> Self {
        Self {
            arena,
            cols,
            rows,
            cells: Vec::new(),
        }
    }

    // Playfield is rows 2..rows-2 and columns 1..cols-1, inside the border.
    fn field_cols(&self) -> f32 {
        f32::from(self.cols.saturating_sub(2).max(1))
    }

    fn field_rows(&self) -> f32 {
        f32::from(self.rows.saturating_sub(4).max(1))
    }

    fn to_cell(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        let fx = (x - self.arena.x) / self.arena.width;
        let fy = (y - self.arena.y) / self.arena.height;
        if !(0.0..1.0).contains(&fx) || !(0.0..1.0).contains(&fy) {
            return None;
        }
        let col = 1 + (fx * self.field_cols()) as u16;
        let row = 2 + (fy * self.field_rows()) as u16;
        Some((col, row))
    }

    fn span(&self, width: f32) -> usize {
        ((width / self.arena.width) * self.field_cols()).round().max(1.0) as usize
    }
}

impl Surface for CellSurface {
    fn draw(&mut self, sprite: Sprite, rect: &Rect) {
        let Some((col, row)) = self.to_cell(rect.x, rect.y) else {
            return;
        };
        let span = self.span(rect.width);
        let (text, color) = match sprite {
            Sprite::Catapult { reloaded } => {
                let arm = if reloaded { "o" } else { "-" };
                (format!("\\{}/", arm.repeat(span.saturating_sub(2).max(1))), C_CATAPULT)
            }
            Sprite::Projectile(ProjectileKind::Rice) => ("•".to_string(), C_RICE),
            Sprite::Projectile(ProjectileKind::Note) => ("♪".to_string(), C_NOTE),
            Sprite::Projectile(ProjectileKind::Laser) => ("|".to_string(), C_LASER),
            Sprite::Enemy(EnemyKind::Oriel) => ("W".repeat(span), C_ORIEL),
            Sprite::Enemy(EnemyKind::Laura) => ("M".repeat(span), C_LAURA),
            Sprite::Letter(glyph) => (glyph.to_uppercase().collect(), C_LETTER),
        };
        self.cells.push(Cell { col, row, text, color });
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, session: &GameSession) -> std::io::Result<()> {
    let (cols, rows) = terminal::size()?;
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, cols, rows)?;
    draw_hud(out, &session.hud(), cols)?;

    let mut surface = CellSurface::new(session.arena, cols, rows);
    draw_session(session, &mut surface);
    for cell in &surface.cells {
        out.queue(cursor::MoveTo(cell.col, cell.row))?;
        out.queue(style::SetForegroundColor(cell.color))?;
        out.queue(Print(&cell.text))?;
    }

    match session.state {
        GameState::Intro => draw_intro(out, cols, rows)?,
        GameState::Playing => draw_controls_hint(out, rows)?,
        GameState::GameOver => draw_game_over(out, session, cols, rows)?,
    }

    // Cursor parked on the hint row
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, cols: u16, rows: u16) -> std::io::Result<()> {
    let w = cols as usize;
    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, rows.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..rows.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(cols.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, hud: &Hud, cols: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score:{:>7}  x{}", hud.score, hud.multiplier)))?;

    let rice = format!("Rice:{}", "•".repeat(hud.rice_ready));
    let rx = (cols / 2).saturating_sub(rice.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_RICE))?;
    out.queue(Print(&rice))?;

    let filled = hud.life.max(0) as usize;
    let empty = (hud.max_life - hud.life).max(0) as usize;
    let life = format!("Life:{}{}", "█".repeat(filled), "░".repeat(empty));
    let lx = cols.saturating_sub(life.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(lx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_LIFE))?;
    out.queue(Print(&life))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_centered<W: Write>(
    out: &mut W,
    lines: &[(&str, Color)],
    cols: u16,
    start_row: u16,
) -> std::io::Result<()> {
    let cx = cols / 2;
    for (i, (msg, color)) in lines.iter().enumerate() {
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }
    Ok(())
}

fn draw_intro<W: Write>(out: &mut W, cols: u16, rows: u16) -> std::io::Result<()> {
    let lines: &[(&str, Color)] = &[
        ("Throw rice at the newlyweds!", Color::White),
        ("Use the arrow keys or WASD to move the catapult", Color::White),
        ("Press SPACE to throw rice. Shoot the letters to begin.", Color::White),
    ];
    draw_centered(out, lines, cols, (rows * 2 / 3).max(3))
}

fn draw_controls_hint<W: Write>(out: &mut W, rows: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("←↑↓→ / WASD : Move   SPACE : Throw   Q : Quit"))?;
    Ok(())
}

fn draw_game_over<W: Write>(
    out: &mut W,
    session: &GameSession,
    cols: u16,
    rows: u16,
) -> std::io::Result<()> {
    let score_line = format!("Final Score: {:>7}", session.scoreboard.score);
    let locked = session.over_counter <= session.config.session.game_over_lock;
    let hint = if locked { "" } else { "R - Start over   Q - Quit" };
    let lines: &[(&str, Color)] = &[
        ("╔════════════════════╗", Color::Red),
        ("║      ROASTED       ║", Color::Red),
        ("╚════════════════════╝", Color::Red),
        (&score_line, Color::Yellow),
        (hint, Color::White),
    ];
    draw_centered(out, lines, cols, (rows / 2).saturating_sub(3))
}
