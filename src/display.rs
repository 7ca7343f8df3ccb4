//! Rendering layer. All terminal I/O lives here.
//!
//! Each function receives a mutable writer and an immutable view of the
//! session. No game logic is performed; this module only translates the
//! snapshot into terminal commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use typing_shooter::compute::{launch_origin, BACKDROP_WRAP};
use typing_shooter::config::{CharSelection, Preset, KEYBOARD_ROWS};
use typing_shooter::entities::{
    Backdrop, Enemy, Explosion, Projectile, SessionStatus, Snapshot, Viewport,
};
use typing_shooter::session::Session;

// ── Field mapping ────────────────────────────────────────────────────────────

/// Simulation units per terminal column / row.
pub const CELL_W: f32 = 10.0;
pub const CELL_H: f32 = 20.0;

/// HUD row plus top border above the field.
const FIELD_TOP: u16 = 2;
/// Bottom border plus hint row below the field.
const FIELD_BOTTOM_ROWS: u16 = 2;

/// Viewport covered by a terminal of `cols` × `rows`.
pub fn viewport_for(cols: u16, rows: u16) -> Viewport {
    let field_cols = cols.saturating_sub(2).max(1);
    let field_rows = rows.saturating_sub(FIELD_TOP + FIELD_BOTTOM_ROWS).max(1);
    Viewport::new(field_cols as f32 * CELL_W, field_rows as f32 * CELL_H)
}

struct Layout {
    width: u16,
    height: u16,
    field_cols: u16,
    field_rows: u16,
}

impl Layout {
    fn from_viewport(viewport: Viewport) -> Self {
        let field_cols = (viewport.width / CELL_W).round().max(1.0) as u16;
        let field_rows = (viewport.height / CELL_H).round().max(1.0) as u16;
        Self {
            width: field_cols + 2,
            height: field_rows + FIELD_TOP + FIELD_BOTTOM_ROWS,
            field_cols,
            field_rows,
        }
    }

    /// Terminal cell for a point in simulation units, if it is on the field.
    fn cell(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let col = (x / CELL_W) as u16;
        let row = (y / CELL_H) as u16;
        (col < self.field_cols && row < self.field_rows).then(|| (col + 1, row + FIELD_TOP))
    }
}

// ── Colour palette ───────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_TIME: Color = Color::White;
const C_HUD_KILLS: Color = Color::Green;
const C_HUD_MISSED: Color = Color::Red;
const C_PLAYER: Color = Color::White;
const C_ENEMY_FRAME: Color = Color::DarkGreen;
const C_ENEMY_LETTER: Color = Color::Green;
const C_PROJECTILE: Color = Color::Cyan;
const C_EXPLOSION: Color = Color::Yellow;
const C_HINT: Color = Color::DarkGrey;
const C_SELECTED: Color = Color::Cyan;

const EXPLOSION_SPRITES: [&str; 6] = ["*", "✶", "✷", "✸", "✹", "·"];

// ── Public entry point ───────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, session: &Session, best: u32) -> std::io::Result<()> {
    let snap = session.snapshot();
    let layout = Layout::from_viewport(snap.viewport);

    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_backdrop(out, &layout, &snap.backdrop)?;
    draw_border(out, &layout)?;
    draw_hud(out, &layout, &snap, session.tuning().miss_limit)?;

    for enemy in &snap.enemies {
        draw_enemy(out, &layout, enemy)?;
    }
    for projectile in &snap.projectiles {
        draw_projectile(out, &layout, projectile)?;
    }
    for explosion in &snap.explosions {
        draw_explosion(out, &layout, explosion)?;
    }

    draw_player(out, &layout, snap.viewport)?;
    draw_controls_hint(out, &layout, snap.status)?;

    match snap.status {
        SessionStatus::NotStarted => draw_start_screen(out, &layout, session.selection(), best)?,
        SessionStatus::Paused => draw_pause(out, &layout)?,
        SessionStatus::Ended => draw_game_over(out, &layout, &snap, best)?,
        SessionStatus::Active => {}
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, layout.height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Backdrop ─────────────────────────────────────────────────────────────────

/// Three star layers scrolling at different speeds.
fn draw_backdrop<W: Write>(out: &mut W, layout: &Layout, backdrop: &Backdrop) -> std::io::Result<()> {
    let layers = [
        (backdrop.far, ".", Color::DarkGrey, 7u32),
        (backdrop.middle, "·", Color::Grey, 5),
        (backdrop.near, "*", Color::White, 3),
    ];
    let cols = layout.field_cols as u32;
    let rows = layout.field_rows as f32;

    for (layer, (offset, glyph, color, stride)) in layers.into_iter().enumerate() {
        out.queue(style::SetForegroundColor(color))?;
        let count = (cols / stride).max(1);
        for i in 0..count {
            let col = (i * 37 + layer as u32 * 11) % cols;
            let base = ((i * 211 + layer as u32 * 97) % BACKDROP_WRAP as u32) as f32;
            let y = (base + offset) % BACKDROP_WRAP;
            let row = (y / BACKDROP_WRAP * rows) as u16;
            out.queue(cursor::MoveTo(col as u16 + 1, row + FIELD_TOP))?;
            out.queue(Print(glyph))?;
        }
    }
    Ok(())
}

// ── Border ───────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, layout: &Layout) -> std::io::Result<()> {
    let w = layout.width as usize;
    let h = layout.height;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    // Row 1: top bar
    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    // Row h-2: bottom bar
    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in FIELD_TOP..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(layout.width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ──────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(
    out: &mut W,
    layout: &Layout,
    snap: &Snapshot,
    miss_limit: u32,
) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score:{:>6}", snap.score)))?;

    let time = format!(
        "Time {:02}:{:02}",
        snap.elapsed_seconds / 60,
        snap.elapsed_seconds % 60
    );
    let tx = (layout.width / 2).saturating_sub(time.len() as u16 / 2);
    out.queue(cursor::MoveTo(tx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_TIME))?;
    out.queue(Print(&time))?;

    let kills = format!("Down:{:>4}  ", snap.shot_down);
    let missed = format!("Missed:{:>2}/{}", snap.missed, miss_limit);
    let rx = layout
        .width
        .saturating_sub((kills.len() + missed.len()) as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_KILLS))?;
    out.queue(Print(&kills))?;
    out.queue(style::SetForegroundColor(C_HUD_MISSED))?;
    out.queue(Print(&missed))?;

    Ok(())
}

// ── Entities ─────────────────────────────────────────────────────────────────

fn draw_player<W: Write>(out: &mut W, layout: &Layout, viewport: Viewport) -> std::io::Result<()> {
    //   ▲      ← launch point
    //  /█\
    let (x, y) = launch_origin(viewport);
    let Some((col, row)) = layout.cell(x, y) else {
        return Ok(());
    };
    out.queue(style::SetForegroundColor(C_PLAYER))?;
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(Print("▲"))?;
    if row + 1 < layout.height.saturating_sub(2) {
        out.queue(cursor::MoveTo(col.saturating_sub(1).max(1), row + 1))?;
        out.queue(Print("/█\\"))?;
    }
    Ok(())
}

fn draw_enemy<W: Write>(out: &mut W, layout: &Layout, enemy: &Enemy) -> std::io::Result<()> {
    // [A] centred on the enemy position
    let Some((col, row)) = layout.cell(enemy.x, enemy.y) else {
        return Ok(());
    };
    let lx = col.saturating_sub(1).max(1);
    out.queue(cursor::MoveTo(lx, row))?;
    out.queue(style::SetForegroundColor(C_ENEMY_FRAME))?;
    out.queue(Print("["))?;
    out.queue(style::SetForegroundColor(C_ENEMY_LETTER))?;
    out.queue(Print(enemy.letter))?;
    out.queue(style::SetForegroundColor(C_ENEMY_FRAME))?;
    out.queue(Print("]"))?;
    Ok(())
}

fn draw_projectile<W: Write>(
    out: &mut W,
    layout: &Layout,
    projectile: &Projectile,
) -> std::io::Result<()> {
    if let Some((col, row)) = layout.cell(projectile.x, projectile.y) {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(C_PROJECTILE))?;
        out.queue(Print("•"))?;
    }
    Ok(())
}

fn draw_explosion<W: Write>(
    out: &mut W,
    layout: &Layout,
    explosion: &Explosion,
) -> std::io::Result<()> {
    if let Some((col, row)) = layout.cell(explosion.x, explosion.y) {
        let sprite = EXPLOSION_SPRITES[(explosion.animation_frame as usize).min(5)];
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(C_EXPLOSION))?;
        out.queue(Print(sprite))?;
    }
    Ok(())
}

// ── Controls hint (last row) ─────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(
    out: &mut W,
    layout: &Layout,
    status: SessionStatus,
) -> std::io::Result<()> {
    let hint = match status {
        SessionStatus::NotStarted => "A-Z 0-9 : Select   F1/F2 : Presets   ⌫ : Clear   SPACE : Start   ESC : Quit",
        SessionStatus::Active => "Type the letters to shoot   SPACE : Pause   ESC : Quit",
        SessionStatus::Paused => "SPACE : Resume   ESC : Quit",
        SessionStatus::Ended => "SPACE : Play Again   ESC : Quit",
    };
    out.queue(cursor::MoveTo(1, layout.height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(hint))?;
    Ok(())
}

// ── Overlays ─────────────────────────────────────────────────────────────────

fn print_centered<W: Write>(
    out: &mut W,
    layout: &Layout,
    row: u16,
    text: &str,
    color: Color,
) -> std::io::Result<()> {
    let col = (layout.width / 2).saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}

fn draw_start_screen<W: Write>(
    out: &mut W,
    layout: &Layout,
    selection: &CharSelection,
    best: u32,
) -> std::io::Result<()> {
    let cy = layout.height / 2;
    let top = cy.saturating_sub(6);

    print_centered(out, layout, top, "★  TYPE  SHOOTER  ★", Color::Cyan)?;
    if best > 0 {
        print_centered(out, layout, top + 1, &format!("Best this run: {}", best), Color::Yellow)?;
    }
    print_centered(out, layout, top + 3, "Pick the characters to practise:", Color::White)?;

    // Keyboard rows, each indented a little more than the one above
    for (i, keys) in KEYBOARD_ROWS.iter().enumerate() {
        let row = top + 5 + i as u16;
        let line_len = keys.len() as u16 * 2;
        let col = (layout.width / 2).saturating_sub(line_len / 2) + i as u16;
        out.queue(cursor::MoveTo(col, row))?;
        for key in keys.chars() {
            let color = if selection.contains(key) { C_SELECTED } else { C_HINT };
            out.queue(style::SetForegroundColor(color))?;
            out.queue(Print(format!("{} ", key)))?;
        }
    }

    let chosen = if selection.is_empty() {
        "Selected: none (all characters)".to_string()
    } else {
        format!("Selected: {}", selection.chars().iter().collect::<String>())
    };
    print_centered(out, layout, top + 10, &chosen, Color::White)?;
    print_centered(
        out,
        layout,
        top + 11,
        &format!(
            "F1: {}   F2: {}",
            Preset::HomeRow.chars(),
            Preset::LeftHand.chars()
        ),
        C_HINT,
    )?;
    print_centered(out, layout, top + 13, "Press SPACE to start", Color::Cyan)?;
    Ok(())
}

fn draw_pause<W: Write>(out: &mut W, layout: &Layout) -> std::io::Result<()> {
    let cy = layout.height / 2;
    print_centered(out, layout, cy.saturating_sub(1), "╔══════════════╗", Color::Cyan)?;
    print_centered(out, layout, cy, "║    PAUSED    ║", Color::Cyan)?;
    print_centered(out, layout, cy + 1, "╚══════════════╝", Color::Cyan)?;
    Ok(())
}

fn draw_game_over<W: Write>(
    out: &mut W,
    layout: &Layout,
    snap: &Snapshot,
    best: u32,
) -> std::io::Result<()> {
    let lines: &[&str] = &[
        "╔════════════════════╗",
        "║    GAME  OVER      ║",
        "╚════════════════════╝",
    ];
    let total_rows = lines.len() as u16 + 3;
    let start_row = (layout.height / 2).saturating_sub(total_rows / 2);

    for (i, msg) in lines.iter().enumerate() {
        print_centered(out, layout, start_row + i as u16, msg, Color::Red)?;
    }

    let score_row = start_row + lines.len() as u16;
    print_centered(
        out,
        layout,
        score_row,
        &format!("Final Score: {:>6}", snap.score),
        Color::Yellow,
    )?;

    let best_line = if snap.score >= best && snap.score > 0 {
        format!("★ NEW BEST: {:>6} ★", snap.score)
    } else {
        format!("Best Score:  {:>6}", best)
    };
    print_centered(out, layout, score_row + 1, &best_line, Color::DarkGrey)?;
    print_centered(
        out,
        layout,
        score_row + 2,
        &format!("Shot down {}  ·  {}s survived", snap.shot_down, snap.elapsed_seconds),
        Color::White,
    )?;

    Ok(())
}
