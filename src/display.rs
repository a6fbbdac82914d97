/// Rendering layer. All terminal I/O lives here.
///
/// `TerminalSurface` is the render surface for the simulation: it keeps one
/// sprite per live entity id (created and destroyed through effects) and
/// maps arena coordinates onto terminal cells when drawing. No game logic
/// is performed here.

use std::collections::HashMap;
use std::f32::consts::PI;
use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use milk_blaster::effects::{Effect, ParticleColor, BANNER_TICKS, PARTICLES_PER_BURST};
use milk_blaster::entities::{EnemyKind, EntityId, EntityKind, PowerupKind, SimulationState};
use milk_blaster::geometry::{Arena, Rect};
use milk_blaster::hud::HudSnapshot;
use milk_blaster::presentation::RenderSurface;
use milk_blaster::session::RunSummary;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_HEALTH: Color = Color::Red;
const C_HUD_WEAPON: Color = Color::Cyan;
const C_PLAYER: Color = Color::White;
const C_PLAYER_DIM: Color = Color::DarkGrey;
const C_BULLET: Color = Color::Cyan;
const C_BULLET_SPECIAL: Color = Color::Magenta;
const C_HIT_FLASH: Color = Color::White;
const C_BANNER: Color = Color::Yellow;
const C_HINT: Color = Color::DarkGrey;

/// Frames a particle burst or explosion stays visible.
const PARTICLE_FRAMES: u32 = 12;
const EXPLOSION_FRAMES: u32 = 8;
const SHAKE_FRAMES: u32 = 8;
/// Arena units between a burst's origin and its particles.
const PARTICLE_SPREAD: f32 = 20.0;

/// Smallest terminal the play field can be drawn in.
pub const MIN_COLS: u16 = 40;
pub const MIN_ROWS: u16 = 12;

struct Sprite {
    kind: EntityKind,
    rect: Rect,
    flash: u32,
    /// Last reported health ratio; enemies below 1.0 get a bar.
    health: f32,
}

enum TransientKind {
    Particles(ParticleColor),
    Explosion,
}

struct Transient {
    x: f32,
    y: f32,
    kind: TransientKind,
    frames: u32,
}

pub struct TerminalSurface {
    arena: Arena,
    width: u16,
    height: u16,
    sprites: HashMap<EntityId, Sprite>,
    transients: Vec<Transient>,
    banner: Option<(String, u32)>,
    shake: u32,
}

impl TerminalSurface {
    pub fn new(arena: Arena, width: u16, height: u16) -> Self {
        Self {
            arena,
            width,
            height,
            sprites: HashMap::new(),
            transients: Vec::new(),
            banner: None,
            shake: 0,
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    /// Drop every sprite and transient, e.g. when returning to the menu.
    pub fn clear(&mut self) {
        self.sprites.clear();
        self.transients.clear();
        self.banner = None;
        self.shake = 0;
    }

    /// Map an arena point to a cell inside the border, if it is on screen.
    fn to_cell(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        let inner_w = self.width.saturating_sub(2) as f32;
        let inner_h = self.height.saturating_sub(5) as f32;
        if x < 0.0 || y < 0.0 || x >= self.arena.width || y >= self.arena.height {
            return None;
        }
        let shake = if self.shake % 2 == 1 { 1.0 } else { 0.0 };
        let col = 1.0 + (x / self.arena.width * inner_w + shake).min(inner_w - 1.0);
        let row = 2.0 + (y / self.arena.height * inner_h).min(inner_h - 1.0);
        Some((col as u16, row as u16))
    }

    /// Inverse of `to_cell`: the arena point at the centre of a cell.
    pub fn to_arena(&self, col: u16, row: u16) -> (f32, f32) {
        let inner_w = self.width.saturating_sub(2).max(1) as f32;
        let inner_h = self.height.saturating_sub(5).max(1) as f32;
        let x = (col.saturating_sub(1) as f32 + 0.5) / inner_w * self.arena.width;
        let y = (row.saturating_sub(2) as f32 + 0.5) / inner_h * self.arena.height;
        (x, y)
    }

    // ── Public entry point ──────────────────────────────────────────────────

    /// Render one complete frame.
    pub fn render<W: Write>(
        &mut self,
        out: &mut W,
        state: &SimulationState,
        hud: &HudSnapshot,
        game_over: Option<RunSummary>,
    ) -> std::io::Result<()> {
        out.queue(terminal::Clear(terminal::ClearType::All))?;

        self.draw_border(out)?;
        self.draw_hud(out, hud, state)?;

        for sprite in self.sprites.values() {
            self.draw_sprite(out, sprite)?;
        }
        self.draw_transients(out)?;
        self.draw_player(out, state)?;
        self.draw_banner(out)?;
        self.draw_controls_hint(out)?;

        if let Some(summary) = game_over {
            self.draw_game_over(out, &summary)?;
        } else if state.progress.paused {
            self.draw_paused(out)?;
        }

        // Park cursor in a harmless spot and flush
        out.queue(style::ResetColor)?;
        out.queue(cursor::MoveTo(0, self.height.saturating_sub(1)))?;
        out.flush()?;

        self.age();
        Ok(())
    }

    fn age(&mut self) {
        self.transients.retain_mut(|t| {
            t.frames = t.frames.saturating_sub(1);
            t.frames > 0
        });
        for sprite in self.sprites.values_mut() {
            sprite.flash = sprite.flash.saturating_sub(1);
        }
        if let Some((_, frames)) = &mut self.banner {
            *frames = frames.saturating_sub(1);
        }
        if matches!(self.banner, Some((_, 0))) {
            self.banner = None;
        }
        self.shake = self.shake.saturating_sub(1);
    }

    // ── Border ──────────────────────────────────────────────────────────────

    fn draw_border<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let w = self.width as usize;
        let bottom = self.height.saturating_sub(2);

        out.queue(style::SetForegroundColor(C_BORDER))?;

        out.queue(cursor::MoveTo(0, 1))?;
        out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

        for row in 2..bottom {
            out.queue(cursor::MoveTo(0, row))?;
            out.queue(Print("│"))?;
            out.queue(cursor::MoveTo(self.width.saturating_sub(1), row))?;
            out.queue(Print("│"))?;
        }

        out.queue(cursor::MoveTo(0, bottom))?;
        out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;
        Ok(())
    }

    // ── HUD (row 0) ─────────────────────────────────────────────────────────

    fn draw_hud<W: Write>(
        &self,
        out: &mut W,
        hud: &HudSnapshot,
        state: &SimulationState,
    ) -> std::io::Result<()> {
        out.queue(cursor::MoveTo(1, 0))?;
        out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
        out.queue(Print(format!("Score: {:>7}  Lv {}", hud.score, hud.level)))?;

        let weapon = if hud.weapon_boost_active {
            format!("[ {} ▲ ]", hud.weapon_label)
        } else {
            format!("[ {} ]", hud.weapon_label)
        };
        let wx = (self.width / 2).saturating_sub(weapon.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(wx, 0))?;
        out.queue(style::SetForegroundColor(C_HUD_WEAPON))?;
        out.queue(Print(&weapon))?;

        // Health bar, right-aligned
        let bar_len = 10usize;
        let filled = (hud.health_ratio() * bar_len as f32).round() as usize;
        let special = if hud.special_ready { "✦" } else { " " };
        let health_text = format!(
            "{} {}{} {:>3}/{}",
            special,
            "█".repeat(filled),
            "░".repeat(bar_len - filled.min(bar_len)),
            hud.health,
            hud.max_health
        );
        let rx = self
            .width
            .saturating_sub(health_text.chars().count() as u16 + 1);
        out.queue(cursor::MoveTo(rx, 0))?;
        out.queue(style::SetForegroundColor(C_HUD_HEALTH))?;
        out.queue(Print(&health_text))?;

        let difficulty = state.progress.difficulty.label();
        out.queue(cursor::MoveTo(self.width.saturating_sub(difficulty.len() as u16 + 2), 1))?;
        out.queue(style::SetForegroundColor(C_HINT))?;
        out.queue(Print(difficulty))?;
        Ok(())
    }

    // ── Entities ────────────────────────────────────────────────────────────

    fn draw_player<W: Write>(&self, out: &mut W, state: &SimulationState) -> std::io::Result<()> {
        let p = &state.player;
        let (cx, cy) = p.center();
        let Some((col, row)) = self.to_cell(cx, cy) else {
            return Ok(());
        };
        let color = if p.is_dimmed() { C_PLAYER_DIM } else { C_PLAYER };
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(facing_glyph(p.angle)))?;
        Ok(())
    }

    fn draw_sprite<W: Write>(&self, out: &mut W, sprite: &Sprite) -> std::io::Result<()> {
        let (cx, cy) = sprite.rect.center();
        let Some((col, row)) = self.to_cell(cx, cy) else {
            return Ok(());
        };
        let (glyph, color) = match sprite.kind {
            EntityKind::Bullet { special: false } => ("•", C_BULLET),
            EntityKind::Bullet { special: true } => ("✦", C_BULLET_SPECIAL),
            EntityKind::Enemy(kind) => {
                let (r, g, b) = kind.baseline().color;
                let glyph = match kind {
                    EnemyKind::Basic => "<▼>",
                    EnemyKind::Fast => "(◉)",
                    EnemyKind::Tank => "[█]",
                };
                let color = if sprite.flash > 0 { C_HIT_FLASH } else { Color::Rgb { r, g, b } };
                (glyph, color)
            }
            EntityKind::Powerup(PowerupKind::Health) => ("♥", Color::Magenta),
            EntityKind::Powerup(PowerupKind::Speed) => ("»", Color::Cyan),
            EntityKind::Powerup(PowerupKind::Weapon) => ("★", Color::Yellow),
        };
        // Three-wide enemy glyphs are centred on their cell
        let col = if glyph.chars().count() == 3 { col.saturating_sub(1).max(1) } else { col };
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(glyph))?;

        let bar_row = row + 1;
        if matches!(sprite.kind, EntityKind::Enemy(_))
            && sprite.health < 1.0
            && bar_row < self.height.saturating_sub(2)
        {
            out.queue(cursor::MoveTo(col, bar_row))?;
            out.queue(style::SetForegroundColor(health_color(sprite.health)))?;
            out.queue(Print(health_bar(sprite.health)))?;
        }
        Ok(())
    }

    fn draw_transients<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for t in &self.transients {
            let Some((col, row)) = self.to_cell(t.x, t.y) else {
                continue;
            };
            let (glyph, color) = match t.kind {
                TransientKind::Particles(ParticleColor::Red) => ("*", Color::Red),
                TransientKind::Particles(ParticleColor::Yellow) => ("*", Color::Yellow),
                TransientKind::Particles(ParticleColor::Gold) => ("+", Color::DarkYellow),
                TransientKind::Explosion => ("✸", Color::Red),
            };
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(style::SetForegroundColor(color))?;
            out.queue(Print(glyph))?;
        }
        Ok(())
    }

    // ── Overlays ────────────────────────────────────────────────────────────

    fn draw_banner<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let Some((text, _)) = &self.banner else {
            return Ok(());
        };
        let col = (self.width / 2).saturating_sub(text.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, 3))?;
        out.queue(style::SetForegroundColor(C_BANNER))?;
        out.queue(Print(text))?;
        Ok(())
    }

    fn draw_controls_hint<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        out.queue(cursor::MoveTo(1, self.height.saturating_sub(1)))?;
        out.queue(style::SetForegroundColor(C_HINT))?;
        out.queue(Print(
            "WASD/←↑↓→ Move  Mouse/IJKL Aim  Click/F Fire  SPACE Special  ESC Pause  M/N Audio  Q Quit",
        ))?;
        Ok(())
    }

    fn draw_paused<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let msg = "‖ PAUSED · ESC to resume ‖";
        let col = (self.width / 2).saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, self.height / 2))?;
        out.queue(style::SetForegroundColor(Color::White))?;
        out.queue(Print(msg))?;
        Ok(())
    }

    fn draw_game_over<W: Write>(&self, out: &mut W, summary: &RunSummary) -> std::io::Result<()> {
        let score_line = format!("Final Score: {}", summary.score);
        let kills_line = format!("Enemies: {}   Level: {}", summary.enemies_killed, summary.level);
        let lines: &[(&str, Color)] = &[
            ("╔══════════════════╗", Color::Red),
            ("║    GAME  OVER    ║", Color::Red),
            ("╚══════════════════╝", Color::Red),
            (&score_line, Color::Yellow),
            (&kills_line, Color::Yellow),
            ("R - Play Again  ENTER - Menu  Q - Quit", Color::White),
        ];

        let cx = self.width / 2;
        let start_row = (self.height / 2).saturating_sub(lines.len() as u16 / 2);

        for (i, (msg, color)) in lines.iter().enumerate() {
            let row = start_row + i as u16;
            let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(style::SetForegroundColor(*color))?;
            out.queue(Print(*msg))?;
        }

        Ok(())
    }
}

impl RenderSurface for TerminalSurface {
    fn arena(&self) -> Arena {
        self.arena
    }

    fn create(&mut self, id: EntityId, kind: EntityKind, rect: &Rect) {
        self.sprites.insert(id, Sprite { kind, rect: *rect, flash: 0, health: 1.0 });
    }

    fn place(&mut self, id: EntityId, rect: &Rect) {
        debug_assert!(self.sprites.contains_key(&id), "placed {id:?} before creating it");
        if let Some(sprite) = self.sprites.get_mut(&id) {
            sprite.rect = *rect;
        }
    }

    fn destroy(&mut self, id: EntityId) {
        self.sprites.remove(&id);
    }

    fn feedback(&mut self, effect: &Effect) {
        match effect {
            Effect::Particles { x, y, color } => {
                for i in 0..PARTICLES_PER_BURST {
                    let angle = i as f32 * 2.0 * PI / PARTICLES_PER_BURST as f32;
                    self.transients.push(Transient {
                        x: x + angle.cos() * PARTICLE_SPREAD,
                        y: y + angle.sin() * PARTICLE_SPREAD,
                        kind: TransientKind::Particles(*color),
                        frames: PARTICLE_FRAMES,
                    });
                }
            }
            Effect::Explosion { x, y } => self.transients.push(Transient {
                x: *x,
                y: *y,
                kind: TransientKind::Explosion,
                frames: EXPLOSION_FRAMES,
            }),
            Effect::EnemyDamaged { id, health_ratio, .. } => {
                if let Some(sprite) = self.sprites.get_mut(id) {
                    sprite.flash = 10;
                    sprite.health = *health_ratio;
                }
            }
            Effect::Banner(text) => self.banner = Some((text.clone(), BANNER_TICKS)),
            Effect::ScreenShake => self.shake = SHAKE_FRAMES,
            _ => {}
        }
    }
}

/// Arrow pointing along `angle` (0 = right, y grows downward).
fn facing_glyph(angle: f32) -> &'static str {
    const GLYPHS: [&str; 8] = ["→", "↘", "↓", "↙", "←", "↖", "↑", "↗"];
    let octant = ((angle.rem_euclid(2.0 * PI) + PI / 8.0) / (PI / 4.0)) as usize % 8;
    GLYPHS[octant]
}

/// Cells in an enemy health bar.
const ENEMY_BAR_CELLS: usize = 3;

/// Partial bar for a damaged enemy; any health left shows at least one cell.
fn health_bar(ratio: f32) -> String {
    let filled = (ratio.clamp(0.0, 1.0) * ENEMY_BAR_CELLS as f32).ceil() as usize;
    let filled = filled.min(ENEMY_BAR_CELLS);
    format!("{}{}", "▰".repeat(filled), "▱".repeat(ENEMY_BAR_CELLS - filled))
}

fn health_color(ratio: f32) -> Color {
    if ratio > 0.5 {
        Color::Green
    } else if ratio > 0.25 {
        Color::Yellow
    } else {
        Color::Red
    }
}
