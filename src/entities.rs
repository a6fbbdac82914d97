/// All game entity types: pure data, no logic beyond lookups.

use std::collections::VecDeque;
use std::str::FromStr;

use serde::Deserialize;

use crate::geometry::{Arena, Rect};
use crate::weapons::Weapon;

// ── Tuning constants ─────────────────────────────────────────────────────────

pub const PLAYER_SIZE: f32 = 60.0;
pub const PLAYER_BASE_SPEED: f32 = 7.3;
pub const PLAYER_MAX_HEALTH: u32 = 160;
/// Ticks of contact immunity after taking damage.
pub const INVULNERABILITY_TICKS: u32 = 60;

pub const ENEMY_SIZE: f32 = 45.0;
/// Ticks an enemy stays highlighted after a bullet hit.
pub const ENEMY_HIT_FLASH_TICKS: u32 = 10;

pub const POWERUP_SIZE: f32 = 35.0;
pub const POWERUP_LIFESPAN_TICKS: u32 = 600;
pub const HEALTH_PICKUP_AMOUNT: u32 = 30;
pub const SPEED_BOOST_CAP: f32 = 8.0;
pub const SPEED_BOOST_FLOOR: f32 = 5.0;

/// Every 10th kill advances the level.
pub const KILLS_PER_LEVEL: u32 = 10;

/// Nominal scheduler rate, used to turn the game's real-time effect
/// durations into tick counts.
pub const TICKS_PER_SECOND: u32 = 60;

pub const fn secs_to_ticks(secs: u32) -> u32 {
    secs * TICKS_PER_SECOND
}

pub const SPEED_BOOST_TICKS: u32 = secs_to_ticks(10);
pub const POWER_MILK_TICKS: u32 = secs_to_ticks(15);
pub const MEGA_MILK_TICKS: u32 = secs_to_ticks(10);
pub const MEGA_TO_POWER_TICKS: u32 = secs_to_ticks(5);

// ── Identity ─────────────────────────────────────────────────────────────────

/// Stable handle shared between a simulation record and its renderable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Bullet { special: bool },
    Enemy(EnemyKind),
    Powerup(PowerupKind),
}

// ── Difficulty ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn spawn_multiplier(self) -> f64 {
        match self {
            Difficulty::Easy => 0.7,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Normal => "NORMAL",
            Difficulty::Hard => "HARD",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{other}' (expected easy, normal or hard)")),
        }
    }
}

// ── Player ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Player {
    /// Top-left corner.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    /// Facing angle in radians, 0 = +x, π/2 = +y (down).
    pub angle: f32,
    /// Remaining invulnerability ticks.
    pub invulnerable: u32,
}

impl Player {
    /// A fresh player centred in the arena.
    pub fn centered_in(arena: &Arena) -> Self {
        let (cx, cy) = arena.center();
        Self {
            x: cx - PLAYER_SIZE / 2.0,
            y: cy - PLAYER_SIZE / 2.0,
            width: PLAYER_SIZE,
            height: PLAYER_SIZE,
            speed: PLAYER_BASE_SPEED,
            angle: 0.0,
            invulnerable: 0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn center(&self) -> (f32, f32) {
        self.rect().center()
    }

    /// Half-bright phase of the damage flicker.
    pub fn is_dimmed(&self) -> bool {
        self.invulnerable > 0 && (self.invulnerable / 5) % 2 == 1
    }
}

// ── Projectiles ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Bullet {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    pub damage: f32,
    /// Emitted by the special attack rather than the equipped weapon.
    pub special: bool,
}

impl Bullet {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.size, self.size)
    }
}

// ── Enemies ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyKind {
    Basic,
    Fast,
    Tank,
}

/// Level-1 stats for an enemy type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyStats {
    pub health: f32,
    pub speed: f32,
    pub damage: u32,
    pub points: u32,
    /// RGB body colour.
    pub color: (u8, u8, u8),
}

impl EnemyKind {
    pub fn baseline(self) -> EnemyStats {
        match self {
            EnemyKind::Basic => EnemyStats {
                health: 35.0,
                speed: 1.5,
                damage: 15,
                points: 10,
                color: (0xDC, 0x14, 0x3C),
            },
            EnemyKind::Fast => EnemyStats {
                health: 20.0,
                speed: 3.0,
                damage: 10,
                points: 15,
                color: (0xFF, 0x45, 0x00),
            },
            EnemyKind::Tank => EnemyStats {
                health: 60.0,
                speed: 1.0,
                damage: 20,
                points: 25,
                color: (0x2F, 0x4F, 0x4F),
            },
        }
    }
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub health: f32,
    pub max_health: f32,
    pub speed: f32,
    pub damage: u32,
    pub points: u32,
    pub kind: EnemyKind,
    /// Ticks left on the hit highlight.
    pub hit_flash: u32,
}

impl Enemy {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub fn health_ratio(&self) -> f32 {
        (self.health / self.max_health).clamp(0.0, 1.0)
    }
}

// ── Powerups ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerupKind {
    Health,
    Speed,
    Weapon,
}

impl PowerupKind {
    pub const ALL: [PowerupKind; 3] = [PowerupKind::Health, PowerupKind::Speed, PowerupKind::Weapon];
}

#[derive(Clone, Debug)]
pub struct Powerup {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub kind: PowerupKind,
    /// Ticks until the powerup expires.
    pub lifespan: u32,
}

impl Powerup {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.size, self.size)
    }
}

// ── Timed effects ────────────────────────────────────────────────────────────

/// One pending step of a weapon downgrade: after `remaining_ticks`, the
/// equipped weapon becomes `revert_to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeaponRevert {
    pub remaining_ticks: u32,
    pub revert_to: Weapon,
}

// ── Progress ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct GameProgress {
    pub score: u32,
    /// Always within `0..=max_health`.
    pub health: u32,
    pub max_health: u32,
    pub level: u32,
    pub enemies_killed: u32,
    pub difficulty: Difficulty,
    pub running: bool,
    pub paused: bool,
}

impl GameProgress {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            score: 0,
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            level: 1,
            enemies_killed: 0,
            difficulty,
            running: false,
            paused: false,
        }
    }
}

// ── Master simulation state ──────────────────────────────────────────────────

/// Everything the simulation mutates during a run. Owned by a
/// `GameSession`; there is no ambient game state anywhere else.
#[derive(Clone, Debug)]
pub struct SimulationState {
    pub arena: Arena,
    pub player: Player,
    /// Active bullets, in spawn order.
    pub bullets: Vec<Bullet>,
    /// Active enemies, in spawn order. Bullets test them front to back.
    pub enemies: Vec<Enemy>,
    pub powerups: Vec<Powerup>,
    pub progress: GameProgress,
    pub weapon: Weapon,
    /// Time of the last weapon shot; `None` until the first shot.
    pub last_shot_ms: Option<u64>,
    /// Ticks until the special attack is available again.
    pub special_cooldown: u32,
    /// Base per-tick spawn probability; grows with each level.
    pub spawn_rate: f64,
    pub spawn_rate_step: f64,
    pub powerup_chance: f64,
    /// One countdown per active speed boost.
    pub speed_boosts: Vec<u32>,
    /// Pending weapon downgrades, front first.
    pub weapon_reverts: VecDeque<WeaponRevert>,
    pub next_id: u64,
    pub tick: u64,
}

impl SimulationState {
    /// Panics if the arena cannot hold the player.
    pub fn new(
        arena: Arena,
        difficulty: Difficulty,
        spawn_rate: f64,
        spawn_rate_step: f64,
        powerup_chance: f64,
    ) -> Self {
        assert!(
            arena.width > PLAYER_SIZE && arena.height > PLAYER_SIZE,
            "arena {}x{} is too small for a {PLAYER_SIZE}-unit player",
            arena.width,
            arena.height
        );
        Self {
            arena,
            player: Player::centered_in(&arena),
            bullets: Vec::new(),
            enemies: Vec::new(),
            powerups: Vec::new(),
            progress: GameProgress::new(difficulty),
            weapon: Weapon::Milk,
            last_shot_ms: None,
            special_cooldown: 0,
            spawn_rate,
            spawn_rate_step,
            powerup_chance,
            speed_boosts: Vec::new(),
            weapon_reverts: VecDeque::new(),
            next_id: 1,
            tick: 0,
        }
    }

    pub fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Ids of every live bullet, enemy and powerup.
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.bullets
            .iter()
            .map(|b| b.id)
            .chain(self.enemies.iter().map(|e| e.id))
            .chain(self.powerups.iter().map(|p| p.id))
            .collect()
    }

    pub fn entity_rect(&self, id: EntityId) -> Option<Rect> {
        self.bullets
            .iter()
            .find(|b| b.id == id)
            .map(Bullet::rect)
            .or_else(|| self.enemies.iter().find(|e| e.id == id).map(Enemy::rect))
            .or_else(|| self.powerups.iter().find(|p| p.id == id).map(Powerup::rect))
    }
}
