/// Side effects produced by the simulation.
///
/// The core never draws or plays anything itself. Each step appends to an
/// effect list which a presentation layer drains after the frame.

use crate::audio::{AudioSettings, SoundId};
use crate::entities::{EntityId, EntityKind, PowerupKind};
use crate::geometry::Rect;
use crate::weapons::Weapon;

/// Ticks a banner message stays on screen.
pub const BANNER_TICKS: u32 = 180;
/// Particles per burst.
pub const PARTICLES_PER_BURST: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleColor {
    /// Player took contact damage.
    Red,
    /// Bullet struck an enemy.
    Yellow,
    /// Powerup collected.
    Gold,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Removal {
    OutOfBounds,
    /// Bullet consumed by a hit.
    Hit,
    Killed,
    Expired,
    PickedUp,
    /// Session reset or returned to menu.
    Cleared,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    Spawned { id: EntityId, kind: EntityKind, rect: Rect },
    Removed { id: EntityId, reason: Removal },
    EnemyDamaged { id: EntityId, damage: f32, health_ratio: f32 },
    PlayerDamaged { damage: u32, health: u32 },
    PickedUp { kind: PowerupKind },
    WeaponChanged { weapon: Weapon },
    Particles { x: f32, y: f32, color: ParticleColor },
    Explosion { x: f32, y: f32 },
    ScreenShake,
    Banner(String),
    PlaySound { sound: SoundId, looped: bool },
    StopSound(SoundId),
    LevelUp { level: u32 },
    GameOver,
}

/// Ordered effect buffer for one frame. Sound requests are filtered
/// through the session's audio settings on the way in.
#[derive(Debug, Default)]
pub struct Effects {
    items: Vec<Effect>,
    audio: AudioSettings,
}

impl Effects {
    pub fn new(audio: AudioSettings) -> Self {
        Self { items: Vec::new(), audio }
    }

    pub fn push(&mut self, effect: Effect) {
        self.items.push(effect);
    }

    /// Request `sound` unless its channel is muted.
    pub fn sound(&mut self, sound: SoundId) {
        if let Some(effect) = self.audio.play(sound) {
            self.items.push(effect);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<Effect> {
        self.items
    }

    pub fn spawned(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.items.iter().filter_map(|e| match e {
            Effect::Spawned { id, .. } => Some(*id),
            _ => None,
        })
    }

    pub fn removed(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.items.iter().filter_map(|e| match e {
            Effect::Removed { id, .. } => Some(*id),
            _ => None,
        })
    }
}
