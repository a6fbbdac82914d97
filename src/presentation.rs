//! Bridge from simulation effects to a render surface.
//!
//! A surface owns one visual handle per live entity. `present` creates
//! handles for `Spawned` effects, releases them for `Removed` effects, and
//! then positions every surviving entity from the simulation state. The
//! surface never feeds anything back into the simulation except the arena
//! size.

use crate::effects::Effect;
use crate::entities::{EntityId, EntityKind, SimulationState};
use crate::geometry::{Arena, Rect};

pub trait RenderSurface {
    /// Current play-area dimensions.
    fn arena(&self) -> Arena;
    fn create(&mut self, id: EntityId, kind: EntityKind, rect: &Rect);
    fn place(&mut self, id: EntityId, rect: &Rect);
    fn destroy(&mut self, id: EntityId);
    /// Everything that is not an entity lifecycle event (particles, banners,
    /// hit highlights). Default: ignored.
    fn feedback(&mut self, _effect: &Effect) {}
}

/// Apply one frame's effects to `surface` and sync entity positions.
///
/// An entity spawned and removed within the same frame never reaches the
/// surface.
pub fn present(surface: &mut dyn RenderSurface, state: &SimulationState, effects: &[Effect]) {
    for effect in effects {
        match effect {
            Effect::Spawned { id, kind, rect } => {
                if state.entity_rect(*id).is_some() {
                    surface.create(*id, *kind, rect);
                }
            }
            Effect::Removed { id, .. } => {
                if !spawned_this_frame(effects, *id) {
                    surface.destroy(*id);
                }
            }
            other => surface.feedback(other),
        }
    }

    for bullet in &state.bullets {
        surface.place(bullet.id, &bullet.rect());
    }
    for enemy in &state.enemies {
        surface.place(enemy.id, &enemy.rect());
    }
    for powerup in &state.powerups {
        surface.place(powerup.id, &powerup.rect());
    }
}

fn spawned_this_frame(effects: &[Effect], id: EntityId) -> bool {
    effects
        .iter()
        .any(|e| matches!(e, Effect::Spawned { id: spawned, .. } if *spawned == id))
}

/// Destroy the handle of every entity removed in `effects`, for teardown
/// paths where no simulation state is left to sync against.
pub fn release(surface: &mut dyn RenderSurface, effects: &[Effect]) {
    for effect in effects {
        if let Effect::Removed { id, .. } = effect {
            surface.destroy(*id);
        }
    }
}
