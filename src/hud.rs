/// Values a heads-up display shows, captured once per frame.

use crate::entities::SimulationState;

#[derive(Clone, Debug, PartialEq)]
pub struct HudSnapshot {
    pub score: u32,
    pub health: u32,
    pub max_health: u32,
    pub level: u32,
    pub weapon_label: &'static str,
    pub special_ready: bool,
    pub weapon_boost_active: bool,
    pub speed_boost_active: bool,
    pub enemies_killed: u32,
}

impl HudSnapshot {
    pub fn capture(state: &SimulationState) -> Self {
        let progress = &state.progress;
        Self {
            score: progress.score,
            health: progress.health,
            max_health: progress.max_health,
            level: progress.level,
            weapon_label: state.weapon.label(),
            special_ready: state.special_cooldown == 0,
            weapon_boost_active: !state.weapon_reverts.is_empty(),
            speed_boost_active: !state.speed_boosts.is_empty(),
            enemies_killed: progress.enemies_killed,
        }
    }

    pub fn health_ratio(&self) -> f32 {
        if self.max_health == 0 {
            return 0.0;
        }
        self.health as f32 / self.max_health as f32
    }
}
