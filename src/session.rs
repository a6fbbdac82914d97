//! Game-state controller and frame scheduler.
//!
//! A `GameSession` owns the `SimulationState` for one player across any
//! number of runs. `frame` is the scheduler entry point: the host calls it
//! once per display refresh and keeps calling it for as long as
//! `is_scheduled` holds. When the session is paused or over, `frame` is a
//! no-op and the host simply stops rescheduling; resuming re-enters through
//! the same call.
//!
//! Every lifecycle transition returns the effects it produced so the host
//! can release visuals and stop sounds.

use rand::Rng;

use crate::audio::{AudioSettings, SoundId};
use crate::compute;
use crate::config::GameConfig;
use crate::effects::{Effect, Effects, Removal};
use crate::entities::{Difficulty, SimulationState};
use crate::hud::HudSnapshot;
use crate::input::InputFrame;

/// Output of one scheduled frame.
#[derive(Debug)]
pub struct FrameReport {
    /// Identifies the run the effects belong to; bumps on every reset.
    pub run_id: u64,
    pub tick: u64,
    pub effects: Vec<Effect>,
    pub hud: HudSnapshot,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub score: u32,
    pub enemies_killed: u32,
    pub level: u32,
}

pub struct GameSession {
    config: GameConfig,
    audio: AudioSettings,
    state: SimulationState,
    run_id: u64,
}

impl GameSession {
    /// A session sitting at the menu: nothing is running yet.
    pub fn create(config: GameConfig) -> Self {
        let audio = config.audio();
        let state = fresh_state(&config, config.difficulty);
        Self { config, audio, state, run_id: 0 }
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Direct access to the simulation, for tests and tooling.
    pub fn state_mut(&mut self) -> &mut SimulationState {
        &mut self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn audio(&self) -> AudioSettings {
        self.audio
    }

    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    pub fn is_running(&self) -> bool {
        self.state.progress.running
    }

    pub fn is_paused(&self) -> bool {
        self.state.progress.paused
    }

    /// Whether the host should keep scheduling frames.
    pub fn is_scheduled(&self) -> bool {
        self.state.progress.running && !self.state.progress.paused
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot::capture(&self.state)
    }

    pub fn summary(&self) -> RunSummary {
        let progress = &self.state.progress;
        RunSummary {
            score: progress.score,
            enemies_killed: progress.enemies_killed,
            level: progress.level,
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────────────

    /// Reset and begin a run at `difficulty`.
    pub fn start(&mut self, difficulty: Difficulty) -> Vec<Effect> {
        let mut fx = Effects::new(self.audio);
        self.reset_into(difficulty, &mut fx);
        self.state.progress.running = true;
        self.state.progress.paused = false;
        fx.sound(SoundId::BgMusic);
        tracing::info!(run_id = self.run_id, difficulty = difficulty.label(), "run started");
        fx.into_vec()
    }

    /// Start again at the current difficulty.
    pub fn restart(&mut self) -> Vec<Effect> {
        self.start(self.state.progress.difficulty)
    }

    pub fn pause(&mut self) -> Vec<Effect> {
        if !self.is_running() || self.is_paused() {
            return Vec::new();
        }
        self.state.progress.paused = true;
        tracing::info!(tick = self.state.tick, "paused");
        vec![Effect::StopSound(SoundId::BgMusic)]
    }

    pub fn resume(&mut self) -> Vec<Effect> {
        if !self.is_paused() {
            return Vec::new();
        }
        self.state.progress.paused = false;
        let mut fx = Effects::new(self.audio);
        fx.sound(SoundId::BgMusic);
        tracing::info!(tick = self.state.tick, "resumed");
        fx.into_vec()
    }

    pub fn toggle_pause(&mut self) -> Vec<Effect> {
        if self.is_paused() {
            self.resume()
        } else {
            self.pause()
        }
    }

    /// Clear the arena and restore starting values without starting a run.
    /// Pending speed and weapon timers die with the old state, and so does
    /// the run's music.
    pub fn reset(&mut self) -> Vec<Effect> {
        let mut fx = Effects::new(self.audio);
        self.reset_into(self.state.progress.difficulty, &mut fx);
        fx.push(Effect::StopSound(SoundId::BgMusic));
        fx.into_vec()
    }

    /// Abandon the run and return to the menu.
    pub fn show_menu(&mut self) -> Vec<Effect> {
        let effects = self.reset();
        tracing::info!(run_id = self.run_id, "returned to menu");
        effects
    }

    /// Tear the session down, releasing every entity.
    pub fn destroy(self) -> Vec<Effect> {
        let mut effects = cleared(&self.state);
        effects.push(Effect::StopSound(SoundId::BgMusic));
        tracing::debug!(run_id = self.run_id, "session destroyed");
        effects
    }

    fn reset_into(&mut self, difficulty: Difficulty, fx: &mut Effects) {
        for effect in cleared(&self.state) {
            fx.push(effect);
        }
        // Ids keep counting across runs so a stale handle can never alias a
        // new entity.
        let next_id = self.state.next_id;
        self.state = fresh_state(&self.config, difficulty);
        self.state.next_id = next_id;
        self.run_id += 1;
    }

    // ── Audio toggles ────────────────────────────────────────────────────────

    pub fn toggle_music(&mut self) -> Vec<Effect> {
        self.audio.music_enabled = !self.audio.music_enabled;
        if !self.audio.music_enabled {
            return vec![Effect::StopSound(SoundId::BgMusic)];
        }
        if self.is_scheduled() {
            return vec![Effect::PlaySound { sound: SoundId::BgMusic, looped: true }];
        }
        Vec::new()
    }

    pub fn toggle_sfx(&mut self) {
        self.audio.sfx_enabled = !self.audio.sfx_enabled;
    }

    // ── Scheduler ────────────────────────────────────────────────────────────

    /// Run one frame if the session is scheduled; `None` means idle.
    pub fn frame(
        &mut self,
        input: &InputFrame,
        now_ms: u64,
        rng: &mut impl Rng,
    ) -> Option<FrameReport> {
        if !self.is_scheduled() {
            return None;
        }
        let mut fx = Effects::new(self.audio);
        compute::tick(&mut self.state, input, now_ms, rng, &mut fx);
        Some(FrameReport {
            run_id: self.run_id,
            tick: self.state.tick,
            effects: fx.into_vec(),
            hud: HudSnapshot::capture(&self.state),
        })
    }
}

fn fresh_state(config: &GameConfig, difficulty: Difficulty) -> SimulationState {
    SimulationState::new(
        config.arena(),
        difficulty,
        config.spawn_rate,
        config.spawn_rate_step,
        config.powerup_chance,
    )
}

fn cleared(state: &SimulationState) -> Vec<Effect> {
    state
        .entity_ids()
        .into_iter()
        .map(|id| Effect::Removed { id, reason: Removal::Cleared })
        .collect()
}
