//! Game configuration, loaded from TOML.
//!
//! ```toml
//! arena_width = 900
//! arena_height = 650
//! difficulty = "hard"
//! music_enabled = false
//! spawn_rate = 0.0089
//! powerup_chance = 0.3
//! ```
//!
//! Every key is optional; missing keys take the defaults below.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::audio::AudioSettings;
use crate::entities::{Difficulty, PLAYER_SIZE};
use crate::geometry::Arena;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub arena_width: f32,
    pub arena_height: f32,
    pub difficulty: Difficulty,
    pub music_enabled: bool,
    pub sfx_enabled: bool,
    /// Base per-tick enemy spawn probability at level 0.
    pub spawn_rate: f64,
    /// Added to `spawn_rate` on every level-up.
    pub spawn_rate_step: f64,
    /// Chance that a killed enemy drops a powerup.
    pub powerup_chance: f64,
    /// Frame interval of the terminal driver.
    pub frame_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arena_width: 900.0,
            arena_height: 650.0,
            difficulty: Difficulty::Normal,
            music_enabled: true,
            sfx_enabled: true,
            spawn_rate: 0.0089,
            spawn_rate_step: 0.005,
            powerup_chance: 0.3,
            frame_ms: 16,
        }
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = self.arena_width.is_finite() && self.arena_height.is_finite();
        if !(finite && self.arena_width > PLAYER_SIZE && self.arena_height > PLAYER_SIZE) {
            return Err(ConfigError::Invalid(format!(
                "arena {}x{} must be larger than the player ({PLAYER_SIZE})",
                self.arena_width, self.arena_height
            )));
        }
        for (name, value) in [
            ("spawn_rate", self.spawn_rate),
            ("spawn_rate_step", self.spawn_rate_step),
            ("powerup_chance", self.powerup_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!("{name} must be within [0, 1], got {value}")));
            }
        }
        if self.frame_ms == 0 {
            return Err(ConfigError::Invalid("frame_ms must be positive".into()));
        }
        Ok(())
    }

    pub fn arena(&self) -> Arena {
        Arena::new(self.arena_width, self.arena_height)
    }

    pub fn audio(&self) -> AudioSettings {
        AudioSettings { music_enabled: self.music_enabled, sfx_enabled: self.sfx_enabled }
    }
}
