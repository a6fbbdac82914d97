//! Sound identifiers, enable flags and the audio sink boundary.
//!
//! The simulation decides *whether* a sound is issued (checking the music
//! and SFX flags). Playback itself belongs to an `AudioSink`; anything the
//! sink reports as failed is logged and dropped.

use thiserror::Error;

use crate::effects::Effect;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundId {
    BgMusic,
    Shoot,
    SpecialAttack,
    EnemyHit,
    EnemyDeath,
    Powerup,
    Hit,
    LevelUp,
    GameOver,
}

impl SoundId {
    pub fn is_music(self) -> bool {
        matches!(self, SoundId::BgMusic)
    }

    pub fn name(self) -> &'static str {
        match self {
            SoundId::BgMusic => "bgMusic",
            SoundId::Shoot => "shootSound",
            SoundId::SpecialAttack => "specialAttackSound",
            SoundId::EnemyHit => "enemyHitSound",
            SoundId::EnemyDeath => "enemyDeathSound",
            SoundId::Powerup => "powerupSound",
            SoundId::Hit => "hitSound",
            SoundId::LevelUp => "levelUpSound",
            SoundId::GameOver => "gameOverSound",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioSettings {
    pub music_enabled: bool,
    pub sfx_enabled: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self { music_enabled: true, sfx_enabled: true }
    }
}

impl AudioSettings {
    pub fn allows(&self, sound: SoundId) -> bool {
        if sound.is_music() {
            self.music_enabled
        } else {
            self.sfx_enabled
        }
    }

    /// A play effect for `sound`, or `None` when its channel is muted.
    pub fn play(&self, sound: SoundId) -> Option<Effect> {
        self.allows(sound).then_some(Effect::PlaySound { sound, looped: sound.is_music() })
    }
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("sound '{0}' is not loaded")]
    Missing(&'static str),
    #[error("audio device unavailable: {0}")]
    Device(String),
}

pub trait AudioSink {
    fn play(&mut self, sound: SoundId, looped: bool) -> Result<(), AudioError>;
    fn stop(&mut self, sound: SoundId) -> Result<(), AudioError>;
}

/// Forward every sound effect in `effects` to `sink`. Returns how many
/// requests the sink rejected; those are logged, never propagated.
pub fn dispatch<'a>(sink: &mut dyn AudioSink, effects: impl IntoIterator<Item = &'a Effect>) -> usize {
    let mut failures = 0;
    for effect in effects {
        let result = match effect {
            Effect::PlaySound { sound, looped } => sink.play(*sound, *looped),
            Effect::StopSound(sound) => sink.stop(*sound),
            _ => continue,
        };
        if let Err(e) = result {
            failures += 1;
            tracing::warn!(error = %e, "audio request failed");
        }
    }
    failures
}

/// Sink with no output device: records requests in the trace log.
#[derive(Debug, Default)]
pub struct LoggingAudio;

impl AudioSink for LoggingAudio {
    fn play(&mut self, sound: SoundId, looped: bool) -> Result<(), AudioError> {
        tracing::trace!(sound = sound.name(), looped, "play");
        Ok(())
    }

    fn stop(&mut self, sound: SoundId) -> Result<(), AudioError> {
        tracing::trace!(sound = sound.name(), "stop");
        Ok(())
    }
}
