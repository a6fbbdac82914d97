use std::collections::{BTreeSet, HashMap};

use milk_blaster::audio::{dispatch, AudioError, AudioSettings, AudioSink, SoundId};
use milk_blaster::config::GameConfig;
use milk_blaster::effects::{Effect, Removal};
use milk_blaster::entities::*;
use milk_blaster::geometry::{Arena, Rect};
use milk_blaster::input::{Aim, InputFrame, Movement};
use milk_blaster::presentation::{present, release, RenderSurface};
use milk_blaster::session::GameSession;

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Surface that tracks live handles and panics on any lifecycle misuse.
#[derive(Default)]
struct RecordingSurface {
    handles: HashMap<EntityId, (EntityKind, Rect)>,
    created: usize,
    feedback: usize,
}

impl RecordingSurface {
    fn ids(&self) -> BTreeSet<EntityId> {
        self.handles.keys().copied().collect()
    }
}

impl RenderSurface for RecordingSurface {
    fn arena(&self) -> Arena {
        Arena::new(900.0, 650.0)
    }

    fn create(&mut self, id: EntityId, kind: EntityKind, rect: &Rect) {
        assert!(self.handles.insert(id, (kind, *rect)).is_none(), "duplicate handle {id:?}");
        self.created += 1;
    }

    fn place(&mut self, id: EntityId, rect: &Rect) {
        let handle = self.handles.get_mut(&id).expect("placed an entity with no handle");
        handle.1 = *rect;
    }

    fn destroy(&mut self, id: EntityId) {
        assert!(self.handles.remove(&id).is_some(), "destroyed unknown handle {id:?}");
    }

    fn feedback(&mut self, _effect: &Effect) {
        self.feedback += 1;
    }
}

fn live_ids(session: &GameSession) -> BTreeSet<EntityId> {
    session.state().entity_ids().into_iter().collect()
}

#[test]
fn handles_track_live_entities_over_many_frames() {
    let config = GameConfig { spawn_rate: 0.05, powerup_chance: 1.0, ..GameConfig::default() };
    let mut session = GameSession::create(config);
    let mut surface = RecordingSurface::default();
    let mut rng = StdRng::seed_from_u64(42);

    let effects = session.start(Difficulty::Hard);
    present(&mut surface, session.state(), &effects);

    let mut runs = 1;
    for t in 0..3000u64 {
        let input = InputFrame {
            movement: if (t / 120) % 2 == 0 {
                Movement::from_keys(true, false, true, false)
            } else {
                Movement::from_keys(false, true, false, true)
            },
            fire: true,
            special: t % 10 == 0,
            aim: Some(Aim::Angle(t as f32 * 0.1)),
        };
        match session.frame(&input, t * 16, &mut rng) {
            Some(report) => present(&mut surface, session.state(), &report.effects),
            None => {
                let effects = session.restart();
                present(&mut surface, session.state(), &effects);
                runs += 1;
            }
        }
        assert_eq!(surface.ids(), live_ids(&session), "frame {t}");
        for bullet in &session.state().bullets {
            assert_eq!(surface.handles[&bullet.id].1, bullet.rect());
        }
    }
    assert!(surface.created > 0);
    assert!(surface.feedback > 0);
    assert!(runs >= 1);

    let effects = session.destroy();
    release(&mut surface, &effects);
    assert!(surface.handles.is_empty());
}

#[test]
fn spawn_and_removal_in_one_frame_never_reach_surface() {
    let state = SimulationState::new(Arena::new(900.0, 650.0), Difficulty::Normal, 0.0, 0.0, 0.0);
    let id = EntityId(7);
    let effects = vec![
        Effect::Spawned {
            id,
            kind: EntityKind::Bullet { special: false },
            rect: Rect::new(940.0, 0.0, 12.0, 12.0),
        },
        Effect::Removed { id, reason: Removal::OutOfBounds },
    ];
    let mut surface = RecordingSurface::default();
    present(&mut surface, &state, &effects);
    assert_eq!(surface.created, 0);
    assert!(surface.handles.is_empty());
}

#[test]
fn non_lifecycle_effects_go_to_feedback() {
    let state = SimulationState::new(Arena::new(900.0, 650.0), Difficulty::Normal, 0.0, 0.0, 0.0);
    let effects = vec![Effect::ScreenShake, Effect::Banner("Level 2!".into()), Effect::GameOver];
    let mut surface = RecordingSurface::default();
    present(&mut surface, &state, &effects);
    assert_eq!(surface.feedback, 3);
}

// ── Audio ─────────────────────────────────────────────────────────────────────

/// Sink whose sound effects were never loaded; music works.
#[derive(Default)]
struct BrokenSfx {
    played: Vec<SoundId>,
    stopped: Vec<SoundId>,
}

impl AudioSink for BrokenSfx {
    fn play(&mut self, sound: SoundId, _looped: bool) -> Result<(), AudioError> {
        if !sound.is_music() {
            return Err(AudioError::Missing(sound.name()));
        }
        self.played.push(sound);
        Ok(())
    }

    fn stop(&mut self, sound: SoundId) -> Result<(), AudioError> {
        self.stopped.push(sound);
        Ok(())
    }
}

#[test]
fn audio_failures_are_counted_not_raised() {
    let audio = AudioSettings::default();
    let effects: Vec<Effect> = [SoundId::BgMusic, SoundId::Shoot, SoundId::EnemyHit]
        .into_iter()
        .filter_map(|s| audio.play(s))
        .chain([Effect::ScreenShake, Effect::StopSound(SoundId::BgMusic)])
        .collect();

    let mut sink = BrokenSfx::default();
    assert_eq!(dispatch(&mut sink, &effects), 2);
    assert_eq!(sink.played, vec![SoundId::BgMusic]);
    assert_eq!(sink.stopped, vec![SoundId::BgMusic]);
}

#[test]
fn audio_settings_gate_channels() {
    let audio = AudioSettings { music_enabled: false, sfx_enabled: true };
    assert_eq!(audio.play(SoundId::BgMusic), None);
    assert_eq!(
        audio.play(SoundId::LevelUp),
        Some(Effect::PlaySound { sound: SoundId::LevelUp, looped: false })
    );
    let muted = AudioSettings { music_enabled: true, sfx_enabled: false };
    assert!(muted.allows(SoundId::BgMusic));
    assert!(!muted.allows(SoundId::GameOver));
}
