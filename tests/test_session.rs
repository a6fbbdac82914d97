use milk_blaster::audio::SoundId;
use milk_blaster::compute;
use milk_blaster::config::GameConfig;
use milk_blaster::effects::{Effect, Effects, Removal};
use milk_blaster::entities::*;
use milk_blaster::input::InputFrame;
use milk_blaster::session::{GameSession, RunSummary};
use milk_blaster::weapons::Weapon;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn quiet_config() -> GameConfig {
    GameConfig { spawn_rate: 0.0, powerup_chance: 0.0, ..GameConfig::default() }
}

fn started() -> GameSession {
    let mut session = GameSession::create(quiet_config());
    session.start(Difficulty::Normal);
    session
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn has(effects: &[Effect], wanted: &Effect) -> bool {
    effects.iter().any(|e| e == wanted)
}

const MUSIC_ON: Effect = Effect::PlaySound { sound: SoundId::BgMusic, looped: true };
const MUSIC_OFF: Effect = Effect::StopSound(SoundId::BgMusic);

#[test]
fn new_session_waits_at_menu() {
    let mut session = GameSession::create(quiet_config());
    assert!(!session.is_running());
    assert!(!session.is_scheduled());
    assert_eq!(session.run_id(), 0);
    assert!(session.frame(&InputFrame::idle(), 0, &mut seeded_rng()).is_none());
}

#[test]
fn start_begins_run_with_music() {
    let mut session = GameSession::create(quiet_config());
    let effects = session.start(Difficulty::Hard);
    assert!(session.is_running() && session.is_scheduled());
    assert_eq!(session.state().progress.difficulty, Difficulty::Hard);
    assert_eq!(session.run_id(), 1);
    assert!(has(&effects, &MUSIC_ON));

    let report = session.frame(&InputFrame::idle(), 0, &mut seeded_rng()).unwrap();
    assert_eq!(report.run_id, 1);
    assert_eq!(report.tick, 1);
    assert_eq!(report.hud, session.hud());
}

#[test]
fn muted_music_is_not_started() {
    let mut session = GameSession::create(GameConfig { music_enabled: false, ..quiet_config() });
    let effects = session.start(Difficulty::Normal);
    assert!(!effects.iter().any(|e| matches!(e, Effect::PlaySound { .. })));
}

#[test]
fn pause_stops_scheduling_until_resume() {
    let mut session = started();
    let mut rng = seeded_rng();

    assert_eq!(session.pause(), vec![MUSIC_OFF]);
    assert!(session.is_paused() && session.is_running());
    assert!(session.frame(&InputFrame::idle(), 0, &mut rng).is_none());
    assert!(session.pause().is_empty());

    assert_eq!(session.resume(), vec![MUSIC_ON]);
    assert!(session.frame(&InputFrame::idle(), 0, &mut rng).is_some());
    assert!(session.resume().is_empty());
}

#[test]
fn toggle_pause_flips() {
    let mut session = started();
    session.toggle_pause();
    assert!(session.is_paused());
    session.toggle_pause();
    assert!(!session.is_paused());
}

#[test]
fn pause_before_start_is_ignored() {
    let mut session = GameSession::create(quiet_config());
    assert!(session.pause().is_empty());
    assert!(!session.is_paused());
}

#[test]
fn timers_hold_while_paused() {
    let mut session = started();
    let mut rng = seeded_rng();
    compute::apply_powerup(session.state_mut(), PowerupKind::Weapon, &mut Effects::default());
    session.pause();
    for t in 0..2000 {
        assert!(session.frame(&InputFrame::idle(), t * 16, &mut rng).is_none());
    }
    assert_eq!(session.state().weapon, Weapon::PowerMilk);
    assert_eq!(session.state().weapon_reverts[0].remaining_ticks, POWER_MILK_TICKS);
}

#[test]
fn fire_cooldown_across_frames() {
    let mut session = started();
    let mut rng = seeded_rng();
    let fire = InputFrame { fire: true, ..InputFrame::idle() };

    let first = session.frame(&fire, 1_000, &mut rng).unwrap();
    assert!(has(&first.effects, &Effect::PlaySound { sound: SoundId::Shoot, looped: false }));
    session.frame(&fire, 1_100, &mut rng);
    assert_eq!(session.state().bullets.len(), 1);
    session.frame(&fire, 1_200, &mut rng);
    assert_eq!(session.state().bullets.len(), 2);
}

#[test]
fn muted_sfx_drops_shot_sound() {
    let mut session = started();
    session.toggle_sfx();
    let fire = InputFrame { fire: true, ..InputFrame::idle() };
    let report = session.frame(&fire, 0, &mut seeded_rng()).unwrap();
    assert_eq!(session.state().bullets.len(), 1);
    assert!(!report.effects.iter().any(|e| matches!(e, Effect::PlaySound { .. })));
}

#[test]
fn reset_clears_entities_and_timers() {
    let mut session = started();
    let mut rng = seeded_rng();
    let fire = InputFrame { fire: true, ..InputFrame::idle() };
    session.frame(&fire, 0, &mut rng);
    {
        let state = session.state_mut();
        compute::apply_powerup(state, PowerupKind::Weapon, &mut Effects::default());
        compute::apply_powerup(state, PowerupKind::Speed, &mut Effects::default());
        compute::spawn_enemy(state, &mut rng, &mut Effects::default());
        state.spawn_rate = 0.5;
        state.progress.score = 120;
    }
    let before: Vec<EntityId> = session.state().entity_ids();
    assert_eq!(before.len(), 2);
    let highest = session.state().next_id;

    let effects = session.reset();
    let cleared: Vec<EntityId> = effects
        .iter()
        .filter_map(|e| match e {
            Effect::Removed { id, reason: Removal::Cleared } => Some(*id),
            _ => None,
        })
        .collect();
    assert_eq!(cleared, before);
    assert!(has(&effects, &MUSIC_OFF));

    let state = session.state();
    assert!(state.entity_ids().is_empty());
    assert_eq!(state.weapon, Weapon::Milk);
    assert!(state.weapon_reverts.is_empty());
    assert!(state.speed_boosts.is_empty());
    assert_eq!(state.player.speed, PLAYER_BASE_SPEED);
    assert_eq!(state.spawn_rate, 0.0);
    assert_eq!(state.progress.score, 0);
    assert_eq!(state.next_id, highest);
    assert!(!session.is_running());
    assert_eq!(session.run_id(), 2);
}

#[test]
fn reset_mid_run_stops_music() {
    let mut session = started();
    let effects = session.reset();
    assert!(!session.is_scheduled());
    assert_eq!(effects, vec![MUSIC_OFF]);
}

#[test]
fn restart_keeps_difficulty() {
    let mut session = GameSession::create(quiet_config());
    session.start(Difficulty::Easy);
    session.state_mut().progress.level = 4;
    session.restart();
    assert!(session.is_running());
    assert_eq!(session.state().progress.difficulty, Difficulty::Easy);
    assert_eq!(session.state().progress.level, 1);
}

#[test]
fn death_ends_run_and_unschedules() {
    let mut session = started();
    let mut rng = seeded_rng();
    {
        let state = session.state_mut();
        state.progress.health = 1;
        state.progress.score = 75;
        let (x, y) = (state.player.x, state.player.y);
        let enemy = compute::create_enemy(state, EnemyKind::Tank, x, y);
        state.enemies.push(enemy);
    }

    let report = session.frame(&InputFrame::idle(), 0, &mut rng).unwrap();
    assert_eq!(report.effects.iter().filter(|e| matches!(e, Effect::GameOver)).count(), 1);
    assert!(has(&report.effects, &MUSIC_OFF));
    assert_eq!(report.hud.health, 0);
    assert!(!session.is_running() && !session.is_scheduled());
    assert!(session.frame(&InputFrame::idle(), 16, &mut rng).is_none());
    assert_eq!(session.summary(), RunSummary { score: 75, enemies_killed: 0, level: 1 });
}

#[test]
fn toggle_music_mid_run() {
    let mut session = started();
    assert_eq!(session.toggle_music(), vec![MUSIC_OFF]);
    assert!(!session.audio().music_enabled);
    assert_eq!(session.toggle_music(), vec![MUSIC_ON]);

    session.pause();
    session.toggle_music();
    // Re-enabled while paused: music waits for resume
    assert!(session.toggle_music().is_empty());
    assert_eq!(session.resume(), vec![MUSIC_ON]);
}

#[test]
fn show_menu_abandons_run() {
    let mut session = started();
    session.frame(&InputFrame { fire: true, ..InputFrame::idle() }, 0, &mut seeded_rng());
    let effects = session.show_menu();
    assert!(!session.is_running());
    assert!(session.state().entity_ids().is_empty());
    assert_eq!(effects.last(), Some(&MUSIC_OFF));
    assert!(effects.iter().any(|e| matches!(e, Effect::Removed { reason: Removal::Cleared, .. })));
}

#[test]
fn destroy_releases_everything() {
    let mut session = started();
    session.frame(&InputFrame { fire: true, ..InputFrame::idle() }, 0, &mut seeded_rng());
    let ids = session.state().entity_ids();
    let effects = session.destroy();
    assert_eq!(effects.len(), ids.len() + 1);
    for id in ids {
        assert!(has(&effects, &Effect::Removed { id, reason: Removal::Cleared }));
    }
}

#[test]
fn ids_never_repeat_across_runs() {
    let mut session = started();
    let mut rng = seeded_rng();
    let fire = InputFrame { fire: true, ..InputFrame::idle() };
    session.frame(&fire, 0, &mut rng);
    let old = session.state().entity_ids();
    session.restart();
    session.frame(&fire, 0, &mut rng);
    let new = session.state().entity_ids();
    assert!(new.iter().all(|id| !old.contains(id)));
}

#[test]
fn hud_reflects_boosts() {
    let mut session = started();
    let hud = session.hud();
    assert_eq!(hud.weapon_label, "Milk Blaster");
    assert!(hud.special_ready && !hud.weapon_boost_active && !hud.speed_boost_active);
    assert_eq!(hud.health_ratio(), 1.0);

    compute::apply_powerup(session.state_mut(), PowerupKind::Weapon, &mut Effects::default());
    compute::apply_powerup(session.state_mut(), PowerupKind::Speed, &mut Effects::default());
    compute::special_attack(session.state_mut(), &mut Effects::default());
    let hud = session.hud();
    assert_eq!(hud.weapon_label, "Power Milk");
    assert!(!hud.special_ready && hud.weapon_boost_active && hud.speed_boost_active);
}
