use milk_blaster::entities::*;
use milk_blaster::geometry::{overlaps, Arena, Rect};
use milk_blaster::weapons::*;

#[test]
fn rects_sharing_an_edge_do_not_overlap() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let touching = Rect::new(10.0, 0.0, 10.0, 10.0);
    let inside = Rect::new(9.0, 9.0, 10.0, 10.0);
    assert!(!overlaps(&a, &touching));
    assert!(overlaps(&a, &inside));
    assert!(inside.overlaps(&a));
    assert_eq!(a.center(), (5.0, 5.0));
}

#[test]
fn arena_clamp_keeps_box_inside() {
    let arena = Arena::new(900.0, 650.0);
    assert_eq!(arena.clamp(-5.0, -5.0, 60.0, 60.0), (0.0, 0.0));
    assert_eq!(arena.clamp(2000.0, 2000.0, 60.0, 60.0), (840.0, 590.0));
    assert_eq!(arena.clamp(100.0, 200.0, 60.0, 60.0), (100.0, 200.0));
}

#[test]
fn arena_far_outside_uses_margin() {
    let arena = Arena::new(900.0, 650.0);
    assert!(!arena.is_far_outside(-50.0, 0.0));
    assert!(arena.is_far_outside(-50.1, 0.0));
    assert!(!arena.is_far_outside(950.0, 700.0));
    assert!(arena.is_far_outside(0.0, 700.5));
}

#[test]
#[should_panic]
fn arena_rejects_zero_size() {
    Arena::new(0.0, 650.0);
}

#[test]
#[should_panic(expected = "too small")]
fn state_rejects_arena_smaller_than_player() {
    SimulationState::new(Arena::new(30.0, 30.0), Difficulty::Normal, 0.0, 0.0, 0.0);
}

#[test]
fn weapon_table() {
    assert_eq!(
        Weapon::Milk.stats(),
        WeaponStats { damage: 25.0, speed: 8.0, size: 12.0, cooldown_ms: 200 }
    );
    assert_eq!(
        Weapon::PowerMilk.stats(),
        WeaponStats { damage: 40.0, speed: 10.0, size: 16.0, cooldown_ms: 250 }
    );
    assert_eq!(
        Weapon::MegaMilk.stats(),
        WeaponStats { damage: 60.0, speed: 12.0, size: 20.0, cooldown_ms: 400 }
    );
    assert_eq!(Weapon::default(), Weapon::Milk);
}

#[test]
fn weapon_tiers_stop_at_mega() {
    assert_eq!(Weapon::Milk.next_tier(), Some(Weapon::PowerMilk));
    assert_eq!(Weapon::PowerMilk.next_tier(), Some(Weapon::MegaMilk));
    assert_eq!(Weapon::MegaMilk.next_tier(), None);
    assert_eq!(Weapon::PowerMilk.label(), "Power Milk");
}

#[test]
fn enemy_baselines() {
    let basic = EnemyKind::Basic.baseline();
    assert_eq!((basic.health, basic.speed, basic.damage, basic.points), (35.0, 1.5, 15, 10));
    let fast = EnemyKind::Fast.baseline();
    assert_eq!((fast.health, fast.speed, fast.damage, fast.points), (20.0, 3.0, 10, 15));
    let tank = EnemyKind::Tank.baseline();
    assert_eq!((tank.health, tank.speed, tank.damage, tank.points), (60.0, 1.0, 20, 25));
}

#[test]
fn difficulty_parses_case_insensitively() {
    assert_eq!("easy".parse::<Difficulty>(), Ok(Difficulty::Easy));
    assert_eq!("NORMAL".parse::<Difficulty>(), Ok(Difficulty::Normal));
    assert_eq!("Hard".parse::<Difficulty>(), Ok(Difficulty::Hard));
    assert!("nightmare".parse::<Difficulty>().is_err());
    assert_eq!(Difficulty::default(), Difficulty::Normal);
    assert_eq!(Difficulty::Hard.spawn_multiplier(), 1.3);
}

#[test]
fn timed_effect_durations_in_ticks() {
    assert_eq!(SPEED_BOOST_TICKS, 600);
    assert_eq!(POWER_MILK_TICKS, 900);
    assert_eq!(MEGA_MILK_TICKS, 600);
    assert_eq!(MEGA_TO_POWER_TICKS, 300);
}

#[test]
fn ids_are_unique_and_tracked() {
    let mut state = SimulationState::new(Arena::new(900.0, 650.0), Difficulty::Easy, 0.0, 0.0, 0.0);
    let a = state.allocate_id();
    let b = state.allocate_id();
    assert_ne!(a, b);
    assert!(state.entity_ids().is_empty());
    assert_eq!(state.entity_rect(a), None);

    state.powerups.push(Powerup {
        id: a,
        x: 5.0,
        y: 6.0,
        size: POWERUP_SIZE,
        kind: PowerupKind::Speed,
        lifespan: 10,
    });
    assert_eq!(state.entity_ids(), vec![a]);
    assert_eq!(state.entity_rect(a), Some(Rect::new(5.0, 6.0, 35.0, 35.0)));
}

#[test]
fn fresh_progress() {
    let p = GameProgress::new(Difficulty::Hard);
    assert_eq!((p.score, p.health, p.max_health, p.level), (0, 160, 160, 1));
    assert!(!p.running && !p.paused);
}

#[test]
fn enemy_health_ratio_is_bounded() {
    let mut e = Enemy {
        id: EntityId(1),
        x: 0.0,
        y: 0.0,
        width: ENEMY_SIZE,
        height: ENEMY_SIZE,
        health: 30.0,
        max_health: 60.0,
        speed: 1.0,
        damage: 20,
        points: 25,
        kind: EnemyKind::Tank,
        hit_flash: 0,
    };
    assert_eq!(e.health_ratio(), 0.5);
    e.health = 0.0;
    assert!(e.is_dead());
    assert_eq!(e.health_ratio(), 0.0);
}
