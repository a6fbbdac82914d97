/// Game-logic functions.
///
/// Every function here mutates a `SimulationState` in place and reports
/// what happened by appending to an `Effects` buffer. Randomness comes
/// only from the injected RNG, so a seeded RNG makes a run reproducible.

use rand::Rng;

use crate::audio::SoundId;
use crate::effects::{Effect, Effects, ParticleColor, Removal};
use crate::entities::{
    Bullet, Enemy, EnemyKind, EnemyStats, EntityKind, Powerup, PowerupKind, SimulationState,
    WeaponRevert, ENEMY_HIT_FLASH_TICKS, ENEMY_SIZE, HEALTH_PICKUP_AMOUNT, INVULNERABILITY_TICKS,
    KILLS_PER_LEVEL, MEGA_MILK_TICKS, MEGA_TO_POWER_TICKS, POWERUP_LIFESPAN_TICKS, POWERUP_SIZE,
    POWER_MILK_TICKS, SPEED_BOOST_CAP, SPEED_BOOST_FLOOR, SPEED_BOOST_TICKS,
};
use crate::geometry::{Arena, OFFSCREEN_MARGIN};
use crate::input::InputFrame;
use crate::weapons::{
    Weapon, SPECIAL_ANGLE_STEP, SPECIAL_BULLET_COUNT, SPECIAL_COOLDOWN_TICKS, SPECIAL_DAMAGE,
    SPECIAL_SIZE, SPECIAL_SPEED,
};

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// Advance the simulation by one frame, in the fixed order
/// special trigger → player → bullets → enemies → powerups → cooldowns and
/// timed effects → spawn roll.
///
/// A run that ends during the enemy update stops there: no pickup can
/// revive the player after game over.
pub fn tick(
    state: &mut SimulationState,
    input: &InputFrame,
    now_ms: u64,
    rng: &mut impl Rng,
    fx: &mut Effects,
) {
    state.tick += 1;

    if input.special {
        special_attack(state, fx);
    }

    update_player(state, input, now_ms, fx);
    update_bullets(state, fx);
    update_enemies(state, rng, fx);
    if !state.progress.running {
        return;
    }
    update_powerups(state, fx);

    state.special_cooldown = state.special_cooldown.saturating_sub(1);
    tick_timed_effects(state, fx);

    roll_spawn(state, rng, fx);
}

// ── Player ───────────────────────────────────────────────────────────────────

/// Aim, move and (if commanded) fire.
pub fn update_player(state: &mut SimulationState, input: &InputFrame, now_ms: u64, fx: &mut Effects) {
    if let Some(aim) = input.aim {
        let (cx, cy) = state.player.center();
        state.player.angle = aim.angle_from(cx, cy);
    }

    let player = &mut state.player;
    player.invulnerable = player.invulnerable.saturating_sub(1);

    let dx = input.movement.x * player.speed;
    let dy = input.movement.y * player.speed;
    let (x, y) = state.arena.clamp(player.x + dx, player.y + dy, player.width, player.height);
    player.x = x;
    player.y = y;

    if input.fire {
        fire(state, now_ms, fx);
    }
}

// ── Firing ───────────────────────────────────────────────────────────────────

/// Fire the equipped weapon along the player's facing angle.
///
/// Returns `false` without side effects while the weapon is cooling down.
pub fn fire(state: &mut SimulationState, now_ms: u64, fx: &mut Effects) -> bool {
    let stats = state.weapon.stats();
    if let Some(last) = state.last_shot_ms {
        if now_ms.saturating_sub(last) < stats.cooldown_ms {
            return false;
        }
    }
    state.last_shot_ms = Some(now_ms);
    fx.sound(SoundId::Shoot);

    let bullet = create_bullet(state);
    push_bullet(state, bullet, fx);
    true
}

/// Build a bullet for the equipped weapon, centred on the player.
pub fn create_bullet(state: &mut SimulationState) -> Bullet {
    let stats = state.weapon.stats();
    let angle = state.player.angle;
    let (cx, cy) = state.player.center();
    Bullet {
        id: state.allocate_id(),
        x: cx - stats.size / 2.0,
        y: cy - stats.size / 2.0,
        vx: angle.cos() * stats.speed,
        vy: angle.sin() * stats.speed,
        size: stats.size,
        damage: stats.damage,
        special: false,
    }
}

/// Ring of `SPECIAL_BULLET_COUNT` bullets around the player, independent of
/// the equipped weapon. Returns `false` while the special is cooling down.
pub fn special_attack(state: &mut SimulationState, fx: &mut Effects) -> bool {
    if state.special_cooldown > 0 {
        return false;
    }
    state.special_cooldown = SPECIAL_COOLDOWN_TICKS;
    fx.sound(SoundId::SpecialAttack);

    let (cx, cy) = state.player.center();
    for i in 0..SPECIAL_BULLET_COUNT {
        let angle = i as f32 * SPECIAL_ANGLE_STEP;
        let bullet = Bullet {
            id: state.allocate_id(),
            x: cx - SPECIAL_SIZE / 2.0,
            y: cy - SPECIAL_SIZE / 2.0,
            vx: angle.cos() * SPECIAL_SPEED,
            vy: angle.sin() * SPECIAL_SPEED,
            size: SPECIAL_SIZE,
            damage: SPECIAL_DAMAGE,
            special: true,
        };
        push_bullet(state, bullet, fx);
    }
    fx.push(Effect::ScreenShake);
    tracing::debug!(tick = state.tick, "special attack");
    true
}

fn push_bullet(state: &mut SimulationState, bullet: Bullet, fx: &mut Effects) {
    fx.push(Effect::Spawned {
        id: bullet.id,
        kind: EntityKind::Bullet { special: bullet.special },
        rect: bullet.rect(),
    });
    state.bullets.push(bullet);
}

// ── Bullets ──────────────────────────────────────────────────────────────────

/// Move every bullet, drop the ones far outside the arena, and let each
/// remaining bullet hit at most one live enemy. A hit always consumes the
/// bullet, lethal or not.
pub fn update_bullets(state: &mut SimulationState, fx: &mut Effects) {
    let arena = state.arena;
    let enemies = &mut state.enemies;

    state.bullets.retain_mut(|bullet| {
        bullet.x += bullet.vx;
        bullet.y += bullet.vy;

        if arena.is_far_outside(bullet.x, bullet.y) {
            fx.push(Effect::Removed { id: bullet.id, reason: Removal::OutOfBounds });
            return false;
        }

        let rect = bullet.rect();
        let Some(enemy) = enemies
            .iter_mut()
            .find(|e| !e.is_dead() && e.rect().overlaps(&rect))
        else {
            return true;
        };

        damage_enemy(enemy, bullet.damage);
        fx.push(Effect::EnemyDamaged {
            id: enemy.id,
            damage: bullet.damage,
            health_ratio: enemy.health_ratio(),
        });
        fx.push(Effect::Particles { x: bullet.x, y: bullet.y, color: ParticleColor::Yellow });
        fx.sound(SoundId::EnemyHit);
        fx.push(Effect::Removed { id: bullet.id, reason: Removal::Hit });
        false
    });
}

/// Apply bullet damage. Health bottoms out at zero; the enemy is removed
/// by the next enemy update.
pub fn damage_enemy(enemy: &mut Enemy, damage: f32) {
    enemy.health = (enemy.health - damage).max(0.0);
    enemy.hit_flash = ENEMY_HIT_FLASH_TICKS;
}

// ── Enemies ──────────────────────────────────────────────────────────────────

/// Level-scaled stats for an enemy type.
pub fn scaled_stats(kind: EnemyKind, level: u32) -> EnemyStats {
    let steps = level.saturating_sub(1) as f32;
    let health_multiplier = 1.0 + steps * 0.13;
    let base = kind.baseline();
    EnemyStats {
        health: base.health * health_multiplier,
        speed: base.speed * (1.0 + steps * 0.1),
        points: base.points * health_multiplier.floor() as u32,
        ..base
    }
}

/// Weighted pick: basic 60%, fast 30%, tank 10%.
pub fn choose_enemy_kind(rng: &mut impl Rng) -> EnemyKind {
    let roll: f64 = rng.gen();
    if roll < 0.6 {
        EnemyKind::Basic
    } else if roll < 0.9 {
        EnemyKind::Fast
    } else {
        EnemyKind::Tank
    }
}

/// A point just outside a uniformly chosen arena edge.
pub fn spawn_position(arena: &Arena, rng: &mut impl Rng) -> (f32, f32) {
    match rng.gen_range(0..4) {
        0 => (rng.gen::<f32>() * arena.width, -OFFSCREEN_MARGIN),
        1 => (arena.width + OFFSCREEN_MARGIN, rng.gen::<f32>() * arena.height),
        2 => (rng.gen::<f32>() * arena.width, arena.height + OFFSCREEN_MARGIN),
        _ => (-OFFSCREEN_MARGIN, rng.gen::<f32>() * arena.height),
    }
}

/// Build an enemy of `kind` at `(x, y)` scaled to the current level.
pub fn create_enemy(state: &mut SimulationState, kind: EnemyKind, x: f32, y: f32) -> Enemy {
    let stats = scaled_stats(kind, state.progress.level);
    Enemy {
        id: state.allocate_id(),
        x,
        y,
        width: ENEMY_SIZE,
        height: ENEMY_SIZE,
        health: stats.health,
        max_health: stats.health,
        speed: stats.speed,
        damage: stats.damage,
        points: stats.points,
        kind,
        hit_flash: 0,
    }
}

pub fn spawn_enemy(state: &mut SimulationState, rng: &mut impl Rng, fx: &mut Effects) {
    let (x, y) = spawn_position(&state.arena, rng);
    let kind = choose_enemy_kind(rng);
    let enemy = create_enemy(state, kind, x, y);
    fx.push(Effect::Spawned { id: enemy.id, kind: EntityKind::Enemy(kind), rect: enemy.rect() });
    state.enemies.push(enemy);
}

/// Per-tick spawn probability.
pub fn spawn_chance(state: &SimulationState) -> f64 {
    state.spawn_rate
        * state.progress.difficulty.spawn_multiplier()
        * (1.0 + state.progress.level as f64 * 0.1)
}

/// Roll once against `spawn_chance`; spawns an enemy on success.
pub fn roll_spawn(state: &mut SimulationState, rng: &mut impl Rng, fx: &mut Effects) -> bool {
    let chance = spawn_chance(state);
    let roll: f64 = rng.gen();
    if roll < chance {
        spawn_enemy(state, rng, fx);
        tracing::trace!(chance, enemies = state.enemies.len(), "enemy spawned");
        return true;
    }
    false
}

/// Destroy dead enemies, move the rest toward the player, and apply contact
/// damage.
pub fn update_enemies(state: &mut SimulationState, rng: &mut impl Rng, fx: &mut Effects) {
    let mut i = 0;
    while i < state.enemies.len() {
        if state.enemies[i].is_dead() {
            let enemy = state.enemies.remove(i);
            destroy_enemy(state, enemy, rng, fx);
            continue;
        }

        let (px, py) = state.player.center();
        let enemy = &mut state.enemies[i];
        enemy.hit_flash = enemy.hit_flash.saturating_sub(1);

        let (ex, ey) = enemy.rect().center();
        let (dx, dy) = (px - ex, py - ey);
        let distance = (dx * dx + dy * dy).sqrt();
        if distance > 0.0 {
            enemy.x += dx / distance * enemy.speed;
            enemy.y += dy / distance * enemy.speed;
        }

        let contact = enemy.rect().overlaps(&state.player.rect());
        let damage = enemy.damage;
        if state.player.invulnerable == 0 && contact {
            damage_player(state, damage, fx);
            let (cx, cy) = state.player.center();
            fx.push(Effect::Particles { x: cx, y: cy, color: ParticleColor::Red });
        }
        i += 1;
    }
}

fn destroy_enemy(state: &mut SimulationState, enemy: Enemy, rng: &mut impl Rng, fx: &mut Effects) {
    let (cx, cy) = enemy.rect().center();
    fx.push(Effect::Explosion { x: cx, y: cy });
    fx.sound(SoundId::EnemyDeath);
    fx.push(Effect::Removed { id: enemy.id, reason: Removal::Killed });

    let progress = &mut state.progress;
    progress.score += enemy.points;
    progress.enemies_killed += 1;

    if rng.gen::<f64>() < state.powerup_chance {
        let kind = PowerupKind::ALL[rng.gen_range(0..PowerupKind::ALL.len())];
        spawn_powerup(state, kind, enemy.x, enemy.y, fx);
    }

    if state.progress.enemies_killed % KILLS_PER_LEVEL == 0 {
        level_up(state, fx);
    }
}

pub fn level_up(state: &mut SimulationState, fx: &mut Effects) {
    state.progress.level += 1;
    state.spawn_rate += state.spawn_rate_step;
    let level = state.progress.level;
    fx.sound(SoundId::LevelUp);
    fx.push(Effect::LevelUp { level });
    fx.push(Effect::Banner(format!("Level {level}!")));
    tracing::info!(level, spawn_rate = state.spawn_rate, "level up");
}

// ── Player damage / game over ────────────────────────────────────────────────

/// Subtract contact damage and start the invulnerability window. The run
/// ends the first time health reaches zero.
pub fn damage_player(state: &mut SimulationState, damage: u32, fx: &mut Effects) {
    let progress = &mut state.progress;
    progress.health = progress.health.saturating_sub(damage);
    state.player.invulnerable = INVULNERABILITY_TICKS;
    fx.push(Effect::PlayerDamaged { damage, health: progress.health });
    fx.sound(SoundId::Hit);

    if progress.health == 0 && progress.running {
        game_over(state, fx);
    }
}

pub fn game_over(state: &mut SimulationState, fx: &mut Effects) {
    let progress = &mut state.progress;
    progress.running = false;
    progress.paused = false;
    fx.push(Effect::StopSound(SoundId::BgMusic));
    fx.sound(SoundId::GameOver);
    fx.push(Effect::GameOver);
    tracing::info!(
        score = progress.score,
        level = progress.level,
        kills = progress.enemies_killed,
        "game over"
    );
}

// ── Powerups ─────────────────────────────────────────────────────────────────

pub fn create_powerup(state: &mut SimulationState, kind: PowerupKind, x: f32, y: f32) -> Powerup {
    Powerup {
        id: state.allocate_id(),
        x,
        y,
        size: POWERUP_SIZE,
        kind,
        lifespan: POWERUP_LIFESPAN_TICKS,
    }
}

pub fn spawn_powerup(state: &mut SimulationState, kind: PowerupKind, x: f32, y: f32, fx: &mut Effects) {
    let powerup = create_powerup(state, kind, x, y);
    fx.push(Effect::Spawned { id: powerup.id, kind: EntityKind::Powerup(kind), rect: powerup.rect() });
    state.powerups.push(powerup);
}

/// Age every powerup; expired ones vanish, touched ones are collected.
pub fn update_powerups(state: &mut SimulationState, fx: &mut Effects) {
    let player = state.player.rect();
    let mut collected = Vec::new();

    state.powerups.retain_mut(|powerup| {
        powerup.lifespan = powerup.lifespan.saturating_sub(1);
        if powerup.lifespan == 0 {
            fx.push(Effect::Removed { id: powerup.id, reason: Removal::Expired });
            return false;
        }
        if powerup.rect().overlaps(&player) {
            let (cx, cy) = powerup.rect().center();
            fx.sound(SoundId::Powerup);
            fx.push(Effect::Particles { x: cx, y: cy, color: ParticleColor::Gold });
            fx.push(Effect::Removed { id: powerup.id, reason: Removal::PickedUp });
            collected.push(powerup.kind);
            return false;
        }
        true
    });

    for kind in collected {
        apply_powerup(state, kind, fx);
    }
}

pub fn apply_powerup(state: &mut SimulationState, kind: PowerupKind, fx: &mut Effects) {
    fx.push(Effect::PickedUp { kind });
    match kind {
        PowerupKind::Health => {
            let progress = &mut state.progress;
            progress.health = (progress.health + HEALTH_PICKUP_AMOUNT).min(progress.max_health);
            fx.push(Effect::Banner("Health Boost!".into()));
        }
        PowerupKind::Speed => {
            state.player.speed = (state.player.speed + 1.0).min(SPEED_BOOST_CAP);
            state.speed_boosts.push(SPEED_BOOST_TICKS);
            fx.push(Effect::Banner("Speed Boost!".into()));
        }
        PowerupKind::Weapon => upgrade_weapon(state, fx),
    }
    tracing::debug!(?kind, health = state.progress.health, speed = state.player.speed, "powerup collected");
}

/// Move one weapon tier up and schedule the way back down. A new upgrade
/// replaces whatever downgrade was pending.
pub fn upgrade_weapon(state: &mut SimulationState, fx: &mut Effects) {
    let Some(next) = state.weapon.next_tier() else {
        tracing::debug!("weapon already at top tier");
        return;
    };

    state.weapon_reverts.clear();
    match next {
        Weapon::PowerMilk => {
            state.weapon_reverts.push_back(WeaponRevert {
                remaining_ticks: POWER_MILK_TICKS,
                revert_to: Weapon::Milk,
            });
            fx.push(Effect::Banner("Power Milk!".into()));
        }
        Weapon::MegaMilk => {
            state.weapon_reverts.push_back(WeaponRevert {
                remaining_ticks: MEGA_MILK_TICKS,
                revert_to: Weapon::PowerMilk,
            });
            state.weapon_reverts.push_back(WeaponRevert {
                remaining_ticks: MEGA_TO_POWER_TICKS,
                revert_to: Weapon::Milk,
            });
            fx.push(Effect::Banner("Mega Milk!".into()));
        }
        Weapon::Milk => {}
    }
    state.weapon = next;
    fx.push(Effect::WeaponChanged { weapon: next });
}

// ── Timed effects ────────────────────────────────────────────────────────────

/// Count down speed boosts and the pending weapon downgrade.
pub fn tick_timed_effects(state: &mut SimulationState, fx: &mut Effects) {
    let mut expired = 0;
    state.speed_boosts.retain_mut(|remaining| {
        *remaining = remaining.saturating_sub(1);
        if *remaining == 0 {
            expired += 1;
            return false;
        }
        true
    });
    for _ in 0..expired {
        state.player.speed = (state.player.speed - 1.0).max(SPEED_BOOST_FLOOR);
    }

    if let Some(step) = state.weapon_reverts.front_mut() {
        step.remaining_ticks = step.remaining_ticks.saturating_sub(1);
        if step.remaining_ticks == 0 {
            let weapon = step.revert_to;
            state.weapon_reverts.pop_front();
            state.weapon = weapon;
            fx.push(Effect::WeaponChanged { weapon });
            tracing::debug!(?weapon, "weapon reverted");
        }
    }
}
