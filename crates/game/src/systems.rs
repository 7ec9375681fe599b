use crate::actions::PlayerAction;
use crate::config::MatchConfig;
use crate::effects::Floater;
use crate::enemy::{self, Enemy};
use crate::events::GameEvent;
use crate::projectile::{
    chain_tier, Projectile, ProjectileKind, SlowSpec, AREA_HIT_RADIUS_PX, AREA_SPEED_FACTOR,
    CHAIN_SPEED_FACTOR, HIT_RADIUS_PX,
};
use crate::tower::{Tower, TowerKind};
use crate::world::{CellState, EnemyId, GameState, ProjectileId, TowerId, WaveSpawner};
use defense_core::{frames, TerminalOutcome};
use rand_chacha::ChaCha8Rng;
use slotmap::SlotMap;
use std::collections::HashSet;
use tracing::debug;

fn dist_sq(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    let dx = ax - bx;
    let dy = ay - by;
    dx * dx + dy * dy
}

pub fn process_action(
    state: &mut GameState,
    cfg: &MatchConfig,
    action: &PlayerAction,
    events: &mut Vec<GameEvent>,
) {
    if state.is_over() {
        return;
    }
    match action {
        PlayerAction::PlaceTower { cell, kind } => {
            if !state.grid.in_bounds(*cell) || state.grid.get(*cell).is_blocked() {
                events.push(GameEvent::CellBlocked { cell: *cell });
                return;
            }
            let spec = cfg.towers.spec(*kind);
            if state.gold < spec.cost {
                events.push(GameEvent::InsufficientGold {
                    cost: spec.cost,
                    have: state.gold,
                });
                return;
            }
            state.gold -= spec.cost;
            let tower = Tower::place(*kind, *cell, spec, cfg.skills.damage_bonus_pct());
            let id = state.towers.insert(tower);
            state.grid.set(*cell, CellState::Tower(id));
            events.push(GameEvent::TowerPlaced {
                id,
                kind: *kind,
                cell: *cell,
            });
        }
        PlayerAction::UpgradeTower { id } => {
            let Some(tower) = state.towers.get(*id) else {
                events.push(GameEvent::TowerNotFound);
                return;
            };
            let spec = cfg.towers.spec(tower.kind);
            if tower.at_max_level(spec) {
                events.push(GameEvent::MaxLevelReached { id: *id });
                return;
            }
            let cost = tower.upgrade_cost(spec);
            if state.gold < cost {
                events.push(GameEvent::InsufficientGold {
                    cost,
                    have: state.gold,
                });
                return;
            }
            state.gold -= cost;
            let tower = &mut state.towers[*id];
            tower.level += 1;
            tower.total_cost += cost;
            tower.recompute(spec, cfg.skills.damage_bonus_pct());
            events.push(GameEvent::TowerUpgraded {
                id: *id,
                level: tower.level,
                cost,
            });
        }
        PlayerAction::SellTower { id } => {
            let Some(tower) = state.towers.remove(*id) else {
                events.push(GameEvent::TowerNotFound);
                return;
            };
            let refund = tower.sell_refund(cfg.game.sell_pct);
            state.gold += refund;
            state.grid.set(tower.cell, CellState::Empty);
            let orphaned: Vec<ProjectileId> = state
                .projectiles
                .iter()
                .filter_map(|(pid, p)| (p.owner == *id).then_some(pid))
                .collect();
            for pid in orphaned {
                state.projectiles.remove(pid);
            }
            events.push(GameEvent::TowerSold { id: *id, refund });
        }
        PlayerAction::StartWave => {
            state.next_wave_timer_ms = 0.0;
        }
        PlayerAction::Pause => {
            state.paused = true;
        }
        PlayerAction::Resume => {
            state.paused = false;
        }
        // Restart rebuilds the whole state; handled by the orchestrator.
        PlayerAction::Restart => {}
    }
}

/// Advance the global clocks. The wave countdown only runs between waves.
pub fn advance_clock(state: &mut GameState, dt_ms: f64) {
    state.game_time_ms += dt_ms;
    if !state.wave_in_progress {
        state.next_wave_timer_ms -= dt_ms;
    }
}

/// Begin the next wave when due, and trickle-spawn the current one.
pub fn update_wave(
    state: &mut GameState,
    cfg: &MatchConfig,
    rng: &mut ChaCha8Rng,
    dt_ms: f64,
    events: &mut Vec<GameEvent>,
) {
    if !state.wave_in_progress
        && state.next_wave_timer_ms <= 0.0
        && state.enemies.is_empty()
        && state.wave < cfg.game.max_waves
    {
        state.wave += 1;
        let count = cfg.game.base_enemies + (state.wave - 1) * cfg.game.enemies_increase;
        state.wave_in_progress = true;
        state.all_spawned = false;
        state.spawner = Some(WaveSpawner {
            remaining: count,
            interval_ms: cfg.game.spawn_interval_ms,
            // Primed so the first enemy appears immediately.
            accum_ms: cfg.game.spawn_interval_ms,
        });
        debug!(wave = state.wave, count, "wave started");
        events.push(GameEvent::WaveStarted {
            wave: state.wave,
            enemy_count: count,
        });
    }

    if let Some(mut spawner) = state.spawner.take() {
        spawner.accum_ms += dt_ms;
        while spawner.accum_ms >= spawner.interval_ms && spawner.remaining > 0 {
            spawner.accum_ms -= spawner.interval_ms;
            spawner.remaining -= 1;
            let kind = enemy::roll_kind(rng, &cfg.enemies);
            let spawned = Enemy::spawn(kind, state.wave, &cfg.enemies, &state.path);
            let id = state.enemies.insert(spawned);
            events.push(GameEvent::EnemySpawned { id, kind });
        }
        if spawner.remaining == 0 {
            state.all_spawned = true;
            state.spawner = None;
        } else {
            state.spawner = Some(spawner);
        }
    }
}

/// Nearest live enemy within range; ties fall to the first one found.
fn find_target(
    enemies: &SlotMap<EnemyId, Enemy>,
    tx: f64,
    ty: f64,
    range: f64,
) -> Option<EnemyId> {
    let range_sq = range * range;
    let mut best: Option<(EnemyId, f64)> = None;
    for (id, e) in enemies.iter() {
        if e.is_dead() {
            continue;
        }
        let d = dist_sq(e.x, e.y, tx, ty);
        if d <= range_sq && best.map_or(true, |(_, bd)| d < bd) {
            best = Some((id, d));
        }
    }
    best.map(|(id, _)| id)
}

/// Precompute a tesla shot's ricochet list: repeatedly the nearest unused live
/// enemy within the hop radius of the previously chosen one.
fn plan_chain(
    enemies: &SlotMap<EnemyId, Enemy>,
    first: EnemyId,
    chain_max: u32,
    hop_radius: f64,
) -> Vec<EnemyId> {
    let mut targets = vec![first];
    let mut used: HashSet<EnemyId> = HashSet::from([first]);
    let Some(e) = enemies.get(first) else {
        return targets;
    };
    let (mut lx, mut ly) = (e.x, e.y);
    let hop_sq = hop_radius * hop_radius;
    while (targets.len() as u32) < chain_max {
        let mut best: Option<(EnemyId, f64)> = None;
        for (id, e) in enemies.iter() {
            if e.is_dead() || used.contains(&id) {
                continue;
            }
            let d = dist_sq(e.x, e.y, lx, ly);
            if d <= hop_sq && best.map_or(true, |(_, bd)| d < bd) {
                best = Some((id, d));
            }
        }
        let Some((id, _)) = best else { break };
        used.insert(id);
        let e = &enemies[id];
        lx = e.x;
        ly = e.y;
        targets.push(id);
    }
    targets
}

fn fire(state: &mut GameState, cfg: &MatchConfig, tower_id: TowerId, target: EnemyId) {
    let tower = &state.towers[tower_id];
    let spec = cfg.towers.spec(tower.kind);
    let origin = tower.center();
    let damage = tower.damage;
    let range = tower.range;
    let base_speed = spec.projectile_speed;
    let (kind, speed) = match tower.kind {
        TowerKind::Archer => (
            ProjectileKind::Direct {
                target,
                slow: None,
            },
            base_speed,
        ),
        TowerKind::Magic => (
            ProjectileKind::Direct {
                target,
                slow: Some(SlowSpec {
                    slow_pct: spec.slow_pct,
                    duration_ms: spec.slow_duration_ms,
                }),
            },
            base_speed,
        ),
        TowerKind::Cannon => (
            ProjectileKind::Area {
                target,
                radius: spec.area_radius,
                damage_mult: spec.area_damage_mult,
            },
            base_speed * AREA_SPEED_FACTOR,
        ),
        TowerKind::Tesla => (
            ProjectileKind::Chain {
                targets: plan_chain(
                    &state.enemies,
                    target,
                    spec.chain_max,
                    spec.chain_radius_factor * range,
                ),
                next: 0,
                hits: 0,
                trail: Vec::new(),
            },
            base_speed * CHAIN_SPEED_FACTOR,
        ),
        // Special never reaches the projectile system.
        TowerKind::Special => unreachable!("special towers do not fire projectiles"),
    };
    state
        .projectiles
        .insert(Projectile::new(tower_id, kind, origin, damage, speed));
}

pub fn update_towers(state: &mut GameState, cfg: &MatchConfig, dt_ms: f64) {
    let tower_ids: Vec<TowerId> = state.towers.keys().collect();
    for id in tower_ids {
        let Some(tower) = state.towers.get(id) else {
            continue;
        };
        let kind = tower.kind;
        let (tx, ty) = tower.center();
        let range = tower.range;
        let fire_rate = tower.fire_rate_ms;

        if kind == TowerKind::Special {
            // Bypasses projectiles entirely: hits the whole map on cooldown.
            let any_target = state.enemies.values().any(|e| !e.is_dead());
            if !any_target {
                state.towers[id].cooldown_ms = 0.0;
                continue;
            }
            state.towers[id].cooldown_ms += dt_ms;
            if state.towers[id].cooldown_ms >= fire_rate {
                state.towers[id].cooldown_ms = 0.0;
                let damage = state.towers[id].damage as i64;
                let enemy_ids: Vec<EnemyId> = state.enemies.keys().collect();
                for eid in enemy_ids {
                    damage_enemy(state, eid, damage);
                }
            }
            continue;
        }

        // Revalidate the held target, then rescan if needed.
        let still_valid = match tower.target {
            Some(eid) => state
                .enemies
                .get(eid)
                .is_some_and(|e| !e.is_dead() && dist_sq(e.x, e.y, tx, ty) <= range * range),
            None => false,
        };
        if !still_valid {
            let found = find_target(&state.enemies, tx, ty, range);
            state.towers[id].target = found;
        }

        match state.towers[id].target {
            Some(target) if !state.has_live_projectile(id) => {
                state.towers[id].cooldown_ms += dt_ms;
                if state.towers[id].cooldown_ms >= fire_rate {
                    state.towers[id].cooldown_ms = 0.0;
                    fire(state, cfg, id, target);
                }
            }
            // No target, or a shot still in flight: the accumulator resets.
            _ => {
                state.towers[id].cooldown_ms = 0.0;
            }
        }
    }
}

pub fn update_enemies(
    state: &mut GameState,
    cfg: &MatchConfig,
    dt_ms: f64,
    events: &mut Vec<GameEvent>,
) {
    let now = state.game_time_ms;
    let enemy_ids: Vec<EnemyId> = state.enemies.keys().collect();
    let mut leaked = Vec::new();
    for id in enemy_ids {
        let Some(e) = state.enemies.get_mut(id) else {
            continue;
        };
        if e.is_dead() {
            continue;
        }
        e.tick_status(now);
        if e.advance(dt_ms, &state.path) {
            leaked.push(id);
        }
    }

    for id in leaked {
        if state.enemies.remove(id).is_some() {
            let reduced = (cfg.game.leak_damage as f64 * (1.0 - cfg.skills.defense_pct() / 100.0))
                .floor() as u32;
            let damage = reduced.max(1);
            state.health = state.health.saturating_sub(damage);
            events.push(GameEvent::EnemyLeaked { id, damage });
        }
    }
}

/// Decrement health and drop a damage number. Death credit happens in
/// `remove_dead`, once, however many sources wounded the enemy this tick.
fn damage_enemy(state: &mut GameState, id: EnemyId, amount: i64) {
    let Some(e) = state.enemies.get_mut(id) else {
        return;
    };
    if e.is_dead() {
        return;
    }
    e.health -= amount;
    let (x, y) = (e.x, e.y);
    state.floaters.insert(Floater::new(x, y, amount));
}

fn alive_pos(enemies: &SlotMap<EnemyId, Enemy>, id: EnemyId) -> Option<(f64, f64)> {
    enemies
        .get(id)
        .filter(|e| !e.is_dead())
        .map(|e| (e.x, e.y))
}

fn step_toward(p: &mut Projectile, tx: f64, ty: f64, dt_ms: f64) {
    let dx = tx - p.x;
    let dy = ty - p.y;
    let dist = (dx * dx + dy * dy).sqrt();
    if dist <= f64::EPSILON {
        return;
    }
    let step = (p.speed * frames(dt_ms)).min(dist);
    p.x += dx / dist * step;
    p.y += dy / dist * step;
}

fn explode(state: &mut GameState, id: ProjectileId, radius: f64, damage_mult: f64) {
    let Some(p) = state.projectiles.remove(id) else {
        return;
    };
    let damage = (p.damage as f64 * damage_mult).floor() as i64;
    let radius_sq = radius * radius;
    let victims: Vec<EnemyId> = state
        .enemies
        .iter()
        .filter_map(|(eid, e)| {
            (!e.is_dead() && dist_sq(e.x, e.y, p.x, p.y) <= radius_sq).then_some(eid)
        })
        .collect();
    for eid in victims {
        damage_enemy(state, eid, damage);
    }
}

fn chain_step(state: &mut GameState, id: ProjectileId, dt_ms: f64) {
    // Skip targets that died while the shot was in the air.
    let (target, hits_so_far) = loop {
        let Some(p) = state.projectiles.get_mut(id) else {
            return;
        };
        let ProjectileKind::Chain { targets, next, hits, .. } = &mut p.kind else {
            return;
        };
        if *next >= targets.len() {
            state.projectiles.remove(id);
            return;
        }
        let candidate = targets[*next];
        if state.enemies.get(candidate).is_some_and(|e| !e.is_dead()) {
            break (candidate, *hits);
        }
        *next += 1;
    };

    let Some((ex, ey)) = alive_pos(&state.enemies, target) else {
        return;
    };
    let hit = {
        let p = &mut state.projectiles[id];
        step_toward(p, ex, ey, dt_ms);
        p.push_trail();
        dist_sq(p.x, p.y, ex, ey) <= HIT_RADIUS_PX * HIT_RADIUS_PX
    };
    if hit {
        // Tier by enemies actually struck: a skipped dead target must not
        // consume one.
        let damage =
            (state.projectiles[id].damage as f64 * chain_tier(hits_so_far)).floor() as i64;
        damage_enemy(state, target, damage);
        let exhausted = {
            let ProjectileKind::Chain { targets, next, hits, .. } =
                &mut state.projectiles[id].kind
            else {
                return;
            };
            *next += 1;
            *hits += 1;
            *next >= targets.len()
        };
        if exhausted {
            state.projectiles.remove(id);
        }
    }
}

pub fn update_projectiles(state: &mut GameState, dt_ms: f64) {
    let now = state.game_time_ms;
    let ids: Vec<ProjectileId> = state.projectiles.keys().collect();
    for id in ids {
        let expired = {
            let Some(p) = state.projectiles.get_mut(id) else {
                continue;
            };
            p.age_ms += dt_ms;
            p.expired()
        };
        if expired {
            state.projectiles.remove(id);
            continue;
        }

        enum Step {
            Direct {
                target: EnemyId,
                slow: Option<SlowSpec>,
            },
            Area {
                target: EnemyId,
                radius: f64,
                damage_mult: f64,
            },
            Chain,
        }
        let step = match &state.projectiles[id].kind {
            ProjectileKind::Direct { target, slow } => Step::Direct {
                target: *target,
                slow: *slow,
            },
            ProjectileKind::Area {
                target,
                radius,
                damage_mult,
            } => Step::Area {
                target: *target,
                radius: *radius,
                damage_mult: *damage_mult,
            },
            ProjectileKind::Chain { .. } => Step::Chain,
        };

        match step {
            Step::Direct { target, slow } => {
                let Some((ex, ey)) = alive_pos(&state.enemies, target) else {
                    state.projectiles.remove(id);
                    continue;
                };
                let hit = {
                    let p = &mut state.projectiles[id];
                    step_toward(p, ex, ey, dt_ms);
                    dist_sq(p.x, p.y, ex, ey) <= HIT_RADIUS_PX * HIT_RADIUS_PX
                };
                if hit {
                    let damage = state.projectiles[id].damage as i64;
                    damage_enemy(state, target, damage);
                    if let Some(s) = slow {
                        if let Some(e) = state.enemies.get_mut(target) {
                            e.apply_slow(s.slow_pct, s.duration_ms, now);
                        }
                    }
                    state.projectiles.remove(id);
                }
            }
            Step::Area {
                target,
                radius,
                damage_mult,
            } => match alive_pos(&state.enemies, target) {
                // Target gone mid-flight: detonate where the shell is.
                None => explode(state, id, radius, damage_mult),
                Some((ex, ey)) => {
                    let boom = {
                        let p = &mut state.projectiles[id];
                        step_toward(p, ex, ey, dt_ms);
                        dist_sq(p.x, p.y, ex, ey) <= AREA_HIT_RADIUS_PX * AREA_HIT_RADIUS_PX
                    };
                    if boom {
                        explode(state, id, radius, damage_mult);
                    }
                }
            },
            Step::Chain => chain_step(state, id, dt_ms),
        }
    }
}

pub fn update_floaters(state: &mut GameState, dt_ms: f64) {
    let ids: Vec<_> = state.floaters.keys().collect();
    for id in ids {
        let expired = match state.floaters.get_mut(id) {
            Some(f) => f.update(dt_ms),
            None => continue,
        };
        if expired {
            state.floaters.remove(id);
        }
    }
}

/// Sweep out dead enemies, crediting gold and score exactly once each.
pub fn remove_dead(state: &mut GameState, cfg: &MatchConfig, events: &mut Vec<GameEvent>) {
    let dead: Vec<EnemyId> = state
        .enemies
        .iter()
        .filter_map(|(id, e)| e.is_dead().then_some(id))
        .collect();
    for id in dead {
        if let Some(e) = state.enemies.remove(id) {
            let gold = (e.reward as f64 * cfg.skills.gold_multiplier()).floor() as u32;
            let score =
                (e.reward as f64 * cfg.game.points_per_kill as f64 * e.score_mult).floor() as u32;
            state.gold += gold;
            state.score += score;
            events.push(GameEvent::EnemyKilled {
                id,
                kind: e.kind,
                gold,
                score,
            });
        }
    }
}

/// Mandatory end-of-tick pass: enemy removal is driven by the enemies
/// themselves, so anything still pointing at a removed enemy is cleared here.
pub fn clear_stale_refs(state: &mut GameState) {
    let tower_ids: Vec<TowerId> = state.towers.keys().collect();
    for id in tower_ids {
        let stale = state.towers[id]
            .target
            .is_some_and(|eid| !state.enemies.contains_key(eid));
        if stale {
            state.towers[id].target = None;
        }
    }

    let stale: Vec<ProjectileId> = state
        .projectiles
        .iter()
        .filter_map(|(id, p)| {
            let dead_end = match &p.kind {
                ProjectileKind::Direct { target, .. } => !state.enemies.contains_key(*target),
                // Detonates at its current position on the next update.
                ProjectileKind::Area { .. } => false,
                ProjectileKind::Chain { targets, next, .. } => !targets
                    .get(*next..)
                    .unwrap_or(&[])
                    .iter()
                    .any(|t| state.enemies.contains_key(*t)),
            };
            dead_end.then_some(id)
        })
        .collect();
    for id in stale {
        state.projectiles.remove(id);
    }
}

/// Passive regeneration from the skill tree, capped at starting health.
pub fn apply_passive_heal(state: &mut GameState, cfg: &MatchConfig, dt_ms: f64) {
    let amount = cfg.skills.heal_amount();
    if amount == 0 {
        return;
    }
    state.heal_accum_ms += dt_ms;
    let interval = cfg.skills.heal_interval_ms();
    while state.heal_accum_ms >= interval {
        state.heal_accum_ms -= interval;
        state.health = (state.health + amount).min(cfg.game.starting_health);
    }
}

/// Defeat, wave completion and victory checks, in that order.
pub fn check_progress(state: &mut GameState, cfg: &MatchConfig, events: &mut Vec<GameEvent>) {
    if state.is_over() {
        return;
    }
    if state.health == 0 {
        state.outcome = Some(TerminalOutcome::Defeat);
        debug!(wave = state.wave, "defeat");
        events.push(GameEvent::Defeat { wave: state.wave });
        return;
    }
    // Completion needs both "nothing left alive" and "nothing left to spawn",
    // so a transient empty map during the trickle window does not end the wave.
    if state.wave_in_progress && state.all_spawned && state.enemies.is_empty() {
        state.wave_in_progress = false;
        if state.wave >= cfg.game.max_waves {
            state.outcome = Some(TerminalOutcome::Victory);
            debug!(wave = state.wave, "victory");
            events.push(GameEvent::Victory {
                skill_points: cfg.game.victory_skill_points,
            });
        } else {
            state.score += cfg.game.wave_bonus;
            state.next_wave_timer_ms = cfg.game.wave_delay_ms;
            debug!(wave = state.wave, "wave completed");
            events.push(GameEvent::WaveCompleted {
                wave: state.wave,
                bonus: cfg.game.wave_bonus,
            });
        }
    }
}
