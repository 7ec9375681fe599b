use defense_core::{ActionEnvelope, Game, TerminalOutcome, FRAME_MS};
use defense_sim::events::Severity;
use defense_sim::path::Cell;
use defense_sim::{DefenseGame, GameEvent, MatchConfig, PlayerAction, TowerKind};

fn act(payload: PlayerAction) -> Vec<ActionEnvelope<PlayerAction>> {
    vec![ActionEnvelope {
        player_id: 0,
        action_id: 0,
        intended_frame: 0,
        payload,
    }]
}

/// A small map with quick waves so tests finish in a few hundred ticks.
fn short_match() -> MatchConfig {
    let mut cfg = MatchConfig::default();
    cfg.game.grid_width = 10;
    cfg.game.grid_height = 10;
    cfg.game.path = (0..6).map(|x| Cell::new(x, 0)).collect();
    cfg.game.wave_delay_ms = 100.0;
    cfg.game.spawn_interval_ms = 50.0;
    cfg.game.base_enemies = 3;
    cfg.game.enemies_increase = 2;
    cfg.game.max_waves = 2;
    cfg
}

fn run(game: &mut DefenseGame, ticks: usize, events: &mut Vec<GameEvent>) {
    for _ in 0..ticks {
        game.update(FRAME_MS, &[], events);
    }
}

#[test]
fn wave_completes_only_after_every_spawn() {
    let cfg = short_match();
    let expected = cfg.game.base_enemies;
    let mut game = DefenseGame::new(cfg, 42).unwrap();
    let mut events = Vec::new();

    // No towers: every enemy eventually leaks and the wave must still
    // complete, but never before the spawner has emptied.
    for _ in 0..20_000 {
        game.update(FRAME_MS, &[], &mut events);
        if events
            .iter()
            .any(|e| matches!(e, GameEvent::WaveCompleted { wave: 1, .. }))
        {
            break;
        }
    }
    let completed_at = events
        .iter()
        .position(|e| matches!(e, GameEvent::WaveCompleted { wave: 1, .. }))
        .expect("wave never completed");
    let spawned_before = events[..completed_at]
        .iter()
        .filter(|e| matches!(e, GameEvent::EnemySpawned { .. }))
        .count();
    assert_eq!(spawned_before as u32, expected);
}

#[test]
fn second_wave_is_larger() {
    let cfg = short_match();
    let mut game = DefenseGame::new(cfg, 42).unwrap();
    let mut events = Vec::new();
    for _ in 0..40_000 {
        game.update(FRAME_MS, &[], &mut events);
        if game.outcome().is_some() {
            break;
        }
    }
    let counts: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::WaveStarted { enemy_count, .. } => Some(*enemy_count),
            _ => None,
        })
        .collect();
    assert_eq!(counts, vec![3, 5]);
}

#[test]
fn leaks_drain_health_until_defeat() {
    let mut cfg = short_match();
    cfg.game.starting_health = 2;
    let mut game = DefenseGame::new(cfg, 7).unwrap();
    let mut events = Vec::new();
    for _ in 0..20_000 {
        game.update(FRAME_MS, &[], &mut events);
        if game.outcome().is_some() {
            break;
        }
    }
    assert_eq!(game.outcome(), Some(TerminalOutcome::Defeat));
    assert!(events
        .iter()
        .any(|e| matches!(e, GameEvent::Defeat { wave: 1 })));
    // Frozen after the loss: further updates change nothing.
    let health = game.state().health;
    run(&mut game, 100, &mut events);
    assert_eq!(game.state().health, health);
    assert_eq!(game.outcome(), Some(TerminalOutcome::Defeat));
}

#[test]
fn clearing_the_final_wave_awards_skill_points() {
    let mut cfg = short_match();
    cfg.game.starting_gold = 500;
    cfg.game.victory_skill_points = 3;
    // A map-wide tower strong enough to one-shot everything.
    cfg.towers.special.damage = 10_000;
    cfg.towers.special.fire_rate_ms = 100.0;
    let mut game = DefenseGame::new(cfg, 9).unwrap();
    let mut events = Vec::new();
    game.update(
        FRAME_MS,
        &act(PlayerAction::PlaceTower {
            cell: Cell::new(0, 2),
            kind: TowerKind::Special,
        }),
        &mut events,
    );
    for _ in 0..40_000 {
        game.update(FRAME_MS, &[], &mut events);
        if game.outcome().is_some() {
            break;
        }
    }
    assert_eq!(game.outcome(), Some(TerminalOutcome::Victory));
    assert!(events
        .iter()
        .any(|e| matches!(e, GameEvent::Victory { skill_points: 3 })));
    // Health never dropped: the special tower cleared everything on spawn.
    assert!(events
        .iter()
        .all(|e| !matches!(e, GameEvent::EnemyLeaked { .. })));
}

#[test]
fn selling_a_tower_removes_its_shot_in_flight() {
    let mut cfg = short_match();
    // A crawling projectile so the shot is still airborne when we sell.
    cfg.towers.archer.projectile_speed = 0.01;
    let mut game = DefenseGame::new(cfg, 5).unwrap();
    let mut events = Vec::new();
    game.update(
        FRAME_MS,
        &act(PlayerAction::PlaceTower {
            cell: Cell::new(1, 1),
            kind: TowerKind::Archer,
        }),
        &mut events,
    );
    let tower_id = game
        .state()
        .towers
        .keys()
        .next()
        .expect("tower was not placed");

    for _ in 0..20_000 {
        game.update(FRAME_MS, &[], &mut events);
        if !game.state().projectiles.is_empty() {
            break;
        }
    }
    assert!(!game.state().projectiles.is_empty(), "tower never fired");

    let gold_before = game.state().gold;
    game.update(
        FRAME_MS,
        &act(PlayerAction::SellTower { id: tower_id }),
        &mut events,
    );
    assert!(game.state().towers.is_empty());
    assert!(game.state().projectiles.is_empty());
    assert!(game.state().gold > gold_before);
    // The freed cell accepts a new tower again.
    game.update(
        FRAME_MS,
        &act(PlayerAction::PlaceTower {
            cell: Cell::new(1, 1),
            kind: TowerKind::Archer,
        }),
        &mut events,
    );
    assert_eq!(game.state().towers.len(), 1);
}

#[test]
fn towers_hold_a_single_shot_in_flight() {
    let mut cfg = short_match();
    cfg.towers.archer.projectile_speed = 0.5;
    cfg.towers.archer.fire_rate_ms = 50.0;
    let mut game = DefenseGame::new(cfg, 11).unwrap();
    let mut events = Vec::new();
    game.update(
        FRAME_MS,
        &act(PlayerAction::PlaceTower {
            cell: Cell::new(1, 1),
            kind: TowerKind::Archer,
        }),
        &mut events,
    );
    for _ in 0..5_000 {
        game.update(FRAME_MS, &[], &mut events);
        assert!(
            game.state().projectiles.len() <= 1,
            "second shot fired while one was in flight"
        );
        if game.outcome().is_some() {
            break;
        }
    }
}

#[test]
fn rejected_actions_report_warnings_without_side_effects() {
    let mut cfg = short_match();
    cfg.game.starting_gold = 60;
    let path_cell = cfg.game.path[0];
    let mut game = DefenseGame::new(cfg, 1).unwrap();
    let mut events = Vec::new();

    // On the path.
    game.update(
        FRAME_MS,
        &act(PlayerAction::PlaceTower {
            cell: path_cell,
            kind: TowerKind::Archer,
        }),
        &mut events,
    );
    assert!(matches!(events[0], GameEvent::CellBlocked { .. }));
    assert_eq!(events[0].severity(), Severity::Warning);

    // Too expensive.
    events.clear();
    game.update(
        FRAME_MS,
        &act(PlayerAction::PlaceTower {
            cell: Cell::new(1, 1),
            kind: TowerKind::Cannon,
        }),
        &mut events,
    );
    assert!(matches!(
        events[0],
        GameEvent::InsufficientGold { cost: 100, have: 60 }
    ));

    // Unknown tower id.
    events.clear();
    let bogus = {
        let mut game2 = DefenseGame::new(short_match(), 2).unwrap();
        game2.update(
            FRAME_MS,
            &act(PlayerAction::PlaceTower {
                cell: Cell::new(1, 1),
                kind: TowerKind::Archer,
            }),
            &mut Vec::new(),
        );
        game2.state().towers.keys().next().unwrap()
    };
    game.update(
        FRAME_MS,
        &act(PlayerAction::UpgradeTower { id: bogus }),
        &mut events,
    );
    assert!(matches!(events[0], GameEvent::TowerNotFound));
    assert!(game.state().towers.is_empty());
    assert_eq!(game.state().gold, 60);
}

#[test]
fn upgrades_spend_gold_and_stop_at_max_level() {
    let mut cfg = short_match();
    cfg.game.starting_gold = 10_000;
    cfg.towers.archer.max_level = 3;
    let mut game = DefenseGame::new(cfg, 3).unwrap();
    let mut events = Vec::new();
    game.update(
        FRAME_MS,
        &act(PlayerAction::PlaceTower {
            cell: Cell::new(1, 1),
            kind: TowerKind::Archer,
        }),
        &mut events,
    );
    let id = game.state().towers.keys().next().unwrap();

    events.clear();
    game.update(FRAME_MS, &act(PlayerAction::UpgradeTower { id }), &mut events);
    game.update(FRAME_MS, &act(PlayerAction::UpgradeTower { id }), &mut events);
    assert_eq!(game.state().towers[id].level, 3);

    events.clear();
    game.update(FRAME_MS, &act(PlayerAction::UpgradeTower { id }), &mut events);
    assert!(matches!(events[0], GameEvent::MaxLevelReached { .. }));
    assert_eq!(game.state().towers[id].level, 3);
}
