use clap::Parser;
use defense_core::{ActionEnvelope, Frame, TerminalOutcome, FRAME_MS};
use defense_host::MatchHost;
use defense_sim::store::KeyValueStore;
use defense_sim::{
    Cell, ConfigRepository, DefenseGame, FileStore, GameEvent, MatchConfig, MemoryStore,
    PlayerAction, TowerKind,
};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "headless-runner")]
#[command(about = "Runs a full tower-defense match without a UI")]
struct Args {
    /// RNG seed for the match
    #[arg(long, default_value = "12345")]
    seed: u64,

    /// Frame budget before the run is cut off (36000 = 10 minutes at 60Hz)
    #[arg(long, default_value = "36000")]
    max_frames: Frame,

    /// Simulated milliseconds per frame
    #[arg(long, default_value_t = FRAME_MS)]
    frame_ms: f64,

    /// Config blob to load overrides from and persist skill points to
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    match &args.config {
        Some(path) => run(ConfigRepository::new(FileStore::open(path)), &args),
        None => run(ConfigRepository::new(MemoryStore::new()), &args),
    }
}

/// Buildable cells hugging the path, in walk order, so early towers sit where
/// enemies pass first.
fn build_spots(cfg: &MatchConfig) -> Vec<Cell> {
    let on_path: HashSet<Cell> = cfg.game.path.iter().copied().collect();
    let mut seen = HashSet::new();
    let mut spots = Vec::new();
    for cell in &cfg.game.path {
        for (dx, dy) in [(0i32, 1i32), (0, -1), (1, 0), (-1, 0)] {
            let x = cell.x as i32 + dx;
            let y = cell.y as i32 + dy;
            if x < 0 || y < 0 || x >= cfg.game.grid_width as i32 || y >= cfg.game.grid_height as i32
            {
                continue;
            }
            let spot = Cell::new(x as u16, y as u16);
            if !on_path.contains(&spot) && seen.insert(spot) {
                spots.push(spot);
            }
        }
    }
    spots
}

fn run<S: KeyValueStore>(mut repo: ConfigRepository<S>, args: &Args) {
    let cfg = repo.load_match_config();
    let spots = build_spots(&cfg);

    let mut host = match MatchHost::<DefenseGame>::new(cfg, args.seed, args.frame_ms) {
        Ok(host) => host,
        Err(e) => {
            eprintln!("cannot start match: {e}");
            std::process::exit(1);
        }
    };
    let player = host.join_player();

    // Scripted build-out: one tower every two seconds, cycling through the
    // roster. Unaffordable placements just come back as warning events.
    let kinds = [
        TowerKind::Archer,
        TowerKind::Archer,
        TowerKind::Cannon,
        TowerKind::Magic,
        TowerKind::Tesla,
    ];
    let frames_per_build = (2000.0 / args.frame_ms).max(1.0) as Frame;
    for (i, spot) in spots.iter().take(24).enumerate() {
        host.submit(ActionEnvelope {
            player_id: player,
            action_id: i as u64,
            intended_frame: 1 + i as Frame * frames_per_build,
            payload: PlayerAction::PlaceTower {
                cell: *spot,
                kind: kinds[i % kinds.len()],
            },
        });
    }
    // Skip the opening delay.
    host.submit(ActionEnvelope {
        player_id: player,
        action_id: u64::MAX,
        intended_frame: 1,
        payload: PlayerAction::StartWave,
    });

    let mut all_events = Vec::new();
    for _ in 0..args.max_frames {
        let Some(events) = host.step_one_frame() else {
            break;
        };
        for event in &events {
            print_event(host.current_frame(), event);
        }
        all_events.extend(events);
    }

    let snapshot = host.snapshot();
    println!("\n=== Match Complete ===");
    println!("Outcome: {:?}", host.outcome());
    println!("Final frame: {}", host.current_frame());
    println!("Wave: {}", snapshot.wave);
    println!("Health: {}", snapshot.health);
    println!("Gold: {}", snapshot.gold);
    println!("Score: {}", snapshot.score);
    print_summary(&all_events);

    if host.outcome() == Some(TerminalOutcome::Victory) {
        let earned: u32 = all_events
            .iter()
            .filter_map(|e| match e {
                GameEvent::Victory { skill_points } => Some(*skill_points),
                _ => None,
            })
            .sum();
        let mut profile = repo.load_skills();
        profile.points += earned;
        repo.save_skills(&profile);
        println!("Banked {} skill points ({} total)", earned, profile.points);
    }
}

fn print_event(frame: Frame, event: &GameEvent) {
    match event {
        GameEvent::WaveStarted { wave, enemy_count } => {
            println!("[{:>6}] === Wave {} started ({} enemies) ===", frame, wave, enemy_count)
        }
        GameEvent::WaveCompleted { wave, bonus } => {
            println!("[{:>6}] === Wave {} completed (+{} score) ===", frame, wave, bonus)
        }
        GameEvent::EnemySpawned { kind, .. } => {
            println!("[{:>6}] {} enemy entered", frame, kind.label())
        }
        GameEvent::EnemyKilled { kind, gold, .. } => {
            println!("[{:>6}] {} enemy killed (+{} gold)", frame, kind.label(), gold)
        }
        GameEvent::EnemyLeaked { damage, .. } => {
            println!("[{:>6}] Enemy LEAKED (-{} health)", frame, damage)
        }
        GameEvent::TowerPlaced { kind, cell, .. } => {
            println!("[{:>6}] {} tower placed at ({}, {})", frame, kind.label(), cell.x, cell.y)
        }
        GameEvent::TowerUpgraded { level, cost, .. } => {
            println!("[{:>6}] Tower upgraded to level {} (-{} gold)", frame, level, cost)
        }
        GameEvent::TowerSold { refund, .. } => {
            println!("[{:>6}] Tower sold (+{} gold)", frame, refund)
        }
        GameEvent::InsufficientGold { cost, have } => {
            println!("[{:>6}] Insufficient gold: need {}, have {}", frame, cost, have)
        }
        GameEvent::MaxLevelReached { .. } => {
            println!("[{:>6}] Tower already at max level", frame)
        }
        GameEvent::CellBlocked { cell } => {
            println!("[{:>6}] Cell ({}, {}) is blocked", frame, cell.x, cell.y)
        }
        GameEvent::TowerNotFound => println!("[{:>6}] No such tower", frame),
        GameEvent::Victory { skill_points } => {
            println!("[{:>6}] === VICTORY (+{} skill points) ===", frame, skill_points)
        }
        GameEvent::Defeat { wave } => {
            println!("[{:>6}] === DEFEAT on wave {} ===", frame, wave)
        }
    }
}

fn print_summary(events: &[GameEvent]) {
    let mut spawned = 0;
    let mut killed = 0;
    let mut leaked = 0;
    let mut waves_started = 0;
    let mut waves_completed = 0;
    let mut towers_placed = 0;
    let mut rejections = 0;

    for event in events {
        match event {
            GameEvent::EnemySpawned { .. } => spawned += 1,
            GameEvent::EnemyKilled { .. } => killed += 1,
            GameEvent::EnemyLeaked { .. } => leaked += 1,
            GameEvent::WaveStarted { .. } => waves_started += 1,
            GameEvent::WaveCompleted { .. } => waves_completed += 1,
            GameEvent::TowerPlaced { .. } => towers_placed += 1,
            GameEvent::InsufficientGold { .. }
            | GameEvent::MaxLevelReached { .. }
            | GameEvent::CellBlocked { .. }
            | GameEvent::TowerNotFound => rejections += 1,
            _ => {}
        }
    }

    println!("\n=== Event Summary ===");
    println!("Waves started: {}", waves_started);
    println!("Waves completed: {}", waves_completed);
    println!("Enemies spawned: {}", spawned);
    println!("Enemies killed: {}", killed);
    println!("Enemies leaked: {}", leaked);
    println!("Towers placed: {}", towers_placed);
    println!("Rejected actions: {}", rejections);
}
