use crate::config::MatchConfig;
use crate::effects::Floater;
use crate::enemy::Enemy;
use crate::path::{Cell, Path};
use crate::projectile::Projectile;
use crate::tower::Tower;
use defense_core::TerminalOutcome;
use slotmap::{new_key_type, SlotMap};

new_key_type! { pub struct EnemyId; }
new_key_type! { pub struct TowerId; }
new_key_type! { pub struct ProjectileId; }
new_key_type! { pub struct FloaterId; }

#[derive(Clone, Copy, Debug, Default)]
pub enum CellState {
    #[default]
    Empty,
    /// Part of the enemy walk; towers cannot stand here.
    Path,
    Tower(TowerId),
}

impl CellState {
    pub fn is_blocked(self) -> bool {
        !matches!(self, CellState::Empty)
    }
}

/// Placement grid. Tracks which cell holds what, nothing else.
#[derive(Clone, Debug)]
pub struct Grid {
    pub width: u16,
    pub height: u16,
    cells: Vec<CellState>,
}

impl Grid {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![CellState::Empty; (width as usize) * (height as usize)],
        }
    }

    #[inline]
    fn idx(&self, cell: Cell) -> usize {
        (cell.y as usize) * (self.width as usize) + (cell.x as usize)
    }

    #[inline]
    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    #[inline]
    pub fn get(&self, cell: Cell) -> CellState {
        self.cells[self.idx(cell)]
    }

    #[inline]
    pub fn set(&mut self, cell: Cell, state: CellState) {
        let idx = self.idx(cell);
        self.cells[idx] = state;
    }
}

/// Match phase as presented to the UI; derived from the flags below.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    WaveDelay,
    WaveInProgress,
    Victory,
    Defeat,
}

/// Trickle-spawn bookkeeping for the wave currently entering the map.
#[derive(Clone, Debug)]
pub struct WaveSpawner {
    pub remaining: u32,
    pub interval_ms: f64,
    pub accum_ms: f64,
}

/// The entire mutable match state. Exclusively owned by the orchestrator;
/// entity systems mutate it only through the update pipeline.
#[derive(Clone, Debug)]
pub struct GameState {
    pub health: u32,
    pub gold: u32,
    pub wave: u32,
    pub score: u32,
    pub game_time_ms: f64,
    /// Counts down to the next wave while no wave is in progress.
    pub next_wave_timer_ms: f64,
    pub paused: bool,
    pub outcome: Option<TerminalOutcome>,
    pub wave_in_progress: bool,
    pub all_spawned: bool,
    pub spawner: Option<WaveSpawner>,
    pub heal_accum_ms: f64,
    pub path: Path,
    pub grid: Grid,
    pub enemies: SlotMap<EnemyId, Enemy>,
    pub towers: SlotMap<TowerId, Tower>,
    pub projectiles: SlotMap<ProjectileId, Projectile>,
    pub floaters: SlotMap<FloaterId, Floater>,
}

impl GameState {
    pub fn new(cfg: &MatchConfig, path: Path) -> Self {
        let mut grid = Grid::new(cfg.game.grid_width, cfg.game.grid_height);
        for &cell in path.cells() {
            grid.set(cell, CellState::Path);
        }
        Self {
            health: cfg.game.starting_health,
            gold: cfg.game.starting_gold + cfg.skills.start_gold_bonus(),
            wave: 0,
            score: 0,
            game_time_ms: 0.0,
            next_wave_timer_ms: cfg.game.wave_delay_ms,
            paused: false,
            outcome: None,
            wave_in_progress: false,
            all_spawned: false,
            spawner: None,
            heal_accum_ms: 0.0,
            path,
            grid,
            enemies: SlotMap::with_key(),
            towers: SlotMap::with_key(),
            projectiles: SlotMap::with_key(),
            floaters: SlotMap::with_key(),
        }
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn phase(&self) -> Phase {
        match self.outcome {
            Some(TerminalOutcome::Victory) => Phase::Victory,
            Some(TerminalOutcome::Defeat) => Phase::Defeat,
            None if self.wave_in_progress => Phase::WaveInProgress,
            None if self.wave == 0 && self.game_time_ms == 0.0 => Phase::NotStarted,
            None => Phase::WaveDelay,
        }
    }

    /// True when a tower currently has a shot in the air.
    pub fn has_live_projectile(&self, tower: TowerId) -> bool {
        self.projectiles.values().any(|p| p.owner == tower)
    }
}
