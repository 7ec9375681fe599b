use crate::enemy::EnemyKind;
use crate::path::Cell;
use crate::tower::TowerKind;
use crate::world::{EnemyId, TowerId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
}

/// Everything the simulation reports outward. Doubles as the notification
/// sink: the host turns these into UI messages, logs, or nothing.
#[derive(Clone, Debug)]
pub enum GameEvent {
    WaveStarted {
        wave: u32,
        enemy_count: u32,
    },
    WaveCompleted {
        wave: u32,
        bonus: u32,
    },
    EnemySpawned {
        id: EnemyId,
        kind: EnemyKind,
    },
    EnemyKilled {
        id: EnemyId,
        kind: EnemyKind,
        gold: u32,
        score: u32,
    },
    EnemyLeaked {
        id: EnemyId,
        damage: u32,
    },
    TowerPlaced {
        id: TowerId,
        kind: TowerKind,
        cell: Cell,
    },
    TowerUpgraded {
        id: TowerId,
        level: u32,
        cost: u32,
    },
    TowerSold {
        id: TowerId,
        refund: u32,
    },
    /// Rejections: the action had no effect.
    InsufficientGold {
        cost: u32,
        have: u32,
    },
    MaxLevelReached {
        id: TowerId,
    },
    CellBlocked {
        cell: Cell,
    },
    TowerNotFound,
    Victory {
        skill_points: u32,
    },
    Defeat {
        wave: u32,
    },
}

impl GameEvent {
    pub fn severity(&self) -> Severity {
        match self {
            GameEvent::InsufficientGold { .. }
            | GameEvent::MaxLevelReached { .. }
            | GameEvent::CellBlocked { .. }
            | GameEvent::TowerNotFound
            | GameEvent::EnemyLeaked { .. }
            | GameEvent::Defeat { .. } => Severity::Warning,
            _ => Severity::Info,
        }
    }
}
