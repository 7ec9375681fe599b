use crate::config::TowerSpec;
use crate::path::Cell;
use crate::world::EnemyId;
use serde::{Deserialize, Serialize};

/// Fire rate can never upgrade below this, whatever the multiplier chain says.
pub const MIN_FIRE_RATE_MS: f64 = 15.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TowerKind {
    Archer,
    Cannon,
    Magic,
    Tesla,
    Special,
}

impl TowerKind {
    pub const ALL: [TowerKind; 5] = [
        TowerKind::Archer,
        TowerKind::Cannon,
        TowerKind::Magic,
        TowerKind::Tesla,
        TowerKind::Special,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TowerKind::Archer => "archer",
            TowerKind::Cannon => "cannon",
            TowerKind::Magic => "magic",
            TowerKind::Tesla => "tesla",
            TowerKind::Special => "special",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Tower {
    pub kind: TowerKind,
    pub cell: Cell,
    pub level: u32,
    /// Effective stats, recomputed from the spec whenever level or global
    /// bonuses change.
    pub damage: u32,
    pub range: f64,
    pub fire_rate_ms: f64,
    /// Counts up toward `fire_rate_ms` while a target is held.
    pub cooldown_ms: f64,
    /// Weak reference: revalidated every tick, never owns the enemy.
    pub target: Option<EnemyId>,
    /// Build cost plus all upgrade spend; basis for the sell refund.
    pub total_cost: u32,
}

impl Tower {
    pub fn place(kind: TowerKind, cell: Cell, spec: &TowerSpec, damage_bonus_pct: f64) -> Self {
        let mut tower = Self {
            kind,
            cell,
            level: 1,
            damage: 0,
            range: 0.0,
            fire_rate_ms: 0.0,
            cooldown_ms: 0.0,
            target: None,
            total_cost: spec.cost,
        };
        tower.recompute(spec, damage_bonus_pct);
        tower
    }

    /// Derive effective stats from base stats, level, and the global damage
    /// bonus. Damage and range climb, fire rate drops toward its floor.
    pub fn recompute(&mut self, spec: &TowerSpec, damage_bonus_pct: f64) {
        let steps = (self.level - 1) as i32;
        self.damage = (spec.damage as f64
            * spec.damage_multiplier.powi(steps)
            * (1.0 + damage_bonus_pct / 100.0))
            .floor() as u32;
        self.range = spec.range * spec.range_multiplier.powi(steps);
        self.fire_rate_ms = (spec.fire_rate_ms * spec.fire_rate_multiplier.powi(steps))
            .max(MIN_FIRE_RATE_MS);
    }

    /// Gold price of the next level.
    pub fn upgrade_cost(&self, spec: &TowerSpec) -> u32 {
        (spec.cost as f64 * spec.upgrade_pct / 100.0 * self.level as f64).floor() as u32
    }

    pub fn at_max_level(&self, spec: &TowerSpec) -> bool {
        self.level >= spec.max_level
    }

    /// Gold returned when this tower is sold.
    pub fn sell_refund(&self, sell_pct: f64) -> u32 {
        (self.total_cost as f64 * sell_pct / 100.0).floor() as u32
    }

    pub fn center(&self) -> (f64, f64) {
        self.cell.center()
    }
}
