use crate::enemy::EnemyKind;
use crate::path::Cell;
use crate::skills::SkillProfile;
use crate::tower::TowerKind;
use serde::{Deserialize, Serialize};

/// Match-level parameters: economy, wave pacing, grid shape and the drawn path.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub grid_width: u16,
    pub grid_height: u16,
    pub starting_health: u32,
    pub starting_gold: u32,
    /// Countdown between waves, in milliseconds.
    pub wave_delay_ms: f64,
    /// Gap between two spawns while a wave trickles in.
    pub spawn_interval_ms: f64,
    pub base_enemies: u32,
    pub enemies_increase: u32,
    pub max_waves: u32,
    pub points_per_kill: u32,
    /// Score awarded for clearing a wave.
    pub wave_bonus: u32,
    /// Percentage of a tower's total cost refunded on sale.
    pub sell_pct: f64,
    /// Health lost when one enemy reaches the end of the path.
    pub leak_damage: u32,
    /// Meta-currency granted on victory.
    pub victory_skill_points: u32,
    pub path: Vec<Cell>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 20,
            grid_height: 15,
            starting_health: 100,
            starting_gold: 200,
            wave_delay_ms: 10_000.0,
            spawn_interval_ms: 800.0,
            base_enemies: 5,
            enemies_increase: 2,
            max_waves: 20,
            points_per_kill: 10,
            wave_bonus: 100,
            sell_pct: 70.0,
            leak_damage: 1,
            victory_skill_points: 3,
            path: default_path(),
        }
    }
}

/// S-shaped walk across the default 20x15 grid.
fn default_path() -> Vec<Cell> {
    let mut cells = Vec::new();
    for x in 0..=14u16 {
        cells.push(Cell::new(x, 3));
    }
    for y in 4..=10u16 {
        cells.push(Cell::new(14, y));
    }
    for x in (5..=13u16).rev() {
        cells.push(Cell::new(x, 10));
    }
    for y in 11..=14u16 {
        cells.push(Cell::new(5, y));
    }
    cells
}

/// Per-enemy-kind tuning, applied on top of the shared base stats.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTypeConfig {
    pub health_mult: f64,
    pub speed_mult: f64,
    pub reward_mult: f64,
    pub score_mult: f64,
    /// Spawn weight in percent. Weights are normalized over their actual sum,
    /// so totals other than 100 shift all buckets proportionally.
    pub spawn_pct: f64,
}

impl Default for EnemyTypeConfig {
    fn default() -> Self {
        Self {
            health_mult: 1.0,
            speed_mult: 1.0,
            reward_mult: 1.0,
            score_mult: 1.0,
            spawn_pct: 0.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub base_health: u32,
    /// Pixels per reference frame.
    pub base_speed: f64,
    pub base_reward: u32,
    /// Exponential per-wave health multiplier.
    pub health_multiplier: f64,
    /// Exponential per-wave speed multiplier.
    pub speed_multiplier: f64,
    /// Additive health per wave past the first.
    pub health_increase: f64,
    pub normal: EnemyTypeConfig,
    pub fast: EnemyTypeConfig,
    pub tank: EnemyTypeConfig,
    pub elite: EnemyTypeConfig,
}

impl EnemyConfig {
    pub fn kind(&self, kind: EnemyKind) -> &EnemyTypeConfig {
        match kind {
            EnemyKind::Normal => &self.normal,
            EnemyKind::Fast => &self.fast,
            EnemyKind::Tank => &self.tank,
            EnemyKind::Elite => &self.elite,
        }
    }
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            base_health: 50,
            base_speed: 1.0,
            base_reward: 10,
            health_multiplier: 1.25,
            speed_multiplier: 1.05,
            health_increase: 15.0,
            normal: EnemyTypeConfig {
                spawn_pct: 50.0,
                ..EnemyTypeConfig::default()
            },
            fast: EnemyTypeConfig {
                health_mult: 0.7,
                speed_mult: 1.8,
                reward_mult: 1.2,
                score_mult: 1.2,
                spawn_pct: 25.0,
            },
            tank: EnemyTypeConfig {
                health_mult: 2.5,
                speed_mult: 0.6,
                reward_mult: 1.5,
                score_mult: 1.5,
                spawn_pct: 15.0,
            },
            elite: EnemyTypeConfig {
                health_mult: 4.0,
                speed_mult: 0.9,
                reward_mult: 2.5,
                score_mult: 2.0,
                spawn_pct: 10.0,
            },
        }
    }
}

/// Stats for one tower archetype. Kind-specific fields are zero for kinds that
/// do not use them.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TowerSpec {
    pub cost: u32,
    pub damage: u32,
    /// Pixels.
    pub range: f64,
    pub fire_rate_ms: f64,
    /// Pixels per reference frame, before the per-variant speed factor.
    pub projectile_speed: f64,
    pub max_level: u32,
    /// Upgrade cost percentage of base cost, scaled by current level.
    pub upgrade_pct: f64,
    pub damage_multiplier: f64,
    pub range_multiplier: f64,
    /// Below 1: fire rate shortens per level (floored at the global minimum).
    pub fire_rate_multiplier: f64,
    /// Cannon: blast radius in pixels.
    pub area_radius: f64,
    /// Cannon: damage factor applied to everything inside the blast.
    pub area_damage_mult: f64,
    /// Magic: struck enemy's speed becomes this percentage of its original.
    pub slow_pct: f64,
    /// Magic: slow duration in milliseconds.
    pub slow_duration_ms: f64,
    /// Tesla: maximum enemies hit by one shot.
    pub chain_max: u32,
    /// Tesla: hop search radius as a fraction of tower range.
    pub chain_radius_factor: f64,
}

impl Default for TowerSpec {
    fn default() -> Self {
        Self {
            cost: 50,
            damage: 10,
            range: 120.0,
            fire_rate_ms: 1000.0,
            projectile_speed: 6.0,
            max_level: 5,
            upgrade_pct: 50.0,
            damage_multiplier: 1.3,
            range_multiplier: 1.1,
            fire_rate_multiplier: 0.9,
            area_radius: 0.0,
            area_damage_mult: 0.0,
            slow_pct: 0.0,
            slow_duration_ms: 0.0,
            chain_max: 0,
            chain_radius_factor: 0.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TowersConfig {
    pub archer: TowerSpec,
    pub cannon: TowerSpec,
    pub magic: TowerSpec,
    pub tesla: TowerSpec,
    pub special: TowerSpec,
}

impl TowersConfig {
    pub fn spec(&self, kind: TowerKind) -> &TowerSpec {
        match kind {
            TowerKind::Archer => &self.archer,
            TowerKind::Cannon => &self.cannon,
            TowerKind::Magic => &self.magic,
            TowerKind::Tesla => &self.tesla,
            TowerKind::Special => &self.special,
        }
    }
}

impl Default for TowersConfig {
    fn default() -> Self {
        Self {
            archer: TowerSpec {
                cost: 50,
                damage: 12,
                range: 120.0,
                fire_rate_ms: 800.0,
                projectile_speed: 6.0,
                ..TowerSpec::default()
            },
            cannon: TowerSpec {
                cost: 100,
                damage: 25,
                range: 140.0,
                fire_rate_ms: 1500.0,
                projectile_speed: 5.0,
                area_radius: 60.0,
                area_damage_mult: 0.8,
                ..TowerSpec::default()
            },
            magic: TowerSpec {
                cost: 120,
                damage: 15,
                range: 130.0,
                fire_rate_ms: 1000.0,
                projectile_speed: 5.5,
                slow_pct: 50.0,
                slow_duration_ms: 2000.0,
                ..TowerSpec::default()
            },
            tesla: TowerSpec {
                cost: 150,
                damage: 20,
                range: 110.0,
                fire_rate_ms: 1200.0,
                projectile_speed: 6.0,
                chain_max: 4,
                chain_radius_factor: 0.8,
                ..TowerSpec::default()
            },
            special: TowerSpec {
                cost: 300,
                damage: 8,
                range: 9999.0,
                fire_rate_ms: 2000.0,
                projectile_speed: 0.0,
                ..TowerSpec::default()
            },
        }
    }
}

/// Everything one match needs, assembled by the config repository.
#[derive(Clone, Debug, Default)]
pub struct MatchConfig {
    pub game: GameConfig,
    pub towers: TowersConfig,
    pub enemies: EnemyConfig,
    pub skills: SkillProfile,
}
