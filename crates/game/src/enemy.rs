use crate::config::EnemyConfig;
use crate::path::Path;
use defense_core::frames;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    Normal,
    Fast,
    Tank,
    Elite,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 4] = [
        EnemyKind::Normal,
        EnemyKind::Fast,
        EnemyKind::Tank,
        EnemyKind::Elite,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EnemyKind::Normal => "normal",
            EnemyKind::Fast => "fast",
            EnemyKind::Tank => "tank",
            EnemyKind::Elite => "elite",
        }
    }
}

/// Pick a kind by weighted draw over the configured spawn percentages,
/// normalized over their actual sum.
pub fn roll_kind<R: Rng + ?Sized>(rng: &mut R, cfg: &EnemyConfig) -> EnemyKind {
    let total: f64 = EnemyKind::ALL
        .iter()
        .map(|&k| cfg.kind(k).spawn_pct.max(0.0))
        .sum();
    if total <= 0.0 {
        return EnemyKind::Normal;
    }
    let mut roll = rng.gen::<f64>() * total;
    for &kind in &EnemyKind::ALL {
        let weight = cfg.kind(kind).spawn_pct.max(0.0);
        if roll < weight {
            return kind;
        }
        roll -= weight;
    }
    // Float rounding can leave a sliver past the last bucket.
    EnemyKind::Elite
}

/// Health after type and wave scaling. Exponential per-wave growth is the
/// intended difficulty ramp.
pub fn scaled_health(cfg: &EnemyConfig, kind: EnemyKind, wave: u32) -> i64 {
    let waves_past = wave.saturating_sub(1) as f64;
    let scaled = cfg.base_health as f64
        * cfg.kind(kind).health_mult
        * cfg.health_multiplier.powf(waves_past)
        + waves_past * cfg.health_increase;
    scaled.floor() as i64
}

pub fn scaled_speed(cfg: &EnemyConfig, kind: EnemyKind, wave: u32) -> f64 {
    let waves_past = wave.saturating_sub(1) as f64;
    cfg.base_speed * cfg.kind(kind).speed_mult * cfg.speed_multiplier.powf(waves_past)
}

pub fn scaled_reward(cfg: &EnemyConfig, kind: EnemyKind) -> u32 {
    (cfg.base_reward as f64 * cfg.kind(kind).reward_mult).floor() as u32
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub x: f64,
    pub y: f64,
    /// Index of the next waypoint to reach.
    pub path_index: usize,
    /// Pixels per reference frame, including any active slow.
    pub speed: f64,
    /// Speed to restore once the slow expires.
    pub original_speed: f64,
    /// Absolute game time at which the slow ends.
    pub slow_until_ms: Option<f64>,
    pub health: i64,
    pub max_health: i64,
    pub reward: u32,
    pub score_mult: f64,
}

impl Enemy {
    pub fn spawn(kind: EnemyKind, wave: u32, cfg: &EnemyConfig, path: &Path) -> Self {
        let (x, y) = path.waypoint(0);
        let health = scaled_health(cfg, kind, wave);
        let speed = scaled_speed(cfg, kind, wave);
        Self {
            kind,
            x,
            y,
            path_index: 1,
            speed,
            original_speed: speed,
            slow_until_ms: None,
            health,
            max_health: health,
            reward: scaled_reward(cfg, kind),
            score_mult: cfg.kind(kind).score_mult,
        }
    }

    /// Expire a finished slow, restoring the backed-up speed.
    pub fn tick_status(&mut self, now_ms: f64) {
        if let Some(until) = self.slow_until_ms {
            if now_ms >= until {
                self.speed = self.original_speed;
                self.slow_until_ms = None;
            }
        }
    }

    /// Apply a slow debuff. Hitting an already-slowed enemy extends the
    /// existing expiry instead of restarting it.
    pub fn apply_slow(&mut self, slow_pct: f64, duration_ms: f64, now_ms: f64) {
        match self.slow_until_ms {
            Some(until) if now_ms < until => {
                self.slow_until_ms = Some(until + duration_ms);
            }
            _ => {
                self.original_speed = self.speed;
                self.speed = self.original_speed * slow_pct / 100.0;
                self.slow_until_ms = Some(now_ms + duration_ms);
            }
        }
    }

    /// Walk along the path for one update. Snaps onto each waypoint instead of
    /// overshooting it. Returns true once the final waypoint is reached.
    pub fn advance(&mut self, dt_ms: f64, path: &Path) -> bool {
        let mut remaining = self.speed * frames(dt_ms);
        while remaining > 0.0 {
            if self.path_index >= path.len() {
                return true;
            }
            let (tx, ty) = path.waypoint(self.path_index);
            let dx = tx - self.x;
            let dy = ty - self.y;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist <= remaining {
                self.x = tx;
                self.y = ty;
                remaining -= dist;
                self.path_index += 1;
                if self.path_index >= path.len() {
                    return true;
                }
            } else {
                self.x += dx / dist * remaining;
                self.y += dy / dist * remaining;
                remaining = 0.0;
            }
        }
        false
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Cell;
    use defense_core::FRAME_MS;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_path() -> Path {
        let cells = (0..5).map(|x| Cell::new(x, 0)).collect();
        Path::new(cells, 10, 10).unwrap()
    }

    #[test]
    fn wave_three_normal_health_matches_formula() {
        // floor(50 * 1 * 1.25^2 + 2 * 15) = floor(78.125 + 30) = 108
        let cfg = EnemyConfig {
            base_health: 50,
            health_increase: 15.0,
            health_multiplier: 1.25,
            ..EnemyConfig::default()
        };
        assert_eq!(scaled_health(&cfg, EnemyKind::Normal, 3), 108);
    }

    #[test]
    fn wave_one_has_no_scaling() {
        let cfg = EnemyConfig::default();
        assert_eq!(
            scaled_health(&cfg, EnemyKind::Normal, 1),
            cfg.base_health as i64
        );
    }

    #[test]
    fn advance_snaps_to_waypoints() {
        let cfg = EnemyConfig::default();
        let path = test_path();
        let mut enemy = Enemy::spawn(EnemyKind::Normal, 1, &cfg, &path);
        // 1.5 cells worth of movement in one update.
        enemy.speed = 60.0;
        let reached = enemy.advance(FRAME_MS, &path);
        assert!(!reached);
        assert_eq!(enemy.path_index, 2);
        assert!((enemy.x - 80.0).abs() < 1e-6);
        assert!((enemy.y - 20.0).abs() < 1e-6);
    }

    #[test]
    fn advance_reports_path_end() {
        let cfg = EnemyConfig::default();
        let path = test_path();
        let mut enemy = Enemy::spawn(EnemyKind::Normal, 1, &cfg, &path);
        enemy.speed = 1000.0;
        assert!(enemy.advance(FRAME_MS, &path));
    }

    #[test]
    fn slow_reapplication_extends_expiry() {
        let cfg = EnemyConfig::default();
        let path = test_path();
        let mut enemy = Enemy::spawn(EnemyKind::Fast, 1, &cfg, &path);
        let base_speed = enemy.speed;
        enemy.apply_slow(50.0, 2000.0, 0.0);
        assert!((enemy.speed - base_speed * 0.5).abs() < 1e-9);
        assert_eq!(enemy.slow_until_ms, Some(2000.0));
        // Second hit while still slowed: end time extends, speed unchanged.
        enemy.apply_slow(50.0, 2000.0, 500.0);
        assert_eq!(enemy.slow_until_ms, Some(4000.0));
        assert!((enemy.speed - base_speed * 0.5).abs() < 1e-9);
        // Expiry restores the original speed.
        enemy.tick_status(4000.0);
        assert!((enemy.speed - base_speed).abs() < 1e-9);
        assert_eq!(enemy.slow_until_ms, None);
    }

    #[test]
    fn kind_draw_tracks_normalized_weights() {
        let mut cfg = EnemyConfig::default();
        // Deliberately not summing to 100: 30 + 30 = 60 total.
        cfg.normal.spawn_pct = 30.0;
        cfg.fast.spawn_pct = 30.0;
        cfg.tank.spawn_pct = 0.0;
        cfg.elite.spawn_pct = 0.0;

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let draws = 20_000;
        let mut normal = 0u32;
        for _ in 0..draws {
            match roll_kind(&mut rng, &cfg) {
                EnemyKind::Normal => normal += 1,
                EnemyKind::Fast => {}
                other => panic!("zero-weight kind drawn: {:?}", other),
            }
        }
        let share = normal as f64 / draws as f64;
        assert!((share - 0.5).abs() < 0.02, "normal share was {}", share);
    }

    #[test]
    fn zero_weights_fall_back_to_normal() {
        let mut cfg = EnemyConfig::default();
        cfg.normal.spawn_pct = 0.0;
        cfg.fast.spawn_pct = 0.0;
        cfg.tank.spawn_pct = 0.0;
        cfg.elite.spawn_pct = 0.0;
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(roll_kind(&mut rng, &cfg), EnemyKind::Normal);
    }
}
