use crate::world::{EnemyId, TowerId};

/// Safety valves shared by every variant: a projectile that outlives either cap
/// is removed even if its target still exists.
pub const MAX_LIFETIME_MS: f64 = 5000.0;
pub const MAX_TRAVEL_PX: f64 = 200.0;

/// Proximity at which a direct or chain shot connects.
pub const HIT_RADIUS_PX: f64 = 20.0;
/// Proximity at which an area shot detonates.
pub const AREA_HIT_RADIUS_PX: f64 = 25.0;

pub const AREA_SPEED_FACTOR: f64 = 0.8;
pub const CHAIN_SPEED_FACTOR: f64 = 1.2;

/// Rendering-only trail length for chain shots.
pub const TRAIL_CAP: usize = 8;

/// Damage factor for the n-th enemy hit by a chain shot.
pub fn chain_tier(hop: usize) -> f64 {
    match hop {
        0 => 1.0,
        1 => 0.7,
        _ => 0.5,
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SlowSpec {
    pub slow_pct: f64,
    pub duration_ms: f64,
}

#[derive(Clone, Debug)]
pub enum ProjectileKind {
    /// Homes on one enemy; magic shots carry a slow to apply on hit.
    Direct {
        target: EnemyId,
        slow: Option<SlowSpec>,
    },
    /// Homes at reduced speed, then detonates over everything in radius.
    Area {
        target: EnemyId,
        radius: f64,
        damage_mult: f64,
    },
    /// Ricochets through a precomputed target list with tiered damage.
    Chain {
        targets: Vec<EnemyId>,
        next: usize,
        /// Enemies actually struck so far. Drives the damage tier; targets
        /// skipped because they died in flight do not consume one.
        hits: usize,
        trail: Vec<(f64, f64)>,
    },
}

#[derive(Clone, Debug)]
pub struct Projectile {
    /// Which tower fired this shot; drives the one-in-flight limiter and
    /// sell-time cleanup.
    pub owner: TowerId,
    pub kind: ProjectileKind,
    pub x: f64,
    pub y: f64,
    pub origin: (f64, f64),
    pub damage: u32,
    /// Pixels per reference frame, variant speed factor already applied.
    pub speed: f64,
    pub age_ms: f64,
}

impl Projectile {
    pub fn new(
        owner: TowerId,
        kind: ProjectileKind,
        origin: (f64, f64),
        damage: u32,
        speed: f64,
    ) -> Self {
        Self {
            owner,
            kind,
            x: origin.0,
            y: origin.1,
            origin,
            damage,
            speed,
            age_ms: 0.0,
        }
    }

    pub fn traveled(&self) -> f64 {
        let dx = self.x - self.origin.0;
        let dy = self.y - self.origin.1;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn expired(&self) -> bool {
        self.age_ms >= MAX_LIFETIME_MS || self.traveled() >= MAX_TRAVEL_PX
    }

    /// Record the current position for rendering (chain shots only).
    pub fn push_trail(&mut self) {
        if let ProjectileKind::Chain { trail, .. } = &mut self.kind {
            trail.push((self.x, self.y));
            if trail.len() > TRAIL_CAP {
                trail.remove(0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn dummy_ids() -> (TowerId, EnemyId) {
        let mut towers: SlotMap<TowerId, ()> = SlotMap::with_key();
        let mut enemies: SlotMap<EnemyId, ()> = SlotMap::with_key();
        (towers.insert(()), enemies.insert(()))
    }

    #[test]
    fn chain_tiers_are_fixed() {
        let tiers: Vec<f64> = (0..5).map(chain_tier).collect();
        assert_eq!(tiers, vec![1.0, 0.7, 0.5, 0.5, 0.5]);
    }

    #[test]
    fn expires_on_lifetime() {
        let (tower, enemy) = dummy_ids();
        let mut p = Projectile::new(
            tower,
            ProjectileKind::Direct {
                target: enemy,
                slow: None,
            },
            (0.0, 0.0),
            10,
            6.0,
        );
        assert!(!p.expired());
        p.age_ms = MAX_LIFETIME_MS;
        assert!(p.expired());
    }

    #[test]
    fn expires_on_travel_distance() {
        let (tower, enemy) = dummy_ids();
        let mut p = Projectile::new(
            tower,
            ProjectileKind::Direct {
                target: enemy,
                slow: None,
            },
            (0.0, 0.0),
            10,
            6.0,
        );
        p.x = MAX_TRAVEL_PX + 1.0;
        assert!(p.expired());
    }

    #[test]
    fn trail_is_capped() {
        let (tower, enemy) = dummy_ids();
        let mut p = Projectile::new(
            tower,
            ProjectileKind::Chain {
                targets: vec![enemy],
                next: 0,
                hits: 0,
                trail: Vec::new(),
            },
            (0.0, 0.0),
            10,
            6.0,
        );
        for i in 0..20 {
            p.x = i as f64;
            p.push_trail();
        }
        match &p.kind {
            ProjectileKind::Chain { trail, .. } => {
                assert_eq!(trail.len(), TRAIL_CAP);
                assert_eq!(trail.last().unwrap().0, 19.0);
            }
            _ => unreachable!(),
        }
    }
}
