use defense_core::frames;
use serde::{Deserialize, Serialize};

const FLOATER_LIFE_MS: f64 = 1000.0;
const FLOATER_RISE: f64 = -1.2;
const FLOATER_FRICTION: f64 = 0.92;

/// Color bucket for a damage number, picked by how hard the hit was.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTier {
    Normal,
    Strong,
    Critical,
}

impl ColorTier {
    pub fn for_damage(damage: i64) -> Self {
        if damage >= 60 {
            ColorTier::Critical
        } else if damage >= 20 {
            ColorTier::Strong
        } else {
            ColorTier::Normal
        }
    }
}

/// Floating damage text. Drifts upward with friction and expires on its own.
#[derive(Clone, Debug)]
pub struct Floater {
    pub x: f64,
    pub y: f64,
    pub value: i64,
    pub tier: ColorTier,
    pub vy: f64,
    pub life_ms: f64,
}

impl Floater {
    pub fn new(x: f64, y: f64, value: i64) -> Self {
        Self {
            x,
            y,
            value,
            tier: ColorTier::for_damage(value),
            vy: FLOATER_RISE,
            life_ms: FLOATER_LIFE_MS,
        }
    }

    /// Returns true once expired.
    pub fn update(&mut self, dt_ms: f64) -> bool {
        let f = frames(dt_ms);
        self.y += self.vy * f;
        self.vy *= FLOATER_FRICTION.powf(f);
        self.life_ms -= dt_ms;
        self.life_ms <= 0.0
    }
}
