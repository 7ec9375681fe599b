use crate::errors::PurchaseError;
use serde::{Deserialize, Serialize};

/// The purchasable branches of the meta-progression tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkillKind {
    /// Gold earned per kill.
    GoldRate,
    /// Flat percentage bonus to every tower's damage.
    Damage,
    /// Reduces the health lost per leaked enemy.
    Defense,
    /// Passive health regeneration during a match.
    Regeneration,
    /// Extra gold at match start.
    StartingGold,
}

pub const MAX_SKILL_LEVEL: u32 = 5;

/// Persisted skill-tree state. Points are earned by winning matches and spent
/// between matches; the derived bonuses feed into every new simulation.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillProfile {
    pub points: u32,
    pub gold_level: u32,
    pub damage_level: u32,
    pub defense_level: u32,
    pub regen_level: u32,
    pub start_gold_level: u32,
}

impl SkillProfile {
    pub fn level(&self, kind: SkillKind) -> u32 {
        match kind {
            SkillKind::GoldRate => self.gold_level,
            SkillKind::Damage => self.damage_level,
            SkillKind::Defense => self.defense_level,
            SkillKind::Regeneration => self.regen_level,
            SkillKind::StartingGold => self.start_gold_level,
        }
    }

    /// Cost in points of raising `kind` from its current level.
    pub fn upgrade_cost(&self, kind: SkillKind) -> u32 {
        self.level(kind) + 1
    }

    pub fn try_purchase(&mut self, kind: SkillKind) -> Result<(), PurchaseError> {
        let level = self.level(kind);
        if level >= MAX_SKILL_LEVEL {
            return Err(PurchaseError::MaxLevel);
        }
        let cost = self.upgrade_cost(kind);
        if self.points < cost {
            return Err(PurchaseError::NotEnoughPoints {
                cost,
                have: self.points,
            });
        }
        self.points -= cost;
        let slot = match kind {
            SkillKind::GoldRate => &mut self.gold_level,
            SkillKind::Damage => &mut self.damage_level,
            SkillKind::Defense => &mut self.defense_level,
            SkillKind::Regeneration => &mut self.regen_level,
            SkillKind::StartingGold => &mut self.start_gold_level,
        };
        *slot += 1;
        Ok(())
    }

    /// Multiplier applied to gold credited per kill.
    pub fn gold_multiplier(&self) -> f64 {
        1.0 + 0.1 * self.gold_level as f64
    }

    /// Percentage added to every tower's damage.
    pub fn damage_bonus_pct(&self) -> f64 {
        5.0 * self.damage_level as f64
    }

    /// Fraction (in percent) shaved off leak damage. Capped so a leak always
    /// costs at least one health.
    pub fn defense_pct(&self) -> f64 {
        (10.0 * self.defense_level as f64).min(75.0)
    }

    pub fn heal_amount(&self) -> u32 {
        self.regen_level
    }

    pub fn heal_interval_ms(&self) -> f64 {
        5000.0
    }

    pub fn start_gold_bonus(&self) -> u32 {
        25 * self.start_gold_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purchase_spends_points_and_raises_level() {
        let mut profile = SkillProfile {
            points: 3,
            ..SkillProfile::default()
        };
        profile.try_purchase(SkillKind::Damage).unwrap();
        assert_eq!(profile.damage_level, 1);
        assert_eq!(profile.points, 2);
        assert_eq!(profile.upgrade_cost(SkillKind::Damage), 2);
    }

    #[test]
    fn purchase_rejected_without_points() {
        let mut profile = SkillProfile::default();
        assert_eq!(
            profile.try_purchase(SkillKind::GoldRate).unwrap_err(),
            PurchaseError::NotEnoughPoints { cost: 1, have: 0 }
        );
        assert_eq!(profile.gold_level, 0);
    }

    #[test]
    fn purchase_rejected_at_max_level() {
        let mut profile = SkillProfile {
            points: 100,
            defense_level: MAX_SKILL_LEVEL,
            ..SkillProfile::default()
        };
        assert_eq!(
            profile.try_purchase(SkillKind::Defense).unwrap_err(),
            PurchaseError::MaxLevel
        );
    }

    #[test]
    fn derived_bonuses_scale_with_level() {
        let profile = SkillProfile {
            gold_level: 2,
            damage_level: 3,
            defense_level: 1,
            ..SkillProfile::default()
        };
        assert!((profile.gold_multiplier() - 1.2).abs() < 1e-9);
        assert!((profile.damage_bonus_pct() - 15.0).abs() < 1e-9);
        assert!((profile.defense_pct() - 10.0).abs() < 1e-9);
    }
}
