//! Read-only views of the match state, shaped for display layers and logs.
//!
//! Slotmap keys are flattened to their raw `u64` form so snapshots can be
//! serialized without leaking slotmap internals to consumers.

use crate::effects::ColorTier;
use crate::enemy::EnemyKind;
use crate::path::Cell;
use crate::projectile::ProjectileKind;
use crate::tower::TowerKind;
use crate::world::{GameState, Phase};
use serde::Serialize;
use slotmap::Key;

fn raw_id(key: impl Key) -> u64 {
    key.data().as_ffi()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseView {
    NotStarted,
    WaveDelay,
    WaveInProgress,
    Victory,
    Defeat,
}

impl From<Phase> for PhaseView {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::NotStarted => PhaseView::NotStarted,
            Phase::WaveDelay => PhaseView::WaveDelay,
            Phase::WaveInProgress => PhaseView::WaveInProgress,
            Phase::Victory => PhaseView::Victory,
            Phase::Defeat => PhaseView::Defeat,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct EnemyView {
    pub id: u64,
    pub kind: EnemyKind,
    pub x: f64,
    pub y: f64,
    pub health: i64,
    pub max_health: i64,
    pub slowed: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct TowerView {
    pub id: u64,
    pub kind: TowerKind,
    pub cell: Cell,
    pub level: u32,
    pub damage: u32,
    pub range: f64,
    pub fire_rate_ms: f64,
    pub target: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectileStyle {
    Direct,
    Area,
    Chain,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProjectileView {
    pub id: u64,
    pub style: ProjectileStyle,
    pub x: f64,
    pub y: f64,
    /// Recent positions, newest last. Only chain shots carry one.
    pub trail: Vec<(f64, f64)>,
}

#[derive(Clone, Debug, Serialize)]
pub struct FloaterView {
    pub x: f64,
    pub y: f64,
    pub value: i64,
    pub tier: ColorTier,
}

/// One complete frame of display state.
#[derive(Clone, Debug, Serialize)]
pub struct GameSnapshot {
    pub phase: PhaseView,
    pub health: u32,
    pub gold: u32,
    pub wave: u32,
    pub score: u32,
    pub game_time_ms: f64,
    /// Remaining inter-wave delay; zero while a wave is running.
    pub next_wave_delay_ms: f64,
    pub paused: bool,
    pub enemies: Vec<EnemyView>,
    pub towers: Vec<TowerView>,
    pub projectiles: Vec<ProjectileView>,
    pub floaters: Vec<FloaterView>,
}

impl GameSnapshot {
    pub fn capture(state: &GameState) -> Self {
        let enemies = state
            .enemies
            .iter()
            .map(|(id, e)| EnemyView {
                id: raw_id(id),
                kind: e.kind,
                x: e.x,
                y: e.y,
                health: e.health,
                max_health: e.max_health,
                slowed: e.slow_until_ms.is_some(),
            })
            .collect();
        let towers = state
            .towers
            .iter()
            .map(|(id, t)| TowerView {
                id: raw_id(id),
                kind: t.kind,
                cell: t.cell,
                level: t.level,
                damage: t.damage,
                range: t.range,
                fire_rate_ms: t.fire_rate_ms,
                target: t.target.map(raw_id),
            })
            .collect();
        let projectiles = state
            .projectiles
            .iter()
            .map(|(id, p)| {
                let (style, trail) = match &p.kind {
                    ProjectileKind::Direct { .. } => (ProjectileStyle::Direct, Vec::new()),
                    ProjectileKind::Area { .. } => (ProjectileStyle::Area, Vec::new()),
                    ProjectileKind::Chain { trail, .. } => {
                        (ProjectileStyle::Chain, trail.clone())
                    }
                };
                ProjectileView {
                    id: raw_id(id),
                    style,
                    x: p.x,
                    y: p.y,
                    trail,
                }
            })
            .collect();
        let floaters = state
            .floaters
            .values()
            .map(|f| FloaterView {
                x: f.x,
                y: f.y,
                value: f.value,
                tier: f.tier,
            })
            .collect();
        Self {
            phase: state.phase().into(),
            health: state.health,
            gold: state.gold,
            wave: state.wave,
            score: state.score,
            game_time_ms: state.game_time_ms,
            next_wave_delay_ms: state.next_wave_timer_ms.max(0.0),
            paused: state.paused,
            enemies,
            towers,
            projectiles,
            floaters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchConfig;
    use crate::path::Path;
    use crate::world::GameState;

    fn fresh_state() -> GameState {
        let cfg = MatchConfig::default();
        let path = Path::new(
            cfg.game.path.clone(),
            cfg.game.grid_width,
            cfg.game.grid_height,
        )
        .unwrap();
        GameState::new(&cfg, path)
    }

    #[test]
    fn fresh_snapshot_is_empty_and_not_started() {
        let snap = GameSnapshot::capture(&fresh_state());
        assert_eq!(snap.phase, PhaseView::NotStarted);
        assert_eq!(snap.wave, 0);
        assert!(snap.enemies.is_empty());
        assert!(snap.towers.is_empty());
        assert!(snap.projectiles.is_empty());
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let snap = GameSnapshot::capture(&fresh_state());
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["phase"], "not_started");
        assert!(json["enemies"].as_array().unwrap().is_empty());
        assert!(json["next_wave_delay_ms"].as_f64().unwrap() > 0.0);
    }
}
