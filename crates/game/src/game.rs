use crate::actions::PlayerAction;
use crate::config::MatchConfig;
use crate::errors::NewGameError;
use crate::events::GameEvent;
use crate::snapshot::GameSnapshot;
use crate::systems;
use crate::world::GameState;
use defense_core::{clamp_dt, ActionEnvelope, Game, TerminalOutcome};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// The tower-defense match as a whole: owns the state, the config, and the
/// seeded RNG, and drives the fixed update pipeline each tick.
pub struct DefenseGame {
    cfg: MatchConfig,
    state: GameState,
    rng: ChaCha8Rng,
    seed: u64,
}

impl DefenseGame {
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Rebuild the match from its original config and seed. The path was
    /// validated at construction and the config is immutable afterwards, so
    /// this cannot fail.
    fn restart(&mut self) {
        debug!(seed = self.seed, "match restarted");
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        let path = self.state.path.clone();
        self.state = GameState::new(&self.cfg, path);
    }
}

impl Game for DefenseGame {
    type Config = MatchConfig;
    type Action = PlayerAction;
    type Snapshot = GameSnapshot;
    type Event = GameEvent;
    type SetupError = NewGameError;

    fn new(config: MatchConfig, seed: u64) -> Result<Self, NewGameError> {
        let path = crate::path::Path::new(
            config.game.path.clone(),
            config.game.grid_width,
            config.game.grid_height,
        )?;
        let state = GameState::new(&config, path);
        Ok(Self {
            cfg: config,
            state,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        })
    }

    fn update(
        &mut self,
        dt_ms: f64,
        actions: &[ActionEnvelope<PlayerAction>],
        out_events: &mut Vec<GameEvent>,
    ) {
        let dt = clamp_dt(dt_ms);

        for envelope in actions {
            if matches!(envelope.payload, PlayerAction::Restart) {
                self.restart();
                continue;
            }
            systems::process_action(&mut self.state, &self.cfg, &envelope.payload, out_events);
        }

        if self.state.paused || self.state.is_over() {
            // Gameplay is frozen but damage numbers keep draining.
            systems::update_floaters(&mut self.state, dt);
            return;
        }

        systems::advance_clock(&mut self.state, dt);
        systems::apply_passive_heal(&mut self.state, &self.cfg, dt);
        systems::update_wave(&mut self.state, &self.cfg, &mut self.rng, dt, out_events);
        systems::update_towers(&mut self.state, &self.cfg, dt);
        systems::update_enemies(&mut self.state, &self.cfg, dt, out_events);
        systems::update_projectiles(&mut self.state, dt);
        systems::update_floaters(&mut self.state, dt);
        systems::remove_dead(&mut self.state, &self.cfg, out_events);
        systems::clear_stale_refs(&mut self.state);
        systems::check_progress(&mut self.state, &self.cfg, out_events);
    }

    fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::capture(&self.state)
    }

    fn outcome(&self) -> Option<TerminalOutcome> {
        self.state.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PathError;
    use crate::path::Cell;
    use defense_core::FRAME_MS;

    fn envelope(payload: PlayerAction) -> ActionEnvelope<PlayerAction> {
        ActionEnvelope {
            player_id: 0,
            action_id: 0,
            intended_frame: 0,
            payload,
        }
    }

    #[test]
    fn broken_path_fails_setup() {
        let mut cfg = MatchConfig::default();
        cfg.game.path = vec![Cell::new(0, 0)];
        match DefenseGame::new(cfg, 1) {
            Err(NewGameError::InvalidPath(PathError::TooShort)) => {}
            other => panic!("expected path rejection, got {:?}", other.err()),
        }
    }

    #[test]
    fn pause_freezes_the_clock() {
        let mut game = DefenseGame::new(MatchConfig::default(), 1).unwrap();
        let mut events = Vec::new();
        game.update(FRAME_MS, &[envelope(PlayerAction::Pause)], &mut events);
        let frozen = game.state().game_time_ms;
        for _ in 0..10 {
            game.update(FRAME_MS, &[], &mut events);
        }
        assert_eq!(game.state().game_time_ms, frozen);
        game.update(FRAME_MS, &[envelope(PlayerAction::Resume)], &mut events);
        assert!(game.state().game_time_ms > frozen);
    }

    #[test]
    fn restart_resets_the_match() {
        let mut game = DefenseGame::new(MatchConfig::default(), 1).unwrap();
        let mut events = Vec::new();
        // Skip the delay and run until enemies are on the map.
        game.update(FRAME_MS, &[envelope(PlayerAction::StartWave)], &mut events);
        for _ in 0..100 {
            game.update(FRAME_MS, &[], &mut events);
        }
        assert!(game.state().wave > 0);
        game.update(FRAME_MS, &[envelope(PlayerAction::Restart)], &mut events);
        assert_eq!(game.state().wave, 0);
        assert!(game.state().enemies.is_empty());
        assert_eq!(
            game.state().gold,
            game.config().game.starting_gold + game.config().skills.start_gold_bonus()
        );
    }

    #[test]
    fn oversized_delta_is_clamped() {
        let mut game = DefenseGame::new(MatchConfig::default(), 1).unwrap();
        let mut events = Vec::new();
        // A multi-second stall must not fast-forward the match.
        game.update(5000.0, &[], &mut events);
        assert!(game.state().game_time_ms <= 100.0);
    }
}
