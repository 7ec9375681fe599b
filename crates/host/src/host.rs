use defense_core::{ActionEnvelope, Frame, Game, PlayerId, TerminalOutcome, FRAME_MS};
use std::collections::BTreeMap;

pub struct RunResult<G: Game> {
    pub outcome: Option<TerminalOutcome>,
    pub final_frame: Frame,
    pub events: Vec<G::Event>,
}

/// Drives a [`Game`] frame by frame at a fixed delta, delivering queued
/// action envelopes at the frame they are scheduled for.
pub struct MatchHost<G: Game> {
    game: G,
    current_frame: Frame,
    frame_ms: f64,
    next_player_id: PlayerId,
    pending_actions: BTreeMap<Frame, Vec<ActionEnvelope<G::Action>>>,
}

impl<G: Game> MatchHost<G> {
    pub fn new(config: G::Config, seed: u64, frame_ms: f64) -> Result<Self, G::SetupError> {
        Ok(Self {
            game: G::new(config, seed)?,
            current_frame: 0,
            frame_ms,
            next_player_id: 0,
            pending_actions: BTreeMap::new(),
        })
    }

    /// A host stepping at the simulation's reference rate (~60 Hz).
    pub fn with_reference_rate(config: G::Config, seed: u64) -> Result<Self, G::SetupError> {
        Self::new(config, seed, FRAME_MS)
    }

    pub fn join_player(&mut self) -> PlayerId {
        let id = self.next_player_id;
        self.next_player_id += 1;
        id
    }

    /// Queue an action for its intended frame. Anything aimed at the current
    /// frame or earlier lands on the next one instead. Returns the frame the
    /// action was actually scheduled for.
    pub fn submit(&mut self, mut action: ActionEnvelope<G::Action>) -> Frame {
        let scheduled = if action.intended_frame <= self.current_frame {
            self.current_frame + 1
        } else {
            action.intended_frame
        };
        action.intended_frame = scheduled;
        self.pending_actions
            .entry(scheduled)
            .or_default()
            .push(action);
        scheduled
    }

    /// Advance one frame. Returns None if the match is already decided,
    /// otherwise the events this frame produced.
    pub fn step_one_frame(&mut self) -> Option<Vec<G::Event>> {
        if self.game.outcome().is_some() {
            return None;
        }
        self.current_frame += 1;
        let mut actions = self
            .pending_actions
            .remove(&self.current_frame)
            .unwrap_or_default();
        // Deterministic delivery whatever order submissions arrived in.
        actions.sort_by_key(|a| (a.player_id, a.action_id));

        let mut frame_events = Vec::new();
        self.game.update(self.frame_ms, &actions, &mut frame_events);
        Some(frame_events)
    }

    pub fn run_for_frames(&mut self, max_frames: Frame) -> RunResult<G> {
        let mut all_events = Vec::new();
        for _ in 0..max_frames {
            match self.step_one_frame() {
                Some(events) => all_events.extend(events),
                None => break,
            }
        }
        RunResult {
            outcome: self.game.outcome(),
            final_frame: self.current_frame,
            events: all_events,
        }
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn snapshot(&self) -> G::Snapshot {
        self.game.snapshot()
    }

    pub fn current_frame(&self) -> Frame {
        self.current_frame
    }

    pub fn frame_ms(&self) -> f64 {
        self.frame_ms
    }

    pub fn outcome(&self) -> Option<TerminalOutcome> {
        self.game.outcome()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    /// Minimal game for exercising the host: sums submitted increments and
    /// records the order actions were delivered in.
    struct Tally {
        total: u64,
        target: u64,
        deliveries: Vec<(PlayerId, u64)>,
    }

    impl Game for Tally {
        type Config = u64;
        type Action = u64;
        type Snapshot = u64;
        type Event = u64;
        type SetupError = Infallible;

        fn new(target: u64, _seed: u64) -> Result<Self, Infallible> {
            Ok(Self {
                total: 0,
                target,
                deliveries: Vec::new(),
            })
        }

        fn update(
            &mut self,
            _dt_ms: f64,
            actions: &[ActionEnvelope<u64>],
            out_events: &mut Vec<u64>,
        ) {
            for a in actions {
                self.total += a.payload;
                self.deliveries.push((a.player_id, a.action_id));
                out_events.push(self.total);
            }
        }

        fn snapshot(&self) -> u64 {
            self.total
        }

        fn outcome(&self) -> Option<TerminalOutcome> {
            (self.total >= self.target).then_some(TerminalOutcome::Victory)
        }
    }

    fn envelope(player_id: PlayerId, action_id: u64, frame: Frame, payload: u64) -> ActionEnvelope<u64> {
        ActionEnvelope {
            player_id,
            action_id,
            intended_frame: frame,
            payload,
        }
    }

    #[test]
    fn past_frames_are_bumped_to_the_next_one() {
        let mut host: MatchHost<Tally> = MatchHost::with_reference_rate(100, 0).unwrap();
        host.run_for_frames(5);
        let scheduled = host.submit(envelope(0, 0, 3, 1));
        assert_eq!(scheduled, 6);
        host.run_for_frames(1);
        assert_eq!(host.snapshot(), 1);
    }

    #[test]
    fn same_frame_actions_are_ordered_by_player_then_action_id() {
        let mut host: MatchHost<Tally> = MatchHost::with_reference_rate(100, 0).unwrap();
        host.submit(envelope(1, 0, 1, 1));
        host.submit(envelope(0, 5, 1, 1));
        host.submit(envelope(0, 2, 1, 1));
        host.run_for_frames(1);
        assert_eq!(host.game().deliveries, vec![(0, 2), (0, 5), (1, 0)]);
    }

    #[test]
    fn run_stops_at_the_terminal_frame() {
        let mut host: MatchHost<Tally> = MatchHost::with_reference_rate(2, 0).unwrap();
        host.submit(envelope(0, 0, 1, 1));
        host.submit(envelope(0, 1, 2, 1));
        host.submit(envelope(0, 2, 3, 1));
        let result = host.run_for_frames(100);
        assert_eq!(result.outcome, Some(TerminalOutcome::Victory));
        assert_eq!(result.final_frame, 2);
        assert_eq!(host.snapshot(), 2);
        assert!(host.step_one_frame().is_none());
    }

    #[test]
    fn players_get_distinct_ids() {
        let mut host: MatchHost<Tally> = MatchHost::with_reference_rate(100, 0).unwrap();
        assert_ne!(host.join_player(), host.join_player());
    }
}
