use crate::envelope::ActionEnvelope;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminalOutcome {
    Victory,
    Defeat,
}

/// A deterministic, dt-driven simulation.
///
/// The host feeds each update a wall-clock delta plus the action envelopes
/// scheduled for that frame; the game mutates its own state, appends events,
/// and reports a terminal outcome once the match is decided.
pub trait Game: Sized {
    type Config: Clone + Send + Sync + 'static;
    type Action: Clone + Send + Sync + 'static;
    type Snapshot: Clone + Send + Sync + 'static;
    type Event: Clone + Send + Sync + 'static;
    type SetupError: std::error::Error;

    /// Construct a match. Fails when the config cannot produce a playable
    /// match (e.g. a broken path), never after that.
    fn new(config: Self::Config, seed: u64) -> Result<Self, Self::SetupError>;

    fn update(
        &mut self,
        dt_ms: f64,
        actions: &[ActionEnvelope<Self::Action>],
        out_events: &mut Vec<Self::Event>,
    );

    /// Read-only view for display layers. Must not mutate.
    fn snapshot(&self) -> Self::Snapshot;

    fn outcome(&self) -> Option<TerminalOutcome>;
}
