pub mod envelope;
pub mod game;
pub mod time;
pub mod types;

pub use envelope::ActionEnvelope;
pub use game::{Game, TerminalOutcome};
pub use time::{clamp_dt, frames, FRAME_MS, MAX_DT_MS};
pub use types::{ActionId, Frame, PlayerId};
