use crate::types::{ActionId, Frame, PlayerId};

#[derive(Clone, Debug)]
pub struct ActionEnvelope<A> {
    pub player_id: PlayerId,
    pub action_id: ActionId,
    pub intended_frame: Frame,
    pub payload: A,
}
