/// Index of one fixed simulation frame since match start.
pub type Frame = u64;

/// Identifies a player within a match.
pub type PlayerId = u32;

/// Client-assigned ordinal used to order actions submitted for the same frame.
pub type ActionId = u64;
