/// Reference frame length in milliseconds.
///
/// Entity speeds are expressed in "pixels per reference frame" (the 60 Hz
/// convention), so a variable wall-clock delta is normalized against this
/// constant before it scales any movement.
pub const FRAME_MS: f64 = 16.67;

/// Largest delta a single update is allowed to see.
///
/// A lag spike longer than this is clamped rather than integrated, so fast
/// entities cannot tunnel through waypoints or collision radii.
pub const MAX_DT_MS: f64 = 100.0;

/// Clamp a wall-clock delta to the simulation's tolerated range.
pub fn clamp_dt(dt_ms: f64) -> f64 {
    if dt_ms < 0.0 {
        return 0.0;
    }
    dt_ms.min(MAX_DT_MS)
}

/// Number of reference frames covered by `dt_ms`, after clamping.
pub fn frames(dt_ms: f64) -> f64 {
    clamp_dt(dt_ms) / FRAME_MS
}
