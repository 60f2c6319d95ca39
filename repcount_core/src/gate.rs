//! Confirmation gate: a direction only counts once it has persisted.

use crate::movement::{Direction, MovementState};

/// Decides whether a classified direction has persisted long enough.
///
/// Fast motion (|drift| above `fast_regime_factor * confirmation`) is held to
/// `sustained_frames_fast`, everything else to `sustained_frames_slow`.
#[derive(Debug, Clone, Copy)]
pub struct ConfirmationGate {
    pub sustained_frames_fast: u32,
    pub sustained_frames_slow: u32,
    /// |drift| above this selects the fast frame threshold.
    pub fast_regime_drift: f32,
}

impl ConfirmationGate {
    pub fn new(
        sustained_frames_fast: u32,
        sustained_frames_slow: u32,
        confirmation_deg: f32,
        fast_regime_factor: f32,
    ) -> Self {
        Self {
            sustained_frames_fast,
            sustained_frames_slow,
            fast_regime_drift: confirmation_deg * fast_regime_factor,
        }
    }

    /// Frames `state` needs behind a direction right now.
    #[inline]
    pub fn required_frames(&self, state: &MovementState) -> u32 {
        if state.cumulative_drift.abs() > self.fast_regime_drift {
            self.sustained_frames_fast
        } else {
            self.sustained_frames_slow
        }
    }

    /// `Still` is never confirmed.
    pub fn is_confirmed(&self, state: &MovementState, dir: Direction) -> bool {
        dir != Direction::Still && state.count(dir) >= self.required_frames(state)
    }
}
