//! Live status returned from each detector update.

use crate::config::Limb;
use crate::movement::Direction;
use crate::phase::{Phase, RepEvent};

/// Classifier internals at the end of an update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diagnostics {
    pub direction: Direction,
    pub consecutive_up: u32,
    pub consecutive_down: u32,
    pub up_confirmed: bool,
    pub down_confirmed: bool,
    pub cumulative_drift: f32,
}

/// Snapshot of a detector after one update.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub exercise: String,
    pub limb: Limb,
    pub rep_count: usize,
    /// `None` when the tracked angle was not available this update.
    pub phase: Option<Phase>,
    pub current_angle: Option<f32>,
    pub peak_angle: Option<f32>,
    pub valley_angle: Option<f32>,
    /// Rep lifecycle event produced by this update, if any.
    pub event: Option<RepEvent>,
    /// Short coaching or diagnostic text.
    pub feedback: String,
    /// `None` on "no detection" updates.
    pub diagnostics: Option<Diagnostics>,
}

impl Status {
    /// True when this update had a usable angle.
    #[inline]
    pub fn detected(&self) -> bool {
        self.phase.is_some()
    }
}
