//! Movement classification over the history window.
//!
//! Two rules run on the last three per-sample deltas:
//! - fast: enough large same-signed deltas and a net move beyond the
//!   confirmation threshold over the last four samples;
//! - slow: enough small same-signed deltas and a decayed cumulative drift
//!   beyond `slow_drift_gate_deg`.
//!
//! The fast rule wins when both fire.

use crate::config::MovementCfg;
use crate::history::HistoryWindow;

/// Direction of motion derived from one classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Up,
    Down,
    #[default]
    Still,
}

/// Counters and drift carried between classifications.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovementState {
    pub direction: Direction,
    pub consecutive_up: u32,
    pub consecutive_down: u32,
    pub cumulative_drift: f32,
}

impl MovementState {
    /// Consecutive classifications behind `dir`; always 0 for `Still`.
    pub fn count(&self, dir: Direction) -> u32 {
        match dir {
            Direction::Up => self.consecutive_up,
            Direction::Down => self.consecutive_down,
            Direction::Still => 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone)]
pub struct MovementClassifier {
    cfg: MovementCfg,
    confirmation_deg: f32,
}

impl MovementClassifier {
    pub fn new(cfg: MovementCfg, confirmation_deg: f32) -> Self {
        Self {
            cfg,
            confirmation_deg,
        }
    }

    pub fn cfg(&self) -> &MovementCfg {
        &self.cfg
    }

    /// Classify the window and fold the result into `state`.
    ///
    /// Windows shorter than three samples, or with no usable delta, return
    /// `Still` and leave `state` untouched.
    pub fn classify(&self, window: &HistoryWindow, state: &mut MovementState) -> Direction {
        let len = window.len();
        if len < 3 {
            return Direction::Still;
        }

        let mut deltas = [0.0_f32; 3];
        let mut n = 0;
        for i in (len - 3).max(1)..len {
            if let (Some(Some(prev)), Some(Some(cur))) = (window.get(i - 1), window.get(i)) {
                deltas[n] = cur - prev;
                n += 1;
            }
        }
        let deltas = &deltas[..n];
        if deltas.is_empty() {
            return Direction::Still;
        }

        let total = match (window.back(0), window.back(3)) {
            (Some(Some(newest)), Some(Some(oldest))) => newest - oldest,
            _ => 0.0,
        };

        let c = &self.cfg;
        let fast_up = deltas.iter().filter(|d| **d > c.fast_delta_deg).count();
        let fast_down = deltas.iter().filter(|d| **d < -c.fast_delta_deg).count();
        let slow_up = deltas.iter().filter(|d| **d > c.slow_delta_deg).count();
        let slow_down = deltas.iter().filter(|d| **d < -c.slow_delta_deg).count();

        let avg = deltas.iter().sum::<f32>() / deltas.len() as f32;
        if avg.abs() > c.drift_noise_floor_deg {
            state.cumulative_drift += avg;
        } else {
            state.cumulative_drift *= c.drift_decay;
        }
        let drift = state.cumulative_drift;

        let k = c.min_agreeing_deltas;
        let dir = if fast_up >= k && total > self.confirmation_deg {
            Direction::Up
        } else if fast_down >= k && total < -self.confirmation_deg {
            Direction::Down
        } else if slow_up >= k && drift > c.slow_drift_gate_deg {
            Direction::Up
        } else if slow_down >= k && drift < -c.slow_drift_gate_deg {
            Direction::Down
        } else {
            Direction::Still
        };

        match dir {
            Direction::Up => {
                state.consecutive_up = state.consecutive_up.saturating_add(1);
                state.consecutive_down = 0;
                state.cumulative_drift = state.cumulative_drift.max(0.0);
            }
            Direction::Down => {
                state.consecutive_down = state.consecutive_down.saturating_add(1);
                state.consecutive_up = 0;
                state.cumulative_drift = state.cumulative_drift.min(0.0);
            }
            Direction::Still => {
                if total.abs() < c.stall_deg {
                    state.consecutive_up = state.consecutive_up.saturating_sub(1);
                    state.consecutive_down = state.consecutive_down.saturating_sub(1);
                }
            }
        }
        state.direction = dir;

        tracing::trace!(
            ?dir,
            total,
            drift = state.cumulative_drift,
            up = state.consecutive_up,
            down = state.consecutive_down,
            "classified"
        );
        dir
    }
}
