//! Detector facade: one (exercise, limb) rep counter.

use std::sync::Arc;
use std::time::{Duration, Instant};

use repcount_traits::{AngleFrame, Clock};

use crate::builder::DetectorBuilder;
use crate::config::{DetectorConfig, Limb, MovementCfg, angle_key};
use crate::display::feedback;
use crate::error::Result;
use crate::gate::ConfirmationGate;
use crate::history::HistoryWindow;
use crate::ledger::{CompletedRep, RepLedger, Stats};
use crate::movement::{Direction, MovementClassifier, MovementState};
use crate::phase::{Confirmed, Phase, PhaseMachine, RepEvent};
use crate::status::{Diagnostics, Status};
use crate::util::pct_of;

/// Counts repetitions of one exercise on one limb from a per-frame angle.
///
/// Calls must be serialized per instance; independent detectors share no
/// mutable state.
pub struct RepDetector {
    pub(crate) cfg: DetectorConfig,
    pub(crate) limb: Limb,
    pub(crate) angle_key: String,
    pub(crate) history: HistoryWindow,
    pub(crate) classifier: MovementClassifier,
    pub(crate) gate: ConfirmationGate,
    pub(crate) movement: MovementState,
    pub(crate) machine: PhaseMachine,
    pub(crate) ledger: RepLedger,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) epoch: Instant,
    /// |drift| above this shortens the dwell to `strong_motion_dwell_pct`.
    pub(crate) strong_motion_drift: f32,
    pub(crate) strong_motion_dwell_pct: u32,
}

impl core::fmt::Debug for RepDetector {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RepDetector")
            .field("exercise", &self.cfg.exercise)
            .field("limb", &self.limb)
            .field("phase", &self.machine.phase())
            .field("rep_count", &self.ledger.len())
            .finish()
    }
}

impl RepDetector {
    /// Start building a detector.
    pub fn builder() -> DetectorBuilder {
        DetectorBuilder::default()
    }

    /// Detector with default movement tuning on the real-time clock.
    pub fn new(cfg: DetectorConfig, limb: Limb) -> Result<Self> {
        Self::builder().config(cfg).limb(limb).try_build()
    }

    /// Feed one angle reading (degrees), or `None` when the joint was not seen.
    ///
    /// A missing or non-finite angle returns a "no detection" status and leaves
    /// every piece of state untouched.
    pub fn update(&mut self, angle: Option<f32>) -> Status {
        let Some(angle) = angle.filter(|a| a.is_finite()) else {
            return self.no_detection();
        };

        self.history.push(Some(angle));
        let dir = self.classifier.classify(&self.history, &mut self.movement);
        let confirmed = Confirmed {
            up: dir == Direction::Up && self.gate.is_confirmed(&self.movement, Direction::Up),
            down: dir == Direction::Down
                && self.gate.is_confirmed(&self.movement, Direction::Down),
        };

        let dwell = self.dwell();
        let at = self.clock.since(self.epoch);
        let event = self.machine.step(at, dwell, angle, confirmed, &self.cfg);
        if let Some(ev) = event {
            self.movement.reset();
            self.record(ev);
        }

        self.status(angle, event)
    }

    /// Look up this detector's angle key in `frame` and feed it to `update`.
    pub fn update_frame<F: AngleFrame + ?Sized>(&mut self, frame: &F) -> Status {
        let angle = frame.angle(&self.angle_key);
        self.update(angle)
    }

    /// Return to the just-constructed state: empty history and ledger,
    /// Neutral phase, zeroed counters. Idempotent.
    pub fn reset(&mut self) {
        self.history.clear();
        self.movement.reset();
        self.ledger.clear();
        self.epoch = self.clock.now();
        self.machine.reset(Duration::ZERO);
        tracing::info!(exercise = %self.cfg.exercise, limb = %self.limb, "detector reset");
    }

    /// Switch the tracked limb by name (`left`/`right`, case-insensitive).
    ///
    /// An unknown name is rejected with a warning and leaves all state as is;
    /// a valid one resets the detector.
    pub fn switch_limb(&mut self, limb: &str) -> Result<()> {
        match limb.parse::<Limb>() {
            Ok(l) => {
                self.set_limb(l);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    exercise = %self.cfg.exercise,
                    requested = limb,
                    "ignoring limb switch: {e}"
                );
                Err(eyre::Report::new(e))
            }
        }
    }

    /// Track `limb` from now on; resets the detector.
    pub fn set_limb(&mut self, limb: Limb) {
        self.limb = limb;
        self.angle_key = angle_key(limb, self.cfg.joint);
        self.reset();
    }

    pub fn get_stats(&self) -> Stats {
        self.ledger.stats()
    }

    #[inline]
    pub fn limb(&self) -> Limb {
        self.limb
    }

    #[inline]
    pub fn angle_key(&self) -> &str {
        &self.angle_key
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    #[inline]
    pub fn rep_count(&self) -> usize {
        self.ledger.len()
    }

    /// Completed reps, oldest first.
    pub fn reps(&self) -> &[CompletedRep] {
        self.ledger.as_slice()
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.cfg
    }

    pub fn movement_cfg(&self) -> &MovementCfg {
        self.classifier.cfg()
    }

    pub fn history(&self) -> &HistoryWindow {
        &self.history
    }

    pub fn movement(&self) -> &MovementState {
        &self.movement
    }

    /// Dwell required before the next transition, shortened under strong motion.
    pub fn dwell(&self) -> Duration {
        if self.movement.cumulative_drift.abs() > self.strong_motion_drift {
            pct_of(self.cfg.min_phase_duration, self.strong_motion_dwell_pct)
        } else {
            self.cfg.min_phase_duration
        }
    }

    fn record(&mut self, ev: RepEvent) {
        match ev {
            RepEvent::Completed(rep) => {
                self.ledger.push(rep);
                tracing::info!(
                    exercise = %self.cfg.exercise,
                    limb = %self.limb,
                    rep = self.ledger.len(),
                    min_angle = rep.min_angle,
                    max_angle = rep.max_angle,
                    duration_ms = rep.duration().as_millis() as u64,
                    "rep completed"
                );
            }
            RepEvent::Discarded { range_of_motion } => {
                tracing::debug!(
                    exercise = %self.cfg.exercise,
                    limb = %self.limb,
                    range_of_motion,
                    min_range = self.cfg.min_range_of_motion,
                    "rep discarded: range of motion too small"
                );
            }
            _ => {}
        }
    }

    fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            direction: self.movement.direction,
            consecutive_up: self.movement.consecutive_up,
            consecutive_down: self.movement.consecutive_down,
            up_confirmed: self.gate.is_confirmed(&self.movement, Direction::Up),
            down_confirmed: self.gate.is_confirmed(&self.movement, Direction::Down),
            cumulative_drift: self.movement.cumulative_drift,
        }
    }

    fn status(&self, angle: f32, event: Option<RepEvent>) -> Status {
        let phase = self.machine.phase();
        let candidate = self.machine.candidate();
        Status {
            exercise: self.cfg.exercise.clone(),
            limb: self.limb,
            rep_count: self.ledger.len(),
            phase: Some(phase),
            current_angle: Some(angle),
            peak_angle: candidate.map(|c| c.peak_angle),
            valley_angle: candidate.map(|c| c.valley_angle),
            event,
            feedback: feedback(Some(phase), self.limb, self.cfg.joint),
            diagnostics: Some(self.diagnostics()),
        }
    }

    fn no_detection(&self) -> Status {
        Status {
            exercise: self.cfg.exercise.clone(),
            limb: self.limb,
            rep_count: self.ledger.len(),
            phase: None,
            current_angle: None,
            peak_angle: None,
            valley_angle: None,
            event: None,
            feedback: feedback(None, self.limb, self.cfg.joint),
            diagnostics: None,
        }
    }
}
