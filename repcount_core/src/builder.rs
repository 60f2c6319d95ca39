//! Builder for `RepDetector`.
//!
//! Every field has a default except the exercise config; `try_build()`
//! validates thresholds and tuning before any state is allocated.

use std::sync::Arc;
use std::time::Duration;

use repcount_traits::clock::{Clock, MonotonicClock};

use crate::config::{DetectorConfig, Limb, MovementCfg, angle_key};
use crate::detector::RepDetector;
use crate::error::{BuildError, Result};
use crate::gate::ConfirmationGate;
use crate::history::HistoryWindow;
use crate::ledger::RepLedger;
use crate::movement::{MovementClassifier, MovementState};
use crate::phase::PhaseMachine;

/// Builder for `RepDetector`. All fields are validated on `try_build()`.
#[derive(Default)]
pub struct DetectorBuilder {
    config: Option<DetectorConfig>,
    movement: Option<MovementCfg>,
    limb: Option<Limb>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
}

impl DetectorBuilder {
    /// Exercise thresholds (required).
    pub fn config(mut self, cfg: DetectorConfig) -> Self {
        self.config = Some(cfg);
        self
    }

    /// Classifier tuning. Default: `MovementCfg::default()`.
    pub fn movement(mut self, cfg: MovementCfg) -> Self {
        self.movement = Some(cfg);
        self
    }

    /// Tracked limb. Default: right.
    pub fn limb(mut self, limb: Limb) -> Self {
        self.limb = Some(limb);
        self
    }

    /// Inject a clock (e.g. `ManualClock` for tests or replay).
    pub fn clock<C: Clock + Send + Sync + 'static>(mut self, clock: C) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Share an existing clock handle between detectors.
    pub fn shared_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn try_build(self) -> Result<RepDetector> {
        let cfg = self
            .config
            .ok_or_else(|| eyre::Report::new(BuildError::MissingExercise))?;
        validate_and_build(
            cfg,
            self.movement.unwrap_or_default(),
            self.limb.unwrap_or(Limb::Right),
            self.clock,
        )
    }
}

fn invalid(msg: &'static str) -> eyre::Report {
    eyre::Report::new(BuildError::InvalidConfig(msg))
}

/// Validate configuration and construct a `RepDetector`.
fn validate_and_build(
    cfg: DetectorConfig,
    movement: MovementCfg,
    limb: Limb,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
) -> Result<RepDetector> {
    // ── Exercise ─────────────────────────────────────────────────────────────
    if cfg.exercise.trim().is_empty() {
        return Err(invalid("exercise name must not be empty"));
    }
    if !cfg.min_angle_threshold.is_finite() || !cfg.max_angle_threshold.is_finite() {
        return Err(invalid("angle thresholds must be finite"));
    }
    if cfg.min_angle_threshold >= cfg.max_angle_threshold {
        return Err(invalid(
            "min_angle_threshold must be < max_angle_threshold",
        ));
    }
    if !(cfg.start_margin.is_finite() && cfg.start_margin >= 0.0)
        || !(cfg.rest_margin.is_finite() && cfg.rest_margin >= 0.0)
    {
        return Err(invalid("margins must be finite and >= 0"));
    }
    if !(cfg.movement_confirmation_threshold.is_finite()
        && cfg.movement_confirmation_threshold >= 0.0)
    {
        return Err(invalid(
            "movement_confirmation_threshold must be finite and >= 0",
        ));
    }
    if cfg.sustained_frames_fast == 0 || cfg.sustained_frames_slow == 0 {
        return Err(invalid("sustained frames must be >= 1"));
    }
    if !(cfg.min_range_of_motion.is_finite() && cfg.min_range_of_motion >= 0.0) {
        return Err(invalid("min_range_of_motion must be finite and >= 0"));
    }
    if cfg.history_size < 4 {
        return Err(invalid("history_size must be >= 4"));
    }

    // ── Movement ─────────────────────────────────────────────────────────────
    let tunables = [
        movement.fast_delta_deg,
        movement.slow_delta_deg,
        movement.drift_noise_floor_deg,
        movement.slow_drift_gate_deg,
        movement.stall_deg,
        movement.fast_regime_factor,
        movement.strong_motion_factor,
    ];
    if tunables.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(invalid("movement thresholds must be finite and >= 0"));
    }
    if !(movement.drift_decay > 0.0 && movement.drift_decay < 1.0) {
        return Err(invalid("drift_decay must be in (0.0, 1.0)"));
    }
    if !(1..=100).contains(&movement.strong_motion_dwell_pct) {
        return Err(invalid("strong_motion_dwell_pct must be in 1..=100"));
    }
    if !(1..=3).contains(&movement.min_agreeing_deltas) {
        return Err(invalid("min_agreeing_deltas must be in 1..=3"));
    }

    // ── Construct ────────────────────────────────────────────────────────────
    let clock: Arc<dyn Clock + Send + Sync> = match clock {
        Some(c) => c,
        None => Arc::new(MonotonicClock::new()),
    };
    let epoch = clock.now();

    let confirmation = cfg.movement_confirmation_threshold;
    let gate = ConfirmationGate::new(
        cfg.sustained_frames_fast,
        cfg.sustained_frames_slow,
        confirmation,
        movement.fast_regime_factor,
    );
    let strong_motion_drift = confirmation * movement.strong_motion_factor;
    let strong_motion_dwell_pct = movement.strong_motion_dwell_pct;

    tracing::debug!(
        exercise = %cfg.exercise,
        %limb,
        min = cfg.min_angle_threshold,
        max = cfg.max_angle_threshold,
        "detector built"
    );

    Ok(RepDetector {
        angle_key: angle_key(limb, cfg.joint),
        history: HistoryWindow::new(cfg.history_size),
        classifier: MovementClassifier::new(movement, confirmation),
        gate,
        movement: MovementState::default(),
        machine: PhaseMachine::new(Duration::ZERO),
        ledger: RepLedger::new(),
        clock,
        epoch,
        strong_motion_drift,
        strong_motion_dwell_pct,
        limb,
        cfg,
    })
}
