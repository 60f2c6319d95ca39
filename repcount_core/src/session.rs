//! Multi-exercise workout session.
//!
//! Holds one detector per (exercise, limb), built up front, plus the active
//! selection. Toggling the limb swaps to the other side's detector without
//! resetting either, so each side keeps its own count.

use std::sync::Arc;

use repcount_traits::clock::{Clock, MonotonicClock};
use repcount_traits::AngleFrame;

use crate::config::{DetectorConfig, Limb, MovementCfg};
use crate::detector::RepDetector;
use crate::error::{BuildError, DetectorError, Result};
use crate::ledger::Stats;
use crate::status::Status;

pub struct WorkoutSessionBuilder {
    exercises: Vec<DetectorConfig>,
    movement: MovementCfg,
    active: Option<String>,
    limb: Limb,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
}

impl Default for WorkoutSessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkoutSessionBuilder {
    pub fn new() -> Self {
        Self {
            exercises: Vec::new(),
            movement: MovementCfg::default(),
            active: None,
            limb: Limb::Right,
            clock: None,
        }
    }

    pub fn exercise(mut self, cfg: DetectorConfig) -> Self {
        self.exercises.push(cfg);
        self
    }

    pub fn exercises<I: IntoIterator<Item = DetectorConfig>>(mut self, cfgs: I) -> Self {
        self.exercises.extend(cfgs);
        self
    }

    pub fn movement(mut self, m: MovementCfg) -> Self {
        self.movement = m;
        self
    }

    /// Initially active exercise. Default: the first one added.
    pub fn active(mut self, name: impl Into<String>) -> Self {
        self.active = Some(name.into());
        self
    }

    pub fn limb(mut self, limb: Limb) -> Self {
        self.limb = limb;
        self
    }

    pub fn clock<C: Clock + Send + Sync + 'static>(mut self, clock: C) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub fn build(self) -> Result<WorkoutSession> {
        if self.exercises.is_empty() {
            return Err(eyre::Report::new(BuildError::MissingExercise));
        }
        let clock: Arc<dyn Clock + Send + Sync> = match self.clock {
            Some(c) => c,
            None => Arc::new(MonotonicClock::new()),
        };

        let mut slots: Vec<ExerciseSlot> = Vec::with_capacity(self.exercises.len());
        for cfg in self.exercises {
            if slots.iter().any(|s| s.name == cfg.exercise) {
                return Err(eyre::Report::new(BuildError::InvalidConfig(
                    "exercise names must be unique",
                )));
            }
            let build = |limb| {
                RepDetector::builder()
                    .config(cfg.clone())
                    .movement(self.movement.clone())
                    .limb(limb)
                    .shared_clock(Arc::clone(&clock))
                    .try_build()
            };
            let left = build(Limb::Left)?;
            let right = build(Limb::Right)?;
            slots.push(ExerciseSlot {
                name: cfg.exercise.clone(),
                left,
                right,
            });
        }

        let active = match self.active {
            Some(name) => slots
                .iter()
                .position(|s| s.name == name)
                .ok_or_else(|| eyre::Report::new(DetectorError::UnknownExercise(name)))?,
            None => 0,
        };

        Ok(WorkoutSession {
            slots,
            active,
            limb: self.limb,
            enabled: true,
        })
    }
}

struct ExerciseSlot {
    name: String,
    left: RepDetector,
    right: RepDetector,
}

impl ExerciseSlot {
    fn get(&self, limb: Limb) -> &RepDetector {
        match limb {
            Limb::Left => &self.left,
            Limb::Right => &self.right,
        }
    }

    fn get_mut(&mut self, limb: Limb) -> &mut RepDetector {
        match limb {
            Limb::Left => &mut self.left,
            Limb::Right => &mut self.right,
        }
    }
}

pub struct WorkoutSession {
    slots: Vec<ExerciseSlot>,
    active: usize,
    limb: Limb,
    enabled: bool,
}

impl core::fmt::Debug for WorkoutSession {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WorkoutSession")
            .field("exercise", &self.active_exercise())
            .field("limb", &self.limb)
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl WorkoutSession {
    pub fn builder() -> WorkoutSessionBuilder {
        WorkoutSessionBuilder::new()
    }

    /// Feed a frame to the active detector. Returns `None` while detection is
    /// disabled; no detector sees the frame then.
    pub fn update_frame<F: AngleFrame + ?Sized>(&mut self, frame: &F) -> Option<Status> {
        if !self.enabled {
            return None;
        }
        Some(self.active_mut().update_frame(frame))
    }

    /// Switch to the other limb's detector. Neither detector is reset.
    pub fn toggle_limb(&mut self) -> Limb {
        self.limb = self.limb.other();
        tracing::info!(exercise = %self.active_exercise(), limb = %self.limb, "limb toggled");
        self.limb
    }

    /// Make `name` the active exercise, keeping the current limb.
    pub fn select_exercise(&mut self, name: &str) -> Result<()> {
        let Some(idx) = self.slots.iter().position(|s| s.name == name) else {
            tracing::warn!(requested = name, "ignoring unknown exercise");
            return Err(eyre::Report::new(DetectorError::UnknownExercise(
                name.to_string(),
            )));
        };
        self.active = idx;
        tracing::info!(exercise = name, limb = %self.limb, "exercise selected");
        Ok(())
    }

    /// Advance to the next exercise (wrapping) and return its name.
    pub fn cycle_exercise(&mut self) -> &str {
        self.active = (self.active + 1) % self.slots.len();
        let name = self.slots[self.active].name.as_str();
        tracing::info!(exercise = name, limb = %self.limb, "exercise selected");
        name
    }

    /// Reset only the active (exercise, limb) detector.
    pub fn reset_active(&mut self) {
        self.active_mut().reset();
    }

    pub fn active_stats(&self) -> Stats {
        self.active().get_stats()
    }

    pub fn set_detection_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            tracing::info!(enabled, "detection toggled");
        }
        self.enabled = enabled;
    }

    #[inline]
    pub fn detection_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn limb(&self) -> Limb {
        self.limb
    }

    pub fn active_exercise(&self) -> &str {
        &self.slots[self.active].name
    }

    pub fn exercise_names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.name.as_str())
    }

    pub fn active(&self) -> &RepDetector {
        self.slots[self.active].get(self.limb)
    }

    pub fn active_mut(&mut self) -> &mut RepDetector {
        let limb = self.limb;
        self.slots[self.active].get_mut(limb)
    }

    /// Any detector in the session, active or not.
    pub fn detector(&self, exercise: &str, limb: Limb) -> Option<&RepDetector> {
        self.slots
            .iter()
            .find(|s| s.name == exercise)
            .map(|s| s.get(limb))
    }
}
