//! Configuration types for the detection engine.
//!
//! These are the runtime configuration structs used by `RepDetector`.
//! They are separate from the TOML-deserialized config in `repcount_config`.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::DetectorError;

/// Body side a detector tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Limb {
    Left,
    Right,
}

impl Limb {
    pub const ALL: [Limb; 2] = [Limb::Left, Limb::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            Limb::Left => "left",
            Limb::Right => "right",
        }
    }

    /// Capitalized form used in feedback text ("Left", "Right").
    pub fn title(self) -> &'static str {
        match self {
            Limb::Left => "Left",
            Limb::Right => "Right",
        }
    }

    pub fn other(self) -> Limb {
        match self {
            Limb::Left => Limb::Right,
            Limb::Right => Limb::Left,
        }
    }
}

impl fmt::Display for Limb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Limb {
    type Err = DetectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Limb::Left),
            "right" => Ok(Limb::Right),
            _ => Err(DetectorError::InvalidLimb(s.to_string())),
        }
    }
}

/// Joint whose angle a profile counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Joint {
    Elbow,
    Shoulder,
    Hip,
    Knee,
}

impl Joint {
    pub fn as_str(self) -> &'static str {
        match self {
            Joint::Elbow => "elbow",
            Joint::Shoulder => "shoulder",
            Joint::Hip => "hip",
            Joint::Knee => "knee",
        }
    }
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Angle key for a limb/joint pair, e.g. `right_shoulder`.
pub fn angle_key(limb: Limb, joint: Joint) -> String {
    format!("{}_{}", limb.as_str(), joint.as_str())
}

/// Movement classifier tuning shared by all exercises.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementCfg {
    /// Per-sample delta (deg) that counts as fast motion.
    pub fast_delta_deg: f32,
    /// Per-sample delta (deg) that counts as slow motion.
    pub slow_delta_deg: f32,
    /// Mean delta (deg) below which drift decays instead of accumulating.
    pub drift_noise_floor_deg: f32,
    /// Multiplicative drift decay for still windows. Range: (0.0, 1.0).
    pub drift_decay: f32,
    /// |drift| (deg) the slow rule needs before it classifies.
    pub slow_drift_gate_deg: f32,
    /// |total movement| (deg) under which a still window decays the counters.
    pub stall_deg: f32,
    /// Drift above `factor * confirmation` selects the fast frame threshold.
    pub fast_regime_factor: f32,
    /// Drift above `factor * confirmation` shortens the dwell.
    pub strong_motion_factor: f32,
    /// Dwell kept under strong motion, in percent of `min_phase_duration`.
    pub strong_motion_dwell_pct: u32,
    /// Same-signed deltas (of the last three) a rule needs to fire.
    pub min_agreeing_deltas: usize,
}

impl Default for MovementCfg {
    fn default() -> Self {
        Self {
            fast_delta_deg: 4.0,
            slow_delta_deg: 0.3,
            drift_noise_floor_deg: 0.2,
            drift_decay: 0.92,
            slow_drift_gate_deg: 2.0,
            stall_deg: 3.0,
            fast_regime_factor: 1.5,
            strong_motion_factor: 2.0,
            strong_motion_dwell_pct: 60,
            min_agreeing_deltas: 2,
        }
    }
}

/// Per-exercise detector configuration. Set at construction, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Exercise name, e.g. `shoulder_abduction`.
    pub exercise: String,
    pub joint: Joint,
    /// Resting angle of the movement (deg).
    pub min_angle_threshold: f32,
    /// Top of the movement; exceeding it ends the up phase.
    pub max_angle_threshold: f32,
    /// Neutral -> Up needs `angle > min + start_margin`.
    pub start_margin: f32,
    /// Down -> Neutral needs `angle <= min + rest_margin`.
    pub rest_margin: f32,
    pub movement_confirmation_threshold: f32,
    pub sustained_frames_fast: u32,
    pub sustained_frames_slow: u32,
    pub min_phase_duration: Duration,
    pub min_range_of_motion: f32,
    pub history_size: usize,
}

impl DetectorConfig {
    /// Arm raised sideways; angle measured at the shoulder.
    pub fn shoulder_abduction() -> Self {
        Self {
            exercise: "shoulder_abduction".to_string(),
            joint: Joint::Shoulder,
            min_angle_threshold: 20.0,
            max_angle_threshold: 180.0,
            start_margin: 15.0,
            rest_margin: 10.0,
            movement_confirmation_threshold: 2.5,
            sustained_frames_fast: 2,
            sustained_frames_slow: 2,
            min_phase_duration: Duration::from_millis(200),
            min_range_of_motion: 40.0,
            history_size: 6,
        }
    }

    /// Elbow flexion; 0 deg is a fully extended arm.
    pub fn elbow_curl() -> Self {
        Self {
            exercise: "elbow_curl".to_string(),
            joint: Joint::Elbow,
            min_angle_threshold: 30.0,
            max_angle_threshold: 160.0,
            min_range_of_motion: 50.0,
            ..Self::shoulder_abduction()
        }
    }

    pub fn builtins() -> Vec<Self> {
        vec![Self::elbow_curl(), Self::shoulder_abduction()]
    }

    #[inline]
    pub fn start_threshold(&self) -> f32 {
        self.min_angle_threshold + self.start_margin
    }

    #[inline]
    pub fn rest_threshold(&self) -> f32 {
        self.min_angle_threshold + self.rest_margin
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::shoulder_abduction()
    }
}
