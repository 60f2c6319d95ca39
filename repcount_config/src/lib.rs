#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and recording loaders for the repetition counter.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Every section is optional; an empty document yields the built-in defaults.
//! - Recorded angle streams (CSV or pose-recorder JSON) are loaded by the
//!   `recording` module.
use serde::Deserialize;
use std::collections::HashSet;

pub mod recording;

pub use recording::{AngleRecord, load_angle_csv, load_pose_json, load_recording};

/// Joints the angle calculator reports, one angle per side.
pub const JOINT_NAMES: [&str; 4] = ["elbow", "shoulder", "hip", "knee"];
/// Limb prefixes used in angle keys.
pub const LIMB_NAMES: [&str; 2] = ["left", "right"];

/// True when `key` is a `<limb>_<joint>` angle key the calculator can produce.
pub fn is_angle_key(key: &str) -> bool {
    key.split_once('_').is_some_and(|(limb, joint)| {
        LIMB_NAMES.contains(&limb) && JOINT_NAMES.contains(&joint)
    })
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JointName {
    Elbow,
    Shoulder,
    Hip,
    Knee,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SessionCfg {
    /// Active exercise profile name
    pub exercise: String,
    /// "left" or "right"
    pub limb: String,
    /// Replay spacing for recordings without timestamps (ms)
    pub frame_ms: u64,
}

impl Default for SessionCfg {
    fn default() -> Self {
        Self {
            exercise: "shoulder_abduction".to_string(),
            limb: "right".to_string(),
            frame_ms: 33,
        }
    }
}

/// Movement classifier tuning. Defaults are empirically tuned, not derived.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MovementCfg {
    pub fast_delta_deg: f32,
    pub slow_delta_deg: f32,
    pub drift_noise_floor_deg: f32,
    pub drift_decay: f32,
    pub slow_drift_gate_deg: f32,
    pub stall_deg: f32,
    pub fast_regime_factor: f32,
    pub strong_motion_factor: f32,
    pub strong_motion_dwell_pct: u32,
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

/// One exercise profile. Profiles named like a built-in replace it.
#[derive(Debug, Deserialize, Clone)]
pub struct ExerciseProfile {
    pub name: String,
    pub joint: JointName,
    pub min_angle_deg: f32,
    pub max_angle_deg: f32,
    #[serde(default = "default_start_margin")]
    pub start_margin_deg: f32,
    #[serde(default = "default_rest_margin")]
    pub rest_margin_deg: f32,
    #[serde(default = "default_confirmation")]
    pub movement_confirmation_deg: f32,
    #[serde(default = "default_sustained")]
    pub sustained_frames_fast: u32,
    #[serde(default = "default_sustained")]
    pub sustained_frames_slow: u32,
    #[serde(default = "default_min_phase_ms")]
    pub min_phase_ms: u64,
    pub min_range_of_motion_deg: f32,
    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

fn default_start_margin() -> f32 {
    15.0
}
fn default_rest_margin() -> f32 {
    10.0
}
fn default_confirmation() -> f32 {
    2.5
}
fn default_sustained() -> u32 {
    2
}
fn default_min_phase_ms() -> u64 {
    200
}
fn default_history_size() -> usize {
    6
}

impl ExerciseProfile {
    /// Built-in shoulder abduction profile (arm raised sideways).
    pub fn shoulder_abduction() -> Self {
        Self {
            name: "shoulder_abduction".to_string(),
            joint: JointName::Shoulder,
            min_angle_deg: 20.0,
            max_angle_deg: 180.0,
            start_margin_deg: default_start_margin(),
            rest_margin_deg: default_rest_margin(),
            movement_confirmation_deg: default_confirmation(),
            sustained_frames_fast: 2,
            sustained_frames_slow: 2,
            min_phase_ms: 200,
            min_range_of_motion_deg: 40.0,
            history_size: 6,
        }
    }

    /// Built-in elbow curl profile (anatomical flexion, 0° = extended).
    pub fn elbow_curl() -> Self {
        Self {
            name: "elbow_curl".to_string(),
            joint: JointName::Elbow,
            min_angle_deg: 30.0,
            max_angle_deg: 160.0,
            start_margin_deg: default_start_margin(),
            rest_margin_deg: default_rest_margin(),
            movement_confirmation_deg: default_confirmation(),
            sustained_frames_fast: 2,
            sustained_frames_slow: 2,
            min_phase_ms: 200,
            min_range_of_motion_deg: 50.0,
            history_size: 6,
        }
    }

    pub fn builtins() -> Vec<Self> {
        vec![Self::elbow_curl(), Self::shoulder_abduction()]
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub session: SessionCfg,
    pub movement: MovementCfg,
    /// Extra or overriding exercise profiles
    pub exercise: Vec<ExerciseProfile>,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    /// Built-in profiles merged with the configured ones; configured profiles
    /// replace built-ins of the same name.
    pub fn profiles(&self) -> Vec<ExerciseProfile> {
        let mut out = ExerciseProfile::builtins();
        for p in &self.exercise {
            if let Some(slot) = out.iter_mut().find(|b| b.name == p.name) {
                *slot = p.clone();
            } else {
                out.push(p.clone());
            }
        }
        out
    }

    /// Look up an effective profile by name.
    pub fn profile(&self, name: &str) -> Option<ExerciseProfile> {
        self.profiles().into_iter().find(|p| p.name == name)
    }

    pub fn validate(&self) -> eyre::Result<()> {
        // Session
        if !LIMB_NAMES.contains(&self.session.limb.to_ascii_lowercase().as_str()) {
            eyre::bail!(
                "session.limb must be one of left|right, got '{}'",
                self.session.limb
            );
        }
        if self.session.frame_ms == 0 {
            eyre::bail!("session.frame_ms must be >= 1");
        }

        // Movement
        let m = &self.movement;
        for (name, v) in [
            ("fast_delta_deg", m.fast_delta_deg),
            ("slow_delta_deg", m.slow_delta_deg),
            ("drift_noise_floor_deg", m.drift_noise_floor_deg),
            ("slow_drift_gate_deg", m.slow_drift_gate_deg),
            ("stall_deg", m.stall_deg),
            ("fast_regime_factor", m.fast_regime_factor),
            ("strong_motion_factor", m.strong_motion_factor),
        ] {
            if !v.is_finite() || v < 0.0 {
                eyre::bail!("movement.{name} must be finite and >= 0");
            }
        }
        if m.slow_delta_deg > m.fast_delta_deg {
            eyre::bail!("movement.slow_delta_deg must be <= movement.fast_delta_deg");
        }
        if !(m.drift_decay > 0.0 && m.drift_decay < 1.0) {
            eyre::bail!("movement.drift_decay must be in (0.0, 1.0)");
        }
        if !(1..=100).contains(&m.strong_motion_dwell_pct) {
            eyre::bail!("movement.strong_motion_dwell_pct must be in 1..=100");
        }
        if m.min_agreeing_deltas == 0 || m.min_agreeing_deltas > 3 {
            eyre::bail!("movement.min_agreeing_deltas must be in 1..=3");
        }

        // Exercises
        let mut seen = HashSet::new();
        for (i, p) in self.exercise.iter().enumerate() {
            if p.name.trim().is_empty() {
                eyre::bail!("exercise[{i}].name must not be empty");
            }
            if !seen.insert(p.name.as_str()) {
                eyre::bail!("exercise[{i}].name '{}' is defined twice", p.name);
            }
            validate_profile(i, p)?;
        }
        if self.profile(&self.session.exercise).is_none() {
            eyre::bail!(
                "session.exercise '{}' does not name a known exercise profile",
                self.session.exercise
            );
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got '{rot}'");
        }

        Ok(())
    }
}

fn validate_profile(i: usize, p: &ExerciseProfile) -> eyre::Result<()> {
    for (name, v) in [
        ("min_angle_deg", p.min_angle_deg),
        ("max_angle_deg", p.max_angle_deg),
        ("start_margin_deg", p.start_margin_deg),
        ("rest_margin_deg", p.rest_margin_deg),
        ("movement_confirmation_deg", p.movement_confirmation_deg),
        ("min_range_of_motion_deg", p.min_range_of_motion_deg),
    ] {
        if !v.is_finite() {
            eyre::bail!("exercise[{i}].{name} must be finite");
        }
    }
    if p.min_angle_deg >= p.max_angle_deg {
        eyre::bail!("exercise[{i}].min_angle_deg must be < max_angle_deg");
    }
    if p.start_margin_deg < 0.0 || p.rest_margin_deg < 0.0 {
        eyre::bail!("exercise[{i}] margins must be >= 0");
    }
    if p.movement_confirmation_deg < 0.0 {
        eyre::bail!("exercise[{i}].movement_confirmation_deg must be >= 0");
    }
    if p.min_range_of_motion_deg < 0.0 {
        eyre::bail!("exercise[{i}].min_range_of_motion_deg must be >= 0");
    }
    if p.sustained_frames_fast == 0 || p.sustained_frames_slow == 0 {
        eyre::bail!("exercise[{i}] sustained frames must be >= 1");
    }
    if p.history_size < 4 {
        eyre::bail!("exercise[{i}].history_size must be >= 4");
    }
    if p.min_phase_ms > 60 * 1000 {
        eyre::bail!("exercise[{i}].min_phase_ms is unreasonably large (>60s)");
    }
    Ok(())
}
