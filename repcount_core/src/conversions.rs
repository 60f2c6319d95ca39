//! `From` implementations bridging `repcount_config` types to `repcount_core` types.

use std::time::Duration;

use crate::config::{DetectorConfig, Joint, MovementCfg};

// ── Joint ────────────────────────────────────────────────────────────────────

impl From<repcount_config::JointName> for Joint {
    fn from(j: repcount_config::JointName) -> Self {
        match j {
            repcount_config::JointName::Elbow => Joint::Elbow,
            repcount_config::JointName::Shoulder => Joint::Shoulder,
            repcount_config::JointName::Hip => Joint::Hip,
            repcount_config::JointName::Knee => Joint::Knee,
        }
    }
}

// ── MovementCfg ──────────────────────────────────────────────────────────────

impl From<&repcount_config::MovementCfg> for MovementCfg {
    fn from(c: &repcount_config::MovementCfg) -> Self {
        Self {
            fast_delta_deg: c.fast_delta_deg,
            slow_delta_deg: c.slow_delta_deg,
            drift_noise_floor_deg: c.drift_noise_floor_deg,
            drift_decay: c.drift_decay,
            slow_drift_gate_deg: c.slow_drift_gate_deg,
            stall_deg: c.stall_deg,
            fast_regime_factor: c.fast_regime_factor,
            strong_motion_factor: c.strong_motion_factor,
            strong_motion_dwell_pct: c.strong_motion_dwell_pct,
            min_agreeing_deltas: c.min_agreeing_deltas,
        }
    }
}

// ── DetectorConfig ───────────────────────────────────────────────────────────

impl From<&repcount_config::ExerciseProfile> for DetectorConfig {
    fn from(p: &repcount_config::ExerciseProfile) -> Self {
        Self {
            exercise: p.name.clone(),
            joint: p.joint.into(),
            min_angle_threshold: p.min_angle_deg,
            max_angle_threshold: p.max_angle_deg,
            start_margin: p.start_margin_deg,
            rest_margin: p.rest_margin_deg,
            movement_confirmation_threshold: p.movement_confirmation_deg,
            sustained_frames_fast: p.sustained_frames_fast,
            sustained_frames_slow: p.sustained_frames_slow,
            min_phase_duration: Duration::from_millis(p.min_phase_ms),
            min_range_of_motion: p.min_range_of_motion_deg,
            history_size: p.history_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_profiles_agree_across_crates() {
        let shoulder: DetectorConfig = (&repcount_config::ExerciseProfile::shoulder_abduction()).into();
        assert_eq!(shoulder, DetectorConfig::shoulder_abduction());
        let curl: DetectorConfig = (&repcount_config::ExerciseProfile::elbow_curl()).into();
        assert_eq!(curl, DetectorConfig::elbow_curl());
    }

    #[test]
    fn movement_defaults_agree_across_crates() {
        let m: MovementCfg = (&repcount_config::MovementCfg::default()).into();
        assert_eq!(m, MovementCfg::default());
    }
}
