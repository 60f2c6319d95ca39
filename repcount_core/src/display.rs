//! Stateless presentation helpers for phases, statuses, and stats.
//!
//! Angles and durations are shown rounded to one decimal place.

use std::fmt;

use crate::config::{Joint, Limb};
use crate::ledger::Stats;
use crate::phase::{Phase, RepEvent};
use crate::status::Status;
use crate::util::round_tenth;

/// User-facing phase name; `None` means the angle was not detected.
pub fn phase_label(phase: Option<Phase>) -> &'static str {
    match phase {
        Some(Phase::Neutral) => "Neutral",
        Some(Phase::UpPhase) => "Up Phase",
        Some(Phase::DownPhase) => "Down Phase",
        None => "No Detection",
    }
}

/// Short coaching text for the current phase.
pub fn feedback(phase: Option<Phase>, limb: Limb, joint: Joint) -> String {
    match phase {
        None => format!("{} {} not visible", limb.title(), joint),
        Some(Phase::Neutral) => format!("Ready: start moving the {limb} {joint}"),
        Some(Phase::UpPhase) => "Lifting: keep going to the top".to_string(),
        Some(Phase::DownPhase) => "Lowering: control the way down".to_string(),
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(phase_label(Some(*self)))
    }
}

impl fmt::Display for RepEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepEvent::Started { angle } => write!(f, "started at {:.1}°", angle),
            RepEvent::PeakReached { peak } => write!(f, "peak reached at {:.1}°", peak),
            RepEvent::Resumed { angle } => write!(f, "resumed at {:.1}°", angle),
            RepEvent::Completed(rep) => write!(
                f,
                "rep completed: {:.1}° to {:.1}° in {:.1}s",
                rep.min_angle,
                rep.max_angle,
                rep.duration().as_secs_f32()
            ),
            RepEvent::Discarded { range_of_motion } => {
                write!(f, "discarded: range {:.1}° too small", range_of_motion)
            }
        }
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "reps: {}  avg duration: {:.1}s  avg range: {:.1}°  last rep: {:.1}s",
            self.total_reps,
            round_tenth(self.avg_duration.as_secs_f32()),
            round_tenth(self.avg_range_of_motion),
            round_tenth(self.last_rep_duration.as_secs_f32()),
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) reps={} phase={}",
            self.exercise,
            self.limb,
            self.rep_count,
            phase_label(self.phase)
        )?;
        if let Some(a) = self.current_angle {
            write!(f, " angle={:.1}", round_tenth(a))?;
        }
        if let Some(p) = self.peak_angle {
            write!(f, " peak={:.1}", round_tenth(p))?;
        }
        if let Some(v) = self.valley_angle {
            write!(f, " valley={:.1}", round_tenth(v))?;
        }
        write!(f, " | {}", self.feedback)
    }
}
