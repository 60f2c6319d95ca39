//! Phase state machine for one (exercise, limb) detector.
//!
//! ```text
//! Neutral --up confirmed && angle > start--> UpPhase
//! UpPhase --down confirmed || angle > max--> DownPhase
//! DownPhase --angle <= rest--> Neutral   (commit or discard the candidate)
//! DownPhase --up confirmed--> UpPhase    (same candidate)
//! ```
//!
//! Every transition is gated by a minimum dwell in the current phase.

use std::time::Duration;

use crate::config::DetectorConfig;
use crate::ledger::CompletedRep;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Neutral,
    UpPhase,
    DownPhase,
}

/// An in-progress repetition attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepCandidate {
    pub started_at: Duration,
    pub peak_angle: f32,
    pub valley_angle: f32,
}

impl RepCandidate {
    #[inline]
    pub fn range_of_motion(&self) -> f32 {
        self.peak_angle - self.valley_angle
    }
}

/// Rep lifecycle event produced by a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RepEvent {
    /// Neutral -> UpPhase; a candidate was opened at `angle`.
    Started { angle: f32 },
    /// UpPhase -> DownPhase; the candidate's peak is frozen.
    PeakReached { peak: f32 },
    /// DownPhase -> UpPhase; peak tracking resumes on the same candidate.
    Resumed { angle: f32 },
    /// DownPhase -> Neutral with enough range of motion.
    Completed(CompletedRep),
    /// DownPhase -> Neutral without enough range of motion.
    Discarded { range_of_motion: f32 },
}

/// Confirmed-direction inputs for one evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Confirmed {
    pub up: bool,
    pub down: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PhaseMachine {
    phase: Phase,
    entered_at: Duration,
    candidate: Option<RepCandidate>,
}

impl PhaseMachine {
    pub fn new(at: Duration) -> Self {
        Self {
            entered_at: at,
            ..Self::default()
        }
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn candidate(&self) -> Option<&RepCandidate> {
        self.candidate.as_ref()
    }

    /// When the current phase was entered.
    #[inline]
    pub fn entered_at(&self) -> Duration {
        self.entered_at
    }

    /// Phase the machine would move to, ignoring dwell.
    pub fn next_phase(&self, angle: f32, confirmed: Confirmed, cfg: &DetectorConfig) -> Phase {
        match self.phase {
            Phase::Neutral if confirmed.up && angle > cfg.start_threshold() => Phase::UpPhase,
            Phase::UpPhase if confirmed.down || angle > cfg.max_angle_threshold => {
                Phase::DownPhase
            }
            Phase::DownPhase if angle <= cfg.rest_threshold() => Phase::Neutral,
            Phase::DownPhase if confirmed.up => Phase::UpPhase,
            p => p,
        }
    }

    /// Evaluate one sample at time `at`.
    ///
    /// No transition is considered until `dwell` has elapsed in the current
    /// phase. Peak (UpPhase) and valley (DownPhase) tracking runs afterwards
    /// either way. Returns the event when a transition happened.
    pub fn step(
        &mut self,
        at: Duration,
        dwell: Duration,
        angle: f32,
        confirmed: Confirmed,
        cfg: &DetectorConfig,
    ) -> Option<RepEvent> {
        let mut event = None;
        if at.saturating_sub(self.entered_at) >= dwell {
            let next = self.next_phase(angle, confirmed, cfg);
            if next != self.phase {
                event = self.transition(next, at, angle, cfg);
            }
        }
        self.track(angle);
        event
    }

    fn transition(
        &mut self,
        next: Phase,
        at: Duration,
        angle: f32,
        cfg: &DetectorConfig,
    ) -> Option<RepEvent> {
        tracing::debug!(from = ?self.phase, to = ?next, angle, "phase transition");
        let event = match (self.phase, next) {
            (Phase::Neutral, Phase::UpPhase) => {
                self.candidate = Some(RepCandidate {
                    started_at: at,
                    peak_angle: angle,
                    valley_angle: angle,
                });
                Some(RepEvent::Started { angle })
            }
            (Phase::DownPhase, Phase::UpPhase) => Some(RepEvent::Resumed { angle }),
            (Phase::UpPhase, Phase::DownPhase) => self
                .candidate
                .map(|c| RepEvent::PeakReached { peak: c.peak_angle }),
            (Phase::DownPhase, Phase::Neutral) => self.candidate.take().map(|c| {
                let range_of_motion = c.range_of_motion();
                if range_of_motion > cfg.min_range_of_motion {
                    RepEvent::Completed(CompletedRep {
                        started_at: c.started_at,
                        ended_at: at,
                        max_angle: c.peak_angle,
                        min_angle: c.valley_angle,
                    })
                } else {
                    RepEvent::Discarded { range_of_motion }
                }
            }),
            _ => None,
        };
        self.phase = next;
        self.entered_at = at;
        event
    }

    fn track(&mut self, angle: f32) {
        if let Some(c) = self.candidate.as_mut() {
            match self.phase {
                Phase::UpPhase => c.peak_angle = c.peak_angle.max(angle),
                Phase::DownPhase => c.valley_angle = c.valley_angle.min(angle),
                Phase::Neutral => {}
            }
        }
    }

    pub fn reset(&mut self, at: Duration) {
        *self = Self::new(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const UP: Confirmed = Confirmed {
        up: true,
        down: false,
    };
    const DOWN: Confirmed = Confirmed {
        up: false,
        down: true,
    };
    const NONE: Confirmed = Confirmed {
        up: false,
        down: false,
    };

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn machine_in(phase: Phase) -> PhaseMachine {
        PhaseMachine {
            phase,
            entered_at: Duration::ZERO,
            candidate: Some(RepCandidate {
                started_at: Duration::ZERO,
                peak_angle: 120.0,
                valley_angle: 40.0,
            }),
        }
    }

    #[rstest]
    #[case::start_needs_margin(Phase::Neutral, 35.0, UP, Phase::Neutral)]
    #[case::start(Phase::Neutral, 35.5, UP, Phase::UpPhase)]
    #[case::start_needs_confirmation(Phase::Neutral, 90.0, NONE, Phase::Neutral)]
    #[case::peak_by_direction(Phase::UpPhase, 120.0, DOWN, Phase::DownPhase)]
    #[case::peak_by_max(Phase::UpPhase, 180.5, NONE, Phase::DownPhase)]
    #[case::at_max_stays(Phase::UpPhase, 180.0, NONE, Phase::UpPhase)]
    #[case::rest_inclusive(Phase::DownPhase, 30.0, NONE, Phase::Neutral)]
    #[case::rest_beats_resume(Phase::DownPhase, 25.0, UP, Phase::Neutral)]
    #[case::resume(Phase::DownPhase, 60.0, UP, Phase::UpPhase)]
    #[case::down_holds(Phase::DownPhase, 60.0, DOWN, Phase::DownPhase)]
    fn transition_table(
        #[case] from: Phase,
        #[case] angle: f32,
        #[case] confirmed: Confirmed,
        #[case] want: Phase,
    ) {
        let cfg = DetectorConfig::shoulder_abduction();
        assert_eq!(machine_in(from).next_phase(angle, confirmed, &cfg), want);
    }

    #[test]
    fn dwell_blocks_transitions() {
        let cfg = DetectorConfig::shoulder_abduction();
        let mut m = PhaseMachine::new(ms(0));
        assert_eq!(m.step(ms(150), ms(200), 70.0, UP, &cfg), None);
        assert_eq!(m.phase(), Phase::Neutral);
        assert_eq!(
            m.step(ms(200), ms(200), 70.0, UP, &cfg),
            Some(RepEvent::Started { angle: 70.0 })
        );
        assert_eq!(m.phase(), Phase::UpPhase);
        assert_eq!(m.entered_at(), ms(200));
    }

    #[test]
    fn full_cycle_commits_rep() {
        let cfg = DetectorConfig::shoulder_abduction();
        let dwell = ms(100);
        let mut m = PhaseMachine::new(ms(0));
        m.step(ms(100), dwell, 50.0, UP, &cfg);
        m.step(ms(150), dwell, 120.0, NONE, &cfg);
        assert_eq!(m.candidate().map(|c| c.peak_angle), Some(120.0));
        assert_eq!(
            m.step(ms(200), dwell, 110.0, DOWN, &cfg),
            Some(RepEvent::PeakReached { peak: 120.0 })
        );
        // peak is frozen while descending
        m.step(ms(250), dwell, 100.0, DOWN, &cfg);
        assert_eq!(m.candidate().map(|c| c.peak_angle), Some(120.0));
        m.step(ms(280), dwell, 15.0, NONE, &cfg);
        assert_eq!(m.phase(), Phase::DownPhase);
        let ev = m.step(ms(300), dwell, 18.0, NONE, &cfg);
        assert_eq!(
            ev,
            Some(RepEvent::Completed(CompletedRep {
                started_at: ms(100),
                ended_at: ms(300),
                max_angle: 120.0,
                min_angle: 15.0,
            }))
        );
        assert_eq!(m.phase(), Phase::Neutral);
        assert!(m.candidate().is_none());
    }

    #[test]
    fn small_range_is_discarded() {
        let cfg = DetectorConfig::shoulder_abduction();
        let mut m = PhaseMachine::new(ms(0));
        m.step(ms(0), ms(0), 40.0, UP, &cfg);
        m.step(ms(10), ms(0), 50.0, NONE, &cfg);
        m.step(ms(20), ms(0), 45.0, DOWN, &cfg);
        let ev = m.step(ms(30), ms(0), 20.0, NONE, &cfg);
        assert_eq!(
            ev,
            Some(RepEvent::Discarded {
                range_of_motion: 10.0
            })
        );
        assert_eq!(m.phase(), Phase::Neutral);
    }

    #[test]
    fn resume_keeps_candidate() {
        let cfg = DetectorConfig::shoulder_abduction();
        let mut m = machine_in(Phase::DownPhase);
        let ev = m.step(ms(500), ms(200), 70.0, UP, &cfg);
        assert_eq!(ev, Some(RepEvent::Resumed { angle: 70.0 }));
        assert_eq!(m.candidate().map(|c| c.valley_angle), Some(40.0));
        m.step(ms(550), ms(200), 150.0, NONE, &cfg);
        assert_eq!(m.candidate().map(|c| c.peak_angle), Some(150.0));
    }
}
