//! Completed repetitions and aggregate statistics.

use std::time::Duration;

/// One counted repetition. Times are offsets from the detector's epoch
/// (construction or last reset).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletedRep {
    pub started_at: Duration,
    pub ended_at: Duration,
    pub max_angle: f32,
    pub min_angle: f32,
}

impl CompletedRep {
    #[inline]
    pub fn duration(&self) -> Duration {
        self.ended_at.saturating_sub(self.started_at)
    }

    #[inline]
    pub fn range_of_motion(&self) -> f32 {
        self.max_angle - self.min_angle
    }
}

/// Aggregates over the ledger; all zero when no rep was counted.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Stats {
    pub total_reps: usize,
    pub avg_duration: Duration,
    pub avg_range_of_motion: f32,
    pub last_rep_duration: Duration,
}

/// Append-only list of completed reps; cleared only by a detector reset.
#[derive(Debug, Clone, Default)]
pub struct RepLedger {
    reps: Vec<CompletedRep>,
}

impl RepLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rep: CompletedRep) {
        self.reps.push(rep);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.reps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.reps.is_empty()
    }

    pub fn as_slice(&self) -> &[CompletedRep] {
        &self.reps
    }

    pub fn last(&self) -> Option<&CompletedRep> {
        self.reps.last()
    }

    pub(crate) fn clear(&mut self) {
        self.reps.clear();
    }

    pub fn stats(&self) -> Stats {
        let Some(last) = self.reps.last() else {
            return Stats::default();
        };
        let n = self.reps.len();
        let total: Duration = self.reps.iter().map(CompletedRep::duration).sum();
        let rom: f32 = self.reps.iter().map(CompletedRep::range_of_motion).sum();
        Stats {
            total_reps: n,
            avg_duration: total.div_f64(n as f64),
            avg_range_of_motion: rom / n as f32,
            last_rep_duration: last.duration(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rep(start_ms: u64, end_ms: u64, max: f32, min: f32) -> CompletedRep {
        CompletedRep {
            started_at: Duration::from_millis(start_ms),
            ended_at: Duration::from_millis(end_ms),
            max_angle: max,
            min_angle: min,
        }
    }

    #[test]
    fn empty_ledger_stats_are_zero() {
        assert_eq!(RepLedger::new().stats(), Stats::default());
    }

    #[test]
    fn stats_average_over_reps() {
        let mut l = RepLedger::new();
        l.push(rep(0, 1000, 170.0, 20.0));
        l.push(rep(2000, 4000, 160.0, 30.0));
        let s = l.stats();
        assert_eq!(s.total_reps, 2);
        assert_eq!(s.avg_duration, Duration::from_millis(1500));
        assert_eq!(s.last_rep_duration, Duration::from_secs(2));
        assert!((s.avg_range_of_motion - 140.0).abs() < 1e-4);
    }

    #[test]
    fn duration_never_negative() {
        assert_eq!(rep(500, 100, 90.0, 10.0).duration(), Duration::ZERO);
    }
}
