//! Small numeric and time helpers for repcount_core.

use std::time::Duration;

/// `pct` percent of `d`, truncated to whole nanoseconds.
///
/// Integer arithmetic keeps dwell comparisons exact at millisecond boundaries.
#[inline]
pub fn pct_of(d: Duration, pct: u32) -> Duration {
    d.saturating_mul(pct) / 100
}

/// Round to one decimal place, as shown to the user.
#[inline]
pub fn round_tenth(x: f32) -> f32 {
    (x * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pct_of_is_exact_for_whole_millis() {
        assert_eq!(
            pct_of(Duration::from_millis(200), 60),
            Duration::from_millis(120)
        );
        assert_eq!(
            pct_of(Duration::from_millis(200), 100),
            Duration::from_millis(200)
        );
    }

    #[test]
    fn round_tenth_rounds_half_away_from_zero() {
        assert_eq!(round_tenth(174.96), 175.0);
        assert_eq!(round_tenth(2.25), 2.3);
        assert_eq!(round_tenth(-2.25), -2.3);
    }
}
