#![no_main]
use std::time::Duration;

use libfuzzer_sys::{arbitrary, fuzz_target};
use repcount_core::{DetectorConfig, Limb, RepDetector};
use repcount_traits::ManualClock;

#[derive(Debug, arbitrary::Arbitrary)]
struct Frame {
    angle: Option<f32>,
    step_ms: u8,
}

fuzz_target!(|frames: Vec<Frame>| {
    let clock = ManualClock::new();
    let Ok(mut det) = RepDetector::builder()
        .config(DetectorConfig::shoulder_abduction())
        .limb(Limb::Left)
        .clock(clock.clone())
        .try_build()
    else {
        return;
    };
    for f in &frames {
        clock.advance(Duration::from_millis(u64::from(f.step_ms)));
        let st = det.update(f.angle);
        assert_eq!(st.rep_count, det.reps().len());
    }
    let min_rom = det.config().min_range_of_motion;
    for rep in det.reps() {
        assert!(rep.max_angle - rep.min_angle > min_rom);
    }
});
