use std::time::Duration;

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use repcount_core::{DetectorConfig, Limb, RepDetector};
use repcount_traits::ManualClock;

// Synthetic abduction trace: slow raise/lower cycles with additive noise
fn synth_trace(n: usize, noise_amp: f32, seed: u32) -> Vec<f32> {
    // tiny PRNG
    let mut state = seed.max(1);
    let mut next_f32 = || {
        let mut x = state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        state = x;
        (x as f32) / (u32::MAX as f32 + 1.0)
    };
    (0..n)
        .map(|i| {
            let t = i as f32 / 20.0;
            let base = 95.0 - 80.0 * t.cos(); // 15..175 deg
            base + (next_f32() * 2.0 - 1.0) * noise_amp
        })
        .collect()
}

pub fn bench_update(c: &mut Criterion) {
    let mut g = c.benchmark_group("detector_update");
    // Allow quick tweaking without CLI flags (Criterion 0.5):
    //   BENCH_SAMPLE_SIZE=10 cargo bench -p repcount_core --bench detector_update
    if let Some(n) = std::env::var("BENCH_SAMPLE_SIZE")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
    {
        g.sample_size(n.max(1));
    } else {
        g.sample_size(50);
    }

    let trace = synth_trace(4_096, 1.5, 0x5eed);
    g.bench_function("update_4096_frames", |b| {
        b.iter_batched(
            || {
                let clock = ManualClock::new();
                let det = RepDetector::builder()
                    .config(DetectorConfig::shoulder_abduction())
                    .limb(Limb::Right)
                    .clock(clock.clone())
                    .try_build()
                    .unwrap();
                (det, clock)
            },
            |(mut det, clock)| {
                for &a in &trace {
                    clock.advance(Duration::from_millis(33));
                    black_box(det.update(Some(a)));
                }
                det.rep_count()
            },
            BatchSize::SmallInput,
        )
    });
    g.finish();
}

criterion_group!(benches, bench_update);
criterion_main!(benches);
