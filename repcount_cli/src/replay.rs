//! Recording replay: config mapping, session assembly, and the frame loop.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use eyre::WrapErr;
use repcount_config::{AngleRecord, Config};
use repcount_core::{
    CompletedRep, DetectorConfig, Limb, MovementCfg, RepEvent, Stats, Status, WorkoutSession,
};
use repcount_traits::{Clock, ManualClock, MonotonicClock};
use serde_json::json;

/// Replay options after CLI/config defaults have been applied.
#[derive(Debug, Clone)]
pub struct ReplayOpts {
    pub exercise: String,
    pub limb: Limb,
    pub frame_ms: u64,
    pub events: bool,
    pub realtime: bool,
}

impl ReplayOpts {
    /// Fill unset CLI options from the `[session]` table.
    pub fn resolve(
        cfg: &Config,
        exercise: Option<String>,
        limb: Option<&str>,
        frame_ms: Option<u64>,
        events: bool,
        realtime: bool,
    ) -> eyre::Result<Self> {
        let limb: Limb = limb.unwrap_or(&cfg.session.limb).parse()?;
        let frame_ms = frame_ms.unwrap_or(cfg.session.frame_ms);
        if frame_ms == 0 {
            eyre::bail!("--frame-ms must be >= 1");
        }
        Ok(Self {
            exercise: exercise.unwrap_or_else(|| cfg.session.exercise.clone()),
            limb,
            frame_ms,
            events,
            realtime,
        })
    }
}

/// What a replay produced.
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    pub exercise: String,
    pub limb: Limb,
    pub frames: usize,
    pub missed_frames: usize,
    pub interrupted: bool,
    pub stats: Stats,
    pub reps: Vec<CompletedRep>,
}

/// Build a session holding every effective profile, with `active`/`limb` selected.
pub fn build_session<C: Clock + Send + Sync + 'static>(
    cfg: &Config,
    active: &str,
    limb: Limb,
    clock: C,
) -> eyre::Result<WorkoutSession> {
    let exercises: Vec<DetectorConfig> = cfg.profiles().iter().map(DetectorConfig::from).collect();
    WorkoutSession::builder()
        .exercises(exercises)
        .movement(MovementCfg::from(&cfg.movement))
        .active(active)
        .limb(limb)
        .clock(clock)
        .build()
}

/// Load `input` and feed it through the active detector.
pub fn run_replay(
    cfg: &Config,
    input: &Path,
    opts: &ReplayOpts,
    json_out: bool,
    shutdown: Arc<AtomicBool>,
) -> eyre::Result<ReplayOutcome> {
    let records = repcount_config::load_recording(input, opts.frame_ms)
        .wrap_err_with(|| format!("failed to load recording {}", input.display()))?;
    tracing::info!(
        input = %input.display(),
        frames = records.len(),
        exercise = %opts.exercise,
        limb = %opts.limb,
        realtime = opts.realtime,
        "replay start"
    );

    let outcome = if opts.realtime {
        let mut session =
            build_session(cfg, &opts.exercise, opts.limb, MonotonicClock::new())?;
        let mut prev_t: Option<u64> = None;
        feed(&mut session, &records, opts, json_out, &shutdown, |rec| {
            let gap = prev_t.map_or(rec.t_ms, |p| rec.t_ms.saturating_sub(p));
            prev_t = Some(rec.t_ms);
            std::thread::sleep(Duration::from_millis(gap));
        })
    } else {
        let clock = ManualClock::new();
        let mut session = build_session(cfg, &opts.exercise, opts.limb, clock.clone())?;
        feed(&mut session, &records, opts, json_out, &shutdown, |rec| {
            clock.set_offset(Duration::from_millis(rec.t_ms));
        })
    };

    tracing::info!(
        reps = outcome.stats.total_reps,
        frames = outcome.frames,
        missed = outcome.missed_frames,
        interrupted = outcome.interrupted,
        "replay complete"
    );
    Ok(outcome)
}

/// Frame loop shared by both clock modes; `pace` runs before each frame.
fn feed(
    session: &mut WorkoutSession,
    records: &[AngleRecord],
    opts: &ReplayOpts,
    json_out: bool,
    shutdown: &AtomicBool,
    mut pace: impl FnMut(&AngleRecord),
) -> ReplayOutcome {
    let mut frames = 0usize;
    let mut missed = 0usize;
    let mut interrupted = false;

    for rec in records {
        if shutdown.load(Ordering::Relaxed) {
            tracing::warn!(t_ms = rec.t_ms, "replay interrupted");
            interrupted = true;
            break;
        }
        pace(rec);
        let Some(status) = session.update_frame(&rec.angles) else {
            continue;
        };
        frames += 1;
        if !status.detected() {
            missed += 1;
        }
        if opts.events
            && let Some(ev) = status.event
        {
            print_event(rec.t_ms, &status, &ev, json_out);
        }
    }

    let det = session.active();
    ReplayOutcome {
        exercise: det.config().exercise.clone(),
        limb: det.limb(),
        frames,
        missed_frames: missed,
        interrupted,
        stats: det.get_stats(),
        reps: det.reps().to_vec(),
    }
}

fn event_kind(ev: &RepEvent) -> &'static str {
    match ev {
        RepEvent::Started { .. } => "started",
        RepEvent::PeakReached { .. } => "peak_reached",
        RepEvent::Resumed { .. } => "resumed",
        RepEvent::Completed(_) => "completed",
        RepEvent::Discarded { .. } => "discarded",
    }
}

fn print_event(t_ms: u64, status: &Status, ev: &RepEvent, json_out: bool) {
    if !json_out {
        println!(
            "[{t_ms:>7} ms] {} ({}) {ev} (reps={})",
            status.exercise, status.limb, status.rep_count
        );
        return;
    }
    let detail = match ev {
        RepEvent::Started { angle } | RepEvent::Resumed { angle } => json!({ "angle": angle }),
        RepEvent::PeakReached { peak } => json!({ "peak": peak }),
        RepEvent::Completed(rep) => rep_json(rep),
        RepEvent::Discarded { range_of_motion } => {
            json!({ "range_of_motion": range_of_motion })
        }
    };
    println!(
        "{}",
        json!({
            "t_ms": t_ms,
            "exercise": status.exercise,
            "limb": status.limb.as_str(),
            "event": event_kind(ev),
            "detail": detail,
            "rep_count": status.rep_count,
        })
    );
}

fn rep_json(rep: &CompletedRep) -> serde_json::Value {
    json!({
        "started_ms": rep.started_at.as_millis() as u64,
        "ended_ms": rep.ended_at.as_millis() as u64,
        "duration_ms": rep.duration().as_millis() as u64,
        "max_angle": rep.max_angle,
        "min_angle": rep.min_angle,
        "range_of_motion": rep.range_of_motion(),
    })
}

/// Final summary: one JSON object, or a short text block.
pub fn print_summary(out: &ReplayOutcome, json_out: bool) {
    if json_out {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        let reps: Vec<_> = out.reps.iter().map(rep_json).collect();
        println!(
            "{}",
            json!({
                "timestamp": ts,
                "exercise": out.exercise,
                "limb": out.limb.as_str(),
                "frames": out.frames,
                "missed_frames": out.missed_frames,
                "interrupted": out.interrupted,
                "total_reps": out.stats.total_reps,
                "avg_duration_ms": out.stats.avg_duration.as_millis() as u64,
                "avg_range_of_motion": out.stats.avg_range_of_motion,
                "last_rep_duration_ms": out.stats.last_rep_duration.as_millis() as u64,
                "reps": reps,
            })
        );
        return;
    }
    println!("{} ({})", out.exercise, out.limb);
    println!("{}", out.stats);
    println!(
        "frames: {}  no detection: {}{}",
        out.frames,
        out.missed_frames,
        if out.interrupted { "  (interrupted)" } else { "" }
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_falls_back_to_session_table() {
        let cfg = Config::default();
        let opts = ReplayOpts::resolve(&cfg, None, None, None, false, false).unwrap();
        assert_eq!(opts.exercise, "shoulder_abduction");
        assert_eq!(opts.limb, Limb::Right);
        assert_eq!(opts.frame_ms, 33);

        let opts =
            ReplayOpts::resolve(&cfg, Some("elbow_curl".into()), Some("LEFT"), Some(40), true, false)
                .unwrap();
        assert_eq!(opts.exercise, "elbow_curl");
        assert_eq!(opts.limb, Limb::Left);
        assert_eq!(opts.frame_ms, 40);
    }

    #[test]
    fn resolve_rejects_bad_limb_and_zero_frame_ms() {
        let cfg = Config::default();
        let err = ReplayOpts::resolve(&cfg, None, Some("middle"), None, false, false).unwrap_err();
        assert!(
            err.downcast_ref::<repcount_core::DetectorError>().is_some(),
            "{err}"
        );
        let err = ReplayOpts::resolve(&cfg, None, None, Some(0), false, false).unwrap_err();
        assert!(err.to_string().contains("--frame-ms"));
    }

    #[test]
    fn session_includes_configured_profiles() {
        let cfg = repcount_config::load_toml(
            r#"
[[exercise]]
name = "knee_raise"
joint = "knee"
min_angle_deg = 10.0
max_angle_deg = 120.0
min_range_of_motion_deg = 30.0
"#,
        )
        .unwrap();
        let s = build_session(&cfg, "knee_raise", Limb::Left, ManualClock::new()).unwrap();
        assert_eq!(s.active().angle_key(), "left_knee");
        assert_eq!(s.exercise_names().count(), 3);
    }
}
