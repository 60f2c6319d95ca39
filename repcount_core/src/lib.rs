#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Exercise repetition detection engine.
//!
//! Turns a noisy, variable-rate joint-angle stream into counted repetitions.
//! Time is read through `repcount_traits::Clock`, so tests and replays can
//! drive it deterministically.
//!
//! ## Architecture
//!
//! - **History**: fixed-capacity window of recent samples (`history` module)
//! - **Movement**: fast/slow direction classifier with decaying drift (`movement` module)
//! - **Gate**: direction must persist N classifications before it counts (`gate` module)
//! - **Phase**: Neutral / Up / Down state machine with dwell time (`phase` module)
//! - **Ledger**: completed reps and aggregate stats (`ledger` module)
//! - **Detector**: the per-(exercise, limb) facade (`RepDetector`)
//! - **Session**: all detectors of a workout plus the active selection (`WorkoutSession`)
//!
//! ## Example
//!
//! ```
//! use repcount_core::{DetectorConfig, Limb, RepDetector};
//! use repcount_traits::ManualClock;
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let mut det = RepDetector::builder()
//!     .config(DetectorConfig::shoulder_abduction())
//!     .limb(Limb::Right)
//!     .clock(clock.clone())
//!     .try_build()
//!     .unwrap();
//! for angle in [20.0, 20.0, 25.0, 40.0, 70.0, 100.0, 140.0, 175.0, 140.0, 100.0, 60.0, 30.0,
//!               18.0, 18.0, 18.0, 18.0, 18.0] {
//!     clock.advance(Duration::from_millis(30));
//!     det.update(Some(angle));
//! }
//! assert_eq!(det.get_stats().total_reps, 1);
//! ```

pub mod builder;
pub mod config;
pub mod conversions;
pub mod detector;
pub mod display;
pub mod error;
pub mod gate;
pub mod history;
pub mod ledger;
pub mod movement;
pub mod phase;
pub mod session;
pub mod status;
pub mod util;

pub use builder::DetectorBuilder;
pub use config::{DetectorConfig, Joint, Limb, MovementCfg, angle_key};
pub use detector::RepDetector;
pub use display::{feedback, phase_label};
pub use error::{BuildError, DetectorError, Result};
pub use ledger::{CompletedRep, RepLedger, Stats};
pub use movement::{Direction, MovementState};
pub use phase::{Phase, RepCandidate, RepEvent};
pub use session::{WorkoutSession, WorkoutSessionBuilder};
pub use status::{Diagnostics, Status};
