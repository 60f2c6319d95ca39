//! Loaders for recorded angle streams.
//!
//! Two formats are accepted:
//! - CSV with headers `t_ms,<angle key>...`; an empty cell means "no reading".
//! - The pose recorder's JSON: an array of `{ "landmarks": [...], "angles": {...} }`
//!   frames without timestamps, spaced `frame_ms` apart on load.
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::is_angle_key;

/// One recorded frame: a timestamp relative to the start of the recording and
/// the named angles read in that frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleRecord {
    pub t_ms: u64,
    pub angles: BTreeMap<String, Option<f32>>,
}

#[derive(Debug, Deserialize)]
struct PoseFrame {
    // Landmarks are carried by the recorder but not needed for counting.
    #[serde(default)]
    #[allow(dead_code)]
    landmarks: Vec<Vec<f32>>,
    #[serde(default)]
    angles: BTreeMap<String, Option<f32>>,
}

/// Load a recording, picking the format from the file extension.
pub fn load_recording(path: &Path, frame_ms: u64) -> eyre::Result<Vec<AngleRecord>> {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("csv") => load_angle_csv(path),
        Some("json") => load_pose_json(path, frame_ms),
        _ => eyre::bail!("unsupported recording format {:?} (expected .csv or .json)", path),
    }
}

pub fn load_angle_csv(path: &Path) -> eyre::Result<Vec<AngleRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open angle CSV {:?}: {}", path, e))?;

    // Enforce headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual.first().map(String::as_str) != Some("t_ms") || actual.len() < 2 {
        eyre::bail!(
            "angle CSV must have headers 't_ms,<angle key>...', got: {}",
            actual.join(",")
        );
    }
    let keys = &actual[1..];
    let mut seen = HashSet::new();
    for key in keys {
        if !is_angle_key(key) {
            eyre::bail!("angle CSV header '{key}' is not a <left|right>_<joint> angle key");
        }
        if !seen.insert(key.as_str()) {
            eyre::bail!("angle CSV header '{key}' appears twice");
        }
    }

    let mut out: Vec<AngleRecord> = Vec::new();
    for (idx, rec) in rdr.records().enumerate() {
        let line = idx + 2;
        let rec = rec.map_err(|e| eyre::eyre!("invalid CSV row {}: {}", line, e))?;
        let t_ms: u64 = rec
            .get(0)
            .unwrap_or_default()
            .parse()
            .map_err(|e| eyre::eyre!("invalid CSV row {}: t_ms: {}", line, e))?;
        if let Some(prev) = out.last()
            && t_ms < prev.t_ms
        {
            eyre::bail!("invalid CSV row {line}: t_ms goes backwards ({t_ms} < {})", prev.t_ms);
        }
        let mut angles = BTreeMap::new();
        for (col, key) in keys.iter().enumerate() {
            let cell = rec.get(col + 1).unwrap_or_default();
            let value = if cell.is_empty() {
                None
            } else {
                let v: f32 = cell
                    .parse()
                    .map_err(|e| eyre::eyre!("invalid CSV row {}: {}: {}", line, key, e))?;
                if !v.is_finite() {
                    eyre::bail!("invalid CSV row {line}: {key} must be finite");
                }
                Some(v)
            };
            angles.insert(key.clone(), value);
        }
        out.push(AngleRecord { t_ms, angles });
    }
    Ok(out)
}

pub fn load_pose_json(path: &Path, frame_ms: u64) -> eyre::Result<Vec<AngleRecord>> {
    let file = File::open(path).map_err(|e| eyre::eyre!("open pose recording {:?}: {}", path, e))?;
    let frames: Vec<PoseFrame> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| eyre::eyre!("parse pose recording {:?}: {}", path, e))?;

    let mut out = Vec::with_capacity(frames.len());
    for (i, frame) in frames.into_iter().enumerate() {
        if let Some(bad) = frame.angles.keys().find(|k| !is_angle_key(k)) {
            eyre::bail!("frame {i}: '{bad}' is not a <left|right>_<joint> angle key");
        }
        if let Some((key, _)) = frame
            .angles
            .iter()
            .find(|(_, v)| v.is_some_and(|v| !v.is_finite()))
        {
            eyre::bail!("frame {i}: {key} must be finite");
        }
        out.push(AngleRecord {
            t_ms: (i as u64).saturating_mul(frame_ms),
            angles: frame.angles,
        });
    }
    Ok(out)
}
