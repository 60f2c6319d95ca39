//! Human-readable error descriptions and structured JSON error formatting.

use repcount_core::error::{BuildError, DetectorError};

/// Every message in the report's chain, outermost first, joined with ": ".
fn chain_text(err: &eyre::Report) -> String {
    err.chain()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(": ")
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingExercise => {
                "What happened: No exercise profile was available to build a detector.\nLikely causes: The session was assembled without any profiles.\nHow to fix: Keep the built-in profiles or add an [[exercise]] table to the config.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid detector configuration ({msg}).\nLikely causes: Out-of-range values in an [[exercise]] or [movement] table.\nHow to fix: Edit the config file, then run `repcount self-check`."
            ),
        };
    }

    if let Some(de) = err.downcast_ref::<DetectorError>() {
        return match de {
            DetectorError::InvalidLimb(limb) => format!(
                "What happened: '{limb}' is not a limb.\nLikely causes: A typo in --limb or session.limb.\nHow to fix: Use left or right."
            ),
            DetectorError::UnknownExercise(name) => format!(
                "What happened: No exercise profile is named '{name}'.\nLikely causes: A typo in --exercise or session.exercise, or a profile missing from the config.\nHow to fix: Run `repcount profiles` to list the available exercises."
            ),
            DetectorError::Config(msg) => format!(
                "What happened: {msg}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from the config and recording loaders
    let msg = chain_text(err);
    let lower = msg.to_ascii_lowercase();

    if lower.contains("failed to parse config") {
        return format!(
            "What happened: The config file is not valid TOML for repcount.\nLikely causes: A syntax error, a misspelled key, or a value of the wrong type.\nHow to fix: Fix the file and run `repcount self-check`. Details: {msg}"
        );
    }

    if lower.contains("invalid configuration") {
        let detail = err.root_cause().to_string();
        return format!(
            "What happened: Configuration is invalid ({detail}).\nLikely causes: A missing or out-of-range value.\nHow to fix: Edit the TOML config and try again."
        );
    }

    if lower.contains("angle csv must have headers") {
        return "Invalid headers in angle CSV. Expected 't_ms' followed by angle keys such as 'right_shoulder'.".to_string();
    }

    if lower.contains("unsupported recording format") {
        return "What happened: The recording format is not supported.\nLikely causes: The input file does not end in .csv or .json.\nHow to fix: Export the recording as CSV (t_ms,<angle key>...) or pose recorder JSON.".to_string();
    }

    if lower.contains("failed to load recording") {
        let detail = err.root_cause().to_string();
        return format!(
            "What happened: The recording could not be read ({detail}).\nLikely causes: Wrong path, malformed rows, or angle keys that are not <left|right>_<joint>.\nHow to fix: Check the file, then rerun."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingExercise => "MissingExercise",
            BuildError::InvalidConfig(_) => "InvalidConfig",
        };
    }
    if let Some(de) = err.downcast_ref::<DetectorError>() {
        return match de {
            DetectorError::InvalidLimb(_) => "InvalidLimb",
            DetectorError::UnknownExercise(_) => "UnknownExercise",
            DetectorError::Config(_) => "Config",
        };
    }
    "Error"
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    json!({
        "reason": reason_name(err),
        "message": humanize(err),
        "detail": err.root_cause().to_string(),
    })
    .to_string()
}
