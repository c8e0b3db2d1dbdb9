//! Human-readable error descriptions, exit codes and structured JSON errors.

use thermo_core::{ForecastError, PipelineError};
use thermo_model::ModelError;

/// Problems with the config file or flags detected before any data is read.
#[derive(Debug, thiserror::Error)]
#[error("invalid configuration: {0}")]
pub struct ConfigError(pub String);

pub const EXIT_GENERIC: i32 = 1;
pub const EXIT_INSUFFICIENT_HISTORY: i32 = 3;
pub const EXIT_CONFIG: i32 = 4;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(ce) = err.downcast_ref::<ConfigError>() {
        return format!(
            "What happened: Invalid configuration ({}).\nLikely causes: Missing or out-of-range values in the TOML or on the command line.\nHow to fix: Edit the config file (see etc/thermocast.toml for a sample), then rerun.",
            ce.0
        );
    }

    if let Some(uc) = err.downcast_ref::<thermo_config::UnresolvedColumn>() {
        return format!(
            "What happened: The readings CSV has no temperature column.\nLikely causes: Header names differ from the accepted synonyms ({}); found: {}.\nHow to fix: Rename the value column to `temperature` (or a synonym) and rerun.",
            uc.expected, uc.found
        );
    }

    if let Some(pe) = err.downcast_ref::<PipelineError>() {
        return match pe {
            PipelineError::Config(msg) => format!(
                "What happened: Invalid pipeline setup ({msg}).\nLikely causes: No input given and no data.path configured, or unusable columns.\nHow to fix: Pass --input or set data.path in the config."
            ),
            PipelineError::MissingColumn(col) => format!(
                "What happened: Required column `{col}` is missing.\nLikely causes: The CSV has no timestamp column, so readings cannot be ordered.\nHow to fix: Add a `recorded_time` (or `timestamp`/`time`) column."
            ),
            PipelineError::InvalidData(msg) => format!(
                "What happened: Input data is invalid ({msg}).\nLikely causes: Unparsable timestamps, non-numeric temperatures or rows without a timestamp.\nHow to fix: Clean the offending rows and rerun; --log-level=debug shows more context."
            ),
            PipelineError::Io(msg) => format!(
                "What happened: Could not read input ({msg}).\nLikely causes: Wrong path or missing permissions.\nHow to fix: Check the --input path."
            ),
            PipelineError::Unready(step) => format!(
                "What happened: Pipeline steps ran out of order ({step}).\nLikely causes: Internal sequencing bug.\nHow to fix: Re-run with --log-level=debug and report the log."
            ),
        };
    }

    if let Some(fe) = err.downcast_ref::<ForecastError>() {
        return match fe {
            ForecastError::InsufficientHistory => "What happened: No readings available to forecast from.\nLikely causes: The input CSV is empty or every row lacks a timestamp or value.\nHow to fix: Point --input at a CSV with at least one complete reading.".to_string(),
            ForecastError::InvalidHorizons(msg) => format!(
                "What happened: Invalid forecast horizons ({msg}).\nLikely causes: Empty, zero or unsorted --horizons or forecast.horizons.\nHow to fix: Use strictly increasing positive minutes, e.g. --horizons 15,30,45,60."
            ),
            ForecastError::Model(msg) => format!(
                "What happened: The model failed to predict ({msg}).\nLikely causes: The artifact was trained on a different feature set or is corrupt.\nHow to fix: Retrain with `thermocast train` and pass the new model.json."
            ),
        };
    }

    if let Some(me) = err.downcast_ref::<ModelError>() {
        return format!(
            "What happened: Model training failed ({me}).\nLikely causes: Too few rows survived preprocessing, or invalid [model] settings.\nHow to fix: Provide more history or relax [preprocess]/[data] filters, then retrain."
        );
    }

    // String-based heuristics for errors coming from init or artifact IO
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("invalid csv row") {
        return format!(
            "What happened: A CSV row could not be parsed.\nLikely causes: Unparsable timestamp or non-numeric temperature.\nHow to fix: Fix the row reported here and rerun. Original: {msg}"
        );
    }

    if lower.contains("model artifact") {
        return format!(
            "What happened: The model file could not be used.\nLikely causes: Wrong path, a file not written by `thermocast train`, or an incompatible version.\nHow to fix: Retrain and pass the new model.json. Original: {msg}"
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

pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if matches!(
        err.downcast_ref::<ForecastError>(),
        Some(ForecastError::InsufficientHistory)
    ) {
        return EXIT_INSUFFICIENT_HISTORY;
    }
    if err.downcast_ref::<ConfigError>().is_some()
        || err.downcast_ref::<thermo_config::UnresolvedColumn>().is_some()
        || matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::Config(_))
        )
        || matches!(
            err.downcast_ref::<ForecastError>(),
            Some(ForecastError::InvalidHorizons(_))
        )
    {
        return EXIT_CONFIG;
    }
    EXIT_GENERIC
}

fn reason_name(err: &eyre::Report) -> &'static str {
    match exit_code_for_error(err) {
        EXIT_INSUFFICIENT_HISTORY => "InsufficientHistory",
        EXIT_CONFIG => "Config",
        _ if err.downcast_ref::<PipelineError>().is_some() => "Pipeline",
        _ if err.downcast_ref::<ForecastError>().is_some() => "Forecast",
        _ if err.downcast_ref::<ModelError>().is_some() => "Model",
        _ => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}
