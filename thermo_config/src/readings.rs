//! Reading CSV ingestion.
//!
//! Expected headers (any order, case-insensitive, synonyms accepted):
//! - time: `recorded_time` | `timestamp` | `time`
//! - value: `temperature` | `temp` | `value` | `svalue`
//! - sensor (optional): `sensor_id` | `sensor` | `id`
//!
//! Example:
//! sensor_id,recorded_time,temperature
//! kitchen,2025-05-06 10:00:00,24.5
use chrono::{DateTime, NaiveDateTime};
use std::io;
use std::path::Path;

const TIME_COLUMNS: [&str; 3] = ["recorded_time", "timestamp", "time"];
const VALUE_COLUMNS: [&str; 4] = ["temperature", "temp", "value", "svalue"];
const SENSOR_COLUMNS: [&str; 3] = ["sensor_id", "sensor", "id"];

/// Sensor id assigned when the CSV has no sensor column.
pub const DEFAULT_SENSOR_ID: &str = "default";

const TIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%#z"];

/// The CSV has no column resolvable as the reading value.
///
/// Raised inside the `eyre::Report` so callers can tell a configuration
/// problem from bad data by downcasting.
#[derive(Debug, thiserror::Error)]
#[error("readings CSV has no temperature column (expected one of {expected}), got: {found}")]
pub struct UnresolvedColumn {
    pub expected: String,
    pub found: String,
}

/// One ingested row. `recorded_time` is `None` only when the file has no time column.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingRecord {
    pub sensor_id: String,
    pub recorded_time: Option<NaiveDateTime>,
    /// `None` for empty / NaN cells.
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ReadingsCsv {
    /// Header actually used for time, if any was found.
    pub time_column: Option<String>,
    pub value_column: String,
    pub rows: Vec<ReadingRecord>,
}

/// Parse the timestamp layouts sensor exports and the database produce.
/// Offsets are accepted; the wall-clock time of the stated offset is kept.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.naive_local());
        }
    }
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

fn parse_value(s: &str) -> Option<Result<f64, ()>> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("null") {
        return None;
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(Ok(v)),
        _ => Some(Err(())),
    }
}

fn find_column(headers: &[String], names: &[&str]) -> Option<usize> {
    names
        .iter()
        .find_map(|name| headers.iter().position(|h| h == name))
}

/// Read readings from any CSV source with a header row.
pub fn read_readings<R: io::Read>(source: R) -> eyre::Result<ReadingsCsv> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers: {}", e))?
        .iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();

    let Some(value_idx) = find_column(&headers, &VALUE_COLUMNS) else {
        return Err(UnresolvedColumn {
            expected: VALUE_COLUMNS.join("|"),
            found: headers.join(","),
        }
        .into());
    };
    let time_idx = find_column(&headers, &TIME_COLUMNS);
    let sensor_idx = find_column(&headers, &SENSOR_COLUMNS);

    let mut rows = Vec::new();
    for (idx, rec) in rdr.records().enumerate() {
        let line = idx + 2;
        let rec = rec.map_err(|e| eyre::eyre!("invalid CSV row {}: {}", line, e))?;

        let recorded_time = match time_idx {
            Some(i) => {
                let raw = rec.get(i).unwrap_or("");
                match parse_timestamp(raw) {
                    Some(t) => Some(t),
                    None => eyre::bail!("invalid CSV row {}: unparsable timestamp {:?}", line, raw),
                }
            }
            None => None,
        };

        let raw_value = rec.get(value_idx).unwrap_or("");
        let temperature = match parse_value(raw_value) {
            None => None,
            Some(Ok(v)) => Some(v),
            Some(Err(())) => {
                eyre::bail!("invalid CSV row {}: non-numeric temperature {:?}", line, raw_value)
            }
        };

        let sensor_id = sensor_idx
            .and_then(|i| rec.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SENSOR_ID)
            .to_string();

        rows.push(ReadingRecord {
            sensor_id,
            recorded_time,
            temperature,
        });
    }

    Ok(ReadingsCsv {
        time_column: time_idx.map(|i| headers[i].clone()),
        value_column: headers[value_idx].clone(),
        rows,
    })
}

pub fn load_readings_csv(path: &Path) -> eyre::Result<ReadingsCsv> {
    let file = std::fs::File::open(path)
        .map_err(|e| eyre::eyre!("open readings CSV {:?}: {}", path, e))?;
    read_readings(io::BufReader::new(file))
}

/// Write readings as `sensor_id,recorded_time,temperature`; missing values stay empty.
pub fn write_readings_csv(path: &Path, rows: &[ReadingRecord]) -> eyre::Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .map_err(|e| eyre::eyre!("create readings CSV {:?}: {}", path, e))?;
    wtr.write_record(["sensor_id", "recorded_time", "temperature"])?;
    for r in rows {
        let time = r
            .recorded_time
            .map(|t| t.format("%Y-%m-%d %H:%M:%S%.f").to_string())
            .unwrap_or_default();
        let value = r.temperature.map(|v| v.to_string()).unwrap_or_default();
        wtr.write_record([r.sensor_id.as_str(), time.as_str(), value.as_str()])?;
    }
    wtr.flush()?;
    Ok(())
}
