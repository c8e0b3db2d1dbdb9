//! Persisted feature-table CSV schema.
//!
//! Columns, in order:
//! recorded_time,hour,minute,day_of_week,time_morning,time_afternoon,time_evening,time_night,
//! temp_lag_1,temp_lag_2,temp_lag_3,temp_diff_1,temp_diff_2,temperature,temperature_scaled,
//! temp_lag_1_scaled,temp_lag_2_scaled,temp_lag_3_scaled,temp_diff_1_scaled,temp_diff_2_scaled
//!
//! Booleans are written as `0`/`1`.
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub recorded_time: NaiveDateTime,
    pub hour: u32,
    pub minute: u32,
    pub day_of_week: u32,
    #[serde(with = "zero_one")]
    pub time_morning: bool,
    #[serde(with = "zero_one")]
    pub time_afternoon: bool,
    #[serde(with = "zero_one")]
    pub time_evening: bool,
    #[serde(with = "zero_one")]
    pub time_night: bool,
    pub temp_lag_1: f64,
    pub temp_lag_2: f64,
    pub temp_lag_3: f64,
    pub temp_diff_1: f64,
    pub temp_diff_2: f64,
    pub temperature: f64,
    pub temperature_scaled: f64,
    pub temp_lag_1_scaled: f64,
    pub temp_lag_2_scaled: f64,
    pub temp_lag_3_scaled: f64,
    pub temp_diff_1_scaled: f64,
    pub temp_diff_2_scaled: f64,
}

mod zero_one {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(v: &bool, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u8(u8::from(*v))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        match u8::deserialize(d)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(D::Error::custom(format!("expected 0 or 1, got {other}"))),
        }
    }
}

pub fn write_feature_csv(path: &Path, rows: &[FeatureRecord]) -> eyre::Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .map_err(|e| eyre::eyre!("create feature CSV {:?}: {}", path, e))?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn load_feature_csv(path: &Path) -> eyre::Result<Vec<FeatureRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open feature CSV {:?}: {}", path, e))?;

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<FeatureRecord>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }
    Ok(rows)
}
