use chrono::NaiveDateTime;
use serde::Serialize;

/// One sensor observation. Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorReading {
    pub sensor_id: String,
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

impl SensorReading {
    pub fn new(sensor_id: impl Into<String>, timestamp: NaiveDateTime, value: f64) -> Self {
        Self {
            sensor_id: sensor_id.into(),
            timestamp,
            value,
        }
    }
}

/// The most recent reading with a usable value; the first one wins on ties.
/// Missing (NaN) values are skipped.
pub fn latest(readings: &[SensorReading]) -> Option<&SensorReading> {
    readings
        .iter()
        .filter(|r| r.value.is_finite())
        .reduce(|best, r| if r.timestamp > best.timestamp { r } else { best })
}
