//! Calendar features shared by training and inference.
//!
//! `CalendarFeatures::at` is the only place the time-of-day bucket rule
//! lives. FeatureBuilder and ForecastEngine both call it, so a reading at
//! 16:59 and a forecast for 16:59 always land in the same bucket.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::Serialize;

/// Names of the model inputs available at inference time, in vector order.
pub const CALENDAR_FEATURES: [&str; 6] = [
    "hour",
    "day_of_week",
    "time_morning",
    "time_afternoon",
    "time_evening",
    "time_night",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    /// [05, 12)
    Morning,
    /// [12, 17)
    Afternoon,
    /// [17, 21)
    Evening,
    /// [21, 24) and [00, 05)
    Night,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=20 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    /// `[morning, afternoon, evening, night]`, exactly one set.
    pub fn one_hot(self) -> [bool; 4] {
        [
            self == TimeOfDay::Morning,
            self == TimeOfDay::Afternoon,
            self == TimeOfDay::Evening,
            self == TimeOfDay::Night,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFeatures {
    pub hour: u32,
    pub minute: u32,
    /// Monday = 0 .. Sunday = 6.
    pub day_of_week: u32,
    pub time_of_day: TimeOfDay,
}

impl CalendarFeatures {
    pub fn at(t: NaiveDateTime) -> Self {
        let hour = t.hour();
        Self {
            hour,
            minute: t.minute(),
            day_of_week: t.weekday().num_days_from_monday(),
            time_of_day: TimeOfDay::from_hour(hour),
        }
    }

    /// Model input in `CALENDAR_FEATURES` order.
    pub fn to_vector(&self) -> Vec<f64> {
        let [m, a, e, n] = self.time_of_day.one_hot();
        vec![
            f64::from(self.hour),
            f64::from(self.day_of_week),
            f64::from(u8::from(m)),
            f64::from(u8::from(a)),
            f64::from(u8::from(e)),
            f64::from(u8::from(n)),
        ]
    }
}
