//! Conversion of historical record shapes into the canonical [`WorkoutRecord`].
//!
//! Early versions of the app nested the daily fields of a workout under a `dailyInfo` object
//! and named the date and time `currentDate` and `currentTime`:
//!
//! ```json
//! { "dailyInfo": { "currentDate": "2025-03-04", "currentTime": "07:15", "sleepQuality": "7" },
//!   "exercises": [] }
//! ```
//!
//! Everything else in the crate works on the flat canonical shape only.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{ExerciseEntry, NormalizeError, WorkoutID, WorkoutRecord, lenient};

const DAILY_INFO: &str = "dailyInfo";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShape {
    Canonical,
    LegacyNested,
}

impl RecordShape {
    /// A record is legacy shaped iff it has no top-level `date` but a `dailyInfo` object.
    ///
    /// A `date` that is null or empty counts as missing.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(object)
                if !has_date(object) && object.get(DAILY_INFO).is_some_and(Value::is_object) =>
            {
                RecordShape::LegacyNested
            }
            _ => RecordShape::Canonical,
        }
    }
}

fn has_date(object: &Map<String, Value>) -> bool {
    match object.get("date") {
        None | Some(Value::Null) => false,
        Some(Value::String(date)) => !date.is_empty(),
        Some(_) => true,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawWorkout {
    Canonical(WorkoutRecord),
    LegacyNested(LegacyWorkout),
}

impl TryFrom<Value> for RawWorkout {
    type Error = NormalizeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(object) = &value else {
            return Err(NormalizeError::NotAnObject);
        };
        match RecordShape::of(&value) {
            RecordShape::LegacyNested => Ok(RawWorkout::LegacyNested(
                serde_json::from_value(value)?,
            )),
            RecordShape::Canonical => {
                if !has_date(object) {
                    return Err(NormalizeError::MissingDate);
                }
                Ok(RawWorkout::Canonical(serde_json::from_value(value)?))
            }
        }
    }
}

impl From<WorkoutRecord> for RawWorkout {
    fn from(value: WorkoutRecord) -> Self {
        RawWorkout::Canonical(value)
    }
}

impl From<LegacyWorkout> for RawWorkout {
    fn from(value: LegacyWorkout) -> Self {
        RawWorkout::LegacyNested(value)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyWorkout {
    #[serde(default)]
    pub id: Option<WorkoutID>,
    pub daily_info: DailyInfo,
    #[serde(default)]
    pub exercises: Vec<ExerciseEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyInfo {
    #[serde(default)]
    pub current_date: Option<NaiveDate>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::option_text")]
    pub current_time: Option<String>,
    #[serde(default, deserialize_with = "lenient::option_text")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "lenient::option_u8")]
    pub sleep_quality: Option<u8>,
    #[serde(default, deserialize_with = "lenient::option_u8")]
    pub stress_level: Option<u8>,
    #[serde(default, deserialize_with = "lenient::option_u8")]
    pub muscle_soreness: Option<u8>,
    #[serde(default, deserialize_with = "lenient::option_f32")]
    pub body_weight: Option<f32>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub sick: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub injured: bool,
}

/// Convert a record of any known shape into canonical shape.
///
/// Canonical records are returned unchanged, so normalization is idempotent.
pub fn normalize(raw: impl Into<RawWorkout>) -> Result<WorkoutRecord, NormalizeError> {
    match raw.into() {
        RawWorkout::Canonical(record) => Ok(record),
        RawWorkout::LegacyNested(legacy) => flatten(legacy),
    }
}

pub fn normalize_value(value: Value) -> Result<WorkoutRecord, NormalizeError> {
    normalize(RawWorkout::try_from(value)?)
}

fn flatten(legacy: LegacyWorkout) -> Result<WorkoutRecord, NormalizeError> {
    let LegacyWorkout {
        id,
        daily_info,
        exercises,
    } = legacy;
    let date = daily_info
        .current_date
        .or(daily_info.date)
        .ok_or(NormalizeError::MissingDate)?;

    Ok(WorkoutRecord {
        id,
        time: daily_info.current_time.or(daily_info.time),
        sleep_quality: daily_info.sleep_quality,
        stress_level: daily_info.stress_level,
        muscle_soreness: daily_info.muscle_soreness,
        body_weight: daily_info.body_weight,
        sick: daily_info.sick,
        injured: daily_info.injured,
        ..WorkoutRecord::new(date, exercises)
    })
}
