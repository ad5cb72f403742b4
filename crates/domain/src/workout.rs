use chrono::NaiveDate;
use derive_more::{AsRef, Deref, Display};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::lenient;

/// One calendar day's training session.
///
/// Within one user's collection `date` is unique. Fields not known to this type (e.g. `tempo`,
/// `syncedAt`) are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<WorkoutID>,
    pub date: NaiveDate,
    #[serde(
        default,
        deserialize_with = "lenient::option_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub time: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::option_u8",
        skip_serializing_if = "Option::is_none"
    )]
    pub sleep_quality: Option<u8>,
    #[serde(
        default,
        deserialize_with = "lenient::option_u8",
        skip_serializing_if = "Option::is_none"
    )]
    pub stress_level: Option<u8>,
    #[serde(
        default,
        deserialize_with = "lenient::option_u8",
        skip_serializing_if = "Option::is_none"
    )]
    pub muscle_soreness: Option<u8>,
    #[serde(
        default,
        deserialize_with = "lenient::option_f32",
        skip_serializing_if = "Option::is_none"
    )]
    pub body_weight: Option<f32>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub sick: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub injured: bool,
    #[serde(default)]
    pub exercises: Vec<ExerciseEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WorkoutRecord {
    #[must_use]
    pub fn new(date: NaiveDate, exercises: Vec<ExerciseEntry>) -> Self {
        Self {
            id: None,
            date,
            time: None,
            sleep_quality: None,
            stress_level: None,
            muscle_soreness: None,
            body_weight: None,
            sick: false,
            injured: false,
            exercises,
            extra: Map::new(),
        }
    }

    /// The first exercise of the given kind, in performance order.
    #[must_use]
    pub fn exercise(&self, kind: &str) -> Option<&ExerciseEntry> {
        self.exercises.iter().find(|e| e.kind == kind)
    }

    #[must_use]
    pub fn contains_exercise(&self, kind: &str) -> bool {
        self.exercise(kind).is_some()
    }

    #[must_use]
    pub fn set_count(&self) -> usize {
        self.exercises.iter().map(ExerciseEntry::set_count).sum()
    }

    /// Apply a partial update. Fields absent from `update` stay as they are.
    pub fn apply(&mut self, update: WorkoutUpdate) {
        if let Some(id) = update.id {
            self.id = Some(id);
        }
        if let Some(time) = update.time {
            self.time = Some(time);
        }
        if let Some(sleep_quality) = update.sleep_quality {
            self.sleep_quality = Some(sleep_quality);
        }
        if let Some(stress_level) = update.stress_level {
            self.stress_level = Some(stress_level);
        }
        if let Some(muscle_soreness) = update.muscle_soreness {
            self.muscle_soreness = Some(muscle_soreness);
        }
        if let Some(body_weight) = update.body_weight {
            self.body_weight = Some(body_weight);
        }
        if let Some(sick) = update.sick {
            self.sick = sick;
        }
        if let Some(injured) = update.injured {
            self.injured = injured;
        }
        if let Some(exercises) = update.exercises {
            self.exercises = exercises;
        }
        self.extra
            .extend(update.extra.into_iter().filter(|(key, _)| key != "date"));
    }
}

/// Partial fields for [`WorkoutRecord::apply`].
///
/// The date is the record's key and cannot be changed by an update.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutUpdate {
    #[serde(default)]
    pub id: Option<WorkoutID>,
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
    #[serde(default)]
    pub sick: Option<bool>,
    #[serde(default)]
    pub injured: Option<bool>,
    #[serde(default)]
    pub exercises: Option<Vec<ExerciseEntry>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One exercise performed within a workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseEntry {
    pub kind: String,
    #[serde(default)]
    pub sets: Vec<SetEntry>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub failure: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub pump: bool,
    #[serde(
        default,
        deserialize_with = "lenient::option_u8",
        skip_serializing_if = "Option::is_none"
    )]
    pub rpe: Option<u8>,
    #[serde(
        default,
        deserialize_with = "lenient::option_u8",
        skip_serializing_if = "Option::is_none"
    )]
    pub rir: Option<u8>,
    #[serde(
        default,
        deserialize_with = "lenient::option_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub rest_period: Option<u32>,
    /// Mirror of `sets[0].weight` kept for older readers.
    #[serde(
        default,
        deserialize_with = "lenient::option_f32",
        skip_serializing_if = "Option::is_none"
    )]
    pub weight: Option<f32>,
    /// Mirror of `sets[0].reps` kept for older readers.
    #[serde(
        default,
        deserialize_with = "lenient::option_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub reps: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExerciseEntry {
    #[must_use]
    pub fn new(kind: impl Into<String>, sets: Vec<SetEntry>) -> Self {
        let mut entry = Self {
            kind: kind.into(),
            sets,
            failure: false,
            pump: false,
            rpe: None,
            rir: None,
            rest_period: None,
            weight: None,
            reps: None,
            extra: Map::new(),
        };
        entry.mirror_first_set();
        entry
    }

    pub fn mirror_first_set(&mut self) {
        if let Some(first) = self.sets.first() {
            self.weight = Some(first.weight);
            self.reps = Some(first.reps);
        }
    }

    /// Exercises logged before per-set tracking carry only the top-level `weight`/`reps` and
    /// count as a single set.
    #[must_use]
    pub fn set_count(&self) -> usize {
        if self.sets.is_empty() && (self.weight.is_some() || self.reps.is_some()) {
            1
        } else {
            self.sets.len()
        }
    }

    #[must_use]
    pub fn volume(&self) -> f32 {
        self.sets.iter().map(SetEntry::volume).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SetEntry {
    /// Zero for bodyweight exercises.
    #[serde(default, deserialize_with = "lenient::f32")]
    pub weight: f32,
    #[serde(default, deserialize_with = "lenient::u32")]
    pub reps: u32,
    #[serde(
        default,
        deserialize_with = "lenient::option_u8",
        skip_serializing_if = "Option::is_none"
    )]
    pub rir: Option<u8>,
}

impl SetEntry {
    #[must_use]
    pub fn new(weight: f32, reps: u32) -> Self {
        Self {
            weight,
            reps,
            rir: None,
        }
    }

    #[must_use]
    pub fn with_rir(self, rir: u8) -> Self {
        Self {
            rir: Some(rir),
            ..self
        }
    }

    #[must_use]
    pub fn volume(&self) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let reps = self.reps as f32;
        self.weight * reps
    }
}

#[derive(
    AsRef, Deref, Display, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct WorkoutID(String);

impl WorkoutID {
    /// Generate a fresh identifier for a record that has none yet.
    #[must_use]
    pub fn generate(date: NaiveDate) -> Self {
        Self(format!("{date}_{}", Uuid::new_v4().simple()))
    }
}

impl From<&str> for WorkoutID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for WorkoutID {
    fn from(value: String) -> Self {
        Self(value)
    }
}
