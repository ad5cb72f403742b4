use std::fmt::Write;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ImportError, Settings, UserID, UserProfiles, WorkoutRecord, normalize_value};

pub const BACKUP_VERSION: u32 = 2;
pub const BACKUP_SOURCE: &str = "LiftLogic Backup";

/// Content of a backup file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_user: Option<UserID>,
    pub user_profiles: UserProfiles,
    pub workouts: Vec<WorkoutRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Header {
    #[serde(default)]
    version: Option<u32>,
    #[serde(default)]
    exported_at: Option<DateTime<Utc>>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    current_user: Option<UserID>,
    #[serde(default)]
    user_profiles: Option<UserProfiles>,
}

impl Backup {
    #[must_use]
    pub fn new(
        exported_at: DateTime<Utc>,
        current_user: UserID,
        user_profiles: UserProfiles,
        workouts: Vec<WorkoutRecord>,
    ) -> Self {
        Self {
            version: BACKUP_VERSION,
            exported_at: Some(exported_at),
            source: Some(BACKUP_SOURCE.to_string()),
            current_user: Some(current_user),
            user_profiles,
            workouts,
        }
    }

    /// Parse a backup file. Records of any known shape are converted to canonical shape.
    ///
    /// A file without a `workouts` array or with a single invalid record is rejected as a whole.
    pub fn parse(json: &str) -> Result<Self, ImportError> {
        let Value::Object(mut object) = serde_json::from_str::<Value>(json)? else {
            return Err(ImportError::Format("expected an object".to_string()));
        };
        let Some(Value::Array(workouts)) = object.remove("workouts") else {
            return Err(ImportError::Format("missing workouts array".to_string()));
        };
        let workouts = workouts
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                normalize_value(value).map_err(|source| ImportError::Invalid { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let header: Header = serde_json::from_value(Value::Object(object))?;

        Ok(Self {
            version: header.version.unwrap_or(1),
            exported_at: header.exported_at,
            source: header.source,
            current_user: header.current_user,
            user_profiles: header.user_profiles.unwrap_or_default(),
            workouts,
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Flatten workouts into CSV with one row per set.
#[must_use]
pub fn to_csv(workouts: &[WorkoutRecord]) -> String {
    let mut csv = String::from("Date,Exercise,Set,Weight (lbs),Reps,RIR,RPE");
    for workout in workouts {
        for exercise in &workout.exercises {
            let kind = exercise.kind.replace('"', "\"\"");
            for (i, set) in exercise.sets.iter().enumerate() {
                let _ = write!(
                    csv,
                    "\n{},\"{kind}\",{},{},{},{},{}",
                    workout.date,
                    i + 1,
                    non_zero(set.weight),
                    non_zero(set.reps),
                    set.rir.map(non_zero).unwrap_or_default(),
                    exercise.rpe.map(non_zero).unwrap_or_default(),
                );
            }
        }
    }
    csv
}

fn non_zero<T: Default + PartialEq + ToString>(value: T) -> String {
    if value == T::default() {
        String::new()
    } else {
        value.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupStatus {
    pub last_backup: Option<DateTime<Utc>>,
    pub last_reminder: Option<DateTime<Utc>>,
    /// Whole days since the last backup.
    pub days_since_backup: Option<i64>,
    pub workout_count: usize,
}

impl BackupStatus {
    #[must_use]
    pub fn new(
        last_backup: Option<DateTime<Utc>>,
        last_reminder: Option<DateTime<Utc>>,
        workout_count: usize,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            last_backup,
            last_reminder,
            days_since_backup: last_backup.map(|t| (now - t).num_days()),
            workout_count,
        }
    }
}

/// Whether the user should be reminded to export a backup.
///
/// Signed in users are never reminded, as their data is synchronized to the cloud.
#[must_use]
pub fn should_remind(
    status: &BackupStatus,
    now: DateTime<Utc>,
    settings: &Settings,
    signed_in: bool,
) -> bool {
    if signed_in {
        return false;
    }
    let Some(last_backup) = status.last_backup else {
        return true;
    };
    elapsed(now, Some(last_backup), settings.backup_interval_days)
        && elapsed(now, status.last_reminder, settings.reminder_interval_days)
}

/// Whether at least `days` have passed since `since`. An interval out of range never elapses.
fn elapsed(now: DateTime<Utc>, since: Option<DateTime<Utc>>, days: i64) -> bool {
    let Some(since) = since else {
        return true;
    };
    Duration::try_days(days).is_some_and(|interval| now - since >= interval)
}
