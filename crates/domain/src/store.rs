use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDate, Utc};
use log::{debug, error, info, warn};
use serde_json::{Map, Value};

use crate::{
    Backup, BackupStatus, Catalog, CreateError, DeleteError, Event, Exercise, ExerciseOccurrence,
    ImportError, MuscleGroup, MuscleGroupClassifier, Observer, Observers, PersonalBest, RawWorkout,
    Settings, StorageError, SubscriptionID, UpdateError, UserError, UserID, UserProfile,
    UserProfiles, WeeklyStats, WorkoutFilter, WorkoutRecord, WorkoutUpdate, collapse_dates,
    filter_workouts, has_unique_dates, merge_by_date, merge_by_id, normalize, normalize_value,
    pending_upload, should_remind, statistics,
};

pub const KEY_USER_PROFILES: &str = "userProfiles";
pub const KEY_CURRENT_USER: &str = "currentUser";
pub const KEY_LAST_BACKUP: &str = "lastBackupDate";
pub const KEY_LAST_BACKUP_REMINDER: &str = "lastBackupReminder";
pub const KEY_LAST_CLOUD_SYNC: &str = "lastCloudSync";
pub const KEY_SETTINGS: &str = "settings";

/// Key-value store of string blobs, e.g. the browser's local storage.
pub trait BlobRepository {
    fn read_blob(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write_blob(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// Number of workouts contained in the backup file.
    pub imported: usize,
    /// Number of workouts after the import.
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncSummary {
    pub total: usize,
    /// Workouts that are missing in or differ from the cloud snapshot.
    pub local_only: Vec<WorkoutRecord>,
}

/// The workout collection of the current user.
///
/// The collection is kept in ascending date order with at most one workout per date. Every
/// mutation is persisted before it becomes visible. If persisting fails, the mutation is
/// discarded and no event is sent.
pub struct WorkoutStore<R, C = Catalog> {
    repository: R,
    classifier: C,
    settings: Settings,
    current_user: UserID,
    user_profiles: UserProfiles,
    workouts: Vec<WorkoutRecord>,
    observers: Observers,
}

impl<R: BlobRepository> WorkoutStore<R> {
    pub fn new(repository: R) -> Self {
        Self::with_classifier(repository, Catalog::default())
    }

    /// Make a custom exercise known to the muscle-group lookup for the lifetime of the store.
    pub fn add_exercise(&mut self, exercise: Exercise) {
        self.classifier.add_exercise(exercise);
    }
}

impl<R: BlobRepository, C: MuscleGroupClassifier> WorkoutStore<R, C> {
    pub fn with_classifier(repository: R, classifier: C) -> Self {
        Self {
            repository,
            classifier,
            settings: Settings::default(),
            current_user: UserID::default_user(),
            user_profiles: UserProfiles::from([(
                UserID::default_user(),
                UserProfile::default_user(),
            )]),
            workouts: vec![],
            observers: Observers::default(),
        }
    }

    /// Restore settings, user profiles, the current user and their workouts.
    pub fn init(&mut self) {
        self.settings = self.read_json(KEY_SETTINGS).unwrap_or_default();
        self.load_user_profiles();
        self.current_user = match self.read_text(KEY_CURRENT_USER).map(UserID::from) {
            Some(id) if self.user_profiles.contains_key(&id) => id,
            Some(id) => {
                warn!("unknown current user {id}, falling back to default user");
                UserID::default_user()
            }
            None => UserID::default_user(),
        };
        self.load();
        info!(
            "initialized with {} workouts for user {}",
            self.workouts.len(),
            self.current_user
        );
    }

    fn load_user_profiles(&mut self) {
        let (mut user_profiles, complete) = self.read_user_profiles();
        if !user_profiles.contains_key(&UserID::default_user()) {
            user_profiles.insert(
                UserID::default_user(),
                UserProfile {
                    created_at: Some(Utc::now()),
                    ..UserProfile::default_user()
                },
            );
            if !complete {
                warn!("not storing default user, stored user profiles are incomplete");
            } else if let Err(err) = self.write_json(KEY_USER_PROFILES, &user_profiles) {
                warn!("failed to store user profiles: {err}");
            }
        }
        self.user_profiles = user_profiles;
    }

    /// The stored profiles and whether all of them could be read.
    ///
    /// Unreadable profiles are skipped, the stored value must then not be overwritten.
    fn read_user_profiles(&self) -> (UserProfiles, bool) {
        let blob = match self.repository.read_blob(KEY_USER_PROFILES) {
            Ok(Some(blob)) if !blob.is_empty() => blob,
            Ok(_) => return (UserProfiles::new(), true),
            Err(err) => {
                error!("failed to read {KEY_USER_PROFILES}: {err}");
                return (UserProfiles::new(), false);
            }
        };
        let entries = match serde_json::from_str::<Map<String, Value>>(&blob) {
            Ok(entries) => entries,
            Err(err) => {
                error!("malformed user profiles in {KEY_USER_PROFILES}: {err}");
                return (UserProfiles::new(), false);
            }
        };
        let mut complete = true;
        let user_profiles = entries
            .into_iter()
            .filter_map(
                |(id, value)| match serde_json::from_value::<UserProfile>(value) {
                    Ok(profile) => Some((UserID::from(id), profile)),
                    Err(err) => {
                        warn!("skipping user profile {id} in {KEY_USER_PROFILES}: {err}");
                        complete = false;
                        None
                    }
                },
            )
            .collect();
        (user_profiles, complete)
    }

    /// Replace the in-memory collection by the persisted workouts of the current user.
    ///
    /// Never fails. An unreadable collection is replaced by an empty one, unreadable records are
    /// skipped.
    pub fn load(&mut self) {
        self.workouts = self.read_workouts();
        debug!(
            "loaded {} workouts for user {}",
            self.workouts.len(),
            self.current_user
        );
        self.observers.dispatch(&Event::WorkoutsLoaded {
            count: self.workouts.len(),
        });
    }

    fn read_workouts(&self) -> Vec<WorkoutRecord> {
        let key = self.current_user.workouts_key();
        let blob = match self.repository.read_blob(&key) {
            Ok(Some(blob)) => blob,
            Ok(None) => return vec![],
            Err(err) => {
                error!("failed to read {key}: {err}");
                return vec![];
            }
        };
        let values = match serde_json::from_str::<Vec<Value>>(&blob) {
            Ok(values) => values,
            Err(err) => {
                error!("malformed workouts in {key}: {err}");
                return vec![];
            }
        };
        let workouts = values
            .into_iter()
            .enumerate()
            .filter_map(|(i, value)| match normalize_value(value) {
                Ok(workout) => Some(workout),
                Err(err) => {
                    warn!("skipping workout {i} in {key}: {err}");
                    None
                }
            })
            .collect::<Vec<_>>();
        if !has_unique_dates(&workouts) {
            warn!("combining workouts with same date in {key}");
        }
        collapse_dates(workouts)
    }

    /// Persist the in-memory collection.
    pub fn save(&mut self) -> Result<(), StorageError> {
        self.write_workouts(&self.workouts)?;
        self.observers.dispatch(&Event::WorkoutsSaved {
            count: self.workouts.len(),
        });
        Ok(())
    }

    fn write_workouts(&self, workouts: &[WorkoutRecord]) -> Result<(), StorageError> {
        self.write_json(&self.current_user.workouts_key(), workouts)
    }

    fn commit(&mut self, workouts: Vec<WorkoutRecord>) -> Result<(), StorageError> {
        self.write_workouts(&workouts)?;
        self.workouts = workouts;
        self.observers.dispatch(&Event::WorkoutsSaved {
            count: self.workouts.len(),
        });
        Ok(())
    }

    #[must_use]
    pub fn get_workouts(&self, filter: &WorkoutFilter) -> Vec<WorkoutRecord> {
        filter_workouts(&self.workouts, filter, today(), &self.classifier)
    }

    #[must_use]
    pub fn get_workout_by_date(&self, date: NaiveDate) -> Option<WorkoutRecord> {
        self.workouts.iter().find(|w| w.date == date).cloned()
    }

    /// Add a workout. The exercises of a workout on an already existing date are appended to the
    /// existing workout.
    pub fn add_workout(
        &mut self,
        workout: impl Into<RawWorkout>,
    ) -> Result<WorkoutRecord, CreateError> {
        let workout = normalize(workout)?;
        let mut workouts = self.workouts.clone();
        let added = if let Some(existing) = workouts.iter_mut().find(|w| w.date == workout.date) {
            existing.exercises.extend(workout.exercises);
            existing.clone()
        } else {
            workouts.push(workout.clone());
            workouts.sort_by_key(|w| w.date);
            workout
        };
        self.commit(workouts)?;
        self.observers.dispatch(&Event::WorkoutAdded(added.clone()));
        Ok(added)
    }

    pub fn update_workout(
        &mut self,
        date: NaiveDate,
        update: WorkoutUpdate,
    ) -> Result<WorkoutRecord, UpdateError> {
        let mut workouts = self.workouts.clone();
        let Some(workout) = workouts.iter_mut().find(|w| w.date == date) else {
            return Err(UpdateError::NotFound(date));
        };
        workout.apply(update);
        let updated = workout.clone();
        self.commit(workouts)?;
        self.observers
            .dispatch(&Event::WorkoutUpdated(updated.clone()));
        Ok(updated)
    }

    pub fn delete_workout(&mut self, date: NaiveDate) -> Result<WorkoutRecord, DeleteError> {
        let mut workouts = self.workouts.clone();
        let Some(index) = workouts.iter().position(|w| w.date == date) else {
            return Err(DeleteError::NotFound(date));
        };
        let deleted = workouts.remove(index);
        self.commit(workouts)?;
        self.observers.dispatch(&Event::WorkoutDeleted(date));
        Ok(deleted)
    }

    pub fn subscribe(&mut self, observer: impl Observer + 'static) -> SubscriptionID {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionID) -> bool {
        self.observers.unsubscribe(id)
    }

    #[must_use]
    pub fn current_user(&self) -> &UserID {
        &self.current_user
    }

    #[must_use]
    pub fn current_profile(&self) -> Option<&UserProfile> {
        self.user_profiles
            .get(&self.current_user)
            .or_else(|| self.user_profiles.get(&UserID::default_user()))
    }

    #[must_use]
    pub fn users(&self) -> Vec<UserProfile> {
        self.user_profiles.values().cloned().collect()
    }

    /// Add or replace a user profile.
    pub fn add_user(&mut self, profile: UserProfile) -> Result<(), StorageError> {
        let mut user_profiles = self.user_profiles.clone();
        user_profiles.insert(profile.id.clone(), profile);
        self.write_json(KEY_USER_PROFILES, &user_profiles)?;
        self.user_profiles = user_profiles;
        Ok(())
    }

    /// Switch to another user and load their workouts.
    pub fn set_current_user(&mut self, id: &UserID) -> Result<(), UserError> {
        if !self.user_profiles.contains_key(id) {
            return Err(UserError::NotFound(id.to_string()));
        }
        self.repository.write_blob(KEY_CURRENT_USER, id)?;
        self.current_user = id.clone();
        self.load();
        self.observers.dispatch(&Event::UserChanged(id.clone()));
        Ok(())
    }

    #[must_use]
    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) -> Result<(), StorageError> {
        self.write_json(KEY_SETTINGS, &settings)?;
        self.settings = settings;
        Ok(())
    }

    #[must_use]
    pub fn export_data(&self, now: DateTime<Utc>) -> Backup {
        Backup::new(
            now,
            self.current_user.clone(),
            self.user_profiles.clone(),
            self.workouts.clone(),
        )
    }

    pub fn mark_backup_exported(&self, now: DateTime<Utc>) -> Result<(), StorageError> {
        self.write_timestamp(KEY_LAST_BACKUP, now)
    }

    /// Merge the content of a backup file into the current user's data.
    ///
    /// Imported workouts win over existing workouts on the same date, except for exercises
    /// already present on that date. Nothing is changed if the file is invalid.
    pub fn import_backup(&mut self, json: &str) -> Result<ImportSummary, ImportError> {
        let backup = Backup::parse(json)?;
        let workouts = merge_by_date(&self.workouts, &backup.workouts);
        let mut user_profiles = self.user_profiles.clone();
        user_profiles.extend(backup.user_profiles);

        self.write_workouts(&workouts)?;
        if let Err(err) = self.write_json(KEY_USER_PROFILES, &user_profiles) {
            if let Err(err) = self.write_workouts(&self.workouts) {
                error!("failed to restore workouts after failed import: {err}");
            }
            return Err(err.into());
        }
        self.user_profiles = user_profiles;
        self.workouts = workouts;

        let summary = ImportSummary {
            imported: backup.workouts.len(),
            total: self.workouts.len(),
        };
        info!(
            "imported {} workouts, {} in total",
            summary.imported, summary.total
        );
        self.observers.dispatch(&Event::WorkoutsSaved {
            count: summary.total,
        });
        self.observers.dispatch(&Event::DataImported {
            imported: summary.imported,
            total: summary.total,
        });
        Ok(summary)
    }

    /// Merge a snapshot of the cloud documents of the current user into the collection.
    ///
    /// Cloud documents replace local workouts with the same id. Workouts that end up on the same
    /// date are combined, keeping the cloud document as base.
    pub fn apply_cloud_snapshot(
        &mut self,
        cloud: &[WorkoutRecord],
        now: DateTime<Utc>,
    ) -> Result<SyncSummary, StorageError> {
        let workouts = collapse_dates(merge_by_id(&self.workouts, cloud));
        let local_only = pending_upload(&workouts, cloud);
        self.commit(workouts)?;
        if let Err(err) = self.write_timestamp(KEY_LAST_CLOUD_SYNC, now) {
            warn!("failed to store time of cloud sync: {err}");
        }

        let total = self.workouts.len();
        info!(
            "synchronized {total} workouts, {} to upload",
            local_only.len()
        );
        self.observers.dispatch(&Event::CloudSynced { total });
        Ok(SyncSummary { total, local_only })
    }

    #[must_use]
    pub fn last_cloud_sync(&self) -> Option<DateTime<Utc>> {
        self.read_timestamp(KEY_LAST_CLOUD_SYNC)
    }

    #[must_use]
    pub fn backup_status(&self, now: DateTime<Utc>) -> BackupStatus {
        BackupStatus::new(
            self.read_timestamp(KEY_LAST_BACKUP),
            self.read_timestamp(KEY_LAST_BACKUP_REMINDER),
            self.workouts.len(),
            now,
        )
    }

    #[must_use]
    pub fn should_remind_backup(&self, now: DateTime<Utc>, signed_in: bool) -> bool {
        should_remind(&self.backup_status(now), now, &self.settings, signed_in)
    }

    pub fn mark_reminder_shown(&self, now: DateTime<Utc>) -> Result<(), StorageError> {
        self.write_timestamp(KEY_LAST_BACKUP_REMINDER, now)
    }

    #[must_use]
    pub fn muscle_group(&self, kind: &str) -> MuscleGroup {
        self.classifier.muscle_group(kind)
    }

    #[must_use]
    pub fn this_week_workouts(&self) -> Vec<WorkoutRecord> {
        statistics::this_week_workouts(&self.workouts, today())
    }

    #[must_use]
    pub fn weekly_set_counts(&self) -> BTreeMap<MuscleGroup, usize> {
        statistics::weekly_set_counts(&self.workouts, today(), &self.classifier)
    }

    /// The latest occurrences of an exercise, oldest first. Without `limit`, the configured
    /// history limit applies.
    #[must_use]
    pub fn exercise_history(&self, kind: &str, limit: Option<usize>) -> Vec<ExerciseOccurrence> {
        statistics::exercise_history(
            &self.workouts,
            kind,
            limit.unwrap_or(self.settings.history_limit),
        )
    }

    #[must_use]
    pub fn personal_best(&self, kind: &str) -> Option<PersonalBest> {
        statistics::personal_best(&self.workouts, kind)
    }

    #[must_use]
    pub fn weekly_stats(&self) -> WeeklyStats {
        statistics::weekly_stats(&self.workouts, today(), &self.classifier)
    }

    fn read_text(&self, key: &str) -> Option<String> {
        match self.repository.read_blob(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(err) => {
                error!("failed to read {key}: {err}");
                None
            }
        }
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let text = self.read_text(key)?;
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(err) => {
                error!("malformed value in {key}: {err}");
                None
            }
        }
    }

    fn write_json<T: serde::Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), StorageError> {
        self.repository
            .write_blob(key, &serde_json::to_string(value)?)
    }

    fn read_timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
        let text = self.read_text(key)?;
        match DateTime::parse_from_rfc3339(&text) {
            Ok(time) => Some(time.to_utc()),
            Err(err) => {
                warn!("invalid timestamp in {key}: {err}");
                None
            }
        }
    }

    fn write_timestamp(&self, key: &str, time: DateTime<Utc>) -> Result<(), StorageError> {
        self.repository.write_blob(key, &time.to_rfc3339())
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
