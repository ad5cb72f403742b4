#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod backup;
pub mod catalog;
mod error;
pub mod event;
pub mod filter;
mod lenient;
pub mod merge;
pub mod normalize;
mod settings;
pub mod statistics;
pub mod store;
mod user;
mod workout;

pub use backup::{Backup, BackupStatus, should_remind, to_csv};
pub use catalog::{Catalog, Exercise, MuscleGroup, MuscleGroupClassifier};
pub use error::{
    CreateError, DeleteError, ImportError, NormalizeError, StorageError, UpdateError, UserError,
};
pub use event::{Event, Observer, Observers, SubscriptionID};
pub use filter::{WorkoutFilter, filter_workouts};
pub use merge::{
    collapse_dates, has_unique_dates, merge_by_date, merge_by_id, merge_by_id_with,
    pending_upload,
};
pub use normalize::{RawWorkout, RecordShape, normalize, normalize_value};
pub use settings::Settings;
pub use statistics::{ExerciseOccurrence, PersonalBest, WeeklyStats};
pub use store::{BlobRepository, ImportSummary, SyncSummary, WorkoutStore};
pub use user::{UserID, UserProfile, UserProfiles};
pub use workout::{ExerciseEntry, SetEntry, WorkoutID, WorkoutRecord, WorkoutUpdate};
