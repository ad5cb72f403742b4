use std::{
    collections::{BTreeMap, VecDeque},
    sync::Mutex,
};

use liftlogic_domain::{BlobRepository, StorageError};

use crate::log;

/// Volatile storage, e.g. for a browser without local storage or for tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    blobs: Mutex<BTreeMap<String, String>>,
    log: Mutex<VecDeque<log::Entry>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> StorageError {
    StorageError::Unavailable("memory storage poisoned".to_string())
}

impl BlobRepository for MemoryStorage {
    fn read_blob(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.blobs.lock().map_err(poisoned)?.get(key).cloned())
    }

    fn write_blob(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.blobs
            .lock()
            .map_err(poisoned)?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl log::Repository for MemoryStorage {
    fn read_entries(&self) -> Result<VecDeque<log::Entry>, log::Error> {
        self.log
            .lock()
            .map(|entries| entries.clone())
            .map_err(|err| log::Error::Unknown(err.to_string()))
    }

    fn write_entry(&self, entry: log::Entry) -> Result<(), log::Error> {
        let mut entries = self
            .log
            .lock()
            .map_err(|err| log::Error::Unknown(err.to_string()))?;
        log::push_entry(&mut entries, entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use liftlogic_domain::{
        Event, ExerciseEntry, SetEntry, UserID, UserProfile, WorkoutFilter, WorkoutRecord,
        WorkoutStore,
    };
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::log::Repository;

    #[test]
    fn test_blobs() {
        let storage = MemoryStorage::new();

        assert_eq!(storage.read_blob("workouts").unwrap(), None);

        storage.write_blob("workouts", "[]").unwrap();
        storage.write_blob("currentUser", "default").unwrap();

        storage.write_blob("workouts", "[{}]").unwrap();

        assert_eq!(storage.read_blob("workouts").unwrap(), Some("[{}]".to_string()));
        assert_eq!(
            storage.read_blob("currentUser").unwrap(),
            Some("default".to_string())
        );
    }

    #[rstest]
    #[case::few(3, 3)]
    #[case::many(150, log::MAX_ENTRIES)]
    fn test_log_entries(#[case] written: usize, #[case] kept: usize) {
        let storage = MemoryStorage::new();

        for i in 0..written {
            storage
                .write_entry(log::Entry::now(::log::Level::Info, i.to_string()))
                .unwrap();
        }

        let entries = storage.read_entries().unwrap();
        assert_eq!(entries.len(), kept);
        assert_eq!(
            entries.front().map(|e| e.message.clone()),
            Some((written - 1).to_string())
        );
    }

    #[test]
    fn test_workout_store() {
        let date = NaiveDate::from_ymd_opt(2026, 4, 2).unwrap();
        let mut store = WorkoutStore::new(MemoryStorage::new());
        store.init();
        store
            .add_user(UserProfile::new(UserID::from("u1"), "Kim"))
            .unwrap();
        store.set_current_user(&UserID::from("u1")).unwrap();
        store
            .add_workout(WorkoutRecord::new(
                date,
                vec![ExerciseEntry::new(
                    "Deadlift",
                    vec![SetEntry::new(140.0, 5)],
                )],
            ))
            .unwrap();

        let events = std::rc::Rc::new(std::cell::RefCell::new(vec![]));
        let captured = std::rc::Rc::clone(&events);
        store.subscribe(move |event: &Event| -> Result<(), Box<dyn std::error::Error>> {
            captured.borrow_mut().push(event.name());
            Ok(())
        });
        store.init();

        assert_eq!(store.current_user(), &UserID::from("u1"));
        assert_eq!(
            store
                .get_workouts(&WorkoutFilter::default())
                .iter()
                .map(|w| w.date)
                .collect::<Vec<_>>(),
            vec![date]
        );
        assert_eq!(*events.borrow(), vec!["workoutsLoaded"]);
    }
}
