use std::collections::VecDeque;

use gloo_storage::Storage as GlooStorage;
use liftlogic_domain::{BlobRepository, StorageError};

use crate::log;

/// The browser's local storage.
///
/// Values are stored as they are, so data written by earlier versions of the app stays readable.
pub struct LocalStorage;

fn unavailable(err: impl std::fmt::Debug) -> StorageError {
    StorageError::Unavailable(format!("{err:?}"))
}

impl BlobRepository for LocalStorage {
    fn read_blob(&self, key: &str) -> Result<Option<String>, StorageError> {
        gloo_storage::LocalStorage::raw()
            .get_item(key)
            .map_err(unavailable)
    }

    fn write_blob(&self, key: &str, value: &str) -> Result<(), StorageError> {
        gloo_storage::LocalStorage::raw()
            .set_item(key, value)
            .map_err(unavailable)
    }
}

const KEY_LOG: &str = "log";

impl log::Repository for LocalStorage {
    fn read_entries(&self) -> Result<VecDeque<log::Entry>, log::Error> {
        match gloo_storage::LocalStorage::get(KEY_LOG) {
            Ok(entries) => Ok(entries),
            Err(err) => match err {
                gloo_storage::errors::StorageError::KeyNotFound(_) => Ok(VecDeque::new()),
                err => Err(err),
            },
        }
        .map_err(|err| log::Error::Unknown(err.to_string()))
    }

    fn write_entry(&self, entry: log::Entry) -> Result<(), log::Error> {
        let mut entries = self.read_entries()?;
        log::push_entry(&mut entries, entry);
        gloo_storage::LocalStorage::set(KEY_LOG, entries)
            .map_err(|err| log::Error::Unknown(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    mod wasm {
        use chrono::NaiveDate;
        use gloo_storage::Storage as GlooStorage;
        use liftlogic_domain::{ExerciseEntry, WorkoutRecord, WorkoutStore};
        use pretty_assertions::assert_eq;
        use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

        use super::super::*;
        use crate::log::Repository;

        wasm_bindgen_test_configure!(run_in_browser);

        fn reset() {
            gloo_storage::LocalStorage::clear();
        }

        #[wasm_bindgen_test]
        fn test_blobs() {
            reset();

            assert_eq!(LocalStorage.read_blob("workouts").unwrap(), None);

            LocalStorage.write_blob("currentUser", "u1").unwrap();

            assert_eq!(
                LocalStorage.read_blob("currentUser").unwrap(),
                Some("u1".to_string())
            );

            LocalStorage.write_blob("currentUser", "u2").unwrap();

            assert_eq!(
                LocalStorage.read_blob("currentUser").unwrap(),
                Some("u2".to_string())
            );
        }

        #[wasm_bindgen_test]
        fn test_log() {
            reset();

            assert!(LocalStorage.read_entries().unwrap().is_empty());

            for i in 0..=log::MAX_ENTRIES {
                LocalStorage
                    .write_entry(log::Entry::now(::log::Level::Error, i.to_string()))
                    .unwrap();
            }

            let entries = LocalStorage.read_entries().unwrap();
            assert_eq!(entries.len(), log::MAX_ENTRIES);
            assert_eq!(entries[0].message, log::MAX_ENTRIES.to_string());
        }

        #[wasm_bindgen_test]
        fn test_legacy_workouts() {
            reset();
            LocalStorage
                .write_blob(
                    "workouts",
                    r#"[{"dailyInfo": {"currentDate": "2025-06-01", "sick": "no"}, "exercises": [{"kind": "Plank"}]}]"#,
                )
                .unwrap();

            let mut store = WorkoutStore::new(LocalStorage);
            store.init();
            store.save().unwrap();

            let stored: serde_json::Value =
                serde_json::from_str(&LocalStorage.read_blob("workouts").unwrap().unwrap())
                    .unwrap();
            assert_eq!(stored[0]["date"], serde_json::json!("2025-06-01"));
            assert_eq!(
                store.get_workout_by_date(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()),
                Some(WorkoutRecord::new(
                    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                    vec![ExerciseEntry::new("Plank", vec![])]
                ))
            );
        }
    }
}
