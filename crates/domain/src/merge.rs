//! Reconciliation of two workout collections.
//!
//! Two policies exist because the two callers resolve conflicts differently:
//!
//! - [`merge_by_date`] is used when importing a backup file. Records are matched by date, the
//!   imported scalar fields win, exercise lists are combined. The result is in ascending date
//!   order.
//! - [`merge_by_id`] is used when synchronizing with the cloud. Records are matched by id and the
//!   cloud copy replaces the local one completely. The result is in descending date order.
//!
//! Both functions leave their inputs untouched.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;

use crate::{ExerciseEntry, WorkoutID, WorkoutRecord};

/// Merge `incoming` into `base` keyed by date.
///
/// For a date present on both sides, the scalar fields of the incoming record override those of
/// the base record (absent incoming values keep the base value) and the exercise lists are
/// concatenated, dropping every incoming exercise whose kind is already in the list.
///
/// The exercise rule also drops an incoming exercise that legitimately occurred twice on the
/// same day under the same name.
#[must_use]
pub fn merge_by_date(base: &[WorkoutRecord], incoming: &[WorkoutRecord]) -> Vec<WorkoutRecord> {
    let mut by_date: BTreeMap<NaiveDate, WorkoutRecord> =
        base.iter().map(|w| (w.date, w.clone())).collect();

    for workout in incoming {
        let merged = match by_date.remove(&workout.date) {
            Some(existing) => overlay(existing, workout),
            None => workout.clone(),
        };
        by_date.insert(workout.date, merged);
    }

    by_date.into_values().collect()
}

fn overlay(base: WorkoutRecord, incoming: &WorkoutRecord) -> WorkoutRecord {
    let mut exercises = base.exercises;
    append_new_kinds(&mut exercises, &incoming.exercises);

    let mut extra = base.extra;
    extra.extend(incoming.extra.clone());

    WorkoutRecord {
        id: incoming.id.clone().or(base.id),
        date: base.date,
        time: incoming.time.clone().or(base.time),
        sleep_quality: incoming.sleep_quality.or(base.sleep_quality),
        stress_level: incoming.stress_level.or(base.stress_level),
        muscle_soreness: incoming.muscle_soreness.or(base.muscle_soreness),
        body_weight: incoming.body_weight.or(base.body_weight),
        sick: incoming.sick,
        injured: incoming.injured,
        exercises,
        extra,
    }
}

fn append_new_kinds(exercises: &mut Vec<ExerciseEntry>, additional: &[ExerciseEntry]) {
    for exercise in additional {
        if !exercises.iter().any(|e| e.kind == exercise.kind) {
            exercises.push(exercise.clone());
        }
    }
}

/// Merge local records (`base`) with cloud records (`incoming`) keyed by id.
///
/// Every incoming record is kept as is and replaces a local record with the same id. Local
/// records with an unknown id are kept, local records without an id get a generated one.
#[must_use]
pub fn merge_by_id(base: &[WorkoutRecord], incoming: &[WorkoutRecord]) -> Vec<WorkoutRecord> {
    merge_by_id_with(base, incoming, |w| WorkoutID::generate(w.date))
}

/// [`merge_by_id`] with an explicit generator for missing identifiers.
pub fn merge_by_id_with(
    base: &[WorkoutRecord],
    incoming: &[WorkoutRecord],
    mut generate: impl FnMut(&WorkoutRecord) -> WorkoutID,
) -> Vec<WorkoutRecord> {
    let mut merged: Vec<WorkoutRecord> = Vec::with_capacity(base.len() + incoming.len());
    let mut index: HashMap<WorkoutID, usize> = HashMap::new();

    for workout in incoming {
        let mut workout = workout.clone();
        let id = match &workout.id {
            Some(id) => id.clone(),
            None => {
                let id = generate(&workout);
                workout.id = Some(id.clone());
                id
            }
        };
        if let Some(&i) = index.get(&id) {
            merged[i] = workout;
        } else {
            index.insert(id, merged.len());
            merged.push(workout);
        }
    }

    for workout in base {
        match &workout.id {
            Some(id) if index.contains_key(id) => {}
            Some(id) => {
                index.insert(id.clone(), merged.len());
                merged.push(workout.clone());
            }
            None => {
                let mut workout = workout.clone();
                let id = generate(&workout);
                workout.id = Some(id.clone());
                index.insert(id, merged.len());
                merged.push(workout);
            }
        }
    }

    merged.sort_by(|a, b| b.date.cmp(&a.date));
    merged
}

/// Fold records sharing a date into one record per date, in ascending date order.
///
/// The first record of a date is kept and exercises of the following records are appended
/// unless their kind is already present.
#[must_use]
pub fn collapse_dates(records: Vec<WorkoutRecord>) -> Vec<WorkoutRecord> {
    let mut by_date: BTreeMap<NaiveDate, WorkoutRecord> = BTreeMap::new();

    for record in records {
        match by_date.get_mut(&record.date) {
            Some(existing) => append_new_kinds(&mut existing.exercises, &record.exercises),
            None => {
                by_date.insert(record.date, record);
            }
        }
    }

    by_date.into_values().collect()
}

/// Records of `merged` that are not identical to a record of `incoming` with the same id.
#[must_use]
pub fn pending_upload(merged: &[WorkoutRecord], incoming: &[WorkoutRecord]) -> Vec<WorkoutRecord> {
    let incoming: HashMap<&WorkoutID, &WorkoutRecord> = incoming
        .iter()
        .filter_map(|w| w.id.as_ref().map(|id| (id, w)))
        .collect();

    merged
        .iter()
        .filter(|w| {
            w.id.as_ref()
                .and_then(|id| incoming.get(id))
                .is_none_or(|cloud| *cloud != *w)
        })
        .cloned()
        .collect()
}

/// True if no two records share a date.
#[must_use]
pub fn has_unique_dates(records: &[WorkoutRecord]) -> bool {
    let mut dates = HashSet::new();
    records.iter().all(|w| dates.insert(w.date))
}
