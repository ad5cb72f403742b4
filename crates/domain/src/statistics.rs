use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::{ExerciseEntry, MuscleGroup, MuscleGroupClassifier, WorkoutRecord};

/// The Sunday starting the week that contains `today`.
#[must_use]
pub fn week_start(today: NaiveDate) -> NaiveDate {
    today - Days::new(u64::from(today.weekday().num_days_from_sunday()))
}

/// Records dated on or after the start of the current week.
#[must_use]
pub fn this_week_workouts(workouts: &[WorkoutRecord], today: NaiveDate) -> Vec<WorkoutRecord> {
    let start = week_start(today);
    workouts
        .iter()
        .filter(|w| w.date >= start)
        .cloned()
        .collect()
}

fn known_groups() -> BTreeMap<MuscleGroup, usize> {
    MuscleGroup::known().map(|group| (group, 0)).collect()
}

/// Number of sets per muscle group performed in the current week.
///
/// Every known group is present in the result. Exercises of unknown groups are not counted.
#[must_use]
pub fn weekly_set_counts(
    workouts: &[WorkoutRecord],
    today: NaiveDate,
    classifier: &impl MuscleGroupClassifier,
) -> BTreeMap<MuscleGroup, usize> {
    let mut counts = known_groups();
    for workout in this_week_workouts(workouts, today) {
        for exercise in &workout.exercises {
            if let Some(count) = counts.get_mut(&classifier.muscle_group(&exercise.kind)) {
                *count += exercise.set_count();
            }
        }
    }
    counts
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseOccurrence {
    pub date: NaiveDate,
    pub exercise: ExerciseEntry,
}

/// The latest `limit` occurrences of an exercise, oldest first.
///
/// Only the first exercise of the given kind within a workout is taken into account.
#[must_use]
pub fn exercise_history(
    workouts: &[WorkoutRecord],
    kind: &str,
    limit: usize,
) -> Vec<ExerciseOccurrence> {
    let mut history = workouts
        .iter()
        .rev()
        .filter_map(|w| {
            w.exercise(kind).map(|exercise| ExerciseOccurrence {
                date: w.date,
                exercise: exercise.clone(),
            })
        })
        .take(limit)
        .collect::<Vec<_>>();
    history.reverse();
    history
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PersonalBest {
    pub date: NaiveDate,
    pub weight: f32,
    pub reps: u32,
}

/// The heaviest set ever performed of an exercise.
///
/// On equal weight the earliest set wins. `None` if no set of the exercise has been logged.
#[must_use]
pub fn personal_best(workouts: &[WorkoutRecord], kind: &str) -> Option<PersonalBest> {
    let mut best: Option<PersonalBest> = None;
    for workout in workouts {
        for set in workout
            .exercises
            .iter()
            .filter(|e| e.kind == kind)
            .flat_map(|e| &e.sets)
        {
            if best.is_none_or(|b| set.weight > b.weight) {
                best = Some(PersonalBest {
                    date: workout.date,
                    weight: set.weight,
                    reps: set.reps,
                });
            }
        }
    }
    best
}

/// Identifier of the week containing `today`, e.g. `2026-W03`.
///
/// Weeks start on Sunday and the first week of a year is the one containing January 1st.
#[must_use]
pub fn week_id(today: NaiveDate) -> String {
    let year = today.year();
    let jan_1 = today.with_ordinal(1).unwrap_or(today);
    let offset = today.ordinal0() + jan_1.weekday().num_days_from_sunday() + 1;
    format!("{year}-W{:02}", offset.div_ceil(7))
}

/// Training statistics of the current week, as published to the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStats {
    pub week_id: String,
    pub total_volume: u64,
    pub total_sets: usize,
    pub total_reps: u64,
    pub days_training: usize,
    pub exercise_count: usize,
    pub muscle_groups: BTreeMap<MuscleGroup, usize>,
    pub score: u64,
}

#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn weekly_stats(
    workouts: &[WorkoutRecord],
    today: NaiveDate,
    classifier: &impl MuscleGroupClassifier,
) -> WeeklyStats {
    let mut volume = 0.0_f64;
    let mut total_sets = 0;
    let mut total_reps = 0;
    let mut muscle_groups = known_groups();
    let mut exercises = BTreeSet::new();
    let mut days = BTreeSet::new();

    for workout in this_week_workouts(workouts, today) {
        days.insert(workout.date);
        for exercise in &workout.exercises {
            exercises.insert(exercise.kind.clone());
            for set in &exercise.sets {
                volume += f64::from(set.weight) * f64::from(set.reps);
                total_reps += u64::from(set.reps);
                total_sets += 1;
            }
            if let Some(count) = muscle_groups.get_mut(&classifier.muscle_group(&exercise.kind)) {
                *count += exercise.sets.len();
            }
        }
    }

    let score = (total_sets as f64 * 10.0 + volume / 1000.0 + days.len() as f64 * 50.0).round();

    WeeklyStats {
        week_id: week_id(today),
        total_volume: volume.round().max(0.0) as u64,
        total_sets,
        total_reps,
        days_training: days.len(),
        exercise_count: exercises.len(),
        muscle_groups,
        score: score.max(0.0) as u64,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use assert_approx_eq::assert_approx_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::{Catalog, SetEntry};

    // Wednesday
    static TODAY: LazyLock<NaiveDate> =
        LazyLock::new(|| NaiveDate::from_ymd_opt(2026, 10, 21).unwrap());

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, month, day).unwrap()
    }

    fn workout(date: NaiveDate, exercises: Vec<ExerciseEntry>) -> WorkoutRecord {
        WorkoutRecord::new(date, exercises)
    }

    fn sets(weights: &[f32]) -> Vec<SetEntry> {
        weights.iter().map(|w| SetEntry::new(*w, 8)).collect()
    }

    static WORKOUTS: LazyLock<Vec<WorkoutRecord>> = LazyLock::new(|| {
        vec![
            workout(
                date(10, 17),
                vec![ExerciseEntry::new("Bench Press", sets(&[100.0, 100.0]))],
            ),
            workout(
                date(10, 18),
                vec![
                    ExerciseEntry::new("Bench Press", sets(&[120.0, 110.0, 100.0])),
                    ExerciseEntry::new("Pull-Ups", sets(&[0.0, 0.0])),
                ],
            ),
            workout(
                date(10, 20),
                vec![
                    ExerciseEntry::new("Squat", sets(&[140.0])),
                    ExerciseEntry::new("Farmer's Walk", sets(&[40.0])),
                    ExerciseEntry::new("Bench Press", sets(&[110.0])),
                ],
            ),
        ]
    });

    #[rstest]
    #[case::sunday(date(10, 18), date(10, 18))]
    #[case::wednesday(date(10, 21), date(10, 18))]
    #[case::saturday(date(10, 24), date(10, 18))]
    #[case::across_year(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(), NaiveDate::from_ymd_opt(2025, 12, 28).unwrap())]
    fn test_week_start(#[case] today: NaiveDate, #[case] expected: NaiveDate) {
        assert_eq!(week_start(today), expected);
    }

    #[test]
    fn test_this_week_workouts() {
        assert_eq!(
            this_week_workouts(&WORKOUTS, *TODAY)
                .iter()
                .map(|w| w.date)
                .collect::<Vec<_>>(),
            vec![date(10, 18), date(10, 20)]
        );
    }

    #[test]
    fn test_weekly_set_counts() {
        assert_eq!(
            weekly_set_counts(&WORKOUTS, *TODAY, &Catalog::default()),
            BTreeMap::from([
                (MuscleGroup::Chest, 4),
                (MuscleGroup::Back, 2),
                (MuscleGroup::Shoulders, 0),
                (MuscleGroup::Arms, 0),
                (MuscleGroup::Legs, 1),
                (MuscleGroup::Abs, 0),
            ])
        );
    }

    #[test]
    fn test_weekly_set_counts_empty() {
        assert_eq!(
            weekly_set_counts(&[], *TODAY, &Catalog::default()),
            MuscleGroup::known().map(|g| (g, 0)).collect()
        );
    }

    #[test]
    fn test_weekly_set_counts_legacy_exercise() {
        let mut legacy = ExerciseEntry::new("Dumbbell Curl", vec![]);
        legacy.weight = Some(12.5);
        legacy.reps = Some(10);

        let counts = weekly_set_counts(&[workout(*TODAY, vec![legacy])], *TODAY, &Catalog::default());

        assert_eq!(counts[&MuscleGroup::Arms], 1);
    }

    #[rstest]
    #[case::limited(
        "Bench Press",
        2,
        vec![(date(10, 18), 120.0), (date(10, 20), 110.0)]
    )]
    #[case::all(
        "Bench Press",
        10,
        vec![(date(10, 17), 100.0), (date(10, 18), 120.0), (date(10, 20), 110.0)]
    )]
    #[case::zero_limit("Bench Press", 0, vec![])]
    #[case::unknown("Deadlift", 10, vec![])]
    fn test_exercise_history(
        #[case] kind: &str,
        #[case] limit: usize,
        #[case] expected: Vec<(NaiveDate, f32)>,
    ) {
        assert_eq!(
            exercise_history(&WORKOUTS, kind, limit)
                .iter()
                .map(|o| (o.date, o.exercise.sets[0].weight))
                .collect::<Vec<_>>(),
            expected
        );
    }

    #[test]
    fn test_exercise_history_first_occurrence_per_workout() {
        let workouts = vec![workout(
            *TODAY,
            vec![
                ExerciseEntry::new("Bench Press", sets(&[60.0])),
                ExerciseEntry::new("Bench Press", sets(&[80.0])),
            ],
        )];

        let history = exercise_history(&workouts, "Bench Press", 10);

        assert_eq!(history.len(), 1);
        assert_approx_eq!(history[0].exercise.sets[0].weight, 60.0);
    }

    #[test]
    fn test_personal_best() {
        let workouts = vec![
            workout(date(1, 1), vec![ExerciseEntry::new("Bench", sets(&[100.0]))]),
            workout(date(1, 2), vec![ExerciseEntry::new("Bench", sets(&[120.0]))]),
            workout(date(1, 3), vec![ExerciseEntry::new("Bench", sets(&[110.0]))]),
        ];

        let best = personal_best(&workouts, "Bench").unwrap();

        assert_eq!(best.date, date(1, 2));
        assert_approx_eq!(best.weight, 120.0);
        assert_eq!(best.reps, 8);
    }

    #[test]
    fn test_personal_best_tie_first_occurrence() {
        let workouts = vec![
            workout(
                date(1, 1),
                vec![ExerciseEntry::new("Bench", vec![SetEntry::new(120.0, 3)])],
            ),
            workout(
                date(1, 2),
                vec![ExerciseEntry::new("Bench", vec![SetEntry::new(120.0, 5)])],
            ),
        ];

        let best = personal_best(&workouts, "Bench").unwrap();

        assert_eq!(best.date, date(1, 1));
        assert_eq!(best.reps, 3);
    }

    #[rstest]
    #[case::never_logged("Deadlift")]
    #[case::no_sets("Plank")]
    fn test_personal_best_none(#[case] kind: &str) {
        let workouts = vec![workout(*TODAY, vec![ExerciseEntry::new("Plank", vec![])])];

        assert_eq!(personal_best(&workouts, kind), None);
    }

    #[test]
    fn test_personal_best_bodyweight() {
        let best = personal_best(&WORKOUTS, "Pull-Ups").unwrap();

        assert_eq!(best.date, date(10, 18));
        assert_approx_eq!(best.weight, 0.0);
    }

    #[rstest]
    #[case::first_day(date(1, 1), "2026-W01")]
    #[case::first_sunday(date(1, 4), "2026-W02")]
    #[case::autumn(date(10, 19), "2026-W43")]
    #[case::last_day_2025(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(), "2025-W53")]
    #[case::sunday_start_year(NaiveDate::from_ymd_opt(2023, 1, 7).unwrap(), "2023-W01")]
    fn test_week_id(#[case] today: NaiveDate, #[case] expected: &str) {
        assert_eq!(week_id(today), expected);
    }

    #[test]
    fn test_weekly_stats() {
        let stats = weekly_stats(&WORKOUTS, *TODAY, &Catalog::default());

        assert_eq!(
            stats,
            WeeklyStats {
                week_id: "2026-W43".to_string(),
                total_volume: 4960,
                total_sets: 8,
                total_reps: 64,
                days_training: 2,
                exercise_count: 4,
                muscle_groups: BTreeMap::from([
                    (MuscleGroup::Chest, 4),
                    (MuscleGroup::Back, 2),
                    (MuscleGroup::Shoulders, 0),
                    (MuscleGroup::Arms, 0),
                    (MuscleGroup::Legs, 1),
                    (MuscleGroup::Abs, 0),
                ]),
                score: 185,
            }
        );
    }
}
