use chrono::{Days, NaiveDate};

use crate::{MuscleGroup, MuscleGroupClassifier, WorkoutRecord};

/// Criteria for selecting workouts. All given criteria must be met.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkoutFilter {
    pub days: Option<u64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub exercise: Option<String>,
    pub muscle_group: Option<MuscleGroup>,
}

impl WorkoutFilter {
    /// Workouts of the trailing `days` days, counted back from today. Zero days select all workouts.
    #[must_use]
    pub fn days(mut self, days: u64) -> Self {
        self.days = Some(days);
        self
    }

    #[must_use]
    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    #[must_use]
    pub fn end_date(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    #[must_use]
    pub fn exercise(mut self, kind: impl Into<String>) -> Self {
        self.exercise = Some(kind.into());
        self
    }

    #[must_use]
    pub fn muscle_group(mut self, muscle_group: MuscleGroup) -> Self {
        self.muscle_group = Some(muscle_group);
        self
    }

    #[must_use]
    pub fn matches(
        &self,
        workout: &WorkoutRecord,
        today: NaiveDate,
        classifier: &impl MuscleGroupClassifier,
    ) -> bool {
        if let Some(days) = self.days.filter(|days| *days > 0) {
            let cutoff = today.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN);
            if workout.date < cutoff {
                return false;
            }
        }
        if self.start_date.is_some_and(|start| workout.date < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| workout.date > end) {
            return false;
        }
        if let Some(kind) = &self.exercise {
            if !workout.contains_exercise(kind) {
                return false;
            }
        }
        if let Some(muscle_group) = self.muscle_group {
            if !workout
                .exercises
                .iter()
                .any(|e| classifier.muscle_group(&e.kind) == muscle_group)
            {
                return false;
            }
        }
        true
    }
}

#[must_use]
pub fn filter_workouts(
    workouts: &[WorkoutRecord],
    filter: &WorkoutFilter,
    today: NaiveDate,
    classifier: &impl MuscleGroupClassifier,
) -> Vec<WorkoutRecord> {
    workouts
        .iter()
        .filter(|w| filter.matches(w, today, classifier))
        .cloned()
        .collect()
}
