use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

pub trait MuscleGroupClassifier {
    fn muscle_group(&self, kind: &str) -> MuscleGroup;
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    AsRefStr,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
pub enum MuscleGroup {
    Chest,
    Back,
    Shoulders,
    Arms,
    Legs,
    Abs,
    Other,
}

impl MuscleGroup {
    /// The groups weekly volume is tracked for, i.e. all except `Other`.
    pub fn known() -> impl Iterator<Item = MuscleGroup> {
        MuscleGroup::iter().filter(|g| *g != MuscleGroup::Other)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub name: Cow<'static, str>,
    pub muscle_group: MuscleGroup,
    pub equipment: Cow<'static, str>,
}

impl Exercise {
    #[must_use]
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        muscle_group: MuscleGroup,
        equipment: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            name: name.into(),
            muscle_group,
            equipment: equipment.into(),
        }
    }
}

/// Exercise name to muscle group lookup.
///
/// Names not in the table are matched case-insensitively, then by substring in either
/// direction, then by keyword. Exercises added at runtime take precedence over table entries
/// of the same name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    custom: Vec<Exercise>,
}

impl Catalog {
    /// Add `exercise`, replacing any entry of the same name.
    pub fn add_exercise(&mut self, exercise: Exercise) {
        match self.custom.iter_mut().find(|e| e.name == exercise.name) {
            Some(existing) => *existing = exercise,
            None => self.custom.push(exercise),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Exercise> {
        self.exercises().find(|e| e.name == name).or_else(|| {
            let lower = name.to_lowercase();
            self.exercises().find(|e| e.name.to_lowercase() == lower)
        })
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The entry for `name`, or an entry with inferred muscle group and unknown equipment.
    #[must_use]
    pub fn info(&self, name: &str) -> Exercise {
        self.get(name).cloned().unwrap_or_else(|| {
            Exercise::new(name.to_string(), self.muscle_group(name), "unknown")
        })
    }

    pub fn exercises_for(&self, muscle_group: MuscleGroup) -> impl Iterator<Item = &Exercise> {
        self.exercises()
            .filter(move |e| e.muscle_group == muscle_group)
    }

    /// Table entries in table order, followed by added exercises.
    pub fn exercises(&self) -> impl Iterator<Item = &Exercise> {
        EXERCISES
            .iter()
            .map(move |e| self.custom.iter().find(|c| c.name == e.name).unwrap_or(e))
            .chain(
                self.custom
                    .iter()
                    .filter(|c| EXERCISES.iter().all(|e| e.name != c.name)),
            )
    }
}

impl MuscleGroupClassifier for Catalog {
    fn muscle_group(&self, kind: &str) -> MuscleGroup {
        if kind.is_empty() {
            return MuscleGroup::Other;
        }

        if let Some(exercise) = self.get(kind) {
            return exercise.muscle_group;
        }

        let lower = kind.to_lowercase();

        if let Some(exercise) = self.exercises().find(|e| {
            let name = e.name.to_lowercase();
            lower.contains(&name) || name.contains(&lower)
        }) {
            return exercise.muscle_group;
        }

        KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
            .map_or(MuscleGroup::Other, |(group, _)| *group)
    }
}

impl<F: Fn(&str) -> MuscleGroup> MuscleGroupClassifier for F {
    fn muscle_group(&self, kind: &str) -> MuscleGroup {
        self(kind)
    }
}

/// Keyword fallback in priority order. Abs comes first as e.g. "leg raise" is a core exercise.
const KEYWORDS: [(MuscleGroup, &[&str]); 6] = [
    (
        MuscleGroup::Abs,
        &[
            "crunch",
            "plank",
            "ab ",
            "abs",
            "core",
            "sit-up",
            "situp",
            "leg raise",
            "rollout",
            "pallof",
            "woodchop",
            "dead bug",
            "v-up",
            "flutter",
            "mountain climber",
        ],
    ),
    (
        MuscleGroup::Chest,
        &["bench", "chest", "fly", "pec", "push-up", "pushup"],
    ),
    (
        MuscleGroup::Back,
        &[
            "row", "pull-up", "pullup", "pulldown", "lat", "deadlift", "back", "chin-up", "chinup",
        ],
    ),
    (
        MuscleGroup::Shoulders,
        &[
            "shoulder",
            "ohp",
            "overhead press",
            "lateral raise",
            "delt",
            "shrug",
            "military",
        ],
    ),
    (
        MuscleGroup::Arms,
        &["curl", "tricep", "bicep", "pushdown", "extension", "skull"],
    ),
    (
        MuscleGroup::Legs,
        &[
            "squat",
            "lunge",
            "leg press",
            "leg extension",
            "leg curl",
            "calf",
            "ham",
            "quad",
            "glute",
            "hip thrust",
        ],
    ),
];

macro_rules! exercise {
    ($name: literal, $group: ident, $equipment: literal) => {
        Exercise {
            name: Cow::Borrowed($name),
            muscle_group: MuscleGroup::$group,
            equipment: Cow::Borrowed($equipment),
        }
    };
}

static EXERCISES: [Exercise; 112] = [
    // Chest
    exercise!("Dumbbell Bench Press", Chest, "dumbbells, bench"),
    exercise!("Barbell Bench Press", Chest, "barbell, bench"),
    exercise!("Incline Dumbbell Press", Chest, "dumbbells, incline bench"),
    exercise!("Incline Barbell Press", Chest, "barbell, incline bench"),
    exercise!("Decline Bench Press", Chest, "barbell, decline bench"),
    exercise!("Cable Chest Fly", Chest, "cable machine"),
    exercise!("Dumbbell Fly", Chest, "dumbbells, bench"),
    exercise!("Pec Deck", Chest, "pec deck machine"),
    exercise!("Low-to-High Cable Fly", Chest, "cable machine"),
    exercise!("High-to-Low Cable Fly", Chest, "cable machine"),
    exercise!("Dips (Chest Focus)", Chest, "dip bars"),
    exercise!("Push-Ups", Chest, "bodyweight"),
    exercise!("Machine Chest Press", Chest, "chest press machine"),
    // Back
    exercise!("Weighted Pull-Ups", Back, "pull-up bar, weight belt"),
    exercise!("Pull-Ups", Back, "pull-up bar"),
    exercise!("Chin-Ups", Back, "pull-up bar"),
    exercise!("Lat Pulldown", Back, "cable machine"),
    exercise!("Barbell Row", Back, "barbell"),
    exercise!("Dumbbell Row", Back, "dumbbells"),
    exercise!("One-Arm Dumbbell Row", Back, "dumbbell, bench"),
    exercise!("Seated Cable Row", Back, "cable machine"),
    exercise!("T-Bar Row", Back, "t-bar"),
    exercise!("Pendlay Row", Back, "barbell"),
    exercise!("Face Pull", Back, "cable machine"),
    exercise!("Deadlift", Back, "barbell"),
    exercise!("Romanian Deadlift", Legs, "barbell"),
    exercise!("Rack Pull", Back, "barbell, rack"),
    exercise!("Straight-Arm Pulldown", Back, "cable machine"),
    exercise!("Machine Row", Back, "row machine"),
    exercise!("Inverted Row", Back, "barbell, rack"),
    // Shoulders
    exercise!("Barbell Overhead Press", Shoulders, "barbell"),
    exercise!("Dumbbell Shoulder Press", Shoulders, "dumbbells"),
    exercise!("Arnold Press", Shoulders, "dumbbells"),
    exercise!("Lateral Raise", Shoulders, "dumbbells"),
    exercise!("Dumbbell Lateral Raise", Shoulders, "dumbbells"),
    exercise!("Cable Lateral Raise", Shoulders, "cable machine"),
    exercise!("Machine Lateral Raise", Shoulders, "lateral raise machine"),
    exercise!("Front Raise", Shoulders, "dumbbells"),
    exercise!("Rear Delt Fly", Shoulders, "dumbbells"),
    exercise!("Reverse Pec Deck", Shoulders, "pec deck machine"),
    exercise!("Upright Row", Shoulders, "barbell"),
    exercise!("Shrugs", Shoulders, "dumbbells"),
    exercise!("Barbell Shrugs", Shoulders, "barbell"),
    exercise!("Military Press", Shoulders, "barbell"),
    exercise!("Push Press", Shoulders, "barbell"),
    exercise!("Machine Shoulder Press", Shoulders, "shoulder press machine"),
    exercise!("Lu Raises", Shoulders, "dumbbells"),
    // Biceps
    exercise!("Barbell Curl", Arms, "barbell"),
    exercise!("Dumbbell Curl", Arms, "dumbbells"),
    exercise!("Hammer Curl", Arms, "dumbbells"),
    exercise!("Incline Dumbbell Curl", Arms, "dumbbells, incline bench"),
    exercise!("Preacher Curl", Arms, "preacher bench, barbell"),
    exercise!("Cable Curl", Arms, "cable machine"),
    exercise!("Concentration Curl", Arms, "dumbbell"),
    exercise!("EZ Bar Curl", Arms, "ez bar"),
    exercise!("Spider Curl", Arms, "dumbbells, incline bench"),
    // Triceps
    exercise!("Cable Tricep Pushdown", Arms, "cable machine"),
    exercise!("Tricep Pushdown", Arms, "cable machine"),
    exercise!("Rope Pushdown", Arms, "cable machine"),
    exercise!("Overhead Tricep Extension", Arms, "dumbbell"),
    exercise!("Cable Overhead Extension", Arms, "cable machine"),
    exercise!("Skull Crushers", Arms, "barbell, bench"),
    exercise!("Close-Grip Bench Press", Arms, "barbell, bench"),
    exercise!("Dips (Tricep Focus)", Arms, "dip bars"),
    exercise!("Diamond Push-Ups", Arms, "bodyweight"),
    exercise!("Tricep Kickback", Arms, "dumbbells"),
    // Legs
    exercise!("Back Squat", Legs, "barbell, rack"),
    exercise!("Front Squat", Legs, "barbell, rack"),
    exercise!("Goblet Squat", Legs, "dumbbell"),
    exercise!("Leg Press", Legs, "leg press machine"),
    exercise!("Hack Squat", Legs, "hack squat machine"),
    exercise!("Bulgarian Split Squat", Legs, "dumbbells, bench"),
    exercise!("Lunges", Legs, "dumbbells"),
    exercise!("Walking Lunges", Legs, "dumbbells"),
    exercise!("Stiff-Leg Deadlift", Legs, "barbell"),
    exercise!("Leg Curl", Legs, "leg curl machine"),
    exercise!("Lying Leg Curl", Legs, "leg curl machine"),
    exercise!("Seated Leg Curl", Legs, "leg curl machine"),
    exercise!("Leg Extension", Legs, "leg extension machine"),
    exercise!("Calf Raise", Legs, "calf raise machine"),
    exercise!("Standing Calf Raise", Legs, "smith machine"),
    exercise!("Seated Calf Raise", Legs, "seated calf machine"),
    exercise!("Hip Thrust", Legs, "barbell, bench"),
    exercise!("Glute Bridge", Legs, "bodyweight"),
    exercise!("Step-Ups", Legs, "dumbbells, box"),
    exercise!("Box Jumps", Legs, "plyo box"),
    exercise!("Wall Sit", Legs, "bodyweight"),
    // Abs
    exercise!("Hanging Leg Raises", Abs, "pull-up bar"),
    exercise!("Hanging Knee Raises", Abs, "pull-up bar"),
    exercise!("Hanging Oblique Raises", Abs, "pull-up bar"),
    exercise!("Cable Crunch", Abs, "cable machine"),
    exercise!("Ab Wheel Rollout", Abs, "ab wheel"),
    exercise!("Plank", Abs, "bodyweight"),
    exercise!("Plank Hold", Abs, "bodyweight"),
    exercise!("Side Plank", Abs, "bodyweight"),
    exercise!("Russian Twist", Abs, "bodyweight"),
    exercise!("Bicycle Crunch", Abs, "bodyweight"),
    exercise!("Crunches", Abs, "bodyweight"),
    exercise!("Sit-Ups", Abs, "bodyweight"),
    exercise!("Leg Raises", Abs, "bodyweight"),
    exercise!("Lying Leg Raises", Abs, "bodyweight"),
    exercise!("V-Ups", Abs, "bodyweight"),
    exercise!("Mountain Climbers", Abs, "bodyweight"),
    exercise!("Dead Bug", Abs, "bodyweight"),
    exercise!("Pallof Press", Abs, "cable machine"),
    exercise!("Woodchop", Abs, "cable machine"),
    exercise!("Dragon Flag", Abs, "bench"),
    exercise!("L-Sit", Abs, "parallettes"),
    exercise!("Decline Sit-Ups", Abs, "decline bench"),
    exercise!("Toe Touches", Abs, "bodyweight"),
    exercise!("Flutter Kicks", Abs, "bodyweight"),
    exercise!("Reverse Crunch", Abs, "bodyweight"),
];
