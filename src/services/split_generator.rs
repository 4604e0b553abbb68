// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout split generation.
//!
//! Maps an assessment's (frequency, focus) pair to an ordered list of
//! lettered splits. Each focus has a static table of six split templates;
//! a plan with frequency `n` uses the first `n` templates. The output is a
//! pure function of the inputs.

use crate::models::TrainingFocus;
use serde::Serialize;

pub const MIN_FREQUENCY: u8 = 3;
pub const MAX_FREQUENCY: u8 = 6;

/// One exercise slot in a split template.
#[derive(Debug, Clone, Copy)]
struct TemplateExercise {
    slug: &'static str,
    sets: u32,
    reps: &'static str,
    rest_seconds: u32,
}

#[derive(Debug, Clone, Copy)]
struct SplitTemplate {
    name: &'static str,
    subtitle: &'static str,
    exercises: &'static [TemplateExercise],
}

const fn ex(slug: &'static str, sets: u32, reps: &'static str, rest_seconds: u32) -> TemplateExercise {
    TemplateExercise {
        slug,
        sets,
        reps,
        rest_seconds,
    }
}

const fn split(
    name: &'static str,
    subtitle: &'static str,
    exercises: &'static [TemplateExercise],
) -> SplitTemplate {
    SplitTemplate {
        name,
        subtitle,
        exercises,
    }
}

static LEGS_TEMPLATES: [SplitTemplate; 6] = [
    split(
        "Quad Focus",
        "Squat-dominant lower body",
        &[
            ex("back-squat", 4, "6-8", 150),
            ex("leg-press", 3, "10-12", 90),
            ex("walking-lunge", 3, "12", 60),
            ex("leg-extension", 3, "12-15", 60),
            ex("standing-calf-raise", 4, "15", 45),
        ],
    ),
    split(
        "Upper Body",
        "Push and pull maintenance",
        &[
            ex("bench-press", 4, "6-8", 120),
            ex("barbell-row", 4, "8-10", 90),
            ex("overhead-press", 3, "8-10", 90),
            ex("lat-pulldown", 3, "10-12", 60),
        ],
    ),
    split(
        "Posterior Chain",
        "Hinge-dominant lower body",
        &[
            ex("romanian-deadlift", 4, "8-10", 120),
            ex("hip-thrust", 4, "8-12", 90),
            ex("lying-leg-curl", 3, "10-12", 60),
            ex("bulgarian-split-squat", 3, "8-10", 90),
            ex("seated-calf-raise", 4, "15-20", 45),
        ],
    ),
    split(
        "Unilateral & Power",
        "Single-leg strength and explosiveness",
        &[
            ex("front-squat", 4, "5", 150),
            ex("step-up", 3, "10", 60),
            ex("goblet-squat", 3, "12", 60),
            ex("kettlebell-swing", 3, "15", 60),
            ex("standing-calf-raise", 3, "12-15", 45),
        ],
    ),
    split(
        "Upper Body Hypertrophy",
        "Moderate loads, higher volume",
        &[
            ex("incline-dumbbell-press", 3, "8-12", 90),
            ex("seated-cable-row", 3, "10-12", 90),
            ex("lateral-raise", 3, "12-15", 60),
            ex("dumbbell-curl", 3, "10-12", 60),
            ex("triceps-pushdown", 3, "10-12", 60),
        ],
    ),
    split(
        "Lower Body Volume",
        "Heavy pull, then accumulate volume",
        &[
            ex("deadlift", 3, "5", 180),
            ex("leg-press", 4, "12-15", 90),
            ex("leg-extension", 3, "15", 60),
            ex("lying-leg-curl", 3, "12-15", 60),
            ex("standing-calf-raise", 4, "20", 45),
        ],
    ),
];

static ARMS_TEMPLATES: [SplitTemplate; 6] = [
    split(
        "Biceps & Triceps",
        "Heavy compound arm work",
        &[
            ex("barbell-curl", 4, "8-10", 90),
            ex("close-grip-bench-press", 4, "6-8", 120),
            ex("hammer-curl", 3, "10-12", 60),
            ex("overhead-triceps-extension", 3, "10-12", 60),
        ],
    ),
    split(
        "Lower Body",
        "Balance the week with legs",
        &[
            ex("back-squat", 4, "6-8", 150),
            ex("romanian-deadlift", 3, "8-10", 120),
            ex("leg-press", 3, "10-12", 90),
            ex("standing-calf-raise", 3, "15", 45),
        ],
    ),
    split(
        "Push & Triceps",
        "Chest and shoulders with triceps finishers",
        &[
            ex("bench-press", 4, "6-8", 120),
            ex("overhead-press", 3, "8-10", 90),
            ex("dips", 3, "AMRAP", 90),
            ex("skull-crusher", 3, "10-12", 60),
        ],
    ),
    split(
        "Pull & Biceps",
        "Back width with biceps finishers",
        &[
            ex("pull-up", 4, "AMRAP", 120),
            ex("barbell-row", 3, "8-10", 90),
            ex("preacher-curl", 3, "10-12", 60),
            ex("incline-dumbbell-curl", 3, "10-12", 60),
        ],
    ),
    split(
        "Arm Pump",
        "High-rep isolation",
        &[
            ex("cable-curl", 3, "12-15", 45),
            ex("triceps-pushdown", 3, "12-15", 45),
            ex("concentration-curl", 3, "10-12", 45),
            ex("overhead-triceps-extension", 3, "12-15", 45),
            ex("hammer-curl", 3, "12", 45),
        ],
    ),
    split(
        "Shoulders & Arms",
        "Delts plus a second arm stimulus",
        &[
            ex("lateral-raise", 4, "12-15", 60),
            ex("face-pull", 3, "15", 60),
            ex("dumbbell-curl", 3, "10-12", 60),
            ex("close-grip-bench-press", 3, "8-10", 90),
        ],
    ),
];

static FULL_BODY_TEMPLATES: [SplitTemplate; 6] = [
    split(
        "Full Body Strength",
        "Squat, press, row",
        &[
            ex("back-squat", 4, "5", 180),
            ex("bench-press", 4, "5", 150),
            ex("barbell-row", 4, "6-8", 120),
            ex("plank", 3, "AMRAP", 60),
        ],
    ),
    split(
        "Full Body Hinge",
        "Deadlift-led session",
        &[
            ex("deadlift", 3, "5", 180),
            ex("overhead-press", 4, "6-8", 120),
            ex("pull-up", 3, "AMRAP", 120),
            ex("walking-lunge", 3, "10", 60),
        ],
    ),
    split(
        "Full Body Hypertrophy",
        "Moderate loads across every pattern",
        &[
            ex("leg-press", 3, "10-12", 90),
            ex("incline-dumbbell-press", 3, "8-12", 90),
            ex("seated-cable-row", 3, "10-12", 90),
            ex("lateral-raise", 3, "12-15", 60),
            ex("hanging-leg-raise", 3, "10-15", 60),
        ],
    ),
    split(
        "Full Body Conditioning",
        "Short rests, keep moving",
        &[
            ex("kettlebell-swing", 4, "15", 45),
            ex("thruster", 3, "10", 60),
            ex("push-up", 3, "AMRAP", 45),
            ex("burpee", 3, "12", 45),
            ex("mountain-climber", 3, "20", 30),
        ],
    ),
    split(
        "Full Body Power",
        "Fast, crisp reps",
        &[
            ex("front-squat", 4, "5", 150),
            ex("clean-and-press", 4, "5", 150),
            ex("lat-pulldown", 3, "8-10", 90),
            ex("russian-twist", 3, "20", 45),
        ],
    ),
    split(
        "Full Body Pump",
        "Light loads, high reps",
        &[
            ex("goblet-squat", 3, "12-15", 60),
            ex("push-up", 3, "AMRAP", 60),
            ex("seated-cable-row", 3, "12", 60),
            ex("hammer-curl", 3, "12", 45),
            ex("triceps-pushdown", 3, "12", 45),
        ],
    ),
];

static CORE_TEMPLATES: [SplitTemplate; 6] = [
    split(
        "Core Stability",
        "Bracing and anti-extension",
        &[
            ex("plank", 3, "AMRAP", 60),
            ex("dead-bug", 3, "10-12", 45),
            ex("pallof-press", 3, "10-12", 45),
            ex("side-plank", 3, "AMRAP", 45),
        ],
    ),
    split(
        "Lower Body & Core",
        "Legs with trunk control",
        &[
            ex("goblet-squat", 4, "10-12", 90),
            ex("romanian-deadlift", 3, "8-10", 120),
            ex("walking-lunge", 3, "12", 60),
            ex("hanging-leg-raise", 3, "10-15", 60),
        ],
    ),
    split(
        "Upper Body & Core",
        "Presses and pulls with rollouts",
        &[
            ex("overhead-press", 3, "8-10", 90),
            ex("pull-up", 3, "AMRAP", 120),
            ex("push-up", 3, "AMRAP", 60),
            ex("ab-wheel-rollout", 3, "8-12", 60),
        ],
    ),
    split(
        "Core Strength",
        "Loaded flexion and rotation",
        &[
            ex("cable-crunch", 4, "12-15", 60),
            ex("hanging-leg-raise", 4, "10-12", 60),
            ex("ab-wheel-rollout", 3, "10", 60),
            ex("russian-twist", 3, "20", 45),
        ],
    ),
    split(
        "Conditioning & Core",
        "Intervals that tax the trunk",
        &[
            ex("kettlebell-swing", 4, "15", 45),
            ex("mountain-climber", 3, "20", 30),
            ex("bicycle-crunch", 3, "20", 30),
            ex("burpee", 3, "10", 45),
        ],
    ),
    split(
        "Anti-Rotation & Carries",
        "Resist movement under load",
        &[
            ex("pallof-press", 3, "12", 45),
            ex("farmers-carry", 4, "AMRAP", 90),
            ex("side-plank", 3, "AMRAP", 45),
            ex("dead-bug", 3, "12", 45),
        ],
    ),
];

fn templates_for(focus: TrainingFocus) -> &'static [SplitTemplate; 6] {
    match focus {
        TrainingFocus::Legs => &LEGS_TEMPLATES,
        TrainingFocus::Arms => &ARMS_TEMPLATES,
        TrainingFocus::FullBody => &FULL_BODY_TEMPLATES,
        TrainingFocus::Core => &CORE_TEMPLATES,
    }
}

/// Exercise prescription in a generated split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedExercise {
    /// Catalog slug
    pub slug: String,
    pub sets: u32,
    pub reps: String,
    pub rest_seconds: u32,
}

/// A generated split, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedSplit {
    pub label: String,
    pub name: String,
    pub subtitle: String,
    pub exercises: Vec<GeneratedExercise>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SplitError {
    #[error("frequency must be between 3 and 6 sessions per week, got {0}")]
    Frequency(i64),

    #[error("{0}")]
    Focus(String),
}

impl SplitError {
    pub fn field(&self) -> &'static str {
        match self {
            SplitError::Frequency(_) => "frequency",
            SplitError::Focus(_) => "training_focus",
        }
    }
}

impl From<SplitError> for crate::error::AppError {
    fn from(err: SplitError) -> Self {
        crate::error::AppError::validation(err.field(), err.to_string())
    }
}

/// Check that a requested frequency is within the supported range.
pub fn validate_frequency(frequency: i64) -> Result<u8, SplitError> {
    if (MIN_FREQUENCY as i64..=MAX_FREQUENCY as i64).contains(&frequency) {
        Ok(frequency as u8)
    } else {
        Err(SplitError::Frequency(frequency))
    }
}

/// Label for the split at `index`: 0 -> "A", 1 -> "B", ...
pub fn split_label(index: usize) -> String {
    char::from(b'A' + index as u8).to_string()
}

/// Generate the ordered splits for an assessment.
pub fn generate_splits(
    frequency: i64,
    focus: TrainingFocus,
) -> Result<Vec<GeneratedSplit>, SplitError> {
    let frequency = validate_frequency(frequency)? as usize;

    let splits = templates_for(focus)
        .iter()
        .take(frequency)
        .enumerate()
        .map(|(index, template)| GeneratedSplit {
            label: split_label(index),
            name: template.name.to_string(),
            subtitle: template.subtitle.to_string(),
            exercises: template
                .exercises
                .iter()
                .map(|e| GeneratedExercise {
                    slug: e.slug.to_string(),
                    sets: e.sets,
                    reps: e.reps.to_string(),
                    rest_seconds: e.rest_seconds,
                })
                .collect(),
        })
        .collect();

    Ok(splits)
}

/// Parse the raw focus string from a request, then generate.
///
/// Returns the parsed focus with the splits so callers can persist both.
pub fn generate_splits_from_input(
    frequency: i64,
    focus: &str,
) -> Result<(TrainingFocus, Vec<GeneratedSplit>), SplitError> {
    let focus = focus.parse::<TrainingFocus>().map_err(SplitError::Focus)?;
    let splits = generate_splits(frequency, focus)?;
    Ok((focus, splits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TargetReps;
    use crate::services::catalog;

    #[test]
    fn test_generates_frequency_splits_with_letters() {
        for &focus in TrainingFocus::all() {
            for frequency in 3..=6 {
                let splits = generate_splits(frequency, focus).unwrap();
                assert_eq!(splits.len(), frequency as usize);

                let labels: Vec<&str> = splits.iter().map(|s| s.label.as_str()).collect();
                let expected: Vec<String> = (0..frequency as usize).map(split_label).collect();
                assert_eq!(labels, expected);
                assert_eq!(labels[0], "A");

                for split in &splits {
                    assert!(!split.exercises.is_empty(), "{} has no exercises", split.name);
                }
            }
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let first = generate_splits(4, TrainingFocus::Legs).unwrap();
        let second = generate_splits(4, TrainingFocus::Legs).unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0].exercises[0].slug, "back-squat");
    }

    #[test]
    fn test_smaller_plan_is_prefix_of_larger() {
        let three = generate_splits(3, TrainingFocus::Arms).unwrap();
        let six = generate_splits(6, TrainingFocus::Arms).unwrap();
        assert_eq!(three[..], six[..3]);
    }

    #[test]
    fn test_rejects_out_of_range_frequency() {
        assert_eq!(
            generate_splits(2, TrainingFocus::Core),
            Err(SplitError::Frequency(2))
        );
        assert_eq!(
            generate_splits(7, TrainingFocus::Core),
            Err(SplitError::Frequency(7))
        );
        assert_eq!(SplitError::Frequency(7).field(), "frequency");
    }

    #[test]
    fn test_rejects_unknown_focus() {
        let err = generate_splits_from_input(4, "INVALID").unwrap_err();
        assert!(matches!(err, SplitError::Focus(_)));
        assert_eq!(err.field(), "training_focus");
    }

    #[test]
    fn test_generate_from_input_parses_focus() {
        let (focus, splits) = generate_splits_from_input(5, " CORE ").unwrap();
        assert_eq!(focus, TrainingFocus::Core);
        assert_eq!(splits, generate_splits(5, TrainingFocus::Core).unwrap());

        // Frequency is checked even when the focus is valid.
        assert_eq!(
            generate_splits_from_input(7, "LEGS").unwrap_err(),
            SplitError::Frequency(7)
        );
    }

    #[test]
    fn test_templates_reference_catalog_and_valid_reps() {
        for &focus in TrainingFocus::all() {
            for template in templates_for(focus) {
                for e in template.exercises {
                    assert!(
                        catalog::find(e.slug).is_some(),
                        "{} references unknown slug {}",
                        template.name,
                        e.slug
                    );
                    assert!(
                        e.reps.parse::<TargetReps>().is_ok(),
                        "{} has bad reps {}",
                        e.slug,
                        e.reps
                    );
                    assert!(e.sets > 0);
                }
            }
        }
    }
}
