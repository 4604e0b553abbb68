// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Built-in exercise catalog.
//!
//! Seeded into the `exercises` table when the database is opened. Split
//! templates refer to these entries by slug.

use crate::models::MuscleGroup;

/// A built-in catalog entry.
#[derive(Debug, Clone, Copy)]
pub struct CatalogExercise {
    pub slug: &'static str,
    pub name: &'static str,
    pub muscle_group: MuscleGroup,
    pub equipment: Option<&'static str>,
}

const fn entry(
    slug: &'static str,
    name: &'static str,
    muscle_group: MuscleGroup,
    equipment: Option<&'static str>,
) -> CatalogExercise {
    CatalogExercise {
        slug,
        name,
        muscle_group,
        equipment,
    }
}

use MuscleGroup::*;

const BARBELL: Option<&str> = Some("barbell");
const DUMBBELL: Option<&str> = Some("dumbbell");
const CABLE: Option<&str> = Some("cable");
const MACHINE: Option<&str> = Some("machine");
const KETTLEBELL: Option<&str> = Some("kettlebell");
const BODYWEIGHT: Option<&str> = None;

pub static CATALOG: &[CatalogExercise] = &[
    // Legs
    entry("back-squat", "Back Squat", Quads, BARBELL),
    entry("front-squat", "Front Squat", Quads, BARBELL),
    entry("goblet-squat", "Goblet Squat", Quads, DUMBBELL),
    entry("leg-press", "Leg Press", Quads, MACHINE),
    entry("leg-extension", "Leg Extension", Quads, MACHINE),
    entry("walking-lunge", "Walking Lunge", Quads, DUMBBELL),
    entry("bulgarian-split-squat", "Bulgarian Split Squat", Quads, DUMBBELL),
    entry("step-up", "Step-Up", Glutes, DUMBBELL),
    entry("deadlift", "Deadlift", Hamstrings, BARBELL),
    entry("romanian-deadlift", "Romanian Deadlift", Hamstrings, BARBELL),
    entry("lying-leg-curl", "Lying Leg Curl", Hamstrings, MACHINE),
    entry("hip-thrust", "Hip Thrust", Glutes, BARBELL),
    entry("standing-calf-raise", "Standing Calf Raise", Calves, MACHINE),
    entry("seated-calf-raise", "Seated Calf Raise", Calves, MACHINE),
    // Push
    entry("bench-press", "Bench Press", Chest, BARBELL),
    entry("incline-dumbbell-press", "Incline Dumbbell Press", Chest, DUMBBELL),
    entry("push-up", "Push-Up", Chest, BODYWEIGHT),
    entry("overhead-press", "Overhead Press", Shoulders, BARBELL),
    entry("lateral-raise", "Lateral Raise", Shoulders, DUMBBELL),
    entry("face-pull", "Face Pull", Shoulders, CABLE),
    // Pull
    entry("pull-up", "Pull-Up", Back, BODYWEIGHT),
    entry("barbell-row", "Barbell Row", Back, BARBELL),
    entry("lat-pulldown", "Lat Pulldown", Back, CABLE),
    entry("seated-cable-row", "Seated Cable Row", Back, CABLE),
    // Arms
    entry("barbell-curl", "Barbell Curl", Biceps, BARBELL),
    entry("dumbbell-curl", "Dumbbell Curl", Biceps, DUMBBELL),
    entry("hammer-curl", "Hammer Curl", Biceps, DUMBBELL),
    entry("preacher-curl", "Preacher Curl", Biceps, MACHINE),
    entry("incline-dumbbell-curl", "Incline Dumbbell Curl", Biceps, DUMBBELL),
    entry("cable-curl", "Cable Curl", Biceps, CABLE),
    entry("concentration-curl", "Concentration Curl", Biceps, DUMBBELL),
    entry("close-grip-bench-press", "Close-Grip Bench Press", Triceps, BARBELL),
    entry("triceps-pushdown", "Triceps Pushdown", Triceps, CABLE),
    entry("overhead-triceps-extension", "Overhead Triceps Extension", Triceps, DUMBBELL),
    entry("skull-crusher", "Skull Crusher", Triceps, BARBELL),
    entry("dips", "Dips", Triceps, BODYWEIGHT),
    // Core
    entry("plank", "Plank", Core, BODYWEIGHT),
    entry("side-plank", "Side Plank", Core, BODYWEIGHT),
    entry("hanging-leg-raise", "Hanging Leg Raise", Core, BODYWEIGHT),
    entry("cable-crunch", "Cable Crunch", Core, CABLE),
    entry("russian-twist", "Russian Twist", Core, BODYWEIGHT),
    entry("ab-wheel-rollout", "Ab Wheel Rollout", Core, Some("ab wheel")),
    entry("dead-bug", "Dead Bug", Core, BODYWEIGHT),
    entry("pallof-press", "Pallof Press", Core, CABLE),
    entry("bicycle-crunch", "Bicycle Crunch", Core, BODYWEIGHT),
    entry("mountain-climber", "Mountain Climber", Core, BODYWEIGHT),
    entry("farmers-carry", "Farmer's Carry", Core, DUMBBELL),
    // Full body
    entry("kettlebell-swing", "Kettlebell Swing", FullBody, KETTLEBELL),
    entry("burpee", "Burpee", FullBody, BODYWEIGHT),
    entry("thruster", "Thruster", FullBody, BARBELL),
    entry("clean-and-press", "Clean and Press", FullBody, BARBELL),
];

/// Look up a built-in exercise by slug.
pub fn find(slug: &str) -> Option<&'static CatalogExercise> {
    CATALOG.iter().find(|e| e.slug == slug)
}
