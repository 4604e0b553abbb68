// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Exercise catalog model and prescription targets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Primary muscle group an exercise trains.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MuscleGroup {
    Chest,
    Back,
    Shoulders,
    Biceps,
    Triceps,
    Quads,
    Hamstrings,
    Glutes,
    Calves,
    Core,
    FullBody,
}

impl MuscleGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            MuscleGroup::Chest => "CHEST",
            MuscleGroup::Back => "BACK",
            MuscleGroup::Shoulders => "SHOULDERS",
            MuscleGroup::Biceps => "BICEPS",
            MuscleGroup::Triceps => "TRICEPS",
            MuscleGroup::Quads => "QUADS",
            MuscleGroup::Hamstrings => "HAMSTRINGS",
            MuscleGroup::Glutes => "GLUTES",
            MuscleGroup::Calves => "CALVES",
            MuscleGroup::Core => "CORE",
            MuscleGroup::FullBody => "FULL_BODY",
        }
    }

    /// All muscle groups for iteration
    pub fn all() -> &'static [MuscleGroup] {
        &[
            MuscleGroup::Chest,
            MuscleGroup::Back,
            MuscleGroup::Shoulders,
            MuscleGroup::Biceps,
            MuscleGroup::Triceps,
            MuscleGroup::Quads,
            MuscleGroup::Hamstrings,
            MuscleGroup::Glutes,
            MuscleGroup::Calves,
            MuscleGroup::Core,
            MuscleGroup::FullBody,
        ]
    }
}

impl FromStr for MuscleGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        MuscleGroup::all()
            .iter()
            .copied()
            .find(|g| g.as_str() == normalized)
            .ok_or_else(|| format!("unknown muscle group '{}'", s))
    }
}

/// Catalog exercise. Built-in entries have no owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub muscle_group: MuscleGroup,
    pub equipment: Option<String>,
    /// Owning user for custom exercises; `None` for the built-in catalog
    pub owner_id: Option<i64>,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
}

impl Exercise {
    pub fn is_custom(&self) -> bool {
        self.owner_id.is_some()
    }
}

/// Upper bound on a prescribed rep count.
const MAX_TARGET_REPS: u32 = 100;

/// Prescribed repetitions: an exact count, an inclusive range, or AMRAP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetReps {
    Exact(u32),
    Range { min: u32, max: u32 },
    /// As many reps as possible
    Amrap,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetRepsError {
    #[error("target reps must not be empty")]
    Empty,

    #[error("'{0}' is not a rep count, a range like 8-12, or AMRAP")]
    Malformed(String),

    #[error("rep counts must be between 1 and {}", MAX_TARGET_REPS)]
    OutOfRange,

    #[error("range {min}-{max} is reversed")]
    Reversed { min: u32, max: u32 },
}

fn parse_count(raw: &str) -> Result<u32, TargetRepsError> {
    let n: u32 = raw
        .trim()
        .parse()
        .map_err(|_| TargetRepsError::Malformed(raw.to_string()))?;
    if n == 0 || n > MAX_TARGET_REPS {
        return Err(TargetRepsError::OutOfRange);
    }
    Ok(n)
}

impl FromStr for TargetReps {
    type Err = TargetRepsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TargetRepsError::Empty);
        }
        if s.eq_ignore_ascii_case("amrap") {
            return Ok(TargetReps::Amrap);
        }

        match s.split_once('-') {
            Some((lo, hi)) => {
                let min = parse_count(lo)?;
                let max = parse_count(hi)?;
                match min.cmp(&max) {
                    std::cmp::Ordering::Less => Ok(TargetReps::Range { min, max }),
                    std::cmp::Ordering::Equal => Ok(TargetReps::Exact(min)),
                    std::cmp::Ordering::Greater => Err(TargetRepsError::Reversed { min, max }),
                }
            }
            None => parse_count(s).map(TargetReps::Exact),
        }
    }
}

impl fmt::Display for TargetReps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetReps::Exact(n) => write!(f, "{}", n),
            TargetReps::Range { min, max } => write!(f, "{}-{}", min, max),
            TargetReps::Amrap => f.write_str("AMRAP"),
        }
    }
}
