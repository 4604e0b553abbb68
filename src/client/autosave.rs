// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local state for optimistic set logging.
//!
//! Edits are applied locally before the server acknowledges them. A
//! successful save replaces the local value with the server's record; a
//! failed save restores the last value the server had confirmed.

use crate::models::{SessionDetail, SetInput, SetLog};
use std::collections::HashMap;

/// A set is identified by its exercise instance and set number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SetKey {
    pub session_exercise_id: i64,
    pub set_number: u32,
}

impl SetKey {
    pub fn new(session_exercise_id: i64, set_number: u32) -> Self {
        Self {
            session_exercise_id,
            set_number,
        }
    }
}

/// What the UI shows for one set.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalSet {
    pub weight: f64,
    pub reps: i64,
    pub completed: bool,
    /// True once the server has confirmed this exact value
    pub synced: bool,
}

impl From<&SetLog> for LocalSet {
    fn from(set: &SetLog) -> Self {
        Self {
            weight: set.weight,
            reps: set.reps as i64,
            completed: set.completed,
            synced: true,
        }
    }
}

#[derive(Debug, Default)]
pub struct AutosaveBuffer {
    sets: HashMap<SetKey, LocalSet>,
    /// Last confirmed value per key with a write in flight. `None` means the
    /// set did not exist before the optimistic edit.
    snapshots: HashMap<SetKey, Option<LocalSet>>,
}

impl AutosaveBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace local state with a session as the server reports it.
    pub fn load_session(&mut self, session: &SessionDetail) {
        self.sets.clear();
        self.snapshots.clear();
        for exercise in &session.exercises {
            for set in &exercise.sets {
                self.sets.insert(
                    SetKey::new(set.session_exercise_id, set.set_number),
                    LocalSet::from(set),
                );
            }
        }
    }

    /// Apply an edit locally before it is saved.
    ///
    /// With several edits in flight for one key, the snapshot taken before
    /// the first one is kept.
    pub fn apply(&mut self, key: SetKey, input: SetInput) {
        let previous = self.sets.get(&key).cloned();
        self.snapshots.entry(key).or_insert(previous);
        self.sets.insert(
            key,
            LocalSet {
                weight: input.weight,
                reps: input.reps,
                completed: input.completed,
                synced: false,
            },
        );
    }

    /// Accept the server's record as authoritative.
    pub fn reconcile(&mut self, key: SetKey, saved: &SetLog) {
        self.snapshots.remove(&key);
        self.sets.insert(key, LocalSet::from(saved));
    }

    /// Undo the optimistic edit. Returns the restored value, if any.
    pub fn rollback(&mut self, key: SetKey) -> Option<&LocalSet> {
        match self.snapshots.remove(&key) {
            Some(Some(previous)) => {
                self.sets.insert(key, previous);
            }
            Some(None) => {
                self.sets.remove(&key);
            }
            None => {}
        }
        self.sets.get(&key)
    }

    pub fn get(&self, key: SetKey) -> Option<&LocalSet> {
        self.sets.get(&key)
    }

    pub fn is_pending(&self, key: SetKey) -> bool {
        self.snapshots.contains_key(&key)
    }

    pub fn pending_count(&self) -> usize {
        self.snapshots.len()
    }

    /// Sets for one exercise instance, ordered by set number.
    pub fn sets_for(&self, session_exercise_id: i64) -> Vec<(u32, &LocalSet)> {
        let mut sets: Vec<_> = self
            .sets
            .iter()
            .filter(|(k, _)| k.session_exercise_id == session_exercise_id)
            .map(|(k, v)| (k.set_number, v))
            .collect();
        sets.sort_by_key(|(n, _)| *n);
        sets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn input(weight: f64, reps: i64) -> SetInput {
        SetInput {
            weight,
            reps,
            completed: true,
        }
    }

    fn saved(key: SetKey, weight: f64, reps: u32) -> SetLog {
        SetLog {
            id: 1,
            session_exercise_id: key.session_exercise_id,
            set_number: key.set_number,
            weight,
            reps,
            completed: true,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_apply_then_reconcile() {
        let mut buffer = AutosaveBuffer::new();
        let key = SetKey::new(10, 1);

        buffer.apply(key, input(100.0, 5));
        assert!(buffer.is_pending(key));
        assert!(!buffer.get(key).unwrap().synced);

        buffer.reconcile(key, &saved(key, 100.0, 5));
        assert!(!buffer.is_pending(key));
        let set = buffer.get(key).unwrap();
        assert!(set.synced);
        assert_eq!(set.weight, 100.0);
    }

    #[test]
    fn test_rollback_new_set_removes_it() {
        let mut buffer = AutosaveBuffer::new();
        let key = SetKey::new(10, 2);

        buffer.apply(key, input(60.0, 10));
        assert!(buffer.rollback(key).is_none());
        assert!(buffer.get(key).is_none());
        assert_eq!(buffer.pending_count(), 0);
    }

    #[test]
    fn test_rollback_restores_first_snapshot() {
        let mut buffer = AutosaveBuffer::new();
        let key = SetKey::new(10, 1);
        buffer.apply(key, input(80.0, 8));
        buffer.reconcile(key, &saved(key, 80.0, 8));

        buffer.apply(key, input(85.0, 8));
        buffer.apply(key, input(90.0, 6));
        let restored = buffer.rollback(key).unwrap();
        assert_eq!(restored.weight, 80.0);
        assert_eq!(restored.reps, 8);
        assert!(restored.synced);
    }

    #[test]
    fn test_sets_for_orders_by_number() {
        let mut buffer = AutosaveBuffer::new();
        buffer.apply(SetKey::new(3, 2), input(50.0, 10));
        buffer.apply(SetKey::new(3, 1), input(45.0, 12));
        buffer.apply(SetKey::new(4, 1), input(20.0, 15));

        let sets = buffer.sets_for(3);
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].0, 1);
        assert_eq!(sets[1].0, 2);
    }
}
