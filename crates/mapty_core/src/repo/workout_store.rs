//! In-memory workout collection for the current session.
//!
//! # Responsibility
//! - Own the authoritative ordered list of workouts.
//! - Apply id-based find/update/remove with semantic errors.
//!
//! # Invariants
//! - Insertion order is display order.
//! - Failed updates leave the stored record untouched.
//! - Duplicate ids are not detected; lookups return the first match.

use crate::model::workout::{Workout, WorkoutId, WorkoutKind, WorkoutPatch, WorkoutValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by id-based store operations.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    Validation(WorkoutValidationError),
    NotFound(WorkoutId),
    KindMismatch {
        id: WorkoutId,
        expected: WorkoutKind,
        actual: WorkoutKind,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "workout not found: {id}"),
            Self::KindMismatch {
                id,
                expected,
                actual,
            } => write!(
                f,
                "workout {id} is {expected}; cannot change kind to {actual}"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) | Self::KindMismatch { .. } => None,
        }
    }
}

impl From<WorkoutValidationError> for StoreError {
    fn from(value: WorkoutValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Ordered workout collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkoutStore {
    workouts: Vec<Workout>,
}

impl WorkoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one workout without checking for duplicate ids.
    pub fn add(&mut self, workout: Workout) {
        self.workouts.push(workout);
    }

    pub fn find_by_id(&self, id: WorkoutId) -> Option<&Workout> {
        self.workouts.iter().find(|workout| workout.id() == id)
    }

    pub fn find_by_id_mut(&mut self, id: WorkoutId) -> Option<&mut Workout> {
        self.workouts.iter_mut().find(|workout| workout.id() == id)
    }

    /// Replaces distance, duration and the kind-specific field of one workout.
    ///
    /// The derived metric is recomputed; id, creation time, coordinates,
    /// description and focus count are kept.
    ///
    /// # Errors
    /// - `NotFound` when no workout has `id`.
    /// - `KindMismatch` when the patch targets a different kind.
    /// - `Validation` when patched values are invalid.
    pub fn update_by_id(&mut self, id: WorkoutId, patch: &WorkoutPatch) -> StoreResult<&Workout> {
        let index = self.position(id).ok_or(StoreError::NotFound(id))?;
        let existing = &self.workouts[index];

        if patch.kind() != existing.kind() {
            return Err(StoreError::KindMismatch {
                id,
                expected: existing.kind(),
                actual: patch.kind(),
            });
        }

        let revised = existing.revised(patch)?;
        self.workouts[index] = revised;
        Ok(&self.workouts[index])
    }

    /// Removes the most recently added workout.
    pub fn pop(&mut self) -> Option<Workout> {
        self.workouts.pop()
    }

    /// Removes the first workout with `id` and returns it.
    pub fn remove_by_id(&mut self, id: WorkoutId) -> StoreResult<Workout> {
        let index = self.position(id).ok_or(StoreError::NotFound(id))?;
        Ok(self.workouts.remove(index))
    }

    /// Swaps the whole collection, used when restoring from persistence.
    pub fn replace_all(&mut self, workouts: Vec<Workout>) {
        self.workouts = workouts;
    }

    pub fn clear(&mut self) {
        self.workouts.clear();
    }

    /// Read-only view in insertion order; call again to restart.
    pub fn iter(&self) -> std::slice::Iter<'_, Workout> {
        self.workouts.iter()
    }

    pub fn as_slice(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    fn position(&self, id: WorkoutId) -> Option<usize> {
        self.workouts.iter().position(|workout| workout.id() == id)
    }
}

impl<'a> IntoIterator for &'a WorkoutStore {
    type Item = &'a Workout;
    type IntoIter = std::slice::Iter<'a, Workout>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
