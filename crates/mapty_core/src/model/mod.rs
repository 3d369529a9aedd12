//! Workout domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep running and cycling as variants of one workout shape.
//!
//! # Invariants
//! - Every workout is identified by a stable `WorkoutId`.
//! - A workout never changes kind after creation.

pub mod workout;
