//! Repository layer: workout collection and its persisted mirror.
//!
//! # Responsibility
//! - Keep the session's authoritative workout list in memory.
//! - Isolate blob encoding and key-value storage from service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `KindMismatch`) in
//!   addition to storage transport errors.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod kv_store;
pub mod persistence;
pub mod workout_store;
