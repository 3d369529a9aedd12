//! Core domain logic for the Mapty workout log.
//! This crate is the single source of truth for workout invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::workout::{
    describe, pace_min_per_km, speed_km_per_h, Coordinates, KindField, Workout, WorkoutId,
    WorkoutKind, WorkoutMetrics, WorkoutPatch, WorkoutValidationError,
};
pub use repo::kv_store::{KeyValueStore, KvError, KvResult, MemoryKeyValueStore, SqliteKeyValueStore};
pub use repo::persistence::{
    PersistenceError, PersistenceResult, WorkoutPersistence, DEFAULT_STORAGE_KEY,
};
pub use repo::workout_store::{StoreError, StoreResult, WorkoutStore};
pub use service::workout_service::{
    ControllerError, ControllerResult, RestoreReport, SubmitOutcome, WorkoutAction,
    WorkoutController, WorkoutFormInput, WorkoutView,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
