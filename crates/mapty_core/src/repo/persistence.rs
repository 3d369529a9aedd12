//! Workout list persistence over a key-value blob.
//!
//! # Responsibility
//! - Serialize the full ordered workout list as one JSON array under a fixed key.
//! - Decode and re-validate that blob on load.
//!
//! # Invariants
//! - Every save overwrites the whole blob; there are no partial writes.
//! - Derived metric and description are stored as computed and checked, never
//!   silently recomputed, on load.
//! - An absent, blank or `null` blob means "no data"; anything else that fails
//!   to decode is reported as `CorruptData`.

use crate::model::workout::Workout;
use crate::repo::kv_store::{KeyValueStore, KvError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Key used when no override is configured.
pub const DEFAULT_STORAGE_KEY: &str = "workouts";

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Errors raised while mirroring workouts to storage.
#[derive(Debug)]
pub enum PersistenceError {
    Kv(KvError),
    Encode(serde_json::Error),
    CorruptData { key: String, reason: String },
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kv(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode workouts: {err}"),
            Self::CorruptData { key, reason } => {
                write!(f, "stored workouts under `{key}` are unreadable: {reason}")
            }
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Kv(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::CorruptData { .. } => None,
        }
    }
}

impl From<KvError> for PersistenceError {
    fn from(value: KvError) -> Self {
        Self::Kv(value)
    }
}

/// JSON mirror of the workout list inside a key-value store.
pub struct WorkoutPersistence<K: KeyValueStore> {
    kv: K,
    key: String,
}

impl<K: KeyValueStore> WorkoutPersistence<K> {
    /// Creates an adapter using `DEFAULT_STORAGE_KEY`.
    pub fn new(kv: K) -> Self {
        Self::with_key(kv, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(kv: K, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    pub fn kv_mut(&mut self) -> &mut K {
        &mut self.kv
    }

    pub fn into_inner(self) -> K {
        self.kv
    }

    /// Writes the full ordered list, replacing any previous blob.
    pub fn save<'a>(
        &mut self,
        workouts: impl IntoIterator<Item = &'a Workout>,
    ) -> PersistenceResult<()> {
        let workouts: Vec<&Workout> = workouts.into_iter().collect();
        let blob = serde_json::to_string(&workouts).map_err(PersistenceError::Encode)?;
        self.kv.set(&self.key, &blob)?;
        info!(
            "event=workouts_save module=persistence status=ok count={} bytes={}",
            workouts.len(),
            blob.len()
        );
        Ok(())
    }

    /// Reads the stored list.
    ///
    /// # Errors
    /// - `Kv` when the backend fails.
    /// - `CorruptData` when the blob is not a valid workout array.
    pub fn load(&self) -> PersistenceResult<Vec<Workout>> {
        let Some(blob) = self.kv.get(&self.key)? else {
            info!("event=workouts_load module=persistence status=ok count=0 source=absent");
            return Ok(Vec::new());
        };

        let trimmed = blob.trim();
        if trimmed.is_empty() || trimmed == "null" {
            info!("event=workouts_load module=persistence status=ok count=0 source=empty");
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Vec<Workout>>(trimmed) {
            Ok(workouts) => {
                info!(
                    "event=workouts_load module=persistence status=ok count={}",
                    workouts.len()
                );
                Ok(workouts)
            }
            Err(err) => {
                warn!(
                    "event=workouts_load module=persistence status=error error_code=corrupt_data line={} column={}",
                    err.line(),
                    err.column()
                );
                Err(PersistenceError::CorruptData {
                    key: self.key.clone(),
                    reason: err.to_string(),
                })
            }
        }
    }

    /// Deletes the stored blob.
    pub fn clear(&mut self) -> PersistenceResult<()> {
        self.kv.remove(&self.key)?;
        info!("event=workouts_clear module=persistence status=ok");
        Ok(())
    }
}
