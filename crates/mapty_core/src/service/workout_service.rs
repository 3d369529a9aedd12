//! Workout logging use-case controller.
//!
//! # Responsibility
//! - Orchestrate form submission, edit, delete, focus and reset flows over
//!   the store, persistence and the view collaborator.
//! - Translate failures into user-visible notices.
//!
//! # Invariants
//! - At most one workout is being edited at a time.
//! - A submission is either a create or an update, never both.
//! - A failed submission leaves both the store and the persisted blob as they
//!   were before it.
//! - Persisted state always equals store state at the end of each entry point.

use crate::model::workout::{
    Coordinates, KindField, Workout, WorkoutId, WorkoutKind, WorkoutPatch, WorkoutValidationError,
};
use crate::repo::kv_store::KeyValueStore;
use crate::repo::persistence::{PersistenceError, WorkoutPersistence};
use crate::repo::workout_store::{StoreError, WorkoutStore};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

const NOTICE_INVALID_INPUT: &str = "Inputs have to be positive numbers";
const NOTICE_KIND_LOCKED: &str = "Workout type cannot be edited";
const NOTICE_NO_LOCATION: &str = "Pick a location on the map first";
const NOTICE_STORAGE_FAILED: &str = "Could not save workouts";

/// Display, map and form collaborator driven by the controller.
pub trait WorkoutView {
    fn render_marker(&mut self, workout: &Workout);
    fn render_list_entry(&mut self, workout: &Workout);
    fn remove_from_view(&mut self, id: WorkoutId);
    /// Drops every rendered marker and list entry before a full reload.
    fn clear_view(&mut self);
    fn focus_on(&mut self, coordinates: Coordinates);
    /// Shows the workout form, prefilled when editing.
    fn show_form(&mut self, prefill: Option<&WorkoutFormInput>);
    /// Hides and resets the workout form.
    fn hide_form(&mut self);
    /// Shows a user-facing message.
    fn notify(&mut self, message: &str);
}

/// Raw values read from the workout form.
///
/// Only the kind-specific field matching `kind` is read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkoutFormInput {
    pub kind: WorkoutKind,
    pub distance_km: f64,
    pub duration_min: f64,
    pub cadence_spm: Option<f64>,
    pub elevation_gain_m: Option<f64>,
}

impl WorkoutFormInput {
    pub fn running(distance_km: f64, duration_min: f64, cadence_spm: f64) -> Self {
        Self {
            kind: WorkoutKind::Running,
            distance_km,
            duration_min,
            cadence_spm: Some(cadence_spm),
            elevation_gain_m: None,
        }
    }

    pub fn cycling(distance_km: f64, duration_min: f64, elevation_gain_m: f64) -> Self {
        Self {
            kind: WorkoutKind::Cycling,
            distance_km,
            duration_min,
            cadence_spm: None,
            elevation_gain_m: Some(elevation_gain_m),
        }
    }

    /// Prefill values for editing an existing workout.
    pub fn from_workout(workout: &Workout) -> Self {
        let base = Self {
            kind: workout.kind(),
            distance_km: workout.distance_km(),
            duration_min: workout.duration_min(),
            cadence_spm: None,
            elevation_gain_m: None,
        };
        match workout.metrics().kind_field() {
            KindField::Cadence(value) => Self {
                cadence_spm: Some(value),
                ..base
            },
            KindField::ElevationGain(value) => Self {
                elevation_gain_m: Some(value),
                ..base
            },
        }
    }

    /// Selects the kind-specific field for `kind`.
    pub fn kind_field(&self) -> Result<KindField, WorkoutValidationError> {
        match self.kind {
            WorkoutKind::Running => self
                .cadence_spm
                .map(KindField::Cadence)
                .ok_or(WorkoutValidationError::MissingField("cadence_spm")),
            WorkoutKind::Cycling => self
                .elevation_gain_m
                .map(KindField::ElevationGain)
                .ok_or(WorkoutValidationError::MissingField("elevation_gain_m")),
        }
    }

    pub fn to_patch(&self) -> Result<WorkoutPatch, WorkoutValidationError> {
        Ok(WorkoutPatch::new(
            self.distance_km,
            self.duration_min,
            self.kind_field()?,
        ))
    }
}

/// Result of one form submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(WorkoutId),
    Updated(WorkoutId),
}

/// Action offered for a double-activated list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkoutAction {
    Edit,
    Delete,
}

/// Startup restore summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreReport {
    /// Number of workouts now in the store.
    pub loaded: usize,
    /// Whether an unreadable blob was discarded in favor of an empty log.
    pub recovered_from_corrupt: bool,
}

/// Controller-level failures. Each one has already been shown via `notify`.
#[derive(Debug)]
pub enum ControllerError {
    Validation(WorkoutValidationError),
    Store(StoreError),
    Persistence(PersistenceError),
    NoPendingLocation,
}

impl Display for ControllerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Persistence(err) => write!(f, "{err}"),
            Self::NoPendingLocation => write!(f, "no map location selected for new workout"),
        }
    }
}

impl Error for ControllerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Persistence(err) => Some(err),
            Self::NoPendingLocation => None,
        }
    }
}

impl From<WorkoutValidationError> for ControllerError {
    fn from(value: WorkoutValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for ControllerError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Validation(err) => Self::Validation(err),
            other => Self::Store(other),
        }
    }
}

impl From<PersistenceError> for ControllerError {
    fn from(value: PersistenceError) -> Self {
        Self::Persistence(value)
    }
}

impl ControllerError {
    /// Message shown to the user for this failure.
    pub fn notice(&self) -> String {
        match self {
            Self::Validation(_) => NOTICE_INVALID_INPUT.to_string(),
            Self::Store(StoreError::KindMismatch { .. }) => NOTICE_KIND_LOCKED.to_string(),
            Self::Store(StoreError::NotFound(id)) => format!("No workout found for this id: {id}"),
            Self::Store(StoreError::Validation(_)) => NOTICE_INVALID_INPUT.to_string(),
            Self::Persistence(_) => NOTICE_STORAGE_FAILED.to_string(),
            Self::NoPendingLocation => NOTICE_NO_LOCATION.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(StoreError::NotFound(_)))
    }
}

pub type ControllerResult<T> = Result<T, ControllerError>;

/// Session context for the workout log.
///
/// Owns the store, its persisted mirror, the view and the edit cursor, so
/// several independent logs can live in one process.
pub struct WorkoutController<K: KeyValueStore, V: WorkoutView> {
    store: WorkoutStore,
    persistence: WorkoutPersistence<K>,
    view: V,
    pending_location: Option<Coordinates>,
    editing: Option<WorkoutId>,
}

impl<K: KeyValueStore, V: WorkoutView> WorkoutController<K, V> {
    /// Creates a controller with an empty store; call `restore` to load state.
    pub fn new(persistence: WorkoutPersistence<K>, view: V) -> Self {
        Self {
            store: WorkoutStore::new(),
            persistence,
            view,
            pending_location: None,
            editing: None,
        }
    }

    pub fn workouts(&self) -> &WorkoutStore {
        &self.store
    }

    pub fn persistence(&self) -> &WorkoutPersistence<K> {
        &self.persistence
    }

    /// Direct storage access; writes made here bypass the store.
    pub fn persistence_mut(&mut self) -> &mut WorkoutPersistence<K> {
        &mut self.persistence
    }

    pub fn into_persistence(self) -> WorkoutPersistence<K> {
        self.persistence
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Workout currently targeted by the edit cursor.
    pub fn editing(&self) -> Option<WorkoutId> {
        self.editing
    }

    pub fn pending_location(&self) -> Option<Coordinates> {
        self.pending_location
    }

    /// Loads persisted workouts into the store and renders them.
    ///
    /// An unreadable blob is discarded: the session starts empty and the
    /// report says so. Storage transport failures are returned.
    pub fn restore(&mut self) -> ControllerResult<RestoreReport> {
        let (workouts, recovered_from_corrupt) = match self.persistence.load() {
            Ok(workouts) => (workouts, false),
            Err(PersistenceError::CorruptData { key, reason }) => {
                warn!(
                    "event=workouts_restore module=service status=recovered error_code=corrupt_data key={key}"
                );
                log::debug!("corrupt workout blob: {reason}");
                (Vec::new(), true)
            }
            Err(err) => return Err(self.fail(err.into())),
        };

        self.store.replace_all(workouts);
        self.editing = None;
        self.reload_view();

        info!(
            "event=workouts_restore module=service status=ok count={} recovered={}",
            self.store.len(),
            recovered_from_corrupt
        );
        Ok(RestoreReport {
            loaded: self.store.len(),
            recovered_from_corrupt,
        })
    }

    /// Remembers the clicked location for the next new workout and shows the form.
    pub fn on_map_clicked(&mut self, coordinates: Coordinates) {
        self.pending_location = Some(coordinates);
        self.view.show_form(None);
    }

    /// Handles a form submission: update when editing, create otherwise.
    pub fn submit_form(&mut self, input: &WorkoutFormInput) -> ControllerResult<SubmitOutcome> {
        match self.editing {
            Some(id) => self.update_workout(id, input).map(SubmitOutcome::Updated),
            None => self.create_workout(input).map(SubmitOutcome::Created),
        }
    }

    /// Points the edit cursor at `id` and returns the form prefill.
    pub fn begin_edit(&mut self, id: WorkoutId) -> ControllerResult<WorkoutFormInput> {
        let prefill = match self.store.find_by_id(id) {
            Some(workout) => WorkoutFormInput::from_workout(workout),
            None => return Err(self.fail(StoreError::NotFound(id).into())),
        };

        self.editing = Some(id);
        self.view.show_form(Some(&prefill));
        info!("event=workout_edit_begin module=service status=ok id={id}");
        Ok(prefill)
    }

    /// Clears the edit cursor without touching the workout.
    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.view.hide_form();
    }

    /// Removes one workout, persists, and reloads the view.
    pub fn delete(&mut self, id: WorkoutId) -> ControllerResult<Workout> {
        let snapshot = self.store.clone();
        let removed = match self.store.remove_by_id(id) {
            Ok(workout) => workout,
            Err(err) => return Err(self.fail(err.into())),
        };

        if let Err(err) = self.persistence.save(&self.store) {
            self.store = snapshot;
            return Err(self.fail(err.into()));
        }

        if self.editing == Some(id) {
            self.editing = None;
            self.view.hide_form();
        }
        self.view.remove_from_view(id);
        self.reload_view();
        info!(
            "event=workout_delete module=service status=ok id={id} remaining={}",
            self.store.len()
        );
        Ok(removed)
    }

    /// Centers the view on a workout and counts the focus.
    pub fn on_list_item_activated(&mut self, id: WorkoutId) -> ControllerResult<u32> {
        let snapshot = self.store.clone();
        let (coordinates, clicks) = match self.store.find_by_id_mut(id) {
            Some(workout) => (workout.coordinates(), workout.record_focus()),
            None => return Err(self.fail(StoreError::NotFound(id).into())),
        };

        if let Err(err) = self.persistence.save(&self.store) {
            self.store = snapshot;
            return Err(self.fail(err.into()));
        }

        self.view.focus_on(coordinates);
        info!("event=workout_focus module=service status=ok id={id} clicks={clicks}");
        Ok(clicks)
    }

    /// Returns the actions offered for a double-activated list item.
    pub fn on_list_item_double_activated(
        &mut self,
        id: WorkoutId,
    ) -> ControllerResult<[WorkoutAction; 2]> {
        if self.store.find_by_id(id).is_none() {
            return Err(self.fail(StoreError::NotFound(id).into()));
        }
        Ok([WorkoutAction::Edit, WorkoutAction::Delete])
    }

    /// Drops every workout from storage and memory.
    pub fn reset(&mut self) -> ControllerResult<()> {
        if let Err(err) = self.persistence.clear() {
            return Err(self.fail(err.into()));
        }

        self.store.clear();
        self.editing = None;
        self.pending_location = None;
        self.view.hide_form();
        self.reload_view();
        info!("event=workouts_reset module=service status=ok");
        Ok(())
    }

    fn create_workout(&mut self, input: &WorkoutFormInput) -> ControllerResult<WorkoutId> {
        let Some(coordinates) = self.pending_location else {
            return Err(self.fail(ControllerError::NoPendingLocation));
        };

        let workout = match input.kind_field().and_then(|field| {
            Workout::create(coordinates, input.distance_km, input.duration_min, field)
        }) {
            Ok(workout) => workout,
            Err(err) => return Err(self.fail(err.into())),
        };
        let id = workout.id();

        self.store.add(workout);
        if let Err(err) = self.persistence.save(&self.store) {
            self.store.pop();
            return Err(self.fail(err.into()));
        }

        self.pending_location = None;
        if let Some(created) = self.store.find_by_id(id) {
            self.view.render_marker(created);
            self.view.render_list_entry(created);
        }
        self.view.hide_form();
        info!(
            "event=workout_create module=service status=ok id={id} kind={} count={}",
            input.kind,
            self.store.len()
        );
        Ok(id)
    }

    fn update_workout(
        &mut self,
        id: WorkoutId,
        input: &WorkoutFormInput,
    ) -> ControllerResult<WorkoutId> {
        let patch = match self.kind_checked_patch(id, input) {
            Ok(patch) => patch,
            Err(err) => return Err(self.fail(err)),
        };

        let snapshot = self.store.clone();
        if let Err(err) = self.store.update_by_id(id, &patch) {
            return Err(self.fail(err.into()));
        }
        if let Err(err) = self.persistence.save(&self.store) {
            self.store = snapshot;
            return Err(self.fail(err.into()));
        }

        self.editing = None;
        self.view.hide_form();
        self.reload_view();
        info!("event=workout_update module=service status=ok id={id}");
        Ok(id)
    }

    /// Rejects kind changes before reading kind-specific input, so a form
    /// switched to the other kind reports the kind lock, not a missing field.
    fn kind_checked_patch(
        &self,
        id: WorkoutId,
        input: &WorkoutFormInput,
    ) -> ControllerResult<WorkoutPatch> {
        let existing = self.store.find_by_id(id).ok_or(StoreError::NotFound(id))?;
        if existing.kind() != input.kind {
            return Err(StoreError::KindMismatch {
                id,
                expected: existing.kind(),
                actual: input.kind,
            }
            .into());
        }
        Ok(input.to_patch()?)
    }

    fn reload_view(&mut self) {
        self.view.clear_view();
        for workout in self.store.iter() {
            self.view.render_marker(workout);
            self.view.render_list_entry(workout);
        }
    }

    fn fail(&mut self, err: ControllerError) -> ControllerError {
        warn!(
            "event=workout_flow module=service status=error error_code={} error={}",
            error_code(&err),
            err
        );
        self.view.notify(&err.notice());
        err
    }
}

fn error_code(err: &ControllerError) -> &'static str {
    match err {
        ControllerError::Validation(_) => "validation",
        ControllerError::Store(StoreError::NotFound(_)) => "not_found",
        ControllerError::Store(StoreError::KindMismatch { .. }) => "kind_mismatch",
        ControllerError::Store(StoreError::Validation(_)) => "validation",
        ControllerError::Persistence(_) => "persistence",
        ControllerError::NoPendingLocation => "no_pending_location",
    }
}
