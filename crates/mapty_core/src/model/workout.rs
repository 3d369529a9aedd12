//! Workout domain model.
//!
//! # Responsibility
//! - Define the canonical workout record shared by running and cycling logs.
//! - Validate raw metric input and compute the kind-specific derived metric.
//! - Define the persisted wire shape for one workout.
//!
//! # Invariants
//! - `distance_km` and `duration_min` are finite and strictly positive.
//! - Running cadence is finite and strictly positive; cycling elevation gain
//!   only has to be finite.
//! - `id`, `created_at`, `coordinates` and kind never change after creation.
//! - The derived metric always matches distance/duration of the record.
//! - `description` is derived from kind + `created_at` exactly once.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of one logged workout.
///
/// Rendered as the hyphenated UUID string wherever a string id is expected.
pub type WorkoutId = Uuid;

/// Signature shared by all derived metric formulas.
pub type DerivedMetricFn = fn(distance_km: f64, duration_min: f64) -> f64;

/// Relative tolerance used when checking persisted derived metrics.
const DERIVED_METRIC_TOLERANCE: f64 = 1e-9;

/// Workout category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutKind {
    /// Derived metric is pace in minutes per kilometer.
    Running,
    /// Derived metric is speed in kilometers per hour.
    Cycling,
}

impl WorkoutKind {
    /// Stable lowercase id used in storage and CLI input.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Cycling => "cycling",
        }
    }

    /// Capitalized label used in descriptions.
    pub fn label(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Cycling => "Cycling",
        }
    }

    /// Unit of the derived metric for display.
    pub fn derived_metric_unit(self) -> &'static str {
        match self {
            Self::Running => "min/km",
            Self::Cycling => "km/h",
        }
    }

    /// Returns the derived metric formula for this kind.
    pub fn derived_metric_fn(self) -> DerivedMetricFn {
        match self {
            Self::Running => pace_min_per_km,
            Self::Cycling => speed_km_per_h,
        }
    }

    /// Parses a lowercase kind id (`running|cycling`), ignoring surrounding whitespace.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "running" => Some(Self::Running),
            "cycling" => Some(Self::Cycling),
            _ => None,
        }
    }
}

impl Display for WorkoutKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Running pace in minutes per kilometer.
pub fn pace_min_per_km(distance_km: f64, duration_min: f64) -> f64 {
    duration_min / distance_km
}

/// Cycling speed in kilometers per hour.
pub fn speed_km_per_h(distance_km: f64, duration_min: f64) -> f64 {
    distance_km / (duration_min / 60.0)
}

/// Map location of a workout, serialized as `[latitude, longitude]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from(value: [f64; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(value: Coordinates) -> Self {
        [value.latitude, value.longitude]
    }
}

impl Display for Coordinates {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5}, {:.5}", self.latitude, self.longitude)
    }
}

/// Kind-specific raw input captured alongside distance and duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KindField {
    /// Running cadence in steps per minute.
    Cadence(f64),
    /// Cycling elevation gain in meters.
    ElevationGain(f64),
}

impl KindField {
    /// Workout kind implied by this field.
    pub fn kind(self) -> WorkoutKind {
        match self {
            Self::Cadence(_) => WorkoutKind::Running,
            Self::ElevationGain(_) => WorkoutKind::Cycling,
        }
    }

    fn validate(self) -> Result<(), WorkoutValidationError> {
        match self {
            Self::Cadence(value) => require_positive("cadence_spm", value),
            Self::ElevationGain(value) => require_finite("elevation_gain_m", value),
        }
    }
}

/// Kind-specific metrics stored on a workout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorkoutMetrics {
    Running {
        cadence_spm: f64,
        pace_min_per_km: f64,
    },
    Cycling {
        elevation_gain_m: f64,
        speed_km_per_h: f64,
    },
}

impl WorkoutMetrics {
    fn compute(
        field: KindField,
        distance_km: f64,
        duration_min: f64,
    ) -> Result<Self, WorkoutValidationError> {
        let kind = field.kind();
        let derived = kind.derived_metric_fn()(distance_km, duration_min);
        if !derived.is_finite() {
            return Err(WorkoutValidationError::NonFiniteDerivedMetric {
                kind,
                value: derived,
            });
        }

        Ok(match field {
            KindField::Cadence(cadence_spm) => Self::Running {
                cadence_spm,
                pace_min_per_km: derived,
            },
            KindField::ElevationGain(elevation_gain_m) => Self::Cycling {
                elevation_gain_m,
                speed_km_per_h: derived,
            },
        })
    }

    pub fn kind(&self) -> WorkoutKind {
        match self {
            Self::Running { .. } => WorkoutKind::Running,
            Self::Cycling { .. } => WorkoutKind::Cycling,
        }
    }

    /// Pace for running, speed for cycling.
    pub fn derived_metric(&self) -> f64 {
        match self {
            Self::Running {
                pace_min_per_km, ..
            } => *pace_min_per_km,
            Self::Cycling { speed_km_per_h, .. } => *speed_km_per_h,
        }
    }

    pub fn kind_field(&self) -> KindField {
        match self {
            Self::Running { cadence_spm, .. } => KindField::Cadence(*cadence_spm),
            Self::Cycling {
                elevation_gain_m, ..
            } => KindField::ElevationGain(*elevation_gain_m),
        }
    }
}

/// Replacement metrics for an existing workout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkoutPatch {
    pub distance_km: f64,
    pub duration_min: f64,
    pub field: KindField,
}

impl WorkoutPatch {
    pub fn new(distance_km: f64, duration_min: f64, field: KindField) -> Self {
        Self {
            distance_km,
            duration_min,
            field,
        }
    }

    pub fn kind(&self) -> WorkoutKind {
        self.field.kind()
    }
}

/// Validation failures for workout input and persisted workout state.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkoutValidationError {
    /// A required numeric field is absent.
    MissingField(&'static str),
    /// A numeric field is NaN or infinite.
    NonFiniteField { field: &'static str, value: f64 },
    /// A numeric field that must be strictly positive is zero or negative.
    NonPositiveField { field: &'static str, value: f64 },
    /// Latitude or longitude is NaN or infinite.
    NonFiniteCoordinates { latitude: f64, longitude: f64 },
    /// Nil UUID is reserved and cannot identify a workout.
    NilId,
    /// Pace or speed overflowed for otherwise valid inputs.
    NonFiniteDerivedMetric { kind: WorkoutKind, value: f64 },
    /// Stored derived metric disagrees with distance/duration.
    InconsistentDerivedMetric { expected: f64, actual: f64 },
    /// Stored description disagrees with kind and creation date.
    InconsistentDescription { expected: String, actual: String },
}

impl Display for WorkoutValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "{field} is required"),
            Self::NonFiniteField { field, value } => {
                write!(f, "{field} must be a finite number, got {value}")
            }
            Self::NonPositiveField { field, value } => {
                write!(f, "{field} must be > 0, got {value}")
            }
            Self::NonFiniteCoordinates {
                latitude,
                longitude,
            } => write!(
                f,
                "coordinates must be finite, got ({latitude}, {longitude})"
            ),
            Self::NilId => write!(f, "workout id must not be nil"),
            Self::NonFiniteDerivedMetric { kind, value } => {
                let field = match kind {
                    WorkoutKind::Running => "pace_min_per_km",
                    WorkoutKind::Cycling => "speed_km_per_h",
                };
                write!(f, "{field} must be a finite number, got {value}")
            }
            Self::InconsistentDerivedMetric { expected, actual } => write!(
                f,
                "derived metric {actual} does not match distance/duration (expected {expected})"
            ),
            Self::InconsistentDescription { expected, actual } => write!(
                f,
                "description `{actual}` does not match kind and date (expected `{expected}`)"
            ),
        }
    }
}

impl Error for WorkoutValidationError {}

/// One logged workout.
///
/// Fields are private so identity (`id`, `created_at`, `coordinates`, kind)
/// stays fixed; metric changes go through `WorkoutStore::update_by_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WorkoutRecord", into = "WorkoutRecord")]
pub struct Workout {
    id: WorkoutId,
    created_at: DateTime<Utc>,
    coordinates: Coordinates,
    distance_km: f64,
    duration_min: f64,
    clicks: u32,
    description: String,
    metrics: WorkoutMetrics,
}

impl Workout {
    /// Creates a workout with a fresh id and the current time.
    ///
    /// # Errors
    /// - Returns a validation error for non-finite input, non-positive
    ///   distance/duration/cadence or non-finite coordinates.
    pub fn create(
        coordinates: Coordinates,
        distance_km: f64,
        duration_min: f64,
        field: KindField,
    ) -> Result<Self, WorkoutValidationError> {
        Self::with_identity(
            Uuid::new_v4(),
            Utc::now(),
            coordinates,
            distance_km,
            duration_min,
            field,
        )
    }

    /// Creates a workout with caller-provided identity.
    ///
    /// Used by import paths and deterministic tests.
    pub fn with_identity(
        id: WorkoutId,
        created_at: DateTime<Utc>,
        coordinates: Coordinates,
        distance_km: f64,
        duration_min: f64,
        field: KindField,
    ) -> Result<Self, WorkoutValidationError> {
        if id.is_nil() {
            return Err(WorkoutValidationError::NilId);
        }
        if !coordinates.is_finite() {
            return Err(WorkoutValidationError::NonFiniteCoordinates {
                latitude: coordinates.latitude,
                longitude: coordinates.longitude,
            });
        }
        validate_metrics(distance_km, duration_min, field)?;
        let metrics = WorkoutMetrics::compute(field, distance_km, duration_min)?;

        Ok(Self {
            id,
            created_at,
            coordinates,
            distance_km,
            duration_min,
            clicks: 0,
            description: describe(field.kind(), created_at),
            metrics,
        })
    }

    pub fn id(&self) -> WorkoutId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub fn kind(&self) -> WorkoutKind {
        self.metrics.kind()
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn duration_min(&self) -> f64 {
        self.duration_min
    }

    pub fn clicks(&self) -> u32 {
        self.clicks
    }

    /// Cached "{Kind} on {Month} {day}" label.
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn metrics(&self) -> &WorkoutMetrics {
        &self.metrics
    }

    /// Stored derived metric (pace or speed).
    pub fn derived_metric(&self) -> f64 {
        self.metrics.derived_metric()
    }

    /// Recomputes the derived metric from current distance and duration.
    pub fn compute_derived_metric(&self) -> f64 {
        self.kind().derived_metric_fn()(self.distance_km, self.duration_min)
    }

    /// Running pace, `None` for cycling.
    pub fn pace_min_per_km(&self) -> Option<f64> {
        match self.metrics {
            WorkoutMetrics::Running {
                pace_min_per_km, ..
            } => Some(pace_min_per_km),
            WorkoutMetrics::Cycling { .. } => None,
        }
    }

    /// Cycling speed, `None` for running.
    pub fn speed_km_per_h(&self) -> Option<f64> {
        match self.metrics {
            WorkoutMetrics::Cycling { speed_km_per_h, .. } => Some(speed_km_per_h),
            WorkoutMetrics::Running { .. } => None,
        }
    }

    /// Counts one focus action (list item activation) and returns the new total.
    pub fn record_focus(&mut self) -> u32 {
        self.clicks = self.clicks.saturating_add(1);
        self.clicks
    }

    /// Checks every record invariant, including derived-field consistency.
    pub fn validate(&self) -> Result<(), WorkoutValidationError> {
        if self.id.is_nil() {
            return Err(WorkoutValidationError::NilId);
        }
        if !self.coordinates.is_finite() {
            return Err(WorkoutValidationError::NonFiniteCoordinates {
                latitude: self.coordinates.latitude,
                longitude: self.coordinates.longitude,
            });
        }
        validate_metrics(
            self.distance_km,
            self.duration_min,
            self.metrics.kind_field(),
        )?;

        let expected = self.compute_derived_metric();
        let actual = self.derived_metric();
        if !actual.is_finite() {
            return Err(WorkoutValidationError::NonFiniteDerivedMetric {
                kind: self.kind(),
                value: actual,
            });
        }
        if !approx_eq(expected, actual) {
            return Err(WorkoutValidationError::InconsistentDerivedMetric { expected, actual });
        }

        let expected_description = describe(self.kind(), self.created_at);
        if expected_description != self.description {
            return Err(WorkoutValidationError::InconsistentDescription {
                expected: expected_description,
                actual: self.description.clone(),
            });
        }

        Ok(())
    }

    /// Returns a copy with replaced metrics and a recomputed derived metric.
    ///
    /// Callers must have checked that `patch.kind() == self.kind()`.
    pub(crate) fn revised(&self, patch: &WorkoutPatch) -> Result<Self, WorkoutValidationError> {
        validate_metrics(patch.distance_km, patch.duration_min, patch.field)?;
        let metrics = WorkoutMetrics::compute(patch.field, patch.distance_km, patch.duration_min)?;
        Ok(Self {
            distance_km: patch.distance_km,
            duration_min: patch.duration_min,
            metrics,
            ..self.clone()
        })
    }
}

/// Formats the display label for a workout kind and creation time.
pub fn describe(kind: WorkoutKind, created_at: DateTime<Utc>) -> String {
    format!(
        "{} on {} {}",
        kind.label(),
        created_at.format("%B"),
        created_at.day()
    )
}

fn validate_metrics(
    distance_km: f64,
    duration_min: f64,
    field: KindField,
) -> Result<(), WorkoutValidationError> {
    require_positive("distance_km", distance_km)?;
    require_positive("duration_min", duration_min)?;
    field.validate()
}

fn require_finite(field: &'static str, value: f64) -> Result<(), WorkoutValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(WorkoutValidationError::NonFiniteField { field, value })
    }
}

fn require_positive(field: &'static str, value: f64) -> Result<(), WorkoutValidationError> {
    require_finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(WorkoutValidationError::NonPositiveField { field, value })
    }
}

fn approx_eq(expected: f64, actual: f64) -> bool {
    let scale = expected.abs().max(actual.abs()).max(1.0);
    (expected - actual).abs() <= DERIVED_METRIC_TOLERANCE * scale
}

/// Flat persisted shape of one workout.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkoutRecord {
    id: WorkoutId,
    #[serde(rename = "type")]
    kind: WorkoutKind,
    created_at: DateTime<Utc>,
    coords: Coordinates,
    distance_km: f64,
    duration_min: f64,
    #[serde(default)]
    clicks: u32,
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cadence_spm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pace_min_per_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    elevation_gain_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    speed_km_per_h: Option<f64>,
}

impl From<Workout> for WorkoutRecord {
    fn from(value: Workout) -> Self {
        let (cadence_spm, pace_min_per_km, elevation_gain_m, speed_km_per_h) = match value.metrics
        {
            WorkoutMetrics::Running {
                cadence_spm,
                pace_min_per_km,
            } => (Some(cadence_spm), Some(pace_min_per_km), None, None),
            WorkoutMetrics::Cycling {
                elevation_gain_m,
                speed_km_per_h,
            } => (None, None, Some(elevation_gain_m), Some(speed_km_per_h)),
        };

        Self {
            id: value.id,
            kind: value.metrics.kind(),
            created_at: value.created_at,
            coords: value.coordinates,
            distance_km: value.distance_km,
            duration_min: value.duration_min,
            clicks: value.clicks,
            description: value.description,
            cadence_spm,
            pace_min_per_km,
            elevation_gain_m,
            speed_km_per_h,
        }
    }
}

impl TryFrom<WorkoutRecord> for Workout {
    type Error = WorkoutValidationError;

    fn try_from(value: WorkoutRecord) -> Result<Self, Self::Error> {
        let metrics = match value.kind {
            WorkoutKind::Running => WorkoutMetrics::Running {
                cadence_spm: value
                    .cadence_spm
                    .ok_or(WorkoutValidationError::MissingField("cadence_spm"))?,
                pace_min_per_km: value
                    .pace_min_per_km
                    .ok_or(WorkoutValidationError::MissingField("pace_min_per_km"))?,
            },
            WorkoutKind::Cycling => WorkoutMetrics::Cycling {
                elevation_gain_m: value
                    .elevation_gain_m
                    .ok_or(WorkoutValidationError::MissingField("elevation_gain_m"))?,
                speed_km_per_h: value
                    .speed_km_per_h
                    .ok_or(WorkoutValidationError::MissingField("speed_km_per_h"))?,
            },
        };

        let workout = Self {
            id: value.id,
            created_at: value.created_at,
            coordinates: value.coords,
            distance_km: value.distance_km,
            duration_min: value.duration_min,
            clicks: value.clicks,
            description: value.description,
            metrics,
        };
        workout.validate()?;
        Ok(workout)
    }
}
