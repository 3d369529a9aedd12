use chrono::{TimeZone, Utc};
use mapty_core::{Coordinates, KindField, Workout, WorkoutKind, WorkoutValidationError};
use uuid::Uuid;

fn home() -> Coordinates {
    Coordinates::new(9.057, 7.448)
}

#[test]
fn running_pace_is_duration_over_distance() {
    let run = Workout::create(home(), 5.2, 24.0, KindField::Cadence(178.0)).unwrap();

    assert_eq!(run.kind(), WorkoutKind::Running);
    assert_eq!(run.pace_min_per_km(), Some(24.0 / 5.2));
    assert_eq!(run.derived_metric(), 24.0 / 5.2);
    assert!((run.derived_metric() - 4.6154).abs() < 1e-4);
    assert_eq!(run.speed_km_per_h(), None);
    assert_eq!(run.clicks(), 0);
    assert!(!run.id().is_nil());
}

#[test]
fn cycling_speed_is_distance_over_hours() {
    let ride = Workout::create(home(), 27.0, 95.0, KindField::ElevationGain(534.0)).unwrap();

    assert_eq!(ride.kind(), WorkoutKind::Cycling);
    assert_eq!(ride.speed_km_per_h(), Some(27.0 / (95.0 / 60.0)));
    assert!((ride.derived_metric() - 17.0526).abs() < 1e-4);
    assert_eq!(ride.pace_min_per_km(), None);
}

#[test]
fn create_rejects_non_positive_and_non_finite_input() {
    let cases = [
        (0.0, 24.0, KindField::Cadence(178.0)),
        (-1.0, 24.0, KindField::Cadence(178.0)),
        (5.2, f64::NAN, KindField::Cadence(178.0)),
        (5.2, 24.0, KindField::Cadence(f64::NAN)),
        (5.2, 24.0, KindField::Cadence(0.0)),
        (27.0, f64::INFINITY, KindField::ElevationGain(534.0)),
        (27.0, 95.0, KindField::ElevationGain(f64::NAN)),
    ];

    for (distance, duration, field) in cases {
        let result = Workout::create(home(), distance, duration, field);
        assert!(
            result.is_err(),
            "expected rejection for distance={distance} duration={duration} field={field:?}"
        );
    }
}

#[test]
fn validation_errors_name_the_offending_field() {
    let err = Workout::create(home(), 0.0, 24.0, KindField::Cadence(178.0)).unwrap_err();
    assert_eq!(
        err,
        WorkoutValidationError::NonPositiveField {
            field: "distance_km",
            value: 0.0
        }
    );

    let err = Workout::create(home(), 5.2, 24.0, KindField::Cadence(f64::NAN)).unwrap_err();
    assert!(matches!(
        err,
        WorkoutValidationError::NonFiniteField {
            field: "cadence_spm",
            ..
        }
    ));
}

#[test]
fn cycling_accepts_zero_and_negative_elevation_gain() {
    let flat = Workout::create(home(), 10.0, 30.0, KindField::ElevationGain(0.0)).unwrap();
    assert_eq!(flat.speed_km_per_h(), Some(20.0));

    let downhill = Workout::create(home(), 10.0, 30.0, KindField::ElevationGain(-40.0));
    assert!(downhill.is_ok());
}

#[test]
fn create_rejects_inputs_whose_pace_or_speed_overflows() {
    let err = Workout::create(home(), 1e-310, 24.0, KindField::Cadence(178.0)).unwrap_err();
    assert_eq!(
        err,
        WorkoutValidationError::NonFiniteDerivedMetric {
            kind: WorkoutKind::Running,
            value: f64::INFINITY,
        }
    );
    assert_eq!(
        err.to_string(),
        "pace_min_per_km must be a finite number, got inf"
    );

    let err = Workout::create(home(), 1e308, 1e-10, KindField::ElevationGain(0.0)).unwrap_err();
    assert!(matches!(
        err,
        WorkoutValidationError::NonFiniteDerivedMetric {
            kind: WorkoutKind::Cycling,
            ..
        }
    ));
}

#[test]
fn create_rejects_non_finite_coordinates() {
    let err = Workout::create(
        Coordinates::new(f64::NAN, 7.448),
        5.2,
        24.0,
        KindField::Cadence(178.0),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        WorkoutValidationError::NonFiniteCoordinates { .. }
    ));
}

#[test]
fn with_identity_rejects_nil_id() {
    let err = Workout::with_identity(
        Uuid::nil(),
        Utc::now(),
        home(),
        5.2,
        24.0,
        KindField::Cadence(178.0),
    )
    .unwrap_err();
    assert_eq!(err, WorkoutValidationError::NilId);
}

#[test]
fn description_uses_kind_and_creation_date() {
    let created_at = Utc.with_ymd_and_hms(2026, 4, 12, 8, 30, 0).unwrap();
    let run = Workout::with_identity(
        Uuid::new_v4(),
        created_at,
        home(),
        5.2,
        24.0,
        KindField::Cadence(178.0),
    )
    .unwrap();
    let ride = Workout::with_identity(
        Uuid::new_v4(),
        Utc.with_ymd_and_hms(2026, 12, 1, 18, 0, 0).unwrap(),
        home(),
        27.0,
        95.0,
        KindField::ElevationGain(534.0),
    )
    .unwrap();

    assert_eq!(run.description(), "Running on April 12");
    assert_eq!(ride.description(), "Cycling on December 1");
}

#[test]
fn record_focus_counts_up() {
    let mut run = Workout::create(home(), 5.2, 24.0, KindField::Cadence(178.0)).unwrap();
    assert_eq!(run.record_focus(), 1);
    assert_eq!(run.record_focus(), 2);
    assert_eq!(run.clicks(), 2);
}

#[test]
fn ids_are_distinct_across_rapid_creation() {
    let ids: std::collections::HashSet<_> = (0..200)
        .map(|_| {
            Workout::create(home(), 1.0, 5.0, KindField::Cadence(160.0))
                .unwrap()
                .id()
        })
        .collect();
    assert_eq!(ids.len(), 200);
}

#[test]
fn serialization_uses_expected_wire_fields() {
    let id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let created_at = Utc.with_ymd_and_hms(2026, 4, 12, 8, 30, 0).unwrap();
    let run = Workout::with_identity(
        id,
        created_at,
        home(),
        5.2,
        24.0,
        KindField::Cadence(178.0),
    )
    .unwrap();

    let json = serde_json::to_value(&run).unwrap();
    assert_eq!(json["id"], "11111111-2222-4333-8444-555555555555");
    assert_eq!(json["type"], "running");
    assert_eq!(json["created_at"], "2026-04-12T08:30:00Z");
    assert_eq!(json["coords"], serde_json::json!([9.057, 7.448]));
    assert_eq!(json["distance_km"], 5.2);
    assert_eq!(json["duration_min"], 24.0);
    assert_eq!(json["clicks"], 0);
    assert_eq!(json["description"], "Running on April 12");
    assert_eq!(json["cadence_spm"], 178.0);
    assert_eq!(json["pace_min_per_km"], 24.0 / 5.2);
    assert!(json.get("elevation_gain_m").is_none());
    assert!(json.get("speed_km_per_h").is_none());

    let decoded: Workout = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, run);
}

#[test]
fn deserialize_rejects_stale_derived_metric() {
    let run = Workout::create(home(), 5.2, 24.0, KindField::Cadence(178.0)).unwrap();
    let mut json = serde_json::to_value(&run).unwrap();
    json["pace_min_per_km"] = serde_json::json!(1.0);

    let err = serde_json::from_value::<Workout>(json).unwrap_err();
    assert!(
        err.to_string().contains("derived metric"),
        "unexpected error: {err}"
    );
}

#[test]
fn deserialize_rejects_missing_kind_field_and_invalid_distance() {
    let ride = Workout::create(home(), 27.0, 95.0, KindField::ElevationGain(534.0)).unwrap();

    let mut missing = serde_json::to_value(&ride).unwrap();
    missing
        .as_object_mut()
        .unwrap()
        .remove("elevation_gain_m");
    let err = serde_json::from_value::<Workout>(missing).unwrap_err();
    assert!(err.to_string().contains("elevation_gain_m is required"));

    let mut negative = serde_json::to_value(&ride).unwrap();
    negative["distance_km"] = serde_json::json!(-3.0);
    assert!(serde_json::from_value::<Workout>(negative).is_err());
}
